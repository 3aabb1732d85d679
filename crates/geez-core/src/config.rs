//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "storageKey": "geez-dev", "session": { "rounds_per_session": 5 } }
//! ```

use crate::audio::{AudioAssets, DEFAULT_AUDIO_ROOT};
use crate::error::ConfigError;
use crate::persistence::STORAGE_KEY;
use geez_logic::progression::ProgressionConfig;
use geez_logic::rounds::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Key the snapshot is stored under.
    pub storage_key: String,
    /// Asset root for pronunciation clips.
    pub audio_root: String,
    pub progression: ProgressionConfig,
    pub session: SessionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            audio_root: DEFAULT_AUDIO_ROOT.to_string(),
            progression: ProgressionConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::debug!("loaded engine config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn audio_assets(&self) -> AudioAssets {
        AudioAssets::new(self.audio_root.as_str())
    }
}
