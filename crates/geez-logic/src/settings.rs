//! Learner preferences.
//!
//! Settings travel with the progression snapshot so that a reinstall from a
//! saved blob restores them too.

use crate::mastery::{MasteryRecord, MasteryTier};
use serde::{Deserialize, Serialize};

/// When to show Latin transliterations under Ethiopic glyphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RomanizationMode {
    /// Display for all characters.
    #[default]
    Always,
    /// Display until a family reaches gold.
    Early,
    /// Learn shapes without scaffolding.
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub show_romanization: RomanizationMode,
    pub audio_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_romanization: RomanizationMode::Always,
            audio_enabled: true,
        }
    }
}

/// A single settings change carried by [`crate::progression::Event::SetSetting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum SettingChange {
    ShowRomanization(RomanizationMode),
    AudioEnabled(bool),
}

impl Settings {
    pub fn apply(&mut self, change: SettingChange) {
        match change {
            SettingChange::ShowRomanization(mode) => self.show_romanization = mode,
            SettingChange::AudioEnabled(enabled) => self.audio_enabled = enabled,
        }
    }

    /// Whether transliterations should be shown for a family with `record`.
    pub fn should_show_romanization(&self, record: Option<&MasteryRecord>) -> bool {
        match self.show_romanization {
            RomanizationMode::Always => true,
            RomanizationMode::Never => false,
            RomanizationMode::Early => {
                record.map(MasteryRecord::tier).unwrap_or(MasteryTier::None) != MasteryTier::Gold
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.show_romanization, RomanizationMode::Always);
        assert!(s.audio_enabled);
    }

    #[test]
    fn early_hides_only_at_gold() {
        let s = Settings {
            show_romanization: RomanizationMode::Early,
            audio_enabled: true,
        };
        assert!(s.should_show_romanization(None));
        assert!(s.should_show_romanization(Some(&MasteryRecord::new(3, 4))));
        assert!(!s.should_show_romanization(Some(&MasteryRecord::new(3, 3))));
    }

    #[test]
    fn always_and_never() {
        let gold = MasteryRecord::new(10, 10);
        let mut s = Settings::default();
        assert!(s.should_show_romanization(Some(&gold)));
        s.apply(SettingChange::ShowRomanization(RomanizationMode::Never));
        assert!(!s.should_show_romanization(None));
    }

    #[test]
    fn apply_audio_toggle() {
        let mut s = Settings::default();
        s.apply(SettingChange::AudioEnabled(false));
        assert!(!s.audio_enabled);
    }

    #[test]
    fn change_json_shape() {
        let change: SettingChange =
            serde_json::from_str(r#"{"key":"showRomanization","value":"early"}"#).unwrap();
        assert_eq!(change, SettingChange::ShowRomanization(RomanizationMode::Early));
    }

    #[test]
    fn partial_settings_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"audioEnabled":false}"#).unwrap();
        assert_eq!(s.show_romanization, RomanizationMode::Always);
        assert!(!s.audio_enabled);
    }
}
