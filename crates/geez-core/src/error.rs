//! Error types for the engine crate.

use thiserror::Error;

/// Failures reading or writing the persisted snapshot.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// A key-value backend refused the operation.
    #[error("store error: {0}")]
    Store(String),
}

/// Failures loading an [`EngineConfig`](crate::config::EngineConfig) file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = PersistError> = std::result::Result<T, E>;
