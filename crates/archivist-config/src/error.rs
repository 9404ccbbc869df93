//! Configuration error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(String),

    #[error("XDG directory error: {0}")]
    XdgError(String),
}
