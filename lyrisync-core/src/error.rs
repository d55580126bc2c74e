use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // Player errors
    #[error("Player {player} unavailable: {reason}")]
    PlayerUnavailable { player: String, reason: String },

    // Lyrics errors
    #[error("Malformed timestamp: {input:?}")]
    MalformedTimestamp { input: String },

    #[error("Lyrics provider {provider} failed: {reason}")]
    LyricsProviderFailed { provider: String, reason: String },

    // Network errors
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Network request failed: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn malformed(input: &str) -> Self {
        Self::MalformedTimestamp {
            input: input.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
