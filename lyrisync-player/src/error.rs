use lyrisync_core::CoreError;
use thiserror::Error;

/// Errors from talking to a player's command-line client or server.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The client binary is not installed or not on `PATH`.
    #[error("{program} not found on PATH")]
    ClientMissing { program: &'static str },

    /// The client ran but reported failure (usually: player not running).
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: &'static str,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The client printed something we could not interpret.
    #[error("unexpected {program} output: {reason}")]
    InvalidOutput {
        program: &'static str,
        reason: String,
    },

    /// The player answered a request with an error.
    #[error("{program} rejected the request: {message}")]
    Rejected {
        program: &'static str,
        message: String,
    },

    /// The player did not answer in time.
    #[error("{program} did not answer in time")]
    TimedOut { program: &'static str },

    /// Failed to spawn the client or read its output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlayerError {
    /// Name of the client program involved, if known
    #[must_use]
    pub const fn program(&self) -> &'static str {
        match self {
            Self::ClientMissing { program }
            | Self::CommandFailed { program, .. }
            | Self::InvalidOutput { program, .. }
            | Self::Rejected { program, .. }
            | Self::TimedOut { program } => program,
            Self::Io(_) => "player",
        }
    }
}

impl From<PlayerError> for CoreError {
    fn from(err: PlayerError) -> Self {
        Self::PlayerUnavailable {
            player: err.program().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Convenience type alias for Results with `PlayerError`.
pub type Result<T> = std::result::Result<T, PlayerError>;
