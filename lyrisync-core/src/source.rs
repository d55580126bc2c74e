//! Music player identification and query trait.

use crate::error::Result;
use crate::playback::TrackInfo;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifies a music player backend.
///
/// The identifier is what users write in `player.source` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicSource {
    /// cmus, queried through `cmus-remote -Q`
    #[default]
    Cmus,
    /// Any MPRIS player, queried through `playerctl metadata`
    Playerctl,
    /// Music Player Daemon, over its TCP protocol
    Mpd,
}

impl MusicSource {
    /// Get the string identifier used in config and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cmus => "cmus",
            Self::Playerctl => "playerctl",
            Self::Mpd => "mpd",
        }
    }
}

impl std::fmt::Display for MusicSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A music player that can be asked what it is playing.
///
/// One call is one request/response round trip to the player. Implementations
/// return [`CoreError::PlayerUnavailable`](crate::CoreError::PlayerUnavailable)
/// when the player is not running, and [`TrackInfo::default`] when it runs but
/// has nothing loaded. Callers treat both as the idle state.
#[async_trait]
pub trait PlayerQuery: Send + Sync {
    /// Returns the type of player this backend talks to.
    fn source(&self) -> MusicSource;

    /// Query the current track and position.
    ///
    /// # Errors
    ///
    /// Returns an error if the player cannot be reached or its reply is unusable.
    async fn query(&self) -> Result<TrackInfo>;
}
