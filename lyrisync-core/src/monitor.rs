//! Player polling and track change detection.

use crate::playback::TrackInfo;
use crate::source::PlayerQuery;
use std::time::Duration;
use tracing::{debug, info};

/// Polls a player and remembers the last snapshot it reported
pub struct TrackMonitor {
    player: Box<dyn PlayerQuery>,
    query_timeout: Duration,
    current: TrackInfo,
}

impl TrackMonitor {
    /// Create a monitor
    ///
    /// # Arguments
    /// * `player` - Player backend to query
    /// * `query_timeout` - Upper bound for one query; a slower reply counts as "not running"
    pub fn new(player: Box<dyn PlayerQuery>, query_timeout: Duration) -> Self {
        Self {
            player,
            query_timeout,
            current: TrackInfo::default(),
        }
    }

    /// The snapshot from the latest poll
    #[must_use]
    pub const fn current(&self) -> &TrackInfo {
        &self.current
    }

    /// Query the player once. Never fails: an unreachable or slow player
    /// yields the empty snapshot.
    pub async fn query_once(&self) -> TrackInfo {
        match tokio::time::timeout(self.query_timeout, self.player.query()).await {
            Ok(Ok(track)) => track,
            Ok(Err(e)) => {
                debug!("{} query failed: {}", self.player.source(), e);
                TrackInfo::default()
            }
            Err(_) => {
                debug!(
                    "{} query timed out after {:?}",
                    self.player.source(),
                    self.query_timeout
                );
                TrackInfo::default()
            }
        }
    }

    /// Poll the player and record the snapshot.
    ///
    /// Returns `true` when the track identity (file, artist, title) differs
    /// from the previous poll. Position and status updates alone are not
    /// changes.
    pub async fn poll(&mut self) -> bool {
        let track = self.query_once().await;
        let changed = self.current.track_changed(&track);

        if changed {
            if track.is_empty() {
                info!("Playback stopped or player not running");
            } else {
                info!("Track changed: {}", track.display_name());
            }
        }

        self.current = track;
        changed
    }
}
