//! MPRIS backend, via `playerctl metadata --format`.
//!
//! MPRIS exposes no file path, so snapshots from this backend always have an
//! empty `file_path` and lyrics come from the cache or the network.

use crate::command;
use crate::error::{PlayerError, Result};
use async_trait::async_trait;
use lyrisync_core::{MusicSource, PlaybackStatus, PlayerQuery, TrackInfo};
use tracing::debug;

const PROGRAM: &str = "playerctl";

/// Field separator in the format string; titles may contain `|`
const SEPARATOR: char = '\u{1f}';

const FORMAT: &str = concat!(
    "{{artist}}\u{1f}{{title}}\u{1f}{{position}}\u{1f}",
    "{{status}}\u{1f}{{mpris:length}}"
);

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Queries the active MPRIS player, or a specific one by name
#[derive(Debug, Default, Clone)]
pub struct PlayerctlPlayer {
    player: Option<String>,
}

impl PlayerctlPlayer {
    #[must_use]
    pub const fn new() -> Self {
        Self { player: None }
    }

    /// Only query the named player (`playerctl --player <name>`)
    #[must_use]
    pub fn for_player(name: impl Into<String>) -> Self {
        Self {
            player: Some(name.into()),
        }
    }

    fn args(&self) -> Vec<&str> {
        let mut args = Vec::with_capacity(5);
        if let Some(player) = &self.player {
            args.extend(["--player", player.as_str()]);
        }
        args.extend(["metadata", "--format", FORMAT]);
        args
    }
}

#[async_trait]
impl PlayerQuery for PlayerctlPlayer {
    fn source(&self) -> MusicSource {
        MusicSource::Playerctl
    }

    async fn query(&self) -> lyrisync_core::Result<TrackInfo> {
        let output = command::run(PROGRAM, &self.args()).await?;
        let track = parse_metadata(&output)?;
        debug!(
            "playerctl: {:?} {} at {:.1}s",
            track.status,
            track.display_name(),
            track.position_seconds
        );
        Ok(track)
    }
}

/// Parse one line of `playerctl metadata --format` output.
///
/// Empty output (no player) is the empty snapshot. Positions come in
/// microseconds; a position that is negative or far past the track length is
/// a stale reading and is reset.
///
/// # Errors
///
/// Returns [`PlayerError::InvalidOutput`] if the line does not have all fields.
pub fn parse_metadata(output: &str) -> Result<TrackInfo> {
    let line = output.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return Ok(TrackInfo::default());
    }

    let fields: Vec<&str> = line.split(SEPARATOR).collect();
    let [artist, title, position, status, length] = fields.as_slice() else {
        return Err(PlayerError::InvalidOutput {
            program: PROGRAM,
            reason: format!("expected 5 fields, got {}", fields.len()),
        });
    };

    let status = PlaybackStatus::parse(status);
    let duration = micros_to_seconds(length);
    let mut position = micros_to_seconds(position);
    if position < 0.0 || (duration > 0.0 && position > duration * 1.5) {
        position = if status == PlaybackStatus::Paused { duration } else { 0.0 };
    }

    Ok(TrackInfo::new("", artist.trim(), title.trim(), duration, position).with_status(status))
}

fn micros_to_seconds(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map_or(0.0, |v| v / MICROS_PER_SECOND)
}
