//! cmus backend, via `cmus-remote -Q`.
//!
//! `cmus-remote -Q` prints one `key value` pair per line:
//!
//! ```text
//! status playing
//! file /music/Artist/01 Song.flac
//! duration 245
//! position 61
//! tag artist Artist
//! tag title Song
//! ```

use crate::command;
use crate::error::Result;
use async_trait::async_trait;
use lyrisync_core::{MusicSource, PlaybackStatus, PlayerQuery, TrackInfo};
use std::collections::HashMap;
use tracing::debug;

const PROGRAM: &str = "cmus-remote";

/// Album artist value that means "look at the track artist instead"
const VARIOUS_ARTISTS: &str = "Various Artists";

/// Queries a running cmus instance
#[derive(Debug, Default, Clone, Copy)]
pub struct CmusPlayer;

impl CmusPlayer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PlayerQuery for CmusPlayer {
    fn source(&self) -> MusicSource {
        MusicSource::Cmus
    }

    async fn query(&self) -> lyrisync_core::Result<TrackInfo> {
        let output = command::run(PROGRAM, &["-Q"]).await?;
        let track = parse_status(&output);
        debug!(
            "cmus: {:?} {} at {}s",
            track.status,
            track.display_name(),
            track.position_seconds
        );
        Ok(track)
    }
}

/// Parse `cmus-remote -Q` output into a snapshot.
///
/// Unknown keys and unparsable numbers are ignored. With nothing loaded the
/// result is the empty snapshot.
#[must_use]
pub fn parse_status(output: &str) -> TrackInfo {
    let mut track = TrackInfo::default();
    let mut tags: HashMap<&str, &str> = HashMap::new();

    for line in output.lines() {
        let Some((key, value)) = line.split_once(' ') else {
            continue;
        };
        let value = value.trim();
        match key {
            "status" => track.status = PlaybackStatus::parse(value),
            "file" => track.file_path = value.to_string(),
            "position" => track.position_seconds = parse_seconds(value),
            "duration" => track.duration_seconds = parse_seconds(value),
            "tag" => {
                if let Some((name, tag)) = value.split_once(' ') {
                    tags.insert(name, tag.trim());
                }
            }
            _ => {}
        }
    }

    track.artist = artist_from_tags(&tags);
    track.title = tags.get("title").copied().unwrap_or_default().to_string();
    track
}

/// Whole seconds as reported by cmus; streams report `-1` for the duration
fn parse_seconds(value: &str) -> f64 {
    value.parse::<f64>().ok().filter(|s| *s >= 0.0).unwrap_or(0.0)
}

/// Album artist wins over track artist, except on compilations.
/// Multiple artists separated by `/` or `;` are joined with `, `.
fn artist_from_tags(tags: &HashMap<&str, &str>) -> String {
    let album_artist = tags.get("albumartist").copied().filter(|a| !a.is_empty());
    let artist = tags.get("artist").copied().filter(|a| !a.is_empty());

    let chosen = match (album_artist, artist) {
        (Some(VARIOUS_ARTISTS), Some(artist)) | (None, Some(artist)) => artist,
        (Some(album_artist), _) => album_artist,
        (None, None) => return String::new(),
    };

    chosen
        .split(['/', ';'])
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYING: &str = "\
status playing
file /music/Band/01 Song.flac
duration 245
position 61
tag artist Band
tag album Record
tag title Song
tag tracknumber 1
set aaa_mode all
set continue true
";

    #[test]
    fn test_parse_playing() {
        let track = parse_status(PLAYING);
        assert_eq!(track.file_path, "/music/Band/01 Song.flac");
        assert_eq!(track.artist, "Band");
        assert_eq!(track.title, "Song");
        assert!((track.duration_seconds - 245.0).abs() < f64::EPSILON);
        assert!((track.position_seconds - 61.0).abs() < f64::EPSILON);
        assert_eq!(track.status, PlaybackStatus::Playing);
    }

    #[test]
    fn test_parse_nothing_loaded() {
        let track = parse_status("status stopped\nset aaa_mode all\n");
        assert!(track.is_empty());
        assert_eq!(track.status, PlaybackStatus::Stopped);
    }

    #[test]
    fn test_parse_stream_duration() {
        let track =
            parse_status("status playing\nfile http://radio/stream\nduration -1\nposition 12\n");
        assert!(track.duration_seconds.abs() < f64::EPSILON);
        assert!((track.position_seconds - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_album_artist_preferred() {
        let track = parse_status(
            "tag albumartist The Band\ntag artist The Band feat. Guest\ntag title T\n",
        );
        assert_eq!(track.artist, "The Band");
    }

    #[test]
    fn test_various_artists_uses_track_artist() {
        let track =
            parse_status("tag albumartist Various Artists\ntag artist A / B;C\ntag title T\n");
        assert_eq!(track.artist, "A, B, C");
    }

    #[test]
    fn test_title_with_spaces() {
        let track = parse_status("tag title  Song  With   Spaces \n");
        assert_eq!(track.title, "Song  With   Spaces");
    }
}
