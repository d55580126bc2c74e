use crate::error::CoreError;
use crate::playback::TrackInfo;
use async_trait::async_trait;

/// Query parameters for fetching lyrics
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsQuery {
    /// Track name
    pub track_name: String,
    /// Artist name
    pub artist_name: String,
    /// Track duration in seconds (for matching)
    pub duration_secs: Option<u32>,
}

impl LyricsQuery {
    /// Create a new lyrics query
    pub fn new(track_name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            track_name: track_name.into(),
            artist_name: artist_name.into(),
            duration_secs: None,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration_secs: u32) -> Self {
        self.duration_secs = Some(duration_secs);
        self
    }

    /// Build a query from a track snapshot; unknown durations are left out
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_track(track: &TrackInfo) -> Self {
        let query = Self::new(&track.title, &track.artist);
        if track.duration_seconds.is_finite() && track.duration_seconds >= 1.0 {
            query.with_duration(track.duration_seconds.round().min(f64::from(u32::MAX)) as u32)
        } else {
            query
        }
    }
}

/// Result from a lyrics provider, as raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsResult {
    /// LRC text with line timestamps
    Synced(String),
    /// Plain text lyrics without timing
    Unsynced(String),
    /// The track has no vocals
    Instrumental,
    /// No lyrics found
    NotFound,
}

/// Lyrics with provider metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedLyrics {
    /// The lyrics result
    pub result: LyricsResult,
    /// Provider-specific ID (e.g., LRCLIB's numeric ID as string)
    pub provider_id: String,
}

impl FetchedLyrics {
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            result: LyricsResult::NotFound,
            provider_id: String::new(),
        }
    }
}

impl LyricsResult {
    /// Synced LRC text, if that is what the provider returned and it is not blank
    #[must_use]
    pub fn synced_text(&self) -> Option<&str> {
        match self {
            Self::Synced(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}

/// Trait for lyrics providers
///
/// Implementations bound their own latency (request timeouts) and report
/// "nothing usable" through [`LyricsResult`] rather than an error where they can.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Fetch lyrics for a query
    async fn fetch(&self, query: &LyricsQuery) -> Result<FetchedLyrics, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_for_track_rounds_duration() {
        let track = TrackInfo::new("", "Artist", "Song", 183.6, 0.0);
        let query = LyricsQuery::for_track(&track);
        assert_eq!(query.track_name, "Song");
        assert_eq!(query.artist_name, "Artist");
        assert_eq!(query.duration_secs, Some(184));
    }

    #[test]
    fn test_query_for_track_without_duration() {
        let track = TrackInfo::new("", "Artist", "Song", 0.0, 0.0);
        assert_eq!(LyricsQuery::for_track(&track).duration_secs, None);
    }

    #[test]
    fn test_synced_text() {
        assert_eq!(
            LyricsResult::Synced("[00:01.00]x".into()).synced_text(),
            Some("[00:01.00]x")
        );
        assert_eq!(LyricsResult::Synced("  \n".into()).synced_text(), None);
        assert_eq!(LyricsResult::Unsynced("words".into()).synced_text(), None);
        assert_eq!(LyricsResult::Instrumental.synced_text(), None);
    }
}
