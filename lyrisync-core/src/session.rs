use crate::playback::TrackInfo;
use crate::resolver::{LyricsOrigin, Resolution};
use crate::scroll::ScrollState;
use crate::timeline::Timeline;

/// Everything shown for the current track.
///
/// A session is only ever replaced as a whole, so the track, its timeline and
/// the scroll state can never belong to different tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub track: TrackInfo,
    pub timeline: Timeline,
    pub origin: LyricsOrigin,
    pub scroll: ScrollState,
}

impl Session {
    /// A session with no lyrics (idle, or still resolving)
    #[must_use]
    pub fn without_lyrics(track: TrackInfo) -> Self {
        Self {
            track,
            timeline: Timeline::empty(),
            origin: LyricsOrigin::None,
            scroll: ScrollState::default(),
        }
    }

    /// A session for a resolved track, starting in follow mode
    #[must_use]
    pub fn resolved(track: TrackInfo, resolution: Resolution) -> Self {
        Self {
            track,
            timeline: resolution.timeline,
            origin: resolution.origin,
            scroll: ScrollState::default(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::without_lyrics(TrackInfo::default())
    }
}
