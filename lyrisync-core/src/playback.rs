use std::time::Instant;

/// Player transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlaybackStatus {
    /// Parse the status words used by cmus and playerctl (`playing`, `Paused`, ...)
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

/// Snapshot of what the player reported on one poll
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    /// Audio file on disk; empty for stream/MPRIS players that expose no file
    pub file_path: String,
    pub artist: String,
    pub title: String,
    pub duration_seconds: f64,
    pub position_seconds: f64,
    pub status: PlaybackStatus,
    /// When this snapshot was taken (for interpolation)
    pub polled_at: Instant,
}

impl Default for TrackInfo {
    fn default() -> Self {
        Self {
            file_path: String::new(),
            artist: String::new(),
            title: String::new(),
            duration_seconds: 0.0,
            position_seconds: 0.0,
            status: PlaybackStatus::Stopped,
            polled_at: crate::time::now(),
        }
    }
}

impl TrackInfo {
    /// Create a new track snapshot
    pub fn new(
        file_path: impl Into<String>,
        artist: impl Into<String>,
        title: impl Into<String>,
        duration_seconds: f64,
        position_seconds: f64,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            artist: artist.into(),
            title: title.into(),
            duration_seconds,
            position_seconds,
            status: PlaybackStatus::Playing,
            polled_at: crate::time::now(),
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: PlaybackStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether this is the "no player / no track" snapshot
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_path.is_empty() && self.artist.is_empty() && self.title.is_empty()
    }

    /// Check if `other` is a different track (file, artist or title differ)
    #[must_use]
    pub fn track_changed(&self, other: &Self) -> bool {
        self.file_path != other.file_path
            || self.artist != other.artist
            || self.title != other.title
    }

    /// Keep the interpolation anchor of the previous poll of the same track.
    ///
    /// Some players report a coarse position (cmus: whole seconds) that stays
    /// the same across several polls. The anchor only moves when the reported
    /// position changes, or when playback stops or resumes.
    pub fn continue_from(&mut self, previous: &Self) {
        let same_reading = self.status == PlaybackStatus::Playing
            && previous.status == PlaybackStatus::Playing
            && !self.track_changed(previous)
            && (self.position_seconds - previous.position_seconds).abs() < f64::EPSILON;
        if same_reading {
            self.polled_at = previous.polled_at;
        }
    }

    /// Get interpolated position based on time elapsed since the poll.
    ///
    /// Only advances while playing, clamped to the duration when it is known.
    #[must_use]
    pub fn interpolated_position(&self, now: Instant) -> f64 {
        if self.status != PlaybackStatus::Playing {
            return self.position_seconds;
        }

        let elapsed = now.saturating_duration_since(self.polled_at).as_secs_f64();
        let interpolated = self.position_seconds + elapsed;

        if self.duration_seconds > 0.0 {
            interpolated.min(self.duration_seconds)
        } else {
            interpolated
        }
    }

    /// `Artist - Title`, falling back to the file name or a placeholder
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.artist.is_empty(), self.title.is_empty()) {
            (false, false) => format!("{} - {}", self.artist, self.title),
            (true, false) => self.title.clone(),
            _ => std::path::Path::new(&self.file_path)
                .file_name()
                .and_then(|n| n.to_str())
                .map_or_else(|| "Unknown Track".to_string(), str::to_string),
        }
    }
}
