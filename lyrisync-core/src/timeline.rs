use crate::dialect::Dialect;

/// Word-level timing inside a [`TimelineEntry`]
#[derive(Debug, Clone, PartialEq)]
pub struct WordSpan {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

/// A single displayed lyric line with its start time
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub timestamp_seconds: f64,
    pub text: String,
    /// Word timing, only present for word-synced sources
    pub words: Vec<WordSpan>,
}

impl TimelineEntry {
    pub fn new(timestamp_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            timestamp_seconds,
            text: text.into(),
            words: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_words(mut self, words: Vec<WordSpan>) -> Self {
        self.words = words;
        self
    }

    /// Index of the word being sung at `position`, if this line has word timing
    /// and the first word has started.
    #[must_use]
    pub fn active_word(&self, position: f64) -> Option<usize> {
        self.words
            .partition_point(|w| w.start_seconds <= position)
            .checked_sub(1)
    }
}

/// Ordered lyric lines for one track.
///
/// Synced timelines are time-ascending: decoders append entries in file order
/// and then stably sort them, so lines sharing a timestamp keep their file
/// order. Unsynced timelines are in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    dialect: Dialect,
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    #[must_use]
    pub const fn new(dialect: Dialect, entries: Vec<TimelineEntry>) -> Self {
        Self { dialect, entries }
    }

    /// The "no lyrics available" timeline
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TimelineEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether entries carry real timestamps (plain text does not)
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        self.dialect.is_synced()
    }

    /// Find the line index for a playback position.
    ///
    /// Returns the last entry whose timestamp is `<= position`, or `None`
    /// before the first timestamp and for unsynced timelines. O(log n).
    #[must_use]
    pub fn active_index(&self, position: f64) -> Option<usize> {
        if !self.is_synced() {
            return None;
        }
        // First entry strictly after the position; the active one precedes it.
        self.entries
            .partition_point(|e| e.timestamp_seconds <= position)
            .checked_sub(1)
    }

    /// Stable sort by timestamp. Compressed LRC (`[00:30][01:30]Chorus`)
    /// lists lines out of time order.
    pub(crate) fn sort_by_time(&mut self) {
        self.entries
            .sort_by(|a, b| a.timestamp_seconds.total_cmp(&b.timestamp_seconds));
    }

    pub(crate) fn shift(&mut self, seconds: f64) {
        if seconds.abs() < f64::EPSILON {
            return;
        }
        for entry in &mut self.entries {
            entry.timestamp_seconds = (entry.timestamp_seconds + seconds).max(0.0);
            for word in &mut entry.words {
                word.start_seconds = (word.start_seconds + seconds).max(0.0);
                word.end_seconds = (word.end_seconds + seconds).max(0.0);
            }
        }
    }
}
