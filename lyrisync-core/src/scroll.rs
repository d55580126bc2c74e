//! Visible window over the timeline.
//!
//! In follow mode the active line is kept centered. Any scroll input switches
//! to manual mode, which holds a user-chosen offset independent of playback
//! until the user re-centers, the scroll timeout expires, or a new track loads.

use std::time::{Duration, Instant};

/// Manual scroll state for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    pub manual_offset: i64,
    pub manual_active: bool,
    last_input: Option<Instant>,
}

impl ScrollState {
    /// Move the manual offset by `delta` lines.
    ///
    /// Entering manual mode starts from `shown_start` (the window currently on
    /// screen) so the view does not jump. The result is clamped to
    /// `0..=max_start`.
    pub fn scroll_by(&mut self, delta: i64, shown_start: usize, max_start: usize, now: Instant) {
        if !self.manual_active {
            self.manual_active = true;
            self.manual_offset = to_i64(shown_start);
        }
        self.manual_offset = self
            .manual_offset
            .saturating_add(delta)
            .clamp(0, to_i64(max_start));
        self.last_input = Some(now);
    }

    /// Return to follow mode
    pub fn recenter(&mut self) {
        *self = Self::default();
    }

    /// Revert to follow mode when no scroll input arrived within `timeout`.
    ///
    /// Returns `true` when the state changed.
    pub fn expire(&mut self, now: Instant, timeout: Option<Duration>) -> bool {
        let (Some(timeout), Some(last)) = (timeout, self.last_input) else {
            return false;
        };
        if self.manual_active && now.saturating_duration_since(last) >= timeout {
            self.recenter();
            return true;
        }
        false
    }
}

/// The slice of the timeline to draw, plus the line to highlight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollWindow {
    pub start: usize,
    /// Exclusive
    pub end: usize,
    pub highlight: Option<usize>,
}

impl ScrollWindow {
    /// Compute the window for a viewport of `height` rows over `len` lines.
    ///
    /// Follow mode: `clamp(current - height/2, 0, max(0, len - height))`.
    /// Manual mode: `clamp(manual_offset, 0, max(0, len - height + 2))`, never past `len`.
    /// With no active line the window is computed as if line 0 were active.
    #[must_use]
    pub fn compute(
        height: usize,
        current: Option<usize>,
        len: usize,
        scroll: &ScrollState,
    ) -> Self {
        let h = to_i64(height);
        let n = to_i64(len);

        let start = if scroll.manual_active {
            scroll.manual_offset.clamp(0, Self::manual_limit_i64(len, height)).min(n)
        } else {
            let c = to_i64(current.unwrap_or(0));
            (c - h / 2).clamp(0, (n - h).max(0))
        };

        let start = usize::try_from(start).unwrap_or(0);
        Self {
            start,
            end: start.saturating_add(height).min(len),
            highlight: current,
        }
    }

    /// Largest manual offset for a timeline of `len` lines in `height` rows
    #[must_use]
    pub fn manual_limit(len: usize, height: usize) -> usize {
        usize::try_from(Self::manual_limit_i64(len, height).min(to_i64(len))).unwrap_or(0)
    }

    fn manual_limit_i64(len: usize, height: usize) -> i64 {
        (to_i64(len) - to_i64(height) + 2).max(0)
    }

    /// Timeline indices inside the window
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    #[must_use]
    pub const fn is_highlighted(&self, index: usize) -> bool {
        matches!(self.highlight, Some(h) if h == index)
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
