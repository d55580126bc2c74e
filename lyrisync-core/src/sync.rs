//! The per-tick synchronization pipeline.
//!
//! Each [`SyncEngine::tick`] polls the player, starts a background resolution
//! when the track changed, swaps in finished resolutions, and turns the
//! current position into a [`RenderFrame`] for the renderer.

use crate::monitor::TrackMonitor;
use crate::playback::TrackInfo;
use crate::resolver::{LyricsResolver, Resolution};
use crate::scroll::ScrollWindow;
use crate::session::Session;
use crate::source::PlayerQuery;
use crate::time::millis_to_secs;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the lyrics pane should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricsStatus {
    /// Nothing is playing
    Idle,
    /// Lyrics for the current track are being resolved
    Loading,
    /// No lyrics exist for the current track
    NoLyrics,
    /// The timeline has lines to show
    Ready,
}

/// User input the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Recenter,
    /// Move lyrics timing by this many milliseconds (positive = later position)
    ShiftOffset(i64),
    ResetOffset,
}

/// Render instruction for one tick.
///
/// Line text is read from [`SyncEngine::session`]; the frame only carries
/// indices into its timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFrame {
    pub status: LyricsStatus,
    pub window: ScrollWindow,
    /// Word being sung within the highlighted line
    pub active_word: Option<usize>,
    /// Position used for matching, offset included
    pub position_seconds: f64,
    pub offset_ms: i64,
    pub manual_scroll: bool,
}

struct PendingResolution {
    track: TrackInfo,
    handle: JoinHandle<()>,
}

/// Owns the current [`Session`] and drives it from player polls and user input
pub struct SyncEngine {
    monitor: TrackMonitor,
    resolver: Arc<LyricsResolver>,
    session: Session,
    pending: Option<PendingResolution>,
    resolved_tx: mpsc::UnboundedSender<(TrackInfo, Resolution)>,
    resolved_rx: mpsc::UnboundedReceiver<(TrackInfo, Resolution)>,
    scroll_timeout: Option<Duration>,
    offset_ms: i64,
    last_window: ScrollWindow,
    last_height: usize,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Arguments
    /// * `player` - Player backend polled once per tick
    /// * `resolver` - Lyric source resolution, run off the render loop
    /// * `query_timeout` - Upper bound for one player query
    /// * `scroll_timeout` - Idle time after which manual scroll reverts; `None` never reverts
    pub fn new(
        player: Box<dyn PlayerQuery>,
        resolver: LyricsResolver,
        query_timeout: Duration,
        scroll_timeout: Option<Duration>,
    ) -> Self {
        let (resolved_tx, resolved_rx) = mpsc::unbounded_channel();
        Self {
            monitor: TrackMonitor::new(player, query_timeout),
            resolver: Arc::new(resolver),
            session: Session::default(),
            pending: None,
            resolved_tx,
            resolved_rx,
            scroll_timeout,
            offset_ms: 0,
            last_window: ScrollWindow::default(),
            last_height: 0,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn offset_ms(&self) -> i64 {
        self.offset_ms
    }

    #[must_use]
    pub fn status(&self) -> LyricsStatus {
        if self.session.track.is_empty() {
            LyricsStatus::Idle
        } else if self.pending.is_some() {
            LyricsStatus::Loading
        } else if self.session.timeline.is_empty() {
            LyricsStatus::NoLyrics
        } else {
            LyricsStatus::Ready
        }
    }

    /// Run one cycle: poll, resolve on change, match, compute the window.
    pub async fn tick(&mut self, viewport_height: usize) -> RenderFrame {
        if self.monitor.poll().await {
            self.on_track_change();
        } else {
            // Same track: fresh position and status, interpolation anchor carried over
            let mut track = self.monitor.current().clone();
            track.continue_from(&self.session.track);
            self.session.track = track;
        }

        self.collect_resolutions();

        let now = crate::time::now();
        if self.session.scroll.expire(now, self.scroll_timeout) {
            debug!("Manual scroll timed out, following playback again");
        }

        self.frame(viewport_height, now)
    }

    fn on_track_change(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("Abandoning resolution for {}", pending.track.display_name());
            pending.handle.abort();
        }

        let track = self.monitor.current().clone();
        self.session = Session::without_lyrics(track.clone());
        if track.is_empty() {
            return;
        }

        let resolver = Arc::clone(&self.resolver);
        let tx = self.resolved_tx.clone();
        let key = track.clone();
        let handle = tokio::spawn(async move {
            let resolution = resolver.resolve(&key).await;
            // The receiver lives as long as the engine
            let _ = tx.send((key, resolution));
        });

        self.pending = Some(PendingResolution { track, handle });
    }

    fn collect_resolutions(&mut self) {
        while let Ok((track, resolution)) = self.resolved_rx.try_recv() {
            if track.track_changed(&self.session.track) {
                debug!("Discarding stale lyrics for {}", track.display_name());
                continue;
            }

            info!(
                "Lyrics for {}: {} lines ({:?})",
                track.display_name(),
                resolution.timeline.len(),
                resolution.origin
            );
            if let Some(pending) = self.pending.take() {
                pending.handle.abort();
            }
            let current = std::mem::take(&mut self.session.track);
            self.session = Session::resolved(current, resolution);
        }
    }

    /// Wait for an in-flight resolution to finish and apply it.
    pub async fn finish_pending(&mut self) {
        // The pending task always belongs to the session's track, so its
        // result is never discarded once awaited.
        if let Some(pending) = self.pending.take() {
            if let Err(e) = pending.handle.await {
                warn!("Lyrics resolution task failed: {}", e);
            }
        }
        self.collect_resolutions();
    }

    fn frame(&mut self, viewport_height: usize, now: Instant) -> RenderFrame {
        let position =
            self.session.track.interpolated_position(now) + millis_to_secs(self.offset_ms);
        let timeline = &self.session.timeline;

        let current = timeline.active_index(position);
        let window =
            ScrollWindow::compute(viewport_height, current, timeline.len(), &self.session.scroll);
        let active_word = current
            .and_then(|i| timeline.get(i))
            .and_then(|entry| entry.active_word(position));

        self.last_window = window;
        self.last_height = viewport_height;

        RenderFrame {
            status: self.status(),
            window,
            active_word,
            position_seconds: position,
            offset_ms: self.offset_ms,
            manual_scroll: self.session.scroll.manual_active,
        }
    }

    /// Apply a user command. Scroll commands act on the window of the last tick.
    pub fn apply(&mut self, command: UserCommand) {
        let page = i64::try_from(self.last_height.max(1)).unwrap_or(1);
        match command {
            UserCommand::ScrollUp => self.scroll(-1),
            UserCommand::ScrollDown => self.scroll(1),
            UserCommand::PageUp => self.scroll(-page),
            UserCommand::PageDown => self.scroll(page),
            UserCommand::Recenter => self.session.scroll.recenter(),
            UserCommand::ShiftOffset(delta) => {
                self.offset_ms = self.offset_ms.saturating_add(delta);
                info!("Sync offset: {}ms", self.offset_ms);
            }
            UserCommand::ResetOffset => {
                self.offset_ms = 0;
                info!("Sync offset reset");
            }
        }
    }

    fn scroll(&mut self, delta: i64) {
        let len = self.session.timeline.len();
        if len == 0 {
            return;
        }
        let limit = ScrollWindow::manual_limit(len, self.last_height);
        self.session
            .scroll
            .scroll_by(delta, self.last_window.start, limit, crate::time::now());
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}
