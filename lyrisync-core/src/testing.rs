//! In-memory player and provider doubles shared by the unit tests.

use crate::error::{CoreError, Result};
use crate::playback::TrackInfo;
use crate::provider::{FetchedLyrics, LyricsProvider, LyricsQuery, LyricsResult};
use crate::source::{MusicSource, PlayerQuery};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Provider returning a fixed result and counting calls
pub struct FakeProvider {
    result: Option<LyricsResult>,
    calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    /// `None` makes every fetch fail with a provider error
    pub fn new(result: Option<LyricsResult>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                result,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl LyricsProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, _query: &LyricsQuery) -> Result<FetchedLyrics> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Some(result) => Ok(FetchedLyrics {
                result: result.clone(),
                provider_id: "42".into(),
            }),
            None => Err(CoreError::LyricsProviderFailed {
                provider: "fake".into(),
                reason: "offline".into(),
            }),
        }
    }
}

/// Player whose reply the test can swap between polls; `None` means "not running"
#[derive(Clone, Default)]
pub struct FakePlayer {
    reply: Arc<Mutex<Option<TrackInfo>>>,
}

impl FakePlayer {
    pub fn set(&self, track: Option<TrackInfo>) {
        *self.reply.lock().unwrap() = track;
    }
}

#[async_trait]
impl PlayerQuery for FakePlayer {
    fn source(&self) -> MusicSource {
        MusicSource::Cmus
    }

    async fn query(&self) -> Result<TrackInfo> {
        let mut track = self
            .reply
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CoreError::PlayerUnavailable {
                player: "fake".into(),
                reason: "not running".into(),
            })?;
        // Stamped like a real reply
        track.polled_at = crate::time::now();
        Ok(track)
    }
}
