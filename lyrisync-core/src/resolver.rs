//! Lyric source resolution for a track.
//!
//! The audio file's own lyrics tag is read first when enabled, then local
//! files are tried in a fixed order. Only when none exists is the remote
//! provider asked, and a successful fetch is written to the cache directory
//! before it is decoded.

use crate::cache::LyricsCache;
use crate::dialect::Dialect;
use crate::embedded::{read_embedded_lyrics, EmbeddedLyrics};
use crate::playback::TrackInfo;
use crate::provider::{LyricsProvider, LyricsQuery, LyricsResult};
use crate::timeline::Timeline;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a timeline came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsOrigin {
    /// The lyrics tag of the audio file itself
    Embedded(PathBuf),
    /// A file next to the audio file
    Sibling(PathBuf),
    /// A previously cached file
    Cache(PathBuf),
    /// Fetched just now from a provider
    Remote { provider: &'static str },
    /// No lyrics available
    None,
}

/// Outcome of resolving a track
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub timeline: Timeline,
    pub origin: LyricsOrigin,
}

impl Resolution {
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            timeline: Timeline::empty(),
            origin: LyricsOrigin::None,
        }
    }
}

/// Decides which lyric source to use for a track
pub struct LyricsResolver {
    cache: LyricsCache,
    provider: Option<Box<dyn LyricsProvider>>,
    embedded: EmbeddedLyrics,
}

impl LyricsResolver {
    /// Create a resolver
    ///
    /// # Arguments
    /// * `cache` - Directory for fetched lyrics, also searched for earlier fetches
    /// * `provider` - Remote provider; `None` disables fetching
    pub fn new(cache: LyricsCache, provider: Option<Box<dyn LyricsProvider>>) -> Self {
        Self {
            cache,
            provider,
            embedded: EmbeddedLyrics::Ignore,
        }
    }

    /// Read lyrics from audio tags before probing files
    #[must_use]
    pub fn with_embedded_lyrics(mut self, embedded: EmbeddedLyrics) -> Self {
        self.embedded = embedded;
        self
    }

    #[must_use]
    pub const fn cache(&self) -> &LyricsCache {
        &self.cache
    }

    /// Local candidate files in lookup order, tagged with whether they are cache files.
    ///
    /// Sibling files (`<stem>.lrc`, `.a2`, `.txt`) are only listed when the
    /// player reported a file path; cache files only when there is a title.
    #[must_use]
    pub fn candidate_paths(&self, track: &TrackInfo) -> Vec<(PathBuf, bool)> {
        let mut paths = Vec::with_capacity(5);

        let audio = Path::new(&track.file_path);
        if let (Some(dir), Some(stem)) = (audio.parent(), audio.file_stem()) {
            if !track.file_path.is_empty() {
                for dialect in Dialect::ALL {
                    let mut name = stem.to_os_string();
                    name.push(".");
                    name.push(dialect.extension());
                    paths.push((dir.join(name), false));
                }
            }
        }

        if !track.title.is_empty() {
            for dialect in [Dialect::LineSynced, Dialect::WordSynced] {
                paths.push((self.cache.path_for(&track.title, &track.artist, dialect), true));
            }
        }

        paths
    }

    /// Resolve the timeline for a track. Never fails: every failure degrades
    /// to an empty timeline with [`LyricsOrigin::None`].
    pub async fn resolve(&self, track: &TrackInfo) -> Resolution {
        if track.is_empty() {
            return Resolution::not_found();
        }

        if let Some(resolution) = self.find_embedded(track).await {
            return resolution;
        }

        if let Some(resolution) = self.find_local(track).await {
            return resolution;
        }

        self.fetch_remote(track)
            .await
            .unwrap_or_else(Resolution::not_found)
    }

    async fn find_embedded(&self, track: &TrackInfo) -> Option<Resolution> {
        if self.embedded == EmbeddedLyrics::Ignore || track.file_path.is_empty() {
            return None;
        }

        let path = PathBuf::from(&track.file_path);
        let text = read_embedded_lyrics(&path).await?;
        let timeline = self.embedded.timeline(&text)?;
        info!(
            "Loaded embedded {} lyrics ({} lines) from {:?}",
            timeline.dialect(),
            timeline.len(),
            path
        );

        Some(Resolution {
            timeline,
            origin: LyricsOrigin::Embedded(path),
        })
    }

    async fn find_local(&self, track: &TrackInfo) -> Option<Resolution> {
        for (path, is_cache) in self.candidate_paths(track) {
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                continue;
            }

            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Cannot read lyrics file {:?}: {}", path, e);
                    continue;
                }
            };

            let timeline = Dialect::classify(Some(&path), &content).decode(&content);
            info!(
                "Loaded {} lyrics ({} lines) from {:?}",
                timeline.dialect(),
                timeline.len(),
                path
            );

            let origin = if is_cache {
                LyricsOrigin::Cache(path)
            } else {
                LyricsOrigin::Sibling(path)
            };
            return Some(Resolution { timeline, origin });
        }

        debug!("No local lyrics for {}", track.display_name());
        None
    }

    async fn fetch_remote(&self, track: &TrackInfo) -> Option<Resolution> {
        let provider = self.provider.as_ref()?;
        if track.title.is_empty() {
            debug!("Skipping lyrics fetch for track without a title");
            return None;
        }

        let query = LyricsQuery::for_track(track);
        info!(
            "Fetching lyrics for: {} - {} (provider: {})",
            query.artist_name,
            query.track_name,
            provider.name()
        );

        let fetched = match provider.fetch(&query).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Provider {} failed with error: {}", provider.name(), e);
                return None;
            }
        };

        let Some(text) = fetched.result.synced_text() else {
            match fetched.result {
                LyricsResult::Unsynced(_) => info!(
                    "Provider {} returned unsynced lyrics only, ignoring",
                    provider.name()
                ),
                LyricsResult::Instrumental => info!("Track is instrumental"),
                _ => info!("Provider {} returned no lyrics", provider.name()),
            }
            return None;
        };

        // Enhanced LRC with word markers is cached as `.a2`
        let dialect = Dialect::classify(None, text);
        if !dialect.is_synced() {
            info!(
                "Provider {} returned lyrics without timestamps, ignoring",
                provider.name()
            );
            return None;
        }

        if let Err(e) = self.cache.store(&track.title, &track.artist, dialect, text).await {
            warn!("Failed to cache lyrics: {}", e);
        }

        let timeline = dialect.decode(text);
        info!(
            "Found synced lyrics from {} ({} lines, provider_id: {})",
            provider.name(),
            timeline.len(),
            fetched.provider_id
        );

        Some(Resolution {
            timeline,
            origin: LyricsOrigin::Remote {
                provider: provider.name(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const LRC: &str = "[00:01.00]One\n[00:02.00]Two";

    struct Fixture {
        _dir: tempfile::TempDir,
        music: PathBuf,
        cache_dir: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let music = dir.path().join("music");
        let cache_dir = dir.path().join("cache");
        std::fs::create_dir_all(&music).unwrap();
        Fixture {
            music,
            cache_dir,
            _dir: dir,
        }
    }

    fn track(fx: &Fixture) -> TrackInfo {
        TrackInfo::new(
            fx.music.join("01 Song.flac").to_string_lossy(),
            "AC/DC",
            "Song?",
            200.0,
            0.0,
        )
    }

    fn resolver(fx: &Fixture, result: Option<LyricsResult>) -> (LyricsResolver, Arc<AtomicUsize>) {
        let (provider, calls) = FakeProvider::new(result);
        let cache = LyricsCache::open(&fx.cache_dir).unwrap();
        (LyricsResolver::new(cache, Some(Box::new(provider))), calls)
    }

    #[test]
    fn test_candidate_order() {
        let fx = fixture();
        let (resolver, _) = resolver(&fx, None);
        let names: Vec<_> = resolver
            .candidate_paths(&track(&fx))
            .into_iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "01 Song.lrc",
                "01 Song.a2",
                "01 Song.txt",
                "Song__AC_DC.lrc",
                "Song__AC_DC.a2"
            ]
        );
    }

    #[test]
    fn test_candidates_without_file_path() {
        let fx = fixture();
        let (resolver, _) = resolver(&fx, None);
        let stream = TrackInfo::new("", "Artist", "Title", 0.0, 0.0);
        let paths = resolver.candidate_paths(&stream);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|(_, is_cache)| *is_cache));
    }

    #[tokio::test]
    async fn test_sibling_lrc_wins_over_a2_and_never_fetches() {
        let fx = fixture();
        std::fs::write(fx.music.join("01 Song.lrc"), LRC).unwrap();
        std::fs::write(fx.music.join("01 Song.a2"), "<00:00.00>x<00:01.00>").unwrap();
        let (resolver, calls) = resolver(&fx, Some(LyricsResult::Synced(LRC.into())));

        let resolution = resolver.resolve(&track(&fx)).await;
        assert_eq!(resolution.origin, LyricsOrigin::Sibling(fx.music.join("01 Song.lrc")));
        assert_eq!(resolution.timeline.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_dir(&fx.cache_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_sibling_txt_is_unsynced() {
        let fx = fixture();
        std::fs::write(fx.music.join("01 Song.txt"), "verse one\n\nverse two").unwrap();
        let (resolver, _) = resolver(&fx, None);

        let resolution = resolver.resolve(&track(&fx)).await;
        assert_eq!(resolution.timeline.dialect(), Dialect::Unsynced);
        assert_eq!(resolution.timeline.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_hit() {
        let fx = fixture();
        let (resolver, calls) = resolver(&fx, None);
        let cached = resolver.cache().path_for("Song?", "AC/DC", Dialect::WordSynced);
        std::fs::write(&cached, "<00:00.00>Hi<00:01.00>there<00:02.00>").unwrap();

        let resolution = resolver.resolve(&track(&fx)).await;
        assert_eq!(resolution.origin, LyricsOrigin::Cache(cached));
        assert_eq!(resolution.timeline.entries()[0].words.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_fetch_is_cached() {
        let fx = fixture();
        let (resolver, calls) = resolver(&fx, Some(LyricsResult::Synced(LRC.into())));

        let resolution = resolver.resolve(&track(&fx)).await;
        assert_eq!(resolution.origin, LyricsOrigin::Remote { provider: "fake" });
        assert_eq!(resolution.timeline.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let cached = fx.cache_dir.join("Song__AC_DC.lrc");
        assert_eq!(std::fs::read_to_string(&cached).unwrap(), LRC);

        // The next resolution of the same track is a cache hit
        let again = resolver.resolve(&track(&fx)).await;
        assert_eq!(again.origin, LyricsOrigin::Cache(cached));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_no_lyrics() {
        let fx = fixture();
        let (resolver, calls) = resolver(&fx, None);

        let resolution = resolver.resolve(&track(&fx)).await;
        assert_eq!(resolution, Resolution::not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read_dir(&fx.cache_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unsynced_and_instrumental_results_are_not_used() {
        for result in [
            LyricsResult::Unsynced("words".into()),
            LyricsResult::Instrumental,
            LyricsResult::NotFound,
            LyricsResult::Synced("   ".into()),
        ] {
            let fx = fixture();
            let (resolver, _) = resolver(&fx, Some(result));
            let resolution = resolver.resolve(&track(&fx)).await;
            assert_eq!(resolution.origin, LyricsOrigin::None);
            assert_eq!(std::fs::read_dir(&fx.cache_dir).unwrap().count(), 0);
        }
    }

    #[tokio::test]
    async fn test_no_provider() {
        let fx = fixture();
        let resolver = LyricsResolver::new(LyricsCache::open(&fx.cache_dir).unwrap(), None);
        assert_eq!(resolver.resolve(&track(&fx)).await, Resolution::not_found());
    }

    #[tokio::test]
    async fn test_empty_track_does_not_fetch() {
        let fx = fixture();
        let (resolver, calls) = resolver(&fx, Some(LyricsResult::Synced(LRC.into())));
        assert_eq!(resolver.resolve(&TrackInfo::default()).await, Resolution::not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_sibling_falls_through() {
        let fx = fixture();
        // A directory where the .lrc should be cannot be read as text
        std::fs::create_dir(fx.music.join("01 Song.lrc")).unwrap();
        std::fs::write(fx.music.join("01 Song.a2"), "<00:00.00>Hi<00:01.00>there<00:02.00>")
            .unwrap();
        let (resolver, calls) = resolver(&fx, Some(LyricsResult::Synced(LRC.into())));

        let resolution = resolver.resolve(&track(&fx)).await;
        assert_eq!(resolution.origin, LyricsOrigin::Sibling(fx.music.join("01 Song.a2")));
        assert_eq!(resolution.timeline.dialect(), Dialect::WordSynced);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_decodes() {
        let fx = fixture();
        let (resolver, calls) = resolver(&fx, Some(LyricsResult::Synced(LRC.into())));
        std::fs::remove_dir_all(&fx.cache_dir).unwrap();

        let resolution = resolver.resolve(&track(&fx)).await;
        assert_eq!(resolution.origin, LyricsOrigin::Remote { provider: "fake" });
        assert_eq!(resolution.timeline.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!fx.cache_dir.exists());
    }

    #[tokio::test]
    async fn test_fetched_enhanced_lrc_is_cached_as_a2() {
        let fx = fixture();
        let enhanced = "[00:01.00]<00:01.00>Hi<00:02.00>there<00:03.00>";
        let (resolver, _) = resolver(&fx, Some(LyricsResult::Synced(enhanced.into())));

        let resolution = resolver.resolve(&track(&fx)).await;
        assert_eq!(resolution.timeline.dialect(), Dialect::WordSynced);
        assert_eq!(resolution.timeline.entries()[0].words.len(), 2);
        assert!(fx.cache_dir.join("Song__AC_DC.a2").is_file());

        let again = resolver.resolve(&track(&fx)).await;
        assert_eq!(again.origin, LyricsOrigin::Cache(fx.cache_dir.join("Song__AC_DC.a2")));
        assert_eq!(again.timeline, resolution.timeline);
    }

    #[tokio::test]
    async fn test_fetched_text_without_timestamps_is_not_cached() {
        let fx = fixture();
        let (resolver, _) = resolver(&fx, Some(LyricsResult::Synced("no tags here".into())));

        let resolution = resolver.resolve(&track(&fx)).await;
        assert_eq!(resolution, Resolution::not_found());
        assert_eq!(std::fs::read_dir(&fx.cache_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_untagged_audio_falls_through_to_sibling() {
        let fx = fixture();
        std::fs::write(fx.music.join("01 Song.flac"), "not audio").unwrap();
        std::fs::write(fx.music.join("01 Song.lrc"), LRC).unwrap();
        let (resolver, _) = resolver(&fx, None);
        let resolver = resolver.with_embedded_lyrics(EmbeddedLyrics::Any);

        let resolution = resolver.resolve(&track(&fx)).await;
        assert_eq!(resolution.origin, LyricsOrigin::Sibling(fx.music.join("01 Song.lrc")));
    }
}
