//! Lyrics stored in the audio file's own tags.

use crate::dialect::Dialect;
use crate::timeline::Timeline;
use lofty::file::TaggedFileExt;
use lofty::tag::ItemKey;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which embedded lyrics the resolver accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddedLyrics {
    /// Never read audio tags
    #[default]
    Ignore,
    /// Use embedded lyrics only when they carry timestamps
    SyncedOnly,
    /// Use embedded lyrics, synced or plain
    Any,
}

impl EmbeddedLyrics {
    /// Decode embedded text under this policy.
    ///
    /// The dialect is sniffed from the content, since tags carry no extension.
    #[must_use]
    pub fn timeline(self, text: &str) -> Option<Timeline> {
        if self == Self::Ignore || text.trim().is_empty() {
            return None;
        }
        let dialect = Dialect::classify(None, text);
        if !dialect.is_synced() && self == Self::SyncedOnly {
            debug!("Skipping embedded plain text lyrics");
            return None;
        }
        Some(dialect.decode(text))
    }
}

/// Read the lyrics tag (ID3 `USLT`, Vorbis `LYRICS`, MP4 `©lyr`) of an audio file.
///
/// Files lofty cannot open and files without a lyrics tag give `None`.
pub async fn read_embedded_lyrics(path: &Path) -> Option<String> {
    let owned: PathBuf = path.to_path_buf();
    match tokio::task::spawn_blocking(move || read_lyrics_tag(&owned)).await {
        Ok(text) => text,
        Err(e) => {
            debug!("Tag reader task failed for {:?}: {}", path, e);
            None
        }
    }
}

fn read_lyrics_tag(path: &Path) -> Option<String> {
    let tagged = match lofty::read_from_path(path) {
        Ok(tagged) => tagged,
        Err(e) => {
            debug!("No readable tags in {:?}: {}", path, e);
            return None;
        }
    };

    tagged
        .primary_tag()
        .into_iter()
        .chain(tagged.tags())
        .find_map(|tag| tag.get_string(&ItemKey::Lyrics))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_ignore() {
        assert!(EmbeddedLyrics::Ignore.timeline("[00:01.00]Hi").is_none());
    }

    #[test]
    fn test_synced_only_skips_plain_text() {
        assert!(EmbeddedLyrics::SyncedOnly.timeline("just words").is_none());

        let timeline = EmbeddedLyrics::SyncedOnly
            .timeline("[00:01.00]Hi\n[00:02.00]There")
            .unwrap();
        assert_eq!(timeline.dialect(), Dialect::LineSynced);
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_any_accepts_plain_text() {
        let timeline = EmbeddedLyrics::Any.timeline("first\nsecond").unwrap();
        assert_eq!(timeline.dialect(), Dialect::Unsynced);
        assert_eq!(timeline.len(), 2);
        assert!(EmbeddedLyrics::Any.timeline("  \n ").is_none());
    }

    #[test]
    fn test_word_synced_tag_content() {
        let timeline = EmbeddedLyrics::SyncedOnly
            .timeline("<00:00.00>Hi<00:01.00>there<00:02.00>")
            .unwrap();
        assert_eq!(timeline.dialect(), Dialect::WordSynced);
        assert_eq!(timeline.entries()[0].words.len(), 2);
    }

    #[tokio::test]
    async fn test_non_audio_file_has_no_embedded_lyrics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.flac");
        std::fs::write(&path, "not really flac").unwrap();
        assert_eq!(read_embedded_lyrics(&path).await, None);
        assert_eq!(read_embedded_lyrics(&dir.path().join("missing.mp3")).await, None);
    }
}
