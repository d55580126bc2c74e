use crate::dialect::Dialect;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Characters that are not allowed in cache file names
const ILLEGAL_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace characters that are illegal in file names with `_`
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Plain-file lyrics cache.
///
/// Fetched lyrics are stored as `<title>_<artist>.lrc` inside one directory,
/// with both name parts passed through [`sanitize_filename`].
#[derive(Debug, Clone)]
pub struct LyricsCache {
    dir: PathBuf,
}

impl LyricsCache {
    /// Open the cache directory, creating it if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path) -> Result<Self> {
        info!("Opening lyrics cache directory at {:?}", dir);
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file stem for a track: `<sanitized title>_<sanitized artist>`
    #[must_use]
    pub fn stem(title: &str, artist: &str) -> String {
        format!("{}_{}", sanitize_filename(title), sanitize_filename(artist))
    }

    /// Path of the cache file for a track in the given dialect
    #[must_use]
    pub fn path_for(&self, title: &str, artist: &str, dialect: Dialect) -> PathBuf {
        self.dir
            .join(format!("{}.{}", Self::stem(title, artist), dialect.extension()))
    }

    /// Write fetched lyrics for a track, returning the file written
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn store(
        &self,
        title: &str,
        artist: &str,
        dialect: Dialect,
        content: &str,
    ) -> Result<PathBuf> {
        let path = self.path_for(title, artist, dialect);
        tokio::fs::write(&path, content).await?;
        debug!("Cached lyrics for {} - {} at {:?}", artist, title, path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("AC/DC"), "AC_DC");
        assert_eq!(sanitize_filename("Plain Name"), "Plain Name");
    }

    #[test]
    fn test_path_for() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LyricsCache::open(dir.path()).unwrap();
        assert_eq!(
            cache.path_for("What?", "AC/DC", Dialect::WordSynced),
            dir.path().join("What__AC_DC.a2")
        );
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state").join("synced_lyrics");
        let cache = LyricsCache::open(&nested).unwrap();
        assert!(cache.dir().is_dir());
    }

    #[tokio::test]
    async fn test_store_writes_lrc_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LyricsCache::open(dir.path()).unwrap();
        let path = cache
            .store("Song", "Artist", Dialect::LineSynced, "[00:01.00]Hi")
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("Song_Artist.lrc"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[00:01.00]Hi");
    }
}
