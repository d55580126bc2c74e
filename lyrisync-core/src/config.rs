use crate::embedded::EmbeddedLyrics;
use crate::error::{CoreError, Result};
use crate::source::MusicSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyrisyncConfig {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub lyrics: LyricsConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Which player to follow
    #[serde(default)]
    pub source: MusicSource,
    /// Tick interval: how often the player is polled and the view redrawn
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Upper bound for one player query
    #[serde(default = "default_query_timeout")]
    pub query_timeout_ms: u64,
    /// MPRIS player name passed to `playerctl --player`; any player when unset
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mpd: MpdConfig,
}

const fn default_poll_interval() -> u64 {
    100
}

const fn default_query_timeout() -> u64 {
    1000
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            source: MusicSource::default(),
            poll_interval_ms: default_poll_interval(),
            query_timeout_ms: default_query_timeout(),
            name: None,
            mpd: MpdConfig::default(),
        }
    }
}

const DEFAULT_MPD_HOST: &str = "localhost";
const DEFAULT_MPD_PORT: u16 = 6600;

/// Connection to an MPD server.
///
/// Unset values fall back to `$MPD_HOST`, `$MPD_PORT` and `$MPD_PASSWORD`,
/// then to `localhost:6600` without a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpdConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub password: Option<String>,
    /// Connect and reply timeout
    #[serde(default = "default_mpd_timeout")]
    pub timeout_ms: u64,
    /// MPD's `music_directory`; song URIs are relative to it
    #[serde(default)]
    pub music_dir: Option<PathBuf>,
}

const fn default_mpd_timeout() -> u64 {
    1000
}

impl Default for MpdConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            password: None,
            timeout_ms: default_mpd_timeout(),
            music_dir: None,
        }
    }
}

impl MpdConfig {
    #[must_use]
    pub fn host(&self) -> String {
        self.host
            .clone()
            .or_else(|| std::env::var("MPD_HOST").ok())
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MPD_HOST.to_string())
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
            .or_else(|| std::env::var("MPD_PORT").ok()?.trim().parse().ok())
            .unwrap_or(DEFAULT_MPD_PORT)
    }

    #[must_use]
    pub fn password(&self) -> Option<String> {
        self.password
            .clone()
            .or_else(|| std::env::var("MPD_PASSWORD").ok())
            .filter(|password| !password.is_empty())
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsConfig {
    /// Fetch lyrics online when no local file exists
    #[serde(default = "default_true")]
    pub fetch_enabled: bool,
    #[serde(default)]
    pub provider: LyricsProviderType,
    /// Override for the fetched lyrics directory
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Read lyrics from the audio file's tags before looking for files
    #[serde(default = "default_true")]
    pub read_embedded: bool,
    /// Ignore embedded lyrics that have no timestamps
    #[serde(default = "default_true")]
    pub skip_embedded_txt: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            fetch_enabled: true,
            provider: LyricsProviderType::default(),
            cache_dir: None,
            read_embedded: true,
            skip_embedded_txt: true,
        }
    }
}

impl LyricsConfig {
    /// The configured cache directory, or the default one
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(crate::paths::lyrics_cache_dir)
    }

    /// Embedded lyrics policy for the resolver
    #[must_use]
    pub const fn embedded_lyrics(&self) -> EmbeddedLyrics {
        match (self.read_embedded, self.skip_embedded_txt) {
            (false, _) => EmbeddedLyrics::Ignore,
            (true, true) => EmbeddedLyrics::SyncedOnly,
            (true, false) => EmbeddedLyrics::Any,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LyricsProviderType {
    #[default]
    Lrclib,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    /// Next alignment in the left → center → right cycle
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Left => Self::Center,
            Self::Center => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default = "default_active_color")]
    pub active_color: String,
    #[serde(default = "default_inactive_color")]
    pub inactive_color: String,
    /// Seconds without scroll input before manual scroll reverts to follow mode (0 = never)
    #[serde(default = "default_scroll_timeout")]
    pub scroll_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub show_status: bool,
    /// Wrap lines wider than the terminal instead of cutting them off
    #[serde(default = "default_true")]
    pub wrap: bool,
}

fn default_active_color() -> String {
    "#00FF5F".to_string()
}

fn default_inactive_color() -> String {
    "#BCBCBC".to_string()
}

const fn default_scroll_timeout() -> u64 {
    4
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            alignment: Alignment::default(),
            active_color: default_active_color(),
            inactive_color: default_inactive_color(),
            scroll_timeout_secs: default_scroll_timeout(),
            show_status: true,
            wrap: true,
        }
    }
}

impl UiConfig {
    /// Auto-revert delay for manual scrolling, `None` when disabled
    #[must_use]
    pub const fn scroll_timeout(&self) -> Option<Duration> {
        if self.scroll_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.scroll_timeout_secs))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Small sync offset nudge
    #[serde(default = "default_offset_step")]
    pub offset_step_ms: i64,
    /// Large sync offset nudge
    #[serde(default = "default_offset_jump")]
    pub offset_jump_ms: i64,
}

const fn default_offset_step() -> i64 {
    100
}

const fn default_offset_jump() -> i64 {
    1000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            offset_step_ms: default_offset_step(),
            offset_jump_ms: default_offset_jump(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to ~/.config/lyrisync/lyrisync.log
    #[serde(default)]
    pub enabled: bool,
}

impl LyrisyncConfig {
    /// Get the config file path (~/.config/lyrisync/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default path, writing a template on first run.
    ///
    /// A missing file is not an error: the template is written and the
    /// defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, written or parsed,
    /// or if a value is out of range.
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&config_path, CONFIG_TEMPLATE)?;
            info!("Wrote config template to {:?}", config_path);
            return Ok(Self::default());
        }

        Self::load(&config_path)
    }

    /// Load and validate config from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value is out of range.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|source| CoreError::ConfigParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.player.poll_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "player.poll_interval_ms must be greater than 0".into(),
            });
        }
        if self.player.query_timeout_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "player.query_timeout_ms must be greater than 0".into(),
            });
        }
        if self.player.mpd.timeout_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "player.mpd.timeout_ms must be greater than 0".into(),
            });
        }
        for (field, value) in [
            ("ui.active_color", &self.ui.active_color),
            ("ui.inactive_color", &self.ui.inactive_color),
        ] {
            if Self::parse_color(value).is_none() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("{field} must be a #RRGGBB color, got {value:?}"),
                });
            }
        }
        Ok(())
    }

    /// Player tick interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.player.poll_interval_ms)
    }

    /// Upper bound for one player query
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.player.query_timeout_ms)
    }

    /// Parse a hex color string to an RGB tuple
    #[must_use]
    pub fn parse_color(hex: &str) -> Option<(u8, u8, u8)> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }
}

pub const CONFIG_TEMPLATE: &str = r##"# lyrisync configuration
# ~/.config/lyrisync/config.toml

[player]
# Player to follow: "cmus", "mpd" or "playerctl" (any MPRIS player)
source = "cmus"
# How often the player is polled and the lyrics redrawn
poll_interval_ms = 100
query_timeout_ms = 1000
# playerctl only: follow this MPRIS player instead of the active one
# name = "spotify"

[player.mpd]
# Unset values fall back to $MPD_HOST, $MPD_PORT, $MPD_PASSWORD
# host = "localhost"
# port = 6600
# password = "secret"
timeout_ms = 1000
# MPD's music_directory, needed to find .lrc files next to songs
# music_dir = "/home/me/Music"

[lyrics]
# Fetch from LRCLIB when no local .lrc/.a2/.txt file exists
fetch_enabled = true
provider = "lrclib"
# Where fetched lyrics are stored (default: ~/.config/lyrisync/synced_lyrics)
# cache_dir = "/path/to/synced_lyrics"
# Read lyrics embedded in the audio file's tags first
read_embedded = true
# Ignore embedded lyrics without timestamps
skip_embedded_txt = true

[ui]
alignment = "center"  # "left", "center", "right"
active_color = "#00FF5F"
inactive_color = "#BCBCBC"
# Seconds without scrolling before the view follows playback again (0 = never)
scroll_timeout_secs = 4
show_status = true
# Wrap long lines (by display width) instead of cutting them off
wrap = true

[sync]
# Sync offset nudges for the +/- and [/] keys
offset_step_ms = 100
offset_jump_ms = 1000

[logging]
# Write logs to ~/.config/lyrisync/lyrisync.log (RUST_LOG sets the level)
enabled = false
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_matches_defaults() {
        let parsed: LyrisyncConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(parsed, LyrisyncConfig::default());
        parsed.validate().unwrap();
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let parsed: LyrisyncConfig = toml::from_str("").unwrap();
        assert_eq!(parsed.player.poll_interval_ms, 100);
        assert_eq!(parsed.ui.scroll_timeout(), Some(Duration::from_secs(4)));
        assert!(parsed.lyrics.fetch_enabled);
    }

    #[test]
    fn test_partial_override() {
        let parsed: LyrisyncConfig = toml::from_str(
            r#"
[player]
source = "playerctl"

[ui]
alignment = "left"
scroll_timeout_secs = 0
"#,
        )
        .unwrap();
        assert_eq!(parsed.player.source, MusicSource::Playerctl);
        assert_eq!(parsed.player.poll_interval_ms, 100);
        assert_eq!(parsed.ui.alignment, Alignment::Left);
        assert_eq!(parsed.ui.scroll_timeout(), None);
    }

    #[test]
    fn test_load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[player\nsource = ").unwrap();
        match LyrisyncConfig::load(&path) {
            Err(CoreError::ConfigParseError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_zero_interval_and_bad_colors() {
        let mut config = LyrisyncConfig::default();
        config.player.poll_interval_ms = 0;
        assert!(matches!(config.validate(), Err(CoreError::ConfigInvalid { .. })));

        let mut config = LyrisyncConfig::default();
        config.ui.active_color = "green".into();
        assert!(matches!(config.validate(), Err(CoreError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_player_and_embedded_settings() {
        let parsed: LyrisyncConfig = toml::from_str(
            r#"
[player]
source = "mpd"
name = "mpv"

[player.mpd]
host = "music.local"
port = 6601
password = "pw"
music_dir = "/srv/music"

[lyrics]
skip_embedded_txt = false
"#,
        )
        .unwrap();
        assert_eq!(parsed.player.source, MusicSource::Mpd);
        assert_eq!(parsed.player.name.as_deref(), Some("mpv"));
        assert_eq!(parsed.player.mpd.host(), "music.local");
        assert_eq!(parsed.player.mpd.port(), 6601);
        assert_eq!(parsed.player.mpd.password().as_deref(), Some("pw"));
        assert_eq!(parsed.player.mpd.timeout(), Duration::from_secs(1));
        assert_eq!(parsed.lyrics.embedded_lyrics(), EmbeddedLyrics::Any);
        assert_eq!(LyricsConfig::default().embedded_lyrics(), EmbeddedLyrics::SyncedOnly);

        let mut lyrics = LyricsConfig::default();
        lyrics.read_embedded = false;
        assert_eq!(lyrics.embedded_lyrics(), EmbeddedLyrics::Ignore);
    }

    #[test]
    fn test_validate_rejects_zero_mpd_timeout() {
        let mut config = LyrisyncConfig::default();
        config.player.mpd.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(CoreError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(LyrisyncConfig::parse_color("#00FF5F"), Some((0, 255, 95)));
        assert_eq!(LyrisyncConfig::parse_color("bcbcbc"), Some((188, 188, 188)));
        assert_eq!(LyrisyncConfig::parse_color("#fff"), None);
        assert_eq!(LyrisyncConfig::parse_color("#GG0000"), None);
    }

    #[test]
    fn test_alignment_cycle() {
        assert_eq!(Alignment::Left.next(), Alignment::Center);
        assert_eq!(Alignment::Center.next(), Alignment::Right);
        assert_eq!(Alignment::Right.next(), Alignment::Left);
    }

    #[test]
    fn test_cache_dir_override() {
        let mut lyrics = LyricsConfig::default();
        assert!(lyrics.cache_dir().ends_with("synced_lyrics"));
        lyrics.cache_dir = Some(PathBuf::from("/tmp/elsewhere"));
        assert_eq!(lyrics.cache_dir(), PathBuf::from("/tmp/elsewhere"));
    }
}
