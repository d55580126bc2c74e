//! Path constants for configuration, cache and log files.

use std::path::PathBuf;

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "lyrisync";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the fetched lyrics directory
pub const LYRICS_CACHE_DIR_NAME: &str = "synced_lyrics";

/// The name of the log file written when file logging is enabled
pub const LOG_FILE_NAME: &str = "lyrisync.log";

/// Get the configuration directory path (~/.config/lyrisync/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (~/.config/lyrisync/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the default lyrics cache directory (`~/.config/lyrisync/synced_lyrics`)
#[must_use]
pub fn lyrics_cache_dir() -> PathBuf {
    config_dir().join(LYRICS_CACHE_DIR_NAME)
}

/// Get the log file path (`~/.config/lyrisync/lyrisync.log`)
#[must_use]
pub fn log_file_path() -> PathBuf {
    config_dir().join(LOG_FILE_NAME)
}
