pub mod cache;
pub mod config;
pub mod dialect;
pub mod embedded;
pub mod error;
pub mod monitor;
pub mod paths;
pub mod playback;
pub mod provider;
pub mod resolver;
pub mod scroll;
pub mod session;
pub mod source;
pub mod sync;
pub mod time;
pub mod timeline;

#[cfg(test)]
mod testing;

pub use cache::{sanitize_filename, LyricsCache};
pub use config::{
    Alignment, LoggingConfig, LyricsConfig, LyricsProviderType, LyrisyncConfig, MpdConfig,
    PlayerConfig, SyncConfig, UiConfig, CONFIG_TEMPLATE,
};
pub use dialect::Dialect;
pub use embedded::EmbeddedLyrics;
pub use error::{CoreError, Result};
pub use monitor::TrackMonitor;
pub use paths::{
    config_dir, config_path, log_file_path, lyrics_cache_dir, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    LOG_FILE_NAME, LYRICS_CACHE_DIR_NAME,
};
pub use playback::{PlaybackStatus, TrackInfo};
pub use provider::{FetchedLyrics, LyricsProvider, LyricsQuery, LyricsResult};
pub use resolver::{LyricsOrigin, LyricsResolver, Resolution};
pub use scroll::{ScrollState, ScrollWindow};
pub use session::Session;
pub use source::{MusicSource, PlayerQuery};
pub use sync::{LyricsStatus, RenderFrame, SyncEngine, UserCommand};
pub use time::{format_clock, parse_timestamp};
pub use timeline::{Timeline, TimelineEntry, WordSpan};
