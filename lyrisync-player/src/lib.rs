pub mod cmus;
mod command;
pub mod error;
pub mod mpd;
pub mod playerctl;

pub use cmus::CmusPlayer;
pub use error::PlayerError;
pub use mpd::MpdPlayer;
pub use playerctl::PlayerctlPlayer;

use lyrisync_core::{MusicSource, PlayerConfig, PlayerQuery};

/// Create the backend for the configured music source
#[must_use]
pub fn player_for(config: &PlayerConfig) -> Box<dyn PlayerQuery> {
    match config.source {
        MusicSource::Cmus => Box::new(CmusPlayer::new()),
        MusicSource::Playerctl => match &config.name {
            Some(name) => Box::new(PlayerctlPlayer::for_player(name.as_str())),
            None => Box::new(PlayerctlPlayer::new()),
        },
        MusicSource::Mpd => Box::new(MpdPlayer::from_config(&config.mpd)),
    }
}
