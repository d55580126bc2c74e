//! MPD backend, speaking the line-based MPD protocol over TCP.
//!
//! One query is one short connection:
//!
//! ```text
//! <- OK MPD 0.23.5
//! -> password "secret"        (only when configured)
//! <- OK
//! -> status
//! <- state: play
//! <- elapsed: 61.532
//! <- duration: 245.000
//! <- OK
//! -> currentsong
//! <- file: Band/01 Song.flac
//! <- Artist: Band
//! <- Title: Song
//! <- OK
//! -> close
//! ```

use crate::error::{PlayerError, Result};
use async_trait::async_trait;
use lyrisync_core::{MpdConfig, MusicSource, PlaybackStatus, PlayerQuery, TrackInfo};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

const PROGRAM: &str = "mpd";

const GREETING: &str = "OK MPD ";

type Pairs = Vec<(String, String)>;

/// Queries an MPD server
#[derive(Debug, Clone)]
pub struct MpdPlayer {
    host: String,
    port: u16,
    password: Option<String>,
    music_dir: Option<PathBuf>,
    timeout: Duration,
}

impl MpdPlayer {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            password: None,
            music_dir: None,
            timeout: Duration::from_secs(1),
        }
    }

    /// Build from the `[player.mpd]` config section, environment fallbacks included
    #[must_use]
    pub fn from_config(config: &MpdConfig) -> Self {
        Self {
            host: config.host(),
            port: config.port(),
            password: config.password(),
            music_dir: config.music_dir.clone(),
            timeout: config.timeout(),
        }
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Song URIs are resolved against this directory
    #[must_use]
    pub fn with_music_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.music_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn exchange(&self) -> Result<(Pairs, Pairs)> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        let greeting = lines.next_line().await?.unwrap_or_default();
        if !greeting.starts_with(GREETING) {
            return Err(PlayerError::InvalidOutput {
                program: PROGRAM,
                reason: format!("unexpected greeting {greeting:?}"),
            });
        }

        if let Some(password) = &self.password {
            request(&mut writer, &mut lines, &format!("password {}", quote(password))).await?;
        }
        let status = request(&mut writer, &mut lines, "status").await?;
        let song = request(&mut writer, &mut lines, "currentsong").await?;

        // The server drops the connection on `close`; nothing to read
        let _ = writer.write_all(b"close\n").await;
        Ok((status, song))
    }
}

#[async_trait]
impl PlayerQuery for MpdPlayer {
    fn source(&self) -> MusicSource {
        MusicSource::Mpd
    }

    async fn query(&self) -> lyrisync_core::Result<TrackInfo> {
        let (status, song) = tokio::time::timeout(self.timeout, self.exchange())
            .await
            .map_err(|_| PlayerError::TimedOut { program: PROGRAM })??;
        let track = parse_reply(&status, &song, self.music_dir.as_deref());
        debug!(
            "mpd: {:?} {} at {:.1}s",
            track.status,
            track.display_name(),
            track.position_seconds
        );
        Ok(track)
    }
}

/// Send one command and collect its `key: value` reply up to the final `OK`
async fn request(
    writer: &mut OwnedWriteHalf,
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    command: &str,
) -> Result<Pairs> {
    writer.write_all(format!("{command}\n").as_bytes()).await?;

    let mut pairs = Vec::new();
    loop {
        let Some(line) = lines.next_line().await? else {
            return Err(PlayerError::Io(std::io::ErrorKind::UnexpectedEof.into()));
        };
        if line == "OK" {
            return Ok(pairs);
        }
        if let Some(message) = line.strip_prefix("ACK ") {
            return Err(PlayerError::Rejected {
                program: PROGRAM,
                message: message.to_string(),
            });
        }
        if let Some((key, value)) = line.split_once(": ") {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
}

/// Quote an argument for the MPD protocol
fn quote(arg: &str) -> String {
    let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn values<'a>(pairs: &'a [(String, String)], key: &'a str) -> impl Iterator<Item = &'a str> {
    pairs
        .iter()
        .filter(move |(k, _)| k == key)
        .map(|(_, v)| v.trim())
}

fn first<'a>(pairs: &'a [(String, String)], key: &'a str) -> Option<&'a str> {
    values(pairs, key).next()
}

fn seconds(value: Option<&str>) -> Option<f64> {
    value?.parse::<f64>().ok().filter(|s| s.is_finite() && *s >= 0.0)
}

/// Build a snapshot from the `status` and `currentsong` replies.
///
/// Multiple `Artist` values are joined with `, `. Song URIs are joined onto
/// `music_dir` when one is given; remote URIs (`http://...`) are kept as is.
#[must_use]
pub fn parse_reply(
    status: &[(String, String)],
    song: &[(String, String)],
    music_dir: Option<&Path>,
) -> TrackInfo {
    let mut track = TrackInfo::default();
    let Some(uri) = first(song, "file") else {
        return track;
    };

    track.file_path = match music_dir {
        Some(dir) if !uri.contains("://") => dir.join(uri).to_string_lossy().into_owned(),
        _ => uri.to_string(),
    };
    track.artist = values(song, "Artist")
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    track.title = first(song, "Title").unwrap_or_default().to_string();

    track.status = match first(status, "state") {
        Some("play") => PlaybackStatus::Playing,
        Some("pause") => PlaybackStatus::Paused,
        _ => PlaybackStatus::Stopped,
    };
    track.position_seconds = seconds(first(status, "elapsed")).unwrap_or(0.0);
    // Older servers only send `time: <elapsed>:<total>`
    track.duration_seconds = seconds(first(status, "duration"))
        .or_else(|| seconds(first(status, "time").and_then(|t| t.split(':').nth(1))))
        .or_else(|| seconds(first(song, "duration")))
        .unwrap_or(0.0);
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn pairs(text: &str) -> Pairs {
        text.lines()
            .filter_map(|l| l.split_once(": "))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const STATUS: &str = "volume: 80\nstate: play\nelapsed: 61.532\nduration: 245.000\n";
    const SONG: &str = "file: Band/01 Song.flac\nArtist: Band\nArtist: Guest\nTitle: Song\n";

    #[test]
    fn test_parse_playing() {
        let track = parse_reply(&pairs(STATUS), &pairs(SONG), Some(Path::new("/srv/music")));
        assert_eq!(track.file_path, "/srv/music/Band/01 Song.flac");
        assert_eq!(track.artist, "Band, Guest");
        assert_eq!(track.title, "Song");
        assert_eq!(track.status, PlaybackStatus::Playing);
        assert!((track.position_seconds - 61.532).abs() < 1e-9);
        assert!((track.duration_seconds - 245.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_without_music_dir_and_legacy_time() {
        let status = pairs("state: pause\nelapsed: 3.0\ntime: 3:180\n");
        let track = parse_reply(&status, &pairs(SONG), None);
        assert_eq!(track.file_path, "Band/01 Song.flac");
        assert_eq!(track.status, PlaybackStatus::Paused);
        assert!((track.duration_seconds - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_stream_keeps_uri() {
        let song = pairs("file: http://radio.example/stream\nTitle: Live\n");
        let track = parse_reply(&pairs("state: play\n"), &song, Some(Path::new("/srv/music")));
        assert_eq!(track.file_path, "http://radio.example/stream");
        assert!(track.artist.is_empty());
    }

    #[test]
    fn test_parse_nothing_queued() {
        let track = parse_reply(&pairs("state: stop\n"), &[], None);
        assert!(track.is_empty());
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(r#"pa"ss\word"#), r#""pa\"ss\\word""#);
    }

    /// Serve one connection, answering each command from `replies` in order
    async fn serve(replies: Vec<&'static str>) -> (u16, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();
            writer.write_all(b"OK MPD 0.23.5\n").await.unwrap();

            let mut commands = Vec::new();
            for reply in replies {
                let Some(command) = lines.next_line().await.unwrap() else {
                    break;
                };
                commands.push(command);
                writer.write_all(reply.as_bytes()).await.unwrap();
            }
            commands
        });
        (port, handle)
    }

    #[tokio::test]
    async fn test_query_over_tcp() {
        let (port, server) = serve(vec![
            "OK\n",
            "state: play\nelapsed: 12.5\nduration: 200.0\nOK\n",
            "file: a.flac\nArtist: Band\nTitle: Song\nOK\n",
        ])
        .await;

        let player = MpdPlayer::new("127.0.0.1", port)
            .with_password("pw")
            .with_music_dir("/music");
        let track = player.query().await.unwrap();
        assert_eq!(track.file_path, "/music/a.flac");
        assert_eq!(track.title, "Song");
        assert!((track.position_seconds - 12.5).abs() < f64::EPSILON);

        let commands = server.await.unwrap();
        assert_eq!(commands, vec!["password \"pw\"", "status", "currentsong"]);
    }

    #[tokio::test]
    async fn test_rejected_password() {
        let (port, _server) = serve(vec!["ACK [3@0] {password} incorrect password\n"]).await;
        let player = MpdPlayer::new("127.0.0.1", port).with_password("wrong");
        assert!(matches!(
            player.exchange().await,
            Err(PlayerError::Rejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let player = MpdPlayer::new("127.0.0.1", port).with_timeout(Duration::from_millis(50));
        let err = player.query().await.unwrap_err();
        assert!(matches!(err, lyrisync_core::CoreError::PlayerUnavailable { .. }));
    }
}
