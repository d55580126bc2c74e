//! Lyric file dialects and their decoders.
//!
//! Three dialects are understood:
//!
//! - line-synced LRC: `[mm:ss.xx]text`, possibly several tags per line
//! - word-synced A2 (enhanced LRC): `<mm:ss.xx>word<mm:ss.xx>word<mm:ss.xx>`
//! - unsynced plain text, one lyric line per text line
//!
//! Decoding never fails as a whole. A line with a malformed timestamp is
//! logged and skipped, every other line still makes it into the timeline.

use crate::error::Result;
use crate::time::{millis_to_secs, parse_timestamp};
use crate::timeline::{Timeline, TimelineEntry, WordSpan};
use std::path::Path;
use tracing::debug;

/// Lyric file dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// `.lrc`: one timestamp tag per displayed line
    LineSynced,
    /// `.a2`: a timestamp before and after every word
    WordSynced,
    /// `.txt`: no timing at all
    #[default]
    Unsynced,
}

impl Dialect {
    /// All dialects, in local lookup order.
    pub const ALL: [Self; 3] = [Self::LineSynced, Self::WordSynced, Self::Unsynced];

    /// File extension (without the dot) used for this dialect
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::LineSynced => "lrc",
            Self::WordSynced => "a2",
            Self::Unsynced => "txt",
        }
    }

    /// Map a file extension to its dialect (case-insensitive)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| ext.eq_ignore_ascii_case(d.extension()))
    }

    #[must_use]
    pub const fn is_synced(self) -> bool {
        !matches!(self, Self::Unsynced)
    }

    /// Pick the dialect for a lyric file.
    ///
    /// A recognized extension decides; otherwise the content is sniffed.
    #[must_use]
    pub fn classify(path: Option<&Path>, content: &str) -> Self {
        path.and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or_else(|| Self::sniff(content))
    }

    /// Guess the dialect from content alone.
    ///
    /// Any `<mm:ss.xx>` word marker means word-synced; otherwise any line that
    /// starts with a `[mm:ss.xx]` tag means line-synced.
    fn sniff(content: &str) -> Self {
        let mut line_synced = false;
        for line in content.lines().map(str::trim) {
            if has_word_marker(line) {
                return Self::WordSynced;
            }
            if !line_synced && matches!(parse_line_tags(line), Ok(Some(_))) {
                line_synced = true;
            }
        }
        if line_synced {
            Self::LineSynced
        } else {
            Self::Unsynced
        }
    }

    /// Decode raw lyric text into a timeline
    #[must_use]
    pub fn decode(self, input: &str) -> Timeline {
        let entries = match self {
            Self::LineSynced => decode_line_synced(input),
            Self::WordSynced => decode_word_synced(input),
            Self::Unsynced => decode_unsynced(input),
        };

        let mut timeline = Timeline::new(self, entries);
        if self.is_synced() {
            timeline.sort_by_time();
            timeline.shift(offset_tag(input));
        }
        timeline
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

fn non_empty_lines(input: &str) -> impl Iterator<Item = &str> {
    input.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn decode_line_synced(input: &str) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();

    for line in non_empty_lines(input) {
        if parse_id_tag(line).is_some() {
            continue;
        }

        match parse_line_tags(line) {
            Ok(Some((stamps, text))) => {
                // Enhanced LRC: word markers inside a line-synced file
                let (text, words) = match parse_word_markers(text) {
                    Ok(Some((_, joined, words))) => (joined, words),
                    _ => (text.to_string(), Vec::new()),
                };
                for timestamp in stamps {
                    entries.push(
                        TimelineEntry::new(timestamp, text.clone()).with_words(words.clone()),
                    );
                }
            }
            Ok(None) => {}
            Err(e) => debug!("Skipping lyric line {:?}: {}", line, e),
        }
    }

    entries
}

fn decode_word_synced(input: &str) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();

    for line in non_empty_lines(input) {
        // A leading line tag is allowed; the first word marker is the line time.
        let body = match parse_line_tags(line) {
            Ok(Some((_, rest))) => rest,
            _ => line,
        };

        match parse_word_markers(body) {
            Ok(Some((timestamp, text, words))) => {
                entries.push(TimelineEntry::new(timestamp, text).with_words(words));
            }
            Ok(None) => {}
            Err(e) => debug!("Skipping word-synced line {:?}: {}", line, e),
        }
    }

    entries
}

fn decode_unsynced(input: &str) -> Vec<TimelineEntry> {
    non_empty_lines(input)
        .map(|line| TimelineEntry::new(0.0, line))
        .collect()
}

/// Parse an ID tag like `[ti:Title]` or `[offset:+500]`
fn parse_id_tag(line: &str) -> Option<(&str, &str)> {
    let content = line.strip_prefix('[')?;
    let end = content.find(']')?;
    let (tag, value) = content[..end].split_once(':')?;

    // A numeric tag part is a timestamp, not an ID tag
    if tag.is_empty() || tag.trim().chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some((tag.trim(), value.trim()))
}

/// The `[offset:ms]` tag of a file converted to a timeline shift in seconds.
///
/// A positive LRC offset means lyrics should appear sooner.
fn offset_tag(input: &str) -> f64 {
    non_empty_lines(input)
        .filter_map(parse_id_tag)
        .find(|(tag, _)| tag.eq_ignore_ascii_case("offset"))
        .and_then(|(_, value)| value.trim_start_matches('+').parse::<i64>().ok())
        .map_or(0.0, |ms| -millis_to_secs(ms))
}

/// Split the leading `[mm:ss.xx]` tags off a line.
///
/// `Ok(None)` when the line does not start with a tag. An error when the first
/// tag is not a valid timestamp; a bad tag after valid ones ends the tag list
/// and becomes part of the text.
fn parse_line_tags(line: &str) -> Result<Option<(Vec<f64>, &str)>> {
    let mut remaining = line;
    let mut stamps = Vec::new();

    while let Some(rest) = remaining.strip_prefix('[') {
        let Some(end) = rest.find(']') else {
            break;
        };
        match parse_timestamp(&rest[..end]) {
            Ok(timestamp) => {
                stamps.push(timestamp);
                remaining = &rest[end + 1..];
            }
            Err(e) if stamps.is_empty() => return Err(e),
            Err(_) => break,
        }
    }

    if stamps.is_empty() {
        return Ok(None);
    }
    Ok(Some((stamps, remaining.trim())))
}

fn has_word_marker(line: &str) -> bool {
    let mut rest = line;
    while let Some(start) = rest.find('<') {
        rest = &rest[start + 1..];
        if let Some(end) = rest.find('>') {
            if parse_timestamp(&rest[..end]).is_ok() {
                return true;
            }
        }
    }
    false
}

/// Parse `<t>word<t>word<t>` markers.
///
/// Returns the first marker time, the display text (all marked words joined by
/// single spaces) and one span per adjacent marker pair. Text after the last
/// marker has no end time, so it is displayed but gets no span.
fn parse_word_markers(body: &str) -> Result<Option<(f64, String, Vec<WordSpan>)>> {
    let Some(first) = body.find('<') else {
        return Ok(None);
    };

    let mut markers: Vec<(f64, &str)> = Vec::new();
    let mut rest = &body[first..];
    while let Some(after) = rest.strip_prefix('<') {
        let Some(end) = after.find('>') else {
            break;
        };
        let timestamp = parse_timestamp(&after[..end])?;
        let tail = &after[end + 1..];
        let next = tail.find('<').unwrap_or(tail.len());
        markers.push((timestamp, tail[..next].trim()));
        rest = &tail[next..];
    }

    let Some(&(line_start, _)) = markers.first() else {
        return Ok(None);
    };

    let words = markers
        .windows(2)
        .filter(|pair| !pair[0].1.is_empty())
        .map(|pair| WordSpan {
            start_seconds: pair[0].0,
            end_seconds: pair[1].0,
            text: pair[0].1.to_string(),
        })
        .collect();

    let text = markers
        .iter()
        .map(|(_, word)| *word)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(Some((line_start, text, words)))
}
