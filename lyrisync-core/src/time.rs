//! Timestamp parsing and time conversion utilities.
//!
//! Lyric timestamps are plain `f64` seconds from the start of the track. The
//! helpers here convert the textual `mm:ss.xx` tokens found in lyric files and
//! the integer millisecond values found in config and LRC `[offset:]` tags.

use crate::error::{CoreError, Result};
use std::time::Instant;

/// Parse a `minutes:seconds` token into seconds.
///
/// Accepts `mm:ss`, `mm:ss.xx` and the `mm:ss:xx` hundredths variant written by
/// some LRC editors. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`CoreError::MalformedTimestamp`] when there is no colon, when a
/// component is not numeric, or when the result is not a finite non-negative
/// number.
pub fn parse_timestamp(token: &str) -> Result<f64> {
    let token = token.trim();
    let (minutes, rest) = token
        .split_once(':')
        .ok_or_else(|| CoreError::malformed(token))?;

    let minutes = parse_whole(minutes).ok_or_else(|| CoreError::malformed(token))?;

    let seconds = match rest.split_once(':') {
        // mm:ss:xx (hundredths)
        Some((secs, hundredths)) => {
            let secs = parse_whole(secs).ok_or_else(|| CoreError::malformed(token))?;
            let hundredths = parse_whole(hundredths).ok_or_else(|| CoreError::malformed(token))?;
            f64::from(secs) + f64::from(hundredths) / 100.0
        }
        None => parse_fractional(rest).ok_or_else(|| CoreError::malformed(token))?,
    };

    let total = f64::from(minutes) * 60.0 + seconds;
    if total.is_finite() && total >= 0.0 {
        Ok(total)
    } else {
        Err(CoreError::malformed(token))
    }
}

fn parse_whole(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_fractional(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty()
        || s.starts_with('.')
        || s.bytes().filter(|b| *b == b'.').count() > 1
        || !s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
    {
        return None;
    }
    s.parse().ok()
}

/// Convert a signed millisecond count to seconds.
///
/// Values outside the `i32` range saturate, which is far beyond any sensible
/// lyric offset.
#[must_use]
pub fn millis_to_secs(millis: i64) -> f64 {
    let clamped = i32::try_from(millis).unwrap_or(if millis < 0 { i32::MIN } else { i32::MAX });
    f64::from(clamped) / 1000.0
}

/// Current instant on tokio's clock.
///
/// Equal to [`Instant::now`] outside of tests; under a paused test runtime it
/// follows `tokio::time::advance`.
pub(crate) fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Format seconds as `MM:SS` for status display. Negative values render as `00:00`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_clock(seconds: f64) -> String {
    // Truncation is intended; u32 covers ~136 years.
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.min(f64::from(u32::MAX)) as u32
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fractional_seconds() {
        assert!((parse_timestamp("01:02.50").unwrap() - 62.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_whole_seconds() {
        assert!((parse_timestamp("3:07").unwrap() - 187.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_hundredths_variant() {
        let secs = parse_timestamp("00:12:34").unwrap();
        assert!((secs - 12.34).abs() < 1e-9);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        assert!((parse_timestamp(" 00:05.00 ").unwrap() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_colon_is_malformed() {
        assert!(matches!(
            parse_timestamp("bad"),
            Err(CoreError::MalformedTimestamp { .. })
        ));
    }

    #[test]
    fn test_non_numeric_parts_are_malformed() {
        for input in [
            "ab:12.00", "00:xx", "00:", ":12.0", "-1:00.00", "00:1e3", "00:inf", "00:1.2.3",
        ] {
            assert!(
                matches!(parse_timestamp(input), Err(CoreError::MalformedTimestamp { .. })),
                "{input} should be malformed"
            );
        }
    }

    #[test]
    fn test_millis_to_secs() {
        assert!((millis_to_secs(1500) - 1.5).abs() < f64::EPSILON);
        assert!((millis_to_secs(-250) + 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(62.9), "01:02");
        assert_eq!(format_clock(-3.0), "00:00");
        assert_eq!(format_clock(f64::NAN), "00:00");
    }
}
