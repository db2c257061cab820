//! Finish-time string parsing.
//!
//! Heat entries arrive as strings in either `"M:SS.ss"` or `"SS.ss"` form.
//! A parse failure is never fatal: callers skip the offending entry and
//! continue, so the error carries the rejected text for logging.

use thiserror::Error;

/// Errors from [`parse_time`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseTimeError {
    /// The input was empty or whitespace-only.
    #[error("empty time string")]
    Empty,

    /// The input could not be interpreted as a duration.
    #[error("invalid time string: {text:?}")]
    Invalid { text: String },

    /// The input parsed numerically but is not a usable duration
    /// (negative, NaN, or infinite).
    #[error("time out of range: {text:?}")]
    OutOfRange { text: String },
}

/// Parses a finish time into seconds.
///
/// Input with exactly one `:` is read as `minutes:seconds` (minutes as an
/// integer, seconds as a float, fractional seconds permitted); anything
/// without a colon is read directly as a float number of seconds. More than
/// one colon is rejected rather than mis-read.
///
/// # Errors
///
/// Returns [`ParseTimeError`] for empty, malformed, negative, or
/// non-finite input. Callers must treat a failure as "skip this entry".
///
/// # Examples
///
/// ```
/// use mt_core::parse_time;
///
/// assert_eq!(parse_time("1:02.5").unwrap(), 62.5);
/// assert_eq!(parse_time("45.6").unwrap(), 45.6);
/// assert!(parse_time("abc").is_err());
/// ```
pub fn parse_time(text: &str) -> Result<f64, ParseTimeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseTimeError::Empty);
    }

    let invalid = || ParseTimeError::Invalid {
        text: trimmed.to_string(),
    };

    let parts: Vec<&str> = trimmed.split(':').collect();
    let seconds = match parts.as_slice() {
        [whole] => whole.trim().parse::<f64>().map_err(|_| invalid())?,
        [minutes, seconds] => {
            let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;
            let seconds: f64 = seconds.trim().parse().map_err(|_| invalid())?;
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(ParseTimeError::OutOfRange {
                    text: trimmed.to_string(),
                });
            }
            f64::from(minutes) * 60.0 + seconds
        }
        _ => return Err(invalid()),
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ParseTimeError::OutOfRange {
            text: trimmed.to_string(),
        });
    }
    Ok(seconds)
}
