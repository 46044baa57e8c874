//! Time-span formatting and parsing.
//!
//! Durations are rendered as `MM:SS`, or `HH:MM:SS` once an hour is reached.
//! Fractional seconds are truncated. Parsing accepts `HH:MM:SS`, `MM:SS`
//! and bare `SS`, each optionally with a fractional part.

use thiserror::Error;

/// Render seconds as `MM:SS` or `HH:MM:SS`.
///
/// Negative, NaN and infinite inputs render as `00:00`.
///
/// # Examples
/// ```
/// use ffgate_models::timestamp::format_time;
/// assert_eq!(format_time(65.0), "01:05");
/// assert_eq!(format_time(3661.0), "01:01:01");
/// assert_eq!(format_time(f64::NAN), "00:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

/// Parse a timestamp string to total seconds.
///
/// # Examples
/// ```
/// use ffgate_models::timestamp::parse_time;
/// assert_eq!(parse_time("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_time("05:30").unwrap(), 330.0);
/// assert_eq!(parse_time("90").unwrap(), 90.0);
/// ```
pub fn parse_time(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [s] => ("0", "0", *s),
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(TimestampError::InvalidFormat(ts.to_string())),
    };

    let hours = parse_component("hours", hours)?;
    let minutes = parse_component("minutes", minutes)?;
    let seconds = parse_component("seconds", seconds)?;

    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn parse_component(name: &'static str, value: &str) -> Result<f64, TimestampError> {
    let parsed: f64 = value
        .parse()
        .map_err(|_| TimestampError::InvalidValue(name, value.to_string()))?;
    if !parsed.is_finite() {
        return Err(TimestampError::InvalidValue(name, value.to_string()));
    }
    if parsed < 0.0 {
        return Err(TimestampError::Negative);
    }
    Ok(parsed)
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,

    #[error("Timestamp cannot be negative")]
    Negative,

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid timestamp format '{0}'. Use HH:MM:SS, MM:SS, or SS")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(59.999), "00:59");
        assert_eq!(format_time(65.0), "01:05");
        assert_eq!(format_time(3600.0), "01:00:00");
        assert_eq!(format_time(3661.0), "01:01:01");
    }

    #[test]
    fn test_format_time_degenerate_inputs() {
        assert_eq!(format_time(-1.0), "00:00");
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("00:00").unwrap(), 0.0);
        assert_eq!(parse_time("01:05").unwrap(), 65.0);
        assert_eq!(parse_time("01:01:01").unwrap(), 3661.0);
        assert!((parse_time("00:00:30.500").unwrap() - 30.5).abs() < 0.001);
    }

    #[test]
    fn test_parse_time_errors() {
        assert!(matches!(parse_time(""), Err(TimestampError::Empty)));
        assert!(matches!(parse_time("abc"), Err(TimestampError::InvalidValue(_, _))));
        assert!(matches!(parse_time("1:2:3:4"), Err(TimestampError::InvalidFormat(_))));
        assert!(matches!(parse_time("-5"), Err(TimestampError::Negative)));
    }
}
