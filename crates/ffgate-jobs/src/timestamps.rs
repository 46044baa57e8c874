//! Chapter timestamps from probed durations.
//!
//! The first pass accumulates the adjusted (floating point) durations. In
//! the default [`TimestampPrecision::RoundedSecondPass`] mode the timestamps
//! and total are then recomputed from the rendered duration strings parsed
//! back into seconds, which truncates each duration to whole seconds before
//! summing. [`TimestampPrecision::Precise`] keeps the first pass.

use serde::{Deserialize, Serialize};

use ffgate_models::{format_time, parse_time};

/// Which pass produces the reported timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPrecision {
    /// Recompute from whole-second duration strings (historical output)
    #[default]
    RoundedSecondPass,
    /// Keep the floating-point cumulative sums
    Precise,
}

/// One chapter line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampEntry {
    pub title: String,
    pub timestamp: String,
    pub duration: String,
}

/// Full timestamps response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampReport {
    pub timestamps: Vec<TimestampEntry>,
    pub total_duration: String,
}

/// Build the report from `(title, adjusted_duration)` pairs in input order.
pub fn build_report(items: &[(String, f64)], precision: TimestampPrecision) -> TimestampReport {
    let mut cumulative = 0.0;
    let mut timestamps: Vec<TimestampEntry> = items
        .iter()
        .map(|(title, duration)| {
            let entry = TimestampEntry {
                title: title.clone(),
                timestamp: format_time(cumulative),
                duration: format_time(*duration),
            };
            cumulative += duration;
            entry
        })
        .collect();

    if precision == TimestampPrecision::Precise {
        return TimestampReport {
            timestamps,
            total_duration: format_time(cumulative),
        };
    }

    let mut cumulative = 0.0;
    for entry in &mut timestamps {
        entry.timestamp = format_time(cumulative);
        cumulative += parse_time(&entry.duration).unwrap_or(0.0);
    }

    TimestampReport {
        timestamps,
        total_duration: format_time(cumulative),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(durations: &[f64]) -> Vec<(String, f64)> {
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| (format!("Video {}", i + 1), *d))
            .collect()
    }

    #[test]
    fn test_whole_second_durations() {
        let report = build_report(&items(&[65.0, 10.0, 125.0]), TimestampPrecision::RoundedSecondPass);
        let stamps: Vec<&str> = report.timestamps.iter().map(|e| e.timestamp.as_str()).collect();
        assert_eq!(stamps, vec!["00:00", "01:05", "01:15"]);
        assert_eq!(report.timestamps[2].duration, "02:05");
        assert_eq!(report.total_duration, "03:20");
    }

    #[test]
    fn test_second_pass_truncates_fractions() {
        let input = items(&[30.6, 30.6, 30.6]);

        let rounded = build_report(&input, TimestampPrecision::RoundedSecondPass);
        assert_eq!(rounded.timestamps[2].timestamp, "01:00");
        assert_eq!(rounded.total_duration, "01:30");

        let precise = build_report(&input, TimestampPrecision::Precise);
        assert_eq!(precise.timestamps[2].timestamp, "01:01");
        assert_eq!(precise.total_duration, "01:31");
    }

    #[test]
    fn test_empty_report() {
        let report = build_report(&[], TimestampPrecision::default());
        assert!(report.timestamps.is_empty());
        assert_eq!(report.total_duration, "00:00");
    }

    #[test]
    fn test_report_json_shape() {
        let report = build_report(&items(&[65.0]), TimestampPrecision::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "timestamps": [{"title": "Video 1", "timestamp": "00:00", "duration": "01:05"}],
                "total_duration": "01:05"
            })
        );
    }
}
