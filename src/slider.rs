//! Date slider configuration
//!
//! The slider covers the dataset's observed date span in whole-day steps,
//! starting at midnight UTC of the earliest post's day, with a labeled mark
//! at every month start inside the span. The page sends step indices; bounds
//! and marks are Unix seconds.

use crate::data::Dataset;
use chrono::{DateTime, Datelike, Months, NaiveDate, Timelike, Utc};
use serde::Serialize;

pub const DAY_SECS: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliderMark {
    pub value: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliderConfig {
    /// Midnight of the first day, so every mark is a reachable step
    pub min: i64,
    pub max: i64,
    pub step: i64,
    /// Number of steps needed to reach (or pass) `max` from `min`; also the
    /// initial position, where everything is visible
    pub steps: i64,
    pub marks: Vec<SliderMark>,
}

impl SliderConfig {
    pub fn from_span(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let start = start
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|n| n.and_utc())
            .unwrap_or(start);
        let min = start.timestamp();
        let mut max = end.timestamp();
        if end.timestamp_subsec_nanos() > 0 {
            max += 1;
        }
        let max = max.max(min);
        let steps = (max - min + DAY_SECS - 1) / DAY_SECS;

        Self {
            min,
            max,
            step: DAY_SECS,
            steps,
            marks: month_starts(start, end)
                .into_iter()
                .map(|dt| SliderMark {
                    value: dt.timestamp(),
                    label: dt.format("%Y-%m-%d").to_string(),
                })
                .collect(),
        }
    }

    /// Span of the dataset, or a zero-width slider at the epoch when empty
    pub fn for_dataset(dataset: &Dataset) -> Self {
        match dataset.date_span() {
            Some((start, end)) => Self::from_span(start, end),
            None => Self::from_span(DateTime::default(), DateTime::default()),
        }
    }

    /// Cutoff for a slider step index, clamped to `[min, max]`
    pub fn cutoff_at(&self, index: i64) -> DateTime<Utc> {
        let secs = index
            .saturating_mul(self.step)
            .saturating_add(self.min)
            .clamp(self.min, self.max);
        // min and max both came from valid instants
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
    }
}

/// Midnight of each month's first day within `[start, end]`
pub fn month_starts(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    let Some(first_of_month) = NaiveDate::from_ymd_opt(start.year(), start.month(), 1) else {
        return out;
    };

    let at_midnight = start.num_seconds_from_midnight() == 0 && start.nanosecond() == 0;
    let mut day = if first_of_month == start.date_naive() && at_midnight {
        Some(first_of_month)
    } else {
        first_of_month.checked_add_months(Months::new(1))
    };

    while let Some(d) = day {
        let Some(at) = d.and_hms_opt(0, 0, 0).map(|n| n.and_utc()) else {
            break;
        };
        if at > end {
            break;
        }
        out.push(at);
        day = d.checked_add_months(Months::new(1));
    }
    out
}
