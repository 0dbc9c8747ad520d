//! Dataset loading
//!
//! The dashboard works from two static files produced upstream:
//!
//! - a **description table** (CSV) mapping each topic number to a
//!   free-text description, and
//! - a **point table** (Feather v2, i.e. an Arrow IPC file) with one row per
//!   plotted post: 2-D coordinates, topic assignment, creation time and a
//!   few hover fields.
//!
//! Both are fetched once at startup by [`load`]. Any failure is fatal;
//! there is no retry and no partial dataset.

pub mod descriptions;
pub mod fetch;
pub mod points;

use crate::error::LoadResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::Duration;
use tracing::info;

pub use fetch::{Fetcher, Source};

/// Published description table for the U.S. immigration topic map
pub const DEFAULT_DESCRIPTIONS_URL: &str =
    "https://drive.google.com/uc?export=download&id=1Tin9XoeDG_0iGazpn5n7vnfw0mHnlynq";

/// Published point table for the U.S. immigration topic map
pub const DEFAULT_POINTS_URL: &str =
    "https://drive.google.com/uc?export=download&id=1Ijbh2EUBGmYQK5-ejdipHK6rVcEodiDZ";

/// Integer topic identifier
///
/// Upstream files are not consistent about how they spell a topic: some
/// carry a plain integer, some a float (pandas' nullable-int fallback),
/// some a label like `"Topic 12"`. All of them collapse to this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub i64);

impl TopicId {
    /// Parse from text: the last whitespace-separated token must be a number
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().last()?;
        if let Ok(n) = token.parse::<i64>() {
            return Some(Self(n));
        }
        token.parse::<f64>().ok().and_then(Self::from_f64)
    }

    /// Whole, finite floats only. NaN is pandas' missing value.
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.is_finite() && value.fract() == 0.0 {
            Some(Self(value as i64))
        } else {
            None
        }
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trailing integer of a label: `"Topic 10"` -> `10`
pub fn trailing_number(label: &str) -> Option<i64> {
    label.split_whitespace().last()?.parse().ok()
}

/// One plotted post / cluster representative
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    /// `None` when the upstream topic number is missing
    pub topic: Option<TopicId>,
    pub label: String,
    pub toxicity: f64,
    pub posts: i64,
    pub created_at: DateTime<Utc>,
    pub marker_size: f64,
}

/// Topic number -> human-readable description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptionTable {
    entries: HashMap<TopicId, String>,
}

impl DescriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts replace earlier ones
    pub fn insert(&mut self, topic: TopicId, description: impl Into<String>) {
        self.entries.insert(topic, description.into());
    }

    pub fn get(&self, topic: TopicId) -> Option<&str> {
        self.entries.get(&topic).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(TopicId, S)> for DescriptionTable {
    fn from_iter<I: IntoIterator<Item = (TopicId, S)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (topic, description) in iter {
            table.insert(topic, description);
        }
        table
    }
}

/// Everything loaded at startup. Read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    points: Vec<PointRecord>,
    descriptions: DescriptionTable,
}

impl Dataset {
    pub fn new(points: Vec<PointRecord>, descriptions: DescriptionTable) -> Self {
        Self { points, descriptions }
    }

    pub fn points(&self) -> &[PointRecord] {
        &self.points
    }

    pub fn descriptions(&self) -> &DescriptionTable {
        &self.descriptions
    }

    /// Distinct non-missing topic identifiers, ascending
    pub fn topics(&self) -> Vec<TopicId> {
        self.points
            .iter()
            .filter_map(|p| p.topic)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest and latest `created_at`, or `None` for an empty dataset
    pub fn date_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.points.first()?.created_at;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (lo.min(p.created_at), hi.max(p.created_at))
        }))
    }
}

/// Where to find the two data files
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub descriptions: Source,
    pub points: Source,
    /// Per-request timeout for remote sources
    pub timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            descriptions: Source::parse(DEFAULT_DESCRIPTIONS_URL),
            points: Source::parse(DEFAULT_POINTS_URL),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Fetch and decode both files
pub fn load(options: &LoadOptions) -> LoadResult<Dataset> {
    let fetcher = Fetcher::new(options.timeout)?;

    let raw = fetcher.fetch(&options.descriptions)?;
    let descriptions = descriptions::parse(&raw)?;
    info!(source = %options.descriptions, topics = descriptions.len(), "loaded description table");

    let raw = fetcher.fetch(&options.points)?;
    let points = points::parse(&raw)?;
    info!(source = %options.points, points = points.len(), "loaded point table");

    Ok(Dataset::new(points, descriptions))
}

/// Parse a timestamp written as text
///
/// Accepts RFC 3339, the `YYYY-MM-DD HH:MM:SS[.f][+zz:zz]` form pandas
/// writes, and bare dates. Values without an offset are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
