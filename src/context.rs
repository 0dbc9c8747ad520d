//! Process-wide read-only state

use crate::data::Dataset;
use crate::palette::{ColorMap, ALPHABET};
use crate::slider::SliderConfig;
use chrono::{DateTime, Utc};

/// Built once at startup, then only ever borrowed by request handlers
#[derive(Debug, Clone)]
pub struct AppContext {
    pub dataset: Dataset,
    pub colors: ColorMap,
    pub slider: SliderConfig,
    pub title: String,
}

impl AppContext {
    pub fn new(dataset: Dataset, title: impl Into<String>) -> Self {
        let colors = ColorMap::assign(dataset.topics(), &ALPHABET);
        let slider = SliderConfig::for_dataset(&dataset);
        Self {
            dataset,
            colors,
            slider,
            title: title.into(),
        }
    }

    /// Cutoff that shows every point
    pub fn latest(&self) -> DateTime<Utc> {
        self.dataset
            .date_span()
            .map(|(_, end)| end)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
