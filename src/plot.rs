//! Scatter-plot figure generation
//!
//! [`render`] turns the dataset, a date cutoff and the previous viewport
//! into a [`Figure`]: plain data that serializes to the `{data, layout}`
//! pair plotly.js accepts in `Plotly.react`. Nothing here talks to a
//! browser, so every rule (filtering, colors, ordering, viewport) is
//! testable directly.
//!
//! # Figure rules
//!
//! - Points are those with `created_at <= cutoff` and a known topic; points
//!   with no topic number are left out of the plot entirely.
//! - One WebGL marker trace per topic, in category order (numeric on the
//!   trailing integer of the topic name).
//! - Hover shows Topic Number, Topic Label, Toxicity and Number of Posts and
//!   nothing else; `customdata[0]` carries the topic number for the hover
//!   description lookup.
//! - Axes are bare: no titles, grid or tick labels, on a white background.
//! - A date-slider re-render keeps the previous viewport; any other render
//!   lets plotly auto-fit.

use crate::data::{trailing_number, Dataset, PointRecord, TopicId};
use crate::palette::ColorMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Title shown above the published topic map
pub const DEFAULT_TITLE: &str =
    "157 Topics of U.S. Immigration Posts on X<br>(April 17th to October 27th, 2023)";

/// Fields visible on hover, in `customdata` order
pub const HOVER_FIELDS: [&str; 4] = ["Topic Number", "Topic Label", "Toxicity", "Number of Posts"];

pub const BACKGROUND: &str = "white";

/// Largest rendered marker diameter in pixels (plotly-express default)
const MAX_MARKER_SIZE: f64 = 20.0;

/// Visible axis ranges of a displayed figure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
}

/// What caused a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTrigger {
    /// The user moved the date slider
    DateFilter,
    /// First paint or any render not driven by the slider
    Initial,
}

/// Inputs for one figure
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Inclusive upper bound on `created_at`
    pub cutoff: DateTime<Utc>,
    pub previous: Option<Viewport>,
    pub trigger: RenderTrigger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// Per-point hover values: topic number, label, toxicity, post count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverData(pub i64, pub String, pub f64, pub i64);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub legendgroup: String,
    pub showlegend: bool,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub customdata: Vec<HoverData>,
    pub hovertemplate: String,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: &'static str,
    pub size: Vec<f64>,
    pub sizemode: &'static str,
    pub sizeref: f64,
    pub line: MarkerLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLine {
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Text,
    pub showgrid: bool,
    pub showticklabels: bool,
    pub zeroline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    pub autorange: bool,
}

impl Axis {
    fn bare(range: Option<[f64; 2]>) -> Self {
        Self {
            title: Text { text: String::new() },
            showgrid: false,
            showticklabels: false,
            zeroline: false,
            autorange: range.is_none(),
            range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: Text,
    pub tracegroupgap: u32,
    pub itemsizing: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Text,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub legend: Legend,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub hovermode: &'static str,
}

impl Figure {
    /// Every plotted point, across traces
    pub fn point_count(&self) -> usize {
        self.data.iter().map(|t| t.x.len()).sum()
    }

    /// Trace names in display order
    pub fn category_order(&self) -> Vec<&str> {
        self.data.iter().map(|t| t.name.as_str()).collect()
    }

    /// Viewport forced by this figure, if any
    pub fn viewport(&self) -> Option<Viewport> {
        Some(Viewport {
            x_range: self.layout.xaxis.range?,
            y_range: self.layout.yaxis.range?,
        })
    }
}

/// Points that pass the date cutoff and have a topic
pub fn filter_points(
    points: &[PointRecord],
    cutoff: DateTime<Utc>,
) -> impl Iterator<Item = &PointRecord> {
    points
        .iter()
        .filter(move |p| p.created_at <= cutoff && p.topic.is_some())
}

/// Numeric order on the trailing integer; unnumbered names go last
pub fn compare_categories(a: &str, b: &str) -> Ordering {
    match (trailing_number(a), trailing_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Distinct category names sorted with [`compare_categories`]
pub fn category_order<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
    names.sort_by(|a, b| compare_categories(a, b));
    names.dedup();
    names
}

/// Hover template listing exactly [`HOVER_FIELDS`]
pub fn hover_template() -> String {
    let mut template = HOVER_FIELDS
        .iter()
        .enumerate()
        .map(|(i, field)| format!("{}=%{{customdata[{}]}}", field, i))
        .collect::<Vec<_>>()
        .join("<br>");
    // Suppress the secondary trace-name box
    template.push_str("<extra></extra>");
    template
}

/// Area-mode size reference, as plotly-express computes it
fn size_reference<'a>(points: impl Iterator<Item = &'a PointRecord>) -> f64 {
    let max = points
        .map(|p| p.marker_size)
        .filter(|s| s.is_finite())
        .fold(0.0f64, f64::max);
    if max > 0.0 {
        2.0 * max / (MAX_MARKER_SIZE * MAX_MARKER_SIZE)
    } else {
        1.0
    }
}

/// Build the figure for one render request
pub fn render(dataset: &Dataset, colors: &ColorMap, title: &str, request: &RenderRequest) -> Figure {
    let mut groups: BTreeMap<TopicId, Vec<&PointRecord>> = BTreeMap::new();
    for p in filter_points(dataset.points(), request.cutoff) {
        if let Some(topic) = p.topic {
            groups.entry(topic).or_default().push(p);
        }
    }

    let sizeref = size_reference(groups.values().flatten().copied());
    let template = hover_template();

    let mut named: Vec<(String, TopicId)> =
        groups.keys().map(|topic| (topic.to_string(), *topic)).collect();
    named.sort_by(|(a, _), (b, _)| compare_categories(a, b));

    let data = named
        .into_iter()
        .map(|(name, topic)| {
            let points = &groups[&topic];
            Trace {
                kind: "scattergl",
                mode: "markers",
                legendgroup: name.clone(),
                name,
                showlegend: true,
                x: points.iter().map(|p| p.x).collect(),
                y: points.iter().map(|p| p.y).collect(),
                customdata: points
                    .iter()
                    .map(|p| HoverData(topic.0, p.label.clone(), p.toxicity, p.posts))
                    .collect(),
                hovertemplate: template.clone(),
                marker: Marker {
                    color: colors.color_for(topic),
                    size: points.iter().map(|p| p.marker_size).collect(),
                    sizemode: "area",
                    sizeref,
                    line: MarkerLine { width: 0.0 },
                },
            }
        })
        .collect();

    let kept = match (request.trigger, request.previous) {
        (RenderTrigger::DateFilter, Some(viewport)) => Some(viewport),
        _ => None,
    };

    Figure {
        data,
        layout: Layout {
            title: Text { text: title.to_string() },
            xaxis: Axis::bare(kept.map(|v| v.x_range)),
            yaxis: Axis::bare(kept.map(|v| v.y_range)),
            legend: Legend {
                title: Text { text: HOVER_FIELDS[0].to_string() },
                tracegroupgap: 0,
                itemsizing: "constant",
            },
            plot_bgcolor: BACKGROUND,
            paper_bgcolor: BACKGROUND,
            hovermode: "closest",
        },
    }
}
