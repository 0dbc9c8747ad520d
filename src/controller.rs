//! Interaction controller
//!
//! The page sends one event at a time (a slider move, a hover, the first
//! paint) together with what it is currently displaying, and gets back the
//! single UI fragment to replace. [`dispatch`] is that whole exchange: a
//! plain function of `(context, event, view)`, with no state kept between
//! calls.

use crate::context::AppContext;
use crate::data::TopicId;
use crate::hover;
use crate::plot::{self, Figure, RenderRequest, RenderTrigger, Viewport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Something the user did
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    /// First paint: everything visible, auto-fit viewport
    Initial,
    /// Date slider released at day `step` of the slider's range
    DateSlider { step: i64 },
    /// Pointer over a point (`topic` from its customdata) or over nothing
    Hover {
        #[serde(default)]
        topic: Option<TopicId>,
    },
}

/// What the page is currently showing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub x_range: Option<[f64; 2]>,
    #[serde(default)]
    pub y_range: Option<[f64; 2]>,
}

impl ViewState {
    /// Both ranges, or nothing
    pub fn viewport(&self) -> Option<Viewport> {
        Some(Viewport {
            x_range: self.x_range?,
            y_range: self.y_range?,
        })
    }
}

impl From<Viewport> for ViewState {
    fn from(viewport: Viewport) -> Self {
        Self {
            x_range: Some(viewport.x_range),
            y_range: Some(viewport.y_range),
        }
    }
}

/// The one piece of UI an event replaces
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UiFragment {
    Figure(Figure),
    Description(String),
}

/// Handle one event to completion
pub fn dispatch(ctx: &AppContext, event: &UiEvent, view: &ViewState) -> UiFragment {
    match event {
        UiEvent::Initial => {
            debug!("initial render");
            UiFragment::Figure(figure(ctx, ctx.latest(), None, RenderTrigger::Initial))
        }
        UiEvent::DateSlider { step } => {
            let cutoff = ctx.slider.cutoff_at(*step);
            let previous = view.viewport();
            debug!(step, %cutoff, keep_viewport = previous.is_some(), "date filter");
            UiFragment::Figure(figure(ctx, cutoff, previous, RenderTrigger::DateFilter))
        }
        UiEvent::Hover { topic } => {
            debug!(?topic, "hover");
            UiFragment::Description(hover::resolve(ctx.dataset.descriptions(), *topic).to_string())
        }
    }
}

fn figure(
    ctx: &AppContext,
    cutoff: DateTime<Utc>,
    previous: Option<Viewport>,
    trigger: RenderTrigger,
) -> Figure {
    plot::render(
        &ctx.dataset,
        &ctx.colors,
        &ctx.title,
        &RenderRequest {
            cutoff,
            previous,
            trigger,
        },
    )
}
