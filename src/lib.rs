//! topicmap - interactive map of topic-clustered posts
//!
//! topicmap serves a small dashboard over a precomputed 2-D embedding of
//! social-media posts. Each point is a post (or cluster representative)
//! colored by its topic; a date slider filters points by creation time and
//! hovering a point shows its topic's description.
//!
//! # Overview
//!
//! Clustering, embedding and topic labeling all happen upstream. This crate
//! loads their output once at startup:
//!
//! 1. **Description table** (CSV): topic number -> description text.
//! 2. **Point table** (Feather / Arrow IPC): coordinates, topic, label,
//!    toxicity, post count, creation time and marker size per point.
//!
//! From then on the dataset, the topic colors and the slider bounds are
//! read-only, shared by every request.
//!
//! # Quick Start
//!
//! ```no_run
//! use topicmap::controller::{dispatch, UiEvent, ViewState};
//! use topicmap::data::{self, LoadOptions};
//! use topicmap::AppContext;
//!
//! let dataset = data::load(&LoadOptions::default()).expect("dataset");
//! let ctx = AppContext::new(dataset, "Topics");
//!
//! let hovered = dispatch(
//!     &ctx,
//!     &UiEvent::Hover { topic: Some(topicmap::TopicId(3)) },
//!     &ViewState::default(),
//! );
//! println!("{:?}", hovered);
//! ```
//!
//! # Modules
//!
//! - [`data`]: loading and parsing the two data files
//! - [`palette`]: stable topic colors
//! - [`plot`]: figure generation (filtering, ordering, viewport)
//! - [`hover`]: description lookup
//! - [`slider`]: date slider bounds and month marks
//! - [`controller`]: event -> UI fragment dispatch
//! - [`serve`]: HTTP server and embedded page

pub mod context;
pub mod controller;
pub mod data;
pub mod error;
pub mod hover;
pub mod palette;
pub mod plot;
pub mod serve;
pub mod slider;

#[cfg(test)]
pub(crate) mod testing;

pub use context::AppContext;
pub use controller::{dispatch, UiEvent, UiFragment, ViewState};
pub use data::{Dataset, DescriptionTable, PointRecord, TopicId};
pub use error::{LoadError, LoadResult};
pub use plot::{Figure, RenderRequest, RenderTrigger, Viewport};
