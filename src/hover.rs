//! Hover description lookup

use crate::data::{DescriptionTable, TopicId};

/// Shown while nothing is hovered
pub const HOVER_PROMPT: &str = "Hover over a point to see its description.";

/// Shown for a topic the description table doesn't know
pub const NO_DESCRIPTION: &str = "No description found";

/// Description text for the hovered topic, if any
pub fn resolve(descriptions: &DescriptionTable, topic: Option<TopicId>) -> &str {
    match topic {
        None => HOVER_PROMPT,
        Some(topic) => descriptions.get(topic).unwrap_or(NO_DESCRIPTION),
    }
}
