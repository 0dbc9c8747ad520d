//! Topic colors
//!
//! Colors are assigned once, from the full dataset, so a topic keeps its
//! color however the visible subset changes under the date filter.

use crate::data::TopicId;
use std::collections::{BTreeMap, BTreeSet};

/// Plotly's 26-color "Alphabet" qualitative palette
pub const ALPHABET: [&str; 26] = [
    "#AA0DFE", "#3283FE", "#85660D", "#782AB6", "#565656", "#1C8356", "#16FF32", "#F7E1A0",
    "#E2E2E2", "#1CBE4F", "#C4451C", "#DEA0FD", "#FE00FA", "#325A9B", "#FEAF16", "#F8A19F",
    "#90AD1C", "#F6222E", "#1CFFCE", "#2ED9FF", "#B10DA1", "#C075A6", "#FC1CBF", "#B00068",
    "#FBE426", "#FA0087",
];

/// Plotly's default trace color, for topics outside the map
pub const FALLBACK_COLOR: &str = "#636EFA";

/// Topic -> color, fixed for the life of the process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap {
    colors: BTreeMap<TopicId, &'static str>,
}

impl ColorMap {
    /// The i-th smallest distinct topic gets `palette[i % palette.len()]`
    ///
    /// An empty palette yields an empty map.
    pub fn assign<I>(topics: I, palette: &[&'static str]) -> Self
    where
        I: IntoIterator<Item = TopicId>,
    {
        let unique: BTreeSet<TopicId> = topics.into_iter().collect();
        let colors = unique.into_iter().zip(palette.iter().copied().cycle()).collect();
        Self { colors }
    }

    pub fn get(&self, topic: TopicId) -> Option<&'static str> {
        self.colors.get(&topic).copied()
    }

    pub fn color_for(&self, topic: TopicId) -> &'static str {
        self.get(topic).unwrap_or(FALLBACK_COLOR)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TopicId, &'static str)> + '_ {
        self.colors.iter().map(|(t, c)| (*t, *c))
    }
}
