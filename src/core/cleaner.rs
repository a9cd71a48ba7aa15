//! Edge attribute cleaning for motomap
//!
//! Fills missing `lanes`, `maxspeed` and `surface` tags from per-class
//! defaults, coerces present ones to integers, and derives `lanes_forward`.
//! Nothing in here fails: malformed input degrades to the class default.

use log::debug;

use crate::core::defaults::{default_lanes, default_maxspeed, DEFAULT_SURFACE, UNCLASSIFIED};
use crate::core::graph::{EdgeData, RoadGraph, TagValue};

/// Final stage of the pipeline: normalizes edge attributes in place
pub trait GraphCleaner {
    fn clean(&self, graph: &mut RoadGraph);
}

/// Default cleaner backed by [`clean_graph`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeNormalizer;

impl GraphCleaner for AttributeNormalizer {
    fn clean(&self, graph: &mut RoadGraph) {
        clean_graph(graph);
    }
}

/// Counters for how many tags were missing and filled from defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub edges: usize,
    pub lanes_filled: usize,
    pub maxspeed_filled: usize,
    pub surface_filled: usize,
}

/// Normalize every edge of the graph
pub fn clean_graph(graph: &mut RoadGraph) -> CleanStats {
    let mut stats = CleanStats::default();

    for data in graph.edges_mut() {
        stats.edges += 1;
        let filled = clean_edge(data);
        stats.lanes_filled += filled.lanes as usize;
        stats.maxspeed_filled += filled.maxspeed as usize;
        stats.surface_filled += filled.surface as usize;
    }

    debug!(
        "Cleaned {} edges (filled lanes: {}, maxspeed: {}, surface: {})",
        stats.edges, stats.lanes_filled, stats.maxspeed_filled, stats.surface_filled
    );
    stats
}

#[derive(Debug, Default)]
struct Filled {
    lanes: bool,
    maxspeed: bool,
    surface: bool,
}

/// Normalize one edge. The road class must be resolved before the table
/// lookups, and `lanes` before `lanes_forward`.
fn clean_edge(data: &mut EdgeData) -> Filled {
    let class = road_class(data.highway.as_ref());
    let lanes_default = default_lanes(class);
    let maxspeed_default = default_maxspeed(class);
    let mut filled = Filled::default();

    let lanes = match data.lanes.as_ref() {
        Some(value) => coerce_int(value, lanes_default),
        None => {
            filled.lanes = true;
            lanes_default
        }
    };
    data.lanes = Some(TagValue::Int(lanes));

    let maxspeed = match data.maxspeed.as_ref() {
        Some(value) => coerce_int(value, maxspeed_default),
        None => {
            filled.maxspeed = true;
            maxspeed_default
        }
    };
    data.maxspeed = Some(TagValue::Int(maxspeed));

    let missing_surface = match data.surface.as_ref() {
        None => true,
        Some(TagValue::Text(surface)) => surface.trim().is_empty(),
        Some(_) => false,
    };
    if missing_surface {
        data.surface = Some(TagValue::from(DEFAULT_SURFACE));
        filled.surface = true;
    }

    data.lanes_forward = Some(lanes_forward(lanes, is_oneway(data.oneway.as_ref())));
    filled
}

/// Resolve the authoritative road class of a `highway` tag.
///
/// Lists take their first entry; anything unusable is `"unclassified"`.
pub fn road_class(highway: Option<&TagValue>) -> &str {
    match highway {
        Some(TagValue::Text(class)) => class,
        Some(TagValue::List(classes)) => classes
            .first()
            .and_then(TagValue::as_str)
            .unwrap_or(UNCLASSIFIED),
        _ => UNCLASSIFIED,
    }
}

/// Coerce a tag to a positive integer, or return `default`.
///
/// Floats truncate, text is parsed after trimming, lists use their first
/// entry. Zero, negative and non-finite values are rejected.
pub fn coerce_int(value: &TagValue, default: i64) -> i64 {
    let parsed = match value {
        TagValue::Int(value) => Some(*value),
        TagValue::Float(value) if value.is_finite() => Some(value.trunc() as i64),
        TagValue::Text(text) => text.trim().parse::<i64>().ok(),
        TagValue::List(values) => {
            return values
                .first()
                .map_or(default, |first| coerce_int(first, default));
        }
        _ => None,
    };
    parsed.filter(|value| *value > 0).unwrap_or(default)
}

/// Only boolean `true` and the literal `"yes"` mark a one-way segment
pub fn is_oneway(oneway: Option<&TagValue>) -> bool {
    match oneway {
        Some(TagValue::Bool(flag)) => *flag,
        Some(TagValue::Text(text)) => text == "yes",
        _ => false,
    }
}

/// Lanes usable in the direction of travel
pub fn lanes_forward(lanes: i64, oneway: bool) -> i64 {
    if oneway {
        lanes
    } else {
        (lanes / 2).max(1)
    }
}
