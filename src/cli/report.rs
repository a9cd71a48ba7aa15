//! Summary of a built graph for the command line

use std::fmt;

use motomap::{EdgeData, RoadGraph};

/// Node/edge counts, attribute coverage and elevation range
#[derive(Debug, Clone, PartialEq)]
pub struct GraphReport {
    pub nodes: usize,
    pub edges: usize,
    pub lanes_coverage: f64,
    pub maxspeed_coverage: f64,
    pub surface_coverage: f64,
    pub elevation_range: Option<(f64, f64)>,
}

impl GraphReport {
    pub fn new(graph: &RoadGraph) -> Self {
        let elevation_range = graph
            .nodes()
            .filter_map(|node| node.elevation)
            .fold(None, |range, elevation| match range {
                None => Some((elevation, elevation)),
                Some((low, high)) => Some((f64::min(low, elevation), f64::max(high, elevation))),
            });

        Self {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            lanes_coverage: edge_coverage(graph, |data| data.lanes.is_some()),
            maxspeed_coverage: edge_coverage(graph, |data| data.maxspeed.is_some()),
            surface_coverage: edge_coverage(graph, |data| data.surface.is_some()),
            elevation_range,
        }
    }
}

/// Percentage of edges for which `has_attr` holds
fn edge_coverage<F>(graph: &RoadGraph, has_attr: F) -> f64
where
    F: Fn(&EdgeData) -> bool,
{
    let total = graph.edge_count();
    if total == 0 {
        return 0.0;
    }
    let with_attr = graph.edges().filter(|edge| has_attr(edge.data)).count();
    with_attr as f64 / total as f64 * 100.0
}

impl fmt::Display for GraphReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes: {}", self.nodes)?;
        writeln!(f, "Edges: {}", self.edges)?;
        writeln!(f, "Lanes coverage: {:.2}%", self.lanes_coverage)?;
        writeln!(f, "Maxspeed coverage: {:.2}%", self.maxspeed_coverage)?;
        writeln!(f, "Surface coverage: {:.2}%", self.surface_coverage)?;
        match self.elevation_range {
            Some((low, high)) => write!(f, "Elevation min/max: {low:.2}m / {high:.2}m"),
            None => write!(f, "Elevation min/max: no elevation data"),
        }
    }
}
