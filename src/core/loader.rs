//! Road network loading for motomap
//!
//! The default loader geocodes a place name with Nominatim, fetches every
//! drivable way inside the resulting bounding box from Overpass, and turns
//! each pair of consecutive way nodes into a directed segment. Bidirectional
//! ways get a reverse segment as well. The network is not simplified.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::graph::{EdgeData, RoadGraph, TagValue};
use crate::core::http::{self, fetch_json};

/// Mean earth radius in meters
const EARTH_RADIUS_M: f64 = 6_371_009.0;

/// Way filter matching roads open to private cars
const DRIVE_FILTER: &str = concat!(
    r#"["highway"]["area"!~"yes"]"#,
    r#"["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|"#,
    r#"escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|service|"#,
    r#"steps|track"]"#,
    r#"["motor_vehicle"!~"no"]["motorcar"!~"no"]"#,
    r#"["service"!~"alley|driveway|emergency_access|parking|parking_aisle|private"]"#,
);

/// `oneway` values marking a single-direction way
const ONEWAY_VALUES: [&str; 7] = ["yes", "true", "1", "-1", "reverse", "T", "F"];

/// `oneway` values whose direction runs against the node order
const REVERSED_VALUES: [&str; 3] = ["-1", "reverse", "T"];

/// First stage of the pipeline: resolves a place to a road graph
#[allow(async_fn_in_trait)]
pub trait NetworkLoader {
    async fn load(&self, place: &str) -> Result<RoadGraph>;
}

/// Area to query, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Nominatim + Overpass loader
#[derive(Debug, Clone)]
pub struct OverpassLoader {
    client: Client,
    nominatim_url: String,
    overpass_url: String,
    timeout: Duration,
    overpass_timeout: Duration,
}

impl OverpassLoader {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            nominatim_url: config.nominatim_url.trim_end_matches('/').to_string(),
            overpass_url: config.overpass_url.clone(),
            timeout: config.request_timeout,
            overpass_timeout: config.overpass_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(http::client().clone(), config)
    }

    /// Resolve a free-text place to its bounding box
    pub async fn geocode(&self, place: &str) -> Result<BoundingBox> {
        let request = self
            .client
            .get(format!("{}/search", self.nominatim_url))
            .query(&[("q", place), ("format", "json"), ("limit", "1")]);
        let results: Vec<GeocodeResult> = fetch_json(request, self.timeout, "Nominatim").await?;

        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| Error::PlaceNotFound(place.to_string()))?;
        debug!("Geocoded '{place}' to {}", first.display_name);
        first.bounding_box()
    }

    async fn fetch_ways(&self, bbox: &BoundingBox) -> Result<Vec<OsmElement>> {
        let query = overpass_query(bbox, self.overpass_timeout);
        debug!("Overpass query:\n{query}");

        let request = self
            .client
            .post(&self.overpass_url)
            .header("Content-Type", "text/plain")
            .body(query);
        let response: OverpassResponse =
            fetch_json(request, self.overpass_timeout, "Overpass API").await?;
        Ok(response.elements)
    }
}

impl NetworkLoader for OverpassLoader {
    async fn load(&self, place: &str) -> Result<RoadGraph> {
        let bbox = self.geocode(place).await?;
        info!(
            "Fetching drivable roads for '{place}' in {:.4},{:.4} to {:.4},{:.4}",
            bbox.south, bbox.west, bbox.north, bbox.east
        );

        let elements = self.fetch_ways(&bbox).await?;
        let graph = build_graph(&elements);
        if graph.edge_count() == 0 {
            return Err(Error::EmptyNetwork(place.to_string()));
        }

        info!(
            "Loaded {} nodes and {} edges for '{place}'",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    /// `[south, north, west, east]` as decimal strings
    boundingbox: Vec<String>,
    #[serde(default)]
    display_name: String,
}

impl GeocodeResult {
    fn bounding_box(&self) -> Result<BoundingBox> {
        let values: Vec<f64> = self
            .boundingbox
            .iter()
            .map(|v| v.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Parse(format!("Invalid Nominatim bounding box: {e}")))?;

        match values.as_slice() {
            [south, north, west, east] => Ok(BoundingBox {
                south: *south,
                west: *west,
                north: *north,
                east: *east,
            }),
            _ => Err(Error::Parse(format!(
                "Nominatim bounding box has {} values, expected 4",
                values.len()
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OsmElement>,
}

#[derive(Debug, Clone, Deserialize)]
struct OsmElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    nodes: Vec<i64>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

fn overpass_query(bbox: &BoundingBox, timeout: Duration) -> String {
    format!(
        "[out:json][timeout:{}];\n(\n  way{}({},{},{},{});\n);\n(._;>;);\nout body;",
        timeout.as_secs(),
        DRIVE_FILTER,
        bbox.south,
        bbox.west,
        bbox.north,
        bbox.east
    )
}

/// Direction of a way as (oneway, reversed)
fn way_direction(tags: &HashMap<String, String>) -> (bool, bool) {
    let oneway_tag = tags.get("oneway").map(String::as_str);
    let roundabout = tags.get("junction").is_some_and(|j| j == "roundabout");

    let oneway = roundabout || oneway_tag.is_some_and(|v| ONEWAY_VALUES.contains(&v));
    let reversed = oneway_tag.is_some_and(|v| REVERSED_VALUES.contains(&v));
    (oneway, reversed)
}

fn edge_data(way: &OsmElement, oneway: bool, length: f64) -> EdgeData {
    let tag = |key: &str| way.tags.get(key).map(|v| TagValue::Text(v.clone()));
    EdgeData {
        osmid: Some(way.id),
        highway: tag("highway"),
        lanes: tag("lanes"),
        maxspeed: tag("maxspeed"),
        surface: tag("surface"),
        oneway: Some(TagValue::Bool(oneway)),
        name: way.tags.get("name").cloned(),
        length,
        ..Default::default()
    }
}

/// Convert Overpass elements into a directed road multigraph
fn build_graph(elements: &[OsmElement]) -> RoadGraph {
    let coords: HashMap<i64, (f64, f64)> = elements
        .iter()
        .filter(|e| e.kind == "node")
        .filter_map(|e| Some((e.id, (e.lon?, e.lat?))))
        .collect();

    let mut graph = RoadGraph::new();
    let mut way_count = 0usize;

    for way in elements.iter().filter(|e| e.kind == "way" && e.nodes.len() > 1) {
        let (oneway, reversed) = way_direction(&way.tags);
        let mut path = way.nodes.clone();
        if reversed {
            path.reverse();
        }

        for pair in path.windows(2) {
            let (u, v) = (pair[0], pair[1]);
            if u == v {
                continue;
            }
            let (Some(&(ux, uy)), Some(&(vx, vy))) = (coords.get(&u), coords.get(&v)) else {
                continue;
            };

            graph.add_node(u, ux, uy);
            graph.add_node(v, vx, vy);
            let length = haversine_distance(uy, ux, vy, vx);

            let data = edge_data(way, oneway, length);
            if !oneway {
                graph.add_edge(v, u, data.clone());
            }
            graph.add_edge(u, v, data);
        }
        way_count += 1;
    }

    debug!(
        "Built {} nodes and {} edges from {way_count} ways",
        graph.node_count(),
        graph.edge_count()
    );
    graph
}

/// Great-circle distance in meters
fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();

    let a =
        (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}
