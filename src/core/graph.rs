//! Road network graph model for motomap
//!
//! A directed multigraph keyed by OSM node ids. Parallel edges between the
//! same ordered node pair are told apart by a per-pair sequence `key`, so an
//! edge is addressed by `(u, v, key)`.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

/// A raw OSM tag value.
///
/// OSM tags arrive as text, but loaders that merge ways (or hand-built
/// graphs) can produce numbers, booleans or lists of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<TagValue>),
}

impl TagValue {
    /// Text content, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Float(value)
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Bool(value)
    }
}

impl<T: Into<TagValue>> From<Vec<T>> for TagValue {
    fn from(values: Vec<T>) -> Self {
        TagValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// An intersection or shape point of the road network
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// OSM node id
    pub osmid: i64,
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
    /// Elevation in meters, set by the elevation stage
    pub elevation: Option<f64>,
}

/// Attributes of a road segment.
///
/// Every tag field is optional before cleaning. After the cleaning stage
/// `lanes` and `maxspeed` hold [`TagValue::Int`], `surface` is set and
/// `lanes_forward` is computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Source OSM way id
    pub osmid: Option<i64>,
    pub highway: Option<TagValue>,
    pub lanes: Option<TagValue>,
    pub maxspeed: Option<TagValue>,
    pub surface: Option<TagValue>,
    pub oneway: Option<TagValue>,
    pub name: Option<String>,
    /// Segment length in meters
    pub length: f64,
    pub lanes_forward: Option<i64>,
    pub grade: Option<f64>,
    pub grade_abs: Option<f64>,
}

impl EdgeData {
    /// Total lane count once cleaned
    pub fn lanes_count(&self) -> Option<i64> {
        self.lanes.as_ref().and_then(TagValue::as_int)
    }

    /// Speed limit in km/h once cleaned
    pub fn maxspeed_kmh(&self) -> Option<i64> {
        self.maxspeed.as_ref().and_then(TagValue::as_int)
    }
}

/// Borrowed view of one edge together with its address
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    pub u: i64,
    pub v: i64,
    pub key: u32,
    pub data: &'a EdgeData,
}

#[derive(Debug, Clone)]
struct Segment {
    key: u32,
    data: EdgeData,
}

/// Directed road multigraph
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    graph: DiGraph<NodeData, Segment>,
    index: HashMap<i64, NodeIndex>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Returns false (and leaves the graph unchanged) if the
    /// OSM id is already present.
    pub fn add_node(&mut self, osmid: i64, x: f64, y: f64) -> bool {
        if self.index.contains_key(&osmid) {
            return false;
        }
        let idx = self.graph.add_node(NodeData {
            osmid,
            x,
            y,
            elevation: None,
        });
        self.index.insert(osmid, idx);
        true
    }

    /// Insert an edge from `u` to `v` and return its key.
    ///
    /// Returns `None` when either endpoint is unknown.
    pub fn add_edge(&mut self, u: i64, v: i64, data: EdgeData) -> Option<u32> {
        let a = *self.index.get(&u)?;
        let b = *self.index.get(&v)?;
        let key = self.graph.edges_connecting(a, b).count() as u32;
        self.graph.add_edge(a, b, Segment { key, data });
        Some(key)
    }

    pub fn node(&self, osmid: i64) -> Option<&NodeData> {
        self.index.get(&osmid).map(|&idx| &self.graph[idx])
    }

    pub fn node_mut(&mut self, osmid: i64) -> Option<&mut NodeData> {
        let idx = *self.index.get(&osmid)?;
        self.graph.node_weight_mut(idx)
    }

    pub fn edge(&self, u: i64, v: i64, key: u32) -> Option<&EdgeData> {
        let idx = self.edge_index(u, v, key)?;
        self.graph.edge_weight(idx).map(|segment| &segment.data)
    }

    pub fn edge_mut(&mut self, u: i64, v: i64, key: u32) -> Option<&mut EdgeData> {
        let idx = self.edge_index(u, v, key)?;
        self.graph.edge_weight_mut(idx).map(|segment| &mut segment.data)
    }

    fn edge_index(&self, u: i64, v: i64, key: u32) -> Option<EdgeIndex> {
        let a = *self.index.get(&u)?;
        let b = *self.index.get(&v)?;
        self.graph
            .edges_connecting(a, b)
            .find(|edge| edge.weight().key == key)
            .map(|edge| edge.id())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> + '_ {
        self.graph.node_weights()
    }

    /// Nodes in insertion order, mutably
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut NodeData> + '_ {
        self.graph.node_weights_mut()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.graph.edge_references().map(move |edge| EdgeView {
            u: self.graph[edge.source()].osmid,
            v: self.graph[edge.target()].osmid,
            key: edge.weight().key,
            data: &edge.weight().data,
        })
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut EdgeData> + '_ {
        self.graph.edge_weights_mut().map(|segment| &mut segment.data)
    }

    /// Visit every edge with copies of its endpoint nodes
    pub fn update_edges<F>(&mut self, mut visit: F)
    where
        F: FnMut(&NodeData, &NodeData, &mut EdgeData),
    {
        for idx in self.graph.edge_indices() {
            let Some((a, b)) = self.graph.edge_endpoints(idx) else {
                continue;
            };
            let (from, to) = (self.graph[a], self.graph[b]);
            visit(&from, &to, &mut self.graph[idx].data);
        }
    }
}
