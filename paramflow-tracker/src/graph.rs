//! Directed origin graph over tracked parameters.
//!
//! Vertices live in a petgraph arena keyed by opaque `NodeIndex` handles;
//! adjacency is held by the graph structure, not on the vertices, so a
//! parameter can have many origins and many dependents and cycles are
//! representable without reference cycles.

use crate::tracked::TrackedParameter;
use paramflow_core::ParamKey;
use petgraph::dot::Dot;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Edge direction is origin → dependent.
#[derive(Default)]
pub struct DependencyGraph {
    graph: StableDiGraph<TrackedParameter, String>,
    keys: HashMap<ParamKey, NodeIndex>,
    edges: HashSet<(NodeIndex, NodeIndex)>,
    layout_requested: bool,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex. Re-adding a parameter with a key already present is
    /// a no-op that returns the existing handle.
    pub fn add_vertex(&mut self, param: TrackedParameter) -> NodeIndex {
        if let Some(&idx) = self.keys.get(param.key()) {
            return idx;
        }
        let key = param.key().clone();
        let idx = self.graph.add_node(param);
        self.keys.insert(key, idx);
        idx
    }

    pub fn node(&self, key: &ParamKey) -> Option<NodeIndex> {
        self.keys.get(key).copied()
    }

    pub fn vertex(&self, idx: NodeIndex) -> Option<&TrackedParameter> {
        self.graph.node_weight(idx)
    }

    /// Add a directed edge origin → dependent. A no-op when either endpoint
    /// is absent or the edge already exists; vertices are never created
    /// implicitly. Returns whether an edge was inserted.
    pub fn add_edge(&mut self, from: &ParamKey, to: &ParamKey) -> bool {
        self.add_edge_labeled(from, to, String::new())
    }

    pub fn add_edge_labeled(&mut self, from: &ParamKey, to: &ParamKey, label: String) -> bool {
        let (from_idx, to_idx) = match (self.keys.get(from), self.keys.get(to)) {
            (Some(&f), Some(&t)) => (f, t),
            _ => {
                debug!("Ignoring edge with missing endpoint: {:?} -> {:?}", from, to);
                return false;
            }
        };
        if !self.edges.insert((from_idx, to_idx)) {
            return false;
        }
        self.graph.add_edge(from_idx, to_idx, label);
        true
    }

    /// Empty both vertex and edge sets.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.keys.clear();
        self.edges.clear();
        self.layout_requested = false;
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &TrackedParameter> {
        self.graph.node_weights()
    }

    /// All edges as (origin, transform label, dependent).
    pub fn edges(&self) -> Vec<(&TrackedParameter, &str, &TrackedParameter)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = self.graph.edge_endpoints(e)?;
                Some((
                    &self.graph[from],
                    self.graph[e].as_str(),
                    &self.graph[to],
                ))
            })
            .collect()
    }

    /// Origins of one vertex, i.e. incoming neighbors.
    pub fn origins_of(&self, idx: NodeIndex) -> Vec<&TrackedParameter> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .filter_map(|n| self.graph.node_weight(n))
            .collect()
    }

    /// Signal the presentation layer to recompute vertex positions. Layout
    /// itself is owned by the consumer.
    pub fn request_layout(&mut self) {
        self.layout_requested = true;
    }

    pub fn take_layout_request(&mut self) -> bool {
        std::mem::take(&mut self.layout_requested)
    }

    /// DOT rendering for external graph viewers.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }
}
