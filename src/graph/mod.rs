//! Floor graph: adjacency-weighted directed graph built from points and connections.
//!
//! Point ids are interned to dense indices so the search can keep its working
//! state in plain vectors. A built graph is never mutated; share it with `Arc`.

mod builder;

pub use builder::build_graph;

use std::collections::HashMap;

/// A directed, weighted edge to the node at index `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: usize,
    pub weight: f64,
}

/// Why a connection was left out of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnknownFrom,
    UnknownTo,
    InvalidDistance,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::UnknownFrom => write!(f, "unknown 'from' point"),
            DropReason::UnknownTo => write!(f, "unknown 'to' point"),
            DropReason::InvalidDistance => write!(f, "negative or non-finite distance"),
        }
    }
}

/// A connection rejected while building the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedConnection {
    pub from: String,
    pub to: String,
    pub distance: f64,
    pub reason: DropReason,
}

/// Immutable adjacency structure for one floor.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<Edge>>,
    dropped: Vec<DroppedConnection>,
}

impl Graph {
    /// Dense index of a point id, if the point is part of the graph.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Point id at a dense index.
    pub fn id(&self, index: usize) -> &str {
        &self.ids[index]
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Point ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Outgoing edges of the node at `index`.
    pub fn edges(&self, index: usize) -> &[Edge] {
        &self.adjacency[index]
    }

    /// Outgoing `(neighbor id, weight)` pairs of a point, or `None` if the id is unknown.
    pub fn neighbors<'a>(&'a self, id: &str) -> Option<impl Iterator<Item = (&'a str, f64)> + 'a> {
        let index = self.node_index(id)?;
        Some(
            self.adjacency[index]
                .iter()
                .map(move |edge| (self.ids[edge.to].as_str(), edge.weight)),
        )
    }

    /// Weight of the direct edge `from -> to`, if any.
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f64> {
        let from = self.node_index(from)?;
        let to = self.node_index(to)?;
        self.adjacency[from]
            .iter()
            .find(|edge| edge.to == to)
            .map(|edge| edge.weight)
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Connections that were rejected during the build.
    pub fn dropped_connections(&self) -> &[DroppedConnection] {
        &self.dropped
    }
}
