//! Graph construction from raw floor data.

use std::collections::HashMap;

use crate::floor::{Connection, FloorData, Point};
use crate::graph::{DropReason, DroppedConnection, Edge, Graph};

/// Build the adjacency graph for a floor.
///
/// Every point gets a node, isolated or not. Each connection adds `from -> to`
/// and, unless it is one-way, `to -> from` with the same weight. Connections
/// that reference an unknown point or carry a negative/non-finite distance are
/// dropped with a warning and recorded on the graph; no phantom node is created.
/// Repeated directed edges keep the smaller weight.
pub fn build_graph(points: &[Point], connections: &[Connection]) -> Graph {
    let mut ids = Vec::with_capacity(points.len());
    let mut index = HashMap::with_capacity(points.len());

    for point in points {
        if index.contains_key(&point.id) {
            log::warn!("Duplicate point id '{}' ignored", point.id);
            continue;
        }
        index.insert(point.id.clone(), ids.len());
        ids.push(point.id.clone());
    }

    let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); ids.len()];
    let mut dropped = Vec::new();

    for connection in connections {
        let reason = match (index.get(&connection.from), index.get(&connection.to)) {
            (None, _) => Some(DropReason::UnknownFrom),
            (_, None) => Some(DropReason::UnknownTo),
            _ if !connection.distance.is_finite() || connection.distance < 0.0 => {
                Some(DropReason::InvalidDistance)
            }
            (Some(&from), Some(&to)) => {
                add_edge(&mut adjacency[from], to, connection.distance);
                if !connection.one_way {
                    add_edge(&mut adjacency[to], from, connection.distance);
                }
                None
            }
        };

        if let Some(reason) = reason {
            log::warn!(
                "Dropping connection {} -> {} ({}): {}",
                connection.from,
                connection.to,
                connection.distance,
                reason
            );
            dropped.push(DroppedConnection {
                from: connection.from.clone(),
                to: connection.to.clone(),
                distance: connection.distance,
                reason,
            });
        }
    }

    Graph {
        ids,
        index,
        adjacency,
        dropped,
    }
}

fn add_edge(edges: &mut Vec<Edge>, to: usize, weight: f64) {
    match edges.iter_mut().find(|edge| edge.to == to) {
        Some(existing) => existing.weight = existing.weight.min(weight),
        None => edges.push(Edge { to, weight }),
    }
}

impl Graph {
    /// Build the graph for a parsed floor document.
    pub fn from_floor(floor: &FloorData) -> Self {
        build_graph(&floor.nodes, &floor.connections)
    }
}
