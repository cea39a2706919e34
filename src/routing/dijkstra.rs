//! Single-pair shortest path (Dijkstra over non-negative weights).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{GatewalkError, Result};
use crate::graph::Graph;
use crate::routing::{Deadline, PathResult};

/// How many settled nodes between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 64;

/// Heap entry. Ordered so `BinaryHeap` pops the lowest cost first; equal costs
/// pop the lower node index first so results do not depend on heap internals.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    node: usize,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

/// Shortest path from `start` to `end`.
///
/// Unknown ids are an `UnknownPoint` error. `start == end` yields `[start]` at
/// distance 0. When `end` cannot be reached the result is the unreachable
/// sentinel: empty path, infinite distance.
pub fn shortest_path(graph: &Graph, start: &str, end: &str) -> Result<PathResult> {
    shortest_path_within(graph, start, end, &Deadline::none())
}

/// Same as [`shortest_path`], checking `deadline` while the search runs.
pub fn shortest_path_within(
    graph: &Graph,
    start: &str,
    end: &str,
    deadline: &Deadline,
) -> Result<PathResult> {
    let source = graph
        .node_index(start)
        .ok_or_else(|| GatewalkError::UnknownPoint(start.to_string()))?;
    let target = graph
        .node_index(end)
        .ok_or_else(|| GatewalkError::UnknownPoint(end.to_string()))?;

    if source == target {
        return Ok(PathResult {
            path: vec![start.to_string()],
            distance: 0.0,
        });
    }

    let n = graph.len();
    let mut best = vec![f64::INFINITY; n];
    let mut previous: Vec<Option<usize>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    best[source] = 0.0;
    heap.push(Frontier { cost: 0.0, node: source });

    let mut expanded = 0usize;
    while let Some(Frontier { cost, node }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;

        if node == target {
            return Ok(PathResult {
                path: reconstruct(graph, &previous, source, target),
                distance: cost,
            });
        }

        if expanded % DEADLINE_CHECK_INTERVAL == 0 {
            deadline.check()?;
        }
        expanded += 1;

        for edge in graph.edges(node) {
            let candidate = cost + edge.weight;
            if candidate < best[edge.to] {
                best[edge.to] = candidate;
                previous[edge.to] = Some(node);
                heap.push(Frontier {
                    cost: candidate,
                    node: edge.to,
                });
            }
        }
    }

    Ok(PathResult::unreachable())
}

fn reconstruct(graph: &Graph, previous: &[Option<usize>], source: usize, target: usize) -> Vec<String> {
    let mut path = vec![graph.id(target).to_string()];
    let mut current = target;
    while current != source {
        match previous[current] {
            Some(prev) => {
                path.push(graph.id(prev).to_string());
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
