//! Multi-stop routes: chain shortest paths through caller-ordered waypoints.

use crate::error::{GatewalkError, Result};
use crate::graph::Graph;
use crate::routing::dijkstra::shortest_path_within;
use crate::routing::{Deadline, PathResult};

/// Route from `start` to `end` visiting `stops` in the order given.
///
/// Stops are never reordered. Every waypoint is checked against the graph
/// before searching. If any leg is unreachable the whole route is the
/// unreachable sentinel; partial routes are never returned.
pub fn optimize_route(graph: &Graph, start: &str, end: &str, stops: &[String]) -> Result<PathResult> {
    optimize_route_within(graph, start, end, stops, &Deadline::none())
}

/// Same as [`optimize_route`], checking `deadline` inside every leg.
pub fn optimize_route_within(
    graph: &Graph,
    start: &str,
    end: &str,
    stops: &[String],
    deadline: &Deadline,
) -> Result<PathResult> {
    if stops.is_empty() {
        return shortest_path_within(graph, start, end, deadline);
    }

    let waypoints: Vec<&str> = std::iter::once(start)
        .chain(stops.iter().map(String::as_str))
        .chain(std::iter::once(end))
        .collect();

    if let Some(unknown) = waypoints.iter().find(|id| !graph.contains(id)) {
        return Err(GatewalkError::UnknownPoint(unknown.to_string()));
    }

    let mut path: Vec<String> = Vec::new();
    let mut distance = 0.0;

    for leg in waypoints.windows(2) {
        let segment = shortest_path_within(graph, leg[0], leg[1], deadline)?;
        if !segment.is_reachable() {
            log::debug!("No path for leg {} -> {}", leg[0], leg[1]);
            return Ok(PathResult::unreachable());
        }

        // Each leg starts where the previous one ended.
        let skip = if path.is_empty() { 0 } else { 1 };
        path.extend(segment.path.into_iter().skip(skip));
        distance += segment.distance;
    }

    Ok(PathResult { path, distance })
}
