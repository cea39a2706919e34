//! Routing engine: Dijkstra shortest paths and ordered multi-stop routes.
//!
//! Everything here is a pure computation over a shared, read-only [`Graph`].
//! Each call owns its own search state, so any number of requests can run
//! against the same graph concurrently.

mod deadline;
mod dijkstra;
mod optimizer;

pub use deadline::{CancelToken, Deadline};
pub use dijkstra::{shortest_path, shortest_path_within};
pub use optimizer::{optimize_route, optimize_route_within};

use serde::Serialize;

use crate::error::{GatewalkError, Result};
use crate::graph::Graph;

/// Default walking speed in meters per second.
pub const DEFAULT_WALKING_SPEED_MPS: f64 = 1.4;

/// Distance reported for an unreachable destination.
pub const UNREACHABLE: f64 = f64::INFINITY;

/// Raw engine output: ordered point ids and total distance.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    pub path: Vec<String>,
    pub distance: f64,
}

impl PathResult {
    /// The "no path" sentinel: empty path, infinite distance.
    pub fn unreachable() -> Self {
        Self {
            path: Vec::new(),
            distance: UNREACHABLE,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }
}

/// A computed route with its walking-time estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub path: Vec<String>,
    pub distance: f64,
    pub estimated_time_minutes: u32,
}

impl Route {
    pub fn from_path(result: PathResult, walking_speed_mps: f64) -> Self {
        let estimated_time_minutes = estimated_time_minutes(result.distance, walking_speed_mps);
        Self {
            path: result.path,
            distance: result.distance,
            estimated_time_minutes,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }
}

/// Whole minutes needed to walk `distance` meters, rounded to nearest.
/// Unreachable distances report 0.
pub fn estimated_time_minutes(distance: f64, walking_speed_mps: f64) -> u32 {
    if !distance.is_finite() || walking_speed_mps <= 0.0 {
        return 0;
    }
    (distance / (walking_speed_mps * 60.0)).round() as u32
}

/// Tunables applied to every routing call.
#[derive(Debug, Clone)]
pub struct RouteOptions {
    pub walking_speed_mps: f64,
    /// Upper bound on intermediate stops per request.
    pub max_stops: usize,
    /// Per-request search budget; 0 disables it.
    pub search_timeout_ms: u64,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            walking_speed_mps: DEFAULT_WALKING_SPEED_MPS,
            max_stops: 10,
            search_timeout_ms: 0,
        }
    }
}

/// Compute a [`Route`] for already-resolved point ids.
///
/// An unreachable destination is not an error: the returned route carries the
/// sentinel distance and an empty path, and the caller decides how to report it.
pub fn route(
    graph: &Graph,
    start: &str,
    end: &str,
    stops: &[String],
    options: &RouteOptions,
) -> Result<Route> {
    if stops.len() > options.max_stops {
        return Err(GatewalkError::InvalidInput(format!(
            "Too many stops: {} (maximum {})",
            stops.len(),
            options.max_stops
        )));
    }
    let deadline = Deadline::from_millis(options.search_timeout_ms);
    let result = optimize_route_within(graph, start, end, stops, &deadline)?;
    Ok(Route::from_path(result, options.walking_speed_mps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floor::{Connection, Point};
    use crate::graph::build_graph;

    fn sample_graph() -> Graph {
        let points: Vec<Point> = ["A", "B", "C", "D"]
            .iter()
            .map(|id| Point::new(*id, *id, "junction"))
            .collect();
        build_graph(
            &points,
            &[
                Connection::two_way("A", "B", 10.0),
                Connection::two_way("B", "C", 5.0),
                Connection::two_way("C", "D", 8.0),
                Connection::one_way("A", "D", 30.0),
            ],
        )
    }

    #[test]
    fn test_estimated_time_uses_84_meters_per_minute() {
        assert_eq!(estimated_time_minutes(84.0, DEFAULT_WALKING_SPEED_MPS), 1);
        assert_eq!(estimated_time_minutes(420.0, DEFAULT_WALKING_SPEED_MPS), 5);
        assert_eq!(estimated_time_minutes(23.0, DEFAULT_WALKING_SPEED_MPS), 0);
        assert_eq!(estimated_time_minutes(130.0, DEFAULT_WALKING_SPEED_MPS), 2);
        assert_eq!(estimated_time_minutes(0.0, DEFAULT_WALKING_SPEED_MPS), 0);
    }

    #[test]
    fn test_estimated_time_unreachable_is_zero() {
        assert_eq!(estimated_time_minutes(UNREACHABLE, DEFAULT_WALKING_SPEED_MPS), 0);
    }

    #[test]
    fn test_route_reports_distance_and_time() {
        let route = route(&sample_graph(), "A", "D", &[], &RouteOptions::default()).unwrap();
        assert_eq!(route.path, vec!["A", "B", "C", "D"]);
        assert_eq!(route.distance, 23.0);
        assert_eq!(route.estimated_time_minutes, 0);
        assert!(route.is_reachable());
    }

    #[test]
    fn test_route_unreachable_is_not_an_error() {
        let points = vec![Point::new("x", "x", "gate"), Point::new("y", "y", "gate")];
        let graph = build_graph(&points, &[Connection::one_way("x", "y", 3.0)]);
        let blocked = route(&graph, "y", "x", &[], &RouteOptions::default()).unwrap();
        assert!(!blocked.is_reachable());
        assert!(blocked.path.is_empty());
        assert_eq!(blocked.estimated_time_minutes, 0);
    }

    #[test]
    fn test_route_rejects_too_many_stops() {
        let options = RouteOptions {
            max_stops: 1,
            ..RouteOptions::default()
        };
        let stops = vec!["B".to_string(), "C".to_string()];
        let result = route(&sample_graph(), "A", "D", &stops, &options);
        assert!(matches!(result, Err(GatewalkError::InvalidInput(_))));
    }

    #[test]
    fn test_route_serializes_camel_case() {
        let route = Route::from_path(
            PathResult {
                path: vec!["A".to_string()],
                distance: 168.0,
            },
            DEFAULT_WALKING_SPEED_MPS,
        );
        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(value["estimatedTimeMinutes"], 2);
        assert_eq!(value["distance"], 168.0);
    }
}
