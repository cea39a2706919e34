//! Route service: the single in-process entry point for routing requests.
//!
//! Joins the data store, the caches, the current-location resolver and the
//! routing engine. The HTTP API, the CLI and the client fallback all go
//! through here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::cache::{AirportListCache, FloorGraphCache, FloorKey, FloorSnapshot};
use crate::config::Config;
use crate::error::{GatewalkError, Result};
use crate::floor::{AirportDetails, AirportInfo, FloorData};
use crate::locate::{resolve_start, LocationResolver, StartPoint, TerminalEntranceResolver};
use crate::routing::{self, RouteOptions};
use crate::store::AirportStore;

/// Routing request as received from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    #[serde(alias = "floorId")]
    pub floor: String,
    pub start: StartPoint,
    pub end: String,
    #[serde(default)]
    pub stops: Vec<String>,
}

/// One path entry joined with its point details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<Value>,
}

/// Route result returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub path: Vec<String>,
    pub enhanced_path: Vec<PathStep>,
    pub distance: f64,
    pub estimated_time_minutes: u32,
    pub floor: String,
}

/// Per-floor summary produced by [`RouteService::verify`].
#[derive(Debug, Clone)]
pub struct FloorReport {
    pub airport: String,
    pub floor: String,
    pub points: usize,
    pub edges: usize,
    pub dropped_connections: usize,
}

/// Expand route ids with name, type, coordinates and terminal from the floor.
/// Ids missing from the floor are kept with no details.
pub fn enhance_path(path: &[String], floor: &FloorData) -> Vec<PathStep> {
    let points = floor.points_by_id();
    path.iter()
        .map(|id| match points.get(id.as_str()) {
            Some(point) => PathStep {
                id: id.clone(),
                name: Some(point.name.clone()),
                kind: Some(point.kind.clone()),
                coordinates: (!point.coordinates.is_null()).then(|| point.coordinates.clone()),
                terminal: point.terminal.clone(),
            },
            None => PathStep {
                id: id.clone(),
                name: None,
                kind: None,
                coordinates: None,
                terminal: None,
            },
        })
        .collect()
}

pub struct RouteService {
    store: AirportStore,
    floors: FloorGraphCache,
    airports: AirportListCache,
    resolver: Arc<dyn LocationResolver>,
    options: RouteOptions,
}

impl RouteService {
    pub fn new(store: AirportStore, options: RouteOptions, floor_capacity: usize) -> Self {
        Self {
            store,
            floors: FloorGraphCache::new(floor_capacity),
            airports: AirportListCache::new(),
            resolver: Arc::new(TerminalEntranceResolver),
            options,
        }
    }

    /// Build the service described by a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = AirportStore::new(config.data_dir())?;
        Ok(Self::new(store, config.route_options(), config.cache.floor_capacity))
    }

    /// Replace the current-location resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn LocationResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    pub fn store(&self) -> &AirportStore {
        &self.store
    }

    pub fn list_airports(&self) -> Result<Vec<AirportInfo>> {
        self.airports.get_or_load(|| self.store.list_airports())
    }

    pub fn airport(&self, code: &str) -> Result<AirportDetails> {
        self.store.airport(code)
    }

    /// Current snapshot of a floor, rebuilt when the file's version changed.
    pub fn floor(&self, code: &str, floor: &str) -> Result<Arc<FloorSnapshot>> {
        let key = FloorKey::new(code, floor);
        let raw = self.store.read_floor_bytes(code, floor)?;
        let version = raw.version.clone();
        // A miss parses the bytes already read for the version check.
        self.floors.get_or_build(&key, &version, move || raw.parse())
    }

    /// Drop cached airport list and floor graphs.
    pub fn clear_caches(&self) {
        self.airports.clear();
        self.floors.clear();
    }

    /// Plan a route on one floor of an airport.
    pub fn plan_route(&self, code: &str, request: &RouteRequest) -> Result<RouteResponse> {
        if request.start.is_empty() || request.end.trim().is_empty() {
            return Err(GatewalkError::InvalidInput(
                "Start and end points are required".to_string(),
            ));
        }
        if request.floor.trim().is_empty() {
            return Err(GatewalkError::InvalidInput("Floor is required".to_string()));
        }

        let snapshot = self.floor(code, &request.floor)?;
        let start = match request.start {
            StartPoint::Point(ref id) => id.clone(),
            StartPoint::CurrentLocation => {
                let airport = self.store.airport_info(code)?;
                resolve_start(&request.start, self.resolver.as_ref(), &airport, &snapshot.floor)?
            }
        };

        log::debug!(
            "Routing {}/{}: {} -> {} via {:?}",
            code,
            request.floor,
            start,
            request.end,
            request.stops
        );

        let route = routing::route(&snapshot.graph, &start, &request.end, &request.stops, &self.options)?;
        if !route.is_reachable() {
            return Err(GatewalkError::NoRoute {
                from: start,
                to: request.end.clone(),
            });
        }

        Ok(RouteResponse {
            enhanced_path: enhance_path(&route.path, &snapshot.floor),
            path: route.path,
            distance: route.distance,
            estimated_time_minutes: route.estimated_time_minutes,
            floor: request.floor.clone(),
        })
    }

    /// Build every floor of every airport and report its size and dropped connections.
    pub fn verify(&self) -> Result<Vec<FloorReport>> {
        let mut reports = Vec::new();
        for code in self.store.airport_codes()? {
            for floor in self.store.floor_ids(&code)? {
                let snapshot = self.floor(&code, &floor)?;
                reports.push(FloorReport {
                    airport: code.clone(),
                    floor,
                    points: snapshot.graph.len(),
                    edges: snapshot.graph.edge_count(),
                    dropped_connections: snapshot.graph.dropped_connections().len(),
                });
            }
        }
        Ok(reports)
    }
}
