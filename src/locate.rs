//! Resolution of the "current_location" start sentinel.
//!
//! The routing engine only accepts concrete point ids. Requests may instead ask
//! to start from the traveller's current location; a [`LocationResolver`] maps
//! that to a point before the engine is invoked.

use serde::{Deserialize, Serialize};

use crate::error::{GatewalkError, Result};
use crate::floor::{AirportInfo, FloorData};

/// Wire value meaning "wherever the traveller is now".
pub const CURRENT_LOCATION: &str = "current_location";

/// Start of a routing request: a known point or the current-location sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StartPoint {
    CurrentLocation,
    Point(String),
}

impl From<String> for StartPoint {
    fn from(value: String) -> Self {
        if value == CURRENT_LOCATION {
            StartPoint::CurrentLocation
        } else {
            StartPoint::Point(value)
        }
    }
}

impl From<&str> for StartPoint {
    fn from(value: &str) -> Self {
        StartPoint::from(value.to_string())
    }
}

impl From<StartPoint> for String {
    fn from(value: StartPoint) -> Self {
        match value {
            StartPoint::CurrentLocation => CURRENT_LOCATION.to_string(),
            StartPoint::Point(id) => id,
        }
    }
}

impl std::fmt::Display for StartPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartPoint::CurrentLocation => f.write_str(CURRENT_LOCATION),
            StartPoint::Point(id) => f.write_str(id),
        }
    }
}

impl StartPoint {
    pub fn is_empty(&self) -> bool {
        matches!(self, StartPoint::Point(id) if id.trim().is_empty())
    }
}

/// Maps the current-location sentinel to a concrete point id on a floor.
pub trait LocationResolver: Send + Sync {
    fn resolve(&self, airport: &AirportInfo, floor: &FloorData) -> Result<String>;
}

/// Uses the main entrance of the airport's first terminal, `entrance-<terminal id>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalEntranceResolver;

impl LocationResolver for TerminalEntranceResolver {
    fn resolve(&self, airport: &AirportInfo, _floor: &FloorData) -> Result<String> {
        airport
            .terminals
            .first()
            .map(|terminal| format!("entrance-{}", terminal.id))
            .ok_or_else(|| {
                GatewalkError::LocationUnresolved(format!(
                    "airport '{}' has no terminals",
                    airport.code
                ))
            })
    }
}

/// Turn a request start into a point id, consulting `resolver` only for the sentinel.
pub fn resolve_start(
    start: &StartPoint,
    resolver: &dyn LocationResolver,
    airport: &AirportInfo,
    floor: &FloorData,
) -> Result<String> {
    match start {
        StartPoint::Point(id) => Ok(id.clone()),
        StartPoint::CurrentLocation => {
            let resolved = resolver.resolve(airport, floor)?;
            log::debug!("Resolved {} to {}", CURRENT_LOCATION, resolved);
            Ok(resolved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floor::Terminal;
    use serde_json::Map;

    fn airport_with_terminals(ids: &[&str]) -> AirportInfo {
        let mut info = AirportInfo::placeholder("sfo");
        info.terminals = ids
            .iter()
            .map(|id| Terminal {
                id: id.to_string(),
                name: None,
                metadata: Map::new(),
            })
            .collect();
        info
    }

    #[test]
    fn test_start_point_parses_sentinel() {
        let start: StartPoint = serde_json::from_str("\"current_location\"").unwrap();
        assert_eq!(start, StartPoint::CurrentLocation);
        let start: StartPoint = serde_json::from_str("\"gate-a1\"").unwrap();
        assert_eq!(start, StartPoint::Point("gate-a1".to_string()));
    }

    #[test]
    fn test_start_point_serializes_back() {
        let value = serde_json::to_value(StartPoint::CurrentLocation).unwrap();
        assert_eq!(value, "current_location");
        let value = serde_json::to_value(StartPoint::from("gate-a1")).unwrap();
        assert_eq!(value, "gate-a1");
    }

    #[test]
    fn test_first_terminal_entrance() {
        let airport = airport_with_terminals(&["t1", "t2"]);
        let resolved = TerminalEntranceResolver
            .resolve(&airport, &FloorData::default())
            .unwrap();
        assert_eq!(resolved, "entrance-t1");
    }

    #[test]
    fn test_no_terminals_is_unresolved() {
        let airport = airport_with_terminals(&[]);
        let result = TerminalEntranceResolver.resolve(&airport, &FloorData::default());
        assert!(matches!(result, Err(GatewalkError::LocationUnresolved(_))));
    }

    #[test]
    fn test_resolve_start_passes_concrete_ids_through() {
        let airport = airport_with_terminals(&[]);
        let id = resolve_start(
            &StartPoint::from("gate-a1"),
            &TerminalEntranceResolver,
            &airport,
            &FloorData::default(),
        )
        .unwrap();
        assert_eq!(id, "gate-a1");
    }

    #[test]
    fn test_empty_start_detected() {
        assert!(StartPoint::from("  ").is_empty());
        assert!(!StartPoint::CurrentLocation.is_empty());
    }
}
