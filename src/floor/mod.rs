//! Floor and airport data model.
//!
//! These are the documents stored under the data directory. The routing engine
//! only looks at point ids and connections; coordinates, terminals and any other
//! metadata are carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::Result;

/// A navigable location on a floor (gate, restaurant, junction, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Open-ended category tag, e.g. `gate`, `bathroom`, `junction`, `entrance`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub coordinates: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<Value>,
    /// Any further fields present in the source document.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Point {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            coordinates: Value::Null,
            terminal: None,
            metadata: Map::new(),
        }
    }
}

/// A walkable link between two points, in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub distance: f64,
    /// When true only `from -> to` is walkable.
    #[serde(rename = "oneWay", default)]
    pub one_way: bool,
}

impl Connection {
    pub fn two_way(from: impl Into<String>, to: impl Into<String>, distance: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance,
            one_way: false,
        }
    }

    pub fn one_way(from: impl Into<String>, to: impl Into<String>, distance: f64) -> Self {
        Self {
            one_way: true,
            ..Self::two_way(from, to, distance)
        }
    }
}

/// On-disk document describing one floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(alias = "points", default)]
    pub nodes: Vec<Point>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Serialization format of a floor file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorFormat {
    Json,
    Yaml,
}

impl FloorFormat {
    /// Map a file extension (without the dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl FloorData {
    /// Parse a floor document from raw bytes.
    pub fn parse(bytes: &[u8], format: FloorFormat) -> Result<Self> {
        let floor = match format {
            FloorFormat::Json => serde_json::from_slice(bytes)?,
            FloorFormat::Yaml => serde_yaml_ng::from_slice(bytes)?,
        };
        Ok(floor)
    }

    /// Look up a point by id.
    pub fn point(&self, id: &str) -> Option<&Point> {
        self.nodes.iter().find(|p| p.id == id)
    }

    /// Index of points by id. The first occurrence of a duplicated id wins.
    pub fn points_by_id(&self) -> HashMap<&str, &Point> {
        let mut map = HashMap::with_capacity(self.nodes.len());
        for point in &self.nodes {
            map.entry(point.id.as_str()).or_insert(point);
        }
        map
    }
}

/// A terminal entry in an airport's `info.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Contents of an airport's `info.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportInfo {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub terminals: Vec<Terminal>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl AirportInfo {
    /// Placeholder entry used when an airport directory has no readable info file.
    pub fn placeholder(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: code.to_uppercase(),
            terminals: Vec::new(),
            metadata: Map::new(),
        }
    }
}

/// Airport info joined with its gates and amenities listings.
#[derive(Debug, Clone, Serialize)]
pub struct AirportDetails {
    #[serde(flatten)]
    pub info: AirportInfo,
    pub gates: Vec<Value>,
    pub amenities: Vec<Value>,
}
