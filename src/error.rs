use thiserror::Error;

/// Main error type for Gatewalk
#[derive(Error, Debug)]
pub enum GatewalkError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in airport or floor data
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML floor data
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Remote routing API errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success answer from a remote routing API
    #[error("Remote API returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A start, end or stop id that is not part of the floor graph
    #[error("Unknown point: {0}")]
    UnknownPoint(String),

    /// Every waypoint exists but no walkable path links them
    #[error("No valid route found from {from} to {to}")]
    NoRoute { from: String, to: String },

    /// Airport directory missing from the data store
    #[error("Airport not found: {0}")]
    AirportNotFound(String),

    /// Floor file missing from the data store
    #[error("Floor not found: {airport}/{floor}")]
    FloorNotFound { airport: String, floor: String },

    /// The "current_location" sentinel could not be mapped to a point
    #[error("Could not determine current location: {0}")]
    LocationUnresolved(String),

    /// Search aborted by its deadline or cancellation token
    #[error("Route search cancelled")]
    Cancelled,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using GatewalkError
pub type Result<T> = std::result::Result<T, GatewalkError>;
