pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod floor;
pub mod graph;
pub mod http;
pub mod locate;
pub mod routing;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{GatewalkError, Result};
pub use graph::{build_graph, Graph};
pub use routing::{optimize_route, shortest_path, PathResult, Route};
pub use service::{RouteRequest, RouteResponse, RouteService};
