pub mod airport_cache;
pub mod floor_cache;

pub use airport_cache::AirportListCache;
pub use floor_cache::{FloorGraphCache, FloorKey, FloorSnapshot};
