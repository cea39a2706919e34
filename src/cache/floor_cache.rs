//! Bounded cache of built floor graphs, keyed by floor and checked by version.
//!
//! Snapshots are shared through `Arc`. A version change publishes a fresh
//! snapshot; requests still holding the old one finish against it untouched.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::floor::FloorData;
use crate::graph::Graph;
use crate::store::FloorSource;

/// Identifies one floor of one airport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FloorKey {
    pub airport: String,
    pub floor: String,
}

impl FloorKey {
    pub fn new(airport: &str, floor: &str) -> Self {
        Self {
            airport: airport.to_lowercase(),
            floor: floor.to_string(),
        }
    }
}

impl std::fmt::Display for FloorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.airport, self.floor)
    }
}

/// Floor data, its graph and the version they were built from.
#[derive(Debug)]
pub struct FloorSnapshot {
    pub key: FloorKey,
    pub version: String,
    pub floor: FloorData,
    pub graph: Graph,
}

impl FloorSnapshot {
    pub fn build(key: FloorKey, version: String, floor: FloorData) -> Self {
        let graph = Graph::from_floor(&floor);
        log::info!(
            "Built graph for {} ({} points, {} edges, {} dropped connections)",
            key,
            graph.len(),
            graph.edge_count(),
            graph.dropped_connections().len()
        );
        Self {
            key,
            version,
            floor,
            graph,
        }
    }
}

/// Thread-safe LRU of floor snapshots.
pub struct FloorGraphCache {
    cache: Mutex<LruCache<FloorKey, Arc<FloorSnapshot>>>,
}

impl FloorGraphCache {
    /// Create a cache holding at most `capacity` floors (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<FloorKey, Arc<FloorSnapshot>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached snapshot for `key` if it was built from `version`.
    pub fn get(&self, key: &FloorKey, version: &str) -> Option<Arc<FloorSnapshot>> {
        self.lock()
            .get(key)
            .filter(|snapshot| snapshot.version == version)
            .cloned()
    }

    /// Return the snapshot for `version`, loading and building it on a miss.
    ///
    /// The build runs outside the lock, so concurrent misses may both build;
    /// the last one published wins and both results are equivalent.
    pub fn get_or_build<F>(&self, key: &FloorKey, version: &str, load: F) -> Result<Arc<FloorSnapshot>>
    where
        F: FnOnce() -> Result<FloorSource>,
    {
        if let Some(snapshot) = self.get(key, version) {
            log::debug!("Floor cache hit: {}", key);
            return Ok(snapshot);
        }

        let source = load()?;
        let snapshot = Arc::new(FloorSnapshot::build(key.clone(), source.version, source.data));
        self.lock().put(key.clone(), Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Drop the snapshot for one floor.
    pub fn invalidate(&self, key: &FloorKey) {
        self.lock().pop(key);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
