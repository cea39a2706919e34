//! In-memory copy of the airport list.
//!
//! Loaded once from the store, then served from memory until cleared.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::floor::AirportInfo;

pub struct AirportListCache {
    /// None = not loaded
    inner: RwLock<Option<Vec<AirportInfo>>>,
}

impl Default for AirportListCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AirportListCache {
    /// Create an empty cache (not loaded).
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Vec<AirportInfo>>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Vec<AirportInfo>>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_loaded(&self) -> bool {
        self.read().is_some()
    }

    pub fn get(&self) -> Option<Vec<AirportInfo>> {
        self.read().clone()
    }

    pub fn set(&self, airports: Vec<AirportInfo>) {
        *self.write() = Some(airports);
    }

    /// Cached list, or the result of `load` which is then cached.
    pub fn get_or_load<F>(&self, load: F) -> Result<Vec<AirportInfo>>
    where
        F: FnOnce() -> Result<Vec<AirportInfo>>,
    {
        if let Some(airports) = self.get() {
            return Ok(airports);
        }
        let airports = load()?;
        log::info!("Airport list cache loaded: {} airports", airports.len());
        self.set(airports.clone());
        Ok(airports)
    }

    /// Clear the cache (e.g. after the data directory changed). Next read reloads.
    pub fn clear(&self) {
        *self.write() = None;
    }
}
