//! File-backed airport data store.
//!
//! Layout under the configured data directory:
//!
//! ```text
//! airports/<code>/info.json
//! airports/<code>/gates.json
//! airports/<code>/amenities.json
//! airports/<code>/floors/<floor>.json | .yaml | .yml
//! ```

use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{GatewalkError, Result};
use crate::floor::{AirportDetails, AirportInfo, FloorData, FloorFormat};

const FLOOR_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// A parsed floor together with the version key of its source bytes.
#[derive(Debug, Clone)]
pub struct FloorSource {
    pub data: FloorData,
    /// Hex SHA-256 of the raw file contents.
    pub version: String,
    pub path: PathBuf,
}

/// Raw floor file contents with their version key.
#[derive(Debug, Clone)]
pub struct FloorBytes {
    pub bytes: Vec<u8>,
    pub version: String,
    pub path: PathBuf,
}

impl FloorBytes {
    /// Parse using the format implied by the file extension.
    pub fn parse(self) -> Result<FloorSource> {
        let format = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FloorFormat::from_extension)
            .unwrap_or(FloorFormat::Json);
        let data = FloorData::parse(&self.bytes, format)?;
        Ok(FloorSource {
            data,
            version: self.version,
            path: self.path,
        })
    }
}

/// Read-only access to airport and floor documents on disk.
#[derive(Debug, Clone)]
pub struct AirportStore {
    root: PathBuf,
    id_pattern: Regex,
}

impl AirportStore {
    /// Create a store over `data_dir` (the directory that contains `airports/`).
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let id_pattern = Regex::new(r"^[A-Za-z0-9_-]{1,32}$")
            .map_err(|e| GatewalkError::Config(format!("Invalid id pattern: {}", e)))?;
        Ok(Self {
            root: data_dir.as_ref().join("airports"),
            id_pattern,
        })
    }

    /// Directory that holds one sub-directory per airport.
    pub fn airports_dir(&self) -> &Path {
        &self.root
    }

    /// Directory names under `airports/`, sorted. These are the codes every
    /// other lookup takes, whatever `info.json` says.
    pub fn airport_codes(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(GatewalkError::Config(format!(
                "Airports directory does not exist: {}",
                self.root.display()
            )));
        }

        Ok(WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect())
    }

    /// Every airport directory, sorted by code. Directories without a readable
    /// `info.json` are listed with a placeholder name.
    pub fn list_airports(&self) -> Result<Vec<AirportInfo>> {
        let mut airports = Vec::new();
        for code in self.airport_codes()? {
            let path = self.root.join(&code).join("info.json");
            let info = match self.read_json::<AirportInfo>(&path) {
                Ok(Some(mut info)) => {
                    if info.code.is_empty() {
                        info.code = code.clone();
                    }
                    info
                }
                Ok(None) => AirportInfo::placeholder(&code),
                Err(e) => {
                    log::warn!("Unreadable info.json for airport {}: {}", code, e);
                    AirportInfo::placeholder(&code)
                }
            };
            airports.push(info);
        }

        log::debug!("Listed {} airports in {}", airports.len(), self.root.display());
        Ok(airports)
    }

    /// Airport info only.
    pub fn airport_info(&self, code: &str) -> Result<AirportInfo> {
        let dir = self.airport_dir(code)?;
        let code = code.to_lowercase();
        Ok(self
            .read_json::<AirportInfo>(&dir.join("info.json"))?
            .map(|mut info| {
                if info.code.is_empty() {
                    info.code = code.clone();
                }
                info
            })
            .unwrap_or_else(|| AirportInfo::placeholder(&code)))
    }

    /// Airport info plus gates and amenities. Missing files default to empty.
    pub fn airport(&self, code: &str) -> Result<AirportDetails> {
        let dir = self.airport_dir(code)?;
        let info = self.airport_info(code)?;
        let gates = self
            .read_json::<Vec<Value>>(&dir.join("gates.json"))?
            .unwrap_or_default();
        let amenities = self
            .read_json::<Vec<Value>>(&dir.join("amenities.json"))?
            .unwrap_or_default();
        Ok(AirportDetails {
            info,
            gates,
            amenities,
        })
    }

    /// Floor ids available for an airport, sorted.
    pub fn floor_ids(&self, code: &str) -> Result<Vec<String>> {
        let floors_dir = self.airport_dir(code)?.join("floors");
        if !floors_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<String> = WalkDir::new(&floors_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let path = e.path();
                let ext = path.extension()?.to_str()?.to_lowercase();
                if !FLOOR_EXTENSIONS.contains(&ext.as_str()) {
                    return None;
                }
                path.file_stem()?.to_str().map(str::to_string)
            })
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Read and parse a floor, returning its content version.
    pub fn read_floor(&self, code: &str, floor: &str) -> Result<FloorSource> {
        self.read_floor_bytes(code, floor)?.parse()
    }

    /// Read a floor's raw bytes and hash them, leaving parsing to the caller.
    pub fn read_floor_bytes(&self, code: &str, floor: &str) -> Result<FloorBytes> {
        let path = self.floor_path(code, floor)?;
        let bytes = std::fs::read(&path)?;
        Ok(FloorBytes {
            version: content_version(&bytes),
            bytes,
            path,
        })
    }

    /// Version key of a floor without parsing it.
    pub fn floor_version(&self, code: &str, floor: &str) -> Result<String> {
        Ok(self.read_floor_bytes(code, floor)?.version)
    }

    fn floor_path(&self, code: &str, floor: &str) -> Result<PathBuf> {
        self.validate_id("floor", floor)?;
        let floors_dir = self.airport_dir(code)?.join("floors");
        FLOOR_EXTENSIONS
            .iter()
            .map(|ext| floors_dir.join(format!("{}.{}", floor, ext)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| GatewalkError::FloorNotFound {
                airport: code.to_lowercase(),
                floor: floor.to_string(),
            })
    }

    fn airport_dir(&self, code: &str) -> Result<PathBuf> {
        self.validate_id("airport code", code)?;
        let dir = self.root.join(code.to_lowercase());
        if !dir.is_dir() {
            return Err(GatewalkError::AirportNotFound(code.to_string()));
        }
        Ok(dir)
    }

    fn validate_id(&self, what: &str, value: &str) -> Result<()> {
        if self.id_pattern.is_match(value) {
            Ok(())
        } else {
            Err(GatewalkError::InvalidInput(format!("Invalid {}: '{}'", what, value)))
        }
    }

    /// `Ok(None)` when the file does not exist.
    fn read_json<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GatewalkError::Io(e)),
        }
    }
}

/// Hex SHA-256 of raw floor bytes.
pub fn content_version(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
