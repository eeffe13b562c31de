//! Durable cache snapshots, the localStorage analogue.
//!
//! One JSON file per resource type under the data directory, overwritten
//! wholesale after every successful load and read back only when a load
//! fails. Snapshots are never expired; a stale page beats an empty
//! dashboard when the network is down. A `DashMap` overlay avoids re-reading
//! the file for repeated fallbacks within a session.

use std::path::{Path, PathBuf};

use chrono::Utc;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::resource::Resource;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The persisted `{items, stats, timestamp}` tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "R: Resource")]
pub struct CacheSnapshot<R: Resource> {
    pub items: Vec<R>,
    pub stats: R::Stats,
    /// Unix millis of the load this snapshot mirrors.
    pub timestamp: i64,
}

impl<R: Resource> CacheSnapshot<R> {
    pub fn now(items: Vec<R>, stats: R::Stats) -> Self {
        Self {
            items,
            stats,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

pub struct SnapshotStore {
    dir: PathBuf,
    overlay: DashMap<String, Value>,
}

impl SnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            overlay: DashMap::new(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_value(value)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), serde_json::to_string_pretty(&json)?)?;
        self.overlay.insert(key.to_string(), json);
        Ok(())
    }

    /// Read back the last snapshot for `key`. Tolerant by design: any
    /// missing file or undecodable content reads as `None`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if let Some(cached) = self.overlay.get(key) {
            if let Ok(value) = serde_json::from_value(cached.clone()) {
                return Some(value);
            }
        }

        let raw = std::fs::read_to_string(self.path_for(key)).ok()?;
        let json: Value = serde_json::from_str(&raw).ok()?;
        let decoded = serde_json::from_value(json.clone()).ok()?;
        self.overlay.insert(key.to_string(), json);
        Some(decoded)
    }

    pub fn clear(&self, key: &str) {
        self.overlay.remove(key);
        let _ = std::fs::remove_file(self.path_for(key));
    }
}
