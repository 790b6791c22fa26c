//! Cache entry persistence.
//!
//! Each entry is a small JSON envelope written to `{dir}/{digest}`. The
//! envelope repeats the request key so a file that does not belong to the key
//! being loaded is reported as corrupt rather than silently replayed.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::hash::request_digest;
use super::mode::CacheMode;
use crate::Error;

/// On-disk envelope for one cached response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub key: String,
    pub stored_at: String,
    pub payload: T,
}

/// Response cache handle.
///
/// The mode is fixed at construction. In `store` mode the backing directory
/// is wiped and recreated by [`ResponseCache::configure`], before any entry
/// can be written.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    mode: CacheMode,
    dir: PathBuf,
}

impl ResponseCache {
    /// Create a cache handle for `dir` in the given mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory cannot be wiped or recreated in
    /// `store` mode.
    pub fn configure(mode: CacheMode, dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();

        if mode == CacheMode::Store {
            wipe(&dir)?;
            tracing::info!(dir = %dir.display(), "wiped response cache for store mode");
        }

        Ok(Self { mode, dir })
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Storage path for a request key.
    pub fn key_path(&self, request_key: &str) -> PathBuf {
        self.dir.join(request_digest(request_key))
    }

    /// Replay a stored response.
    ///
    /// Never falls back to a live fetch.
    ///
    /// # Errors
    ///
    /// - `Error::CacheModeMismatch` unless the cache is in `reuse` mode
    /// - `Error::CacheMiss` if nothing was stored for the key
    /// - `Error::CacheCorrupt` if the entry cannot be decoded or belongs to another key
    pub fn load<T: DeserializeOwned>(&self, request_key: &str) -> Result<T, Error> {
        if self.mode != CacheMode::Reuse {
            return Err(Error::CacheModeMismatch { operation: "load", mode: self.mode.to_string() });
        }

        let path = self.key_path(request_key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::CacheMiss { key: request_key.to_string() });
            }
            Err(e) => return Err(Error::io(format!("read cache entry {}", path.display()), e)),
        };

        let entry: CacheEntry<T> =
            serde_json::from_slice(&bytes).map_err(|e| Error::CacheCorrupt { path: path.clone(), reason: e.to_string() })?;

        if entry.key != request_key {
            return Err(Error::CacheCorrupt { path, reason: format!("entry belongs to request '{}'", entry.key) });
        }

        tracing::debug!(key = request_key, stored_at = %entry.stored_at, "cache hit");
        Ok(entry.payload)
    }

    /// Record a live response.
    ///
    /// The entry is written to a temporary file in the cache directory and
    /// renamed into place.
    ///
    /// # Errors
    ///
    /// - `Error::CacheModeMismatch` unless the cache is in `store` mode
    /// - `Error::Io` if the entry cannot be serialized or written
    pub fn store<T: Serialize>(&self, request_key: &str, payload: &T) -> Result<(), Error> {
        if self.mode != CacheMode::Store {
            return Err(Error::CacheModeMismatch { operation: "store", mode: self.mode.to_string() });
        }

        let entry = CacheEntry {
            key: request_key.to_string(),
            stored_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            payload,
        };
        let bytes = serde_json::to_vec(&entry).map_err(|e| Error::io("serialize cache entry", e.into()))?;

        let path = self.key_path(request_key);
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| Error::io(format!("create temp file in {}", self.dir.display()), e))?;
        tmp.write_all(&bytes)
            .map_err(|e| Error::io("write cache entry", e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| Error::io("sync cache entry", e))?;
        tmp.persist(&path)
            .map_err(|e| Error::io(format!("persist cache entry {}", path.display()), e.error))?;

        tracing::debug!(key = request_key, path = %path.display(), bytes = bytes.len(), "cache store");
        Ok(())
    }
}

/// Remove `dir` recursively (absence is fine) and recreate it empty.
fn wipe(dir: &Path) -> Result<(), Error> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(format!("remove cache dir {}", dir.display()), e)),
    }
    fs::create_dir_all(dir).map_err(|e| Error::io(format!("create cache dir {}", dir.display()), e))
}
