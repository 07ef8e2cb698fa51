//! Local registry cache with a five minute freshness window
//!
//! Two files under `.redwood/shadcn/`:
//! - `registry.json`: the last fetched index payload
//! - `metadata.json`: `{ "timestamp": "<ISO-8601>" }` of that fetch
//!
//! The payload is always written before the metadata. A crash between the two
//! writes leaves old or missing metadata, which reads as stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::client::RegistrySource;
use super::component::{validate_index, Component, Registry};
use crate::error::{Result, ShadError};
use crate::paths::ProjectPaths;

/// How long a fetched registry stays fresh
pub const FRESHNESS_WINDOW_SECS: i64 = 5 * 60;

const PAYLOAD_FILE: &str = "registry.json";
const METADATA_FILE: &str = "metadata.json";

/// Cache metadata record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// When the cached payload was fetched
    pub timestamp: DateTime<Utc>,
}

/// Registry cache rooted in a directory
#[derive(Debug, Clone)]
pub struct RegistryCache {
    dir: PathBuf,
}

impl RegistryCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache under the project's generated output directory
    pub fn for_project(paths: &ProjectPaths) -> Self {
        Self::new(paths.registry_cache_dir())
    }

    pub fn payload_path(&self) -> PathBuf {
        self.dir.join(PAYLOAD_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Whether the cache must be refetched now
    pub fn is_stale(&self) -> Result<bool> {
        self.is_stale_at(Utc::now())
    }

    /// Whether the cache must be refetched at `now`
    ///
    /// Stale when the metadata is missing, when its timestamp lies in the
    /// future (clock trouble, don't trust it), when it is older than the
    /// freshness window, or when the payload file is gone.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> Result<bool> {
        let metadata_path = self.metadata_path();
        if !metadata_path.exists() {
            debug!("No registry cache metadata at {}", metadata_path.display());
            return Ok(true);
        }

        let metadata = self.read_metadata()?;

        if now < metadata.timestamp {
            debug!(
                "Registry cache timestamp {} is in the future, refetching",
                metadata.timestamp
            );
            return Ok(true);
        }

        let age = now.signed_duration_since(metadata.timestamp);
        if age > chrono::Duration::seconds(FRESHNESS_WINDOW_SECS) {
            debug!("Registry cache expired (age: {}s)", age.num_seconds());
            return Ok(true);
        }

        Ok(!self.payload_path().exists())
    }

    fn read_metadata(&self) -> Result<CacheMetadata> {
        let path = self.metadata_path();
        let content = read_file(&path)?;
        serde_json::from_str(&content).map_err(|source| ShadError::RegistryCacheCorrupt { path, source })
    }

    /// Read the cached registry payload
    pub fn read(&self) -> Result<Registry> {
        let path = self.payload_path();
        let content = read_file(&path)?;

        let components = serde_json::from_str::<Vec<Component>>(&content)
            .map_err(|source| ShadError::RegistryCacheCorrupt { path, source })?;

        Ok(Registry::new(components))
    }

    /// Persist a fetched payload, then its metadata
    pub fn write(&self, payload: &Value, fetched_at: DateTime<Utc>) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ShadError::io("Failed to create registry cache directory", &self.dir, e))?;

        let payload_path = self.payload_path();
        let content = serde_json::to_string_pretty(payload)
            .map_err(|e| ShadError::file(format!("Failed to serialize registry cache: {e}")))?;
        std::fs::write(&payload_path, content)
            .map_err(|e| ShadError::io("Failed to write registry cache", &payload_path, e))?;

        let metadata_path = self.metadata_path();
        let metadata = CacheMetadata { timestamp: fetched_at };
        let content = serde_json::to_string_pretty(&metadata).map_err(|e| {
            ShadError::file(format!("Failed to serialize registry cache metadata: {e}"))
        })?;
        std::fs::write(&metadata_path, content)
            .map_err(|e| ShadError::io("Failed to write registry cache metadata", &metadata_path, e))?;

        debug!("Saved registry to cache: {}", payload_path.display());
        Ok(())
    }

    /// Remove both cache files
    pub fn clear(&self) -> Result<()> {
        for path in [self.metadata_path(), self.payload_path()] {
            if path.exists() {
                std::fs::remove_file(&path)
                    .map_err(|e| ShadError::io("Failed to remove registry cache", &path, e))?;
            }
        }
        Ok(())
    }

    /// Return the registry, fetching from `source` when the cache is stale
    ///
    /// `refresh` skips the freshness check. Fetch errors are returned as is;
    /// there is no fallback to an expired cache.
    pub async fn load(&self, source: &dyn RegistrySource, refresh: bool) -> Result<Registry> {
        if !refresh && !self.is_stale()? {
            debug!("Using cached registry at {}", self.payload_path().display());
            return self.read();
        }

        let payload = source.fetch_index().await?;
        let registry = validate_index(&payload)?;

        // Caching is best effort, the fetched registry is still good
        if let Err(e) = self.write(&payload, Utc::now()) {
            warn!("Failed to save registry to cache: {}", e);
        }

        Ok(registry)
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ShadError::io("Failed to read registry cache", path, e))
}
