//! Per-file fingerprint cache reused across index builds.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::Result;
use crate::store::{write_json_atomic, Package};

pub const CACHE_VERSION: u32 = 1;

/// Last-modified time (ms since the epoch) plus byte size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub modified_ms: u64,
    pub size: u64,
}

impl Fingerprint {
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        let modified_ms = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Ok(Self {
            modified_ms,
            size: meta.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub metadata: Package,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintCache {
    pub version: u32,
    #[serde(default)]
    pub files: BTreeMap<String, CacheEntry>,
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            files: BTreeMap::new(),
        }
    }
}

impl FingerprintCache {
    /// Load the cache. A missing, unreadable, or outdated cache starts empty.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "could not read fingerprint cache");
                }
                return Self::default();
            }
        };

        match serde_json::from_str::<FingerprintCache>(&contents) {
            Ok(cache) if cache.version == CACHE_VERSION => cache,
            Ok(cache) => {
                tracing::info!(found = cache.version, expected = CACHE_VERSION, "discarding outdated fingerprint cache");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding corrupt fingerprint cache");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)
    }

    /// Cached package for `key` if its fingerprint is unchanged.
    pub fn lookup(&self, key: &str, fingerprint: Fingerprint) -> Option<&Package> {
        self.files
            .get(key)
            .filter(|entry| entry.fingerprint == fingerprint)
            .map(|entry| &entry.metadata)
    }

    pub fn insert(&mut self, key: String, fingerprint: Fingerprint, metadata: Package) {
        self.files.insert(
            key,
            CacheEntry {
                fingerprint,
                metadata,
            },
        );
    }

    /// Remove entries whose key is not in `live`. Returns how many were dropped.
    pub fn retain_only(&mut self, live: &HashSet<String>) -> usize {
        let before = self.files.len();
        self.files.retain(|key, _| live.contains(key));
        before - self.files.len()
    }
}
