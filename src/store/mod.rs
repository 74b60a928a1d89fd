//! The consolidated knowledge store: `category → name → Package`, plus command profiles.
//!
//! Written only by the index builder; every other component loads it read-only.

pub mod types;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use crate::error::{Result, TomeError};
pub use types::{CommandProfile, Package, ProfileFilters};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeStore {
    /// Packages grouped by category string, then by package name.
    #[serde(default)]
    pub knowledge: BTreeMap<String, BTreeMap<String, Package>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub command_profiles: BTreeMap<String, CommandProfile>,
}

impl KnowledgeStore {
    /// Load the store from disk. A missing file is a configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TomeError::StoreNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut store: KnowledgeStore =
            serde_json::from_str(&contents).map_err(|e| TomeError::StoreInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        // Map keys are authoritative for names.
        for packages in store.knowledge.values_mut() {
            for (name, pkg) in packages.iter_mut() {
                pkg.name.clone_from(name);
            }
        }

        tracing::debug!(
            path = %path.display(),
            packages = store.package_count(),
            profiles = store.command_profiles.len(),
            "knowledge store loaded"
        );
        Ok(store)
    }

    /// Write the store as pretty JSON via a temp file and rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json_atomic(path.as_ref(), self)
    }

    /// Insert a package under its own category. Replaces any package with the same
    /// name in that category.
    pub fn insert(&mut self, package: Package) {
        self.knowledge
            .entry(package.category.to_string())
            .or_default()
            .insert(package.name.clone(), package);
    }

    pub fn package_count(&self) -> usize {
        self.knowledge.values().map(BTreeMap::len).sum()
    }

    /// All packages in category order, then name order.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.knowledge.values().flat_map(BTreeMap::values)
    }

    /// Sorted category names.
    pub fn categories(&self) -> Vec<&str> {
        self.knowledge.keys().map(String::as_str).collect()
    }

    /// Sorted, deduplicated tags across every package.
    pub fn tags(&self) -> Vec<&str> {
        self.packages()
            .flat_map(|p| p.tags.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Look up a command profile, failing with the list of valid names.
    pub fn profile(&self, name: &str) -> Result<&CommandProfile> {
        self.command_profiles
            .get(name)
            .ok_or_else(|| TomeError::UnknownProfile {
                name: name.to_string(),
                available: self.command_profiles.keys().cloned().collect(),
            })
    }

    /// Build a name → package lookup.
    pub fn index(&self) -> PackageIndex<'_> {
        PackageIndex::new(self)
    }
}

/// O(1) lookup of packages by name across all categories.
///
/// If a name appears in more than one category, the first one (in category order) wins.
pub struct PackageIndex<'a> {
    by_name: HashMap<&'a str, &'a Package>,
}

impl<'a> PackageIndex<'a> {
    fn new(store: &'a KnowledgeStore) -> Self {
        let mut by_name: HashMap<&'a str, &'a Package> = HashMap::new();
        for pkg in store.packages() {
            if let Some(existing) = by_name.get(pkg.name.as_str()) {
                tracing::warn!(
                    name = %pkg.name,
                    kept = %existing.category,
                    ignored = %pkg.category,
                    "duplicate package name; first occurrence will be used"
                );
                continue;
            }
            by_name.insert(pkg.name.as_str(), pkg);
        }
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&'a Package> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Serialize `value` as pretty JSON to `path` atomically (tmp + rename).
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
