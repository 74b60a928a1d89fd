//! Incremental index build: walk the vault, reuse cached metadata for unchanged files,
//! parse the rest, and write the knowledge store.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::{DirEntry, WalkDir};

use super::cache::{Fingerprint, FingerprintCache};
use super::frontmatter;
use crate::config::{BuildConfig, TomeConfig};
use crate::error::{FileError, Result, TomeError};
use crate::store::{KnowledgeStore, Package};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "_templates"];

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Delete the fingerprint cache first so every document is reparsed.
    pub force_rebuild: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    Parsed,
    Cached,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileTiming {
    pub path: String,
    pub elapsed: Duration,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub total_files: usize,
    pub package_count: usize,
    pub rebuilt: usize,
    pub cached: usize,
    pub skipped: usize,
    /// Names dropped because an earlier document already claimed them.
    pub duplicates: Vec<String>,
    /// Cache entries removed because their document no longer exists.
    pub evicted: usize,
    pub elapsed: Duration,
    /// Over the soft threshold but under the hard ceiling.
    pub slow: bool,
    pub timings: Vec<FileTiming>,
}

impl BuildReport {
    /// Cached share of indexed documents, as a whole percentage.
    pub fn hit_rate_percent(&self) -> u32 {
        let indexed = self.rebuilt + self.cached;
        if indexed == 0 {
            return 0;
        }
        ((self.cached as f64 / indexed as f64) * 100.0).round() as u32
    }

    pub fn average_parse_time(&self) -> Duration {
        let parsed: Vec<_> = self.parsed_timings().collect();
        if parsed.is_empty() {
            return Duration::ZERO;
        }
        parsed.iter().map(|t| t.elapsed).sum::<Duration>() / parsed.len() as u32
    }

    /// The `n` slowest freshly parsed documents, slowest first.
    pub fn slowest(&self, n: usize) -> Vec<&FileTiming> {
        let mut parsed: Vec<_> = self.parsed_timings().collect();
        parsed.sort_by(|a, b| b.elapsed.cmp(&a.elapsed));
        parsed.truncate(n);
        parsed
    }

    fn parsed_timings(&self) -> impl Iterator<Item = &FileTiming> {
        self.timings
            .iter()
            .filter(|t| t.outcome == FileOutcome::Parsed)
    }
}

/// Rebuild the knowledge store for the configured vault.
///
/// Every failing document is collected before the build fails; nothing is written in that
/// case. Command profiles in the existing store are carried over.
pub fn build(config: &TomeConfig, options: &BuildOptions) -> Result<BuildReport> {
    let started = Instant::now();
    let vault_root = config.vault_root();
    let store_path = config.store_path();
    let cache_path = config.cache_path();

    if !vault_root.is_dir() {
        return Err(TomeError::VaultNotFound(vault_root));
    }

    if options.force_rebuild {
        match std::fs::remove_file(&cache_path) {
            Ok(()) => tracing::info!(path = %cache_path.display(), "fingerprint cache cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    let mut cache = FingerprintCache::load(&cache_path);
    let mut store = KnowledgeStore {
        command_profiles: previous_profiles(&store_path),
        ..Default::default()
    };

    let documents = collect_documents(&vault_root)?;
    tracing::debug!(vault = %vault_root.display(), files = documents.len(), "scanning vault");

    let mut report = BuildReport {
        total_files: documents.len(),
        package_count: 0,
        rebuilt: 0,
        cached: 0,
        skipped: 0,
        duplicates: Vec::new(),
        evicted: 0,
        elapsed: Duration::ZERO,
        slow: false,
        timings: Vec::with_capacity(documents.len()),
    };
    let mut errors = Vec::new();
    let mut live_keys = HashSet::new();
    let mut claimed: HashMap<String, String> = HashMap::new();

    for path in &documents {
        let file_started = Instant::now();
        let key = relative_path(&config.project_root, path);
        live_keys.insert(key.clone());

        let indexed = match index_document(path, &key, &mut cache) {
            Ok(indexed) => indexed,
            Err(e) => {
                tracing::error!(path = %key, error = %e, "failed to index document");
                errors.push(FileError {
                    path: path.clone(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let outcome = match indexed {
            Indexed::Skipped => {
                report.skipped += 1;
                FileOutcome::Skipped
            }
            Indexed::Package { package, from_cache } => {
                if let Some(first) = claimed.get(&package.name) {
                    tracing::warn!(
                        name = %package.name,
                        kept = %first,
                        ignored = %key,
                        "duplicate package name; keeping the first document"
                    );
                    report.duplicates.push(package.name.clone());
                } else {
                    claimed.insert(package.name.clone(), key.clone());
                    store.insert(package);
                }
                if from_cache {
                    report.cached += 1;
                    FileOutcome::Cached
                } else {
                    report.rebuilt += 1;
                    FileOutcome::Parsed
                }
            }
        };

        report.timings.push(FileTiming {
            path: key,
            elapsed: file_started.elapsed(),
            outcome,
        });
    }

    if !errors.is_empty() {
        return Err(TomeError::BuildFailed(errors));
    }

    report.evicted = cache.retain_only(&live_keys);
    cache.save(&cache_path)?;
    store.save(&store_path)?;
    report.package_count = store.package_count();

    report.elapsed = started.elapsed();
    report.slow = check_limits(report.elapsed, &config.build)?;
    let elapsed_ms = report.elapsed.as_millis() as u64;

    tracing::info!(
        packages = report.package_count,
        rebuilt = report.rebuilt,
        cached = report.cached,
        skipped = report.skipped,
        elapsed_ms,
        "knowledge index built"
    );
    Ok(report)
}

/// Compare build time against the configured limits.
///
/// Over the hard ceiling is an error. Over the soft threshold returns `true` and logs a
/// warning; the build still counts as successful.
fn check_limits(elapsed: Duration, limits: &BuildConfig) -> Result<bool> {
    let elapsed_ms = elapsed.as_millis() as u64;
    if elapsed > Duration::from_millis(limits.hard_limit_ms) {
        return Err(TomeError::BuildTooSlow {
            elapsed_ms,
            limit_ms: limits.hard_limit_ms,
        });
    }
    if elapsed > Duration::from_millis(limits.soft_warn_ms) {
        tracing::warn!(
            elapsed_ms,
            threshold_ms = limits.soft_warn_ms,
            "index build is slow; consider reducing the vault size"
        );
        return Ok(true);
    }
    Ok(false)
}

enum Indexed {
    Skipped,
    Package { package: Package, from_cache: bool },
}

fn index_document(path: &Path, key: &str, cache: &mut FingerprintCache) -> Result<Indexed> {
    let fingerprint = Fingerprint::of(path)?;
    let name = package_name(path);

    if let Some(cached) = cache.lookup(key, fingerprint) {
        let mut package = cached.clone();
        package.name = name;
        return Ok(Indexed::Package {
            package,
            from_cache: true,
        });
    }

    let content = std::fs::read_to_string(path)?;
    let package = frontmatter::parse(&content)?.and_then(|fm| fm.into_package(&name, key));
    match package {
        Some(package) => {
            cache.insert(key.to_string(), fingerprint, package.clone());
            Ok(Indexed::Package {
                package,
                from_cache: false,
            })
        }
        None => {
            tracing::debug!(path = %key, "no complete metadata block; skipping");
            cache.files.remove(key);
            Ok(Indexed::Skipped)
        }
    }
}

fn previous_profiles(
    store_path: &Path,
) -> std::collections::BTreeMap<String, crate::store::CommandProfile> {
    match KnowledgeStore::load(store_path) {
        Ok(store) => store.command_profiles,
        Err(TomeError::StoreNotFound(_)) => Default::default(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read previous store; command profiles reset");
            Default::default()
        }
    }
}

/// All markdown documents under `root`, sorted by path.
pub fn collect_documents(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("md")
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

fn package_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `path` relative to `base` with forward slashes, or the full path if it is outside.
pub fn relative_path(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(soft_warn_ms: u64, hard_limit_ms: u64) -> BuildConfig {
        BuildConfig {
            soft_warn_ms,
            hard_limit_ms,
        }
    }

    #[test]
    fn under_soft_threshold_is_not_slow() {
        let slow = check_limits(Duration::from_millis(200), &limits(1_000, 20_000)).unwrap();
        assert!(!slow);
    }

    #[test]
    fn between_thresholds_is_slow_but_ok() {
        let slow = check_limits(Duration::from_millis(1_500), &limits(1_000, 20_000)).unwrap();
        assert!(slow);
    }

    #[test]
    fn over_hard_ceiling_fails() {
        let err = check_limits(Duration::from_millis(25_000), &limits(1_000, 20_000)).unwrap_err();
        match err {
            TomeError::BuildTooSlow {
                elapsed_ms,
                limit_ms,
            } => {
                assert_eq!(elapsed_ms, 25_000);
                assert_eq!(limit_ms, 20_000);
            }
            other => panic!("expected BuildTooSlow, got {other:?}"),
        }
    }

    #[test]
    fn exactly_at_a_limit_is_within_it() {
        assert!(!check_limits(Duration::from_millis(1_000), &limits(1_000, 20_000)).unwrap());
        assert!(check_limits(Duration::from_millis(20_000), &limits(1_000, 20_000)).is_ok());
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let base = Path::new("/project");
        assert_eq!(
            relative_path(base, Path::new("/project/.tome/vault/a.md")),
            ".tome/vault/a.md"
        );
        assert_eq!(relative_path(base, Path::new("/elsewhere/b.md")), "/elsewhere/b.md");
    }
}
