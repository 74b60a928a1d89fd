//! Package delivery: resolve names to documents, skipping what this session already has.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::category::CategoryPath;
use crate::error::{Result, TomeError};
use crate::session::{SessionStore, SessionTracker};
use crate::store::KnowledgeStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedPackage {
    pub name: String,
    pub category: CategoryPath,
    /// Document location resolved against the project root.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadOutcome {
    pub loaded: Vec<LoadedPackage>,
    pub already_loaded: Vec<String>,
}

/// Deliver `names`. Unknown names fail the whole load before anything is marked.
///
/// Session bookkeeping is best effort: if the session cannot be read every name is
/// delivered, and failures to mark or to record the read are only logged.
pub fn load<S: SessionStore>(
    store: &KnowledgeStore,
    tracker: &mut SessionTracker<S>,
    project_root: &Path,
    names: &[String],
    tracking_id: Option<&str>,
) -> Result<LoadOutcome> {
    if names.is_empty() {
        return Err(TomeError::MissingArgument("packages"));
    }

    let index = store.index();
    let unknown: Vec<String> = names
        .iter()
        .filter(|n| !index.contains(n))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(TomeError::UnknownPackages(unknown));
    }

    let filtered = match tracker.filter_unloaded(names) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(error = %e, "session unavailable; loading every requested package");
            crate::session::FilterResult {
                unloaded: names.to_vec(),
                already_loaded: Vec::new(),
            }
        }
    };

    let loaded: Vec<LoadedPackage> = filtered
        .unloaded
        .iter()
        .filter_map(|name| index.get(name))
        .map(|pkg| LoadedPackage {
            name: pkg.name.clone(),
            category: pkg.category.clone(),
            path: resolve_document(project_root, &pkg.knowledge_path),
        })
        .collect();

    for pkg in &loaded {
        if !pkg.path.exists() {
            tracing::warn!(name = %pkg.name, path = %pkg.path.display(), "document missing on disk; rebuild the index");
        }
    }

    if let Err(e) = tracker.mark_loaded(&filtered.unloaded) {
        tracing::error!(error = %e, "failed to mark packages loaded");
    }
    if let Some(id) = tracking_id {
        if let Err(e) = tracker.record_read(id, filtered.unloaded.clone()) {
            tracing::error!(tracking_id = id, error = %e, "failed to record read");
        }
    }

    tracing::info!(
        loaded = loaded.len(),
        already_loaded = filtered.already_loaded.len(),
        "packages delivered"
    );
    Ok(LoadOutcome {
        loaded,
        already_loaded: filtered.already_loaded,
    })
}

fn resolve_document(project_root: &Path, knowledge_path: &str) -> PathBuf {
    let path = Path::new(knowledge_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
