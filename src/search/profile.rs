//! Command-profile search: always-loaded packages, then the profile's own filters.

use std::collections::HashSet;

use super::{search, Provenance, SearchHit, SearchQuery};
use crate::error::Result;
use crate::store::{KnowledgeStore, PackageIndex};

/// Run the named profile. The caller's tags are added to the profile's tags; the caller's
/// source path and result cap carry through to the filtered search.
pub fn search_by_profile(
    store: &KnowledgeStore,
    index: &PackageIndex<'_>,
    profile_name: &str,
    query: &SearchQuery,
) -> Result<Vec<SearchHit>> {
    let profile = store.profile(profile_name)?;
    let mut results = Vec::new();
    let mut seen = HashSet::new();

    for name in &profile.always_load {
        match index.get(name) {
            Some(pkg) => {
                if seen.insert(pkg.name.clone()) {
                    results.push(SearchHit::from_package(pkg, Provenance::AlwaysLoad));
                }
            }
            None => {
                tracing::warn!(profile = profile_name, name = %name, "always_load package not in store");
            }
        }
    }

    let filters = &profile.search_filters;
    if filters.is_active(&query.tags) {
        let mut tags = filters.tags.clone();
        tags.extend(query.tags.iter().cloned());
        let filtered = SearchQuery {
            tags,
            text: None,
            category: filters.category.clone(),
            agent: None,
            source_file_path: query.source_file_path.clone(),
            max_results: query.max_results,
        };
        for mut hit in search(store, &filtered) {
            if seen.insert(hit.name.clone()) {
                hit.source = Provenance::SearchFilters;
                results.push(hit);
            }
        }
    }

    if !profile.exclude_categories.is_empty() {
        results.retain(|hit| {
            !profile
                .exclude_categories
                .iter()
                .any(|excluded| excluded.contains(&hit.category))
        });
    }

    Ok(results)
}
