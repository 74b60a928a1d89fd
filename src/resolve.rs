//! Dependency expansion along `required_knowledge` edges.
//!
//! Traversal is depth-first and bounded by `max_depth`. A visited set seeded with the start
//! node stops every branch at the first re-encounter, so hand-written cycles terminate.
//! A package is expanded only from the path that discovered it first. When that path is
//! already at the depth limit, its own dependencies are not emitted even if a shorter path
//! to the package exists. Names that resolve to no package are dropped.

use std::collections::HashSet;

use crate::search::SearchHit;
use crate::store::{Package, PackageIndex};

/// Dependencies of `name` up to `max_depth` levels, in discovery order, without repeats.
///
/// Depth is measured along the first path that reaches each package, not the shortest.
pub fn resolve<'a>(index: &PackageIndex<'a>, name: &str, max_depth: usize) -> Vec<&'a Package> {
    let mut out = Vec::new();
    let Some(start) = index.get(name) else {
        return out;
    };
    let mut visited = HashSet::from([start.name.as_str()]);
    walk(index, start, 1, max_depth, &mut visited, &mut out);
    out
}

fn walk<'a>(
    index: &PackageIndex<'a>,
    pkg: &'a Package,
    depth: usize,
    max_depth: usize,
    visited: &mut HashSet<&'a str>,
    out: &mut Vec<&'a Package>,
) {
    if depth > max_depth {
        return;
    }
    for dep_name in &pkg.required_knowledge {
        let Some(dep) = index.get(dep_name) else {
            tracing::trace!(from = %pkg.name, missing = %dep_name, "dangling dependency");
            continue;
        };
        if !visited.insert(dep.name.as_str()) {
            continue;
        }
        out.push(dep);
        walk(index, dep, depth + 1, max_depth, visited, out);
    }
}

/// Resolve every hit and collect dependencies that are neither hits themselves nor
/// already collected.
pub fn expand<'a>(index: &PackageIndex<'a>, hits: &[SearchHit], max_depth: usize) -> Vec<&'a Package> {
    let mut seen: HashSet<&str> = hits.iter().map(|h| h.name.as_str()).collect();
    let mut out = Vec::new();
    for hit in hits {
        for dep in resolve(index, &hit.name, max_depth) {
            if seen.insert(dep.name.as_str()) {
                out.push(dep);
            }
        }
    }
    out
}
