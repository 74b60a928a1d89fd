//! Corpus validation: data-quality checks that never block search or build.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::category::CategoryPath;
use crate::error::Result;
use crate::index::collect_documents;
use crate::store::{KnowledgeStore, Package, PackageIndex};

/// Categories allowed to stay flat.
const FLAT_CATEGORY_ROOTS: &[&str] = &["business", "ai"];
const MIN_TAGS: usize = 3;
const MAX_TAGS: usize = 12;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PackageFindings {
    pub name: String,
    pub category: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl PackageFindings {
    fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub packages_checked: usize,
    /// Packages with at least one finding.
    pub packages: Vec<PackageFindings>,
    pub category_warnings: Vec<String>,
    /// Markdown documents under the vault that no package points at.
    pub orphaned: Vec<PathBuf>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.packages.iter().map(|p| p.errors.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.packages.iter().map(|p| p.warnings.len()).sum::<usize>()
            + self.category_warnings.len()
            + self.orphaned.len()
    }

    /// `category/name` of every package with errors.
    pub fn failed_packages(&self) -> Vec<String> {
        self.packages
            .iter()
            .filter(|p| !p.errors.is_empty())
            .map(|p| format!("{}/{}", p.category, p.name))
            .collect()
    }

    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }
}

pub fn validate(
    store: &KnowledgeStore,
    project_root: &Path,
    vault_root: &Path,
) -> Result<ValidationReport> {
    let index = store.index();
    let mut report = ValidationReport::default();

    for (category, packages) in &store.knowledge {
        if packages.is_empty() {
            report
                .category_warnings
                .push(format!("category \"{category}\" has no packages"));
        }
        if category.trim().is_empty() {
            report
                .category_warnings
                .push("a category has an empty name".to_string());
        } else if !CategoryPath::new(category).is_hierarchical()
            && !FLAT_CATEGORY_ROOTS.contains(&category.as_str())
        {
            report.category_warnings.push(format!(
                "category \"{category}\" might need hierarchical structure (e.g. \"domain/subcategory\")"
            ));
        }
    }

    let cycles = find_cycles(&index, store.packages());
    let mut cycle_owner: HashMap<&str, Vec<&Vec<String>>> = HashMap::new();
    for cycle in &cycles {
        if let Some(first) = cycle.first() {
            cycle_owner.entry(first.as_str()).or_default().push(cycle);
        }
    }

    for pkg in store.packages() {
        report.packages_checked += 1;
        let mut findings = check_package(pkg, &index, project_root);
        for cycle in cycle_owner.get(pkg.name.as_str()).into_iter().flatten() {
            let mut path = (*cycle).clone();
            path.push(cycle[0].clone());
            findings
                .errors
                .push(format!("circular dependency: {}", path.join(" → ")));
        }
        if !findings.is_clean() {
            report.packages.push(findings);
        }
    }

    report.orphaned = find_orphans(store, project_root, vault_root)?;

    tracing::info!(
        checked = report.packages_checked,
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validation finished"
    );
    Ok(report)
}

fn check_package(pkg: &Package, index: &PackageIndex<'_>, project_root: &Path) -> PackageFindings {
    let mut f = PackageFindings {
        name: pkg.name.clone(),
        category: pkg.category.to_string(),
        ..Default::default()
    };

    let path = resolve(project_root, &pkg.knowledge_path);
    if !path.is_file() {
        f.errors.push(format!("document not found: {}", path.display()));
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem != pkg.name {
        f.errors.push(format!(
            "package name \"{}\" doesn't match file name \"{stem}.md\"",
            pkg.name
        ));
    }

    if let Some(first) = index.get(&pkg.name) {
        if first.category != pkg.category {
            f.warnings.push(format!(
                "name is also registered under \"{}\"; that entry wins lookups",
                first.category
            ));
        }
    }

    if pkg.tags.is_empty() {
        f.errors.push("package has no tags".to_string());
    } else if pkg.tags.len() > MAX_TAGS {
        f.warnings
            .push(format!("too many tags: {} (recommend {MIN_TAGS}-{MAX_TAGS})", pkg.tags.len()));
    } else if pkg.tags.len() < MIN_TAGS {
        f.warnings
            .push(format!("too few tags: {} (recommend {MIN_TAGS}-{MAX_TAGS})", pkg.tags.len()));
    }
    for tag in &pkg.tags {
        if tag.contains(' ') {
            f.errors
                .push(format!("tag contains spaces: \"{tag}\" (use kebab-case)"));
        }
        if *tag != tag.to_lowercase() {
            f.warnings.push(format!(
                "tag not lowercase: \"{tag}\" (should be \"{}\")",
                tag.to_lowercase()
            ));
        }
        if tag.contains('_') {
            f.warnings.push(format!(
                "tag uses underscore: \"{tag}\" (should be \"{}\")",
                tag.replace('_', "-")
            ));
        }
    }

    if !is_kebab_case(&pkg.name) {
        f.warnings
            .push(format!("package name \"{}\" is not kebab-case", pkg.name));
    }

    for dep in &pkg.required_knowledge {
        if !index.contains(dep) {
            f.errors.push(format!(
                "required_knowledge references unknown package \"{dep}\""
            ));
        }
    }

    f
}

/// Lowercase alphanumeric words joined by single hyphens.
pub fn is_kebab_case(name: &str) -> bool {
    !name.is_empty()
        && name.split('-').all(|word| {
            !word.is_empty()
                && word
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Each dependency cycle once, rotated so its smallest name comes first.
fn find_cycles<'a>(
    index: &PackageIndex<'a>,
    packages: impl Iterator<Item = &'a Package>,
) -> Vec<Vec<String>> {
    let mut marks: HashMap<&'a str, Mark> = HashMap::new();
    let mut stack: Vec<&'a str> = Vec::new();
    let mut found: BTreeSet<Vec<String>> = BTreeSet::new();

    for pkg in packages {
        if !marks.contains_key(pkg.name.as_str()) {
            visit(index, pkg, &mut marks, &mut stack, &mut found);
        }
    }
    found.into_iter().collect()
}

fn visit<'a>(
    index: &PackageIndex<'a>,
    pkg: &'a Package,
    marks: &mut HashMap<&'a str, Mark>,
    stack: &mut Vec<&'a str>,
    found: &mut BTreeSet<Vec<String>>,
) {
    marks.insert(pkg.name.as_str(), Mark::Visiting);
    stack.push(pkg.name.as_str());

    for dep_name in &pkg.required_knowledge {
        let Some(dep) = index.get(dep_name) else {
            continue;
        };
        match marks.get(dep.name.as_str()) {
            Some(Mark::Visiting) => {
                if let Some(start) = stack.iter().position(|n| *n == dep.name) {
                    found.insert(canonical_cycle(&stack[start..]));
                }
            }
            Some(Mark::Done) => {}
            None => visit(index, dep, marks, stack, found),
        }
    }

    stack.pop();
    marks.insert(pkg.name.as_str(), Mark::Done);
}

fn canonical_cycle(cycle: &[&str]) -> Vec<String> {
    let min = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, name)| **name)
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[min..]
        .iter()
        .chain(&cycle[..min])
        .map(|s| s.to_string())
        .collect()
}

fn find_orphans(
    store: &KnowledgeStore,
    project_root: &Path,
    vault_root: &Path,
) -> Result<Vec<PathBuf>> {
    if !vault_root.is_dir() {
        return Ok(Vec::new());
    }
    let registered: HashSet<PathBuf> = store
        .packages()
        .map(|p| resolve(project_root, &p.knowledge_path))
        .collect();
    Ok(collect_documents(vault_root)?
        .into_iter()
        .filter(|doc| !registered.contains(doc))
        .collect())
}

fn resolve(project_root: &Path, knowledge_path: &str) -> PathBuf {
    let path = Path::new(knowledge_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryPath;

    fn pkg(name: &str, category: &str, tags: &[&str], deps: &[&str]) -> Package {
        Package {
            name: name.into(),
            category: CategoryPath::new(category),
            description: "d".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            required_knowledge: deps.iter().map(|d| d.to_string()).collect(),
            used_by_agents: vec![],
            knowledge_path: format!("vault/{name}.md"),
        }
    }

    #[test]
    fn kebab_case_rules() {
        assert!(is_kebab_case("react-testing-2"));
        assert!(!is_kebab_case("React-testing"));
        assert!(!is_kebab_case("react_testing"));
        assert!(!is_kebab_case("react--testing"));
        assert!(!is_kebab_case("-react"));
    }

    #[test]
    fn cycles_reported_once_in_canonical_order() {
        let mut store = KnowledgeStore::default();
        store.insert(pkg("b", "ai", &["x"], &["a"]));
        store.insert(pkg("a", "ai", &["x"], &["b"]));
        store.insert(pkg("c", "ai", &["x"], &["a"]));
        let index = store.index();
        let cycles = find_cycles(&index, store.packages());
        assert_eq!(cycles, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn tag_and_reference_findings() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = KnowledgeStore::default();
        store.insert(pkg("good-one", "technical/react", &["react", "hooks", "state"], &[]));
        store.insert(pkg("bad", "technical/react", &["Has Space", "snake_case"], &["ghost"]));
        std::fs::create_dir_all(tmp.path().join("vault")).unwrap();
        std::fs::write(tmp.path().join("vault/good-one.md"), "# ok").unwrap();
        std::fs::write(tmp.path().join("vault/bad.md"), "# bad").unwrap();

        let report = validate(&store, tmp.path(), &tmp.path().join("vault")).unwrap();
        assert_eq!(report.packages_checked, 2);
        assert_eq!(report.packages.len(), 1);

        let bad = &report.packages[0];
        assert_eq!(bad.name, "bad");
        assert!(bad.errors.iter().any(|e| e.contains("spaces")));
        assert!(bad.errors.iter().any(|e| e.contains("ghost")));
        assert!(bad.warnings.iter().any(|w| w.contains("lowercase")));
        assert!(bad.warnings.iter().any(|w| w.contains("underscore")));
        assert!(bad.warnings.iter().any(|w| w.contains("too few")));
        assert_eq!(report.failed_packages(), vec!["technical/react/bad"]);
        assert!(!report.is_ok());
    }
}
