//! Search and ranking over the knowledge store.
//!
//! [`search`] runs the ad hoc filter-and-score pipeline; [`profile::search_by_profile`] runs
//! a named command profile. [`execute`] ties either mode to dependency expansion and is
//! what the CLI and MCP tools call.

pub mod language;
pub mod profile;

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::category::CategoryPath;
use crate::error::Result;
use crate::resolve;
use crate::session::SearchRecord;
use crate::store::{KnowledgeStore, Package};
pub use language::Language;

pub const DEFAULT_MAX_RESULTS: usize = 15;

/// Score given to every candidate when the query has no tags.
const UNTAGGED_SCORE: f64 = 0.5;

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Search,
    AlwaysLoad,
    SearchFilters,
    Dependency,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    pub tags: Vec<String>,
    pub text: Option<String>,
    /// Comma-separated exact category names.
    pub category: Option<String>,
    pub agent: Option<String>,
    /// File the caller is working on, used for language detection.
    pub source_file_path: Option<String>,
    /// Result cap; `0` means [`DEFAULT_MAX_RESULTS`].
    pub max_results: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            text: None,
            category: None,
            agent: None,
            source_file_path: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// A package returned to the caller, with ranking metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub category: CategoryPath,
    pub description: String,
    pub tags: Vec<String>,
    pub used_by_agents: Vec<String>,
    pub required_knowledge: Vec<String>,
    pub knowledge_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<Language>,
    pub source: Provenance,
}

impl SearchHit {
    pub fn from_package(pkg: &Package, source: Provenance) -> Self {
        Self {
            name: pkg.name.clone(),
            category: pkg.category.clone(),
            description: pkg.description.clone(),
            tags: pkg.tags.clone(),
            used_by_agents: pkg.used_by_agents.clone(),
            required_knowledge: pkg.required_knowledge.clone(),
            knowledge_path: pkg.knowledge_path.clone(),
            relevance_score: None,
            detected_language: None,
            source,
        }
    }

    fn score(&self) -> f64 {
        self.relevance_score.unwrap_or(0.0)
    }
}

/// Filter, score, sort, and truncate candidates for `query`.
pub fn search(store: &KnowledgeStore, query: &SearchQuery) -> Vec<SearchHit> {
    let language = query.source_file_path.as_deref().and_then(Language::detect);
    let query_tags: Vec<String> = query
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    let text = non_blank(query.text.as_deref()).map(str::to_lowercase);
    let agent = non_blank(query.agent.as_deref()).map(str::to_lowercase);

    let mut hits = Vec::new();
    for category in candidate_categories(store, query.category.as_deref()) {
        let Some(packages) = store.knowledge.get(category) else {
            continue;
        };
        for pkg in packages.values() {
            if !matches_tags(&pkg.tags, &query_tags)
                || !matches_text(&pkg.description, text.as_deref())
                || !matches_agent(&pkg.used_by_agents, agent.as_deref())
            {
                continue;
            }

            if let Some(lang) = language {
                if language::is_other_language(&pkg.category, lang) {
                    tracing::debug!(
                        name = %pkg.name,
                        category = %pkg.category,
                        language = %lang,
                        "excluded by language filter"
                    );
                    continue;
                }
            }

            let mut hit = SearchHit::from_package(pkg, Provenance::Search);
            hit.relevance_score = Some(tag_score(&query_tags, &pkg.tags));
            hit.detected_language = language;
            hits.push(hit);
        }
    }

    hits.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
    let limit = match query.max_results {
        0 => DEFAULT_MAX_RESULTS,
        n => n,
    };
    hits.truncate(limit);
    hits
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Store category keys to scan, in order. Unknown names in `filter` are ignored.
fn candidate_categories<'a>(store: &'a KnowledgeStore, filter: Option<&str>) -> Vec<&'a str> {
    let Some(filter) = non_blank(filter) else {
        return store.categories();
    };
    let mut seen = BTreeSet::new();
    filter
        .split(',')
        .map(CategoryPath::new)
        .filter_map(|c| store.knowledge.get_key_value(c.as_str()).map(|(k, _)| k.as_str()))
        .filter(|k| seen.insert(*k))
        .collect()
}

/// Some query tag equals, or is contained in, some package tag.
fn matches_tags(package_tags: &[String], query_tags: &[String]) -> bool {
    if query_tags.is_empty() {
        return true;
    }
    query_tags.iter().any(|q| {
        package_tags
            .iter()
            .any(|p| p.to_lowercase().contains(q.as_str()))
    })
}

fn matches_text(description: &str, text: Option<&str>) -> bool {
    text.is_none_or(|t| description.to_lowercase().contains(t))
}

fn matches_agent(used_by_agents: &[String], agent: Option<&str>) -> bool {
    agent.is_none_or(|a| used_by_agents.iter().any(|u| u.to_lowercase().contains(a)))
}

/// Mean per-tag score: 1.0 exact, 0.5 substring either way, 0 otherwise.
/// Rounded to three decimals.
pub fn tag_score(query_tags: &[String], package_tags: &[String]) -> f64 {
    if query_tags.is_empty() {
        return UNTAGGED_SCORE;
    }
    let package_tags: Vec<String> = package_tags.iter().map(|t| t.to_lowercase()).collect();
    let total: f64 = query_tags
        .iter()
        .map(|q| {
            let q = q.to_lowercase();
            if package_tags.iter().any(|p| *p == q) {
                1.0
            } else if package_tags
                .iter()
                .any(|p| p.contains(q.as_str()) || q.contains(p.as_str()))
            {
                0.5
            } else {
                0.0
            }
        })
        .sum();
    round3(total / query_tags.len() as f64)
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Hints shown when a query returns nothing.
pub fn suggestions(query: &SearchQuery, command_profile: Option<&str>) -> Vec<String> {
    let mut out = Vec::new();
    if non_blank(query.text.as_deref()).is_some() {
        out.push("Remove the --text filter; text is AND-ed with tags and is very restrictive".into());
        if !query.tags.is_empty() {
            out.push(format!("Search with tags only: --tags {}", query.tags.join(",")));
        }
    }
    if query.tags.len() > 3 {
        out.push(format!(
            "Use fewer, more focused tags (currently {}); 2-3 works best",
            query.tags.len()
        ));
    }
    if let Some(first) = query.tags.first() {
        out.push(format!("Try a single tag: --tags {first}"));
    }
    if command_profile.is_none() {
        out.push("Try --command-profile with --tags for more precise results".into());
    }
    out.push("Run `tome tags` or `tome categories` to see what the index contains".into());
    out
}

/// A full search invocation: either mode plus dependency depth.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub query: SearchQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_profile: Option<String>,
    pub depth: usize,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub hits: Vec<SearchHit>,
    /// Dependencies of `hits` not already among them.
    pub dependencies: Vec<SearchHit>,
}

impl SearchOutcome {
    /// Names of every result, primary hits first.
    pub fn names(&self) -> Vec<String> {
        self.hits
            .iter()
            .chain(&self.dependencies)
            .map(|h| h.name.clone())
            .collect()
    }

    /// Sorted, deduplicated categories across every result.
    pub fn categories(&self) -> Vec<String> {
        self.hits
            .iter()
            .chain(&self.dependencies)
            .map(|h| h.category.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Tracking input for this outcome. Identity fields are left for the caller.
    pub fn search_record(&self, request: &SearchRequest) -> SearchRecord {
        SearchRecord {
            tags: request.query.tags.clone(),
            categories: self.categories(),
            considered: self.names(),
            ..Default::default()
        }
    }
}

/// Run `request` against `store` and expand dependencies.
pub fn execute(store: &KnowledgeStore, request: &SearchRequest) -> Result<SearchOutcome> {
    let index = store.index();
    let hits = match request.command_profile.as_deref() {
        Some(name) => profile::search_by_profile(store, &index, name, &request.query)?,
        None => search(store, &request.query),
    };
    let dependencies = resolve::expand(&index, &hits, request.depth)
        .into_iter()
        .map(|pkg| SearchHit::from_package(pkg, Provenance::Dependency))
        .collect();

    tracing::debug!(
        profile = request.command_profile.as_deref().unwrap_or("-"),
        hits = hits.len(),
        "search executed"
    );
    Ok(SearchOutcome { hits, dependencies })
}

/// JSON envelope printed by `tome search`.
#[derive(Debug, Serialize)]
pub struct SearchOutput<'a> {
    pub query: &'a SearchRequest,
    pub count: usize,
    pub total_with_deps: usize,
    pub token_estimate: usize,
    pub results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    /// Only present when nothing matched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl<'a> SearchOutput<'a> {
    pub fn new(query: &'a SearchRequest, outcome: SearchOutcome) -> Result<Self> {
        let count = outcome.hits.len();
        let mut results = outcome.hits;
        results.extend(outcome.dependencies);
        let token_estimate = estimate_tokens(&serde_json::to_string_pretty(&results)?);
        let suggestions = if results.is_empty() {
            suggestions(&query.query, query.command_profile.as_deref())
        } else {
            Vec::new()
        };
        Ok(Self {
            query,
            count,
            total_with_deps: results.len(),
            token_estimate,
            results,
            tracking_id: None,
            suggestions,
        })
    }
}

/// Rough token count: one token per four characters.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
