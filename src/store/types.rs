//! Record types persisted in the knowledge store.
//!
//! Defines [`Package`] (one indexed document's metadata), [`CommandProfile`] (a named
//! bundle of always-loaded packages plus default filters), and [`ProfileFilters`].

use serde::{Deserialize, Serialize};

use crate::category::CategoryPath;

/// Metadata for one knowledge document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Kebab-case identifier, taken from the document's file stem.
    #[serde(default)]
    pub name: String,
    /// Hierarchical category, e.g. `technical/frameworks`.
    pub category: CategoryPath,
    /// Free-text summary used by the `--text` filter.
    pub description: String,
    /// Short lowercase labels, matched by tag search.
    pub tags: Vec<String>,
    /// Names of packages this one depends on.
    #[serde(default)]
    pub required_knowledge: Vec<String>,
    /// Agent identifiers that typically consume this package.
    #[serde(default)]
    pub used_by_agents: Vec<String>,
    /// Document location, relative to the project root when possible.
    pub knowledge_path: String,
}

/// Default search filters attached to a [`CommandProfile`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFilters {
    #[serde(default)]
    pub tags: Vec<String>,
    /// Comma-separated list of exact categories, same syntax as `--category`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A named, pre-configured retrieval recipe for a common task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandProfile {
    /// Packages returned unconditionally, in order.
    #[serde(default)]
    pub always_load: Vec<String>,
    #[serde(default)]
    pub search_filters: ProfileFilters,
    /// Results in any of these categories (or beneath them) are dropped.
    #[serde(default)]
    pub exclude_categories: Vec<CategoryPath>,
}

impl ProfileFilters {
    /// `true` when the filters would narrow a search at all.
    pub fn is_active(&self, extra_tags: &[String]) -> bool {
        self.category.as_deref().is_some_and(|c| !c.trim().is_empty())
            || !self.tags.is_empty()
            || !extra_tags.is_empty()
    }
}
