//! Hierarchical category identifiers.
//!
//! Categories are slash-separated paths such as `technical/frameworks`. Two categories are
//! equal when their normalized paths are equal; a category *contains* another when the
//! other is the same path or lies beneath it segment by segment.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A normalized, slash-separated category path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryPath(String);

impl CategoryPath {
    /// Normalize `raw`: trim whitespace and surrounding slashes, collapse empty segments.
    pub fn new(raw: &str) -> Self {
        let joined = raw
            .trim()
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// First segment, e.g. `standards` for `standards/python-style`.
    pub fn root(&self) -> &str {
        self.segments().next().unwrap_or("")
    }

    pub fn is_hierarchical(&self) -> bool {
        self.0.contains('/')
    }

    /// `true` if `other` is this category or nested beneath it.
    ///
    /// `business` contains `business` and `business/tokenization`, but not `businessx`.
    pub fn contains(&self, other: &CategoryPath) -> bool {
        if self.is_empty() {
            return false;
        }
        match other.0.strip_prefix(&self.0) {
            Some("") => true,
            Some(rest) => rest.starts_with('/'),
            None => false,
        }
    }

    /// Lowercased word tokens across all segments, split on `/`, `-`, `_`, and `.`.
    ///
    /// `standards/ts-style` yields `["standards", "ts", "style"]`.
    pub fn tokens(&self) -> Vec<String> {
        self.0
            .split(['/', '-', '_', '.'])
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

impl std::fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CategoryPath {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl Serialize for CategoryPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CategoryPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_slashes_and_whitespace() {
        assert_eq!(CategoryPath::new(" /technical//react/ ").as_str(), "technical/react");
        assert_eq!(CategoryPath::new("business"), CategoryPath::new("business/"));
    }

    #[test]
    fn contains_is_segment_aware() {
        let business = CategoryPath::new("business");
        assert!(business.contains(&CategoryPath::new("business")));
        assert!(business.contains(&CategoryPath::new("business/tokenization")));
        assert!(!business.contains(&CategoryPath::new("businessx")));
        assert!(!business.contains(&CategoryPath::new("technical/business")));
        assert!(!CategoryPath::new("business/tokenization").contains(&business));
    }

    #[test]
    fn empty_category_contains_nothing() {
        assert!(!CategoryPath::new("").contains(&CategoryPath::new("business")));
    }

    #[test]
    fn root_and_tokens() {
        let cat = CategoryPath::new("standards/ts-style_guide");
        assert_eq!(cat.root(), "standards");
        assert_eq!(cat.tokens(), vec!["standards", "ts", "style", "guide"]);
        assert!(cat.is_hierarchical());
        assert!(!CategoryPath::new("ai").is_hierarchical());
    }

    #[test]
    fn serde_round_trips_as_plain_string() {
        let cat: CategoryPath = serde_json::from_str("\"/technical/react/\"").unwrap();
        assert_eq!(cat.as_str(), "technical/react");
        assert_eq!(serde_json::to_string(&cat).unwrap(), "\"technical/react\"");
    }
}
