//! Leading `---` YAML metadata block of a knowledge document.

use serde::Deserialize;

use crate::category::CategoryPath;
use crate::error::{Result, TomeError};
use crate::store::Package;

const DELIMITER: &str = "---";

/// A field that may be written as a YAML list or as a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    List(Vec<String>),
    String(String),
}

impl StringOrList {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            StringOrList::List(items) => items,
            StringOrList::String(s) => s.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Decoded metadata block. Required fields are optional here so that incomplete
/// documents can be told apart from malformed ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Frontmatter {
    #[serde(default)]
    tags: Option<StringOrList>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    required_knowledge: Option<StringOrList>,
    #[serde(default)]
    used_by_agents: Option<StringOrList>,
}

impl Frontmatter {
    /// Build a [`Package`], or `None` if `tags`, `description`, or `category` is missing
    /// or blank.
    pub fn into_package(self, name: &str, knowledge_path: &str) -> Option<Package> {
        let tags = self.tags?.into_vec();
        let description = self.description.filter(|d| !d.trim().is_empty())?;
        let category = CategoryPath::new(self.category.as_deref()?);
        if category.is_empty() {
            return None;
        }

        Some(Package {
            name: name.to_string(),
            category,
            description: description.trim().to_string(),
            tags,
            required_knowledge: self
                .required_knowledge
                .map(StringOrList::into_vec)
                .unwrap_or_default(),
            used_by_agents: self
                .used_by_agents
                .map(StringOrList::into_vec)
                .unwrap_or_default(),
            knowledge_path: knowledge_path.to_string(),
        })
    }
}

/// Extract and decode the metadata block at the top of `content`.
///
/// Returns `Ok(None)` when there is no block or the block is empty. Invalid YAML, a
/// non-mapping block, wrongly typed fields, or a missing closing delimiter are errors.
pub fn parse(content: &str) -> Result<Option<Frontmatter>> {
    let Some(block) = extract_block(content)? else {
        return Ok(None);
    };
    if block.trim().is_empty() {
        return Ok(None);
    }

    let value: serde_yaml::Value = serde_yaml::from_str(block)?;
    match value {
        serde_yaml::Value::Null => Ok(None),
        serde_yaml::Value::Mapping(_) => Ok(Some(serde_yaml::from_value(value)?)),
        _ => Err(TomeError::Frontmatter(
            "metadata block is not a key/value mapping".into(),
        )),
    }
}

/// Raw text between the opening and closing `---` lines.
fn extract_block(content: &str) -> Result<Option<&str>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if first.trim_end() != DELIMITER {
        return Ok(None);
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Ok(Some(&content[start..offset]));
        }
        offset += line.len();
    }

    Err(TomeError::Frontmatter(
        "unterminated metadata block (missing closing `---`)".into(),
    ))
}
