#![allow(dead_code)]

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tome::config::TomeConfig;
use tome::db;
use tome::index::{self, BuildOptions, BuildReport};

/// Open a fresh in-memory session database with the schema applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// A project rooted in a temp dir, with default config paths under `.tome/`.
pub struct TestProject {
    pub dir: TempDir,
    pub config: TomeConfig,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = TomeConfig {
            project_root: dir.path().to_path_buf(),
            ..Default::default()
        };
        std::fs::create_dir_all(config.vault_root()).unwrap();
        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `<vault>/<rel>` and return the absolute path.
    pub fn write_doc(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.config.vault_root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write a well-formed package document at `<vault>/<category>/<name>.md`.
    pub fn write_package(&self, category: &str, name: &str, tags: &[&str], requires: &[&str]) -> PathBuf {
        self.write_doc(
            &format!("{category}/{name}.md"),
            &package_doc(category, &format!("Guidance on {name}"), tags, requires),
        )
    }

    pub fn build(&self) -> BuildReport {
        index::build(&self.config, &BuildOptions::default()).unwrap()
    }

    pub fn force_build(&self) -> BuildReport {
        index::build(&self.config, &BuildOptions { force_rebuild: true }).unwrap()
    }
}

/// Markdown with a complete frontmatter block.
pub fn package_doc(category: &str, description: &str, tags: &[&str], requires: &[&str]) -> String {
    let mut doc = String::from("---\n");
    doc.push_str(&format!("category: {category}\n"));
    doc.push_str(&format!("description: {description}\n"));
    doc.push_str(&format!("tags: [{}]\n", tags.join(", ")));
    if !requires.is_empty() {
        doc.push_str(&format!("required_knowledge: [{}]\n", requires.join(", ")));
    }
    doc.push_str("---\n\n# Body\n\nSome guidance.\n");
    doc
}

pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
