//! Error types for the tome library.
//!
//! Library functions return [`Result<T>`] with a [`TomeError`]; the CLI layer wraps
//! these in `anyhow` with command-level context.

use std::path::PathBuf;

use thiserror::Error;

/// Per-file failure collected during an index build.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

#[derive(Error, Debug)]
pub enum TomeError {
    /// The metadata store has not been built yet.
    #[error("knowledge store not found at {0}. Run `tome build` first.")]
    StoreNotFound(PathBuf),

    /// The metadata store exists but could not be decoded.
    #[error("knowledge store at {path} is invalid: {reason}")]
    StoreInvalid { path: PathBuf, reason: String },

    #[error("config file {path} is invalid: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("command profile `{name}` not found. Available profiles: {}", .available.join(", "))]
    UnknownProfile {
        name: String,
        available: Vec<String>,
    },

    #[error("packages not found in knowledge store: {}", .0.join(", "))]
    UnknownPackages(Vec<String>),

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("vault directory not found: {0}")]
    VaultNotFound(PathBuf),

    /// One or more documents failed to parse. Every failing file is listed.
    #[error("index build failed with {} error(s):\n{}", .0.len(), format_file_errors(.0))]
    BuildFailed(Vec<FileError>),

    #[error("index build took {elapsed_ms}ms, over the {limit_ms}ms ceiling")]
    BuildTooSlow { elapsed_ms: u64, limit_ms: u64 },

    /// A read/usage/selection update referenced a tracking id with no search record.
    #[error("no tracking record found for id `{0}`")]
    TrackingRecordNotFound(String),

    #[error("malformed metadata block: {0}")]
    Frontmatter(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

fn format_file_errors(errors: &[FileError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, TomeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_profile_lists_available_names() {
        let err = TomeError::UnknownProfile {
            name: "deploy".into(),
            available: vec!["implementation".into(), "plan".into()],
        };
        assert_eq!(
            err.to_string(),
            "command profile `deploy` not found. Available profiles: implementation, plan"
        );
    }

    #[test]
    fn build_failed_reports_every_file() {
        let err = TomeError::BuildFailed(vec![
            FileError {
                path: PathBuf::from("vault/a.md"),
                message: "bad yaml".into(),
            },
            FileError {
                path: PathBuf::from("vault/b.md"),
                message: "unterminated".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("2 error(s)"));
        assert!(msg.contains("vault/a.md: bad yaml"));
        assert!(msg.contains("vault/b.md: unterminated"));
    }
}
