use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, TomeError};

/// Directory under the project root that holds tome's config, store, cache, and state.
pub const TOME_DIR: &str = ".tome";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TomeConfig {
    pub vault: VaultConfig,
    pub build: BuildConfig,
    pub search: SearchConfig,
    pub session: SessionConfig,
    pub log: LogConfig,
    /// Directory every relative path in this config is resolved against.
    #[serde(skip)]
    pub project_root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VaultConfig {
    /// Root of the document tree that gets indexed.
    pub root: String,
    /// Consolidated metadata store written by `tome build`.
    pub store_path: String,
    /// Fingerprint cache reused across builds.
    pub cache_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BuildConfig {
    /// Builds slower than this log a warning.
    pub soft_warn_ms: u64,
    /// Builds slower than this fail.
    pub hard_limit_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub default_max_results: usize,
    pub dependency_depth: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory holding `session.db`.
    pub state_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for TomeConfig {
    fn default() -> Self {
        Self {
            vault: VaultConfig::default(),
            build: BuildConfig::default(),
            search: SearchConfig::default(),
            session: SessionConfig::default(),
            log: LogConfig::default(),
            project_root: PathBuf::from("."),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: format!("{TOME_DIR}/vault"),
            store_path: format!("{TOME_DIR}/knowledge.json"),
            cache_path: format!("{TOME_DIR}/.cache/parsed-metadata.json"),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            soft_warn_ms: 1_000,
            hard_limit_ms: 20_000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_max_results: 15,
            dependency_depth: 1,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_dir: format!("{TOME_DIR}/state"),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

/// Returns `<project_root>/.tome/config.toml`
pub fn config_path_for(project_root: &Path) -> PathBuf {
    project_root.join(TOME_DIR).join("config.toml")
}

impl TomeConfig {
    /// Load `<project_root>/.tome/config.toml` (if it exists) then apply env var overrides.
    pub fn load(project_root: impl AsRef<Path>) -> Result<Self> {
        let project_root = project_root.as_ref();
        let mut config = Self::load_from(config_path_for(project_root))?;
        config.project_root = project_root.to_path_buf();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a config file without env overrides. Missing files yield defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no config file at {}, using defaults", path.display());
            return Ok(TomeConfig::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| TomeError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment variable overrides (TOME_VAULT, TOME_STATE_DIR, TOME_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TOME_VAULT") {
            self.vault.root = val;
        }
        if let Ok(val) = std::env::var("TOME_STATE_DIR") {
            self.session.state_dir = val;
        }
        if let Ok(val) = std::env::var("TOME_LOG_LEVEL") {
            self.log.level = val;
        }
    }

    pub fn vault_root(&self) -> PathBuf {
        self.resolve(&self.vault.root)
    }

    pub fn store_path(&self) -> PathBuf {
        self.resolve(&self.vault.store_path)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.resolve(&self.vault.cache_path)
    }

    pub fn session_db_path(&self) -> PathBuf {
        self.resolve(&self.session.state_dir).join("session.db")
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let expanded = expand_tilde(path);
        if expanded.is_absolute() {
            expanded
        } else {
            self.project_root.join(expanded)
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TomeConfig::default();
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.search.default_max_results, 15);
        assert_eq!(config.search.dependency_depth, 1);
        assert_eq!(config.build.hard_limit_ms, 20_000);
        assert!(config.vault.store_path.ends_with("knowledge.json"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[vault]
root = "docs/knowledge"

[build]
hard_limit_ms = 5000

[search]
default_max_results = 10
"#;
        let config: TomeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.vault.root, "docs/knowledge");
        assert_eq!(config.build.hard_limit_ms, 5000);
        assert_eq!(config.search.default_max_results, 10);
        // defaults still apply for unset fields
        assert_eq!(config.build.soft_warn_ms, 1_000);
        assert_eq!(config.search.dependency_depth, 1);
    }

    #[test]
    fn relative_paths_resolve_against_project_root() {
        let mut config = TomeConfig::default();
        config.project_root = PathBuf::from("/work/project");
        assert_eq!(
            config.store_path(),
            PathBuf::from("/work/project/.tome/knowledge.json")
        );
        assert_eq!(
            config.session_db_path(),
            PathBuf::from("/work/project/.tome/state/session.db")
        );

        config.vault.root = "/srv/vault".into();
        assert_eq!(config.vault_root(), PathBuf::from("/srv/vault"));
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = TomeConfig::load_from(tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.search.default_max_results, 15);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = TomeConfig::default();
        std::env::set_var("TOME_VAULT", "/tmp/override-vault");
        std::env::set_var("TOME_STATE_DIR", "/tmp/override-state");
        std::env::set_var("TOME_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.vault.root, "/tmp/override-vault");
        assert_eq!(config.session.state_dir, "/tmp/override-state");
        assert_eq!(config.log.level, "trace");

        // Clean up
        std::env::remove_var("TOME_VAULT");
        std::env::remove_var("TOME_STATE_DIR");
        std::env::remove_var("TOME_LOG_LEVEL");
    }
}
