pub mod build;
pub mod discover;
pub mod load;
pub mod search;
pub mod session;
pub mod track;
pub mod validate;

use anyhow::{Context, Result};
use serde::Serialize;

use tome::config::TomeConfig;
use tome::session::{SessionTracker, SqliteStore};
use tome::store::KnowledgeStore;

/// Load the metadata store, pointing at `tome build` when it is missing.
pub fn open_store(config: &TomeConfig) -> Result<KnowledgeStore> {
    let path = config.store_path();
    KnowledgeStore::load(&path)
        .with_context(|| format!("failed to load knowledge store from {}", path.display()))
}

/// Open the session database under the project's state directory.
pub fn open_tracker(config: &TomeConfig) -> Result<SessionTracker<SqliteStore>> {
    let path = config.session_db_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("failed to open session database at {}", path.display()))?;
    Ok(SessionTracker::new(store))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
