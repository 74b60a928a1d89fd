//! CLI `load` command.

use anyhow::Result;

use tome::config::TomeConfig;
use tome::load::LoadOutcome;
use tome::session::{MemoryStore, SessionTracker};

/// Deliver packages and print the loaded/already-loaded split as JSON.
pub fn load(config: &TomeConfig, names: &[String], tracking_id: Option<&str>) -> Result<()> {
    let store = super::open_store(config)?;

    // An unreachable session database degrades to a throwaway session: every package is
    // delivered and nothing is remembered.
    let outcome: LoadOutcome = match super::open_tracker(config) {
        Ok(mut tracker) => {
            tome::load::load(&store, &mut tracker, &config.project_root, names, tracking_id)?
        }
        Err(e) => {
            tracing::error!(error = %e, "session unavailable");
            let mut tracker = SessionTracker::new(MemoryStore::default());
            tome::load::load(&store, &mut tracker, &config.project_root, names, tracking_id)?
        }
    };

    for name in &outcome.already_loaded {
        eprintln!("Already loaded this session: {name}");
    }
    super::print_json(&outcome)
}
