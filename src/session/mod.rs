//! Session state and tracking, shared across separate tool invocations.
//!
//! [`SessionTracker`] holds the operations; persistence sits behind the [`SessionStore`]
//! trait with a SQLite implementation ([`SqliteStore`]) for real use and an in-memory one
//! ([`MemoryStore`]) for tests and embedding.

pub mod memory;
pub mod sqlite;
pub mod tracker;
pub mod tracking;

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::Result;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use tracker::{SearchRecord, SessionTracker};
pub use tracking::{StoredEvent, TrackingEvent, TrackingRecord, TrackingSummary};

/// Snapshot of the current session. All-empty when no session exists yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub session_id: Option<String>,
    pub started_at: Option<String>,
    pub loaded_packages: BTreeSet<String>,
    pub categories_shown: bool,
}

/// Requested names split by whether they were already delivered. Input order is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterResult {
    pub unloaded: Vec<String>,
    pub already_loaded: Vec<String>,
}

/// Persistence for session state and tracking events.
///
/// Implementations must make each mutating call atomic with respect to other processes
/// sharing the same state.
pub trait SessionStore {
    fn snapshot(&self) -> Result<SessionState>;

    /// Replace the session with a fresh one, forgetting loaded packages.
    fn begin(&mut self, session_id: &str, started_at: &str) -> Result<()>;

    /// Forget loaded packages and reset the categories-shown flag.
    fn clear(&mut self) -> Result<()>;

    /// Union `names` into the loaded set, creating the session if needed.
    fn add_loaded(&mut self, names: &[String]) -> Result<()>;

    fn set_categories_shown(&mut self) -> Result<()>;

    /// Append a tracking event. With `require_search`, fails with
    /// [`TomeError::TrackingRecordNotFound`](crate::error::TomeError::TrackingRecordNotFound)
    /// unless a search event already exists for `tracking_id`.
    fn append_event(
        &mut self,
        tracking_id: &str,
        event: &TrackingEvent,
        require_search: bool,
    ) -> Result<()>;

    /// Events oldest first, optionally restricted to one tracking id.
    fn events(&self, tracking_id: Option<&str>) -> Result<Vec<StoredEvent>>;
}

/// A new session identifier, `session-<unix millis>`.
pub fn new_session_id() -> String {
    format!("session-{}", chrono::Utc::now().timestamp_millis())
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
