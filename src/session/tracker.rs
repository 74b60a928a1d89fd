//! Session operations over an injected [`SessionStore`].

use std::collections::BTreeMap;

use super::tracking::{
    self, ReadEvent, SearchEvent, SelectionEvent, TrackingEvent, TrackingRecord, TrackingSummary,
    UsageEvent,
};
use super::{new_session_id, now_rfc3339, FilterResult, SessionState, SessionStore};
use crate::error::Result;

/// Input to [`SessionTracker::record_search`].
#[derive(Debug, Clone, Default)]
pub struct SearchRecord {
    /// Caller-supplied correlation id. A UUIDv7 is generated when absent.
    pub tracking_id: Option<String>,
    pub agent_name: Option<String>,
    /// Defaults to the current session's id.
    pub session_id: Option<String>,
    pub prompt: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub considered: Vec<String>,
}

pub struct SessionTracker<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> SessionTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Start a fresh session, dropping loaded packages and the shown flag.
    pub fn init(&mut self) -> Result<SessionState> {
        let session_id = new_session_id();
        self.store.begin(&session_id, &now_rfc3339())?;
        tracing::info!(session_id = %session_id, "session started");
        self.store.snapshot()
    }

    pub fn snapshot(&self) -> Result<SessionState> {
        self.store.snapshot()
    }

    /// `true` until [`mark_shown`](Self::mark_shown) has been called in this session.
    pub fn is_first_invocation(&self) -> Result<bool> {
        Ok(!self.store.snapshot()?.categories_shown)
    }

    pub fn mark_shown(&mut self) -> Result<()> {
        self.store.set_categories_shown()
    }

    pub fn filter_unloaded(&self, names: &[String]) -> Result<FilterResult> {
        let loaded = self.store.snapshot()?.loaded_packages;
        let (already_loaded, unloaded): (Vec<String>, Vec<String>) = names
            .iter()
            .cloned()
            .partition(|name| loaded.contains(name));
        Ok(FilterResult {
            unloaded,
            already_loaded,
        })
    }

    pub fn mark_loaded(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        self.store.add_loaded(names)?;
        tracing::debug!(count = names.len(), "packages marked loaded");
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("session cleared");
        Ok(())
    }

    /// Whether each name has been delivered this session.
    pub fn check(&self, names: &[String]) -> Result<BTreeMap<String, bool>> {
        let loaded = self.store.snapshot()?.loaded_packages;
        Ok(names
            .iter()
            .map(|n| (n.clone(), loaded.contains(n)))
            .collect())
    }

    /// Open a tracking record for a search and return its tracking id.
    pub fn record_search(&mut self, record: SearchRecord) -> Result<String> {
        let tracking_id = record
            .tracking_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
        let session_id = match record.session_id {
            Some(id) => Some(id),
            None => self.store.snapshot()?.session_id,
        };

        let event = TrackingEvent::Search(SearchEvent {
            agent_name: record.agent_name,
            session_id,
            prompt: record.prompt,
            tags: record.tags,
            categories: record.categories,
            considered: record.considered,
        });
        self.store.append_event(&tracking_id, &event, false)?;
        tracing::debug!(tracking_id = %tracking_id, "search recorded");
        Ok(tracking_id)
    }

    pub fn record_selection(
        &mut self,
        tracking_id: &str,
        selected: Vec<String>,
        skipped: Vec<String>,
        reasoning: Option<String>,
    ) -> Result<()> {
        let event = TrackingEvent::Selection(SelectionEvent {
            selected,
            skipped,
            reasoning,
        });
        self.store.append_event(tracking_id, &event, true)
    }

    pub fn record_read(&mut self, tracking_id: &str, read: Vec<String>) -> Result<()> {
        let event = TrackingEvent::Read(ReadEvent { read });
        self.store.append_event(tracking_id, &event, true)
    }

    pub fn record_usage(
        &mut self,
        tracking_id: &str,
        used: Vec<String>,
        unused: Vec<String>,
    ) -> Result<()> {
        let event = TrackingEvent::Usage(UsageEvent { used, unused });
        self.store.append_event(tracking_id, &event, true)
    }

    /// The most recent record for `tracking_id`.
    pub fn record(&self, tracking_id: &str) -> Result<Option<TrackingRecord>> {
        let events = self.store.events(Some(tracking_id))?;
        Ok(tracking::reduce(&events).pop())
    }

    /// Every record, oldest first.
    pub fn records(&self) -> Result<Vec<TrackingRecord>> {
        let events = self.store.events(None)?;
        Ok(tracking::reduce(&events))
    }

    pub fn summary(&self) -> Result<TrackingSummary> {
        Ok(tracking::summarize(&self.records()?))
    }
}
