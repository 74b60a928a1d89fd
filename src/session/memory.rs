//! In-process [`SessionStore`]. State lives only as long as the value.

use super::tracking::{StoredEvent, TrackingEvent};
use super::{new_session_id, now_rfc3339, SessionState, SessionStore};
use crate::error::{Result, TomeError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: SessionState,
    events: Vec<StoredEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_session(&mut self) {
        if self.state.session_id.is_none() {
            self.state.session_id = Some(new_session_id());
            self.state.started_at = Some(now_rfc3339());
        }
    }
}

impl SessionStore for MemoryStore {
    fn snapshot(&self) -> Result<SessionState> {
        Ok(self.state.clone())
    }

    fn begin(&mut self, session_id: &str, started_at: &str) -> Result<()> {
        self.state = SessionState {
            session_id: Some(session_id.to_string()),
            started_at: Some(started_at.to_string()),
            ..Default::default()
        };
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.state.loaded_packages.clear();
        self.state.categories_shown = false;
        Ok(())
    }

    fn add_loaded(&mut self, names: &[String]) -> Result<()> {
        self.ensure_session();
        self.state.loaded_packages.extend(names.iter().cloned());
        Ok(())
    }

    fn set_categories_shown(&mut self) -> Result<()> {
        self.ensure_session();
        self.state.categories_shown = true;
        Ok(())
    }

    fn append_event(
        &mut self,
        tracking_id: &str,
        event: &TrackingEvent,
        require_search: bool,
    ) -> Result<()> {
        if require_search
            && !self.events.iter().any(|e| {
                e.tracking_id == tracking_id && matches!(e.event, TrackingEvent::Search(_))
            })
        {
            return Err(TomeError::TrackingRecordNotFound(tracking_id.to_string()));
        }
        self.events.push(StoredEvent {
            tracking_id: tracking_id.to_string(),
            event: event.clone(),
            created_at: now_rfc3339(),
        });
        Ok(())
    }

    fn events(&self, tracking_id: Option<&str>) -> Result<Vec<StoredEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|e| tracking_id.is_none_or(|id| e.tracking_id == id))
            .cloned()
            .collect())
    }
}
