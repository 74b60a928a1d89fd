//! Tracking events and the records reduced from them.
//!
//! Every update is appended as an event. A `search` event opens a record; `selection`,
//! `read`, and `usage` events merge into the most recent record with the same tracking id.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackingEvent {
    Search(SearchEvent),
    Selection(SelectionEvent),
    Read(ReadEvent),
    Usage(UsageEvent),
}

impl TrackingEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TrackingEvent::Search(_) => "search",
            TrackingEvent::Selection(_) => "selection",
            TrackingEvent::Read(_) => "read",
            TrackingEvent::Usage(_) => "usage",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchEvent {
    pub agent_name: Option<String>,
    pub session_id: Option<String>,
    pub prompt: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub considered: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionEvent {
    pub selected: Vec<String>,
    pub skipped: Vec<String>,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadEvent {
    pub read: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageEvent {
    pub used: Vec<String>,
    pub unused: Vec<String>,
}

/// An event as persisted, with its correlation id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub tracking_id: String,
    pub event: TrackingEvent,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub selected: Vec<String>,
    pub skipped: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub used: Vec<String>,
    pub unused: Vec<String>,
    /// `|used| / |read|`, two decimals; 0 when nothing was read.
    pub precision: f64,
    pub timestamp: String,
}

/// One search and everything later learned about how its results were used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub tracking_id: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub considered: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
    pub read: Vec<String>,
    /// Considered but not read. Empty until a read is recorded.
    pub skipped: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl TrackingRecord {
    fn open(tracking_id: &str, search: &SearchEvent, timestamp: &str) -> Self {
        Self {
            tracking_id: tracking_id.to_string(),
            timestamp: timestamp.to_string(),
            agent_name: search.agent_name.clone(),
            session_id: search.session_id.clone(),
            prompt: search.prompt.clone(),
            tags: search.tags.clone(),
            categories: search.categories.clone(),
            considered: search.considered.clone(),
            selection: None,
            read: Vec::new(),
            skipped: Vec::new(),
            read_at: None,
            usage: None,
        }
    }

    fn apply(&mut self, event: &TrackingEvent, timestamp: &str) {
        match event {
            TrackingEvent::Search(_) => {}
            TrackingEvent::Selection(s) => {
                self.selection = Some(Selection {
                    selected: s.selected.clone(),
                    skipped: s.skipped.clone(),
                    reasoning: s.reasoning.clone(),
                    timestamp: timestamp.to_string(),
                });
            }
            TrackingEvent::Read(r) => {
                for name in &r.read {
                    if !self.read.contains(name) {
                        self.read.push(name.clone());
                    }
                }
                let read: HashSet<&str> = self.read.iter().map(String::as_str).collect();
                self.skipped = self
                    .considered
                    .iter()
                    .filter(|c| !read.contains(c.as_str()))
                    .cloned()
                    .collect();
                self.read_at = Some(timestamp.to_string());
                self.refresh_precision();
            }
            TrackingEvent::Usage(u) => {
                self.usage = Some(Usage {
                    used: u.used.clone(),
                    unused: u.unused.clone(),
                    precision: 0.0,
                    timestamp: timestamp.to_string(),
                });
                self.refresh_precision();
            }
        }
    }

    fn refresh_precision(&mut self) {
        let read = self.read.len();
        if let Some(usage) = self.usage.as_mut() {
            usage.precision = precision(usage.used.len(), read);
        }
    }
}

/// `used / read` rounded to two decimals, 0 for an empty read set.
pub fn precision(used: usize, read: usize) -> f64 {
    if read == 0 {
        return 0.0;
    }
    ((used as f64 / read as f64) * 100.0).round() / 100.0
}

/// Fold events (oldest first) into records, one per `search` event.
///
/// Events for an id with no preceding search are ignored.
pub fn reduce(events: &[StoredEvent]) -> Vec<TrackingRecord> {
    let mut records: Vec<TrackingRecord> = Vec::new();
    let mut latest: BTreeMap<&str, usize> = BTreeMap::new();

    for stored in events {
        match &stored.event {
            TrackingEvent::Search(search) => {
                latest.insert(stored.tracking_id.as_str(), records.len());
                records.push(TrackingRecord::open(
                    &stored.tracking_id,
                    search,
                    &stored.created_at,
                ));
            }
            other => match latest.get(stored.tracking_id.as_str()) {
                Some(&idx) => records[idx].apply(other, &stored.created_at),
                None => {
                    tracing::debug!(tracking_id = %stored.tracking_id, kind = other.kind(), "event without search record");
                }
            },
        }
    }
    records
}

/// Aggregate view over all tracking records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingSummary {
    pub records: usize,
    pub with_selection: usize,
    pub with_reads: usize,
    pub with_usage: usize,
    /// Mean precision over records with usage, two decimals.
    pub mean_precision: Option<f64>,
    /// Most frequently read packages, most read first.
    pub most_read: Vec<PackageCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageCount {
    pub name: String,
    pub count: usize,
}

const MOST_READ_LIMIT: usize = 10;

pub fn summarize(records: &[TrackingRecord]) -> TrackingSummary {
    let with_usage: Vec<f64> = records
        .iter()
        .filter_map(|r| r.usage.as_ref().map(|u| u.precision))
        .collect();
    let mean_precision = (!with_usage.is_empty()).then(|| {
        let mean = with_usage.iter().sum::<f64>() / with_usage.len() as f64;
        (mean * 100.0).round() / 100.0
    });

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in records.iter().flat_map(|r| &r.read) {
        *counts.entry(name.as_str()).or_default() += 1;
    }
    let mut most_read: Vec<PackageCount> = counts
        .into_iter()
        .map(|(name, count)| PackageCount {
            name: name.to_string(),
            count,
        })
        .collect();
    most_read.sort_by(|a, b| b.count.cmp(&a.count));
    most_read.truncate(MOST_READ_LIMIT);

    TrackingSummary {
        records: records.len(),
        with_selection: records.iter().filter(|r| r.selection.is_some()).count(),
        with_reads: records.iter().filter(|r| !r.read.is_empty()).count(),
        with_usage: with_usage.len(),
        mean_precision,
        most_read,
    }
}
