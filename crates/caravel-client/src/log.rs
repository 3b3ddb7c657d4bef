//! Newest-first log of dispatched-action outcomes.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Download control surfaced for one listed deliverable.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DownloadControl {
    /// Server-reported deliverable filename.
    pub filename: String,
}

/// Content of a single log entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum EntryBody {
    /// Plain progress or status text.
    Text(String),
    /// Raw JSON response surfaced unchanged.
    Json(Value),
    /// Download controls for listed deliverables, in server order.
    Downloads(Vec<DownloadControl>),
}

/// Immutable record of one dispatched outcome.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutputEntry {
    /// Capture time of the entry.
    pub at: DateTime<Utc>,
    /// Entry content.
    pub body: EntryBody,
}

impl OutputEntry {
    /// Text entry stamped with the current time.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            body: EntryBody::Text(text.into()),
        }
    }

    /// Raw JSON entry stamped with the current time.
    #[must_use]
    pub fn json(value: Value) -> Self {
        Self {
            at: Utc::now(),
            body: EntryBody::Json(value),
        }
    }

    /// Download-control entry, one control per filename in iteration order.
    #[must_use]
    pub fn downloads(filenames: impl IntoIterator<Item = String>) -> Self {
        let controls = filenames
            .into_iter()
            .map(|filename| DownloadControl { filename })
            .collect();
        Self {
            at: Utc::now(),
            body: EntryBody::Downloads(controls),
        }
    }
}

/// Append-only sequence of entries, newest first. Entries live for one
/// process invocation and are never mutated or removed.
#[derive(Debug, Default)]
pub struct OutputLog {
    entries: VecDeque<OutputEntry>,
}

impl OutputLog {
    /// Empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Prepends `entry`; the latest outcome always reads first.
    pub fn push(&mut self, entry: OutputEntry) {
        self.entries.push_front(entry);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &OutputEntry> {
        self.entries.iter()
    }

    /// Entries in arrival order, for line-oriented rendering.
    pub fn chronological(&self) -> impl Iterator<Item = &OutputEntry> {
        self.entries.iter().rev()
    }

    /// Most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&OutputEntry> {
        self.entries.front()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
