use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::engine::DirPolicy;
use crate::common::errors::{FailureKind, SweepError};

/// What happened to one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Stale and removed
    Deleted,
    /// Younger than the threshold
    Retained,
    /// Directory left alone under the skip policy, whatever its age
    Skipped,
    /// Name is in the exemption set
    Exempt,
    /// Disappeared before it could be handled
    Vanished,
    /// Stat or delete failed
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Deleted => write!(f, "deleted"),
            Outcome::Retained => write!(f, "retained"),
            Outcome::Skipped => write!(f, "skipped"),
            Outcome::Exempt => write!(f, "exempt"),
            Outcome::Vanished => write!(f, "vanished"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// A recorded per-entry failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl EntryFailure {
    /// Metadata of `path` could not be read
    pub fn stat(path: PathBuf, source: std::io::Error) -> Self {
        Self {
            kind: FailureKind::StatFailed,
            message: SweepError::StatFailed { path, source }.to_string(),
        }
    }

    /// `path` could not be removed
    pub fn delete(path: PathBuf, source: std::io::Error) -> Self {
        Self {
            kind: FailureKind::DeleteFailed,
            message: SweepError::DeleteFailed { path, source }.to_string(),
        }
    }
}

/// Result of evaluating one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport {
    /// Entry name (lossy UTF-8)
    pub name: String,
    pub outcome: Outcome,
    pub is_dir: bool,
    /// Seconds since last modification, when known and not in the future
    pub age_secs: Option<u64>,
    pub failure: Option<EntryFailure>,
}

impl EntryReport {
    pub fn new(name: String, outcome: Outcome, is_dir: bool, age_secs: Option<u64>) -> Self {
        Self {
            name,
            outcome,
            is_dir,
            age_secs,
            failure: None,
        }
    }

    pub fn failed(name: String, is_dir: bool, age_secs: Option<u64>, failure: EntryFailure) -> Self {
        Self {
            name,
            outcome: Outcome::Failed,
            is_dir,
            age_secs,
            failure: Some(failure),
        }
    }
}

/// Outcome counts for one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub examined: usize,
    pub deleted: usize,
    pub retained: usize,
    #[serde(default)]
    pub skipped: usize,
    pub exempt: usize,
    pub vanished: usize,
    pub failed: usize,
}

impl SweepSummary {
    fn count(&mut self, outcome: Outcome) {
        self.examined += 1;
        match outcome {
            Outcome::Deleted => self.deleted += 1,
            Outcome::Retained => self.retained += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Exempt => self.exempt += 1,
            Outcome::Vanished => self.vanished += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

/// Aggregate result of a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub directory: PathBuf,
    pub started_at: DateTime<Utc>,
    /// Entries modified before this instant were eligible for deletion
    pub threshold: DateTime<Utc>,
    pub retention_secs: u64,
    pub exempt: Vec<String>,
    pub dir_policy: DirPolicy,
    pub summary: SweepSummary,
    pub entries: Vec<EntryReport>,
    pub duration_secs: f64,
}

impl SweepReport {
    pub fn new(
        directory: PathBuf,
        started_at: DateTime<Utc>,
        threshold: DateTime<Utc>,
        retention_secs: u64,
        exempt: Vec<String>,
        dir_policy: DirPolicy,
    ) -> Self {
        Self {
            directory,
            started_at,
            threshold,
            retention_secs,
            exempt,
            dir_policy,
            summary: SweepSummary::default(),
            entries: Vec::new(),
            duration_secs: 0.0,
        }
    }

    /// Record one evaluated entry
    pub fn record(&mut self, entry: EntryReport) {
        self.summary.count(entry.outcome);
        self.entries.push(entry);
    }

    /// Whether every entry was handled without failure
    pub fn is_clean(&self) -> bool {
        self.summary.failed == 0
    }

    /// Entries that failed
    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| e.outcome == Outcome::Failed)
    }

    /// Entries with the given outcome
    pub fn with_outcome(&self, outcome: Outcome) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(move |e| e.outcome == outcome)
    }

    /// Outcome of a named entry, if it was seen
    pub fn outcome_of(&self, name: &str) -> Option<Outcome> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.outcome)
    }
}
