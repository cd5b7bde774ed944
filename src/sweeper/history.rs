use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::engine::DirPolicy;
use super::report::{EntryFailure, SweepReport, SweepSummary};
use crate::common::config::Config;

/// Audit record of one completed sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRecord {
    /// Unique sweep identifier (timestamp-based)
    pub sweep_id: String,

    /// When the sweep started
    pub started_at: DateTime<Utc>,

    /// Directory that was swept
    pub directory: PathBuf,

    pub retention_secs: u64,
    pub exempt: Vec<String>,
    pub dir_policy: DirPolicy,
    pub summary: SweepSummary,

    /// Names that were removed
    pub deleted: Vec<String>,

    /// Per-entry failures
    pub failures: Vec<FailedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedEntry {
    pub name: String,
    #[serde(flatten)]
    pub failure: EntryFailure,
}

impl SweepRecord {
    /// Build a record from a finished sweep
    pub fn from_report(report: &SweepReport) -> Self {
        let deleted = report
            .with_outcome(super::report::Outcome::Deleted)
            .map(|e| e.name.clone())
            .collect();
        let failures = report
            .failures()
            .filter_map(|e| {
                e.failure.clone().map(|failure| FailedEntry {
                    name: e.name.clone(),
                    failure,
                })
            })
            .collect();

        Self {
            sweep_id: report.started_at.format("%Y-%m-%dT%H-%M-%S%.3f").to_string(),
            started_at: report.started_at,
            directory: report.directory.clone(),
            retention_secs: report.retention_secs,
            exempt: report.exempt.clone(),
            dir_policy: report.dir_policy,
            summary: report.summary,
            deleted,
            failures,
        }
    }

    /// Save to the default history directory
    pub fn save(&self) -> Result<PathBuf> {
        self.save_in(&Config::history_dir())
    }

    /// Save as `<sweep_id>.json` in `dir`, never overwriting an older record
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create history dir: {}", dir.display()))?;

        let mut path = dir.join(format!("{}.json", self.sweep_id));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("{}-{}.json", self.sweep_id, n));
            n += 1;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize sweep record")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write sweep record: {}", path.display()))?;
        Ok(path)
    }

    /// Load all records from the default history directory
    pub fn list() -> Result<Vec<SweepRecord>> {
        Self::list_in(&Config::history_dir())
    }

    /// Load all records in `dir`, newest first. Unreadable records are skipped.
    pub fn list_in(dir: &Path) -> Result<Vec<SweepRecord>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read history dir: {}", dir.display()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|s| serde_json::from_str::<SweepRecord>(&s).map_err(anyhow::Error::from));
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(path = %path.display(), "skipping unreadable sweep record: {}", e),
            }
        }

        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(records)
    }
}
