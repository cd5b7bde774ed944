use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use super::fs::{Clock, EntryMeta, RemoveKind, StdFs, SweepFs, SystemClock};
use super::report::{EntryFailure, EntryReport, Outcome, SweepReport};
use crate::common::errors::SweepError;
use crate::common::{format, safety};

/// How subdirectory entries are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirPolicy {
    /// Leave every subdirectory alone, whatever its age
    Skip,
    /// Remove stale subdirectories; a non-empty one is a delete failure
    #[default]
    RemoveEmpty,
    /// Remove stale subdirectories with everything inside them
    RemoveTree,
}

impl std::fmt::Display for DirPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirPolicy::Skip => write!(f, "skip"),
            DirPolicy::RemoveEmpty => write!(f, "remove_empty"),
            DirPolicy::RemoveTree => write!(f, "remove_tree"),
        }
    }
}

impl std::str::FromStr for DirPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "skip" => Ok(DirPolicy::Skip),
            "remove_empty" => Ok(DirPolicy::RemoveEmpty),
            "remove_tree" => Ok(DirPolicy::RemoveTree),
            _ => anyhow::bail!(
                "Unknown directory policy '{}' (expected skip, remove_empty or remove_tree)",
                s
            ),
        }
    }
}

/// Parameters of one sweep
#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub retention: Duration,
    pub exempt: HashSet<OsString>,
    pub dir_policy: DirPolicy,
    pub show_progress: bool,
}

impl SweepOptions {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            exempt: HashSet::new(),
            dir_policy: DirPolicy::default(),
            show_progress: false,
        }
    }

    /// Add exempt entry names (exact match)
    pub fn exempt<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.exempt.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn dir_policy(mut self, policy: DirPolicy) -> Self {
        self.dir_policy = policy;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn is_exempt(&self, name: &OsStr) -> bool {
        self.exempt.contains(name)
    }

    fn exempt_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .exempt
            .iter()
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Sweep `directory` with the default directory policy.
///
/// Every entry not named in `exempt` whose modification time is older
/// than `now - retention` is removed.
pub fn sweep<S: AsRef<str>>(
    directory: &Path,
    retention: Duration,
    exempt: &[S],
) -> Result<SweepReport, SweepError> {
    let options = SweepOptions::new(retention).exempt(exempt.iter().map(|s| s.as_ref()));
    sweep_with(directory, &options)
}

/// Sweep `directory` on the real filesystem with explicit options
pub fn sweep_with(directory: &Path, options: &SweepOptions) -> Result<SweepReport, SweepError> {
    Sweeper::new(StdFs, SystemClock, options.clone()).run(directory)
}

/// Retention sweeper over an arbitrary filesystem and clock
pub struct Sweeper<F, C> {
    fs: F,
    clock: C,
    options: SweepOptions,
}

impl<F: SweepFs, C: Clock> Sweeper<F, C> {
    pub fn new(fs: F, clock: C, options: SweepOptions) -> Self {
        Self { fs, clock, options }
    }

    /// Run one sweep over the direct children of `directory`
    pub fn run(&self, directory: &Path) -> Result<SweepReport, SweepError> {
        let started = Instant::now();

        if self.is_protected_dir(directory) {
            return Err(SweepError::ProtectedPath {
                path: directory.to_path_buf(),
            });
        }

        // One cutoff for the whole pass.
        let now = self.clock.now();
        let threshold = now.checked_sub(self.options.retention).unwrap_or(UNIX_EPOCH);

        let names = self
            .fs
            .list(directory)
            .map_err(|source| SweepError::InvalidPath {
                path: directory.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            directory = %directory.display(),
            entries = names.len(),
            retention = %format::format_retention(self.options.retention),
            policy = %self.options.dir_policy,
            "starting sweep"
        );

        let mut report = SweepReport::new(
            directory.to_path_buf(),
            DateTime::<Utc>::from(now),
            DateTime::<Utc>::from(threshold),
            self.options.retention.as_secs(),
            self.options.exempt_names(),
            self.options.dir_policy,
        );

        let pb = if self.options.show_progress && !names.is_empty() {
            let pb = ProgressBar::new(names.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.red} [{bar:40.red/blue}] {pos}/{len} Sweeping... {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("━━░"),
            );
            Some(pb)
        } else {
            None
        };

        for name in &names {
            if let Some(ref pb) = pb {
                pb.set_message(format::truncate(&name.to_string_lossy(), 40));
            }

            let entry = self.evaluate(directory, name, now, threshold);
            match entry.outcome {
                Outcome::Failed => {
                    if let Some(ref failure) = entry.failure {
                        tracing::warn!(entry = %entry.name, kind = %failure.kind, "{}", failure.message);
                    }
                }
                outcome => tracing::debug!(entry = %entry.name, %outcome, "evaluated"),
            }
            report.record(entry);

            if let Some(ref pb) = pb {
                pb.inc(1);
            }
        }

        if let Some(ref pb) = pb {
            pb.finish_and_clear();
        }

        report.duration_secs = started.elapsed().as_secs_f64();

        tracing::info!(
            directory = %directory.display(),
            examined = report.summary.examined,
            deleted = report.summary.deleted,
            retained = report.summary.retained,
            skipped = report.summary.skipped,
            exempt = report.summary.exempt,
            vanished = report.summary.vanished,
            failed = report.summary.failed,
            "sweep finished"
        );

        Ok(report)
    }

    /// Decide and act on a single entry
    fn evaluate(
        &self,
        directory: &Path,
        name: &OsStr,
        now: SystemTime,
        threshold: SystemTime,
    ) -> EntryReport {
        let display = name.to_string_lossy().into_owned();

        if self.options.is_exempt(name) {
            return EntryReport::new(display, Outcome::Exempt, false, None);
        }

        // Stat and delete both go through this one path.
        let path = directory.join(name);

        let EntryMeta { modified, is_dir } = match self.fs.stat(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return EntryReport::new(display, Outcome::Vanished, false, None);
            }
            Err(source) => {
                return EntryReport::failed(display, false, None, EntryFailure::stat(path, source));
            }
        };

        let age_secs = now.duration_since(modified).ok().map(|age| age.as_secs());

        // The stat is what tells a directory apart; skip ignores its age.
        if is_dir && self.options.dir_policy == DirPolicy::Skip {
            return EntryReport::new(display, Outcome::Skipped, is_dir, age_secs);
        }

        if modified >= threshold {
            return EntryReport::new(display, Outcome::Retained, is_dir, age_secs);
        }

        let kind = match (is_dir, self.options.dir_policy) {
            (false, _) => RemoveKind::File,
            (true, DirPolicy::RemoveTree) => RemoveKind::Tree,
            (true, _) => RemoveKind::EmptyDir,
        };

        match self.fs.remove(&path, kind) {
            Ok(()) => EntryReport::new(display, Outcome::Deleted, is_dir, age_secs),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                EntryReport::new(display, Outcome::Vanished, is_dir, age_secs)
            }
            Err(source) => {
                EntryReport::failed(display, is_dir, age_secs, EntryFailure::delete(path, source))
            }
        }
    }

    /// Check the directory as given and, when it resolves, its canonical form
    fn is_protected_dir(&self, directory: &Path) -> bool {
        if safety::is_protected(directory) {
            return true;
        }
        self.fs
            .canonicalize(directory)
            .map(|resolved| safety::is_protected(&resolved))
            .unwrap_or(false)
    }
}
