//! # runsweep
//!
//! Retention-based cleanup for run and scratch directories.
//!
//! A sweep lists the direct children of one directory and permanently
//! removes every entry whose modification time is older than
//! `now - retention`, except the entries named in the exemption set.
//!
//! - **One cutoff per sweep**: the threshold is computed once and shared by every entry
//! - **Partial-failure tolerant**: a locked or unreadable entry is recorded, not fatal
//! - **Race tolerant**: entries that vanish mid-sweep count as already cleaned
//! - **Explicit directory policy**: stale subdirectories are removed when empty (the default), removed whole, or skipped
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let report = runsweep::sweeper::sweep(Path::new("run"), Duration::from_secs(60), &["massccs"])?;
//! println!("deleted {} of {}", report.summary.deleted, report.summary.examined);
//! # Ok::<(), runsweep::common::errors::SweepError>(())
//! ```

pub mod cli;
pub mod common;
pub mod sweeper;
