pub mod engine;
pub mod fs;
pub mod history;
pub mod report;

pub use engine::{sweep, sweep_with, DirPolicy, SweepOptions, Sweeper};
pub use fs::{Clock, EntryMeta, FixedClock, RemoveKind, StdFs, SweepFs, SystemClock};
pub use history::{FailedEntry, SweepRecord};
pub use report::{EntryFailure, EntryReport, Outcome, SweepReport, SweepSummary};
