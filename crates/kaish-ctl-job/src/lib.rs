//! Job table, process-group lifecycle, and jobspec resolution.
//!
//! This crate owns no OS handles itself — `SigState` (in
//! `kaish-ctl-signal`) is the only place that touches `waitpid`/signals
//! directly. `JobTable` and `Waiter` are pure data structures driven by
//! the reaped-child batches `SigState::drain` produces, which keeps job
//! accounting testable without a real process tree.

pub mod error;
pub mod fgbg;
pub mod job;
pub mod jobspec;
pub mod table;
pub mod waiter;

pub use error::JobError;
pub use fgbg::ForegroundOutcome;
pub use job::{Job, JobStatus};
pub use jobspec::resolve as resolve_jobspec;
pub use table::JobTable;
pub use waiter::{NotifyMode, Waiter};
