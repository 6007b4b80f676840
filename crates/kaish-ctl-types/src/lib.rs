//! Pure data types shared by the kaish-ctl signal, job, and edit crates.
//!
//! Nothing in this crate touches the OS — it exists so that
//! `kaish-ctl-signal`, `kaish-ctl-job`, and `kaish-ctl-edit` can agree on a
//! vocabulary (job indices, exit status, jobspecs) without depending on one
//! another.

mod exit;
mod job_id;
mod jobspec;
mod signal_num;

pub use exit::{ExitCode, ExitStatus};
pub use job_id::JobId;
pub use jobspec::{parse as parse_jobspec, Jobspec, JobspecError};
pub use signal_num::SignalNum;
