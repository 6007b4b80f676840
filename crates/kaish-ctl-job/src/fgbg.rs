//! `fg`/`bg` semantics.
//!
//! This module only contains the pure decision logic — which pgid to
//! signal, whether to transfer the terminal, what to report — since the
//! actual `tcsetpgrp`/`kill`/`waitpid` calls belong to the platform layer
//! the `kaish-ctl-builtins` crate wires up.

use kaish_ctl_types::{ExitStatus, SignalNum};

use crate::job::{Job, JobStatus};

/// What the `fg` builtin should report once the job stops being
/// "running".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForegroundOutcome {
    /// Job exited; report this exit code.
    Exited(i32),
    /// Job was killed by a signal; report `128 + signum`, and the caller
    /// should print the signal name unless it's SIGINT or SIGPIPE.
    Signaled { code: i32, signal: SignalNum, print_name: bool },
    /// Job stopped again; print a blank line and return success.
    Stopped,
}

const SIGINT: i32 = 2;
const SIGPIPE: i32 = 13;

/// Computes the outcome to report for a job that has left the
/// `Running` state after a `fg` wait loop.
pub fn outcome_for(job: &Job) -> ForegroundOutcome {
    match job.status() {
        JobStatus::Stopped => ForegroundOutcome::Stopped,
        JobStatus::Running => {
            // Still running: caller should keep waiting; this function
            // is only meaningful once the wait loop has observed a
            // non-running state.
            ForegroundOutcome::Stopped
        }
        JobStatus::Done => match job.exit_status() {
            Some(ExitStatus::Exited(n)) => ForegroundOutcome::Exited(n),
            Some(ExitStatus::Signaled(sig)) => {
                let n = sig.get();
                ForegroundOutcome::Signaled {
                    code: 128 + n,
                    signal: sig,
                    print_name: n != SIGINT && n != SIGPIPE,
                }
            }
            None => ForegroundOutcome::Exited(0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaish_ctl_types::JobId;

    #[test]
    fn sigint_termination_suppresses_name_print() {
        let mut job = Job::new(JobId::new(1), 100, "sleep 30", vec![100]);
        job.mark_done(ExitStatus::Signaled(SignalNum::new(SIGINT)));
        let outcome = outcome_for(&job);
        assert_eq!(
            outcome,
            ForegroundOutcome::Signaled {
                code: 128 + SIGINT,
                signal: SignalNum::new(SIGINT),
                print_name: false,
            }
        );
    }

    #[test]
    fn sigterm_termination_prints_name() {
        let mut job = Job::new(JobId::new(1), 100, "sleep 30", vec![100]);
        job.mark_done(ExitStatus::Signaled(SignalNum::new(15)));
        let outcome = outcome_for(&job);
        assert_eq!(
            outcome,
            ForegroundOutcome::Signaled {
                code: 128 + 15,
                signal: SignalNum::new(15),
                print_name: true,
            }
        );
    }

    #[test]
    fn stopped_job_reports_stopped() {
        let mut job = Job::new(JobId::new(1), 100, "sleep 30", vec![100]);
        job.mark_stopped();
        assert_eq!(outcome_for(&job), ForegroundOutcome::Stopped);
    }
}
