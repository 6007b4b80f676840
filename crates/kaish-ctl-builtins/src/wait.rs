//! `wait [jobspec|pid…]` builtin.

use kaish_ctl_job::{resolve_jobspec, JobStatus, JobTable};
use kaish_ctl_signal::{SigState, SignalNum, TrapTable, WaitOutcome};
use kaish_ctl_types::{ExitCode, JobId};

use crate::error::{job_error, BuiltinError};

const NAME: &str = "wait";

/// Blocks until every targeted job is `Done`, or
/// until SIGINT cancels the wait. With no arguments, waits for
/// every currently tracked job. Returns the exit status of the last
/// named job (or the last job reaped, with no arguments), or `128 +
/// SIGINT` if canceled.
pub fn wait(
    args: &[String],
    table: &mut JobTable,
    sig: &mut SigState,
    traps: &TrapTable,
    mut on_trap: impl FnMut(SignalNum, &str),
) -> Result<(Vec<String>, i32), BuiltinError> {
    let targets: Vec<JobId> = if args.is_empty() {
        table.iter().map(|j| j.id()).collect()
    } else {
        let mut ids = Vec::with_capacity(args.len());
        for a in args {
            ids.push(resolve_jobspec(table, a).map_err(|e| job_error(NAME, e))?);
        }
        ids
    };

    if targets.is_empty() {
        return Ok((Vec::new(), ExitCode::SUCCESS));
    }

    let mut last_code = ExitCode::SUCCESS;

    loop {
        let all_done = targets
            .iter()
            .all(|&id| table.get(id).is_none_or(|j| j.status() == JobStatus::Done));
        if all_done {
            break;
        }

        match sig.wait_for_child(true, traps, &mut on_trap) {
            WaitOutcome::Reaped(reaped) => {
                for child in &reaped {
                    table.set_status(child.pid, child.status);
                }
            }
            WaitOutcome::TrapExecuted(_) => continue,
            WaitOutcome::Interrupted(s) => {
                return Ok((Vec::new(), ExitCode::for_signal(s)));
            }
        }
    }

    for id in &targets {
        if let Some(job) = table.get(*id) {
            if let Some(status) = job.exit_status() {
                last_code = status.code();
            }
        }
    }
    for id in targets {
        table.remove(id);
    }

    Ok((Vec::new(), last_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_targets_returns_success_immediately() {
        let mut t = JobTable::new();
        let mut sig = SigState::new();
        let traps = TrapTable::new(kaish_ctl_signal::TrapPolicy::Posix);
        let (_, code) = wait(&[], &mut t, &mut sig, &traps, |_, _| {}).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn unknown_jobspec_is_not_found() {
        let mut t = JobTable::new();
        let mut sig = SigState::new();
        let traps = TrapTable::new(kaish_ctl_signal::TrapPolicy::Posix);
        let err = wait(&["%9".to_string()], &mut t, &mut sig, &traps, |_, _| {}).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::NotFound);
    }
}
