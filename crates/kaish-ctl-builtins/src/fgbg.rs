//! `fg`/`bg [jobspec…]` builtins.

use kaish_ctl_job::{resolve_jobspec, ForegroundOutcome, JobStatus, JobTable};
use kaish_ctl_signal::{SigState, SignalNum, TrapTable};
use kaish_ctl_types::ExitCode;

use crate::error::{job_error, BuiltinError};
use crate::traits::Terminal;

const FG: &str = "fg";
const BG: &str = "bg";

fn target_job(name: &'static str, args: &[String], table: &JobTable) -> Result<kaish_ctl_types::JobId, BuiltinError> {
    let spec = args.first().map(String::as_str).unwrap_or("%+");
    resolve_jobspec(table, spec).map_err(|e| job_error(name, e))
}

#[cfg(unix)]
fn send_sigcont(pgid: i32) -> Result<(), BuiltinError> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    kill(Pid::from_raw(-pgid), Signal::SIGCONT)
        .map_err(|e| BuiltinError::system(FG, "SIGCONT", e.to_string()))
}

/// `fg [jobspec]`: transfers the terminal, resumes the job, and blocks
/// until it leaves the running state.
pub fn fg(
    args: &[String],
    table: &mut JobTable,
    sig: &mut SigState,
    traps: &TrapTable,
    term: &dyn Terminal,
    mut on_trap: impl FnMut(SignalNum, &str),
) -> Result<(Vec<String>, i32), BuiltinError> {
    let id = target_job(FG, args, table)?;
    let (pgid, name) = {
        let job = table.get(id).ok_or_else(|| BuiltinError::not_found(FG, "no such job"))?;
        (job.pgid(), job.name().to_string())
    };

    term.set_foreground_pgrp(pgid)?;
    send_sigcont(pgid)?;
    if let Some(job) = table.get_mut(id) {
        job.set_notified(true);
    }
    table.set_status_running(id);

    let mut lines = vec![name];

    loop {
        match sig.wait_for_child(false, traps, &mut on_trap) {
            kaish_ctl_signal::WaitOutcome::Reaped(reaped) => {
                for child in &reaped {
                    table.set_status(child.pid, child.status);
                }
            }
            kaish_ctl_signal::WaitOutcome::TrapExecuted(_) => continue,
            kaish_ctl_signal::WaitOutcome::Interrupted(_) => continue,
        }

        let Some(job) = table.get(id) else {
            return Ok((lines, ExitCode::SUCCESS));
        };
        if job.status() == JobStatus::Running {
            continue;
        }

        let outcome = kaish_ctl_job::fgbg::outcome_for(job);
        return match outcome {
            ForegroundOutcome::Stopped => {
                lines.push(String::new());
                Ok((lines, ExitCode::SUCCESS))
            }
            ForegroundOutcome::Exited(code) => {
                table.remove(id);
                Ok((lines, code))
            }
            ForegroundOutcome::Signaled { code, signal, print_name } => {
                if print_name {
                    lines.push(
                        kaish_ctl_signal::name_of(signal)
                            .map(|n| format!("{n}"))
                            .unwrap_or_else(|| format!("Signal {}", signal.get())),
                    );
                }
                table.remove(id);
                Ok((lines, code))
            }
        };
    }
}

/// `bg [jobspec]`: resumes the job without transferring the terminal or
/// waiting for it.
pub fn bg(args: &[String], table: &mut JobTable) -> Result<(Vec<String>, i32), BuiltinError> {
    let id = target_job(BG, args, table)?;
    let (pgid, name) = {
        let job = table.get(id).ok_or_else(|| BuiltinError::not_found(BG, "no such job"))?;
        if job.status() != JobStatus::Stopped {
            return Err(job_error(BG, kaish_ctl_job::JobError::AlreadyRunning(id)));
        }
        (job.pgid(), job.name().to_string())
    };

    send_sigcont(pgid)?;
    table.set_status_running(id);
    if let Some(job) = table.get_mut(id) {
        job.set_notified(true);
    }

    Ok((vec![format!("[{id}]+ {name} &")], ExitCode::SUCCESS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Terminal;

    struct NullTerminal;
    impl Terminal for NullTerminal {
        fn set_foreground_pgrp(&self, _pgid: i32) -> Result<(), BuiltinError> {
            Ok(())
        }
        fn raw_mode(&mut self, _on: bool) -> Result<(), BuiltinError> {
            Ok(())
        }
    }

    #[test]
    fn bg_requires_a_stopped_job() {
        let mut t = JobTable::new();
        t.add(100, "sleep 30", vec![100]);
        let err = bg(&[], &mut t).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Usage);
    }

    #[test]
    fn bg_on_unknown_jobspec_is_not_found() {
        let mut t = JobTable::new();
        let err = bg(&["%9".to_string()], &mut t).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::NotFound);
    }
}
