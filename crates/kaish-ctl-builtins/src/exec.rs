//! `exec [-cfl] [-a name] cmd [args]` builtin: replaces the
//! shell's process image, after restoring signal dispositions for the
//! new program.

use kaish_ctl_job::JobTable;
use kaish_ctl_signal::SigState;
use kaish_ctl_types::ExitCode;

use crate::error::BuiltinError;

const NAME: &str = "exec";

struct ExecArgs {
    clear_env: bool,
    force: bool,
    login: bool,
    argv0: Option<String>,
    cmd: String,
    rest: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<ExecArgs, BuiltinError> {
    let mut clear_env = false;
    let mut force = false;
    let mut login = false;
    let mut argv0 = None;
    let mut idx = 0;

    while idx < args.len() {
        match args[idx].as_str() {
            "-c" => clear_env = true,
            "-f" => force = true,
            "-l" => login = true,
            "-a" => {
                idx += 1;
                argv0 = Some(
                    args.get(idx)
                        .ok_or_else(|| BuiltinError::usage(NAME, "-a requires a name"))?
                        .clone(),
                );
            }
            "--" => {
                idx += 1;
                break;
            }
            _ => break,
        }
        idx += 1;
    }

    let cmd = args
        .get(idx)
        .ok_or_else(|| BuiltinError::usage(NAME, "missing command"))?
        .clone();
    let rest = args[idx + 1..].to_vec();

    Ok(ExecArgs { clear_env, force, login, argv0, cmd, rest })
}

/// Checks the `exec`-gating invariant:
/// refuses to replace the process image while jobs remain, unless
/// `-f`/forced.
pub fn check_busy(table: &JobTable, force: bool) -> Result<(), BuiltinError> {
    if !force && table.count_unreported_done_or_stopped() > 0 {
        return Err(BuiltinError::busy(NAME, "there are stopped or unreported jobs"));
    }
    Ok(())
}

/// Runs `exec`. On success this function never returns to the caller —
/// the process image is replaced. On failure (bad flags, missing
/// command, busy jobs, or an `execvp` error) it returns normally so the
/// shell can report the error and continue.
pub fn exec(args: &[String], table: &JobTable, sig: &SigState) -> Result<(Vec<String>, i32), BuiltinError> {
    let parsed = parse_args(args)?;
    check_busy(table, parsed.force)?;

    if parsed.clear_env {
        for (k, _) in std::env::vars() {
            std::env::remove_var(k);
        }
    }

    sig.restore_for_exec(true)
        .map_err(|e| BuiltinError::system(NAME, "restore signal dispositions", e.to_string()))?;

    do_exec(&parsed)
}

#[cfg(unix)]
fn do_exec(parsed: &ExecArgs) -> Result<(Vec<String>, i32), BuiltinError> {
    use std::ffi::CString;

    let argv0 = parsed.argv0.clone().unwrap_or_else(|| parsed.cmd.clone());
    let argv0 = if parsed.login { format!("-{argv0}") } else { argv0 };

    let c_argv0 = CString::new(argv0).map_err(|e| BuiltinError::usage(NAME, e.to_string()))?;
    let mut c_args = vec![c_argv0];
    for a in &parsed.rest {
        c_args.push(CString::new(a.as_str()).map_err(|e| BuiltinError::usage(NAME, e.to_string()))?);
    }
    let c_cmd = CString::new(parsed.cmd.as_str()).map_err(|e| BuiltinError::usage(NAME, e.to_string()))?;

    match nix::unistd::execvp(&c_cmd, &c_args) {
        Ok(never) => match never {},
        Err(nix::errno::Errno::ENOENT) => Ok((Vec::new(), ExitCode::NOT_FOUND)),
        Err(nix::errno::Errno::EACCES) => Ok((Vec::new(), ExitCode::NOT_EXECUTABLE)),
        Err(e) => Err(BuiltinError::system(NAME, "execvp", e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_command_is_usage_error() {
        let err = parse_args(&["-f".to_string()]).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Usage);
    }

    #[test]
    fn dash_a_sets_argv0_without_consuming_the_command() {
        let parsed = parse_args(&["-a".to_string(), "myshell".to_string(), "sh".to_string()]).unwrap();
        assert_eq!(parsed.argv0.as_deref(), Some("myshell"));
        assert_eq!(parsed.cmd, "sh");
    }

    #[test]
    fn busy_check_rejects_unreported_jobs_without_force() {
        let mut t = JobTable::new();
        t.add(100, "sleep 30", vec![100]);
        t.set_status(100, kaish_ctl_signal::RawWaitStatus::Stopped(19));
        assert!(check_busy(&t, false).is_err());
        assert!(check_busy(&t, true).is_ok());
    }
}
