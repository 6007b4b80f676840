//! `kill` builtin.

use kaish_ctl_job::{resolve_jobspec, JobTable};
use kaish_ctl_signal::SignalNum;
use kaish_ctl_types::ExitCode;

use crate::error::{job_error, BuiltinError};

const NAME: &str = "kill";

/// Runs `kill`. `targets` may be bare pids or `%jobspec` strings.
/// Returns the rendered `-l`/`-v` listing (if any) and the exit status.
pub fn kill(args: &[String], table: &JobTable) -> Result<(Vec<String>, i32), BuiltinError> {
    if args.is_empty() {
        return Err(BuiltinError::usage(
            NAME,
            "usage: kill [-s sig|-signame] target... | kill -l [sigs] | kill -v",
        ));
    }

    let mut idx = 0;
    let mut list = false;
    let mut verbose = false;
    let mut signal = SignalNum::new(15); // SIGTERM default

    while idx < args.len() {
        match args[idx].as_str() {
            "-l" => {
                list = true;
                idx += 1;
            }
            "-v" => {
                verbose = true;
                idx += 1;
            }
            "-s" => {
                idx += 1;
                let name = args
                    .get(idx)
                    .ok_or_else(|| BuiltinError::usage(NAME, "-s requires a signal name"))?;
                signal = kaish_ctl_signal::parse_name(name)
                    .ok_or_else(|| BuiltinError::not_found(NAME, format!("{name}: invalid signal specification")))?;
                idx += 1;
            }
            "--" => {
                idx += 1;
                break;
            }
            a if a.starts_with('-') && a.len() > 1 => {
                let name = &a[1..];
                signal = kaish_ctl_signal::parse_name(name)
                    .ok_or_else(|| BuiltinError::not_found(NAME, format!("{name}: invalid signal specification")))?;
                idx += 1;
            }
            _ => break,
        }
    }

    let mut out = Vec::new();

    if list {
        let rest = &args[idx..];
        if rest.is_empty() {
            for (name, _) in kaish_ctl_signal::list_all() {
                out.push(name);
            }
        } else {
            for raw in rest {
                if let Ok(n) = raw.parse::<i32>() {
                    let base = if n >= 128 { n - 128 } else { n };
                    out.push(
                        kaish_ctl_signal::name_of(SignalNum::new(base))
                            .unwrap_or_else(|| base.to_string()),
                    );
                } else if let Some(s) = kaish_ctl_signal::parse_name(raw) {
                    out.push(s.get().to_string());
                } else {
                    return Err(BuiltinError::not_found(NAME, format!("{raw}: invalid signal specification")));
                }
            }
        }
        return Ok((out, ExitCode::SUCCESS));
    }

    if verbose {
        for (_, num) in kaish_ctl_signal::list_all() {
            out.push(kaish_ctl_signal::describe(num));
        }
        return Ok((out, ExitCode::SUCCESS));
    }

    let targets = &args[idx..];
    if targets.is_empty() {
        return Err(BuiltinError::usage(NAME, "missing target operand"));
    }

    for t in targets {
        send_to_target(table, t, signal)?;
    }
    Ok((out, ExitCode::SUCCESS))
}

#[cfg(unix)]
fn send_to_target(table: &JobTable, target: &str, signal: SignalNum) -> Result<(), BuiltinError> {
    use nix::sys::signal::{kill as nix_kill, Signal};
    use nix::unistd::Pid;

    let pid = if target.starts_with('%') {
        let job_id = resolve_jobspec(table, target).map_err(|e| job_error(NAME, e))?;
        let job = table
            .get(job_id)
            .ok_or_else(|| BuiltinError::not_found(NAME, "no such job"))?;
        -job.pgid() // negative pid targets the whole process group
    } else {
        target
            .parse::<i32>()
            .map_err(|_| BuiltinError::usage(NAME, format!("{target}: arguments must be process or job IDs")))?
    };

    let sig = Signal::try_from(signal.get())
        .map_err(|_| BuiltinError::not_found(NAME, format!("{}: invalid signal", signal.get())))?;
    nix_kill(Pid::from_raw(pid), sig).map_err(|e| BuiltinError::system(NAME, "kill", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_l_with_no_args_lists_all_names() {
        let table = JobTable::new();
        let (lines, status) = kill(&["-l".to_string()], &table).unwrap();
        assert_eq!(status, ExitCode::SUCCESS);
        assert!(lines.contains(&"TERM".to_string()));
    }

    #[test]
    fn dash_l_decodes_128_plus_signum() {
        let table = JobTable::new();
        let (lines, _) = kill(&["-l".to_string(), "143".to_string()], &table).unwrap();
        assert_eq!(lines, vec!["TERM".to_string()]);
    }

    #[test]
    fn unknown_signal_name_is_not_found() {
        let table = JobTable::new();
        let err = kill(&["-NOTASIGNAL".to_string(), "1".to_string()], &table).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::NotFound);
    }

    #[test]
    fn missing_target_is_usage_error() {
        let table = JobTable::new();
        let err = kill(&["-s".to_string(), "TERM".to_string()], &table).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Usage);
    }
}
