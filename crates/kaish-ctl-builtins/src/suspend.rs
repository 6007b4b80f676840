//! `suspend [-f]` builtin: raises `SIGSTOP` on the shell's own process
//! group; refuses on a login shell unless `-f`.

use kaish_ctl_types::ExitCode;

use crate::error::BuiltinError;

const NAME: &str = "suspend";

/// Raises `SIGSTOP` on the calling process. `login_shell` is supplied
/// by the caller (the shell knows whether it was invoked as a login
/// shell); `force` is the `-f` flag.
pub fn suspend(args: &[String], login_shell: bool) -> Result<(Vec<String>, i32), BuiltinError> {
    let mut force = false;
    for a in args {
        match a.as_str() {
            "-f" => force = true,
            other => return Err(BuiltinError::usage(NAME, format!("invalid option: {other}"))),
        }
    }

    if login_shell && !force {
        return Err(BuiltinError::usage(
            NAME,
            "cannot suspend a login shell (use -f to force)",
        ));
    }

    raise_sigstop()?;
    Ok((Vec::new(), ExitCode::SUCCESS))
}

#[cfg(unix)]
fn raise_sigstop() -> Result<(), BuiltinError> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::getpid;
    kill(getpid(), Signal::SIGSTOP).map_err(|e| BuiltinError::system(NAME, "SIGSTOP", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_shell_is_refused_without_force() {
        let err = suspend(&[], true).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Usage);
    }

    #[test]
    fn unknown_flag_is_usage_error() {
        let err = suspend(&["-x".to_string()], false).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Usage);
    }
}
