//! `trap [action] sig…` / `trap -p [sig…]` / `trap -l` builtin.

use kaish_ctl_signal::{list_all, parse_name, SignalNum, TrapError, TrapTable};
use kaish_ctl_types::ExitCode;

use crate::error::BuiltinError;

const NAME: &str = "trap";

fn parse_signal(token: &str) -> Result<SignalNum, BuiltinError> {
    parse_name(token).ok_or_else(|| BuiltinError::usage(NAME, format!("{token}: invalid signal specification")))
}

/// Runs `trap`. Three forms:
///
/// - `trap -l`: lists every known signal name and number.
/// - `trap -p [sig…]`: prints the current trap table, in `trap -- 'cmd'
///   SIGNAME` form, for the named signals (or all set traps with none
///   given).
/// - `trap [action] sig…`: sets `action` (a command string, `""` to
///   ignore, or `-` to restore the default) as the trap for each named
///   signal. With no `action` and no `sig`, behaves like `-p`.
pub fn trap(args: &[String], traps: &mut TrapTable) -> Result<(Vec<String>, i32), BuiltinError> {
    if args.first().map(String::as_str) == Some("-l") {
        let lines = list_all()
            .into_iter()
            .map(|(name, sig)| format!("{}) {name}", sig.get()))
            .collect();
        return Ok((lines, ExitCode::SUCCESS));
    }

    if args.first().map(String::as_str) == Some("-p") {
        let mut sigs = Vec::with_capacity(args.len().saturating_sub(1));
        for tok in &args[1..] {
            sigs.push(parse_signal(tok)?);
        }
        return Ok((traps.format_for_print(&sigs), ExitCode::SUCCESS));
    }

    if args.is_empty() {
        return Ok((traps.format_for_print(&[]), ExitCode::SUCCESS));
    }

    let (action, sig_tokens) = (&args[0], &args[1..]);
    if sig_tokens.is_empty() {
        return Err(BuiltinError::usage(NAME, "missing signal specification"));
    }

    let command = match action.as_str() {
        "-" => None,
        other => Some(other.to_string()),
    };

    for tok in sig_tokens {
        let sig = parse_signal(tok)?;
        traps.set_trap(sig, command.clone()).map_err(|e| match e {
            TrapError::Forbidden(s) => {
                BuiltinError::forbidden(NAME, format!("{}: trap not allowed", describe_sig(s)))
            }
            TrapError::InitiallyIgnored => BuiltinError::forbidden(
                NAME,
                format!("{tok}: signal was ignored on entry and may not be trapped"),
            ),
            TrapError::NotSet(s) => {
                BuiltinError::usage(NAME, format!("{}: no trap set", describe_sig(s)))
            }
        })?;
    }

    Ok((Vec::new(), ExitCode::SUCCESS))
}

fn describe_sig(sig: SignalNum) -> String {
    kaish_ctl_signal::name_of(sig).unwrap_or_else(|| sig.get().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaish_ctl_signal::TrapPolicy;

    #[test]
    fn sets_and_prints_a_trap() {
        let mut traps = TrapTable::new(TrapPolicy::Posix);
        trap(&["echo bye".to_string(), "INT".to_string()], &mut traps).unwrap();
        let (lines, code) = trap(&["-p".to_string()], &mut traps).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(lines[0].contains("echo bye"));
        assert!(lines[0].contains("INT"));
    }

    #[test]
    fn dash_clears_a_trap() {
        let mut traps = TrapTable::new(TrapPolicy::Posix);
        trap(&["echo bye".to_string(), "INT".to_string()], &mut traps).unwrap();
        trap(&["-".to_string(), "INT".to_string()], &mut traps).unwrap();
        assert!(traps.get(SignalNum::new(2)).is_none());
    }

    #[test]
    fn kill_is_forbidden() {
        let mut traps = TrapTable::new(TrapPolicy::Posix);
        let err = trap(&["echo no".to_string(), "KILL".to_string()], &mut traps).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Forbidden);
    }

    #[test]
    fn unknown_signal_name_is_usage_error() {
        let mut traps = TrapTable::new(TrapPolicy::Posix);
        let err = trap(&["echo".to_string(), "NOPE".to_string()], &mut traps).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Usage);
    }

    #[test]
    fn dash_p_rendering_matches_known_good_output() {
        let mut traps = TrapTable::new(TrapPolicy::Posix);
        trap(&["echo bye".to_string(), "INT".to_string()], &mut traps).unwrap();
        let (lines, _) = trap(&["-p".to_string()], &mut traps).unwrap();
        insta::assert_snapshot!(lines[0], @"trap -- 'echo bye' INT");
    }
}
