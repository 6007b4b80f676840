//! `exit [-f] [n]` builtin: terminates the shell, running the `EXIT`
//! trap (if any) first.

use kaish_ctl_job::JobTable;
use kaish_ctl_signal::{SignalNum, TrapCommand, TrapTable};

use crate::error::BuiltinError;

const NAME: &str = "exit";

/// Runs `exit`. Does not itself terminate the process — it checks the
/// busy-jobs gate, fires the `EXIT` trap (signal number 0) through
/// `on_trap` if one is set, and returns the code the caller should exit
/// with. The caller (the REPL loop) is responsible for actually ending
/// the process once this returns `Ok`.
pub fn exit(
    args: &[String],
    table: &JobTable,
    traps: &TrapTable,
    last_status: i32,
    mut on_trap: impl FnMut(SignalNum, &str),
) -> Result<(Vec<String>, i32), BuiltinError> {
    let mut force = false;
    let mut idx = 0;
    while idx < args.len() && args[idx] == "-f" {
        force = true;
        idx += 1;
    }

    let code = match args.get(idx) {
        None => last_status,
        Some(n) => {
            let parsed: i64 = n
                .parse()
                .map_err(|_| BuiltinError::usage(NAME, format!("{n}: numeric argument required")))?;
            parsed.rem_euclid(256) as i32
        }
    };

    if idx + 1 < args.len() {
        return Err(BuiltinError::usage(NAME, "too many arguments"));
    }

    if !force && table.count_unreported_done_or_stopped() > 0 {
        return Err(BuiltinError::busy(NAME, "there are stopped or unreported jobs"));
    }

    if let Some(TrapCommand::Run(cmd)) = traps.get(SignalNum::new(0)) {
        on_trap(SignalNum::new(0), cmd);
    }

    Ok((Vec::new(), code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaish_ctl_signal::TrapPolicy;

    #[test]
    fn no_args_uses_last_status() {
        let table = JobTable::new();
        let traps = TrapTable::new(TrapPolicy::Posix);
        let (_, code) = exit(&[], &table, &traps, 7, |_, _| {}).unwrap();
        assert_eq!(code, 7);
    }

    #[test]
    fn numeric_argument_overrides_last_status() {
        let table = JobTable::new();
        let traps = TrapTable::new(TrapPolicy::Posix);
        let (_, code) = exit(&["3".to_string()], &table, &traps, 7, |_, _| {}).unwrap();
        assert_eq!(code, 3);
    }

    #[test]
    fn non_numeric_argument_is_usage_error() {
        let table = JobTable::new();
        let traps = TrapTable::new(TrapPolicy::Posix);
        let err = exit(&["nope".to_string()], &table, &traps, 0, |_, _| {}).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Usage);
    }

    #[test]
    fn busy_without_force_is_rejected() {
        let mut table = JobTable::new();
        table.add(100, "sleep 30", vec![100]);
        table.set_status(100, kaish_ctl_signal::RawWaitStatus::Stopped(19));
        let traps = TrapTable::new(TrapPolicy::Posix);
        let err = exit(&[], &table, &traps, 0, |_, _| {}).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Busy);

        let (_, code) = exit(&["-f".to_string()], &table, &traps, 0, |_, _| {}).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn runs_the_exit_trap_before_returning() {
        let table = JobTable::new();
        let mut traps = TrapTable::new(TrapPolicy::Posix);
        traps.set_trap(SignalNum::new(0), Some("echo caught".into())).unwrap();

        let mut fired = None;
        let (_, code) = exit(&["7".to_string()], &table, &traps, 0, |sig, cmd| {
            fired = Some((sig, cmd.to_string()));
        })
        .unwrap();

        assert_eq!(code, 7);
        assert_eq!(fired, Some((SignalNum::new(0), "echo caught".to_string())));
    }
}
