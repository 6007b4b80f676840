//! The signal → command map.

use std::collections::BTreeMap;

use crate::error::TrapError;
use crate::names;
use crate::SignalNum;

/// KILL and STOP can never be trapped.
const KILL: i32 = 9;
const STOP: i32 = 19;

/// Whether re-trapping a signal that was ignored on shell entry is
/// rejected (POSIX) or silently allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrapPolicy {
    #[default]
    Posix,
    Lenient,
}

/// The three-way trap disposition for one signal: unset (default disposition), empty (ignored), or non-empty
/// (run this command when caught).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrapCommand {
    /// Ignored — `trap '' SIG`.
    Ignore,
    /// Run this command fragment when the signal is caught.
    Run(String),
}

/// Map from signal number (0 = EXIT) to trap disposition, plus the set of
/// signals that were `SIG_IGN` when the shell started (and so may not be
/// re-trapped under `TrapPolicy::Posix`).
#[derive(Debug, Clone, Default)]
pub struct TrapTable {
    entries: BTreeMap<i32, TrapCommand>,
    initially_ignored: std::collections::BTreeSet<i32>,
    policy: TrapPolicy,
}

impl TrapTable {
    pub fn new(policy: TrapPolicy) -> Self {
        Self {
            entries: BTreeMap::new(),
            initially_ignored: std::collections::BTreeSet::new(),
            policy,
        }
    }

    /// Records that `sig` was ignored before the shell ever touched it.
    /// Called once at startup for each signal whose pre-existing
    /// disposition was `SIG_IGN`.
    pub fn note_initially_ignored(&mut self, sig: SignalNum) {
        self.initially_ignored.insert(sig.get());
    }

    /// Sets, clears (`command = None`), or ignores (`command =
    /// Some("")`) the trap for `sig`.
    pub fn set_trap(&mut self, sig: SignalNum, command: Option<String>) -> Result<(), TrapError> {
        let n = sig.get();
        if n != 0 && (n == KILL || n == STOP) {
            return Err(TrapError::Forbidden(sig));
        }

        if n != 0
            && self.policy == TrapPolicy::Posix
            && self.initially_ignored.contains(&n)
            && !self.entries.contains_key(&n)
        {
            return Err(TrapError::InitiallyIgnored);
        }

        match command {
            None => {
                self.entries.remove(&n);
            }
            Some(cmd) if cmd.is_empty() => {
                self.entries.insert(n, TrapCommand::Ignore);
            }
            Some(cmd) => {
                self.entries.insert(n, TrapCommand::Run(cmd));
            }
        }
        Ok(())
    }

    pub fn get(&self, sig: SignalNum) -> Option<&TrapCommand> {
        self.entries.get(&sig.get())
    }

    /// The blocking-mask invariant: the set of signals
    /// whose entry is non-empty non-ignored (the EXIT pseudo-signal, 0, is
    /// never part of the OS blocking mask since it isn't a real signal).
    pub fn trapped_signals(&self) -> impl Iterator<Item = SignalNum> + '_ {
        self.entries.iter().filter_map(|(&n, cmd)| {
            if n != 0 && matches!(cmd, TrapCommand::Run(_)) {
                Some(SignalNum::new(n))
            } else {
                None
            }
        })
    }

    /// `trap -p [sig…]` rendering: `trap -- 'command' SIGNAME`, one per line. With no
    /// `sigs`, renders every non-default entry.
    pub fn format_for_print(&self, sigs: &[SignalNum]) -> Vec<String> {
        let targets: Vec<i32> = if sigs.is_empty() {
            self.entries.keys().copied().collect()
        } else {
            sigs.iter().map(|s| s.get()).collect()
        };

        targets
            .into_iter()
            .filter_map(|n| {
                let name = names::name_of(SignalNum::new(n)).unwrap_or_else(|| n.to_string());
                match self.entries.get(&n) {
                    Some(TrapCommand::Ignore) => Some(format!("trap -- '' {name}")),
                    Some(TrapCommand::Run(cmd)) => {
                        Some(format!("trap -- '{}' {name}", shell_quote(cmd)))
                    }
                    None => None,
                }
            })
            .collect()
    }

    /// Applies the fork-preparation rule: ignored traps remain ignored
    /// in the child; default and caught traps reset to default; the
    /// EXIT trap is cleared unless re-set.
    pub fn reset_for_fork_child(&self) -> Self {
        let mut child = Self::new(self.policy);
        for (&n, cmd) in &self.entries {
            if n == 0 {
                continue; // EXIT trap cleared in the child
            }
            if matches!(cmd, TrapCommand::Ignore) {
                child.entries.insert(n, TrapCommand::Ignore);
            }
        }
        child.initially_ignored = self.initially_ignored.clone();
        child
    }
}

fn shell_quote(s: &str) -> String {
    s.replace('\'', r"'\''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_and_stop_are_forbidden() {
        let mut table = TrapTable::new(TrapPolicy::Posix);
        assert_eq!(
            table.set_trap(SignalNum::new(KILL), Some("echo hi".into())),
            Err(TrapError::Forbidden(SignalNum::new(KILL)))
        );
        assert_eq!(
            table.set_trap(SignalNum::new(STOP), Some("echo hi".into())),
            Err(TrapError::Forbidden(SignalNum::new(STOP)))
        );
    }

    #[test]
    fn trapped_signals_matches_non_empty_non_ignored_entries() {
        let mut table = TrapTable::new(TrapPolicy::Posix);
        table.set_trap(SignalNum::new(2), Some("echo int".into())).unwrap();
        table.set_trap(SignalNum::new(15), Some(String::new())).unwrap();
        table.set_trap(SignalNum::new(0), Some("echo exit".into())).unwrap();
        let trapped: Vec<_> = table.trapped_signals().collect();
        assert_eq!(trapped, vec![SignalNum::new(2)]);
    }

    #[test]
    fn initially_ignored_rejected_under_posix_policy() {
        let mut table = TrapTable::new(TrapPolicy::Posix);
        table.note_initially_ignored(SignalNum::new(15));
        assert_eq!(
            table.set_trap(SignalNum::new(15), Some("echo hi".into())),
            Err(TrapError::InitiallyIgnored)
        );
    }

    #[test]
    fn initially_ignored_allowed_under_lenient_policy() {
        let mut table = TrapTable::new(TrapPolicy::Lenient);
        table.note_initially_ignored(SignalNum::new(15));
        assert!(table.set_trap(SignalNum::new(15), Some("echo hi".into())).is_ok());
    }

    #[test]
    fn fork_child_keeps_ignore_resets_others_clears_exit() {
        let mut table = TrapTable::new(TrapPolicy::Posix);
        table.set_trap(SignalNum::new(2), Some("echo int".into())).unwrap();
        table.set_trap(SignalNum::new(15), Some(String::new())).unwrap();
        table.set_trap(SignalNum::new(0), Some("echo exit".into())).unwrap();

        let child = table.reset_for_fork_child();
        assert_eq!(child.get(SignalNum::new(2)), None);
        assert_eq!(child.get(SignalNum::new(15)), Some(&TrapCommand::Ignore));
        assert_eq!(child.get(SignalNum::new(0)), None);
    }
}
