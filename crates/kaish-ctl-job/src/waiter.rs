//! Reaps children and folds statuses into the job table.

use kaish_ctl_signal::{RawWaitStatus, ReapedChild};

use crate::job::JobStatus;
use crate::table::JobTable;

/// Whether the shell prints `jobs`-style status-change lines as children
/// change state, without waiting for an explicit `jobs` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyMode {
    #[default]
    Synchronous,
    Asynchronous,
}

/// Drives reaping; owns no state beyond the notify mode, since all
/// mutable job state lives in `JobTable`.
#[derive(Debug, Default)]
pub struct Waiter {
    notify: NotifyMode,
}

impl Waiter {
    pub fn new(notify: NotifyMode) -> Self {
        Self { notify }
    }

    /// Folds a batch of reaped children (as returned by
    /// `SigState::drain`/`wait_for_child`) into `table`, then — if
    /// asynchronous notification is enabled — returns rendered status
    /// lines for jobs whose status changed, and drops `Done` jobs that
    /// were printed.
    pub fn apply(&self, table: &mut JobTable, reaped: &[ReapedChild]) -> Vec<String> {
        for child in reaped {
            table.set_status(child.pid, child.status);
            tracing::debug!(pid = child.pid, status = ?child.status, "reaped child");
        }

        if self.notify != NotifyMode::Asynchronous {
            return Vec::new();
        }

        let current = table.current();
        let previous = table.previous();
        let mut lines = Vec::new();
        let mut to_drop = Vec::new();

        for job in table.iter() {
            if job.notified() {
                continue;
            }
            if matches!(job.status(), JobStatus::Done | JobStatus::Stopped) {
                lines.push(job.describe(
                    Some(job.id()) == current,
                    Some(job.id()) == previous,
                    false,
                ));
                if job.status() == JobStatus::Done {
                    to_drop.push(job.id());
                }
            }
        }

        let notified_ids: Vec<_> = table
            .iter()
            .filter(|j| !j.notified() && matches!(j.status(), JobStatus::Done | JobStatus::Stopped))
            .map(|j| j.id())
            .collect();
        for id in notified_ids {
            if let Some(job) = table.get_mut(id) {
                job.set_notified(true);
            }
        }
        for id in to_drop {
            table.remove(id);
        }

        lines
    }

    /// Pure WNOHANG drain convenience used by tests and `wait`/`jobs`
    /// call sites that already have a `ReapedChild` batch from
    /// `SigState`; this module never calls `waitpid` itself so it stays
    /// independent of any signal-handler plumbing.
    pub fn apply_raw(&self, table: &mut JobTable, pid: i32, status: RawWaitStatus) -> Vec<String> {
        self.apply(table, &[ReapedChild { pid, status }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synchronous_mode_updates_but_does_not_render() {
        let mut t = JobTable::new();
        let id = t.add(100, "sleep 30", vec![100]);
        let waiter = Waiter::new(NotifyMode::Synchronous);
        let lines = waiter.apply_raw(&mut t, 100, RawWaitStatus::Exited(0));
        assert!(lines.is_empty());
        assert_eq!(t.get(id).unwrap().status(), JobStatus::Done);
    }

    #[test]
    fn asynchronous_mode_renders_and_drops_done() {
        let mut t = JobTable::new();
        t.add(100, "sleep 30", vec![100]);
        let waiter = Waiter::new(NotifyMode::Asynchronous);
        let lines = waiter.apply_raw(&mut t, 100, RawWaitStatus::Exited(0));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Done"));
        assert_eq!(t.iter().count(), 0);
    }
}
