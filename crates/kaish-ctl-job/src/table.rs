//! The indexed job collection.

use std::collections::BTreeMap;

use kaish_ctl_signal::RawWaitStatus;
use kaish_ctl_types::{ExitStatus, JobId, SignalNum};

use crate::error::JobError;
use crate::job::Job;

/// Indexed ordered collection of jobs. Iteration is index-monotonic since `BTreeMap` keeps keys
/// sorted.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: BTreeMap<u32, Job>,
    current: Option<JobId>,
    previous: Option<JobId>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the lowest unused positive index; the new job becomes current, and the prior current
    /// becomes previous.
    pub fn add(&mut self, pgid: i32, name: impl Into<String>, pids: Vec<i32>) -> JobId {
        let mut n = 1;
        while self.jobs.contains_key(&n) {
            n += 1;
        }
        let id = JobId::new(n);
        self.jobs.insert(n, Job::new(id, pgid, name, pids));

        self.previous = self.current;
        self.current = Some(id);
        id
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id.get())
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.get_mut(&id.get())
    }

    pub fn get_by_pid(&self, pid: i32) -> Option<JobId> {
        self.jobs
            .values()
            .find(|j| j.has_pid(pid))
            .map(|j| j.id())
    }

    pub fn current(&self) -> Option<JobId> {
        self.current
    }

    pub fn previous(&self) -> Option<JobId> {
        self.previous
    }

    pub fn is_current(&self, id: JobId) -> bool {
        self.current == Some(id)
    }

    pub fn is_previous(&self, id: JobId) -> bool {
        self.previous == Some(id)
    }

    /// All jobs in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    /// Matches `%name…` as a prefix against job command names: 0 matches is `NotFound`, 1 is that job, ≥2
    /// is `Ambiguous`.
    pub fn find_by_name_prefix(&self, prefix: &str) -> Result<JobId, JobError> {
        let matches: Vec<JobId> = self
            .jobs
            .values()
            .filter(|j| j.name().starts_with(prefix))
            .map(|j| j.id())
            .collect();
        match matches.len() {
            0 => Err(JobError::NotFound),
            1 => Ok(matches[0]),
            _ => Err(JobError::Ambiguous),
        }
    }

    /// Removes a job. If it was current, previous is promoted to
    /// current and a new previous is chosen as the highest remaining
    /// index other than the new current.
    pub fn remove(&mut self, id: JobId) {
        self.jobs.remove(&id.get());

        if self.current == Some(id) {
            self.current = self.previous.filter(|p| self.jobs.contains_key(&p.get()));
            self.previous = None;
        } else if self.previous == Some(id) {
            self.previous = None;
        }

        if self.current.is_none() {
            self.current = self.jobs.keys().next_back().copied().map(JobId::new);
        }
        if self.previous.is_none() {
            self.previous = self
                .jobs
                .keys()
                .rev()
                .map(|&n| JobId::new(n))
                .find(|&id| Some(id) != self.current);
        }
    }

    /// Updates the job containing `pid` from a reaped wait status: any
    /// stopped child stops the whole job immediately, but an
    /// exited/signaled pid only marks *that* pid done — the job itself
    /// transitions to `Done` once every pid in a (possibly multi-stage
    /// pipeline) job has reported, with the last non-zero exit status
    /// (or terminating signal) as the aggregate.
    pub fn set_status(&mut self, pid: i32, status: RawWaitStatus) {
        let Some(id) = self.get_by_pid(pid) else {
            return;
        };
        let Some(job) = self.get_mut(id) else {
            return;
        };

        match status {
            RawWaitStatus::Stopped(_) => job.mark_stopped(),
            RawWaitStatus::Continued => job.mark_running(),
            RawWaitStatus::Exited(code) => job.record_pid_exit(pid, ExitStatus::Exited(code)),
            RawWaitStatus::Signaled(sig, _core) => {
                job.record_pid_exit(pid, ExitStatus::Signaled(SignalNum::new(sig)))
            }
        }
    }

    /// Marks a job running again after `fg`/`bg` sends `SIGCONT`.
    pub fn set_status_running(&mut self, id: JobId) {
        if let Some(job) = self.get_mut(id) {
            job.mark_running();
        }
    }

    /// Used by `exit`/`exec` gating: jobs whose status
    /// changed since last print and haven't been reported yet.
    pub fn count_unreported_done_or_stopped(&self) -> usize {
        self.jobs
            .values()
            .filter(|j| {
                !j.notified()
                    && matches!(
                        j.status(),
                        crate::job::JobStatus::Done | crate::job::JobStatus::Stopped
                    )
            })
            .count()
    }

    /// Drops every `Done` job that has already been printed/notified —
    /// called by the `Waiter` after asynchronous notification.
    pub fn reap_notified_done(&mut self) {
        let done: Vec<u32> = self
            .jobs
            .iter()
            .filter(|(_, j)| j.notified() && matches!(j.status(), crate::job::JobStatus::Done))
            .map(|(&n, _)| n)
            .collect();
        for n in done {
            self.remove(JobId::new(n));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_uses_lowest_free_index() {
        let mut t = JobTable::new();
        let a = t.add(100, "a", vec![100]);
        let b = t.add(200, "b", vec![200]);
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        t.remove(a);
        let c = t.add(300, "c", vec![300]);
        assert_eq!(c.get(), 1);
    }

    #[test]
    fn current_and_previous_track_additions() {
        let mut t = JobTable::new();
        let a = t.add(100, "a", vec![100]);
        assert_eq!(t.current(), Some(a));
        assert_eq!(t.previous(), None);
        let b = t.add(200, "b", vec![200]);
        assert_eq!(t.current(), Some(b));
        assert_eq!(t.previous(), Some(a));
    }

    #[test]
    fn removing_current_promotes_previous() {
        let mut t = JobTable::new();
        let a = t.add(100, "a", vec![100]);
        let b = t.add(200, "b", vec![200]);
        t.remove(b);
        assert_eq!(t.current(), Some(a));
    }

    #[test]
    fn name_prefix_ambiguity() {
        let mut t = JobTable::new();
        t.add(100, "vim foo", vec![100]);
        t.add(200, "vim bar", vec![200]);
        assert_eq!(t.find_by_name_prefix("vim"), Err(JobError::Ambiguous));
        assert_eq!(t.find_by_name_prefix("nope"), Err(JobError::NotFound));
    }

    #[test]
    fn set_status_marks_signaled_job_done() {
        let mut t = JobTable::new();
        let a = t.add(100, "sleep 30", vec![100]);
        t.set_status(100, RawWaitStatus::Signaled(15, false));
        let job = t.get(a).unwrap();
        assert_eq!(job.exit_status(), Some(ExitStatus::Signaled(SignalNum::new(15))));
    }

    #[test]
    fn pipeline_job_stays_running_until_every_pid_exits() {
        let mut t = JobTable::new();
        let a = t.add(100, "a | b | c", vec![100, 101, 102]);
        t.set_status(100, RawWaitStatus::Exited(0));
        assert_eq!(t.get(a).unwrap().status(), crate::job::JobStatus::Running);
        t.set_status(101, RawWaitStatus::Exited(1));
        assert_eq!(t.get(a).unwrap().status(), crate::job::JobStatus::Running);
        t.set_status(102, RawWaitStatus::Exited(0));
        let job = t.get(a).unwrap();
        assert_eq!(job.status(), crate::job::JobStatus::Done);
        assert_eq!(job.exit_status(), Some(ExitStatus::Exited(1)));
    }
}
