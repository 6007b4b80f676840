//! A single tracked job.

use kaish_ctl_types::{ExitStatus, JobId, SignalNum};

/// Running/stopped/done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Stopped,
    Done,
}

/// A tracked background/foreground job.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    pgid: i32,
    name: String,
    status: JobStatus,
    exit_status: Option<ExitStatus>,
    /// Pids that belong to this job's process group, for multi-command
    /// pipelines, paired with each pid's terminal status once reaped.
    /// `Done` is only reachable once every entry is `Some`.
    pids: Vec<i32>,
    pid_status: Vec<Option<ExitStatus>>,
    no_hup: bool,
    notified: bool,
}

impl Job {
    pub fn new(id: JobId, pgid: i32, name: impl Into<String>, pids: Vec<i32>) -> Self {
        let pid_status = vec![None; pids.len()];
        Self {
            id,
            pgid,
            name: name.into(),
            status: JobStatus::Running,
            exit_status: None,
            pids,
            pid_status,
            no_hup: false,
            notified: true,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn pgid(&self) -> i32 {
        self.pgid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    pub fn pids(&self) -> &[i32] {
        &self.pids
    }

    pub fn no_hup(&self) -> bool {
        self.no_hup
    }

    pub fn set_no_hup(&mut self, v: bool) {
        self.no_hup = v;
    }

    pub fn notified(&self) -> bool {
        self.notified
    }

    pub fn set_notified(&mut self, v: bool) {
        self.notified = v;
    }

    pub fn has_pid(&self, pid: i32) -> bool {
        self.pids.contains(&pid)
    }

    pub(crate) fn mark_running(&mut self) {
        self.status = JobStatus::Running;
        self.notified = false;
    }

    pub(crate) fn mark_stopped(&mut self) {
        self.status = JobStatus::Stopped;
        self.notified = false;
    }

    pub(crate) fn mark_done(&mut self, status: ExitStatus) {
        self.status = JobStatus::Done;
        self.exit_status = Some(status);
        self.notified = false;
    }

    /// Records that `pid` (one member of a possibly multi-pid pipeline
    /// job) exited or was signaled. The job only transitions to `Done`
    /// once every tracked pid has reported; the aggregate exit status is
    /// the last non-zero status across pids, per spec, falling back to
    /// a clean exit if none was non-zero.
    pub(crate) fn record_pid_exit(&mut self, pid: i32, status: ExitStatus) {
        if let Some(i) = self.pids.iter().position(|&p| p == pid) {
            self.pid_status[i] = Some(status);
        }
        self.notified = false;
        if self.pid_status.iter().all(Option::is_some) {
            self.status = JobStatus::Done;
            self.exit_status = Some(Self::aggregate_pid_status(&self.pid_status));
        }
    }

    fn aggregate_pid_status(pid_status: &[Option<ExitStatus>]) -> ExitStatus {
        let mut last_nonzero = None;
        for status in pid_status.iter().flatten() {
            if !matches!(status, ExitStatus::Exited(0)) {
                last_nonzero = Some(*status);
            }
        }
        last_nonzero.unwrap_or(ExitStatus::Exited(0))
    }

    /// A one-line `jobs` rendering, e.g. `[1]+  Running    sleep 30 &`.
    pub fn describe(&self, current: bool, previous: bool, show_pid: bool) -> String {
        let marker = if current {
            "+"
        } else if previous {
            "-"
        } else {
            " "
        };
        let status_word = match self.status {
            JobStatus::Running => "Running".to_string(),
            JobStatus::Stopped => "Stopped".to_string(),
            JobStatus::Done => match self.exit_status {
                Some(ExitStatus::Exited(0)) => "Done".to_string(),
                Some(ExitStatus::Exited(n)) => format!("Done({n})"),
                Some(ExitStatus::Signaled(sig)) => format!("{}", signal_word(sig)),
                None => "Done".to_string(),
            },
        };
        if show_pid {
            format!(
                "[{}]{}  {:<10} {}  {}",
                self.id, marker, status_word, self.pgid, self.name
            )
        } else {
            format!("[{}]{}  {:<10} {}", self.id, marker, status_word, self.name)
        }
    }
}

fn signal_word(sig: SignalNum) -> String {
    kaish_ctl_signal::name_of(sig)
        .map(|n| format!("{n}"))
        .unwrap_or_else(|| format!("Signal {}", sig.get()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_includes_index_and_marker() {
        let job = Job::new(JobId::new(1), 1234, "sleep 30 &", vec![1234]);
        let line = job.describe(true, false, false);
        assert!(line.starts_with("[1]+"));
        assert!(line.contains("Running"));
        assert!(line.contains("sleep 30 &"));
    }
}
