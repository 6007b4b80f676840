//! `jobs [-ln] [jobspec...]` builtin.

use kaish_ctl_job::{resolve_jobspec, JobTable};
use kaish_ctl_types::ExitCode;

use crate::error::{job_error, BuiltinError};

const NAME: &str = "jobs";

/// Renders the job table (or a subset of it) and marks the printed jobs
/// notified, mirroring how `Waiter` marks async notifications consumed.
pub fn jobs(args: &[String], table: &mut JobTable) -> Result<(Vec<String>, i32), BuiltinError> {
    let mut show_pid = false;
    let mut unnotified_only = false;
    let mut specs = Vec::new();

    for a in args {
        match a.as_str() {
            "-l" => show_pid = true,
            "-n" => unnotified_only = true,
            "-ln" | "-nl" => {
                show_pid = true;
                unnotified_only = true;
            }
            spec if spec.starts_with('%') || spec.parse::<i32>().is_ok() => specs.push(spec),
            other => {
                return Err(BuiltinError::usage(NAME, format!("invalid option: {other}")));
            }
        }
    }

    let ids: Vec<_> = if specs.is_empty() {
        table.iter().map(|j| j.id()).collect()
    } else {
        let mut ids = Vec::with_capacity(specs.len());
        for s in &specs {
            ids.push(resolve_jobspec(table, s).map_err(|e| job_error(NAME, e))?);
        }
        ids
    };

    let mut lines = Vec::new();
    for id in ids {
        let current = table.is_current(id);
        let previous = table.is_previous(id);
        let Some(job) = table.get(id) else { continue };
        if unnotified_only && job.notified() {
            continue;
        }
        lines.push(job.describe(current, previous, show_pid));
        if let Some(job) = table.get_mut(id) {
            job.set_notified(true);
        }
    }

    if lines.is_empty() && specs.is_empty() {
        lines.push("no jobs".to_string());
    }

    Ok((lines, ExitCode::SUCCESS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_all_jobs_by_default() {
        let mut t = JobTable::new();
        t.add(100, "sleep 30", vec![100]);
        t.add(200, "vim", vec![200]);
        let (lines, status) = jobs(&[], &mut t).unwrap();
        assert_eq!(status, ExitCode::SUCCESS);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn dash_n_suppresses_already_notified_jobs() {
        let mut t = JobTable::new();
        t.add(100, "sleep 30", vec![100]);
        let (lines, _) = jobs(&["-n".to_string()], &mut t).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn empty_table_prints_no_jobs() {
        let mut t = JobTable::new();
        let (lines, status) = jobs(&[], &mut t).unwrap();
        assert_eq!(status, ExitCode::SUCCESS);
        assert_eq!(lines, vec!["no jobs".to_string()]);
    }

    #[test]
    fn unknown_jobspec_propagates_not_found() {
        let mut t = JobTable::new();
        let err = jobs(&["%9".to_string()], &mut t).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::NotFound);
    }

    #[test]
    fn rendered_listing_matches_known_good_output() {
        let mut t = JobTable::new();
        t.add(100, "sleep 30", vec![100]);
        let (lines, _) = jobs(&[], &mut t).unwrap();
        insta::assert_snapshot!(lines[0], @"[1]+  Running    sleep 30");
    }
}
