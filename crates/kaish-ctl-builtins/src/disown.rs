//! `disown [-arh] [jobspec…]` builtin.

use kaish_ctl_job::{resolve_jobspec, JobStatus, JobTable};
use kaish_ctl_types::{ExitCode, JobId};

use crate::error::{job_error, BuiltinError};

const NAME: &str = "disown";

/// Detaches jobs from the table (`-a`), or marks them "no-hup" instead
/// of removing them (`-h`); `-r` restricts the target set to running
/// jobs.
pub fn disown(args: &[String], table: &mut JobTable) -> Result<(Vec<String>, i32), BuiltinError> {
    let mut all = false;
    let mut running_only = false;
    let mut mark_no_hup = false;
    let mut specs = Vec::new();

    for a in args {
        match a.as_str() {
            "-a" => all = true,
            "-r" => running_only = true,
            "-h" => mark_no_hup = true,
            s if s.starts_with('-') && s.len() > 1 => {
                for c in s.chars().skip(1) {
                    match c {
                        'a' => all = true,
                        'r' => running_only = true,
                        'h' => mark_no_hup = true,
                        other => {
                            return Err(BuiltinError::usage(NAME, format!("invalid option: -{other}")))
                        }
                    }
                }
            }
            spec => specs.push(spec),
        }
    }

    let targets: Vec<JobId> = if all || specs.is_empty() {
        table.iter().map(|j| j.id()).collect()
    } else {
        let mut ids = Vec::with_capacity(specs.len());
        for s in &specs {
            ids.push(resolve_jobspec(table, s).map_err(|e| job_error(NAME, e))?);
        }
        ids
    };

    for id in targets {
        let Some(job) = table.get(id) else { continue };
        if running_only && job.status() != JobStatus::Running {
            continue;
        }
        if mark_no_hup {
            if let Some(job) = table.get_mut(id) {
                job.set_no_hup(true);
            }
        } else {
            table.remove(id);
        }
    }

    Ok((Vec::new(), ExitCode::SUCCESS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_a_removes_every_job() {
        let mut t = JobTable::new();
        t.add(100, "sleep 30", vec![100]);
        t.add(200, "vim", vec![200]);
        disown(&["-a".to_string()], &mut t).unwrap();
        assert_eq!(t.iter().count(), 0);
    }

    #[test]
    fn dash_h_marks_no_hup_without_removing() {
        let mut t = JobTable::new();
        let id = t.add(100, "sleep 30", vec![100]);
        disown(&["-h".to_string()], &mut t).unwrap();
        assert_eq!(t.iter().count(), 1);
        assert!(t.get(id).unwrap().no_hup());
    }

    #[test]
    fn unknown_jobspec_propagates_not_found() {
        let mut t = JobTable::new();
        let err = disown(&["%9".to_string()], &mut t).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::NotFound);
    }
}
