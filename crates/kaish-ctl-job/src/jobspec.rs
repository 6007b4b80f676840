//! Resolves a parsed [`kaish_ctl_types::Jobspec`] against a live
//! [`JobTable`].

use kaish_ctl_types::{Jobspec, JobId};

use crate::error::JobError;
use crate::table::JobTable;

/// Parses and resolves a jobspec string in one step.
pub fn resolve(table: &JobTable, s: &str) -> Result<JobId, JobError> {
    let spec = kaish_ctl_types::parse_jobspec(s)?;
    resolve_parsed(table, &spec)
}

pub fn resolve_parsed(table: &JobTable, spec: &Jobspec) -> Result<JobId, JobError> {
    match spec {
        Jobspec::Current => table.current().ok_or(JobError::NotFound),
        Jobspec::Previous => table.previous().ok_or(JobError::NotFound),
        Jobspec::Index(n) => {
            let id = JobId::new(*n);
            if table.get(id).is_some() {
                Ok(id)
            } else {
                Err(JobError::NotFound)
            }
        }
        Jobspec::NamePrefix(prefix) => table.find_by_name_prefix(prefix),
        Jobspec::Pid(pid) => table.get_by_pid(*pid).ok_or(JobError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_equals_current_when_both_defined() {
        let mut t = JobTable::new();
        t.add(100, "a", vec![100]);
        let current = t.current().unwrap();
        assert_eq!(resolve(&t, "%+"), Ok(current));
        assert_eq!(resolve(&t, "%%"), Ok(current));
    }

    #[test]
    fn parsing_twice_is_idempotent_absent_table_changes() {
        let mut t = JobTable::new();
        t.add(100, "sleep 30", vec![100]);
        assert_eq!(resolve(&t, "%1"), resolve(&t, "%1"));
        assert_eq!(resolve(&t, "%sleep"), resolve(&t, "%sleep"));
    }

    #[test]
    fn bare_pid_resolves_via_get_by_pid() {
        let mut t = JobTable::new();
        let id = t.add(4242, "sleep 30", vec![4242]);
        assert_eq!(resolve(&t, "4242"), Ok(id));
    }

    #[test]
    fn unknown_index_not_found() {
        let t = JobTable::new();
        assert_eq!(resolve(&t, "%3"), Err(JobError::NotFound));
    }
}
