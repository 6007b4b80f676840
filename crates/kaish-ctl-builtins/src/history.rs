//! `history [-c] [n]` builtin.

use kaish_ctl_edit::history::HistoryList;
use kaish_ctl_types::ExitCode;

use crate::error::BuiltinError;

const NAME: &str = "history";

/// `history` prints the whole list (most recent last); `history n`
/// prints only the last `n` entries; `history -c` clears the list.
pub fn history(args: &[String], list: &mut HistoryList) -> Result<(Vec<String>, i32), BuiltinError> {
    if args.first().map(String::as_str) == Some("-c") {
        list.clear();
        return Ok((Vec::new(), ExitCode::SUCCESS));
    }

    let count = match args.first() {
        None => list.len(),
        Some(n) => n
            .parse::<usize>()
            .map_err(|_| BuiltinError::usage(NAME, format!("{n}: numeric argument required")))?,
    };

    let lines = list
        .last_n(count)
        .into_iter()
        .map(|entry| format!("{:5}  {}", entry.seq, entry.text))
        .collect();

    Ok((lines, ExitCode::SUCCESS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_entries_with_sequence_numbers() {
        let mut list = HistoryList::new(100);
        list.push("echo one");
        list.push("echo two");
        let (lines, code) = history(&[], &mut list).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("echo two"));
    }

    #[test]
    fn dash_c_clears_the_list() {
        let mut list = HistoryList::new(100);
        list.push("echo one");
        history(&["-c".to_string()], &mut list).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn non_numeric_argument_is_usage_error() {
        let mut list = HistoryList::new(100);
        let err = history(&["abc".to_string()], &mut list).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Usage);
    }
}
