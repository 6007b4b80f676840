use thiserror::Error;

/// A parsed-but-unresolved jobspec grammar:
/// `%`, `%+`/`%%`, `%-`, `%N`, `%name…`, or a bare pid.
///
/// Parsing a jobspec string is pure syntax (this module); resolving it
/// against a live job table (picking the current/previous job, matching a
/// name prefix, looking up a pid) is `kaish-ctl-job`'s job, since only the
/// job table knows which jobs exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Jobspec {
    /// `%` alone, `%+`, or `%%` — the current job.
    Current,
    /// `%-` — the previous job.
    Previous,
    /// `%N` — job by 1-based index.
    Index(u32),
    /// `%name…` — prefix match against job names.
    NamePrefix(String),
    /// Bare digits — a pid, resolved via `get_by_pid`.
    Pid(i32),
}

/// Errors from parsing or resolving a jobspec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JobspecError {
    #[error("invalid jobspec syntax")]
    InvalidSyntax,
    #[error("no such job")]
    NotFound,
    #[error("ambiguous job specification")]
    Ambiguous,
}

/// Parses the syntax of a jobspec string without resolving it against any
/// job table. See `kaish-ctl-job::jobspec::resolve` for resolution.
pub fn parse(s: &str) -> Result<Jobspec, JobspecError> {
    if let Some(rest) = s.strip_prefix('%') {
        return match rest {
            "" | "+" | "%" => Ok(Jobspec::Current),
            "-" => Ok(Jobspec::Previous),
            _ if rest.chars().all(|c| c.is_ascii_digit()) => rest
                .parse::<u32>()
                .map(Jobspec::Index)
                .map_err(|_| JobspecError::InvalidSyntax),
            _ if !rest.is_empty() => Ok(Jobspec::NamePrefix(rest.to_string())),
            _ => Err(JobspecError::InvalidSyntax),
        };
    }

    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        return s
            .parse::<i32>()
            .map(Jobspec::Pid)
            .map_err(|_| JobspecError::InvalidSyntax);
    }

    Err(JobspecError::InvalidSyntax)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_percent_is_current() {
        assert_eq!(parse("%"), Ok(Jobspec::Current));
        assert_eq!(parse("%+"), Ok(Jobspec::Current));
        assert_eq!(parse("%%"), Ok(Jobspec::Current));
    }

    #[test]
    fn dash_is_previous() {
        assert_eq!(parse("%-"), Ok(Jobspec::Previous));
    }

    #[test]
    fn digits_after_percent_are_index() {
        assert_eq!(parse("%3"), Ok(Jobspec::Index(3)));
    }

    #[test]
    fn name_prefix() {
        assert_eq!(parse("%vi"), Ok(Jobspec::NamePrefix("vi".into())));
    }

    #[test]
    fn bare_digits_are_pid() {
        assert_eq!(parse("1234"), Ok(Jobspec::Pid(1234)));
    }

    #[test]
    fn empty_string_is_invalid() {
        assert_eq!(parse(""), Err(JobspecError::InvalidSyntax));
    }

    #[test]
    fn parsing_is_idempotent() {
        for s in ["%", "%+", "%-", "%3", "%vi", "1234", ""] {
            assert_eq!(parse(s), parse(s));
        }
    }
}
