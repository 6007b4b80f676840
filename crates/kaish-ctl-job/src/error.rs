use thiserror::Error;

use kaish_ctl_types::JobId;

/// Errors surfaced by `JobTable` and the `fg`/`bg` builtins.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("no such job")]
    NotFound,
    #[error("ambiguous job specification")]
    Ambiguous,
    #[error("invalid jobspec syntax")]
    InvalidSyntax,
    #[error("job {0} is not stopped")]
    NotStopped(JobId),
    #[error("job {0} is already running")]
    AlreadyRunning(JobId),
    #[error("{context}: {message}")]
    System { context: &'static str, message: String },
}

impl JobError {
    pub fn system(context: &'static str, message: impl Into<String>) -> Self {
        JobError::System {
            context,
            message: message.into(),
        }
    }
}

impl From<kaish_ctl_types::JobspecError> for JobError {
    fn from(e: kaish_ctl_types::JobspecError) -> Self {
        match e {
            kaish_ctl_types::JobspecError::InvalidSyntax => JobError::InvalidSyntax,
            kaish_ctl_types::JobspecError::NotFound => JobError::NotFound,
            kaish_ctl_types::JobspecError::Ambiguous => JobError::Ambiguous,
        }
    }
}
