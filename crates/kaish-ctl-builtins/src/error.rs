//! Shared builtin error type.
//!
//! Every builtin reports failures through this single type so the
//! `name: context: message` rendering rule is enforced once rather than
//! re-implemented per builtin.

use std::fmt;

use kaish_ctl_types::ExitCode;

/// The error-kind taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinErrorKind {
    Usage,
    NotFound,
    Ambiguous,
    System,
    Busy,
    Forbidden,
}

/// `name: context: message`, with `context` optional.
#[derive(Debug)]
pub struct BuiltinError {
    pub name: &'static str,
    pub kind: BuiltinErrorKind,
    pub context: Option<String>,
    pub message: String,
}

impl BuiltinError {
    pub fn new(name: &'static str, kind: BuiltinErrorKind, message: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            context: None,
            message: message.into(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn usage(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, BuiltinErrorKind::Usage, message)
    }

    pub fn not_found(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, BuiltinErrorKind::NotFound, message)
    }

    pub fn ambiguous(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, BuiltinErrorKind::Ambiguous, message)
    }

    pub fn system(name: &'static str, context: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, BuiltinErrorKind::System, message).with_context(context)
    }

    pub fn busy(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, BuiltinErrorKind::Busy, message)
    }

    pub fn forbidden(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, BuiltinErrorKind::Forbidden, message)
    }

    /// The exit status a builtin should return for this error, per the
    /// exit-code taxonomy. Callers with a more specific
    /// code (e.g. `exec`'s 126/127 split) compute their own instead of
    /// calling this.
    pub fn exit_code(&self) -> i32 {
        match self.kind {
            BuiltinErrorKind::Usage => ExitCode::USAGE,
            _ => ExitCode::FAILURE,
        }
    }
}

impl fmt::Display for BuiltinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{}: {}: {}", self.name, ctx, self.message),
            None => write!(f, "{}: {}", self.name, self.message),
        }
    }
}

impl std::error::Error for BuiltinError {}

/// Converts a [`kaish_ctl_job::JobError`] into a `BuiltinError` carrying
/// the calling builtin's name.
pub fn job_error(name: &'static str, e: kaish_ctl_job::JobError) -> BuiltinError {
    use kaish_ctl_job::JobError;
    match e {
        JobError::NotFound => BuiltinError::not_found(name, "no such job"),
        JobError::Ambiguous => BuiltinError::ambiguous(name, "ambiguous job specification"),
        JobError::InvalidSyntax => BuiltinError::usage(name, "invalid jobspec syntax"),
        JobError::NotStopped(id) => BuiltinError::new(
            name,
            BuiltinErrorKind::Usage,
            format!("job {id} is not stopped"),
        ),
        JobError::AlreadyRunning(id) => BuiltinError::new(
            name,
            BuiltinErrorKind::Usage,
            format!("job {id} is already running"),
        ),
        JobError::System { context, message } => BuiltinError::system(name, context, message),
    }
}
