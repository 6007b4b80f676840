use thiserror::Error;

use crate::SignalNum;

/// Errors from `TrapTable::set_trap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrapError {
    #[error("SIG{0}: cannot be trapped")]
    Forbidden(SignalNum),
    #[error("the signal has been ignored since shell startup")]
    InitiallyIgnored,
    #[error("no trap is set for signal {0}")]
    NotSet(SignalNum),
}

/// System-level errors surfaced from the OS signal/process interface,
/// carrying the platform errno text.
#[derive(Debug, Error)]
pub enum SigError {
    #[error("{context}: {source}")]
    System {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl SigError {
    pub fn system(context: &'static str, source: std::io::Error) -> Self {
        SigError::System { context, source }
    }
}
