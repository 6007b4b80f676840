//! Reentrant-safe signal dispatch and trap table.
//!
//! The OS-facing half (`state`) only ever runs the documented minimal
//! handler body inside the actual signal handler: set a volatile flag.
//! Everything else — reaping, trap dispatch, notification — happens
//! synchronously from `SigState::drain`, called from the main loop.

pub mod error;
pub mod names;
pub mod trap;

#[cfg(unix)]
mod state;

pub use error::{SigError, TrapError};
pub use kaish_ctl_types::SignalNum;
pub use names::{describe, list_all, name_of, parse_name};
pub use trap::{TrapCommand, TrapPolicy, TrapTable};

#[cfg(unix)]
pub use state::{DrainResult, InputReady, RawWaitStatus, ReapedChild, SigState, WaitOutcome};
