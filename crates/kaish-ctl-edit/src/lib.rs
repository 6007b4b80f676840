//! Modal line editing, history search, and completion.
//!
//! This crate has no syscall surface of its own — it is pure logic over
//! in-memory buffers. The binary crate wires it to a real terminal.

pub mod buffer;
pub mod complete;
pub mod error;
pub mod fsm;
pub mod history;
pub mod killring;
pub mod motion;
pub mod undo;
pub mod wordclass;

pub use buffer::EditBuffer;
pub use complete::{
    CompletionCandidate, CompletionContext, CompletionEngine, FilterChain, QuoteState,
};
pub use error::{CompletionError, EditError};
pub use fsm::{AcceptedLine, Count, EditorFSM, Mode, Operator};
pub use history::{HistoryEntry, HistoryList, HistorySearch, SearchDirection};
pub use killring::KillRing;
pub use motion::{Inclusivity, Motion, WordKind};
pub use undo::{UndoHistory, UndoSnapshot};
