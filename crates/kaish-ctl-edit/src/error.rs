//! Error types for the line-editing engine.

use thiserror::Error;

/// Errors surfaced by the editor FSM's externally-facing operations.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("no kill-ring entry to put")]
    KillRingEmpty,

    #[error("vi-edit-and-accept: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the completion pipeline.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no candidates matched `{word}`")]
    NoMatches { word: String },

    #[error("completion directory {path} could not be read: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
