//! Error types for engine adapters

use thiserror::Error;

/// Engine-level errors
#[derive(Debug, Error)]
pub enum GraphError {
    /// Resume or update requested for a thread with no checkpoint
    #[error("no checkpoint found for thread {0}")]
    NoCheckpoint(String),

    /// Input rejected by the engine
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Adapter misconfiguration
    #[error("configuration error: {0}")]
    Config(String),

    /// Network or connection failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Engine answered with a non-success status
    #[error("engine returned {status}: {body}")]
    Engine { status: u16, body: String },

    /// Engine answered with a body we could not decode
    #[error("invalid engine response: {0}")]
    Decode(String),
}

/// Result type alias for engine operations
pub type GraphResult<T> = Result<T, GraphError>;
