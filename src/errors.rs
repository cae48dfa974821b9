//! Error types for the trace reader and replay session.

use docwatch_dom::DomError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("trace must start with a snapshot signal")]
    MissingSnapshot,
    #[error("initial snapshot is invalid: {0}")]
    InvalidSnapshot(#[from] DomError),
}
