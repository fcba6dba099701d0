//! Structured error types for questlog
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Detectors never produce errors; these cover the edges of the pipeline.

use super::types::Address;
use thiserror::Error;

/// Failures of the memory-read transport
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to reach host at {0}")]
    ConnectFailed(String),

    #[error("No response for read at {address} after {waited_ms}ms")]
    Timeout { address: Address, waited_ms: u64 },

    #[error("Host rejected read at {address}: {reason}")]
    ReadRejected { address: Address, reason: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<SourceError> },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {error}")]
    ReadFailed { path: String, error: std::io::Error },

    #[error("Invalid catalog: {0}")]
    Invalid(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// The terminal condition was observed but the session could not be closed out
#[derive(Error, Debug)]
pub enum FinalizeError {
    #[error("Session is not finished")]
    NotFinished,

    #[error("Final read failed: {0}")]
    FinalReadFailed(#[from] SourceError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write report: {0}")]
    WriteFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Invalid recording line {line}: {error}")]
    InvalidLine { line: usize, error: serde_json::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = SourceError::Timeout { address: Address(0x7E_0100), waited_ms: 250 };
        assert_eq!(err.to_string(), "No response for read at 0x7e0100 after 250ms");
    }

    #[test]
    fn test_retries_exhausted_keeps_cause() {
        let err = SourceError::RetriesExhausted {
            attempts: 3,
            last: Box::new(SourceError::ConnectFailed("127.0.0.1:55355".to_string())),
        };
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("127.0.0.1:55355"));
    }

    #[test]
    fn test_finalize_wraps_source_error() {
        let err: FinalizeError = SourceError::MalformedResponse("empty".to_string()).into();
        assert!(err.to_string().starts_with("Final read failed"));
    }
}
