//! Redaction error types

use std::time::Duration;
use thiserror::Error;

/// Failures talking to the PII detection service
#[derive(Debug, Error)]
pub enum DetectError {
    /// Detector answered with a non-success status
    #[error("Detector returned status {status}")]
    Http {
        /// HTTP status from the detector
        status: u16,
    },

    /// Transport-level failure reaching the detector
    #[error("Detector transport failure: {source}")]
    Transport {
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// Per-chunk timeout elapsed
    #[error("Detector call timed out after {elapsed:?}")]
    Timeout {
        /// Configured chunk timeout
        elapsed: Duration,
    },

    /// Detector response could not be decoded
    #[error("Malformed detector response: {reason}")]
    Malformed {
        /// Why decoding failed
        reason: String,
    },
}

impl DetectError {
    /// Status code reported in the redaction diagnostics
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            DetectError::Http { status } => *status,
            DetectError::Timeout { .. } => 408,
            DetectError::Transport { .. } | DetectError::Malformed { .. } => 502,
        }
    }
}

/// Failures of the redaction pipeline itself
#[derive(Debug, Error)]
pub enum RedactError {
    /// A chunk failed and the policy is fail-closed
    #[error("Redaction of chunk {index} failed: {source}")]
    ChunkFailed {
        /// Zero-based index of the failed chunk
        index: usize,
        /// Underlying detector error
        #[source]
        source: DetectError,
    },
}
