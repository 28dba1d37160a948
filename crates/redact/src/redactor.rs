//! Redaction pipeline
//!
//! chunk → detect per chunk, in order → reassemble → restore structural
//! tokens. Chunk calls are sequential; output order therefore matches input
//! order by construction, and one slow chunk cannot reorder the document.

use crate::chunk::split_chunks;
use crate::detector::PiiDetector;
use crate::error::{DetectError, RedactError};
use crate::restore::restore_structural_tokens;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Default per-call input limit of the detection service, in bytes
const DEFAULT_CHUNK_LIMIT: usize = 5120;

/// Default per-chunk timeout
const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(10);

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionOptions {
    /// Maximum bytes per detector call
    #[serde(default = "default_chunk_limit")]
    pub chunk_limit: usize,

    /// Independent timeout applied to each chunk call
    #[serde(default = "default_chunk_timeout", with = "humantime_serde")]
    pub chunk_timeout: Duration,

    /// `true`: any chunk failure aborts the request.
    /// `false` (default): a failed chunk passes through unredacted.
    #[serde(default)]
    pub fail_closed: bool,

    /// Run the structural restoration pass over the reassembled output
    #[serde(default = "default_preserve_structure")]
    pub preserve_structure: bool,

    /// Tokens restored when masked at exactly matching length
    #[serde(default = "default_structural_whitelist")]
    pub structural_whitelist: Vec<String>,

    /// Mask character the detection service uses
    #[serde(default = "default_mask")]
    pub mask: char,
}

fn default_chunk_limit() -> usize {
    DEFAULT_CHUNK_LIMIT
}

fn default_chunk_timeout() -> Duration {
    DEFAULT_CHUNK_TIMEOUT
}

fn default_preserve_structure() -> bool {
    true
}

fn default_structural_whitelist() -> Vec<String> {
    vec![
        "user".to_string(),
        "system".to_string(),
        "assistant".to_string(),
    ]
}

fn default_mask() -> char {
    '*'
}

impl Default for RedactionOptions {
    fn default() -> Self {
        Self {
            chunk_limit: default_chunk_limit(),
            chunk_timeout: default_chunk_timeout(),
            fail_closed: false,
            preserve_structure: default_preserve_structure(),
            structural_whitelist: default_structural_whitelist(),
            mask: default_mask(),
        }
    }
}

/// Redacted content plus diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct RedactionOutcome {
    /// Fully reassembled, redacted content
    pub content: String,
    /// Total entities masked across all chunks
    pub entity_count: usize,
    /// Distinct entity categories, sorted
    pub entity_types: Vec<String>,
    /// Whether the output differs from the input
    pub content_changed: bool,
    /// 200 when every chunk succeeded; otherwise the last failure's status
    pub status_code: u16,
}

/// Runs the redaction pipeline against a detector
pub struct Redactor {
    detector: Arc<dyn PiiDetector>,
    options: RedactionOptions,
}

impl Redactor {
    /// New pipeline over the given detector
    pub fn new(detector: Arc<dyn PiiDetector>, options: RedactionOptions) -> Self {
        Self { detector, options }
    }

    /// Redact `content`, chunking as needed
    ///
    /// # Errors
    ///
    /// Only under fail-closed policy: the first failed chunk aborts with
    /// [`RedactError::ChunkFailed`]. Under fail-open the result is always
    /// `Ok`; failures are visible in `status_code`.
    pub async fn redact(&self, content: &str) -> Result<RedactionOutcome, RedactError> {
        let chunks = split_chunks(content, self.options.chunk_limit);
        let chunk_count = chunks.len();

        let mut redacted = String::with_capacity(content.len());
        let mut entity_count = 0;
        let mut entity_types = BTreeSet::new();
        let mut last_failure: Option<u16> = None;

        for (index, chunk) in chunks.into_iter().enumerate() {
            match self.redact_chunk(chunk).await {
                Ok(detection) => {
                    entity_count += detection.entities.len();
                    for entity in detection.entities {
                        entity_types.insert(entity.category);
                    }
                    redacted.push_str(&detection.redacted_text);
                }
                Err(source) => {
                    if self.options.fail_closed {
                        tracing::warn!(
                            chunk = index,
                            chunks = chunk_count,
                            error = %source,
                            "chunk redaction failed, rejecting request (fail-closed)"
                        );
                        return Err(RedactError::ChunkFailed { index, source });
                    }
                    tracing::warn!(
                        chunk = index,
                        chunks = chunk_count,
                        error = %source,
                        "chunk redaction failed, passing original through (fail-open)"
                    );
                    last_failure = Some(source.status_code());
                    redacted.push_str(chunk);
                }
            }
        }

        let content_final = if self.options.preserve_structure {
            restore_structural_tokens(
                &redacted,
                &self.options.structural_whitelist,
                self.options.mask,
            )
        } else {
            redacted
        };

        let outcome = RedactionOutcome {
            content_changed: content_final != content,
            entity_count,
            entity_types: entity_types.into_iter().collect(),
            status_code: last_failure.unwrap_or(200),
            content: content_final,
        };

        tracing::debug!(
            chunks = chunk_count,
            entities = outcome.entity_count,
            changed = outcome.content_changed,
            status = outcome.status_code,
            "redaction pipeline finished"
        );

        Ok(outcome)
    }

    async fn redact_chunk(&self, chunk: &str) -> Result<crate::detector::Detection, DetectError> {
        match tokio::time::timeout(self.options.chunk_timeout, self.detector.redact(chunk)).await {
            Ok(result) => result,
            Err(_) => Err(DetectError::Timeout {
                elapsed: self.options.chunk_timeout,
            }),
        }
    }
}
