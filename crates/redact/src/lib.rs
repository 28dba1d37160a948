//! Keygate Redact - bounded-chunk PII redaction
//!
//! Model-bound request bodies can be arbitrarily large, but the PII
//! detection service enforces a per-call input limit. This crate splits
//! oversized content into bounded chunks at safe boundaries, redacts each
//! chunk in order, reassembles the output, and restores structural tokens
//! (chat role markers) the detector tends to over-mask.
//!
//! Failure policy is configurable: fail-open forwards the original content
//! when the detector misbehaves (default), fail-closed rejects the request
//! on the first failed chunk.

pub mod chunk;
pub mod detector;
pub mod error;
pub mod redactor;
pub mod restore;

pub use chunk::split_chunks;
pub use detector::{
    Detection, DetectedEntity, LanguageDetectorConfig, LanguagePiiDetector, PiiDetector,
};
pub use error::{DetectError, RedactError};
pub use redactor::{RedactionOptions, RedactionOutcome, Redactor};
pub use restore::restore_structural_tokens;
