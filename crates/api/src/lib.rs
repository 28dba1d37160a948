//! Keygate API - tenant key introspection endpoint
//!
//! HTTP surface for operational verification of key rotation:
//! `GET /{tenant}/internal/apim-keys` returns both live key values and the
//! rotation metadata, authenticated by a valid subscription key for that
//! tenant (either slot). Everything else on the route answers 405, and every
//! error body carries the uniform envelope with a correlation id.

pub mod error;
pub mod handlers;
pub mod passthrough;
pub mod request_id;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use passthrough::rate_limited_response;
pub use request_id::RequestId;
pub use router::router;
pub use state::ApiState;
