//! Upstream rate-limit pass-through
//!
//! When a downstream model backend answers 429 the gateway does not retry or
//! shed on its own; the limit belongs to the caller's quota. The response is
//! re-emitted with the envelope body, the upstream `Retry-After` preserved,
//! and the remaining-token budget surfaced in a custom header.

use crate::error::ApiError;
use crate::request_id::RequestId;
use axum::response::{IntoResponse, Response};
use http::HeaderValue;

/// Header surfacing the upstream's remaining token budget
pub const REMAINING_TOKENS_HEADER: &str = "x-ratelimit-remaining-tokens";

/// Build the client-facing 429 from upstream rate-limit signals
#[must_use]
pub fn rate_limited_response(
    request_id: RequestId,
    retry_after: Option<&HeaderValue>,
    remaining_tokens: Option<u64>,
) -> Response {
    let mut response = ApiError::too_many_requests(request_id).into_response();

    if let Some(value) = retry_after {
        response.headers_mut().insert("retry-after", value.clone());
    }
    if let Some(remaining) = remaining_tokens
        && let Ok(value) = HeaderValue::from_str(&remaining.to_string())
    {
        response.headers_mut().insert(REMAINING_TOKENS_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn preserves_retry_after_and_surfaces_remaining_tokens() {
        let retry_after = HeaderValue::from_static("30");
        let response = rate_limited_response(RequestId::new(), Some(&retry_after), Some(1200));

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("retry-after").unwrap(), "30");
        assert_eq!(
            response.headers().get(REMAINING_TOKENS_HEADER).unwrap(),
            "1200"
        );
    }

    #[test]
    fn headers_are_optional() {
        let response = rate_limited_response(RequestId::new(), None, None);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get("retry-after").is_none());
        assert!(response.headers().get(REMAINING_TOKENS_HEADER).is_none());
    }
}
