//! Error types for the introspection API
//!
//! Every 4xx/5xx response renders the uniform envelope:
//! `{"error": {"code": "<status>", "message": "<text>", "requestId": "<id>"}}`

use crate::request_id::RequestId;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keygate_credential::core::{GatewayError, StoreError};
use serde_json::json;

/// API error carrying the status, client-facing message, and correlation id
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    request_id: RequestId,
}

impl ApiError {
    /// Missing or invalid subscription key
    #[must_use]
    pub fn unauthorized(request_id: RequestId) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "A valid subscription key for the tenant is required".to_string(),
            request_id,
        }
    }

    /// Verb other than GET on the introspection route
    #[must_use]
    pub fn method_not_allowed(request_id: RequestId) -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            message: "Only GET is supported on this endpoint".to_string(),
            request_id,
        }
    }

    /// Upstream rate limit, propagated rather than recovered
    #[must_use]
    pub fn too_many_requests(request_id: RequestId) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "Upstream rate limit exceeded".to_string(),
            request_id,
        }
    }

    /// Unexpected server-side failure; detail goes to the log, not the client
    pub fn internal(request_id: RequestId, detail: impl std::fmt::Display) -> Self {
        tracing::error!(request_id = %request_id, error = %detail, "internal error");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An unexpected error occurred".to_string(),
            request_id,
        }
    }

    /// Map a gateway failure on the auth/introspection path
    ///
    /// Unknown tenants are indistinguishable from bad keys so tenant slugs
    /// cannot be probed without a valid credential.
    #[must_use]
    pub fn from_gateway(request_id: RequestId, err: GatewayError) -> Self {
        match err {
            GatewayError::UnknownTenant { .. } => Self::unauthorized(request_id),
            other => Self::internal(request_id, other),
        }
    }

    /// Map a store failure while assembling the response
    #[must_use]
    pub fn from_store(request_id: RequestId, err: StoreError) -> Self {
        Self::internal(request_id, err)
    }

    /// Status this error renders with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.status.as_u16().to_string(),
                "message": self.message,
                "requestId": self.request_id.to_string(),
            }
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_envelope_shape() {
        let rid = RequestId::new();
        let err = ApiError::unauthorized(rid);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unknown_tenant_maps_to_unauthorized() {
        let err = ApiError::from_gateway(
            RequestId::new(),
            GatewayError::UnknownTenant {
                tenant: "ghost".into(),
            },
        );
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn gateway_transport_maps_to_internal() {
        let err = ApiError::from_gateway(RequestId::new(), GatewayError::Rejected { status: 502 });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
