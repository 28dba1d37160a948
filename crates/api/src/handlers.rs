//! Request handlers

use crate::error::ApiError;
use crate::request_id::RequestId;
use crate::state::ApiState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use keygate_credential::core::{Slot, TenantId};
use keygate_credential::rotation::RotationMetadata;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Header carrying the subscription key
const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";
/// Query parameter alternative for clients that cannot set headers
const SUBSCRIPTION_KEY_PARAM: &str = "subscription-key";

/// 200 body of the introspection endpoint
///
/// Key values are returned in the clear on purpose: the endpoint exists so
/// operators and clients holding a soon-to-be-stale key can fetch the fresh
/// value without direct store access. It is only reachable with a currently
/// valid key for the same tenant.
#[derive(Debug, Serialize)]
pub struct TenantKeysResponse {
    /// Echo of the path tenant
    pub tenant: String,
    /// Live primary slot value
    pub primary_key: String,
    /// Live secondary slot value
    pub secondary_key: String,
    /// Rotation metadata mirror, sentinel timestamp forms included
    pub rotation: RotationMetadata,
    /// Where the persisted copies live
    pub keyvault: KeyVaultInfo,
}

/// Store location block of the introspection response
#[derive(Debug, Serialize)]
pub struct KeyVaultInfo {
    /// Store base address
    pub uri: String,
    /// Secret name of the primary key value
    pub primary_key_secret: String,
    /// Secret name of the secondary key value
    pub secondary_key_secret: String,
}

fn presented_key(headers: &HeaderMap, params: &HashMap<String, String>) -> Option<String> {
    if let Some(value) = headers.get(SUBSCRIPTION_KEY_HEADER) {
        return value.to_str().ok().map(str::to_owned);
    }
    params.get(SUBSCRIPTION_KEY_PARAM).cloned()
}

/// `GET /{tenant}/internal/apim-keys`
pub async fn tenant_keys(
    State(state): State<ApiState>,
    request_id: RequestId,
    Path(tenant): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<TenantKeysResponse>, ApiError> {
    // An invalid slug cannot name a tenant; answer exactly like a bad key.
    let tenant =
        TenantId::new(tenant.as_str()).map_err(|_| ApiError::unauthorized(request_id))?;

    let presented =
        presented_key(&headers, &params).ok_or_else(|| ApiError::unauthorized(request_id))?;

    let keys = state
        .gateway
        .keys(&tenant)
        .await
        .map_err(|e| ApiError::from_gateway(request_id, e))?;

    let Some(matched) = keys.matches(&presented) else {
        tracing::debug!(request_id = %request_id, tenant = %tenant, "invalid subscription key");
        return Err(ApiError::unauthorized(request_id));
    };

    let rotation = load_metadata(&state, request_id, &tenant).await?;

    tracing::debug!(
        request_id = %request_id,
        tenant = %tenant,
        matched_slot = %matched,
        rotation_number = rotation.rotation_number,
        "tenant keys introspected"
    );

    Ok(Json(TenantKeysResponse {
        tenant: tenant.to_string(),
        primary_key: keys.primary.expose_secret(str::to_owned),
        secondary_key: keys.secondary.expose_secret(str::to_owned),
        keyvault: KeyVaultInfo {
            uri: state.store.uri().to_string(),
            primary_key_secret: tenant.key_secret_name(Slot::Primary),
            secondary_key_secret: tenant.key_secret_name(Slot::Secondary),
        },
        rotation,
    }))
}

async fn load_metadata(
    state: &ApiState,
    request_id: RequestId,
    tenant: &TenantId,
) -> Result<RotationMetadata, ApiError> {
    let raw = state
        .store
        .get_secret(&tenant.metadata_secret_name())
        .await
        .map_err(|e| ApiError::from_store(request_id, e))?;
    match raw {
        Some(secret) => secret.expose_secret(|json| {
            serde_json::from_str(json).map_err(|e| ApiError::internal(request_id, e))
        }),
        // Tenant onboarded but never rotated: report the initial record.
        None => Ok(RotationMetadata::initial()),
    }
}

/// `GET /healthz`
pub async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Fallback for known routes hit with the wrong verb
pub async fn method_not_allowed(request_id: RequestId) -> ApiError {
    ApiError::method_not_allowed(request_id)
}
