//! Gateway management API provider
//!
//! Drives the hosted gateway's subscription surface: regenerate one key
//! slot, then read both values back via the listSecrets call. Subscription
//! ids follow the tenant slug, one subscription per tenant product.

use crate::core::{GatewayError, SecretString, Slot, TenantId};
use crate::traits::{GatewayCredentials, SubscriptionKeys};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for the management API provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApimGatewayConfig {
    /// Management endpoint base, e.g.
    /// `https://management.example.com/gateways/aihub`
    pub endpoint: String,

    /// Bearer token for the management plane
    pub token: SecretString,

    /// REST API version query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_api_version() -> String {
    "2024-05-01".to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl ApimGatewayConfig {
    /// New configuration with defaults for version and timeout
    pub fn new(endpoint: impl Into<String>, token: SecretString) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            api_version: default_api_version(),
            timeout: default_timeout(),
        }
    }
}

/// Wire shape of the listSecrets response
#[derive(Debug, Deserialize)]
struct SubscriptionSecrets {
    #[serde(rename = "primaryKey")]
    primary_key: String,
    #[serde(rename = "secondaryKey")]
    secondary_key: String,
}

/// Gateway credential provider backed by the management REST API
#[derive(Debug, Clone)]
pub struct ApimGateway {
    client: reqwest::Client,
    config: ApimGatewayConfig,
    base: String,
}

impl ApimGateway {
    /// Build a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Malformed`] for an unusable endpoint and
    /// [`GatewayError::Transport`] when the HTTP client cannot be built.
    pub fn new(config: ApimGatewayConfig) -> Result<Self, GatewayError> {
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(GatewayError::Malformed {
                reason: "endpoint must start with http:// or https://".to_string(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| GatewayError::Transport { source })?;
        let base = config.endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            config,
            base,
        })
    }

    fn subscription_url(&self, tenant: &TenantId, action: &str) -> String {
        format!(
            "{}/subscriptions/{}/{}?api-version={}",
            self.base, tenant, action, self.config.api_version
        )
    }

    fn classify(&self, source: reqwest::Error) -> GatewayError {
        if source.is_timeout() {
            GatewayError::Timeout {
                duration: self.config.timeout,
            }
        } else {
            GatewayError::Transport { source }
        }
    }

    async fn post(&self, url: String) -> Result<reqwest::Response, GatewayError> {
        self.config
            .token
            .expose_secret(|token| self.client.post(url).bearer_auth(token).send())
            .await
            .map_err(|e| self.classify(e))
    }

    async fn list_secrets(&self, tenant: &TenantId) -> Result<SubscriptionSecrets, GatewayError> {
        let response = self
            .post(self.subscription_url(tenant, "listSecrets"))
            .await?;
        match response.status().as_u16() {
            200 => response
                .json::<SubscriptionSecrets>()
                .await
                .map_err(|e| GatewayError::Malformed {
                    reason: e.to_string(),
                }),
            404 => Err(GatewayError::UnknownTenant {
                tenant: tenant.to_string(),
            }),
            status => Err(GatewayError::Rejected { status }),
        }
    }
}

#[async_trait]
impl GatewayCredentials for ApimGateway {
    async fn regenerate(
        &self,
        tenant: &TenantId,
        slot: Slot,
    ) -> Result<SecretString, GatewayError> {
        let action = match slot {
            Slot::Primary => "regeneratePrimaryKey",
            Slot::Secondary => "regenerateSecondaryKey",
        };
        let response = self.post(self.subscription_url(tenant, action)).await?;
        match response.status().as_u16() {
            200 | 202 | 204 => {}
            404 => {
                return Err(GatewayError::UnknownTenant {
                    tenant: tenant.to_string(),
                });
            }
            status => return Err(GatewayError::Rejected { status }),
        }

        // The regenerate action does not return the new value; read it back.
        let secrets = self.list_secrets(tenant).await?;
        let value = match slot {
            Slot::Primary => secrets.primary_key,
            Slot::Secondary => secrets.secondary_key,
        };
        Ok(SecretString::new(value))
    }

    async fn keys(&self, tenant: &TenantId) -> Result<SubscriptionKeys, GatewayError> {
        let secrets = self.list_secrets(tenant).await?;
        Ok(SubscriptionKeys {
            primary: SecretString::new(secrets.primary_key),
            secondary: SecretString::new(secrets.secondary_key),
        })
    }
}
