//! Key Vault-dialect HTTP secret store
//!
//! Speaks the vault REST surface the landing zone exposes: one GET/PUT pair
//! per named secret, bearer-token auth, versioning handled server-side.
//! Timeouts are treated as retryable; the rotation coordinator's retry
//! semantics depend on that classification.

use crate::core::{SecretString, StoreError};
use crate::traits::SecretStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default request timeout; secret operations are seconds-scale at worst
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the vault-backed secret store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultStoreConfig {
    /// Vault base address, e.g. `https://aihub-kv.vault.azure.net`
    pub vault_uri: String,

    /// Bearer token presented on every request
    pub token: SecretString,

    /// REST API version query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_api_version() -> String {
    "7.4".to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl VaultStoreConfig {
    /// New configuration with defaults for version and timeout
    pub fn new(vault_uri: impl Into<String>, token: SecretString) -> Self {
        Self {
            vault_uri: vault_uri.into(),
            token,
            api_version: default_api_version(),
            timeout: default_timeout(),
        }
    }

    /// Validate the configuration before building a client
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the address or timeout is
    /// unusable.
    pub fn validate(&self) -> Result<(), String> {
        if self.vault_uri.is_empty() {
            return Err("vault_uri must not be empty".to_string());
        }
        if !self.vault_uri.starts_with("http://") && !self.vault_uri.starts_with("https://") {
            return Err("vault_uri must start with http:// or https://".to_string());
        }
        let secs = self.timeout.as_secs();
        if !(1..=60).contains(&secs) {
            return Err(format!(
                "timeout must be between 1 and 60 seconds, got {secs} seconds"
            ));
        }
        Ok(())
    }
}

/// Wire shape of a secret resource
#[derive(Debug, Serialize, Deserialize)]
struct SecretBundle {
    value: String,
}

/// Secret store backed by the vault REST dialect
#[derive(Debug, Clone)]
pub struct VaultSecretStore {
    client: reqwest::Client,
    config: VaultStoreConfig,
    base: String,
}

impl VaultSecretStore {
    /// Build a store from validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] when the configuration is invalid
    /// or the HTTP client cannot be constructed.
    pub fn new(config: VaultStoreConfig) -> Result<Self, StoreError> {
        config.validate().map_err(|reason| StoreError::Malformed {
            name: config.vault_uri.clone(),
            reason,
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| StoreError::Transport { source })?;
        let base = config.vault_uri.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            config,
            base,
        })
    }

    fn secret_url(&self, name: &str) -> String {
        format!(
            "{}/secrets/{}?api-version={}",
            self.base, name, self.config.api_version
        )
    }

    fn classify(&self, source: reqwest::Error) -> StoreError {
        if source.is_timeout() {
            StoreError::Timeout {
                duration: self.config.timeout,
            }
        } else {
            StoreError::Transport { source }
        }
    }
}

#[async_trait]
impl SecretStore for VaultSecretStore {
    async fn get_secret(&self, name: &str) -> Result<Option<SecretString>, StoreError> {
        let response = self
            .config
            .token
            .expose_secret(|token| {
                self.client
                    .get(self.secret_url(name))
                    .bearer_auth(token)
                    .send()
            })
            .await
            .map_err(|e| self.classify(e))?;

        match response.status().as_u16() {
            200 => {
                let bundle: SecretBundle =
                    response.json().await.map_err(|e| StoreError::Malformed {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Some(SecretString::new(bundle.value)))
            }
            404 => Ok(None),
            status => Err(StoreError::Rejected {
                name: name.to_string(),
                status,
            }),
        }
    }

    async fn put_secret(&self, name: &str, value: &SecretString) -> Result<(), StoreError> {
        let body = value.expose_secret(|v| SecretBundle {
            value: v.to_string(),
        });
        let response = self
            .config
            .token
            .expose_secret(|token| {
                self.client
                    .put(self.secret_url(name))
                    .bearer_auth(token)
                    .json(&body)
                    .send()
            })
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(StoreError::Rejected {
                name: name.to_string(),
                status,
            })
        }
    }

    async fn delete_secret(&self, name: &str) -> Result<(), StoreError> {
        let response = self
            .config
            .token
            .expose_secret(|token| {
                self.client
                    .delete(self.secret_url(name))
                    .bearer_auth(token)
                    .send()
            })
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) || status == 404 {
            Ok(())
        } else {
            Err(StoreError::Rejected {
                name: name.to_string(),
                status,
            })
        }
    }

    fn uri(&self) -> &str {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(uri: &str) -> VaultStoreConfig {
        VaultStoreConfig::new(uri, SecretString::new("token"))
    }

    #[test]
    fn config_validation() {
        assert!(config("https://kv.example.net").validate().is_ok());
        assert!(config("").validate().is_err());
        assert!(config("ftp://kv.example.net").validate().is_err());

        let mut zero_timeout = config("https://kv.example.net");
        zero_timeout.timeout = Duration::ZERO;
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn secret_url_shape() {
        let store = VaultSecretStore::new(config("https://kv.example.net/")).unwrap();
        assert_eq!(
            store.secret_url("acme-apim-primary-key"),
            "https://kv.example.net/secrets/acme-apim-primary-key?api-version=7.4"
        );
        assert_eq!(store.uri(), "https://kv.example.net");
    }
}
