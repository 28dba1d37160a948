//! Layered configuration: defaults → `keygate.toml` → `KEYGATE_*` env

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use keygate_credential::core::TenantConfig;
use keygate_credential::providers::{ApimGatewayConfig, VaultStoreConfig};
use keygate_credential::rotation::RotationConfig;
use keygate_credential::TenantId;
use keygate_redact::{LanguageDetectorConfig, RedactionOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;

/// Secret store backend selection
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local store; state dies with the process
    #[default]
    Memory,
    /// Key Vault-dialect HTTP store
    Vault(VaultStoreConfig),
}

/// Gateway credential provider selection
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayBackend {
    /// Process-local gateway; subscriptions are seeded from the tenant table
    #[default]
    Memory,
    /// Management REST API of the hosted gateway
    Apim(ApimGatewayConfig),
}

/// Full service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeygateConfig {
    /// Listen address for `keygate serve`
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Rotation coordinator settings
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Secret store backend
    #[serde(default)]
    pub store: StoreBackend,

    /// Gateway backend
    #[serde(default)]
    pub gateway: GatewayBackend,

    /// Tenant table: slug → gateway settings
    #[serde(default)]
    pub tenants: BTreeMap<TenantId, TenantConfig>,

    /// Redaction pipeline settings for `keygate redact`
    #[serde(default)]
    pub redaction: RedactionOptions,

    /// PII detection service; required only by `keygate redact`
    #[serde(default)]
    pub detector: Option<LanguageDetectorConfig>,
}

fn default_bind() -> SocketAddr {
    ([127, 0, 0, 1], 8080).into()
}

impl Default for KeygateConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            rotation: RotationConfig::default(),
            store: StoreBackend::default(),
            gateway: GatewayBackend::default(),
            tenants: BTreeMap::new(),
            redaction: RedactionOptions::default(),
            detector: None,
        }
    }
}

impl KeygateConfig {
    /// Load configuration, layering an optional file and the environment
    /// over built-in defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(KeygateConfig::default()));
        figment = match path {
            Some(explicit) => figment.merge(Toml::file_exact(explicit)),
            None => figment.merge(Toml::file("keygate.toml")),
        };
        figment
            .merge(Env::prefixed("KEYGATE_").split("__"))
            .extract()
            .context("invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_are_memory_backends() {
        let config = KeygateConfig::default();
        assert!(matches!(config.store, StoreBackend::Memory));
        assert!(matches!(config.gateway, GatewayBackend::Memory));
        assert!(config.tenants.is_empty());
        assert_eq!(config.bind, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
bind = "0.0.0.0:9090"

[rotation]
enabled = true
interval = "12h"

[store]
kind = "vault"
vault_uri = "https://kv.example.net"
token = "vault-token"

[tenants.acme]
auth_mode = "subscription_key"
rotation_enabled = true

[tenants.legacy]
auth_mode = "jwt"
"#
        )
        .unwrap();

        let config = KeygateConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.bind, "0.0.0.0:9090".parse().unwrap());
        assert_eq!(
            config.rotation.interval,
            std::time::Duration::from_secs(12 * 3600)
        );
        match &config.store {
            StoreBackend::Vault(vault) => {
                assert_eq!(vault.vault_uri, "https://kv.example.net");
            }
            other => panic!("expected vault store, got {other:?}"),
        }
        assert_eq!(config.tenants.len(), 2);
        let acme = TenantId::new("acme").unwrap();
        assert!(config.tenants[&acme].rotation_eligible());
    }
}
