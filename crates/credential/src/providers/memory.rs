//! In-memory store and gateway providers
//!
//! Back the test suites and embedded single-process deployments. Both are
//! cheap to clone and safe for concurrent use.

use crate::core::{
    GatewayError, SecretString, Slot, StoreError, TenantId, generate_subscription_key,
};
use crate::traits::{GatewayCredentials, SecretStore, SubscriptionKeys};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Secret store keeping everything in process memory
#[derive(Debug, Clone)]
pub struct MemorySecretStore {
    secrets: Arc<DashMap<String, SecretString>>,
    uri: String,
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySecretStore {
    /// New empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            secrets: Arc::new(DashMap::new()),
            uri: "memory://secrets".to_string(),
        }
    }

    /// Number of stored secrets
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether the store holds no secrets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, name: &str) -> Result<Option<SecretString>, StoreError> {
        Ok(self.secrets.get(name).map(|entry| entry.value().clone()))
    }

    async fn put_secret(&self, name: &str, value: &SecretString) -> Result<(), StoreError> {
        self.secrets.insert(name.to_string(), value.clone());
        Ok(())
    }

    async fn delete_secret(&self, name: &str) -> Result<(), StoreError> {
        self.secrets.remove(name);
        Ok(())
    }

    fn uri(&self) -> &str {
        &self.uri
    }
}

/// Gateway provider keeping subscriptions in process memory
///
/// Tenants must be registered before their keys can be regenerated or
/// validated, mirroring how a real gateway only manages provisioned
/// subscriptions.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    subscriptions: Arc<DashMap<TenantId, SubscriptionKeys>>,
}

impl MemoryGateway {
    /// New provider with no subscriptions
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a subscription with fresh keys in both slots
    pub fn register(&self, tenant: TenantId) -> SubscriptionKeys {
        let keys = SubscriptionKeys {
            primary: generate_subscription_key(),
            secondary: generate_subscription_key(),
        };
        self.subscriptions.insert(tenant, keys.clone());
        keys
    }

    /// Drop a subscription
    pub fn unregister(&self, tenant: &TenantId) {
        self.subscriptions.remove(tenant);
    }
}

#[async_trait]
impl GatewayCredentials for MemoryGateway {
    async fn regenerate(
        &self,
        tenant: &TenantId,
        slot: Slot,
    ) -> Result<SecretString, GatewayError> {
        let mut entry =
            self.subscriptions
                .get_mut(tenant)
                .ok_or_else(|| GatewayError::UnknownTenant {
                    tenant: tenant.to_string(),
                })?;
        let fresh = generate_subscription_key();
        match slot {
            Slot::Primary => entry.primary = fresh.clone(),
            Slot::Secondary => entry.secondary = fresh.clone(),
        }
        Ok(fresh)
    }

    async fn keys(&self, tenant: &TenantId) -> Result<SubscriptionKeys, GatewayError> {
        self.subscriptions
            .get(tenant)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| GatewayError::UnknownTenant {
                tenant: tenant.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_round_trip() {
        let store = MemorySecretStore::new();
        assert!(store.get_secret("missing").await.unwrap().is_none());

        store
            .put_secret("acme-apim-primary-key", &SecretString::new("v1"))
            .await
            .unwrap();
        let got = store.get_secret("acme-apim-primary-key").await.unwrap();
        got.unwrap().expose_secret(|s| assert_eq!(s, "v1"));

        store.delete_secret("acme-apim-primary-key").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn regenerate_replaces_only_the_target_slot() {
        let gateway = MemoryGateway::new();
        let tenant = TenantId::new("acme").unwrap();
        let initial = gateway.register(tenant.clone());

        let fresh = gateway.regenerate(&tenant, Slot::Secondary).await.unwrap();
        let after = gateway.keys(&tenant).await.unwrap();

        // Primary untouched, secondary replaced
        assert!(after.primary.ct_eq(&initial.primary.expose_secret(str::to_owned)));
        assert!(after.secondary.ct_eq(&fresh.expose_secret(str::to_owned)));
        assert!(!after.secondary.ct_eq(&initial.secondary.expose_secret(str::to_owned)));
    }

    #[tokio::test]
    async fn validate_reports_matching_slot() {
        let gateway = MemoryGateway::new();
        let tenant = TenantId::new("acme").unwrap();
        let keys = gateway.register(tenant.clone());

        let primary = keys.primary.expose_secret(str::to_owned);
        assert_eq!(
            gateway.validate(&tenant, &primary).await.unwrap(),
            Some(Slot::Primary)
        );
        assert_eq!(gateway.validate(&tenant, "bogus").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_tenant_is_an_error() {
        let gateway = MemoryGateway::new();
        let ghost = TenantId::new("ghost").unwrap();
        let err = gateway.keys(&ghost).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnknownTenant { .. }));
    }
}
