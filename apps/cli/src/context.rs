//! Wires configuration into live components

use crate::config::{GatewayBackend, KeygateConfig, StoreBackend};
use anyhow::Context;
use keygate_credential::providers::{
    ApimGateway, MemoryGateway, MemorySecretStore, StaticTenantDirectory, VaultSecretStore,
};
use keygate_credential::rotation::RotationCoordinator;
use keygate_credential::traits::{GatewayCredentials, SecretStore};
use std::sync::Arc;

/// Live seams built from configuration
pub struct AppContext {
    pub store: Arc<dyn SecretStore>,
    pub gateway: Arc<dyn GatewayCredentials>,
    pub directory: Arc<StaticTenantDirectory>,
}

impl AppContext {
    /// Construct backends and the tenant directory
    pub fn build(config: &KeygateConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn SecretStore> = match &config.store {
            StoreBackend::Memory => Arc::new(MemorySecretStore::new()),
            StoreBackend::Vault(vault) => Arc::new(
                VaultSecretStore::new(vault.clone()).context("building vault secret store")?,
            ),
        };

        let gateway: Arc<dyn GatewayCredentials> = match &config.gateway {
            GatewayBackend::Memory => {
                let memory = MemoryGateway::new();
                // The embedded gateway starts empty; seed a subscription per
                // configured tenant so validation and rotation have targets.
                for tenant in config.tenants.keys() {
                    memory.register(tenant.clone());
                }
                Arc::new(memory)
            }
            GatewayBackend::Apim(apim) => Arc::new(
                ApimGateway::new(apim.clone()).context("building gateway management client")?,
            ),
        };

        let directory: StaticTenantDirectory = config
            .tenants
            .iter()
            .map(|(tenant, settings)| (tenant.clone(), *settings))
            .collect();

        Ok(Self {
            store,
            gateway,
            directory: Arc::new(directory),
        })
    }

    /// Rotation coordinator over these seams
    pub fn coordinator(&self, config: &KeygateConfig) -> RotationCoordinator {
        RotationCoordinator::new(
            self.store.clone(),
            self.gateway.clone(),
            self.directory.clone(),
            config.rotation.clone(),
        )
    }
}
