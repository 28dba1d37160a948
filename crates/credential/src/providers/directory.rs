//! Static tenant directory

use crate::core::{TenantConfig, TenantId};
use crate::traits::TenantDirectory;
use std::collections::BTreeMap;

/// Tenant directory backed by a fixed table
///
/// Loaded from configuration at startup; iteration order is the slug order,
/// which keeps rotation sweeps and their logs deterministic.
#[derive(Debug, Clone, Default)]
pub struct StaticTenantDirectory {
    tenants: BTreeMap<TenantId, TenantConfig>,
}

impl StaticTenantDirectory {
    /// Empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a tenant entry
    pub fn insert(&mut self, tenant: TenantId, config: TenantConfig) {
        self.tenants.insert(tenant, config);
    }

    /// Builder-style insertion
    #[must_use]
    pub fn with_tenant(mut self, tenant: TenantId, config: TenantConfig) -> Self {
        self.insert(tenant, config);
        self
    }
}

impl FromIterator<(TenantId, TenantConfig)> for StaticTenantDirectory {
    fn from_iter<I: IntoIterator<Item = (TenantId, TenantConfig)>>(iter: I) -> Self {
        Self {
            tenants: iter.into_iter().collect(),
        }
    }
}

impl TenantDirectory for StaticTenantDirectory {
    fn lookup(&self, tenant: &TenantId) -> Option<TenantConfig> {
        self.tenants.get(tenant).copied()
    }

    fn tenants(&self) -> Vec<TenantId> {
        self.tenants.keys().cloned().collect()
    }
}
