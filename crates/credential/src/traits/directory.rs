//! Tenant directory seam

use crate::core::{TenantConfig, TenantId};

/// Resolves tenants to their gateway settings
///
/// The rotation coordinator consults this before touching a tenant: only
/// subscription-key tenants with rotation enabled are eligible. Backed by
/// static configuration in the CLI; a deployment may substitute a live
/// control-plane lookup.
pub trait TenantDirectory: Send + Sync {
    /// Settings for a tenant, or `None` when the tenant does not exist
    fn lookup(&self, tenant: &TenantId) -> Option<TenantConfig>;

    /// All known tenants, in stable order
    fn tenants(&self) -> Vec<TenantId>;
}
