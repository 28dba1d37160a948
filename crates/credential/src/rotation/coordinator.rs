//! Rotation coordinator
//!
//! Short-lived, invocation-per-cycle component: a scheduler or operator
//! calls [`RotationCoordinator::rotate_tenant`] and the coordinator performs
//! exactly one cycle. Per-tenant serialization is a local mutex; deployments
//! running multiple coordinator processes need an external lock on top (see
//! the module docs in [`crate::rotation`]).

use crate::core::{SecretString, Slot, TenantId};
use crate::rotation::{RotationError, RotationMetadata, RotationResult};
use crate::traits::{GatewayCredentials, SecretStore, TenantDirectory};
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Default interval between scheduled cycles per tenant
const DEFAULT_INTERVAL: Duration = Duration::from_secs(30 * 24 * 3600);

/// Coordinator-wide rotation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Global enable switch; `false` refuses every cycle
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Cooldown between unforced cycles for one tenant
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
}

fn default_enabled() -> bool {
    true
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval: default_interval(),
        }
    }
}

/// Result of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// A slot was re-keyed; the metadata reflects the new state
    Rotated(RotationMetadata),
    /// Cooldown had not elapsed; nothing changed
    Skipped(RotationMetadata),
}

impl RotationOutcome {
    /// The metadata after the cycle, rotated or not
    #[must_use]
    pub fn metadata(&self) -> &RotationMetadata {
        match self {
            RotationOutcome::Rotated(meta) | RotationOutcome::Skipped(meta) => meta,
        }
    }

    /// Whether a key was actually re-keyed
    #[must_use]
    pub fn rotated(&self) -> bool {
        matches!(self, RotationOutcome::Rotated(_))
    }
}

/// Performs rotation cycles against a store and a gateway
pub struct RotationCoordinator {
    store: Arc<dyn SecretStore>,
    gateway: Arc<dyn GatewayCredentials>,
    directory: Arc<dyn TenantDirectory>,
    config: RotationConfig,
    // Serializes concurrent cycles for the same tenant within this process.
    locks: DashMap<TenantId, Arc<Mutex<()>>>,
}

impl RotationCoordinator {
    /// New coordinator over the given seams
    pub fn new(
        store: Arc<dyn SecretStore>,
        gateway: Arc<dyn GatewayCredentials>,
        directory: Arc<dyn TenantDirectory>,
        config: RotationConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            directory,
            config,
            locks: DashMap::new(),
        }
    }

    fn tenant_lock(&self, tenant: &TenantId) -> Arc<Mutex<()>> {
        self.locks
            .entry(tenant.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn check_eligibility(&self, tenant: &TenantId) -> RotationResult<()> {
        if !self.config.enabled {
            return Err(RotationError::Disabled);
        }
        let config =
            self.directory
                .lookup(tenant)
                .ok_or_else(|| RotationError::UnknownTenant {
                    tenant: tenant.to_string(),
                })?;
        if config.rotation_eligible() {
            Ok(())
        } else {
            let reason = if config.rotation_enabled {
                format!("auth mode is not subscription_key ({:?})", config.auth_mode)
            } else {
                "rotation disabled for tenant".to_string()
            };
            Err(RotationError::Ineligible {
                tenant: tenant.to_string(),
                reason,
            })
        }
    }

    async fn load_metadata(&self, tenant: &TenantId) -> RotationResult<RotationMetadata> {
        let name = tenant.metadata_secret_name();
        let raw = self
            .store
            .get_secret(&name)
            .await
            .map_err(|source| RotationError::MetadataRead {
                tenant: tenant.to_string(),
                source,
            })?;
        match raw {
            Some(secret) => secret.expose_secret(|json| {
                serde_json::from_str(json).map_err(|e| RotationError::MetadataCorrupt {
                    tenant: tenant.to_string(),
                    reason: e.to_string(),
                })
            }),
            None => Ok(RotationMetadata::initial()),
        }
    }

    /// Perform one rotation cycle for a tenant
    ///
    /// `force` bypasses the time-based cooldown, not eligibility. A cycle
    /// inside the cooldown window is a no-op returning
    /// [`RotationOutcome::Skipped`] with the unchanged metadata.
    ///
    /// # Errors
    ///
    /// Eligibility failures are permanent; store and gateway failures are
    /// classified by [`RotationError::is_recoverable`]. A recoverable
    /// failure is fixed by re-running the same call: slot selection depends
    /// only on persisted metadata, so the retry converges on the same
    /// target slot.
    pub async fn rotate_tenant(
        &self,
        tenant: &TenantId,
        force: bool,
    ) -> RotationResult<RotationOutcome> {
        self.check_eligibility(tenant)?;

        let lock = self.tenant_lock(tenant);
        let _guard = lock.lock().await;

        let mut metadata = self.load_metadata(tenant).await?;
        let now = Utc::now();

        if !force && metadata.in_cooldown(now) {
            tracing::debug!(
                tenant = %tenant,
                next_rotation_at = ?metadata.next_rotation_at,
                "rotation skipped, cooldown active"
            );
            return Ok(RotationOutcome::Skipped(metadata));
        }

        let target = metadata.target_slot();

        let new_key =
            self.gateway
                .regenerate(tenant, target)
                .await
                .map_err(|source| RotationError::Regenerate {
                    tenant: tenant.to_string(),
                    slot: target,
                    source,
                })?;

        self.persist_key(tenant, target, &new_key).await?;

        metadata.advance(target, now, self.config.interval);
        self.persist_metadata(tenant, &metadata).await?;

        tracing::info!(
            tenant = %tenant,
            slot = %target,
            rotation_number = metadata.rotation_number,
            key_fingerprint = %new_key.fingerprint(),
            "subscription key rotated"
        );

        Ok(RotationOutcome::Rotated(metadata))
    }

    /// Run a cycle for every eligible tenant in the directory
    ///
    /// One tenant's failure never aborts the sweep; each tenant's outcome is
    /// reported individually.
    pub async fn rotate_all(
        &self,
        force: bool,
    ) -> Vec<(TenantId, RotationResult<RotationOutcome>)> {
        let mut results = Vec::new();
        for tenant in self.directory.tenants() {
            let eligible = self
                .directory
                .lookup(&tenant)
                .is_some_and(|c| c.rotation_eligible());
            if !eligible {
                tracing::debug!(tenant = %tenant, "skipping ineligible tenant in sweep");
                continue;
            }
            let outcome = self.rotate_tenant(&tenant, force).await;
            if let Err(err) = &outcome {
                tracing::warn!(tenant = %tenant, error = %err, "rotation failed");
            }
            results.push((tenant, outcome));
        }
        results
    }

    async fn persist_key(
        &self,
        tenant: &TenantId,
        slot: Slot,
        key: &SecretString,
    ) -> RotationResult<()> {
        let name = tenant.key_secret_name(slot);
        self.store.put_secret(&name, key).await.map_err(|source| {
            // Partial-failure window: the gateway already holds the new key.
            // No caller can have fetched it yet, and a retried cycle targets
            // the same slot, so this is operational noise, not an outage.
            tracing::warn!(
                tenant = %tenant,
                slot = %slot,
                secret = %name,
                error = %source,
                "key regenerated at gateway but store write failed; retry the cycle"
            );
            RotationError::KeyPersist {
                tenant: tenant.to_string(),
                slot,
                source,
            }
        })
    }

    async fn persist_metadata(
        &self,
        tenant: &TenantId,
        metadata: &RotationMetadata,
    ) -> RotationResult<()> {
        let name = tenant.metadata_secret_name();
        let json = serde_json::to_string(metadata).map_err(|e| RotationError::MetadataCorrupt {
            tenant: tenant.to_string(),
            reason: e.to_string(),
        })?;
        self.store
            .put_secret(&name, &SecretString::new(json))
            .await
            .map_err(|source| {
                tracing::warn!(
                    tenant = %tenant,
                    error = %source,
                    "key persisted but metadata write failed; retry the cycle"
                );
                RotationError::MetadataPersist {
                    tenant: tenant.to_string(),
                    source,
                }
            })
    }
}
