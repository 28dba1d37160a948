//! Keygate Credential - dual-slot subscription key management
//!
//! Core of the keygate gateway: per-tenant primary/secondary subscription
//! keys, the secret store that persists them, and the rotation coordinator
//! that re-keys one slot at a time without breaking in-flight clients.
//!
//! # Features
//!
//! - **Dual-slot keys** - both slots validate at all times; only the slot
//!   outside the safe slot is ever rotated
//! - **Pluggable backends** - in-memory providers for tests and embedding,
//!   HTTP providers for a Key Vault-dialect store and a gateway management API
//! - **Idempotent rotation** - a killed or retried cycle converges on the
//!   same target slot, so no cleanup pass is needed
//! - **Secret hygiene** - zeroized key material, redacted Debug/Display,
//!   constant-time validation
#![deny(unsafe_code)]
#![forbid(unsafe_code)]

/// Core types, errors, and primitives
pub mod core;
/// Storage and gateway backend implementations
pub mod providers;
/// Key rotation: metadata record and coordinator
pub mod rotation;
/// Traits for the secret store, gateway, and tenant directory seams
pub mod traits;

// ── Root re-exports ─────────────────────────────────────────────────────────
// Commonly-used types available directly as `keygate_credential::TypeName`.

pub use crate::core::{
    AuthMode, GatewayError, SecretString, Slot, StoreError, TenantConfig, TenantId,
    ValidationError, generate_subscription_key,
};

pub use crate::traits::{GatewayCredentials, SecretStore, SubscriptionKeys, TenantDirectory};

pub use crate::rotation::{
    RotatedSlot, RotationConfig, RotationCoordinator, RotationError, RotationMetadata,
    RotationOutcome, RotationResult,
};

/// Commonly used types and traits
pub mod prelude {
    pub use crate::core::{
        AuthMode, SecretString, Slot, TenantConfig, TenantId, generate_subscription_key,
    };
    pub use crate::providers::{
        ApimGateway, ApimGatewayConfig, MemoryGateway, MemorySecretStore, StaticTenantDirectory,
        VaultSecretStore, VaultStoreConfig,
    };
    pub use crate::rotation::{
        RotationConfig, RotationCoordinator, RotationMetadata, RotationOutcome,
    };
    pub use crate::traits::{GatewayCredentials, SecretStore, SubscriptionKeys, TenantDirectory};
}
