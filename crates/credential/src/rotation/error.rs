//! Rotation error types

use crate::core::{GatewayError, Slot, StoreError};
use thiserror::Error;

/// Errors from a rotation cycle
#[derive(Debug, Error)]
pub enum RotationError {
    /// Rotation is switched off globally
    #[error("Rotation is disabled")]
    Disabled,

    /// Tenant is unknown to the directory
    #[error("Tenant '{tenant}' not found")]
    UnknownTenant {
        /// Tenant slug
        tenant: String,
    },

    /// Tenant exists but does not qualify for rotation
    #[error("Tenant '{tenant}' is not eligible for rotation: {reason}")]
    Ineligible {
        /// Tenant slug
        tenant: String,
        /// Why the tenant does not qualify
        reason: String,
    },

    /// Persisted metadata could not be decoded
    #[error("Rotation metadata for tenant '{tenant}' is corrupt: {reason}")]
    MetadataCorrupt {
        /// Tenant slug
        tenant: String,
        /// Decoding failure detail
        reason: String,
    },

    /// Reading metadata from the store failed
    #[error("Failed to read rotation metadata for tenant '{tenant}': {source}")]
    MetadataRead {
        /// Tenant slug
        tenant: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// Key regeneration at the gateway failed; nothing was changed
    #[error("Failed to regenerate {slot} key for tenant '{tenant}': {source}")]
    Regenerate {
        /// Tenant slug
        tenant: String,
        /// Slot that was being rotated
        slot: Slot,
        /// Underlying gateway error
        #[source]
        source: GatewayError,
    },

    /// New key was issued but could not be written to the store
    ///
    /// Recoverable: re-running the cycle regenerates the same slot and
    /// retries both writes.
    #[error("Key for tenant '{tenant}' slot {slot} regenerated but not persisted: {source}")]
    KeyPersist {
        /// Tenant slug
        tenant: String,
        /// Slot whose key is now ahead of the store
        slot: Slot,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// Key was persisted but the metadata update failed
    ///
    /// Recoverable the same way as [`RotationError::KeyPersist`].
    #[error("Rotation metadata for tenant '{tenant}' not persisted: {source}")]
    MetadataPersist {
        /// Tenant slug
        tenant: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },
}

impl RotationError {
    /// Whether re-running the same cycle can recover
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            RotationError::KeyPersist { source, .. }
            | RotationError::MetadataPersist { source, .. }
            | RotationError::MetadataRead { source, .. } => source.is_retryable(),
            RotationError::Regenerate { source, .. } => source.is_retryable(),
            RotationError::Disabled
            | RotationError::UnknownTenant { .. }
            | RotationError::Ineligible { .. }
            | RotationError::MetadataCorrupt { .. } => false,
        }
    }
}

/// Result type alias for rotation operations
pub type RotationResult<T> = Result<T, RotationError>;
