//! Secret store seam

use crate::core::{SecretString, StoreError};
use async_trait::async_trait;

/// Trait for the external secret-management service
///
/// The store persists raw key values and the JSON-encoded rotation metadata,
/// one named string secret each. Writes must be atomic per secret from the
/// caller's point of view; the rotation coordinator relies on that to keep
/// its generate → persist key → persist metadata ordering observable.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret by name; `None` when the secret does not exist
    async fn get_secret(&self, name: &str) -> Result<Option<SecretString>, StoreError>;

    /// Create or replace a secret
    async fn put_secret(&self, name: &str, value: &SecretString) -> Result<(), StoreError>;

    /// Remove a secret; succeeds when the secret does not exist
    async fn delete_secret(&self, name: &str) -> Result<(), StoreError>;

    /// Base address of the store, reported by the introspection endpoint
    fn uri(&self) -> &str;
}
