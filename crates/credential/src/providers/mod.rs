//! Backend implementations for the store, gateway, and directory seams
//!
//! In-memory providers back tests and embedded deployments; the HTTP
//! providers speak the external services' REST dialects.

mod apim;
mod directory;
mod memory;
mod vault;

pub use apim::{ApimGateway, ApimGatewayConfig};
pub use directory::StaticTenantDirectory;
pub use memory::{MemoryGateway, MemorySecretStore};
pub use vault::{VaultSecretStore, VaultStoreConfig};
