//! Tenant identifier and per-tenant gateway configuration
//!
//! Provides a validated [`TenantId`] newtype that prevents path traversal
//! and injection through strict slug rules, plus the secret-name conventions
//! shared by the rotation coordinator and the introspection endpoint.

use crate::core::{Slot, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for tenant slugs
const MAX_SLUG_LENGTH: usize = 63;

/// Unique tenant slug (validated)
///
/// Only allows lowercase alphanumeric characters and hyphens, must start and
/// end with an alphanumeric character. The slug is embedded into secret names
/// and URL paths, so the rules are deliberately strict.
///
/// # Examples
///
/// ```
/// use keygate_credential::TenantId;
///
/// let id = TenantId::new("acme-corp").unwrap();
/// assert_eq!(id.as_str(), "acme-corp");
///
/// assert!(TenantId::new("").is_err());
/// assert!(TenantId::new("../etc/passwd").is_err());
/// assert!(TenantId::new("Acme").is_err()); // uppercase
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new validated tenant slug
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTenantId`] if the slug is empty, or
    /// [`ValidationError::InvalidTenantId`] if it is too long, contains
    /// characters outside `[a-z0-9-]`, or has a hyphen at either end.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();

        if id.is_empty() {
            return Err(ValidationError::EmptyTenantId);
        }

        if id.len() > MAX_SLUG_LENGTH {
            return Err(ValidationError::InvalidTenantId {
                id: id.clone(),
                reason: format!("exceeds maximum length of {MAX_SLUG_LENGTH} characters"),
            });
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ValidationError::InvalidTenantId {
                id: id.clone(),
                reason: "contains invalid characters (only lowercase alphanumeric and hyphens allowed)"
                    .to_string(),
            });
        }

        if id.starts_with('-') || id.ends_with('-') {
            return Err(ValidationError::InvalidTenantId {
                id: id.clone(),
                reason: "must not start or end with a hyphen".to_string(),
            });
        }

        Ok(Self(id))
    }

    /// Returns the slug as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts to an owned string
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Secret name holding the given slot's key value
    #[must_use]
    pub fn key_secret_name(&self, slot: Slot) -> String {
        format!("{}-apim-{}-key", self.0, slot.as_str())
    }

    /// Secret name holding the JSON-encoded rotation metadata
    #[must_use]
    pub fn metadata_secret_name(&self) -> String {
        format!("{}-apim-rotation-metadata", self.0)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl TryFrom<String> for TenantId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        TenantId::new(s)
    }
}

/// How a tenant's gateway product authenticates callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Dual-slot subscription keys; the only mode eligible for rotation
    SubscriptionKey,
    /// Token-based auth managed elsewhere; no keys to rotate
    Jwt,
    /// No gateway-level authentication
    Open,
}

/// Per-tenant gateway settings relevant to key management
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Authentication mode of the tenant's API product
    pub auth_mode: AuthMode,
    /// Whether scheduled rotation is enabled for this tenant
    #[serde(default = "default_rotation_enabled")]
    pub rotation_enabled: bool,
}

fn default_rotation_enabled() -> bool {
    true
}

impl TenantConfig {
    /// Settings for a subscription-key tenant with rotation on
    #[must_use]
    pub fn subscription_key() -> Self {
        Self {
            auth_mode: AuthMode::SubscriptionKey,
            rotation_enabled: true,
        }
    }

    /// Whether the rotation coordinator may act on this tenant
    #[must_use]
    pub fn rotation_eligible(&self) -> bool {
        self.auth_mode == AuthMode::SubscriptionKey && self.rotation_enabled
    }
}
