//! Gateway credential provider seam

use crate::core::{GatewayError, SecretString, Slot, TenantId};
use async_trait::async_trait;

/// Both live key values for one tenant's gateway subscription
///
/// Either value authenticates; rotation replaces one at a time.
#[derive(Debug, Clone)]
pub struct SubscriptionKeys {
    /// Primary slot value
    pub primary: SecretString,
    /// Secondary slot value
    pub secondary: SecretString,
}

impl SubscriptionKeys {
    /// The key currently occupying the given slot
    #[must_use]
    pub fn slot(&self, slot: Slot) -> &SecretString {
        match slot {
            Slot::Primary => &self.primary,
            Slot::Secondary => &self.secondary,
        }
    }

    /// Which slot, if any, the presented value matches
    ///
    /// Both comparisons always run so a miss costs the same as a hit.
    #[must_use]
    pub fn matches(&self, presented: &str) -> Option<Slot> {
        let primary = self.primary.ct_eq(presented);
        let secondary = self.secondary.ct_eq(presented);
        if primary {
            Some(Slot::Primary)
        } else if secondary {
            Some(Slot::Secondary)
        } else {
            None
        }
    }
}

/// Trait for the API gateway's subscription-key issuance and validation
#[async_trait]
pub trait GatewayCredentials: Send + Sync {
    /// Regenerate the key in the given slot, returning the new value
    ///
    /// The old value in that slot stops validating as soon as this returns;
    /// the other slot is untouched.
    async fn regenerate(&self, tenant: &TenantId, slot: Slot)
    -> Result<SecretString, GatewayError>;

    /// Fetch both current key values for a tenant
    async fn keys(&self, tenant: &TenantId) -> Result<SubscriptionKeys, GatewayError>;

    /// Validate a presented key against both slots
    ///
    /// Returns the matching slot, or `None` for an invalid key. Unknown
    /// tenants surface as [`GatewayError::UnknownTenant`].
    async fn validate(
        &self,
        tenant: &TenantId,
        presented: &str,
    ) -> Result<Option<Slot>, GatewayError> {
        Ok(self.keys(tenant).await?.matches(presented))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SubscriptionKeys {
        SubscriptionKeys {
            primary: SecretString::new("primary-value"),
            secondary: SecretString::new("secondary-value"),
        }
    }

    #[test]
    fn matches_identifies_slot() {
        let k = keys();
        assert_eq!(k.matches("primary-value"), Some(Slot::Primary));
        assert_eq!(k.matches("secondary-value"), Some(Slot::Secondary));
        assert_eq!(k.matches("neither"), None);
        assert_eq!(k.matches(""), None);
    }

    #[test]
    fn slot_accessor_returns_matching_value() {
        let k = keys();
        k.slot(Slot::Primary)
            .expose_secret(|s| assert_eq!(s, "primary-value"));
        k.slot(Slot::Secondary)
            .expose_secret(|s| assert_eq!(s, "secondary-value"));
    }
}
