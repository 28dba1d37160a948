//! Error types for credential operations
//!
//! One enum per external seam, chained upward by the rotation module:
//! - [`StoreError`]: secret store I/O, not found, timeouts
//! - [`GatewayError`]: gateway management API failures
//! - [`ValidationError`]: invalid tenant slugs, malformed data
//!
//! Transient failures are distinguished from permanent ones via
//! `is_retryable`; the rotation coordinator's recovery story is built on
//! that classification.

use std::time::Duration;

use thiserror::Error;

/// Secret store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Secret not found
    #[error("Secret '{name}' not found")]
    NotFound {
        /// Secret name
        name: String,
    },

    /// Store rejected the request
    #[error("Store returned status {status} for secret '{name}'")]
    Rejected {
        /// Secret name
        name: String,
        /// HTTP status returned by the store
        status: u16,
    },

    /// Transport-level failure talking to the store
    #[error("Store transport failure: {source}")]
    Transport {
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// Operation timed out; retryable
    #[error("Store operation timed out after {duration:?}")]
    Timeout {
        /// Duration attempted
        duration: Duration,
    },

    /// Secret payload could not be decoded
    #[error("Malformed secret payload for '{name}': {reason}")]
    Malformed {
        /// Secret name
        name: String,
        /// Why decoding failed
        reason: String,
    },
}

/// Gateway credential provider errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No subscription registered for the tenant
    #[error("No gateway subscription for tenant '{tenant}'")]
    UnknownTenant {
        /// Tenant slug
        tenant: String,
    },

    /// Management API rejected the request
    #[error("Gateway management API returned status {status}")]
    Rejected {
        /// HTTP status returned by the management API
        status: u16,
    },

    /// Transport-level failure talking to the management API
    #[error("Gateway transport failure: {source}")]
    Transport {
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// Operation timed out; retryable
    #[error("Gateway operation timed out after {duration:?}")]
    Timeout {
        /// Duration attempted
        duration: Duration,
    },

    /// Management API response could not be decoded
    #[error("Malformed gateway response: {reason}")]
    Malformed {
        /// Why decoding failed
        reason: String,
    },
}

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Tenant slug cannot be empty
    #[error("Tenant slug cannot be empty")]
    EmptyTenantId,

    /// Invalid tenant slug
    #[error("Invalid tenant slug '{id}': {reason}")]
    InvalidTenantId {
        /// The invalid slug
        id: String,
        /// Reason for invalidity
        reason: String,
    },
}

impl StoreError {
    /// Whether a retry of the same operation can reasonably succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Timeout { .. } | StoreError::Transport { .. } => true,
            StoreError::Rejected { status, .. } => *status >= 500 || *status == 429,
            StoreError::NotFound { .. } | StoreError::Malformed { .. } => false,
        }
    }
}

impl GatewayError {
    /// Whether a retry of the same operation can reasonably succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout { .. } | GatewayError::Transport { .. } => true,
            GatewayError::Rejected { status } => *status >= 500 || *status == 429,
            GatewayError::UnknownTenant { .. } | GatewayError::Malformed { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn store_error_not_found_message() {
        let err = StoreError::NotFound {
            name: "acme-apim-primary-key".to_string(),
        };
        assert_eq!(err.to_string(), "Secret 'acme-apim-primary-key' not found");
        assert!(!err.is_retryable());
    }

    #[test]
    fn store_rejected_retryable_by_status() {
        let transient = StoreError::Rejected {
            name: "x".into(),
            status: 503,
        };
        let permanent = StoreError::Rejected {
            name: "x".into(),
            status: 403,
        };
        assert!(transient.is_retryable());
        assert!(!permanent.is_retryable());
    }

    #[test]
    fn throttling_is_retryable() {
        let err = GatewayError::Rejected { status: 429 };
        assert!(err.is_retryable());
    }

    #[test]
    fn gateway_unknown_tenant_message() {
        let err = GatewayError::UnknownTenant {
            tenant: "acme".to_string(),
        };
        assert!(err.to_string().contains("acme"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn timeout_keeps_duration_in_message() {
        let err = StoreError::Timeout {
            duration: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("timed out"));
        assert!(err.is_retryable());
        assert!(err.source().is_none());
    }

    #[test]
    fn validation_error_messages() {
        assert!(
            ValidationError::EmptyTenantId
                .to_string()
                .contains("empty")
        );
        let err = ValidationError::InvalidTenantId {
            id: "../etc/passwd".to_string(),
            reason: "contains invalid characters".to_string(),
        };
        assert!(err.to_string().contains("../etc/passwd"));
    }
}
