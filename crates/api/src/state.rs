//! Shared state for the API router

use keygate_credential::traits::{GatewayCredentials, SecretStore};
use std::sync::Arc;

/// Handles to the seams the handlers need
#[derive(Clone)]
pub struct ApiState {
    /// Validates presented keys and serves both live slot values
    pub gateway: Arc<dyn GatewayCredentials>,
    /// Source of rotation metadata; its address is reported to operators
    pub store: Arc<dyn SecretStore>,
}

impl ApiState {
    /// New state over the given seams
    pub fn new(gateway: Arc<dyn GatewayCredentials>, store: Arc<dyn SecretStore>) -> Self {
        Self { gateway, store }
    }
}
