//! Secret string type with automatic zeroization
//!
//! Provides [`SecretString`] with controlled access via closure API
//! to prevent accidental secret copying and automatic memory zeroization,
//! plus [`generate_subscription_key`] for minting new key material.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret string with automatic memory zeroization
///
/// Secrets are never exposed directly - they must be accessed within
/// a closure scope using [`expose_secret`] to prevent accidental copying.
/// Memory is automatically zeroed when the value is dropped.
///
/// [`expose_secret`]: SecretString::expose_secret
///
/// # Examples
///
/// ```
/// use keygate_credential::SecretString;
///
/// let secret = SecretString::new("sub-key-value");
/// let len = secret.expose_secret(|value| value.len());
/// assert_eq!(len, 13);
///
/// // Secret is redacted in debug/display output
/// assert_eq!(format!("{:?}", secret), "[REDACTED]");
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    /// Creates a new secret from any string-like value
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self { inner: s.into() }
    }

    /// Accesses secret value within a closure scope
    ///
    /// The secret value cannot escape the closure.
    pub fn expose_secret<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        f(&self.inner)
    }

    /// Returns the length without exposing content
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks if empty without exposing content
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Constant-time comparison against a presented value
    ///
    /// Used on the gateway validation path so a mismatching key cannot be
    /// distinguished from a matching one by timing.
    #[must_use]
    pub fn ct_eq(&self, presented: &str) -> bool {
        // ConstantTimeEq on slices short-circuits on length; length is not
        // secret here since keys have a fixed generated length.
        bool::from(self.inner.as_bytes().ct_eq(presented.as_bytes()))
    }

    /// Short SHA-256 fingerprint safe to log
    ///
    /// Never reveals key material; two keys collide on a fingerprint only
    /// with negligible probability.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.inner.as_bytes());
        let digest = hasher.finalize();
        digest[..4].iter().map(|b| format!("{b:02x}")).collect()
    }
}

// Prevent accidental secret leakage via Debug/Display
impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// Serialize as redacted for safety; deserialization accepts plain strings so
// configuration files can carry tokens.
impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}

/// Generate a fresh high-entropy subscription key (URL-safe base64, 32 bytes)
#[must_use]
pub fn generate_subscription_key() -> SecretString {
    use rand::Rng;

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let encoded =
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes);
    bytes.zeroize();
    SecretString::new(encoded)
}
