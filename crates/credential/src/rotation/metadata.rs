//! Durable rotation metadata
//!
//! One JSON-encoded record per tenant, stored as a secret alongside the key
//! values. The record is the single source of truth for slot selection, so
//! a retried or concurrently-repeated cycle computes the same target slot.

use crate::core::Slot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which slot, if any, the most recent rotation touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotatedSlot {
    /// No rotation has happened yet
    None,
    /// Primary slot was rotated last
    Primary,
    /// Secondary slot was rotated last
    Secondary,
}

impl From<Slot> for RotatedSlot {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Primary => RotatedSlot::Primary,
            Slot::Secondary => RotatedSlot::Secondary,
        }
    }
}

/// Durable record of a tenant's rotation state
///
/// Created once at onboarding (or lazily on the first cycle) and mutated
/// exclusively by the rotation coordinator. Timestamps serialize as RFC 3339;
/// before the first rotation the wire forms are the literals `"never"` and
/// `"pending"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationMetadata {
    /// Slot most recently rotated
    pub last_rotated_slot: RotatedSlot,

    /// Slot guaranteed not to have changed in the most recent cycle
    pub safe_slot: Slot,

    /// Monotonically increasing cycle counter
    pub rotation_number: u64,

    /// When the last cycle ran, or `"never"`
    #[serde(with = "time_or_never")]
    pub last_rotation_at: Option<DateTime<Utc>>,

    /// When the next cycle becomes due, or `"pending"`
    #[serde(with = "time_or_pending")]
    pub next_rotation_at: Option<DateTime<Utc>>,
}

impl RotationMetadata {
    /// Fresh record for a tenant that has never rotated
    #[must_use]
    pub fn initial() -> Self {
        Self {
            last_rotated_slot: RotatedSlot::None,
            safe_slot: Slot::Primary,
            rotation_number: 0,
            last_rotation_at: None,
            next_rotation_at: None,
        }
    }

    /// The slot the next cycle must rotate: never the safe slot
    #[must_use]
    pub fn target_slot(&self) -> Slot {
        self.safe_slot.other()
    }

    /// Whether an unforced cycle at `now` is inside the cooldown window
    #[must_use]
    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        self.next_rotation_at.is_some_and(|next| next > now)
    }

    /// Record a completed cycle for `target` at `now`
    ///
    /// The safe slot becomes the slot the cycle left untouched, the counter
    /// advances, and the next due time moves one interval out.
    pub fn advance(&mut self, target: Slot, now: DateTime<Utc>, interval: Duration) {
        self.last_rotated_slot = target.into();
        self.safe_slot = target.other();
        self.rotation_number += 1;
        self.last_rotation_at = Some(now);
        let interval = chrono::Duration::seconds(i64::try_from(interval.as_secs()).unwrap_or(i64::MAX));
        self.next_rotation_at = Some(now + interval);
    }
}

impl Default for RotationMetadata {
    fn default() -> Self {
        Self::initial()
    }
}

/// Serde helpers mapping `Option<DateTime<Utc>>` to an RFC 3339 string or a
/// fixed sentinel literal
macro_rules! sentinel_time {
    ($module:ident, $sentinel:literal) => {
        mod $module {
            use chrono::{DateTime, Utc};
            use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

            pub(super) fn serialize<S>(
                value: &Option<DateTime<Utc>>,
                serializer: S,
            ) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                match value {
                    Some(t) => serializer.serialize_str(&t.to_rfc3339()),
                    None => serializer.serialize_str($sentinel),
                }
            }

            pub(super) fn deserialize<'de, D>(
                deserializer: D,
            ) -> Result<Option<DateTime<Utc>>, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                if raw == $sentinel {
                    return Ok(None);
                }
                DateTime::parse_from_rfc3339(&raw)
                    .map(|t| Some(t.with_timezone(&Utc)))
                    .map_err(D::Error::custom)
            }
        }
    };
}

sentinel_time!(time_or_never, "never");
sentinel_time!(time_or_pending, "pending");
