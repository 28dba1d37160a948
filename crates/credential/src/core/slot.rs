//! Subscription key slots

use serde::{Deserialize, Serialize};

/// One of the two interchangeable credential positions for a tenant's key.
///
/// Both slots validate at all times. Rotation re-keys exactly one slot per
/// cycle; the other one is the safe slot clients can rely on while the new
/// value propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Primary subscription key position
    Primary,
    /// Secondary subscription key position
    Secondary,
}

impl Slot {
    /// The opposite slot
    #[must_use]
    pub fn other(self) -> Slot {
        match self {
            Slot::Primary => Slot::Secondary,
            Slot::Secondary => Slot::Primary,
        }
    }

    /// Lowercase wire name, matching the serde form
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Primary => "primary",
            Slot::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
