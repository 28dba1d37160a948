//! Key rotation
//!
//! Dual-slot rotation with a safe-slot guarantee: every cycle re-keys the
//! slot callers are *not* relying on, so at least one of the two
//! subscription keys is stable across any single rotation event. Clients
//! holding either key never see a hard outage; only the just-rotated slot
//! needs a cache refresh.
//!
//! The cycle for one tenant:
//!
//! 1. Load (or lazily initialize) the tenant's rotation metadata from the
//!    secret store.
//! 2. Skip if the cooldown has not elapsed and the call is not forced.
//! 3. Pick the target slot: the one that is not the safe slot.
//! 4. Regenerate the target slot at the gateway.
//! 5. Persist the new key value, then the updated metadata, in that order.
//!
//! A cycle killed between steps 4 and 5 leaves a gateway key the store does
//! not know about yet. That window is harmless: no caller can have fetched
//! the value, and re-running the cycle picks the same target slot from the
//! same persisted metadata, so retry is the recovery mechanism.

mod coordinator;
mod error;
mod metadata;

pub use coordinator::{RotationConfig, RotationCoordinator, RotationOutcome};
pub use error::{RotationError, RotationResult};
pub use metadata::{RotatedSlot, RotationMetadata};
