//! # Domain Value Objects
//!
//! Immutable value types for the escrow ledger.

use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Lifecycle of a slot in the lock map.
///
/// ```text
/// [Absent] --lock--> [Funding] --pulled--> [Active] --claim/unlock--> [Settling] --paid--> [Absent]
///                        |                                               |
///                        +--pull failed--> [Absent]      payout failed --+--> [Active]
/// ```
///
/// `Absent` has no variant: it is the missing map key. Only `Active` records
/// are visible to claim, unlock and queries. `Funding` and `Settling` still
/// occupy the key so a concurrent `lock` on the same hash is rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockStatus {
    /// Record reserved, tokens being pulled into escrow.
    #[default]
    Funding,
    /// Tokens in escrow, awaiting claim or unlock.
    Active,
    /// Terminal transition in flight, payout being pushed.
    Settling,
}

impl LockStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: LockStatus) -> bool {
        matches!(
            (self, next),
            (Self::Funding, Self::Active)
                | (Self::Active, Self::Settling)
                | (Self::Settling, Self::Active)
        )
    }

    /// Whether claim/unlock may target this slot.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// How a lock reached its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settlement {
    /// Receiver revealed the pre-image before the deadline.
    Claimed,
    /// Sender reclaimed the funds at or after the deadline.
    Unlocked,
}
