//! # Domain Invariants
//!
//! Business rules checked before any ledger mutation or token movement.

use super::entities::Lock;
use super::errors::{Address, EscrowError};
use super::value_objects::Timestamp;
use primitive_types::U256;

/// Invariant: no zero-value locks.
pub fn invariant_nonzero_amount(amount: U256) -> Result<(), EscrowError> {
    if amount.is_zero() {
        return Err(EscrowError::ZeroAmount);
    }
    Ok(())
}

/// Invariant: only the designated receiver can claim.
pub fn invariant_authorized_claimer(lock: &Lock, caller: &Address) -> Result<(), EscrowError> {
    if lock.receiver != *caller {
        return Err(EscrowError::NotReceiver);
    }
    Ok(())
}

/// Invariant: only the lock's sender can unlock.
pub fn invariant_authorized_unlocker(lock: &Lock, caller: &Address) -> Result<(), EscrowError> {
    if lock.sender != *caller {
        return Err(EscrowError::NotSender);
    }
    Ok(())
}

/// Invariant: claim only strictly before the deadline.
pub fn invariant_claim_window(lock: &Lock, now: Timestamp) -> Result<(), EscrowError> {
    if !lock.is_claimable_at(now) {
        return Err(EscrowError::PastDeadline);
    }
    Ok(())
}

/// Invariant: unlock only at or after the deadline.
pub fn invariant_unlock_window(lock: &Lock, now: Timestamp) -> Result<(), EscrowError> {
    if !lock.is_unlockable_at(now) {
        return Err(EscrowError::BeforeDeadline);
    }
    Ok(())
}
