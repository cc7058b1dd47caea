//! # Hashlock Generation and Verification
//!
//! SHA-256 commitments over arbitrary-length pre-images.

use crate::domain::{
    invariant_authorized_claimer, invariant_authorized_unlocker, invariant_claim_window,
    invariant_unlock_window, Address, EscrowError, Hash, Lock, Preimage, Timestamp,
};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Length of generated pre-images.
pub const PREIMAGE_LEN: usize = 32;

/// Generate a cryptographically secure random pre-image.
pub fn generate_random_preimage() -> Preimage {
    let mut bytes = vec![0u8; PREIMAGE_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    Preimage::new(bytes)
}

/// Create a hashlock from a pre-image using SHA-256.
///
/// The pre-image may be any length, including shorter than the digest.
pub fn create_hash_lock(preimage: &[u8]) -> Hash {
    Sha256::digest(preimage).into()
}

/// Verify that a pre-image opens a hashlock.
pub fn verify_preimage(preimage: &[u8], hash_lock: &Hash) -> bool {
    create_hash_lock(preimage) == *hash_lock
}

/// Verify a claim against an active lock found under the pre-image's hash.
///
/// Order: receiver, then deadline.
pub fn verify_claim(lock: &Lock, caller: &Address, now: Timestamp) -> Result<(), EscrowError> {
    invariant_authorized_claimer(lock, caller)?;
    invariant_claim_window(lock, now)?;
    Ok(())
}

/// Verify an unlock against an active lock.
///
/// Order: sender, then deadline.
pub fn verify_unlock(lock: &Lock, caller: &Address, now: Timestamp) -> Result<(), EscrowError> {
    invariant_authorized_unlocker(lock, caller)?;
    invariant_unlock_window(lock, now)?;
    Ok(())
}
