//! # Algorithms Module
//!
//! Hashlock computation and claim/unlock authorization.

pub mod hashlock;

pub use hashlock::{
    create_hash_lock, generate_random_preimage, verify_claim, verify_preimage, verify_unlock,
    PREIMAGE_LEN,
};
