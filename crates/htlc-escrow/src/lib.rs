//! # HTLC Escrow
//!
//! Hash Time-Locked Contract escrow ledger.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A sender locks fungible tokens under a SHA-256 hashlock and a deadline:
//! - the receiver claims before the deadline by revealing the pre-image
//! - the sender unlocks (reclaims) at or after the deadline
//!
//! ## Lock Lifecycle
//!
//! ```text
//! [Absent] ──lock──→ [Active] ──claim (now < unlock_time, receiver)──→ [Absent]
//!                        │
//!                        └──unlock (now >= unlock_time, sender)──→ [Absent]
//! ```
//!
//! ## Guarantees
//!
//! | Property | Enforcement |
//! |----------|-------------|
//! | No zero-value locks | `invariant_nonzero_amount` |
//! | One active lock per hash | map key, checked in `EscrowLedger::lock` |
//! | Claim XOR unlock | slot flagged `Settling` before payout |
//! | All-or-nothing | slot restored when the custodian rejects a transfer |
//!
//! ## Module Structure
//!
//! ```text
//! htlc-escrow/
//! ├── domain/          # Lock, EscrowEvent, errors, invariants, Preimage
//! ├── algorithms/      # Hashlock computation, claim/unlock checks
//! ├── ports/           # EscrowApi, TokenCustodian, TimeSource, EscrowEventPublisher
//! ├── adapters/        # In-memory custodian, event publishers
//! └── service.rs       # EscrowLedger
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    BroadcastEventPublisher, InMemoryTokenCustodian, NoOpPublisher, RecordingPublisher,
    TracingEventPublisher,
};
pub use algorithms::{
    create_hash_lock, generate_random_preimage, verify_claim, verify_preimage, verify_unlock,
};
pub use domain::{
    Address, ConfigError, EscrowConfig, EscrowError, EscrowEvent, Hash, Lock, LockParams,
    LockStatus, Preimage, Settlement, Timestamp, TokenError,
};
pub use ports::{
    EscrowApi, EscrowEventPublisher, MockTimeSource, PublishError, SystemTimeSource, TimeSource,
    TokenCustodian,
};
pub use service::EscrowLedger;

/// Re-exported so callers can build amounts without a direct dependency.
pub use primitive_types::U256;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
