//! # Domain Errors
//!
//! Error types for the escrow ledger and its token collaborator.
//!
//! Every variant is a caller-correctable precondition violation. None of
//! them leave partial state behind.

use thiserror::Error;

/// Hash type (32-byte SHA-256 digest).
pub type Hash = [u8; 32];

/// Account or token address (20-byte).
pub type Address = [u8; 20];

/// Errors surfaced by the token custodian.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Owner has not approved enough for the spender.
    #[error("ERC20: insufficient allowance")]
    InsufficientAllowance,

    /// Source account cannot cover the amount.
    #[error("ERC20: transfer amount exceeds balance")]
    InsufficientBalance,

    /// Token is unknown to the custodian.
    #[error("ERC20: unknown token {}", hex::encode(.0))]
    UnknownToken(Address),

    /// Balance would overflow U256.
    #[error("ERC20: balance overflow")]
    Overflow,
}

/// Escrow ledger errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EscrowError {
    /// Lock attempted with a zero amount.
    #[error("HTLC: cannot lock zero tokens")]
    ZeroAmount,

    /// A record already occupies this hash value.
    #[error("HTLC: lock cannot already exist for the same hash value")]
    DuplicateHash,

    /// The custodian rejected the underlying token movement.
    #[error("{0}")]
    TransferFailed(#[from] TokenError),

    /// No active lock for the (computed) hash.
    #[error("HTLC: not a valid pre-image for any hash")]
    NoMatchingLock,

    /// Caller is not the lock's receiver.
    #[error("HTLC: only the receiver can claim")]
    NotReceiver,

    /// Caller is not the lock's sender.
    #[error("HTLC: only the sender can unlock")]
    NotSender,

    /// Claim attempted at or after the unlock time.
    #[error("HTLC: can only claim before the unlock time")]
    PastDeadline,

    /// Unlock attempted before the unlock time.
    #[error("HTLC: can only unlock on or after the unlock time")]
    BeforeDeadline,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Escrow custody account is the zero address.
    #[error("Escrow account must not be the zero address")]
    ZeroEscrowAccount,

    /// Event channel capacity must be positive.
    #[error("Event channel capacity must be greater than zero")]
    ZeroEventCapacity,

    /// Environment variable could not be parsed.
    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Parse failure
        reason: String,
    },
}
