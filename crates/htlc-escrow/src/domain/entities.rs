//! # Domain Entities
//!
//! The `Lock` record and ledger configuration.

use super::errors::{Address, ConfigError, Hash};
use super::value_objects::{LockStatus, Timestamp};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::env;

/// Default custody account of the escrow.
pub const DEFAULT_ESCROW_ACCOUNT: Address = [0xE5; 20];

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Tokens held in escrow under a hash commitment and a deadline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    /// Hashlock: SHA-256 of the pre-image. Primary key.
    pub hash_value: Hash,
    /// Claim is allowed strictly before, unlock at or after.
    pub unlock_time: Timestamp,
    /// Amount escrowed. Always non-zero.
    pub amount: U256,
    /// Escrowed token.
    pub token: Address,
    /// Party entitled to reclaim after the deadline.
    pub sender: Address,
    /// Party entitled to claim before the deadline.
    pub receiver: Address,
    /// Clock reading when the lock was created.
    pub created_at: Timestamp,
}

/// Parameters for creating a lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockParams {
    /// Hashlock.
    pub hash_value: Hash,
    /// Deadline.
    pub unlock_time: Timestamp,
    /// Amount to escrow.
    pub amount: U256,
    /// Escrowed token.
    pub token: Address,
    /// Locking caller.
    pub sender: Address,
    /// Intended receiver.
    pub receiver: Address,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

impl Lock {
    /// Create a new lock.
    pub fn new(params: LockParams) -> Self {
        Self {
            hash_value: params.hash_value,
            unlock_time: params.unlock_time,
            amount: params.amount,
            token: params.token,
            sender: params.sender,
            receiver: params.receiver,
            created_at: params.created_at,
        }
    }

    /// Claim window is `[created_at, unlock_time)`.
    pub fn is_claimable_at(&self, now: Timestamp) -> bool {
        now < self.unlock_time
    }

    /// Unlock window is `[unlock_time, ∞)`.
    pub fn is_unlockable_at(&self, now: Timestamp) -> bool {
        now >= self.unlock_time
    }

    /// Deadline already passed when the lock was created.
    pub fn was_born_expired(&self) -> bool {
        self.unlock_time <= self.created_at
    }
}

/// A record in the ledger map together with its lifecycle flag.
#[derive(Clone, Debug)]
pub(crate) struct LockSlot {
    pub(crate) lock: Lock,
    pub(crate) status: LockStatus,
}

impl LockSlot {
    pub(crate) fn funding(lock: Lock) -> Self {
        Self {
            lock,
            status: LockStatus::Funding,
        }
    }
}

/// Escrow ledger configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// Account that holds escrowed tokens and spends sender allowances.
    pub escrow_account: Address,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Log a warning when a lock is created with a deadline not in the future.
    pub warn_on_past_deadline: bool,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            escrow_account: DEFAULT_ESCROW_ACCOUNT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            warn_on_past_deadline: true,
        }
    }
}

impl EscrowConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HTLC_ESCROW_ACCOUNT`: 20-byte hex custody account, optional `0x` prefix
    /// - `HTLC_EVENT_CAPACITY`: event channel capacity (default: 1024)
    /// - `HTLC_WARN_PAST_DEADLINE`: warn on past deadlines at lock time (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("HTLC_ESCROW_ACCOUNT") {
            config.escrow_account = parse_address(&raw).map_err(|reason| {
                ConfigError::InvalidEnv {
                    var: "HTLC_ESCROW_ACCOUNT",
                    reason,
                }
            })?;
        }

        if let Ok(raw) = env::var("HTLC_EVENT_CAPACITY") {
            config.event_capacity = raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    var: "HTLC_EVENT_CAPACITY",
                    reason: e.to_string(),
                }
            })?;
        }

        if let Ok(raw) = env::var("HTLC_WARN_PAST_DEADLINE") {
            config.warn_on_past_deadline = raw.to_lowercase() != "false" && raw != "0";
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the ledger cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.escrow_account == [0u8; 20] {
            return Err(ConfigError::ZeroEscrowAccount);
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        Ok(())
    }
}

/// Parse a 20-byte hex address, with or without `0x`.
pub fn parse_address(raw: &str) -> Result<Address, String> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| e.to_string())?;
    if bytes.len() != 20 {
        return Err(format!("expected 20 bytes, got {}", bytes.len()));
    }
    let mut address = [0u8; 20];
    address.copy_from_slice(&bytes);
    Ok(address)
}
