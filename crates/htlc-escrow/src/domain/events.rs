//! # Escrow Events
//!
//! Observable outcomes of successful ledger operations, for indexers.

use super::entities::Lock;
use super::errors::{Address, Hash};
use super::value_objects::Timestamp;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Event emitted after a committed ledger transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EscrowEvent {
    /// Tokens pulled into escrow.
    Locked {
        /// Hashlock.
        hash: Hash,
        /// Locking account.
        sender: Address,
        /// Intended receiver.
        receiver: Address,
        /// Escrowed token.
        token: Address,
        /// Escrowed amount.
        amount: U256,
        /// Deadline.
        unlock_time: Timestamp,
    },
    /// Receiver paid out with the pre-image.
    Claimed {
        /// Hashlock.
        hash: Hash,
        /// Paid account.
        receiver: Address,
        /// Paid amount.
        amount: U256,
    },
    /// Sender refunded after the deadline.
    Unlocked {
        /// Hashlock.
        hash: Hash,
        /// Refunded account.
        sender: Address,
        /// Refunded amount.
        amount: U256,
    },
}

impl EscrowEvent {
    /// Build a `Locked` event from a record.
    pub fn locked(lock: &Lock) -> Self {
        Self::Locked {
            hash: lock.hash_value,
            sender: lock.sender,
            receiver: lock.receiver,
            token: lock.token,
            amount: lock.amount,
            unlock_time: lock.unlock_time,
        }
    }

    /// Build a `Claimed` event from a record.
    pub fn claimed(lock: &Lock) -> Self {
        Self::Claimed {
            hash: lock.hash_value,
            receiver: lock.receiver,
            amount: lock.amount,
        }
    }

    /// Build an `Unlocked` event from a record.
    pub fn unlocked(lock: &Lock) -> Self {
        Self::Unlocked {
            hash: lock.hash_value,
            sender: lock.sender,
            amount: lock.amount,
        }
    }

    /// Hashlock the event refers to.
    pub fn hash(&self) -> &Hash {
        match self {
            Self::Locked { hash, .. } | Self::Claimed { hash, .. } | Self::Unlocked { hash, .. } => {
                hash
            }
        }
    }

    /// Short event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Locked { .. } => "Locked",
            Self::Claimed { .. } => "Claimed",
            Self::Unlocked { .. } => "Unlocked",
        }
    }
}
