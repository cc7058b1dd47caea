//! # Outbound Ports
//!
//! Traits for the ledger's collaborators: token custody, clock and event sink.

use crate::domain::{Address, EscrowEvent, Timestamp, TokenError};
use async_trait::async_trait;
use primitive_types::U256;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Fungible-token custody - outbound port.
///
/// Transfer-with-allowance semantics. The ledger is both the `spender`
/// on `transfer_from` and the `from` on `transfer`.
#[async_trait]
pub trait TokenCustodian: Send + Sync {
    /// Allow `spender` to move up to `amount` of `owner`'s tokens.
    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TokenError>;

    /// Move `amount` from `owner` to `recipient`, spending `spender`'s allowance.
    async fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        owner: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `recipient`.
    async fn transfer(
        &self,
        token: Address,
        from: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), TokenError>;

    /// Current balance of `account`.
    async fn balance_of(&self, token: Address, account: Address) -> Result<U256, TokenError>;
}

/// Monotonic clock - outbound port.
pub trait TimeSource: Send + Sync {
    /// Current unix time in seconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Manually driven time source for tests and simulations.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    time: AtomicU64,
}

impl MockTimeSource {
    /// Start the clock at `initial`.
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Move the clock forward by `secs`, saturating at `u64::MAX`.
    pub fn advance(&self, secs: u64) {
        let _ = self
            .time
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(secs))
            });
    }

    /// Move the clock to `time`. Never moves backwards.
    pub fn set(&self, time: Timestamp) {
        self.time.fetch_max(time, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

/// Error type for publish operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// Nobody is listening.
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Event sink - outbound port.
pub trait EscrowEventPublisher: Send + Sync {
    /// Publish a committed event.
    fn publish(&self, event: EscrowEvent) -> Result<(), PublishError>;
}
