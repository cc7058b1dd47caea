//! # Inbound Ports
//!
//! API trait defining what the escrow ledger can do.

use crate::domain::{Address, EscrowError, Hash, Lock, Timestamp};
use async_trait::async_trait;
use primitive_types::U256;

/// Escrow API - inbound port.
///
/// `caller` is the authenticated identity of whoever submits the call. The
/// session layer supplies it; the ledger never infers it.
#[async_trait]
pub trait EscrowApi: Send + Sync {
    /// Pull `amount` of `token` from `caller` into escrow under `hash_value`.
    ///
    /// `caller` must have approved the escrow account beforehand.
    async fn lock(
        &self,
        caller: Address,
        hash_value: Hash,
        unlock_time: Timestamp,
        amount: U256,
        token: Address,
        receiver: Address,
    ) -> Result<Lock, EscrowError>;

    /// Pay the receiver of the lock opened by `pre_image`.
    async fn claim(&self, caller: Address, pre_image: &[u8]) -> Result<Lock, EscrowError>;

    /// Refund the sender of the lock under `hash_value`.
    async fn unlock(&self, caller: Address, hash_value: Hash) -> Result<Lock, EscrowError>;

    /// Snapshot of the active lock under `hash_value`.
    fn get_lock(&self, hash_value: &Hash) -> Option<Lock>;

    /// Whether an active lock exists under `hash_value`.
    fn is_active(&self, hash_value: &Hash) -> bool;

    /// Number of active locks.
    fn active_lock_count(&self) -> usize;

    /// Custody account holding escrowed tokens.
    fn escrow_address(&self) -> Address;
}
