//! # Escrow Ledger Service
//!
//! Application service that implements the `EscrowApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`EscrowApi`)
//! - Moves custody through the outbound `TokenCustodian`
//! - Reads the outbound `TimeSource` exactly once per operation
//! - Reports committed transitions to the outbound `EscrowEventPublisher`
//!
//! ## Re-entrancy
//!
//! The record map sits behind one mutex that is never held across a
//! custodian call. Instead, a slot is flagged `Funding` or `Settling` before
//! the call goes out. A flagged slot is invisible to `claim`, `unlock` and
//! the queries, yet still occupies its key for `lock`. A custodian that
//! calls back into the ledger mid-transfer therefore finds nothing to claim
//! or unlock and cannot re-lock the hash.
//!
//! ## Cancellation
//!
//! Every flagged slot is owned by a `SlotGuard` until commit. If the
//! custodian fails, or the operation's future is dropped mid-transfer, the
//! guard removes a `Funding` slot and returns a `Settling` slot to `Active`.
//!
//! ## Event order
//!
//! `Locked` is published while the slot is still `Funding`, and
//! `Claimed`/`Unlocked` while it is still `Settling`. No other task can
//! settle or re-lock the hash until the event is out.

use crate::algorithms::{create_hash_lock, verify_claim, verify_unlock};
use crate::domain::{
    invariant_nonzero_amount, Address, ConfigError, EscrowConfig, EscrowError, EscrowEvent, Hash,
    Lock, LockParams, LockSlot, LockStatus, Settlement, Timestamp,
};
use crate::ports::inbound::EscrowApi;
use crate::ports::outbound::{EscrowEventPublisher, TimeSource, TokenCustodian};
use async_trait::async_trait;
use parking_lot::Mutex;
use primitive_types::U256;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

type LockMap = Mutex<HashMap<Hash, LockSlot>>;

/// Rolls back a flagged slot unless disarmed at commit.
struct SlotGuard<'a> {
    locks: &'a LockMap,
    hash_value: Hash,
    armed: bool,
}

impl<'a> SlotGuard<'a> {
    fn new(locks: &'a LockMap, hash_value: Hash) -> Self {
        Self {
            locks,
            hash_value,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut locks = self.locks.lock();
        let status = locks.get(&self.hash_value).map(|slot| slot.status);
        match status {
            Some(LockStatus::Funding) => {
                locks.remove(&self.hash_value);
            }
            Some(LockStatus::Settling) => {
                if let Some(slot) = locks.get_mut(&self.hash_value) {
                    slot.status = LockStatus::Active;
                }
            }
            _ => return,
        }
        debug!(
            subsystem = "htlc",
            hash = %hex::encode(self.hash_value),
            from = ?status,
            "[htlc] Slot rolled back"
        );
    }
}

/// Escrow ledger: owns every lock record and the custody account's claims on them.
pub struct EscrowLedger {
    config: EscrowConfig,
    locks: LockMap,
    custodian: Arc<dyn TokenCustodian>,
    clock: Arc<dyn TimeSource>,
    publisher: Arc<dyn EscrowEventPublisher>,
}

impl EscrowLedger {
    /// Create a ledger. Fails if the configuration is unusable.
    pub fn new(
        config: EscrowConfig,
        custodian: Arc<dyn TokenCustodian>,
        clock: Arc<dyn TimeSource>,
        publisher: Arc<dyn EscrowEventPublisher>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            subsystem = "htlc",
            escrow_account = %hex::encode(config.escrow_account),
            "[htlc] Escrow ledger ready"
        );
        Ok(Self {
            config,
            locks: Mutex::new(HashMap::new()),
            custodian,
            clock,
            publisher,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EscrowConfig {
        &self.config
    }

    /// Snapshot of every active lock, in no particular order.
    pub fn active_locks(&self) -> Vec<Lock> {
        self.locks
            .lock()
            .values()
            .filter(|slot| slot.status.is_active())
            .map(|slot| slot.lock.clone())
            .collect()
    }

    /// Move an active slot to `Settling` if `check` accepts it.
    fn begin_settlement<F>(
        &self,
        hash_value: &Hash,
        check: F,
    ) -> Result<(Lock, SlotGuard<'_>), EscrowError>
    where
        F: FnOnce(&Lock) -> Result<(), EscrowError>,
    {
        let mut locks = self.locks.lock();
        let slot = locks
            .get_mut(hash_value)
            .filter(|slot| slot.status.is_active())
            .ok_or(EscrowError::NoMatchingLock)?;

        check(&slot.lock)?;

        debug_assert!(slot.status.can_transition_to(LockStatus::Settling));
        slot.status = LockStatus::Settling;
        Ok((
            slot.lock.clone(),
            SlotGuard::new(&self.locks, *hash_value),
        ))
    }

    /// Push the escrowed amount to `payee` and retire the slot.
    ///
    /// On payout failure the guard puts the slot back to `Active` untouched.
    async fn settle(
        &self,
        record: Lock,
        guard: SlotGuard<'_>,
        payee: Address,
        settlement: Settlement,
    ) -> Result<Lock, EscrowError> {
        let transfer = self
            .custodian
            .transfer(record.token, self.config.escrow_account, payee, record.amount)
            .await;

        if let Err(e) = transfer {
            warn!(
                subsystem = "htlc",
                hash = %hex::encode(record.hash_value),
                settlement = ?settlement,
                error = %e,
                "[htlc] Payout failed"
            );
            return Err(e.into());
        }

        let event = match settlement {
            Settlement::Claimed => EscrowEvent::claimed(&record),
            Settlement::Unlocked => EscrowEvent::unlocked(&record),
        };
        self.emit(event);

        self.locks.lock().remove(&record.hash_value);
        guard.disarm();

        info!(
            subsystem = "htlc",
            hash = %hex::encode(record.hash_value),
            settlement = ?settlement,
            amount = %record.amount,
            "[htlc] Lock settled"
        );
        Ok(record)
    }

    fn set_status(&self, hash_value: &Hash, next: LockStatus) {
        if let Some(slot) = self.locks.lock().get_mut(hash_value) {
            debug_assert!(slot.status.can_transition_to(next));
            slot.status = next;
        }
    }

    /// Publishing never undoes custody; failures are only logged.
    fn emit(&self, event: EscrowEvent) {
        let name = event.name();
        if let Err(e) = self.publisher.publish(event) {
            debug!(
                subsystem = "htlc",
                event = name,
                error = %e,
                "[htlc] Event not delivered"
            );
        }
    }
}

#[async_trait]
impl EscrowApi for EscrowLedger {
    async fn lock(
        &self,
        caller: Address,
        hash_value: Hash,
        unlock_time: Timestamp,
        amount: U256,
        token: Address,
        receiver: Address,
    ) -> Result<Lock, EscrowError> {
        let now = self.clock.now();
        invariant_nonzero_amount(amount)?;

        let record = Lock::new(LockParams {
            hash_value,
            unlock_time,
            amount,
            token,
            sender: caller,
            receiver,
            created_at: now,
        });

        {
            let mut locks = self.locks.lock();
            if locks.contains_key(&hash_value) {
                return Err(EscrowError::DuplicateHash);
            }
            locks.insert(hash_value, LockSlot::funding(record.clone()));
        }
        let guard = SlotGuard::new(&self.locks, hash_value);

        let escrow = self.config.escrow_account;
        let pulled = self
            .custodian
            .transfer_from(token, escrow, caller, escrow, amount)
            .await;

        if let Err(e) = pulled {
            debug!(
                subsystem = "htlc",
                hash = %hex::encode(hash_value),
                error = %e,
                "[htlc] Lock rejected by custodian"
            );
            return Err(e.into());
        }

        if self.config.warn_on_past_deadline && record.was_born_expired() {
            warn!(
                subsystem = "htlc",
                hash = %hex::encode(hash_value),
                unlock_time,
                now,
                "[htlc] Lock created with a deadline not after now; it can only be unlocked"
            );
        }

        self.emit(EscrowEvent::locked(&record));
        self.set_status(&hash_value, LockStatus::Active);
        guard.disarm();

        info!(
            subsystem = "htlc",
            hash = %hex::encode(hash_value),
            amount = %amount,
            unlock_time,
            "[htlc] Locked"
        );
        Ok(record)
    }

    async fn claim(&self, caller: Address, pre_image: &[u8]) -> Result<Lock, EscrowError> {
        let now = self.clock.now();
        let hash_value = create_hash_lock(pre_image);

        let (record, guard) =
            self.begin_settlement(&hash_value, |lock| verify_claim(lock, &caller, now))?;
        let receiver = record.receiver;
        self.settle(record, guard, receiver, Settlement::Claimed).await
    }

    async fn unlock(&self, caller: Address, hash_value: Hash) -> Result<Lock, EscrowError> {
        let now = self.clock.now();

        let (record, guard) =
            self.begin_settlement(&hash_value, |lock| verify_unlock(lock, &caller, now))?;
        let sender = record.sender;
        self.settle(record, guard, sender, Settlement::Unlocked).await
    }

    fn get_lock(&self, hash_value: &Hash) -> Option<Lock> {
        self.locks
            .lock()
            .get(hash_value)
            .filter(|slot| slot.status.is_active())
            .map(|slot| slot.lock.clone())
    }

    fn is_active(&self, hash_value: &Hash) -> bool {
        self.get_lock(hash_value).is_some()
    }

    fn active_lock_count(&self) -> usize {
        self.locks
            .lock()
            .values()
            .filter(|slot| slot.status.is_active())
            .count()
    }

    fn escrow_address(&self) -> Address {
        self.config.escrow_account
    }
}
