//! # Racing Settlements
//!
//! Many tasks hammer the same lock at once. A slow token widens the window
//! between the ledger's checks and the custody movement.

use async_trait::async_trait;
use htlc_escrow::{Address, InMemoryTokenCustodian, TokenCustodian, TokenError, U256};
use std::sync::Arc;
use std::time::Duration;

/// Token that sleeps before every movement.
pub struct SlowCustodian {
    inner: Arc<InMemoryTokenCustodian>,
    delay: Duration,
}

impl SlowCustodian {
    pub fn new(inner: Arc<InMemoryTokenCustodian>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl TokenCustodian for SlowCustodian {
    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        self.inner.approve(token, owner, spender, amount).await
    }

    async fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        owner: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        tokio::time::sleep(self.delay).await;
        self.inner
            .transfer_from(token, spender, owner, recipient, amount)
            .await
    }

    async fn transfer(
        &self,
        token: Address,
        from: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        tokio::time::sleep(self.delay).await;
        self.inner.transfer(token, from, recipient, amount).await
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256, TokenError> {
        self.inner.balance_of(token, account).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use futures::future::join_all;
    use htlc_escrow::{create_hash_lock, EscrowApi, EscrowError, EscrowEvent};
    use tokio::time::timeout;

    const PRE_IMAGE: [u8; 3] = [0xff, 0xff, 0xff];
    const RACERS: usize = 16;

    async fn slow_harness() -> Harness {
        slow_harness_with(Duration::from_millis(2)).await
    }

    async fn slow_harness_with(delay: Duration) -> Harness {
        let inner = Arc::new(InMemoryTokenCustodian::new());
        Harness::with_custodian(inner, move |inner| {
            Arc::new(SlowCustodian::new(inner, delay)) as Arc<dyn TokenCustodian>
        })
        .await
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_pay_once() {
        let h = slow_harness().await;
        let hash_value = create_hash_lock(&PRE_IMAGE);
        h.ledger
            .lock(ALICE, hash_value, START + 100, U256::from(10), TOKEN, BOB)
            .await
            .unwrap();

        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let ledger = h.ledger.clone();
                tokio::spawn(async move { ledger.claim(BOB, &PRE_IMAGE).await })
            })
            .collect();
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == EscrowError::NoMatchingLock));
        assert_eq!(h.balance(BOB).await, U256::from(10));
        h.assert_supply_conserved().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_unlocks_refund_once() {
        let h = slow_harness().await;
        let hash_value = create_hash_lock(&PRE_IMAGE);
        h.ledger
            .lock(ALICE, hash_value, START, U256::from(10), TOKEN, BOB)
            .await
            .unwrap();

        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let ledger = h.ledger.clone();
                tokio::spawn(async move { ledger.unlock(ALICE, hash_value).await })
            })
            .collect();
        let successes = join_all(handles)
            .await
            .into_iter()
            .filter(|joined| matches!(joined, Ok(Ok(_))))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(h.balance(ALICE).await, U256::from(INITIAL_BALANCE));
        h.assert_supply_conserved().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_locks_on_one_hash_fund_once() {
        let h = slow_harness().await;
        let hash_value = create_hash_lock(&PRE_IMAGE);

        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let ledger = h.ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .lock(ALICE, hash_value, START + 100, U256::from(5), TOKEN, BOB)
                        .await
                })
            })
            .collect();
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == EscrowError::DuplicateHash));
        assert_eq!(h.balance(ALICE).await, U256::from(95));
        h.assert_custody_matches_locks().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_hashes_lock_in_parallel() {
        let h = slow_harness().await;

        let handles: Vec<_> = (0..10u8)
            .map(|i| {
                let ledger = h.ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .lock(
                            ALICE,
                            create_hash_lock(&[i]),
                            START + 100,
                            U256::from(10),
                            TOKEN,
                            BOB,
                        )
                        .await
                })
            })
            .collect();
        for joined in join_all(handles).await {
            joined.unwrap().unwrap();
        }

        assert_eq!(h.ledger.active_lock_count(), 10);
        assert_eq!(h.balance(ALICE).await, U256::zero());
        h.assert_custody_matches_locks().await;
        h.assert_supply_conserved().await;
    }

    // =========================================================================
    // ABANDONED OPERATIONS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_claim_leaves_lock_settleable() {
        let h = slow_harness_with(Duration::from_millis(50)).await;
        let hash_value = create_hash_lock(&PRE_IMAGE);
        h.ledger
            .lock(ALICE, hash_value, START + 100, U256::one(), TOKEN, BOB)
            .await
            .unwrap();

        let abandoned = timeout(Duration::from_millis(5), h.ledger.claim(BOB, &PRE_IMAGE)).await;
        assert!(abandoned.is_err());
        assert!(h.ledger.is_active(&hash_value));
        assert_eq!(
            h.ledger
                .lock(ALICE, hash_value, START + 100, U256::one(), TOKEN, BOB)
                .await,
            Err(EscrowError::DuplicateHash)
        );

        // Past the deadline the sender can still get the funds out.
        h.clock.advance(100);
        h.ledger.unlock(ALICE, hash_value).await.unwrap();
        assert_eq!(h.balance(h.escrow()).await, U256::zero());
        assert_eq!(h.balance(ALICE).await, U256::from(INITIAL_BALANCE));
        h.assert_supply_conserved().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_lock_frees_hash() {
        let h = slow_harness_with(Duration::from_millis(50)).await;
        let hash_value = create_hash_lock(&PRE_IMAGE);

        let abandoned = timeout(
            Duration::from_millis(5),
            h.ledger
                .lock(ALICE, hash_value, START + 100, U256::one(), TOKEN, BOB),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(h.ledger.active_lock_count(), 0);
        assert_eq!(h.balance(ALICE).await, U256::from(INITIAL_BALANCE));

        h.ledger
            .lock(ALICE, hash_value, START + 100, U256::one(), TOKEN, BOB)
            .await
            .unwrap();
        h.ledger.claim(BOB, &PRE_IMAGE).await.unwrap();
        assert_eq!(h.balance(BOB).await, U256::one());
        h.assert_supply_conserved().await;
    }

    // =========================================================================
    // EVENT ORDER
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_locked_always_precedes_claimed() {
        const ROUNDS: u32 = 50;
        let h = Harness::new().await;
        let mut rx = h.subscribe();

        for round in 0..ROUNDS {
            let pre_image = round.to_be_bytes();
            let hash_value = create_hash_lock(&pre_image);

            // The claimer spins until the lock becomes visible.
            let ledger = h.ledger.clone();
            let claimer = tokio::spawn(async move {
                loop {
                    match ledger.claim(BOB, &pre_image).await {
                        Ok(lock) => return lock,
                        Err(EscrowError::NoMatchingLock) => tokio::task::yield_now().await,
                        Err(e) => panic!("unexpected claim error: {e}"),
                    }
                }
            });

            h.ledger
                .lock(ALICE, hash_value, START + 100, U256::one(), TOKEN, BOB)
                .await
                .unwrap();
            timeout(Duration::from_secs(5), claimer)
                .await
                .expect("claimer stalled")
                .unwrap();
        }

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2 * ROUNDS as usize);
        for pair in events.chunks(2) {
            assert!(matches!(pair[0], EscrowEvent::Locked { .. }));
            assert!(matches!(pair[1], EscrowEvent::Claimed { .. }));
            assert_eq!(pair[0].hash(), pair[1].hash());
        }
        h.assert_supply_conserved().await;
    }
}
