//! Shared ledger harness.
//!
//! Every harness funds `ALICE` with [`INITIAL_BALANCE`] of [`TOKEN`] and has
//! both `ALICE` and `BOB` approve the escrow account for the same amount.

use htlc_escrow::{
    Address, BroadcastEventPublisher, EscrowConfig, EscrowEvent, EscrowLedger,
    InMemoryTokenCustodian, MockTimeSource, Timestamp, TokenCustodian, U256,
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Token used throughout the suite.
pub const TOKEN: Address = [0x70u8; 20];
/// Funded sender.
pub const ALICE: Address = [0xA1u8; 20];
/// Receiver.
pub const BOB: Address = [0xB0u8; 20];
/// Bystander with no role in any lock.
pub const CAROL: Address = [0xC4u8; 20];
/// Clock start for every harness.
pub const START: Timestamp = 1_700_000_000;
/// One year in seconds.
pub const ONE_YEAR: u64 = 365 * 24 * 60 * 60;
/// Amount minted to `ALICE`.
pub const INITIAL_BALANCE: u64 = 100;

/// Ledger wired to in-memory adapters.
pub struct Harness {
    pub ledger: Arc<EscrowLedger>,
    pub token: Arc<InMemoryTokenCustodian>,
    pub clock: Arc<MockTimeSource>,
    pub events: Arc<BroadcastEventPublisher>,
}

impl Harness {
    /// Default configuration, default custodian.
    pub async fn new() -> Self {
        Self::with_custodian(Arc::new(InMemoryTokenCustodian::new()), |token| {
            token as Arc<dyn TokenCustodian>
        })
        .await
    }

    /// Build around `token`, letting `wrap` put a decorator in front of it.
    pub async fn with_custodian<F>(token: Arc<InMemoryTokenCustodian>, wrap: F) -> Self
    where
        F: FnOnce(Arc<InMemoryTokenCustodian>) -> Arc<dyn TokenCustodian>,
    {
        let config = EscrowConfig::default();
        let escrow = config.escrow_account;
        let clock = Arc::new(MockTimeSource::new(START));
        let events = Arc::new(BroadcastEventPublisher::with_capacity(config.event_capacity));

        token
            .mint(TOKEN, ALICE, U256::from(INITIAL_BALANCE))
            .expect("mint");
        for owner in [ALICE, BOB] {
            token
                .approve(TOKEN, owner, escrow, U256::from(INITIAL_BALANCE))
                .await
                .expect("approve");
        }

        let custodian = wrap(token.clone());
        let ledger = EscrowLedger::new(config, custodian, clock.clone(), events.clone())
            .expect("default config is valid");

        Self {
            ledger: Arc::new(ledger),
            token,
            clock,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EscrowEvent> {
        self.events.subscribe()
    }

    pub async fn balance(&self, account: Address) -> U256 {
        self.token.balance_of(TOKEN, account).await.expect("balance")
    }

    pub fn escrow(&self) -> Address {
        self.ledger.config().escrow_account
    }

    /// Escrow balance must equal the sum of active lock amounts.
    pub async fn assert_custody_matches_locks(&self) {
        let locked = self
            .ledger
            .active_locks()
            .iter()
            .filter(|lock| lock.token == TOKEN)
            .fold(U256::zero(), |acc, lock| acc + lock.amount);
        assert_eq!(self.balance(self.escrow()).await, locked);
    }

    /// Balances across every known account must add up to the minted supply.
    pub async fn assert_supply_conserved(&self) {
        let mut total = self.balance(self.escrow()).await;
        for account in [ALICE, BOB, CAROL] {
            total += self.balance(account).await;
        }
        assert_eq!(total, U256::from(INITIAL_BALANCE));
        assert_eq!(
            self.token.total_supply(&TOKEN).expect("supply"),
            U256::from(INITIAL_BALANCE)
        );
    }
}

/// Drain every event currently buffered for `rx`.
pub fn drain(rx: &mut broadcast::Receiver<EscrowEvent>) -> Vec<EscrowEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
