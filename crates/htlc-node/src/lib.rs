//! # HTLC Node
//!
//! Wires the escrow ledger to in-process adapters.
//!
//! ```text
//! InstrumentedLedger ──rejections──→ htlc_errors_total
//!      │
//! EscrowLedger ──transfer/transfer_from──→ InMemoryTokenCustodian
//!      │
//!      └──EscrowEvent──→ MetricsPublisher ──→ BroadcastEventPublisher ──→ subscribers
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use escrow_telemetry::{InstrumentedLedger, MetricsPublisher};
use htlc_escrow::{
    create_hash_lock, generate_random_preimage, Address, BroadcastEventPublisher, EscrowApi,
    EscrowConfig, EscrowEvent, EscrowLedger, InMemoryTokenCustodian, Lock, TimeSource,
    TokenCustodian, U256,
};
use tokio::sync::broadcast;
use tracing::info;

/// Token used by the scripted swap.
pub const DEMO_TOKEN: Address = [0x70; 20];
/// Locking party of the scripted swap.
pub const DEMO_SENDER: Address = [0xA1; 20];
/// Claiming party of the scripted swap.
pub const DEMO_RECEIVER: Address = [0xB0; 20];

/// Ledger plus the adapters it was built with.
pub struct EscrowNode {
    /// The escrow ledger, counting every rejected operation.
    pub ledger: Arc<InstrumentedLedger<EscrowLedger>>,
    /// Token custody backing the ledger.
    pub custodian: Arc<InMemoryTokenCustodian>,
    /// Event sink, counted then broadcast.
    pub events: Arc<MetricsPublisher<BroadcastEventPublisher>>,
}

impl EscrowNode {
    /// Build a node from configuration and a clock.
    pub fn new(config: EscrowConfig, clock: Arc<dyn TimeSource>) -> Result<Self> {
        let custodian = Arc::new(InMemoryTokenCustodian::new());
        let events = Arc::new(MetricsPublisher::new(
            BroadcastEventPublisher::with_capacity(config.event_capacity),
        ));

        let ledger = EscrowLedger::new(config, custodian.clone(), clock, events.clone())
            .context("invalid escrow configuration")?;

        Ok(Self {
            ledger: Arc::new(InstrumentedLedger::new(ledger)),
            custodian,
            events,
        })
    }

    /// Subscribe to ledger events.
    pub fn subscribe(&self) -> broadcast::Receiver<EscrowEvent> {
        self.events.inner().subscribe()
    }

    /// Balance of `account` in `token`.
    pub async fn balance(&self, token: Address, account: Address) -> Result<U256> {
        Ok(self.custodian.balance_of(token, account).await?)
    }
}

/// Outcome of the scripted swap.
#[derive(Debug)]
pub struct DemoReport {
    /// Lock paid to the receiver.
    pub claimed: Lock,
    /// Lock refunded to the sender.
    pub refunded: Lock,
}

/// Fund the demo sender, then run one claim path and one instant-refund path.
pub async fn run_demo_swap(node: &EscrowNode, now: u64) -> Result<DemoReport> {
    let escrow = node.ledger.escrow_address();
    node.custodian
        .mint(DEMO_TOKEN, DEMO_SENDER, U256::from(100))
        .context("mint demo tokens")?;
    node.custodian
        .approve(DEMO_TOKEN, DEMO_SENDER, escrow, U256::from(100))
        .await
        .context("approve escrow")?;

    // Claim path: receiver reveals the pre-image before the deadline.
    let pre_image = generate_random_preimage();
    let hash_value = create_hash_lock(pre_image.as_bytes());
    node.ledger
        .lock(
            DEMO_SENDER,
            hash_value,
            now + 3600,
            U256::from(10),
            DEMO_TOKEN,
            DEMO_RECEIVER,
        )
        .await
        .context("lock for claim")?;

    if let Err(e) = node.ledger.claim(DEMO_RECEIVER, b"wrong guess").await {
        info!(error = %e, "Wrong pre-image rejected");
    }

    let claimed = node
        .ledger
        .claim(DEMO_RECEIVER, pre_image.as_bytes())
        .await
        .context("claim")?;

    // Refund path: a deadline already in the past is only unlockable.
    let refund_hash = create_hash_lock(generate_random_preimage().as_bytes());
    node.ledger
        .lock(
            DEMO_SENDER,
            refund_hash,
            now,
            U256::from(5),
            DEMO_TOKEN,
            DEMO_RECEIVER,
        )
        .await
        .context("lock for refund")?;
    let refunded = node
        .ledger
        .unlock(DEMO_SENDER, refund_hash)
        .await
        .context("unlock")?;

    let receiver_balance = node.balance(DEMO_TOKEN, DEMO_RECEIVER).await?;
    let sender_balance = node.balance(DEMO_TOKEN, DEMO_SENDER).await?;
    let escrow_balance = node.balance(DEMO_TOKEN, escrow).await?;
    info!(
        receiver_balance = %receiver_balance,
        sender_balance = %sender_balance,
        escrow_balance = %escrow_balance,
        "Demo swap finished"
    );

    Ok(DemoReport { claimed, refunded })
}
