//! Prometheus metrics for the escrow ledger.
//!
//! All metrics follow the naming convention: `htlc_<metric>_<unit>`

use async_trait::async_trait;
use htlc_escrow::{
    Address, EscrowApi, EscrowError, EscrowEvent, EscrowEventPublisher, Hash, Lock, PublishError,
    Timestamp, U256,
};
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Locks created
    pub static ref LOCKS_CREATED: IntCounter = IntCounter::new(
        "htlc_locks_created_total",
        "Total number of locks created"
    ).expect("metric creation failed");

    /// Locks claimed by their receiver
    pub static ref LOCKS_CLAIMED: IntCounter = IntCounter::new(
        "htlc_locks_claimed_total",
        "Total number of locks claimed with a pre-image"
    ).expect("metric creation failed");

    /// Locks unlocked by their sender
    pub static ref LOCKS_UNLOCKED: IntCounter = IntCounter::new(
        "htlc_locks_unlocked_total",
        "Total number of locks refunded after the deadline"
    ).expect("metric creation failed");

    /// Locks currently holding funds
    pub static ref ACTIVE_LOCKS: IntGauge = IntGauge::new(
        "htlc_active_locks",
        "Number of locks currently in escrow"
    ).expect("metric creation failed");

    /// Rejected operations by reason
    pub static ref ESCROW_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("htlc_errors_total", "Rejected ledger operations"),
        &["kind"]
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(LOCKS_CREATED.clone()),
        Box::new(LOCKS_CLAIMED.clone()),
        Box::new(LOCKS_UNLOCKED.clone()),
        Box::new(ACTIVE_LOCKS.clone()),
        Box::new(ESCROW_ERRORS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Metric label for a rejected operation.
pub fn error_kind(error: &EscrowError) -> &'static str {
    match error {
        EscrowError::ZeroAmount => "zero_amount",
        EscrowError::DuplicateHash => "duplicate_hash",
        EscrowError::TransferFailed(_) => "transfer_failed",
        EscrowError::NoMatchingLock => "no_matching_lock",
        EscrowError::NotReceiver => "not_receiver",
        EscrowError::NotSender => "not_sender",
        EscrowError::PastDeadline => "past_deadline",
        EscrowError::BeforeDeadline => "before_deadline",
    }
}

/// Count a rejected operation.
pub fn record_error(error: &EscrowError) {
    ESCROW_ERRORS.with_label_values(&[error_kind(error)]).inc();
}

/// Publisher decorator that counts events before forwarding them.
pub struct MetricsPublisher<P: EscrowEventPublisher> {
    inner: P,
}

impl<P: EscrowEventPublisher> MetricsPublisher<P> {
    /// Wrap `inner`.
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    /// The wrapped publisher.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: EscrowEventPublisher> EscrowEventPublisher for MetricsPublisher<P> {
    fn publish(&self, event: EscrowEvent) -> Result<(), PublishError> {
        match &event {
            EscrowEvent::Locked { .. } => {
                LOCKS_CREATED.inc();
                ACTIVE_LOCKS.inc();
            }
            EscrowEvent::Claimed { .. } => {
                LOCKS_CLAIMED.inc();
                ACTIVE_LOCKS.dec();
            }
            EscrowEvent::Unlocked { .. } => {
                LOCKS_UNLOCKED.inc();
                ACTIVE_LOCKS.dec();
            }
        }
        self.inner.publish(event)
    }
}

/// `EscrowApi` decorator that counts every rejected operation.
pub struct InstrumentedLedger<L: EscrowApi> {
    inner: L,
}

impl<L: EscrowApi> InstrumentedLedger<L> {
    /// Wrap `inner`.
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    /// The wrapped ledger.
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

fn counted(result: Result<Lock, EscrowError>) -> Result<Lock, EscrowError> {
    if let Err(e) = &result {
        record_error(e);
    }
    result
}

#[async_trait]
impl<L: EscrowApi> EscrowApi for InstrumentedLedger<L> {
    async fn lock(
        &self,
        caller: Address,
        hash_value: Hash,
        unlock_time: Timestamp,
        amount: U256,
        token: Address,
        receiver: Address,
    ) -> Result<Lock, EscrowError> {
        counted(
            self.inner
                .lock(caller, hash_value, unlock_time, amount, token, receiver)
                .await,
        )
    }

    async fn claim(&self, caller: Address, pre_image: &[u8]) -> Result<Lock, EscrowError> {
        counted(self.inner.claim(caller, pre_image).await)
    }

    async fn unlock(&self, caller: Address, hash_value: Hash) -> Result<Lock, EscrowError> {
        counted(self.inner.unlock(caller, hash_value).await)
    }

    fn get_lock(&self, hash_value: &Hash) -> Option<Lock> {
        self.inner.get_lock(hash_value)
    }

    fn is_active(&self, hash_value: &Hash) -> bool {
        self.inner.is_active(hash_value)
    }

    fn active_lock_count(&self) -> usize {
        self.inner.active_lock_count()
    }

    fn escrow_address(&self) -> Address {
        self.inner.escrow_address()
    }
}
