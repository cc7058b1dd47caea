//! Event Publisher Adapters
//!
//! Implements `EscrowEventPublisher` for in-process fan-out, logging and tests.

use crate::domain::EscrowEvent;
use crate::ports::outbound::{EscrowEventPublisher, PublishError};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::info;

/// Fan-out publisher over a `tokio::sync::broadcast` channel.
///
/// Slow subscribers lag and drop the oldest events rather than block the ledger.
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<EscrowEvent>,
}

impl BroadcastEventPublisher {
    /// Create a publisher with the given channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<EscrowEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EscrowEventPublisher for BroadcastEventPublisher {
    fn publish(&self, event: EscrowEvent) -> Result<(), PublishError> {
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|_| PublishError::NoSubscribers)
    }
}

/// Publisher that writes each event to the log as a structured record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl EscrowEventPublisher for TracingEventPublisher {
    fn publish(&self, event: EscrowEvent) -> Result<(), PublishError> {
        let hash = hex::encode(event.hash());
        match &event {
            EscrowEvent::Locked {
                sender,
                receiver,
                token,
                amount,
                unlock_time,
                ..
            } => info!(
                subsystem = "htlc",
                event = "Locked",
                hash = %hash,
                sender = %hex::encode(sender),
                receiver = %hex::encode(receiver),
                token = %hex::encode(token),
                amount = %amount,
                unlock_time = *unlock_time,
                "[htlc] event"
            ),
            EscrowEvent::Claimed {
                receiver, amount, ..
            } => info!(
                subsystem = "htlc",
                event = "Claimed",
                hash = %hash,
                receiver = %hex::encode(receiver),
                amount = %amount,
                "[htlc] event"
            ),
            EscrowEvent::Unlocked { sender, amount, .. } => info!(
                subsystem = "htlc",
                event = "Unlocked",
                hash = %hash,
                sender = %hex::encode(sender),
                amount = %amount,
                "[htlc] event"
            ),
        }
        Ok(())
    }
}

/// Publisher that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPublisher;

impl EscrowEventPublisher for NoOpPublisher {
    fn publish(&self, _event: EscrowEvent) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Publisher that keeps every event in order, for assertions.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<EscrowEvent>>,
}

impl RecordingPublisher {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything published so far.
    pub fn events(&self) -> Vec<EscrowEvent> {
        self.events.lock().clone()
    }

    /// Number of events published so far.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing was published.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EscrowEventPublisher for RecordingPublisher {
    fn publish(&self, event: EscrowEvent) -> Result<(), PublishError> {
        self.events.lock().push(event);
        Ok(())
    }
}
