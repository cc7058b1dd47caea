//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for token custody and event delivery.

mod event_publisher;
mod token_custodian;

pub use event_publisher::{
    BroadcastEventPublisher, NoOpPublisher, RecordingPublisher, TracingEventPublisher,
};
pub use token_custodian::InMemoryTokenCustodian;
