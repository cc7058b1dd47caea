//! # Escrow Telemetry
//!
//! Observability for the HTLC escrow ledger.
//!
//! ## Components
//!
//! - Structured logging via `tracing-subscriber` (pretty or JSON)
//! - Prometheus counters for lock lifecycle and rejected operations
//! - `InstrumentedLedger`, an `EscrowApi` decorator counting every rejection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use escrow_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HTLC_SERVICE_NAME` | `htlc-escrow` | Service name in logs |
//! | `HTLC_LOG_LEVEL` | `info` | Log level filter |
//! | `HTLC_JSON_LOGS` | `false` | JSON formatted logs |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};
pub use metrics::{
    encode_metrics, error_kind, record_error, register_metrics, InstrumentedLedger,
    MetricsHandle, MetricsPublisher, ACTIVE_LOCKS, ESCROW_ERRORS, LOCKS_CLAIMED, LOCKS_CREATED,
    LOCKS_UNLOCKED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metrics could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    init_logging(&config)?;

    Ok(TelemetryGuard {
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
