//! # HTLC Node
//!
//! Startup sequence:
//!
//! 1. Load telemetry and escrow configuration from the environment
//! 2. Install logging and register metrics
//! 3. Wire the ledger to its adapters
//! 4. Run the scripted swap and print the metrics

use std::sync::Arc;

use anyhow::{Context, Result};
use escrow_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use htlc_escrow::{EscrowConfig, SystemTimeSource, TimeSource};
use htlc_node::{run_demo_swap, EscrowNode};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config = EscrowConfig::from_env().context("load escrow configuration")?;
    let clock: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
    let now = clock.now();

    let node = EscrowNode::new(config, clock)?;
    let report = run_demo_swap(&node, now).await?;

    info!(
        claimed = %hex::encode(report.claimed.hash_value),
        refunded = %hex::encode(report.refunded.hash_value),
        "Scripted swap complete"
    );

    println!("{}", encode_metrics()?);
    Ok(())
}
