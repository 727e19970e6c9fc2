//! snatmgrd - Gateway Source-NAT Configuration Manager Daemon
//!
//! Entry point for the snatmgrd daemon.

use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Initializes tracing/logging subsystem
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    info!("--- Starting snatmgrd ---");

    // TODO: construct SnatMgr with the controller session client once
    // the transport crate lands, then drain the GATEWAY_SNAT and
    // GATEWAY_SNAT_POLICY tables into do_snat_task / do_policy_task

    info!("snatmgrd initialization complete (placeholder mode)");
    info!("Full implementation pending controller transport integration");

    ExitCode::SUCCESS
}
