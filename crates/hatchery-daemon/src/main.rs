// Copyright (c) 2026 Hatchery Contributors
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hatchery_core::typed_data::Eip712Domain;
use hatchery_daemon::config::EngineConfig;
use hatchery_daemon::ledger::JsonRpcLedger;
use hatchery_daemon::server::{self, AppState};
use hatchery_daemon::signer::AuthorizationSigner;
use hatchery_daemon::telemetry::Telemetry;

#[derive(Debug, Parser)]
#[command(name = "hatchery-daemon")]
#[command(about = "Hatchery claim authorization and metadata daemon")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:8787")]
    listen: String,

    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(args.log))
        .init();

    // Misconfiguration is fatal here, before the listener binds; it must
    // never surface as a per-request failure.
    let config = EngineConfig::from_env()?;

    let ledger = Arc::new(JsonRpcLedger::new(
        config.rpc_url.clone(),
        config.verifying_contract,
        config.ledger_timeout,
    ));
    let domain = Eip712Domain::new(config.chain_id, config.verifying_contract);
    let signer = Arc::new(AuthorizationSigner::new(config.signer_key.clone(), domain));
    let state = AppState::new(ledger, Arc::clone(&signer), Telemetry::new());

    let addr: SocketAddr = args.listen.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        chain_id = config.chain_id,
        verifying_contract = %config.verifying_contract,
        signer = %signer.address(),
        "starting hatchery daemon"
    );

    server::serve(listener, state, shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
    }
}
