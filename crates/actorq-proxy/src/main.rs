// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! actorq Proxy
//!
//! Standalone message-routing Proxy: forwards publish/subscribe traffic
//! between actors that cannot reach each other directly, and answers
//! liveness probes on its control port.
//!
//! # Usage
//!
//! ```bash
//! # Start on the default port (7771/7772/7773)
//! actorq-proxy
//!
//! # Custom port and config file
//! actorq-proxy --pub-port 7781 --config proxy.json
//! ```

use actorq::address::ProxyAddress;
use actorq::server::ProxyServer;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;
pub use config::ProxyConfig;

/// actorq Proxy - forwards publish/subscribe traffic between actors.
#[derive(Parser, Debug)]
#[command(name = "actorq-proxy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to advertise and bind on.
    #[arg(long)]
    host: Option<String>,

    /// Publish-facing port (subscribe = pub+1, control = pub+2).
    #[arg(short, long)]
    pub_port: Option<u16>,

    /// Configuration file (JSON format).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides the config
    /// file's `log_level` if both are set.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = if let Some(path) = &args.config {
        ProxyConfig::from_file(path)?
    } else {
        ProxyConfig::default()
    }
    .apply_env();

    let log_level = args.log_level.as_deref().unwrap_or(&config.log_level);
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(path) = &args.config {
        info!("Loading config from {:?}", path);
    }

    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(pub_port) = args.pub_port {
        config.pub_port = pub_port;
    }

    let address = ProxyAddress::new(config.host.clone(), config.pub_port);

    info!("+----------------------------------------------------+");
    info!(
        "|       actorq Proxy v{}                         |",
        env!("CARGO_PKG_VERSION")
    );
    info!("+----------------------------------------------------+");
    info!("|  Pub:     {:40} |", address.pub_endpoint());
    info!("|  Sub:     {:40} |", address.sub_endpoint());
    info!("|  Control: {:40} |", address.control_endpoint());
    info!("+----------------------------------------------------+");

    let server = ProxyServer::start(address)?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping proxy...");
    server.stop();

    info!("Proxy stopped");
    Ok(())
}
