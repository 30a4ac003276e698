// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! actorq Registrar
//!
//! Standalone directory service: actors register as publishers/subscribers
//! of a topic here and discover peers by topic prefix.
//!
//! # Usage
//!
//! ```bash
//! # Start on the default port (8888)
//! actorq-registrar
//!
//! # Custom port and config file
//! actorq-registrar --port 8898 --config registrar.json
//! ```

use actorq::address::RegAddress;
use actorq::server::RegistrarServer;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;
pub use config::RegistrarConfig;

/// actorq Registrar - directory service for publisher/subscriber discovery.
#[derive(Parser, Debug)]
#[command(name = "actorq-registrar")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to advertise and bind on.
    #[arg(long)]
    host: Option<String>,

    /// Request/reply port.
    #[arg(short, long)]
    port: Option<u16>,

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
        RegistrarConfig::from_file(path)?
    } else {
        RegistrarConfig::default()
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
    if let Some(port) = args.port {
        config.port = port;
    }

    let address = RegAddress::new(config.host.clone(), config.port);

    info!("+----------------------------------------------------+");
    info!(
        "|       actorq Registrar v{}                     |",
        env!("CARGO_PKG_VERSION")
    );
    info!("+----------------------------------------------------+");
    info!("|  Endpoint: {:40} |", address.endpoint());
    info!("+----------------------------------------------------+");

    let server = RegistrarServer::start(address)?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping registrar...");
    server.stop();

    info!("Registrar stopped");
    Ok(())
}
