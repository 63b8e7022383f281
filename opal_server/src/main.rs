//! # OPAL Edge Server Binary
//!
//! Industrial automation server exposing live hardware state (system
//! clock, CPU temperature, status LED) as addressable variables.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults
//! opal_server
//!
//! # Run with a config file and verbose logging
//! opal_server --config /etc/opal/server.toml -v
//!
//! # Override the port, JSON logs
//! opal_server --port 4840 --json
//! ```

#![deny(warnings)]

use clap::Parser;
use opal_common::config::{ConfigError, ConfigLoader, ServerConfig};
use opal_server::lifecycle::ServerLifecycle;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// OPAL Edge Server - live hardware state behind an automation server
#[derive(Parser, Debug)]
#[command(name = "opal_server")]
#[command(author = "OPAL")]
#[command(version)]
#[command(about = "Industrial automation edge server with hardware-backed variables")]
#[command(long_about = None)]
struct Args {
    /// Path to the server configuration file (server.toml).
    #[arg(short, long, default_value = "/etc/opal/server.toml")]
    config: PathBuf,

    /// Override the configured server port.
    #[arg(long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    match run(&args) {
        Ok(status) => std::process::exit(if status.is_good() { 0 } else { 1 }),
        Err(e) => {
            error!("server startup failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<opal_common::StatusCode, Box<dyn std::error::Error>> {
    info!("OPAL edge server v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(&args.config)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    let mut lifecycle = ServerLifecycle::new(config);
    lifecycle.install_interrupt_handler()?;
    lifecycle.start()?;

    let status = lifecycle.run();
    lifecycle.shutdown();

    info!("OPAL edge server shutdown complete");
    Ok(status)
}

/// Load server.toml, falling back to built-in defaults when absent.
fn load_config(path: &PathBuf) -> Result<ServerConfig, ConfigError> {
    match ServerConfig::load(path) {
        Ok(config) => {
            info!("loaded configuration from {}", path.display());
            Ok(config)
        }
        Err(ConfigError::FileNotFound) => {
            info!(
                "no configuration file at {}, using built-in defaults",
                path.display()
            );
            Ok(ServerConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
