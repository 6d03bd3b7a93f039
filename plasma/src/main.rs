//! # Plasma CLI Entry Point
//!
//! Subscribes to Plasma event types and prints every payload as it arrives:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and installs the
//!    `tracing` subscriber (filtered by `RUST_LOG`).
//! 2. **Subscription**: Opens a streaming call through `plasma_core::client::PlasmaClient`.
//! 3. **Presentation**: Prints payloads to standard output, failures to standard error.
//! 4. **Shutdown**: Ctrl-C cancels the call; the process exits once the terminal event is in.

mod cli;
mod formatter;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use formatter::FormattedString;
use plasma_core::client::{CallState, Event, PlasmaClient};
use plasma_core::config::ClientConfig;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Cli::parse();

    match run(args).await {
        Ok(CallState::Failed) => process::exit(1),
        Ok(_) => {}
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Cli) -> Result<CallState> {
    let config = args.client_config()?;

    match args.command {
        Commands::Subscribe { event_types } => subscribe(&config, event_types).await,
    }
}

async fn subscribe(config: &ClientConfig, event_types: Vec<String>) -> Result<CallState> {
    let client = PlasmaClient::connect(config)
        .with_context(|| format!("Cannot reach Plasma at '{}'", config.endpoint_uri()))?;

    tracing::info!(endpoint = %config.endpoint_uri(), ?event_types, "subscribing");

    let subscription = client.subscribe(event_types, |event| match event {
        Event::Response(payload) => println!("{}", FormattedString::from(payload)),
        Event::Completed => tracing::info!("stream closed by the server"),
        Event::Failed(err) => eprintln!("{}", FormattedString::from(err)),
    })?;

    let state = tokio::select! {
        state = subscription.closed() => state,
        _ = tokio::signal::ctrl_c() => {
            subscription.cancel();
            subscription.closed().await
        }
    };

    Ok(state)
}
