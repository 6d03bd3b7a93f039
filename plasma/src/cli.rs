//! # CLI
//!
//! This module defines the command-line interface of `plasma` using `clap`.
//!
//! Connection settings come from flags, from a JSON config file (`--config`), or both;
//! flags win over the file.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use plasma_core::config::ClientConfig;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 50051;

#[derive(Parser, Debug)]
#[command(name = "plasma", version, about = "Plasma events client")]
pub struct Cli {
    /// Server host (e.g. localhost)
    #[arg(long)]
    pub host: Option<String>,

    /// Server port [default: 50051]
    #[arg(long)]
    pub port: Option<u16>,

    /// PEM root certificate; enables TLS
    #[arg(long)]
    pub pem_root_cert: Option<PathBuf>,

    /// Connection timeout in milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// JSON file with the connection settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Subscribe to one or more event types and print payloads as they arrive
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// plasma --host localhost subscribe event:111 event:222
    /// ```
    Subscribe {
        /// Event types to subscribe to
        #[arg(required = true, value_parser = parse_event_type)]
        event_types: Vec<String>,
    },
}

impl Cli {
    /// Resolves the connection settings from the config file and the flags.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => {
                let Some(host) = &self.host else {
                    bail!("Either --host or --config must be provided");
                };
                ClientConfig::new(host.clone(), DEFAULT_PORT)
            }
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout_ms = Some(timeout);
        }
        if let Some(path) = &self.pem_root_cert {
            let pem = fs::read_to_string(path).with_context(|| {
                format!("Failed to read PEM root certificate '{}'", path.display())
            })?;
            config.pem_root_cert = Some(pem);
        }

        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<ClientConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file '{}'", path.display()))
}

fn parse_event_type(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Event type cannot be empty".to_string());
    }
    Ok(value.to_string())
}
