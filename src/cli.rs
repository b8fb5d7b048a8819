//! Command-line entry point parameters

use std::path::PathBuf;

use clap::Parser;

use crate::config::{TransportConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};

/// Integrations HTTP service
#[derive(Debug, Parser)]
#[command(
    name = "integrations-service",
    version,
    about = "Serve the integrations and execution route groups"
)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = CONFIG_PATH_ENV)]
    pub config: PathBuf,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on [default: 8000]
    #[arg(long)]
    pub port: Option<u16>,

    /// Maximum number of pending connections [default: 4096]
    #[arg(long)]
    pub backlog: Option<u32>,

    /// Keep-alive idle timeout in seconds [default: 30]
    #[arg(long)]
    pub timeout_keep_alive: Option<u64>,

    /// Runtime worker threads [default: one per core]
    #[arg(long)]
    pub workers: Option<usize>,

    /// critical, error, warning, info, debug or trace [default: info]
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Overlay flags given on the command line onto `config`
    pub fn apply(&self, config: &mut TransportConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(backlog) = self.backlog {
            config.backlog = backlog;
        }
        if let Some(timeout) = self.timeout_keep_alive {
            config.keep_alive_timeout = timeout;
        }
        if let Some(workers) = self.workers {
            config.workers = Some(workers);
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}
