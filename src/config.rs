use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;

use crate::error::{Error, Result};

pub const CONFIG_PATH_ENV: &str = "INTEGRATIONS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "integrations.toml";

const DEFAULT_LOG_LEVEL: &str = "info";

/// Top-level application configuration loaded from file + environment.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: TransportConfig,
    pub logging: LoggingSection,
    pub integrations: IntegrationsSection,
}

impl AppConfig {
    /// Load configuration from `path` if it exists, then overlay
    /// `INTEGRATIONS_*` environment variables (`__` separates sections).
    pub fn load(path: &Path) -> Result<Self> {
        let mut builder = config::Config::builder();

        if path.exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("INTEGRATIONS")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("integrations.disabled")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        let mut config: Self = settings.try_deserialize()?;

        if config.server.log_level.trim().is_empty() {
            config.server.log_level = DEFAULT_LOG_LEVEL.to_string();
        }

        Ok(config)
    }
}

/// Listener parameters, read once at startup
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
    /// Pending-connection queue length passed to `listen(2)`
    pub backlog: u32,
    /// Seconds an idle HTTP connection is kept open, also used as the TCP
    /// keep-alive idle time; 0 disables both
    pub keep_alive_timeout: u64,
    /// Runtime worker threads; unset uses the runtime default
    pub workers: Option<usize>,
    pub log_level: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            backlog: 4096,
            keep_alive_timeout: 30,
            workers: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl TransportConfig {
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        self.level_filter()?;

        if self.workers == Some(0) {
            return Err(Error::invalid_config("server.workers must be at least 1"));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .map_err(|_| Error::InvalidHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn keep_alive(&self) -> Option<Duration> {
        (self.keep_alive_timeout > 0).then(|| Duration::from_secs(self.keep_alive_timeout))
    }

    /// Accepts the usual server log level names, `critical` and `warning`
    /// included.
    pub fn level_filter(&self) -> Result<LevelFilter> {
        match self.log_level.trim().to_ascii_lowercase().as_str() {
            "critical" | "error" => Ok(LevelFilter::ERROR),
            "warning" | "warn" => Ok(LevelFilter::WARN),
            "info" => Ok(LevelFilter::INFO),
            "debug" => Ok(LevelFilter::DEBUG),
            "trace" => Ok(LevelFilter::TRACE),
            _ => Err(Error::InvalidLogLevel(self.log_level.clone())),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSection {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `timestamp - target - LEVEL - message`
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct IntegrationsSection {
    /// Providers removed from the built-in catalog
    pub disabled: Vec<String>,
}
