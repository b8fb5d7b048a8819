//! Error types for integrations-service startup and composition

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route conflict: {method} {path} registered by both '{first}' and '{second}'")]
    RouteConflict {
        method: String,
        path: String,
        first: String,
        second: String,
    },

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Invalid host: {0}")]
    InvalidHost(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    pub fn invalid_route(msg: impl Into<String>) -> Self {
        Error::InvalidRoute(msg.into())
    }
}
