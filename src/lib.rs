//! Integrations service - HTTP entry point for integration route groups
//!
//! The service provides:
//! - Route groups for browsing integrations and executing provider calls
//! - A single failure translation layer producing stable JSON error bodies
//! - A listener with operator-configurable backlog and keep-alive

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod server;

pub use error::{Error, Result};
