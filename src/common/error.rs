//! Error types for the query runner
//!
//! Only failures that stop the whole run live here. A bad statement or a
//! failed service call is folded into the run's output instead (see
//! [`crate::command::parser`] and [`crate::executor`]).

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the query runner
#[derive(Error, Debug)]
pub enum Error {
    // === Startup Errors ===
    #[error("Services did not become ready after {attempts} attempts")]
    ServicesUnavailable { attempts: u32 },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid URL '{url}' for {service}: {reason}")]
    InvalidEndpoint {
        service: String,
        url: String,
        reason: String,
    },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === HTTP Client Errors ===
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create an invalid endpoint error
    pub fn invalid_endpoint(service: &str, url: &str, reason: impl ToString) -> Self {
        Self::InvalidEndpoint {
            service: service.to_string(),
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ServicesUnavailable { .. } => 1,
            Error::Config(_) | Error::ConfigParse(_) | Error::InvalidEndpoint { .. } => 2,
            _ => 1,
        }
    }
}
