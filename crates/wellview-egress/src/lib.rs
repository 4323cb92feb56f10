//! WellView Egress Connector
//!
//! This crate provides the HTTP connector to the wellness backend:
//! - Shared HTTP client configuration
//! - `BackendClient`, the reqwest implementation of `InsightsBackend`

pub mod backend;
pub mod client;

pub use backend::{BackendClient, BackendConfig};
pub use client::{HttpClientConfig, create_client};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EgressError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unauthorized (status {status_code}): {message}")]
    Unauthorized { status_code: u16, message: String },

    #[error("Backend error (status {status_code}): {message}")]
    BackendError { status_code: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, EgressError>;

impl From<EgressError> for wellview_core::Error {
    fn from(err: EgressError) -> Self {
        match err {
            EgressError::HttpError(e) if e.is_decode() => {
                wellview_core::Error::Parse(e.to_string())
            }
            EgressError::HttpError(e) if e.is_timeout() => {
                wellview_core::Error::Network(format!("Request timed out: {}", e))
            }
            EgressError::HttpError(e) => wellview_core::Error::Network(e.to_string()),
            EgressError::Unauthorized {
                status_code,
                message,
            } => wellview_core::Error::Auth(format!("status {}: {}", status_code, message)),
            EgressError::BackendError {
                status_code,
                message,
            } => wellview_core::Error::Backend {
                status: status_code,
                message,
            },
            EgressError::ParseError(msg) => wellview_core::Error::Parse(msg),
            EgressError::ConfigError(msg) => wellview_core::Error::Config(msg),
        }
    }
}
