//! Error types for WellView Core

use thiserror::Error;

pub use crate::model::Slice;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Identity not resolved")]
    NotReady,

    #[error(
        "Partial data failure: {} unavailable",
        failed.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
    )]
    PartialDataFailure { failed: Vec<Slice> },

    #[error("Failed to delete report {report_id}: {reason}")]
    DestructiveActionFailure { report_id: String, reason: String },

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short machine-friendly label, used for log fields and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Network(_) => "network",
            Error::Auth(_) => "auth",
            Error::NotReady => "not_ready",
            Error::PartialDataFailure { .. } => "partial_data",
            Error::DestructiveActionFailure { .. } => "destructive_action",
            Error::Backend { .. } => "backend",
            Error::Parse(_) => "parse",
            Error::InvalidInput(_) => "invalid_input",
            Error::Config(_) => "config",
            Error::Serialization(_) => "serialization",
            Error::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
