//! Error types for the probe

use crate::config::ConfigError;
use crate::transport::TransportError;
use thiserror::Error;

/// Anything that stops a probe run before or during the network loop
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;
