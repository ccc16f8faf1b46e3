//! Interceptor configuration
//!
//! Every field defaults to the fixed constants the external logger expects,
//! so an empty JSON object is a valid configuration.

use crate::error::{InterceptError, Result};
use crate::transport::memory::MemoryTransport;
use crate::transport::pipe::{PipeConfig, PipeTransport};
use crate::transport::socket::{SocketConfig, SocketTransport};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Which backend receives log records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum TransportConfig {
    /// Named FIFO (default)
    Pipe(PipeConfig),
    /// Per-event TCP notification
    Socket(SocketConfig),
    /// Keep records in memory
    Memory,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Pipe(PipeConfig::default())
    }
}

impl TransportConfig {
    /// Build the configured transport, unopened
    pub fn build(&self) -> Arc<dyn Transport> {
        match self {
            Self::Pipe(config) => Arc::new(PipeTransport::new(config.clone())),
            Self::Socket(config) => Arc::new(SocketTransport::new(config.clone())),
            Self::Memory => Arc::new(MemoryTransport::new()),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptConfig {
    #[serde(default)]
    pub transport: TransportConfig,
}

impl InterceptConfig {
    /// Parse a JSON configuration
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| InterceptError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            InterceptError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = serde_json::from_str(&json).map_err(|e| {
            InterceptError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }
}
