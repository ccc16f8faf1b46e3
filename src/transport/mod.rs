//! Transport trait — hands log records to an external observer process
//!
//! Backends (named pipe, TCP socket, in-memory) implement `Transport` so the
//! pipeline can log without knowing where records go. Every failure path
//! returns an error value; no backend panics or blocks without a bound.

use crate::error::Result;
use crate::record::LogRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod pipe;
pub mod socket;

/// Lifecycle of a transport handle
///
/// `Uninitialized → Open → Closed`. Deliveries outside `Open` fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportState {
    #[default]
    Uninitialized,
    Open,
    Closed,
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Core trait for log record backends
///
/// Methods take `&self`; implementations guard their own handles so one
/// transport can be shared by concurrent `process` calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Acquire the underlying channel
    ///
    /// Idempotent while open. Fails with `Initialization` if the channel
    /// cannot be created, or if the transport was already closed.
    async fn open(&self) -> Result<()>;

    /// Deliver one record, best-effort with no retry
    async fn deliver(&self, record: &LogRecord) -> Result<()>;

    /// Release the channel; later deliveries fail
    async fn close(&self) -> Result<()>;

    /// Current lifecycle state
    async fn state(&self) -> TransportState;

    /// Transport name (e.g., "pipe", "socket", "memory")
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_default_and_display() {
        assert_eq!(TransportState::default(), TransportState::Uninitialized);
        assert_eq!(TransportState::Open.to_string(), "open");
        assert_eq!(TransportState::Closed.to_string(), "closed");
    }
}
