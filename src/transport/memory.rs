//! In-memory transport for testing and verdict-only hosts

use super::{Transport, TransportState};
use crate::error::{InterceptError, Result};
use crate::record::LogRecord;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Captures delivered records in memory
///
/// Clones share state, so a test can keep a handle after giving one to a
/// `PipelineContext`.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    records: Arc<RwLock<Vec<LogRecord>>>,
    state: Arc<RwLock<TransportState>>,
    failing: Arc<AtomicBool>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every delivery fails
    pub fn failing() -> Self {
        let transport = Self::default();
        transport.set_failing(true);
        transport
    }

    /// Toggle delivery failure
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Records delivered so far, oldest first
    pub async fn records(&self) -> Vec<LogRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn open(&self) -> Result<()> {
        let mut state = self.state.write().await;
        match *state {
            TransportState::Closed => Err(InterceptError::init("memory", "transport was closed")),
            _ => {
                *state = TransportState::Open;
                Ok(())
            }
        }
    }

    async fn deliver(&self, record: &LogRecord) -> Result<()> {
        let state = *self.state.read().await;
        if state != TransportState::Open {
            return Err(InterceptError::delivery(
                "memory",
                format!("transport is {}", state),
            ));
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(InterceptError::delivery("memory", "simulated failure"));
        }
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        *self.state.write().await = TransportState::Closed;
        Ok(())
    }

    async fn state(&self) -> TransportState {
        *self.state.read().await
    }

    fn name(&self) -> &str {
        "memory"
    }
}
