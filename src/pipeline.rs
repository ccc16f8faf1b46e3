//! Interception pipeline
//!
//! `PipelineContext` owns the transport and turns each intercepted message
//! into a suppression verdict: classify, log best-effort, answer. Logging
//! outcomes never change the verdict.

use crate::classify::{classify, inspect, Inspection};
use crate::config::InterceptConfig;
use crate::error::Result;
use crate::record::LogRecord;
use crate::transport::{Transport, TransportState};
use crate::types::{Direction, MessageEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Capability invoked by host-integration glue
#[async_trait]
pub trait MessageInterceptor: Send + Sync {
    /// Classify and log one event; `true` means hide it from display
    async fn process(&self, event: MessageEvent) -> bool;

    /// Suppression verdict without logging, for display hooks
    fn classify_only(&self, payload: &[u8]) -> bool {
        classify(payload).is_dummy()
    }
}

/// Counters kept by a `PipelineContext`
#[derive(Debug, Default)]
pub struct PipelineStats {
    processed: AtomicU64,
    dummy: AtomicU64,
    encrypted: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

impl PipelineStats {
    fn observe(&self, inspection: Inspection) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        if inspection.classification.is_dummy() {
            self.dummy.fetch_add(1, Ordering::Relaxed);
        }
        if inspection.encrypted {
            self.encrypted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            dummy: self.dummy.load(Ordering::Relaxed),
            encrypted: self.encrypted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of `PipelineStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Events classified
    pub processed: u64,
    /// Events classified as dummy
    pub dummy: u64,
    /// Events carrying the OTR marker
    pub encrypted: u64,
    /// Records accepted by the transport
    pub delivered: u64,
    /// Records the transport failed to deliver
    pub failed: u64,
    /// Raw events rejected as malformed
    pub rejected: u64,
}

/// Owns the transport handle and processes intercepted messages
///
/// Safe to share behind `Arc` between concurrent callers.
pub struct PipelineContext {
    transport: Arc<dyn Transport>,
    stats: PipelineStats,
}

impl PipelineContext {
    /// Create a context around a transport without opening it
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_transport(Arc::new(transport))
    }

    /// Create a context around a shared transport without opening it
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            stats: PipelineStats::default(),
        }
    }

    /// Open the transport and return a ready context
    ///
    /// Initialization errors propagate; plugin activation should abort.
    pub async fn start(transport: impl Transport + 'static) -> Result<Self> {
        let context = Self::new(transport);
        context.open().await?;
        Ok(context)
    }

    /// Build and open the configured transport
    pub async fn from_config(config: &InterceptConfig) -> Result<Self> {
        let context = Self::with_transport(config.transport.build());
        context.open().await?;
        Ok(context)
    }

    async fn open(&self) -> Result<()> {
        self.transport.open().await?;
        tracing::info!(transport = self.transport.name(), "Interception pipeline ready");
        Ok(())
    }

    /// Whether the transport is open
    pub async fn is_ready(&self) -> bool {
        self.transport.state().await == TransportState::Open
    }

    /// Validate raw host bytes, then process them
    ///
    /// Malformed input is reported to the caller and no record is emitted.
    pub async fn process_raw(&self, direction: Direction, peer: &str, payload: &[u8]) -> Result<bool> {
        match MessageEvent::from_raw(direction, peer, payload) {
            Ok(event) => Ok(self.process(event).await),
            Err(e) => {
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(direction = %direction, peer = %peer, error = %e, "Rejected message event");
                Err(e)
            }
        }
    }

    /// Close the transport
    pub async fn shutdown(&self) -> Result<()> {
        self.transport.close().await?;
        tracing::info!(
            transport = self.transport.name(),
            stats = ?self.stats.snapshot(),
            "Interception pipeline shut down"
        );
        Ok(())
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

#[async_trait]
impl MessageInterceptor for PipelineContext {
    async fn process(&self, event: MessageEvent) -> bool {
        let inspection = inspect(event.payload().as_bytes());
        self.stats.observe(inspection);

        tracing::debug!(
            message_id = %event.id(),
            direction = %event.direction(),
            peer = %event.peer(),
            classification = %inspection.classification,
            encrypted = inspection.encrypted,
            "Message intercepted"
        );

        let record = LogRecord::build(&event);
        match self.transport.deliver(&record).await {
            Ok(()) => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    message_id = %event.id(),
                    transport = self.transport.name(),
                    error = %e,
                    "Failed to log message event"
                );
            }
        }

        inspection.classification.is_dummy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InterceptError;
    use crate::record::ParsedRecord;
    use crate::transport::memory::MemoryTransport;

    async fn memory_context() -> (PipelineContext, MemoryTransport) {
        let transport = MemoryTransport::new();
        let context = PipelineContext::start(transport.clone()).await.unwrap();
        (context, transport)
    }

    #[tokio::test]
    async fn test_dummy_is_suppressed_and_logged() {
        let (context, transport) = memory_context().await;
        let event = MessageEvent::new(Direction::Incoming, "alice", "?DUMMY:noise123");
        assert!(context.process(event).await);

        let records = transport.records().await;
        assert_eq!(records.len(), 1);
        let parsed = ParsedRecord::parse(records[0].as_bytes()).unwrap();
        assert_eq!(parsed.direction, Direction::Incoming);
        assert_eq!(parsed.payload, b"?DUMMY:noise123");
    }

    #[tokio::test]
    async fn test_real_message_passes() {
        let (context, transport) = memory_context().await;
        let event = MessageEvent::new(Direction::Displaying, "alice", "Hello, how are you?");
        assert!(!context.process(event).await);
        assert_eq!(transport.len().await, 1);
    }

    #[tokio::test]
    async fn test_verdict_ignores_transport_failure() {
        let transport = MemoryTransport::failing();
        let context = PipelineContext::start(transport).await.unwrap();

        assert!(context.process(MessageEvent::new(Direction::Incoming, "a", "?DUMMY:x")).await);
        assert!(!context.process(MessageEvent::new(Direction::Incoming, "a", "hi")).await);

        let stats = context.stats();
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.delivered, 0);
    }

    #[tokio::test]
    async fn test_unopened_transport_still_answers() {
        let context = PipelineContext::new(MemoryTransport::new());
        assert!(!context.is_ready().await);
        assert!(context.process(MessageEvent::new(Direction::Incoming, "a", "<FONT>?DUMMY:xx")).await);
        assert_eq!(context.stats().failed, 1);
    }

    #[tokio::test]
    async fn test_classify_only_does_not_log() {
        let (context, transport) = memory_context().await;
        assert!(context.classify_only(b"?DUMMY:abc"));
        assert!(!context.classify_only(b"?OTR:abcd"));
        assert!(transport.is_empty().await);
        assert_eq!(context.stats().processed, 0);
    }

    #[tokio::test]
    async fn test_encrypted_counter() {
        let (context, _transport) = memory_context().await;
        assert!(!context.process(MessageEvent::new(Direction::Incoming, "a", "?OTR:abcd")).await);
        let stats = context.stats();
        assert_eq!(stats.encrypted, 1);
        assert_eq!(stats.dummy, 0);
    }

    #[tokio::test]
    async fn test_process_raw_rejects_malformed() {
        let (context, transport) = memory_context().await;
        let err = context
            .process_raw(Direction::Incoming, "alice", b"?DUMMY:\xff")
            .await
            .unwrap_err();
        assert!(matches!(err, InterceptError::MalformedEvent(_)));
        assert!(transport.is_empty().await);
        assert_eq!(context.stats().rejected, 1);

        assert!(context
            .process_raw(Direction::Incoming, "alice", b"?DUMMY:ok")
            .await
            .unwrap());
        assert_eq!(transport.len().await, 1);
    }

    #[tokio::test]
    async fn test_shutdown_closes_transport() {
        let (context, transport) = memory_context().await;
        assert!(context.is_ready().await);
        context.shutdown().await.unwrap();
        assert_eq!(transport.state().await, TransportState::Closed);

        assert!(context.process(MessageEvent::new(Direction::Outgoing, "b", "?DUMMY:late")).await);
        assert!(transport.is_empty().await);
    }

    #[tokio::test]
    async fn test_start_propagates_initialization_error() {
        let transport = MemoryTransport::new();
        transport.close().await.unwrap();
        let err = PipelineContext::start(transport).await.err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_stats_snapshot_serialization() {
        let snapshot = StatsSnapshot {
            processed: 3,
            dummy: 1,
            ..Default::default()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"processed\":3"));
        assert!(json.contains("\"rejected\":0"));
    }
}
