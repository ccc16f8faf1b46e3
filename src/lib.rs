//! # dummymore
//!
//! Dummy-message interception for instant-messaging client plugins.
//!
//! ## Overview
//!
//! Traffic-obfuscation tools insert synthetic "dummy" messages, marked with a
//! `?DUMMY:` prefix, into conversations. `dummymore` classifies every
//! intercepted message, hands a one-line record of it to an external logger,
//! and tells the host whether to hide it. Logging is best-effort: a broken
//! logger never changes or delays the verdict beyond a short timeout.
//!
//! ## Quick Start
//!
//! ```rust
//! use dummymore::{Direction, MemoryTransport, MessageEvent, MessageInterceptor, PipelineContext};
//!
//! # async fn example() -> dummymore::Result<()> {
//! let pipeline = PipelineContext::start(MemoryTransport::new()).await?;
//!
//! let event = MessageEvent::new(Direction::Incoming, "alice@example.org", "?DUMMY:noise123");
//! assert!(pipeline.process(event).await);
//! assert!(!pipeline.classify_only(b"Hello, how are you?"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Transports
//!
//! - **pipe** — named FIFO at `/tmp/dummymore.log`, one record per line
//! - **socket** — one `POST /log/dummy HTTP/1.0` request per event to `localhost:8900`
//! - **memory** — in-process capture for tests
//!
//! ## Architecture
//!
//! - **classify** — pure prefix matching, `Dummy` / `Real`
//! - **LogRecord** — `<TAG><unix-seconds> <payload>\n`
//! - **Transport** trait — lifecycle plus `deliver`, implemented per backend
//! - **PipelineContext** — owns the transport, implements `MessageInterceptor`

pub mod classify;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod transport;
pub mod types;

// Re-export core types
pub use classify::{classify, inspect, looks_encrypted, Classification, Inspection};
pub use config::{InterceptConfig, TransportConfig};
pub use error::{InterceptError, Result};
pub use pipeline::{MessageInterceptor, PipelineContext, PipelineStats, StatsSnapshot};
pub use record::{LogRecord, ParsedRecord};
pub use transport::{Transport, TransportState};
pub use types::{Direction, MessageEvent};

// Re-export transports for convenience
pub use transport::memory::MemoryTransport;
pub use transport::pipe::{PipeConfig, PipeTransport};
pub use transport::socket::{SocketConfig, SocketTransport};
