//! TCP socket transport
//!
//! Notifies a local HTTP listener that a message was observed. Every
//! delivery opens its own connection, sends a bare request line, drains the
//! response until EOF, and closes. Nothing is shared between deliveries
//! apart from the lifecycle flag.

mod config;

pub use config::{SocketConfig, DEFAULT_LOGGER_HOST, DEFAULT_LOGGER_PATH, DEFAULT_LOGGER_PORT};

use super::{Transport, TransportState};
use crate::error::{InterceptError, Result};
use crate::record::LogRecord;
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::RwLock;
use tokio::time::timeout;

const NAME: &str = "socket";

/// Read buffer for draining the logger's response
const RESPONSE_CHUNK: usize = 1024;

/// One short-lived TCP request per delivered record
pub struct SocketTransport {
    config: SocketConfig,
    state: RwLock<TransportState>,
}

impl SocketTransport {
    /// Create an unopened transport
    pub fn new(config: SocketConfig) -> Self {
        Self {
            config,
            state: RwLock::new(TransportState::Uninitialized),
        }
    }

    pub fn config(&self) -> &SocketConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    async fn connect(&self) -> Result<TcpStream> {
        let addr = (self.config.host.as_str(), self.config.port);
        let stream = match timeout(self.config.connect_timeout(), TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(InterceptError::delivery(
                    NAME,
                    format!("connect to {} failed: {}", self.endpoint(), e),
                ));
            }
            Err(_) => {
                return Err(InterceptError::delivery(
                    NAME,
                    format!(
                        "connect to {} timed out after {}s",
                        self.endpoint(),
                        self.config.connect_timeout_secs
                    ),
                ));
            }
        };

        stream.set_nodelay(true).map_err(|e| {
            InterceptError::delivery(NAME, format!("failed to set TCP_NODELAY: {}", e))
        })?;
        Ok(stream)
    }

    /// Send the request and drain the response, returning the bytes drained
    async fn exchange(&self, stream: &mut TcpStream) -> std::io::Result<usize> {
        stream.write_all(self.config.request().as_bytes()).await?;

        let mut buf = [0u8; RESPONSE_CHUNK];
        let mut drained = 0;
        loop {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            tracing::trace!(
                bytes = n,
                response = %String::from_utf8_lossy(&buf[..n]),
                "Drained logger response"
            );
            drained += n;
        }
        Ok(drained)
    }
}

impl Default for SocketTransport {
    fn default() -> Self {
        Self::new(SocketConfig::default())
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn open(&self) -> Result<()> {
        let mut state = self.state.write().await;
        match *state {
            TransportState::Closed => Err(InterceptError::init(NAME, "transport was closed")),
            TransportState::Open => Ok(()),
            TransportState::Uninitialized => {
                *state = TransportState::Open;
                tracing::info!(endpoint = %self.endpoint(), "Socket transport open");
                Ok(())
            }
        }
    }

    async fn deliver(&self, record: &LogRecord) -> Result<()> {
        let state = *self.state.read().await;
        if state != TransportState::Open {
            return Err(InterceptError::delivery(NAME, format!("transport is {}", state)));
        }

        let mut stream = self.connect().await?;
        let drained = match timeout(self.config.read_timeout(), self.exchange(&mut stream)).await {
            Ok(Ok(drained)) => drained,
            Ok(Err(e)) => {
                return Err(InterceptError::delivery(
                    NAME,
                    format!("request to {} failed: {}", self.endpoint(), e),
                ));
            }
            Err(_) => {
                return Err(InterceptError::delivery(
                    NAME,
                    format!(
                        "no complete response from {} within {}s",
                        self.endpoint(),
                        self.config.read_timeout_secs
                    ),
                ));
            }
        };

        // The peer already closed its side; a failed shutdown changes nothing.
        if let Err(e) = stream.shutdown().await {
            tracing::trace!(error = %e, "Socket shutdown after drain failed");
        }

        tracing::debug!(
            endpoint = %self.endpoint(),
            direction = %record.direction(),
            response_bytes = drained,
            "Logger notified"
        );
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if *state == TransportState::Open {
            tracing::info!(endpoint = %self.endpoint(), "Socket transport closed");
        }
        *state = TransportState::Closed;
        Ok(())
    }

    async fn state(&self) -> TransportState {
        *self.state.read().await
    }

    fn name(&self) -> &str {
        NAME
    }
}
