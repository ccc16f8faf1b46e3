//! Named pipe transport
//!
//! Creates a FIFO at a well-known path, opens it write-only, and writes one
//! record per delivery. A single mutex serializes writes so records from
//! concurrent callers never interleave.
//!
//! Opening the pipe ignores SIGPIPE for the whole process (see
//! [`PipeConfig::ignore_sigpipe`]), so a reader that goes away turns into a
//! delivery error rather than killing the host. A write that times out part
//! way leaves a torn record; the next delivery terminates it with a newline
//! before writing its own record, so the stream stays line-aligned.

mod config;

pub use config::{PipeConfig, DEFAULT_FIFO_MODE, DEFAULT_FIFO_PATH, DEFAULT_GREETING};

use super::{Transport, TransportState};
use crate::error::{InterceptError, Result};
use crate::record::LogRecord;
use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::stat::Mode;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::unix::pipe;
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};

const NAME: &str = "pipe";

/// Delay between attempts to open a FIFO that has no reader yet
const OPEN_RETRY_INTERVAL: Duration = Duration::from_millis(50);

enum PipeState {
    Uninitialized,
    Open {
        sender: pipe::Sender,
        /// The last record was cut short and lacks its newline
        torn: bool,
    },
    Closed,
}

impl PipeState {
    fn lifecycle(&self) -> TransportState {
        match self {
            Self::Uninitialized => TransportState::Uninitialized,
            Self::Open { .. } => TransportState::Open,
            Self::Closed => TransportState::Closed,
        }
    }
}

/// Writes records into a named FIFO
pub struct PipeTransport {
    config: PipeConfig,
    state: Mutex<PipeState>,
}

impl PipeTransport {
    /// Create an unopened transport
    pub fn new(config: PipeConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PipeState::Uninitialized),
        }
    }

    pub fn config(&self) -> &PipeConfig {
        &self.config
    }
}

impl PipeTransport {
    /// Write all of `bytes` within the write timeout
    ///
    /// `written` counts the bytes that reached the pipe, including when the
    /// write fails or times out part way.
    async fn write_bounded(
        &self,
        sender: &mut pipe::Sender,
        bytes: &[u8],
        written: &mut usize,
    ) -> std::result::Result<(), String> {
        let write = async {
            while *written < bytes.len() {
                match sender.write(&bytes[*written..]).await {
                    Ok(0) => return Err(std::io::ErrorKind::WriteZero.into()),
                    Ok(n) => *written += n,
                    Err(e) => return Err(e),
                }
            }
            Ok::<(), std::io::Error>(())
        };

        match timeout(self.config.write_timeout(), write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "write timed out after {}s",
                self.config.write_timeout_secs
            )),
        }
    }
}

impl Default for PipeTransport {
    fn default() -> Self {
        Self::new(PipeConfig::default())
    }
}

#[async_trait]
impl Transport for PipeTransport {
    async fn open(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        match *state {
            PipeState::Open { .. } => return Ok(()),
            PipeState::Closed => {
                return Err(InterceptError::init(NAME, "transport was closed"));
            }
            PipeState::Uninitialized => {}
        }

        let path = &self.config.path;
        ensure_fifo(path, self.config.mode)?;
        if self.config.ignore_sigpipe {
            ignore_sigpipe()?;
        }
        let mut sender = open_sender(path, self.config.open_timeout()).await?;

        if !self.config.greeting.is_empty() {
            match timeout(
                self.config.write_timeout(),
                sender.write_all(self.config.greeting.as_bytes()),
            )
            .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    return Err(InterceptError::init(
                        NAME,
                        format!("failed to write greeting to {}: {}", path.display(), e),
                    ));
                }
                Err(_) => {
                    return Err(InterceptError::init(
                        NAME,
                        format!("greeting write to {} timed out", path.display()),
                    ));
                }
            }
        }

        *state = PipeState::Open { sender, torn: false };
        tracing::info!(path = %path.display(), "Named pipe transport open");
        Ok(())
    }

    async fn deliver(&self, record: &LogRecord) -> Result<()> {
        let mut state = self.state.lock().await;
        let (sender, torn) = match &mut *state {
            PipeState::Open { sender, torn } => (sender, torn),
            other => {
                return Err(InterceptError::delivery(
                    NAME,
                    format!("transport is {}", other.lifecycle()),
                ));
            }
        };

        if *torn {
            let mut written = 0;
            self.write_bounded(sender, b"\n", &mut written)
                .await
                .map_err(|reason| {
                    InterceptError::delivery(
                        NAME,
                        format!("failed to terminate torn record: {}", reason),
                    )
                })?;
            *torn = false;
        }

        let mut written = 0;
        match self.write_bounded(sender, record.as_bytes(), &mut written).await {
            Ok(()) => {
                tracing::debug!(
                    direction = %record.direction(),
                    bytes = record.len(),
                    "Record written to pipe"
                );
                Ok(())
            }
            Err(reason) => {
                if written > 0 {
                    *torn = true;
                    tracing::warn!(
                        written,
                        bytes = record.len(),
                        "Partial record left in pipe"
                    );
                }
                Err(InterceptError::delivery(NAME, reason))
            }
        }
    }

    async fn close(&self) -> Result<()> {
        let previous = std::mem::replace(&mut *self.state.lock().await, PipeState::Closed);
        if let PipeState::Open { .. } = previous {
            tracing::info!(path = %self.config.path.display(), "Named pipe transport closed");
        }
        Ok(())
    }

    async fn state(&self) -> TransportState {
        self.state.lock().await.lifecycle()
    }

    fn name(&self) -> &str {
        NAME
    }
}

/// Ignore SIGPIPE so writes to a reader-less FIFO fail with EPIPE
///
/// The disposition is process-wide and stays in place after the transport
/// closes.
fn ignore_sigpipe() -> Result<()> {
    // SAFETY: SIG_IGN installs no handler code, so no async-signal-safety
    // requirements apply.
    unsafe { signal(Signal::SIGPIPE, SigHandler::SigIgn) }
        .map(|_| ())
        .map_err(|e| InterceptError::init(NAME, format!("failed to ignore SIGPIPE: {}", e)))
}

/// Create the FIFO unless something already sits at `path`
fn ensure_fifo(path: &Path, mode: u32) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.file_type().is_fifo() => return Ok(()),
        Ok(_) => {
            return Err(InterceptError::init(
                NAME,
                format!("{} exists and is not a FIFO", path.display()),
            ));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(InterceptError::init(
                NAME,
                format!("failed to stat {}: {}", path.display(), e),
            ));
        }
    }

    match nix::unistd::mkfifo(path, Mode::from_bits_truncate(mode as nix::libc::mode_t)) {
        // Lost a race with another creator; open_sender rejects non-FIFOs.
        Ok(()) | Err(Errno::EEXIST) => {
            tracing::debug!(path = %path.display(), mode = %format!("{:o}", mode), "FIFO ready");
            Ok(())
        }
        Err(e) => Err(InterceptError::init(
            NAME,
            format!("mkfifo {} failed: {}", path.display(), e),
        )),
    }
}

/// Open the write end, waiting up to `wait` for a reader to attach
async fn open_sender(path: &Path, wait: Duration) -> Result<pipe::Sender> {
    let deadline = Instant::now() + wait;
    loop {
        match pipe::OpenOptions::new().open_sender(path) {
            Ok(sender) => return Ok(sender),
            Err(e) if e.raw_os_error() == Some(Errno::ENXIO as i32) => {
                if Instant::now() >= deadline {
                    return Err(InterceptError::init(
                        NAME,
                        format!(
                            "no reader attached to {} within {}s",
                            path.display(),
                            wait.as_secs()
                        ),
                    ));
                }
                tokio::time::sleep(OPEN_RETRY_INTERVAL).await;
            }
            Err(e) => {
                return Err(InterceptError::init(
                    NAME,
                    format!("failed to open {}: {}", path.display(), e),
                ));
            }
        }
    }
}
