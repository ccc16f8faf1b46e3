//! Named pipe transport configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Well-known FIFO path read by the external logger
pub const DEFAULT_FIFO_PATH: &str = "/tmp/dummymore.log";

/// Read/write for every local user. Weak, but it is what the logger expects.
pub const DEFAULT_FIFO_MODE: u32 = 0o666;

/// First bytes written after the pipe opens
pub const DEFAULT_GREETING: &str = "Hi\n";

/// Configuration for `PipeTransport`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipeConfig {
    /// FIFO location, created if missing
    pub path: PathBuf,

    /// Permission bits passed to mkfifo (the process umask still applies)
    pub mode: u32,

    /// Written once on open; empty disables it
    pub greeting: String,

    /// How long `open` waits for a reader to attach (seconds)
    ///
    /// Zero makes a single attempt.
    pub open_timeout_secs: u64,

    /// Upper bound on writing one record (seconds)
    pub write_timeout_secs: u64,

    /// Ignore SIGPIPE process-wide when the pipe opens
    ///
    /// Without it a write after the reader left kills the whole host
    /// process instead of failing with EPIPE. Hosts that install their own
    /// SIGPIPE handler can turn this off.
    pub ignore_sigpipe: bool,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FIFO_PATH),
            mode: DEFAULT_FIFO_MODE,
            greeting: DEFAULT_GREETING.to_string(),
            open_timeout_secs: 2,
            write_timeout_secs: 2,
            ignore_sigpipe: true,
        }
    }
}

impl PipeConfig {
    /// Default configuration at a different path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_secs(self.open_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}
