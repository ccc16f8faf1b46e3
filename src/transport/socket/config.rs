//! Socket transport configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_LOGGER_HOST: &str = "localhost";
pub const DEFAULT_LOGGER_PORT: u16 = 8900;
pub const DEFAULT_LOGGER_PATH: &str = "/log/dummy";

/// Configuration for `SocketTransport`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocketConfig {
    /// Logger host, resolved on every delivery
    pub host: String,

    pub port: u16,

    /// Request path of the notification
    pub path: String,

    /// Upper bound on resolving and connecting (seconds)
    pub connect_timeout_secs: u64,

    /// Upper bound on sending the request and draining the response (seconds)
    pub read_timeout_secs: u64,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LOGGER_HOST.to_string(),
            port: DEFAULT_LOGGER_PORT,
            path: DEFAULT_LOGGER_PATH.to_string(),
            connect_timeout_secs: 2,
            read_timeout_secs: 2,
        }
    }
}

impl SocketConfig {
    /// Default configuration for another endpoint
    pub fn endpoint(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// The bare HTTP/1.0 request line, terminated by a blank line
    pub fn request(&self) -> String {
        format!("POST {} HTTP/1.0\r\n\r\n", self.path)
    }
}
