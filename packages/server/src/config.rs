//! Server configuration.
//!
//! The binary fills this from CLI flags and environment variables; tests
//! build it directly.

use std::time::Duration;

use crate::usecase::DEFAULT_WRITE_TIMEOUT;

pub const DEFAULT_STREAM_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_FRAMED_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(2);

/// Everything the relay needs to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address for raw TCP clients
    pub stream_addr: String,
    /// Listen address for WebSocket clients and the HTTP API
    pub framed_addr: String,
    /// Base URL of the identity service (`{auth_url}/login`, `{auth_url}/register`)
    pub auth_url: String,
    /// Per-recipient deadline for one broadcast write
    pub write_timeout: Duration,
    /// Refresh interval of the terminal status table; `None` disables it
    pub status_interval: Option<Duration>,
}

impl ServerConfig {
    /// Default listen addresses and timings for the given identity service
    pub fn new(auth_url: impl Into<String>) -> Self {
        Self {
            stream_addr: DEFAULT_STREAM_ADDR.to_string(),
            framed_addr: DEFAULT_FRAMED_ADDR.to_string(),
            auth_url: auth_url.into(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            status_interval: Some(DEFAULT_STATUS_INTERVAL),
        }
    }

    /// `0` disables the status table
    pub fn with_status_interval_secs(mut self, secs: u64) -> Self {
        self.status_interval = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        // テスト項目: 既定値が設定される
        // given (前提条件):
        // when (操作):
        let config = ServerConfig::new("http://auth.local");

        // then (期待する結果):
        assert_eq!(config.stream_addr, "0.0.0.0:8080");
        assert_eq!(config.framed_addr, "0.0.0.0:8081");
        assert_eq!(config.auth_url, "http://auth.local");
        assert_eq!(config.write_timeout, Duration::from_secs(5));
        assert_eq!(config.status_interval, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_zero_status_interval_disables_table() {
        // テスト項目: ステータス表示間隔 0 で無効になる
        // given (前提条件):
        let config = ServerConfig::new("http://auth.local");

        // when (操作):
        let disabled = config.clone().with_status_interval_secs(0);
        let five = config.with_status_interval_secs(5);

        // then (期待する結果):
        assert_eq!(disabled.status_interval, None);
        assert_eq!(five.status_interval, Some(Duration::from_secs(5)));
    }
}
