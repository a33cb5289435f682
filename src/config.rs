//! Client configuration.

use serde::{Deserialize, Serialize};

/// Reconnect delay used while the failure count stays under [`Config::max_fails`]
pub const MIN_RETRY_MS: u64 = 3000;

/// Ceiling of reconnect delay
pub const MAX_RETRY_MS: u64 = 300_000;

/// Consecutive failures allowed before reconnect delay starts growing
pub const MAX_WEBSOCKET_FAILS: u32 = 7;

/// Stream client configuration.
///
/// Can be deserialized from any serde format, missing fields take default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// minimal reconnect delay in milliseconds
    pub min_retry_ms: u64,
    /// maximal reconnect delay in milliseconds
    pub max_retry_ms: u64,
    /// failure count threshold, delay grows quadratically after it
    pub max_fails: u32,
    /// port appended to a derived `ws://` url which has no port
    pub websocket_port: u16,
    /// port appended to a derived `wss://` url which has no port
    pub websocket_secure_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_retry_ms: MIN_RETRY_MS,
            max_retry_ms: MAX_RETRY_MS,
            max_fails: MAX_WEBSOCKET_FAILS,
            websocket_port: 80,
            websocket_secure_port: 443,
        }
    }
}

impl Config {
    /// set minimal reconnect delay
    pub fn with_min_retry_ms(mut self, ms: u64) -> Self {
        self.min_retry_ms = ms;
        self
    }

    /// set maximal reconnect delay
    pub fn with_max_retry_ms(mut self, ms: u64) -> Self {
        self.max_retry_ms = ms;
        self
    }

    /// set failure count threshold
    pub fn with_max_fails(mut self, count: u32) -> Self {
        self.max_fails = count;
        self
    }

    /// set port for derived `ws://` url
    pub fn with_websocket_port(mut self, port: u16) -> Self {
        self.websocket_port = port;
        self
    }

    /// set port for derived `wss://` url
    pub fn with_websocket_secure_port(mut self, port: u16) -> Self {
        self.websocket_secure_port = port;
        self
    }

    /// Max delay is never below min delay.
    pub(crate) fn normalized(mut self) -> Self {
        if self.max_retry_ms < self.min_retry_ms {
            log::warn!(
                "max_retry_ms {} is less than min_retry_ms {}, raise it",
                self.max_retry_ms,
                self.min_retry_ms
            );
            self.max_retry_ms = self.min_retry_ms;
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialize_partial_config() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "min_retry_ms": 10,
        }))
        .unwrap();

        assert_eq!(config.min_retry_ms, 10);
        assert_eq!(config.max_retry_ms, MAX_RETRY_MS);
        assert_eq!(config.max_fails, MAX_WEBSOCKET_FAILS);
    }

    #[test]
    fn test_normalized_raises_max_retry() {
        let config = Config::default()
            .with_min_retry_ms(5000)
            .with_max_retry_ms(100)
            .normalized();

        assert_eq!(config.max_retry_ms, 5000);
    }
}
