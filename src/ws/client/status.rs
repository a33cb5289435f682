use std::time::SystemTime;

/// Connection state of the stream client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// never connected, or explicitly closed
    Disconnected,
    /// connection handle created, waiting open
    Connecting,
    /// ready to send and receive
    Open,
    /// connection lost, reconnect scheduled
    Backoff,
}

/// Snapshot of stream client connection status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// current state
    pub state: ConnectionState,
    /// consecutive failed or terminated connection attempts
    pub fail_count: u32,
    /// last time a connection opened
    pub last_connect_at: Option<SystemTime>,
    /// last time a connection closed
    pub last_disconnect_at: Option<SystemTime>,
    pub(crate) max_fails: u32,
}

impl Status {
    pub(crate) fn new(max_fails: u32) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            fail_count: 0,
            last_connect_at: None,
            last_disconnect_at: None,
            max_fails,
        }
    }

    /// Failures exceeded the threshold after which reconnect delay starts growing,
    /// the server is likely unreachable rather than blipping.
    pub fn is_degraded(&self) -> bool {
        self.fail_count > self.max_fails
    }

    /// true if connection is open
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_degraded_only_after_threshold() {
        let mut status = Status::new(7);
        status.fail_count = 7;
        assert!(!status.is_degraded());
        status.fail_count = 8;
        assert!(status.is_degraded());
    }
}
