//! Server pushed events and correlated responses.

mod kind;
mod types;

pub use kind::EventKind;
pub use types::Hello;

use serde::{Deserialize, Serialize};

/// Event pushed by server, server -> client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// event name
    pub event: String,

    /// sequence number in the event stream of this connection
    pub seq: u64,

    /// event body, shape differs for each event
    #[serde(default)]
    pub data: serde_json::Value,

    /// broadcast scope of the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<serde_json::Value>,
}

impl Event {
    /// typed event name
    pub fn kind(&self) -> EventKind {
        EventKind::from(self.event.as_str())
    }

    /// check if this is the first event of a connection
    pub fn is_hello(&self) -> bool {
        self.event == EventKind::Hello.as_str()
    }

    /// connection id carried by a hello event
    pub fn connection_id(&self) -> Option<&str> {
        self.data.get("connection_id")?.as_str()
    }

    /// parse data of a hello event
    pub fn hello(&self) -> Option<Hello> {
        if !self.is_hello() {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }
}

/// Reply of a client request, server -> client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// sequence number of the request this response replies to
    pub seq_reply: u64,

    /// `OK` or `FAIL`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// response body
    #[serde(default)]
    pub data: serde_json::Value,

    /// application level error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl Response {
    /// true if no error carried
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
