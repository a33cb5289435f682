use serde::{Deserialize, Serialize};

/// Hello event data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    /// connection id assigned by server
    pub connection_id: String,
    /// server version string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
}
