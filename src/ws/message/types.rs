use serde::{Deserialize, Serialize};

/// Request envelope, client -> server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// action name, see [`action`]
    pub action: String,
    /// outgoing sequence number, echoed back as `seq_reply`
    pub seq: u64,
    /// action arguments
    pub data: Option<serde_json::Value>,
}

impl Request {
    /// encode to json text
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Action names understood by server
pub mod action {
    /// authenticate the connection with a token
    pub const AUTHENTICATION_CHALLENGE: &str = "authentication_challenge";
    /// tell others current user is typing
    pub const USER_TYPING: &str = "user_typing";
    /// subscribe events of a channel
    pub const SUBSCRIBE: &str = "subscribe";
    /// unsubscribe events of a channel
    pub const UNSUBSCRIBE: &str = "unsubscribe";
    /// update active status of current user
    pub const USER_UPDATE_ACTIVE_STATUS: &str = "user_update_active_status";
    /// get all user statuses
    pub const GET_STATUSES: &str = "get_statuses";
    /// get statuses of given users
    pub const GET_STATUSES_BY_IDS: &str = "get_statuses_by_ids";
}
