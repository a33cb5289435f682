pub mod handler;
mod inner;
mod response;
mod status;

pub use handler::Handler;
pub use response::{ResponseError, ResponseFuture};
pub use status::{ConnectionState, Status};

use serde_json::json;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite as websocket;

use crate::{
    ws::{message::action, url::ConnectURL},
    Config,
};
use inner::{ClientInner, Command, Target};

pub(crate) type WebsocketClient =
    websocket::WebSocketStream<websocket::MaybeTlsStream<tokio::net::TcpStream>>;

/// Real-time stream client of a chat server.
///
/// Keeps one websocket connection alive, resumes the event stream across reconnects and
/// validates every server pushed event against the expected sequence number. All state lives
/// in a background task, this type is a cheap handle to it. The task stops after every handle
/// is dropped.
///
/// No method here fails: problems are logged or reported to the [`Handler`].
#[derive(Debug, Clone)]
pub struct Client {
    tx: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<Status>,
}

impl Client {
    /// Create a client and spawn its background task.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn new<H>(config: Config, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        let config = config.normalized();
        let (tx, rx) = mpsc::unbounded_channel();
        let (inner, status) = ClientInner::new(&config, handler);

        tokio::spawn(inner.run(rx));

        Self { tx, status }
    }

    fn command(&self, command: Command) {
        if self.tx.send(command).is_err() {
            log::warn!("Client task stopped, command ignored");
        }
    }

    /// Connect to the websocket url, authenticating with `token` if given.
    ///
    /// Does nothing if a connection already exists or is being established.
    pub fn initialize<S: AsRef<str> + ?Sized>(&self, url: &S, token: Option<String>) {
        let url = url.as_ref();
        match url.parse() {
            Ok(url) => self.initialize_with(url, token),
            Err(err) => log::error!("Can't initialize with url {}: {}", url, err),
        }
    }

    /// Same as [`initialize`](Self::initialize) but with an already parsed url.
    pub fn initialize_with(&self, url: ConnectURL, token: Option<String>) {
        self.command(Command::Initialize(Some(Target { url, token })))
    }

    /// Connect again using last url and token.
    pub fn reinitialize(&self) {
        self.command(Command::Initialize(None))
    }

    /// Close the connection and stop reconnecting, until next initialize.
    pub fn close(&self) {
        self.command(Command::Close)
    }

    /// Close then connect again with last url and token.
    pub fn reconnect(&self) {
        self.command(Command::Reconnect)
    }

    /// Send a request without waiting reply.
    ///
    /// If the connection is not open the request is dropped, and a reconnect is started if
    /// none is in progress.
    pub fn send_message<A: Into<String>>(&self, action: A, data: Option<serde_json::Value>) {
        self.command(Command::Send {
            action: action.into(),
            data,
            reply: None,
        })
    }

    /// Send a request and get a future of its reply.
    ///
    /// Same drop policy as [`send_message`](Self::send_message) applies, in which case the
    /// future never resolves.
    pub fn request<A: Into<String>>(
        &self,
        action: A,
        data: Option<serde_json::Value>,
    ) -> ResponseFuture {
        let (reply, rx) = oneshot::channel();
        self.command(Command::Send {
            action: action.into(),
            data,
            reply: Some(reply),
        });
        ResponseFuture { rx }
    }

    /// Tell others current user is typing in a channel, or a thread when `parent_id` is not empty.
    pub fn user_typing(&self, channel_id: &str, parent_id: &str) {
        self.send_message(
            action::USER_TYPING,
            Some(json!({ "channel_id": channel_id, "parent_id": parent_id })),
        )
    }

    /// Subscribe events of a channel.
    pub fn subscribe(&self, channel_id: &str) {
        self.send_message(action::SUBSCRIBE, Some(json!({ "channel_id": channel_id })))
    }

    /// Unsubscribe events of a channel.
    pub fn unsubscribe(&self, channel_id: &str) {
        self.send_message(
            action::UNSUBSCRIBE,
            Some(json!({ "channel_id": channel_id })),
        )
    }

    /// Update active status of current user, `manual` marks a user initiated change.
    pub fn user_update_active_status(&self, user_is_active: bool, manual: bool) {
        self.send_message(
            action::USER_UPDATE_ACTIVE_STATUS,
            Some(json!({ "user_is_active": user_is_active, "manual": manual })),
        )
    }

    /// Get statuses of all users.
    pub fn get_statuses(&self) -> ResponseFuture {
        self.request(action::GET_STATUSES, None)
    }

    /// Get statuses of given users.
    pub fn get_statuses_by_ids<S: AsRef<str>>(&self, user_ids: &[S]) -> ResponseFuture {
        let user_ids: Vec<&str> = user_ids.iter().map(|id| id.as_ref()).collect();
        self.request(
            action::GET_STATUSES_BY_IDS,
            Some(json!({ "user_ids": user_ids })),
        )
    }

    /// Latest connection status.
    pub fn status(&self) -> Status {
        self.status.borrow().clone()
    }

    /// A receiver notified on every connection status change.
    pub fn watch_status(&self) -> watch::Receiver<Status> {
        self.status.clone()
    }
}
