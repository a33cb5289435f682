mod backoff;
mod link;
mod session;

use std::time::SystemTime;

use futures_util::SinkExt;
use serde_json::json;
use tokio::sync::{mpsc, oneshot, watch};

use self::{
    backoff::Backoff,
    link::{Link, LinkEvent},
    session::Session,
};
use super::{ConnectionState, Handler, Status};
use crate::{
    ws::{
        event::{Event, Response},
        message::{action, Message},
        url::ConnectURL,
    },
    Config, Error,
};

/// Where to connect, kept for automatic reconnect.
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub url: ConnectURL,
    pub token: Option<String>,
}

#[derive(Debug)]
pub(crate) enum Command {
    /// `None` reuses last target
    Initialize(Option<Target>),
    Send {
        action: String,
        data: Option<serde_json::Value>,
        reply: Option<oneshot::Sender<Response>>,
    },
    Close,
    Reconnect,
}

/// The stream client state machine, owned by a single task.
#[derive(Debug)]
pub(crate) struct ClientInner<H> {
    handler: H,
    backoff: Backoff,
    target: Option<Target>,
    link: Link,
    session: Session,
    connect_fail_count: u32,
    status: Status,
    status_tx: watch::Sender<Status>,
}

impl<H> ClientInner<H>
where
    H: Handler,
{
    pub fn new(config: &Config, handler: H) -> (Self, watch::Receiver<Status>) {
        let status = Status::new(config.max_fails);
        let (status_tx, status_rx) = watch::channel(status.clone());

        let inner = Self {
            handler,
            backoff: Backoff::new(config),
            target: None,
            link: Link::Idle,
            session: Session::default(),
            connect_fail_count: 0,
            status,
            status_tx,
        };

        (inner, status_rx)
    }

    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        log::debug!("Client task start");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        log::debug!("All client handles dropped, stop");
                        self.link.shutdown().await;
                        break;
                    }
                },

                event = self.link.next() => self.handle_link_event(event).await,
            }
        }
    }

    fn publish(&mut self, state: ConnectionState) {
        self.status.state = state;
        self.status.fail_count = self.connect_fail_count;
        match state {
            ConnectionState::Open => self.status.last_connect_at = Some(SystemTime::now()),
            ConnectionState::Backoff => self.status.last_disconnect_at = Some(SystemTime::now()),
            _ => {}
        }

        // receivers may all be gone while the task still serves commands
        let _ = self.status_tx.send(self.status.clone());
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Initialize(target) => self.initialize(target),
            Command::Send {
                action,
                data,
                reply,
            } => self.send_message(action, data, reply).await,
            Command::Close => self.close().await,
            Command::Reconnect => {
                self.close().await;
                self.initialize(None);
            }
        }
    }

    fn initialize(&mut self, target: Option<Target>) {
        if self.link.has_handle() {
            log::debug!("Connection handle already exists, ignore initialize");
            return;
        }

        if let Some(target) = target {
            self.target = Some(target);
        }

        let target = match self.target {
            Some(ref target) => target,
            None => {
                log::error!("Websocket must have connection url");
                return;
            }
        };

        let u = target
            .url
            .clone()
            .with_resume(self.session.resume())
            .url();

        log::info!("Connecting websocket: {}", u);

        // a pending backoff timer is dropped here, so reconnect attempts never overlap
        self.link = Link::connecting(u);

        log::debug!("Move to connecting state");
        self.publish(ConnectionState::Connecting);
    }

    async fn send_message(
        &mut self,
        action: String,
        data: Option<serde_json::Value>,
        reply: Option<oneshot::Sender<Response>>,
    ) {
        let request = self.session.next_request(action, data, reply);

        if let Link::Open(ref mut stream) = self.link {
            log::trace!("Send {} request with seq {}", request.action, request.seq);
            if let Err(err) = stream.send(request).await {
                log::warn!("Send request failed: {}", err);
            }
            return;
        }

        if let Link::Connecting(_) = self.link {
            log::debug!(
                "Connection not open yet, drop {} request with seq {}",
                request.action,
                request.seq
            );
            return;
        }

        log::debug!(
            "Connection closed, drop {} request with seq {} and reinitialize",
            request.action,
            request.seq
        );

        self.link = Link::Idle;
        self.initialize(None);
    }

    async fn close(&mut self) {
        log::debug!("Close client");

        self.connect_fail_count = 0;
        self.session.reset_response_sequence();

        self.link.shutdown().await;

        log::debug!("Move to disconnected state");
        self.publish(ConnectionState::Disconnected);
    }

    async fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::RetryDue => {
                log::debug!("Reconnect delay elapsed");
                self.link = Link::Idle;
                self.initialize(None);
            }

            LinkEvent::Connected(Ok(stream)) => {
                self.link = Link::Open(stream);
                self.on_open().await;
            }

            LinkEvent::Connected(Err(err)) => {
                log::warn!("{}", err);
                self.link = Link::Idle;
                self.handler.on_error(err).await;
                self.on_closed().await;
            }

            LinkEvent::Message(None) => {
                log::info!("Websocket connection closed by server");
                self.on_closed().await;
            }

            LinkEvent::Message(Some(Err(err))) if err.is_fatal() => {
                log::warn!("Find message stream broken when receive message: {}", err);
                self.link = Link::Idle;
                self.handler.on_error(Error::MessageStream { source: err }).await;
                self.on_closed().await;
            }

            LinkEvent::Message(Some(Err(err))) if err.is_desync() => {
                log::warn!("{}, reconnect", err);
                self.resync().await;
            }

            LinkEvent::Message(Some(Err(err))) => {
                log::warn!("Message stream error happened but ignored: {}", err);
            }

            LinkEvent::Message(Some(Ok(message))) => {
                log::trace!("Received new {} message", message.type_name());
                self.dispatch(message).await;
            }
        }
    }

    async fn on_open(&mut self) {
        log::debug!("Move to open state");

        if let Some(token) = self.target.as_ref().and_then(|t| t.token.clone()) {
            log::debug!("Send authentication challenge");
            self.send_message(
                action::AUTHENTICATION_CHALLENGE.to_string(),
                Some(json!({ "token": token })),
                None,
            )
            .await;
        }

        let reconnected = self.connect_fail_count > 0;
        self.connect_fail_count = 0;
        self.publish(ConnectionState::Open);

        if reconnected {
            log::info!("Websocket reconnected");
            self.handler.on_reconnect().await;
        } else {
            log::info!("Websocket connected");
            self.handler.on_first_connect().await;
        }
    }

    /// Close path shared by every way a connection can end, except explicit close.
    async fn on_closed(&mut self) {
        self.link = Link::Idle;
        self.session.reset_response_sequence();
        self.connect_fail_count += 1;

        self.handler.on_close(self.connect_fail_count).await;

        let delay = self.backoff.delay(self.connect_fail_count);
        log::info!(
            "Websocket closed {} times in a row, reconnect in {:?}",
            self.connect_fail_count,
            delay
        );

        self.link = Link::backoff(delay);

        log::debug!("Move to backoff state");
        self.publish(ConnectionState::Backoff);
    }

    /// Drop a connection whose event stream we fell out of, and resume from last good seq.
    async fn resync(&mut self) {
        self.connect_fail_count = 0;
        self.session.reset_response_sequence();

        self.link.shutdown().await;
        self.on_closed().await;
    }

    async fn dispatch(&mut self, message: Message) {
        match message {
            Message::Response(response) => {
                if let Some(ref err) = response.error {
                    log::warn!("Request {} got error response: {}", response.seq_reply, err);
                }

                let seq = response.seq_reply;
                if self.session.resolve(response) {
                    log::trace!(
                        "Response {} delivered, {} still pending",
                        seq,
                        self.session.pending_count()
                    );
                } else {
                    log::trace!("No one waits response {}", seq);
                }
            }
            Message::Event(event) => self.dispatch_event(event).await,
        }
    }

    async fn dispatch_event(&mut self, event: Event) {
        if event.is_hello() {
            let connection_id = event.connection_id().unwrap_or_default();
            if connection_id.is_empty() {
                log::warn!("Hello event has no connection id");
            }

            if self.session.observe_hello(connection_id) {
                log::info!("Server lost our event stream, events missed");
                self.handler.on_missed_events().await;
            }

            log::debug!("Connection id: {}", self.session.connection_id());
        }

        if let Err(gap) = self.session.check_sequence(event.seq) {
            log::warn!("{}, reconnect", gap);
            self.resync().await;
            return;
        }

        log::trace!(
            "Received {} event with seq {}, next expected {}",
            event.event,
            event.seq,
            self.session.server_sequence()
        );

        self.handler.on_event(event).await;
    }
}
