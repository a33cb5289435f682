use std::{fmt::Debug, pin::Pin, time::Duration};

use futures_util::{
    future::{self, BoxFuture},
    FutureExt, SinkExt, StreamExt,
};
use snafu::prelude::*;
use tokio::time::Sleep;
use tokio_tungstenite as websocket;

use crate::{
    error,
    ws::message::{Message, MessageStreamSink, MessageStreamSinkError},
    Error,
};

/// What the transport underneath the client is doing now.
pub(crate) enum Link {
    /// no connection, no pending retry
    Idle,
    /// waiting reconnect delay
    Backoff(Pin<Box<Sleep>>),
    /// connection handle created, waiting open
    Connecting(BoxFuture<'static, Result<MessageStreamSink, Error>>),
    /// ready to send/receive
    Open(MessageStreamSink),
}

pub(crate) enum LinkEvent {
    RetryDue,
    Connected(Result<MessageStreamSink, Error>),
    Message(Option<Result<Message, MessageStreamSinkError>>),
}

impl Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Backoff(sleep) => f
                .debug_tuple("Backoff")
                .field(&sleep.deadline())
                .finish(),
            Self::Connecting(_) => f.write_str("Connecting"),
            Self::Open(stream) => f.debug_tuple("Open").field(stream).finish(),
        }
    }
}

impl Link {
    pub fn connecting(u: url::Url) -> Self {
        let connect = async move {
            websocket::connect_async(&u)
                .await
                .map(|(ws, _)| MessageStreamSink::new(ws))
                .with_context(|_| error::Connect { url: u.as_str() })
        };

        Self::Connecting(connect.boxed())
    }

    pub fn backoff(delay: Duration) -> Self {
        Self::Backoff(Box::pin(tokio::time::sleep(delay)))
    }

    /// A connection handle exists, i.e. connecting or open.
    pub fn has_handle(&self) -> bool {
        matches!(self, Self::Connecting(_) | Self::Open(_))
    }

    /// Wait next thing happened on the link. Never resolves when idle.
    ///
    /// The link must be replaced after `RetryDue` or `Connected` is returned.
    pub async fn next(&mut self) -> LinkEvent {
        match self {
            Self::Idle => future::pending().await,
            Self::Backoff(sleep) => {
                sleep.await;
                LinkEvent::RetryDue
            }
            Self::Connecting(connect) => LinkEvent::Connected(connect.await),
            Self::Open(stream) => LinkEvent::Message(stream.next().await),
        }
    }

    /// Drop the link, closing an open connection without going through reconnect path.
    pub async fn shutdown(&mut self) {
        if let Self::Open(mut stream) = std::mem::replace(self, Self::Idle) {
            log::debug!("Closing websocket connection");
            if let Err(err) = stream.close().await {
                log::debug!("Close websocket connection failed: {}", err);
            }
        }
    }
}
