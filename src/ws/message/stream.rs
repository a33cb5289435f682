use std::task::Poll;

use bytes::Bytes;
use futures_util::{ready, Sink, SinkExt, Stream, StreamExt};
use snafu::prelude::*;
use tokio_tungstenite::tungstenite as websocket;

use super::{Message, ParseMessageError, Request};
use crate::ws::client::WebsocketClient;

/// Error when read/write message stream/sink
#[derive(Debug, Snafu)]
#[snafu(module(error), context(suffix(false)))]
pub enum MessageStreamSinkError {
    /// underlying websocket stream broken
    #[snafu(display("underlying websocket stream broken: {source}"))]
    Websocket {
        /// source error
        source: websocket::Error,
    },

    /// received a raw frame
    #[snafu(display("received a non-data type frame"))]
    NotDataFrame,

    /// parse frame to message failed
    #[snafu(display("parse frame to message failed: {source}"))]
    ParseMessageFailed {
        /// source error
        source: ParseMessageError,
    },

    /// encode request to json failed
    #[snafu(display("encode request failed: {source}"))]
    EncodeRequestFailed {
        /// source error
        source: serde_json::Error,
    },
}

impl MessageStreamSinkError {
    /// Check if this error will make the stream/sink stop
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Websocket { .. } => true,
            Self::NotDataFrame => false,
            Self::ParseMessageFailed { .. } => false,
            Self::EncodeRequestFailed { .. } => false,
        }
    }

    /// Check if an event arrived whose position in the event stream is unknown
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            Self::ParseMessageFailed {
                source: ParseMessageError::InvalidEventSequence { .. }
            }
        )
    }
}

/// Typed message stream/sink over a websocket connection
#[derive(Debug)]
pub struct MessageStreamSink {
    ws: WebsocketClient,
}

impl MessageStreamSink {
    /// Construct a new stream with underlying websocket connection.
    pub fn new(ws: WebsocketClient) -> Self {
        Self { ws }
    }
}

impl Stream for MessageStreamSink {
    type Item = Result<Message, MessageStreamSinkError>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        loop {
            let frame = match ready!(self.ws.poll_next_unpin(cx)) {
                Some(frame) => frame.context(error::Websocket)?,
                None => return Poll::Ready(None),
            };

            let buffer: Bytes = match frame {
                websocket::Message::Text(text) => text.into(),
                websocket::Message::Binary(data) => data.into(),
                // control frames are answered by tungstenite itself
                websocket::Message::Ping(_) | websocket::Message::Pong(_) => continue,
                websocket::Message::Close(frame) => {
                    log::debug!("Received close frame: {:?}", frame);
                    continue;
                }
                _ => return Poll::Ready(Some(Err(MessageStreamSinkError::NotDataFrame))),
            };

            let result = Message::decode(buffer.clone()).map_err(|e| {
                log::trace!(
                    "Parse failed message data: {}",
                    std::str::from_utf8(&buffer).unwrap_or("<not-utf8-binary>")
                );
                MessageStreamSinkError::ParseMessageFailed { source: e }
            });

            return Poll::Ready(Some(result));
        }
    }
}

impl Sink<Request> for MessageStreamSink {
    type Error = MessageStreamSinkError;

    fn poll_ready(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        self.ws
            .poll_ready_unpin(cx)
            .map_err(|e| Self::Error::Websocket { source: e })
    }

    fn start_send(mut self: std::pin::Pin<&mut Self>, item: Request) -> Result<(), Self::Error> {
        let text = item.encode().context(error::EncodeRequestFailed)?;
        self.ws
            .start_send_unpin(websocket::Message::Text(text))
            .map_err(|e| Self::Error::Websocket { source: e })
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        self.ws
            .poll_flush_unpin(cx)
            .map_err(|e| Self::Error::Websocket { source: e })
    }

    fn poll_close(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        self.ws
            .poll_close_unpin(cx)
            .map_err(|e| Self::Error::Websocket { source: e })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse_failed(data: &'static [u8]) -> MessageStreamSinkError {
        let source = Message::decode(Bytes::from_static(data)).unwrap_err();
        MessageStreamSinkError::ParseMessageFailed { source }
    }

    #[test]
    fn test_event_without_seq_is_desync() {
        let err = parse_failed(br#"{"event": "posted", "data": {}}"#);
        assert!(err.is_desync());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_other_parse_errors_are_not_desync() {
        assert!(!parse_failed(b"{not json").is_desync());
        assert!(!parse_failed(br#"{"seq": 1}"#).is_desync());
        assert!(!parse_failed(br#"{"seq_reply": "x"}"#).is_desync());
        assert!(!MessageStreamSinkError::NotDataFrame.is_desync());
    }
}
