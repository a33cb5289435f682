//! client error types

use snafu::prelude::*;
use tokio_tungstenite::tungstenite;

use super::ws::message::MessageStreamSinkError;

/// Error reported to [`Handler::on_error`](crate::ws::Handler::on_error).
///
/// All of them are transport level and followed by the automatic reconnect path.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), context(suffix(false)))]
pub enum Error {
    /// Connect to websocket server failed
    #[snafu(display("connect websocket {url} failed: {source}"))]
    Connect {
        /// connected url
        url: String,
        /// source error
        source: tungstenite::Error,
    },

    /// underlying message stream broken
    #[snafu(display("underlying message stream broken: {source}"))]
    MessageStream {
        /// source error
        source: MessageStreamSinkError,
    },
}
