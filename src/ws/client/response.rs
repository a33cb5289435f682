use std::{future::Future, pin::Pin, task::Poll};

use snafu::prelude::*;
use tokio::sync::oneshot;

use crate::ws::event::Response;

/// Error when wait a correlated response
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module(error), context(suffix(false)))]
pub enum ResponseError {
    /// the pending slot was discarded before any reply arrived, because the client stopped
    /// or a later request took over the same sequence number
    #[snafu(display("response slot discarded before reply arrived"))]
    Canceled,
}

/// Future of the reply to a single request.
///
/// There is no timeout, wrap it in [`tokio::time::timeout`] if you need one.
/// A request sent while the connection is down is dropped, its future stays pending.
#[derive(Debug)]
#[must_use = "dropping it discards the reply"]
pub struct ResponseFuture {
    pub(crate) rx: oneshot::Receiver<Response>,
}

impl Future for ResponseFuture {
    type Output = Result<Response, ResponseError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.ok().context(error::Canceled))
    }
}
