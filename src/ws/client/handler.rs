//! Callbacks of the stream client.

use std::{fmt::Debug, future::Future};

use crate::{ws::Event, Error};

/// Receives everything the stream client wants to tell its owner.
///
/// Every method has an empty default body, implement only the ones you need. Callbacks are
/// awaited one by one on the client task, in the order of the transitions that caused them,
/// so a slow callback delays everything after it.
#[async_trait::async_trait]
pub trait Handler: Send {
    /// a server pushed event passed sequence validation
    async fn on_event(&mut self, _event: Event) {}

    /// connection opened for the first time, or after an explicit close
    async fn on_first_connect(&mut self) {}

    /// connection opened again after failures
    async fn on_reconnect(&mut self) {}

    /// server can not resume our event stream, events between last connection and this one
    /// are lost and must be reloaded by other means
    async fn on_missed_events(&mut self) {}

    /// transport level error, informational only, a close always follows
    async fn on_error(&mut self, _err: Error) {}

    /// connection closed, a reconnect is scheduled
    async fn on_close(&mut self, _fail_count: u32) {}
}

/// Handler which ignores everything.
#[async_trait::async_trait]
impl Handler for () {}

#[async_trait::async_trait]
impl<H> Handler for Box<H>
where
    H: Handler + ?Sized,
{
    async fn on_event(&mut self, event: Event) {
        (**self).on_event(event).await
    }

    async fn on_first_connect(&mut self) {
        (**self).on_first_connect().await
    }

    async fn on_reconnect(&mut self) {
        (**self).on_reconnect().await
    }

    async fn on_missed_events(&mut self) {
        (**self).on_missed_events().await
    }

    async fn on_error(&mut self, err: Error) {
        (**self).on_error(err).await
    }

    async fn on_close(&mut self, fail_count: u32) {
        (**self).on_close(fail_count).await
    }
}

/// Handler built from an async closure which only cares about events.
pub struct EventFn<F> {
    f: F,
}

impl<F> Debug for EventFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EventFn")
    }
}

#[async_trait::async_trait]
impl<F, Fut> Handler for EventFn<F>
where
    F: FnMut(Event) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_event(&mut self, event: Event) {
        (self.f)(event).await
    }
}

/// Create a handler from an async closure which receives events.
pub fn on_event<F, Fut>(f: F) -> EventFn<F>
where
    F: FnMut(Event) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    EventFn { f }
}
