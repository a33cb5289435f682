//! Chat server websocket protocol client implement

mod client;
pub mod event;
pub mod message;
pub mod url;

pub use client::{handler, Client, ConnectionState, Handler, ResponseError, ResponseFuture, Status};
pub use event::{Event, EventKind, Response};
pub use self::url::{ConnectURL, ResumeArguments};
