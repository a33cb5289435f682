//! # Chatsock
//!
//! Real-time websocket client of a team chat server.
//!
//! A single [`Client`] keeps one live connection to the server, validates the strict
//! ordering of server pushed events, resumes the stream across reconnects and correlates
//! request replies. Everything the client wants to tell its owner goes through a [`Handler`].
//!
//! ```no_run
//! use chatsock::{ws::handler, Client, Config};
//!
//! # async fn run() {
//! let client = Client::new(
//!     Config::default(),
//!     handler::on_event(|event| async move {
//!         println!("{} #{}", event.event, event.seq);
//!     }),
//! );
//!
//! client.initialize("wss://chat.example.com/api/v4/websocket", Some("token".to_string()));
//! # }
//! ```

#![deny(clippy::all)]
#![deny(missing_debug_implementations, missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
pub mod ws;

pub use config::{Config, MAX_RETRY_MS, MAX_WEBSOCKET_FAILS, MIN_RETRY_MS};
pub use error::Error;
pub use ws::{Client, Handler};
