//! # formcast
//!
//! A small site whose form submissions travel over UDP to a separate
//! listener that stores them as documents.
//!
//! ```text
//! client ─HTTP─▶ front end ─datagram─▶ listener ─▶ persister ─▶ libSQL
//!                  │
//!                  └─ index, /blog, static files, 404
//! ```
//!
//! ## The contract
//!
//! - `POST` to any path forwards the body as one datagram and answers
//!   `302 Location: /`. The client never learns whether it was stored.
//! - Delivery is at-most-once. No acknowledgement, no retry, no queue.
//! - The listener handles one datagram at a time: receive, parse, stamp,
//!   insert, then receive again.
//! - Malformed submissions and storage failures are logged and dropped.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use formcast::{Component, Config, supervisor};
//!
//! #[tokio::main]
//! async fn main() -> formcast::Result<()> {
//!     supervisor::run(Config::default(), Component::All).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod app;
pub mod config;
pub mod content;
pub mod health;
pub mod intake;
pub mod listener;
pub mod persist;
pub mod record;
pub mod store;
pub mod supervisor;
pub mod telemetry;

pub use config::{Component, Config};
pub use error::{Error, Result};
pub use handler::{Handler, with_state};
pub use listener::DatagramListener;
pub use method::Method;
pub use persist::{Outcome, Persister};
pub use record::Record;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use store::{DocumentStore, LibsqlStore, MemoryStore};
