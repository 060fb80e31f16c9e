//! Unified error type.

/// The error type returned by formcast's fallible operations.
///
/// HTTP-level outcomes (404, 411, etc.) are expressed as
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures and the ingestion-path failures that get logged
/// and contained: transport, parse and storage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Binding or accepting on the HTTP socket.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Datagram bind, send or receive.
    #[error("transport: {0}")]
    Transport(#[source] std::io::Error),

    /// A submission that is not a well-formed `key=value&...` body.
    #[error("parse: {0}")]
    Parse(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn storage(e: impl std::fmt::Display) -> Self {
        Self::Storage(e.to_string())
    }
}
