//! The Form Intake Endpoint.
//!
//! Forwards each POST body as one datagram and redirects to `/`. Delivery is
//! at-most-once: nothing waits for the listener, and a send failure is only
//! logged.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

pub struct Intake {
    target: SocketAddr,
}

impl Intake {
    /// `target` is the Datagram Listener's address.
    pub fn new(target: SocketAddr) -> Self {
        Self { target }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// `POST <any path>`.
    ///
    /// Without a `Content-Length` the request is malformed: `411`, nothing sent.
    /// Otherwise always `302 Found` to `/`, whatever happened to the datagram.
    pub async fn submit(self: Arc<Self>, req: Request) -> Response {
        if req.content_length().is_none() {
            warn!(path = %req.path(), "submission without content-length rejected");
            return Response::status(Status::LengthRequired);
        }

        if let Err(e) = self.forward(req.body()).await {
            error!(target = %self.target, "failed to send data: {e}");
        }

        Response::redirect("/")
    }

    /// Sends `payload` as a single datagram from a fresh ephemeral socket,
    /// which is closed on return.
    pub async fn forward(&self, payload: &[u8]) -> Result<()> {
        let local: SocketAddr = if self.target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await.map_err(Error::Transport)?;
        let sent = socket.send_to(payload, self.target).await.map_err(Error::Transport)?;
        debug!(target = %self.target, bytes = sent, "submission forwarded");
        Ok(())
    }
}
