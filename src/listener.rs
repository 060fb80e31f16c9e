//! The Datagram Listener.
//!
//! Binds once, then receives one datagram at a time and hands it to the
//! [`Persister`] before receiving the next. A slow insert delays the next
//! receive; there is no buffering beyond the kernel's socket queue.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::persist::Persister;

pub struct DatagramListener {
    socket: UdpSocket,
    chunk_size: usize,
}

impl DatagramListener {
    /// Binds `addr`. Datagrams longer than `chunk_size` bytes are truncated
    /// on receipt.
    pub async fn bind(addr: SocketAddr, chunk_size: usize) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await.map_err(Error::Transport)?;
        Ok(Self { socket, chunk_size: chunk_size.max(1) })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Error::Transport)
    }

    /// Receives until `shutdown` is cancelled or the socket fails.
    ///
    /// Cancellation is observed only while waiting for a datagram; a
    /// persistence call in progress runs to completion. A receive error is
    /// fatal: the socket is released and the error returned.
    pub async fn run(self, persister: &Persister, shutdown: CancellationToken) -> Result<()> {
        let addr = self.local_addr()?;
        let mut buf = vec![0u8; self.chunk_size];
        info!(%addr, chunk_size = self.chunk_size, "datagram listener started");

        let result = loop {
            let (len, peer) = tokio::select! {
                biased;

                () = shutdown.cancelled() => break Ok(()),

                res = self.socket.recv_from(&mut buf) => match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!(%addr, "receive failed: {e}");
                        break Err(Error::Transport(e));
                    }
                },
            };

            // Truncation can split a multibyte character; it becomes U+FFFD.
            let text = String::from_utf8_lossy(&buf[..len]);
            info!(%peer, bytes = len, payload = %text, "datagram received");
            persister.persist(&text).await;
        };

        drop(self.socket);
        info!(%addr, "datagram listener stopped");
        result
    }
}
