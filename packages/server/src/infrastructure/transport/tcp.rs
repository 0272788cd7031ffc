//! TCP stream transport.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::{
    io::AsyncWriteExt,
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::{Mutex, watch},
};

use crate::domain::{ConnectionId, Transport, TransportError, TransportKind};

/// Write side of an accepted TCP connection.
///
/// The read half stays with the session task; broadcasts only ever write.
pub struct TcpTransport {
    id: ConnectionId,
    remote_address: String,
    writer: Mutex<OwnedWriteHalf>,
    closed: watch::Sender<bool>,
}

impl TcpTransport {
    pub fn new(writer: OwnedWriteHalf, remote_address: SocketAddr) -> Self {
        Self {
            id: ConnectionId::generate(),
            remote_address: remote_address.to_string(),
            writer: Mutex::new(writer),
            closed: watch::Sender::new(false),
        }
    }

    /// Split an accepted stream into the session's read half and the transport.
    pub fn from_stream(stream: TcpStream) -> std::io::Result<(OwnedReadHalf, Self)> {
        let remote_address = stream.peer_addr()?;
        let (reader, writer) = stream.into_split();
        Ok((reader, Self::new(writer, remote_address)))
    }

    /// Write text as-is, without a line terminator (used for prompts).
    pub async fn write_raw(&self, text: &str) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut writer = self.writer.lock().await;
        writer.write_all(text.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }

    fn remote_address(&self) -> &str {
        &self.remote_address
    }

    async fn send(&self, message: &str) -> Result<(), TransportError> {
        let mut line = String::with_capacity(message.len() + 1);
        line.push_str(message);
        line.push('\n');
        self.write_raw(&line).await
    }

    async fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            tracing::debug!("TCP shutdown for {} failed: {}", self.remote_address, e);
        }
        tracing::debug!("Closed TCP transport {}", self.remote_address);
    }

    async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}
