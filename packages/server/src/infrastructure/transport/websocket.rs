//! WebSocket framed transport.

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, stream::SplitSink};
use tokio::sync::{Mutex, watch};

use crate::domain::{ConnectionId, Transport, TransportError, TransportKind};

/// Sink half of an upgraded WebSocket.
///
/// The stream half stays with the session task; broadcasts only ever write.
pub struct WebSocketTransport {
    id: ConnectionId,
    remote_address: String,
    sink: Mutex<SplitSink<WebSocket, Message>>,
    closed: watch::Sender<bool>,
}

impl WebSocketTransport {
    pub fn new(sink: SplitSink<WebSocket, Message>, remote_address: SocketAddr) -> Self {
        Self {
            id: ConnectionId::generate(),
            remote_address: remote_address.to_string(),
            sink: Mutex::new(sink),
            closed: watch::Sender::new(false),
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Framed
    }

    fn remote_address(&self) -> &str {
        &self.remote_address
    }

    async fn send(&self, message: &str) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(message.to_owned().into()))
            .await
            .map_err(|e| TransportError::Frame(e.to_string()))
    }

    async fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        let mut sink = self.sink.lock().await;
        // The peer may already be gone; a failed close frame is expected then.
        if let Err(e) = sink.send(Message::Close(None)).await {
            tracing::debug!("Close frame to {} not sent: {}", self.remote_address, e);
        }
        if let Err(e) = sink.close().await {
            tracing::debug!("WebSocket close for {} failed: {}", self.remote_address, e);
        }
        tracing::debug!("Closed WebSocket transport {}", self.remote_address);
    }

    async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}
