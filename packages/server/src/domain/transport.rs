//! Transport trait 定義
//!
//! Registry と Broadcast は接続の種類（TCP / WebSocket）で分岐せず、
//! この trait 越しに送信・切断を行います。

use async_trait::async_trait;
use thiserror::Error;

use super::{ConnectionId, TransportKind};

/// Transport-level failures. Any of these on `send` evicts the member.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Socket read/write failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket layer rejected the frame
    #[error("WebSocket error: {0}")]
    Frame(String),

    /// The transport was already closed
    #[error("transport is closed")]
    Closed,

    /// The write did not finish within the configured deadline
    #[error("write timed out")]
    Timeout,
}

/// One live connection, independent of its wire protocol.
///
/// Implementations must make `close` idempotent: the owning session and a
/// failing broadcast pass may both close the same transport, in either order.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Stable identity of the underlying socket
    fn id(&self) -> ConnectionId;

    fn kind(&self) -> TransportKind;

    /// Peer address, for display only
    fn remote_address(&self) -> &str;

    /// Deliver one message. Stream transports append a newline; framed
    /// transports send the text as a single frame.
    async fn send(&self, message: &str) -> Result<(), TransportError>;

    /// Close the connection. A second call is a no-op.
    async fn close(&self);

    /// Resolves once `close` has been called, by the session or by a
    /// broadcast pass. Session read loops select on this so a closed
    /// transport stops relaying input.
    async fn closed(&self);

    fn is_closed(&self) -> bool;
}
