//! Connection identity and membership records.

use std::{fmt, sync::Arc};

use serde::Serialize;
use uuid::Uuid;

use super::{DomainError, Transport};

/// Identity of one accepted socket.
///
/// Minted once per transport; two handles refer to the same connection iff
/// their ids are equal. Peer addresses are never used for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which wire protocol a transport speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Raw byte stream (TCP), newline-terminated outbound lines
    Stream,
    /// Framed messages (WebSocket), one text frame per message
    Framed,
}

impl TransportKind {
    /// Label used by the status table
    pub fn label(&self) -> &'static str {
        match self {
            TransportKind::Stream => "TCP Client",
            TransportKind::Framed => "WebSocket Client",
        }
    }
}

/// Unix timestamp in JST (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Name shown in chat lines, confirmed by the handshake.
///
/// Surrounding whitespace is trimmed; an empty name is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&str> for DisplayName {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyDisplayName);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unit of registry membership: one live transport plus its display data.
pub struct ConnectionRecord {
    transport: Arc<dyn Transport>,
    display_name: DisplayName,
    address: String,
    connected_at: Timestamp,
}

impl ConnectionRecord {
    /// Pair a transport with its confirmed name.
    ///
    /// The peer address is captured from the transport here and never changes.
    pub fn new(
        transport: Arc<dyn Transport>,
        display_name: DisplayName,
        connected_at: Timestamp,
    ) -> Self {
        let address = transport.remote_address().to_string();
        Self {
            transport,
            display_name,
            address,
            connected_at,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.transport.id()
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            kind: self.transport.kind(),
            address: self.address.clone(),
            name: self.display_name.as_str().to_string(),
            connected_at: self.connected_at,
        }
    }
}

impl fmt::Debug for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRecord")
            .field("id", &self.id())
            .field("kind", &self.transport.kind())
            .field("display_name", &self.display_name)
            .field("address", &self.address)
            .finish()
    }
}

/// Read-only copy of one member, for status display and HTTP observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub kind: TransportKind,
    pub address: String,
    pub name: String,
    pub connected_at: Timestamp,
}
