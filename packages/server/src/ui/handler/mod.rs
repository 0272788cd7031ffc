//! Session handlers and HTTP endpoints.

pub mod http;
pub mod stream;
pub mod websocket;

use std::fmt;

/// Lifecycle of one session, from accept to close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Handshaking,
    Active,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Connecting => "connecting",
            SessionState::Handshaking => "handshaking",
            SessionState::Active => "active",
            SessionState::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// Tracks and logs the state of one session
#[derive(Debug)]
struct Session {
    peer: String,
    state: SessionState,
}

impl Session {
    fn new(peer: impl Into<String>) -> Self {
        let session = Self {
            peer: peer.into(),
            state: SessionState::Connecting,
        };
        tracing::debug!("Session {} is {}", session.peer, session.state);
        session
    }

    fn enter(&mut self, next: SessionState) {
        tracing::debug!("Session {}: {} -> {}", self.peer, self.state, next);
        self.state = next;
    }
}
