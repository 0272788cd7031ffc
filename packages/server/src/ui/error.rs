//! Errors raised by the session handlers and the server object.

use thiserror::Error;

use crate::{
    domain::{DomainError, TransportError},
    usecase::AuthenticateError,
};

/// Why a session ended before becoming active. None of these is announced.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The peer closed the connection (or it failed) mid-handshake
    #[error("peer disconnected during handshake")]
    Disconnected,

    /// The login-or-register answer was not `1` or `2`
    #[error("invalid login choice: {0}")]
    InvalidChoice(DomainError),

    /// The nickname was empty after trimming
    #[error("nickname is empty")]
    EmptyName,

    /// Credentials were rejected or the identity service failed
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthenticateError),

    /// A prompt could not be written
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Startup and runtime failures of the server object
#[derive(Debug, Error)]
pub enum ServerError {
    /// A listener could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
