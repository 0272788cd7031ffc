//! TCP session handler.
//!
//! Protocol: the server prompts for a nickname, reads one chunk as the name,
//! then relays every inbound chunk as `"<name>: <chunk>"`. Outbound lines are
//! newline-terminated by the transport.

use std::sync::Arc;

use tokio::{
    io::AsyncReadExt,
    net::{TcpListener, TcpStream, tcp::OwnedReadHalf},
    sync::watch,
};

use crate::{
    domain::{DisplayName, Transport},
    infrastructure::transport::TcpTransport,
    ui::{HandshakeError, state::AppState},
    usecase::SendMessageError,
};

use super::{Session, SessionState};

pub const NICKNAME_PROMPT: &str = "Please enter your nickname: ";

const READ_BUFFER_SIZE: usize = 1024;

/// Accept TCP clients until `shutdown` fires, one task per connection
pub async fn accept_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::debug!("Accepted TCP connection from {}", peer);
                    let state = state.clone();
                    tokio::spawn(handle_stream(stream, state));
                }
                Err(e) => tracing::warn!("TCP accept failed: {}", e),
            }
        }
    }
    tracing::info!("TCP accept loop stopped");
}

/// Drive one TCP session from accept to close
pub async fn handle_stream(stream: TcpStream, state: Arc<AppState>) {
    let (mut reader, transport) = match TcpTransport::from_stream(stream) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!("Dropping TCP connection without peer address: {}", e);
            return;
        }
    };
    let transport = Arc::new(transport);
    let mut session = Session::new(transport.remote_address());

    session.enter(SessionState::Handshaking);
    let name = match nickname_handshake(&mut reader, &transport).await {
        Ok(name) => name,
        Err(e) => {
            tracing::info!("TCP handshake with {} aborted: {}", transport.remote_address(), e);
            transport.close().await;
            session.enter(SessionState::Closed);
            return;
        }
    };

    let record = match state
        .join_session_usecase
        .execute(transport.clone(), name)
        .await
    {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Failed to join: {}", e);
            transport.close().await;
            session.enter(SessionState::Closed);
            return;
        }
    };
    session.enter(SessionState::Active);

    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    while let Some(n) = read_chunk(&mut reader, &transport, &mut buf).await {
        let chunk = String::from_utf8_lossy(&buf[..n]);
        if let Err(SendMessageError::EmptyMessage) = state
            .send_message_usecase
            .execute(&record, strip_line_terminator(&chunk))
            .await
        {
            tracing::trace!("Skipping blank line from '{}'", record.display_name());
        }
    }

    session.enter(SessionState::Closed);
    state.leave_session_usecase.execute(&record).await;
}

async fn nickname_handshake(
    reader: &mut OwnedReadHalf,
    transport: &TcpTransport,
) -> Result<DisplayName, HandshakeError> {
    transport.write_raw(NICKNAME_PROMPT).await?;

    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let n = read_chunk(reader, transport, &mut buf)
        .await
        .ok_or(HandshakeError::Disconnected)?;
    DisplayName::try_from(String::from_utf8_lossy(&buf[..n]).as_ref())
        .map_err(|_| HandshakeError::EmptyName)
}

/// Read one chunk from the peer.
///
/// `None` on EOF, on a read error, or once the transport has been closed
/// (for example by a broadcast that evicted this member).
async fn read_chunk(
    reader: &mut OwnedReadHalf,
    transport: &TcpTransport,
    buf: &mut [u8],
) -> Option<usize> {
    tokio::select! {
        biased;
        _ = transport.closed() => {
            tracing::debug!("TCP transport {} closed, ending session", transport.remote_address());
            None
        }
        read = reader.read(buf) => match read {
            Ok(0) => None,
            Ok(n) => Some(n),
            Err(e) => {
                tracing::debug!("TCP read from {} failed: {}", transport.remote_address(), e);
                None
            }
        },
    }
}

/// Drop one trailing `\n` or `\r\n`; the transport adds its own terminator.
fn strip_line_terminator(chunk: &str) -> &str {
    chunk
        .strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(chunk)
}
