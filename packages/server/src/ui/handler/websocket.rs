//! WebSocket session handler.
//!
//! Handshake, one frame per step:
//! 1. server: `1. Login\n2. Register`, client: `1` or `2`
//! 2. server: `Please enter username:`, client: username
//! 3. server: `Please enter password:`, client: password
//! 4. server: confirmation from the identity exchange
//!
//! Thereafter each inbound frame is relayed as `"<name>: <frame>"`.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::stream::{SplitStream, StreamExt};

use crate::{
    domain::{AuthChoice, Credentials, Transport},
    infrastructure::transport::WebSocketTransport,
    ui::{HandshakeError, state::AppState},
    usecase::{AuthenticateError, Authenticated, SendMessageError},
};

use super::{Session, SessionState};

pub const AUTH_MENU: &str = "1. Login\n2. Register";
pub const USERNAME_PROMPT: &str = "Please enter username:";
pub const PASSWORD_PROMPT: &str = "Please enter password:";

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::debug!("WebSocket upgrade from {}", peer);
    ws.on_upgrade(move |socket| handle_socket(socket, peer, state))
}

async fn handle_socket(socket: WebSocket, peer: SocketAddr, state: Arc<AppState>) {
    let (sink, mut stream) = socket.split();
    let transport = Arc::new(WebSocketTransport::new(sink, peer));
    let mut session = Session::new(transport.remote_address());

    session.enter(SessionState::Handshaking);
    let authenticated = match login_handshake(&mut stream, &transport, &state).await {
        Ok(authenticated) => authenticated,
        Err(e) => {
            match &e {
                HandshakeError::Authentication(AuthenticateError::Identity(_)) => {
                    tracing::error!("WebSocket handshake with {} failed: {}", peer, e)
                }
                _ => tracing::info!("WebSocket handshake with {} aborted: {}", peer, e),
            }
            transport.close().await;
            session.enter(SessionState::Closed);
            return;
        }
    };

    let record = match state
        .join_session_usecase
        .execute(transport.clone(), authenticated.name)
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

    while let Some(text) = next_text(&mut stream, &transport).await {
        if let Err(SendMessageError::EmptyMessage) =
            state.send_message_usecase.execute(&record, &text).await
        {
            tracing::trace!("Skipping empty frame from '{}'", record.display_name());
        }
    }

    session.enter(SessionState::Closed);
    state.leave_session_usecase.execute(&record).await;
}

async fn login_handshake(
    stream: &mut SplitStream<WebSocket>,
    transport: &WebSocketTransport,
    state: &AppState,
) -> Result<Authenticated, HandshakeError> {
    transport.send(AUTH_MENU).await?;
    let answer = next_text(stream, transport)
        .await
        .ok_or(HandshakeError::Disconnected)?;
    let choice: AuthChoice = answer.parse().map_err(HandshakeError::InvalidChoice)?;

    transport.send(USERNAME_PROMPT).await?;
    let username = next_text(stream, transport)
        .await
        .ok_or(HandshakeError::Disconnected)?;

    transport.send(PASSWORD_PROMPT).await?;
    let password = next_text(stream, transport)
        .await
        .ok_or(HandshakeError::Disconnected)?;

    let authenticated = state
        .authenticate_usecase
        .execute(choice, Credentials { username, password })
        .await?;
    transport.send(&authenticated.confirmation).await?;

    Ok(authenticated)
}

/// Next text payload from the peer; `None` once the connection is closed or
/// broken, or the transport has been closed on our side.
///
/// Binary frames are decoded lossily as UTF-8. Ping/pong is answered by the
/// WebSocket layer.
async fn next_text(
    stream: &mut SplitStream<WebSocket>,
    transport: &WebSocketTransport,
) -> Option<String> {
    loop {
        let msg = tokio::select! {
            biased;
            _ = transport.closed() => {
                tracing::debug!(
                    "WebSocket transport {} closed, ending session",
                    transport.remote_address()
                );
                return None;
            }
            msg = stream.next() => msg?,
        };
        match msg {
            Ok(Message::Text(text)) => return Some(text.to_string()),
            Ok(Message::Binary(bytes)) => return Some(String::from_utf8_lossy(&bytes).into_owned()),
            Ok(Message::Close(_)) => return None,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Err(e) => {
                tracing::debug!("WebSocket read error: {}", e);
                return None;
            }
        }
    }
}
