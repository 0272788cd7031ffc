//! Integration tests for the chat relay.
//!
//! Each test runs the real server on ephemeral ports together with a stub
//! identity service, and talks to it with plain TCP and WebSocket clients.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use futures_util::{SinkExt, StreamExt};
use hiroba_server::{
    config::ServerConfig,
    domain::Transport,
    infrastructure::{
        dto::identity::CredentialsDto, identity::HttpIdentityService,
        registry::ConnectionRegistry,
    },
    ui::{
        Server,
        handler::{
            stream::NICKNAME_PROMPT,
            websocket::{AUTH_MENU, PASSWORD_PROMPT, USERNAME_PROMPT},
        },
    },
};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpListener, TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::oneshot,
    task::JoinHandle,
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE: Duration = Duration::from_millis(300);

// ========================================
// Test fixtures
// ========================================

/// Identity stub: password "secret" logs in, any registration succeeds
/// except the username "taken".
async fn spawn_identity_stub() -> String {
    async fn login(Json(body): Json<CredentialsDto>) -> impl IntoResponse {
        if body.password == "secret" {
            (
                StatusCode::OK,
                Json(serde_json::json!({ "token": format!("token-{}", body.username) })),
            )
                .into_response()
        } else {
            StatusCode::UNAUTHORIZED.into_response()
        }
    }

    async fn register(Json(body): Json<CredentialsDto>) -> StatusCode {
        if body.username == "taken" {
            StatusCode::CONFLICT
        } else {
            StatusCode::CREATED
        }
    }

    let router = Router::new()
        .route("/login", post(login))
        .route("/register", post(register));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// An address nothing listens on
async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Helper struct to manage the relay lifecycle
struct TestRelay {
    stream_addr: SocketAddr,
    framed_addr: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestRelay {
    async fn start() -> Self {
        Self::start_with_auth(spawn_identity_stub().await).await
    }

    async fn start_with_auth(auth_url: String) -> Self {
        let mut config = ServerConfig::new(auth_url).with_status_interval_secs(0);
        config.stream_addr = "127.0.0.1:0".to_string();
        config.framed_addr = "127.0.0.1:0".to_string();

        let registry = Arc::new(ConnectionRegistry::new());
        let identity = Arc::new(HttpIdentityService::new(config.auth_url.clone()));
        let server = Server::bind(&config, registry.clone(), identity)
            .await
            .unwrap();
        let stream_addr = server.stream_addr().unwrap();
        let framed_addr = server.framed_addr().unwrap();

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            server
                .run_until(async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        TestRelay {
            stream_addr,
            framed_addr,
            registry,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.framed_addr, path)
    }

    async fn connections(&self) -> Vec<serde_json::Value> {
        reqwest::get(self.http_url("/api/connections"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Poll the HTTP API until exactly `expected` members are registered
    async fn wait_for_members(&self, expected: usize) {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        loop {
            let count = self.connections().await.len();
            if count == expected {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {} member(s), still {}",
                expected,
                count
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Evict a member the way a failed broadcast pass does: under the
    /// registry lock, close its transport and remove it
    async fn evict(&self, name: &str) {
        let mut members = self.registry.lock().await;
        let id = members
            .iter()
            .find(|record| record.display_name().as_str() == name)
            .map(|record| record.id())
            .expect("no such member");
        let record = members.remove(id).unwrap();
        record.transport().close().await;
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            timeout(RECV_TIMEOUT, handle)
                .await
                .expect("server did not stop")
                .unwrap();
        }
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Raw TCP chat client
struct TcpClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TcpClient {
    /// Connect and consume the nickname prompt, without answering it
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut prompt = vec![0u8; NICKNAME_PROMPT.len()];
        timeout(RECV_TIMEOUT, reader.read_exact(&mut prompt))
            .await
            .expect("no nickname prompt")
            .unwrap();
        assert_eq!(prompt, NICKNAME_PROMPT.as_bytes());
        TcpClient {
            lines: reader.lines(),
            writer,
        }
    }

    async fn join(relay: &TestRelay, name: &str) -> Self {
        let mut client = Self::connect(relay.stream_addr).await;
        client.say(name).await;
        client
    }

    async fn say(&mut self, text: &str) {
        self.writer
            .write_all(format!("{}\n", text).as_bytes())
            .await
            .unwrap();
    }

    async fn next_line(&mut self) -> String {
        timeout(RECV_TIMEOUT, self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("connection closed")
    }

    async fn expect_silence(&mut self) {
        if let Ok(line) = timeout(SILENCE, self.lines.next_line()).await {
            panic!("expected no message, got {:?}", line);
        }
    }
}

/// WebSocket chat client
struct WsClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    async fn connect(relay: &TestRelay) -> Self {
        let (ws, _) = connect_async(format!("ws://{}/ws", relay.framed_addr))
            .await
            .unwrap();
        WsClient { ws }
    }

    /// Run the full handshake and return the client with the server's confirmation
    async fn handshake(
        relay: &TestRelay,
        choice: &str,
        username: &str,
        password: &str,
    ) -> (Self, Option<String>) {
        let mut client = Self::connect(relay).await;
        assert_eq!(client.recv().await.as_deref(), Some(AUTH_MENU));
        client.send(choice).await;
        assert_eq!(client.recv().await.as_deref(), Some(USERNAME_PROMPT));
        client.send(username).await;
        assert_eq!(client.recv().await.as_deref(), Some(PASSWORD_PROMPT));
        client.send(password).await;
        let confirmation = client.recv().await;
        (client, confirmation)
    }

    async fn login(relay: &TestRelay, username: &str) -> Self {
        let (client, confirmation) = Self::handshake(relay, "1", username, "secret").await;
        assert_eq!(
            confirmation,
            Some(format!("{} logged in successfully", username))
        );
        client
    }

    async fn send(&mut self, text: &str) {
        self.ws.send(Message::text(text)).await.unwrap();
    }

    /// Next text frame, or `None` once the server closed the connection
    async fn recv(&mut self) -> Option<String> {
        timeout(RECV_TIMEOUT, async {
            while let Some(msg) = self.ws.next().await {
                match msg {
                    Ok(Message::Text(text)) => return Some(text.as_str().to_owned()),
                    Ok(Message::Close(_)) | Err(_) => return None,
                    Ok(_) => continue,
                }
            }
            None
        })
        .await
        .expect("timed out waiting for a frame")
    }

    async fn expect_silence(&mut self) {
        if let Ok(msg) = timeout(SILENCE, self.ws.next()).await {
            panic!("expected no frame, got {:?}", msg);
        }
    }
}

// ========================================
// Tests
// ========================================

#[tokio::test]
async fn test_health_endpoint() {
    // テスト項目: ヘルスチェックが ok を返す
    // given (前提条件):
    let relay = TestRelay::start().await;

    // when (操作):
    let body: serde_json::Value = reqwest::get(relay.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, serde_json::json!({"status": "ok"}));
    relay.stop().await;
}

#[tokio::test]
async fn test_three_clients_join_chat_and_leave() {
    // テスト項目: alice / bob / carol の参加・発言・強制切断のシナリオ
    // given (前提条件): alice (TCP) と bob (WebSocket) が参加済み
    let relay = TestRelay::start().await;
    let mut alice = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(1).await;
    let mut bob = WsClient::login(&relay, "bob").await;
    relay.wait_for_members(2).await;
    assert_eq!(alice.next_line().await, "bob has joined the chat!");

    // when (操作): carol (TCP) が参加
    let mut carol = TcpClient::join(&relay, "carol").await;
    relay.wait_for_members(3).await;

    // then (期待する結果): alice と bob だけが 1 回ずつ参加アナウンスを受け取る
    assert_eq!(alice.next_line().await, "carol has joined the chat!");
    assert_eq!(bob.recv().await.as_deref(), Some("carol has joined the chat!"));
    carol.expect_silence().await;

    // when (操作): bob が "hi" を送信
    bob.send("hi").await;

    // then (期待する結果): alice と carol に届き、bob 自身には届かない
    assert_eq!(alice.next_line().await, "bob: hi");
    assert_eq!(carol.next_line().await, "bob: hi");
    bob.expect_silence().await;

    // when (操作): carol の接続が外部から切断される
    drop(carol);
    relay.wait_for_members(2).await;

    // then (期待する結果): alice と bob が退出アナウンスをちょうど 1 回受け取る
    assert_eq!(alice.next_line().await, "carol has left the chat.");
    assert_eq!(bob.recv().await.as_deref(), Some("carol has left the chat."));
    alice.say("still here").await;
    assert_eq!(bob.recv().await.as_deref(), Some("alice: still here"));
    alice.expect_silence().await;

    relay.stop().await;
}

#[tokio::test]
async fn test_same_display_name_receives_each_other() {
    // テスト項目: 同じ表示名の 2 接続は互いのメッセージを受け取る
    // given (前提条件):
    let relay = TestRelay::start().await;
    let mut first = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(1).await;
    let mut second = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(2).await;
    assert_eq!(first.next_line().await, "alice has joined the chat!");

    // when (操作):
    second.say("hello").await;

    // then (期待する結果):
    assert_eq!(first.next_line().await, "alice: hello");
    second.expect_silence().await;

    relay.stop().await;
}

#[tokio::test]
async fn test_failed_login_is_isolated() {
    // テスト項目: 認証に失敗したセッションは参加・退出のアナウンスをせず、他に影響しない
    // given (前提条件):
    let relay = TestRelay::start().await;
    let mut alice = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(1).await;

    // when (操作): mallory が誤ったパスワードでログイン
    let (mut mallory, confirmation) =
        WsClient::handshake(&relay, "1", "mallory", "wrong").await;

    // then (期待する結果): 確認メッセージは無く接続が閉じられる
    assert_eq!(confirmation, None);
    assert_eq!(mallory.recv().await, None);
    alice.expect_silence().await;

    // 以降の参加は通常通り配送され、mallory はメンバーに含まれない
    let _bob = WsClient::login(&relay, "bob").await;
    relay.wait_for_members(2).await;
    assert_eq!(alice.next_line().await, "bob has joined the chat!");
    let names: Vec<String> = relay
        .connections()
        .await
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert!(!names.contains(&"mallory".to_string()));

    relay.stop().await;
}

#[tokio::test]
async fn test_register_flow() {
    // テスト項目: 登録を選ぶと "created successfully" が返り、参加できる
    // given (前提条件):
    let relay = TestRelay::start().await;
    let mut alice = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(1).await;

    // when (操作):
    let (_dave, confirmation) = WsClient::handshake(&relay, "2", "dave", "pw").await;

    // then (期待する結果):
    assert_eq!(confirmation.as_deref(), Some("dave created successfully"));
    relay.wait_for_members(2).await;
    assert_eq!(alice.next_line().await, "dave has joined the chat!");

    relay.stop().await;
}

#[tokio::test]
async fn test_rejected_registration_closes_session() {
    // テスト項目: 登録が 201 以外で拒否されるとセッションが閉じられる
    // given (前提条件):
    let relay = TestRelay::start().await;

    // when (操作):
    let (_taken, confirmation) = WsClient::handshake(&relay, "2", "taken", "pw").await;

    // then (期待する結果):
    assert_eq!(confirmation, None);
    assert!(relay.registry.is_empty().await);

    relay.stop().await;
}

#[tokio::test]
async fn test_invalid_login_choice_aborts_session() {
    // テスト項目: 1, 2 以外の選択でセッションが即座に終了する
    // given (前提条件):
    let relay = TestRelay::start().await;
    let mut client = WsClient::connect(&relay).await;
    assert_eq!(client.recv().await.as_deref(), Some(AUTH_MENU));

    // when (操作):
    client.send("abc").await;

    // then (期待する結果): ユーザー名を聞かれずに閉じられる
    assert_eq!(client.recv().await, None);
    assert!(relay.registry.is_empty().await);

    relay.stop().await;
}

#[tokio::test]
async fn test_identity_service_down_keeps_server_running() {
    // テスト項目: 認証サービスに到達できなくても、そのセッションだけが終了しサーバーは動き続ける
    // given (前提条件):
    let relay = TestRelay::start_with_auth(unreachable_url().await).await;
    let mut alice = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(1).await;

    // when (操作):
    let (_bob, confirmation) = WsClient::handshake(&relay, "1", "bob", "secret").await;

    // then (期待する結果):
    assert_eq!(confirmation, None);
    alice.expect_silence().await;
    let mut carol = TcpClient::join(&relay, "carol").await;
    relay.wait_for_members(2).await;
    assert_eq!(alice.next_line().await, "carol has joined the chat!");
    carol.say("anyone?").await;
    assert_eq!(alice.next_line().await, "carol: anyone?");

    relay.stop().await;
}

#[tokio::test]
async fn test_handshaking_connection_is_not_a_broadcast_target() {
    // テスト項目: ニックネーム未入力の接続にはブロードキャストが届かない
    // given (前提条件):
    let relay = TestRelay::start().await;
    let mut alice = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(1).await;
    let mut pending = TcpClient::connect(relay.stream_addr).await;
    let mut bob = TcpClient::join(&relay, "bob").await;
    relay.wait_for_members(2).await;
    assert_eq!(alice.next_line().await, "bob has joined the chat!");

    // when (操作):
    bob.say("before you joined").await;

    // then (期待する結果):
    assert_eq!(alice.next_line().await, "bob: before you joined");
    pending.expect_silence().await;

    // ニックネームを送ると参加し、以降のメッセージだけを受け取る
    pending.say("carol").await;
    relay.wait_for_members(3).await;
    assert_eq!(alice.next_line().await, "carol has joined the chat!");
    assert_eq!(bob.next_line().await, "carol has joined the chat!");
    bob.say("welcome").await;
    assert_eq!(pending.next_line().await, "bob: welcome");

    relay.stop().await;
}

#[tokio::test]
async fn test_connections_endpoint_lists_both_transports() {
    // テスト項目: /api/connections に両方のトランスポートのメンバーが表示される
    // given (前提条件):
    let relay = TestRelay::start().await;
    let _alice = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(1).await;
    let _bob = WsClient::login(&relay, "bob").await;
    relay.wait_for_members(2).await;

    // when (操作):
    let connections = relay.connections().await;

    // then (期待する結果):
    let mut entries: Vec<(String, String)> = connections
        .iter()
        .map(|c| {
            (
                c["name"].as_str().unwrap().to_string(),
                c["kind"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    entries.sort();
    assert_eq!(
        entries,
        vec![
            ("alice".to_string(), "stream".to_string()),
            ("bob".to_string(), "framed".to_string()),
        ]
    );
    for c in &connections {
        assert!(c["address"].as_str().unwrap().starts_with("127.0.0.1:"));
        assert!(c["connected_at"].as_str().unwrap().ends_with("+09:00"));
    }

    relay.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_connections() {
    // テスト項目: シャットダウンで残りの接続が閉じられる
    // given (前提条件):
    let relay = TestRelay::start().await;
    let mut alice = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(1).await;
    let registry = relay.registry.clone();

    // when (操作):
    relay.stop().await;

    // then (期待する結果):
    assert!(registry.is_empty().await);
    let eof = timeout(RECV_TIMEOUT, alice.lines.next_line())
        .await
        .expect("connection was not closed")
        .unwrap();
    assert_eq!(eof, None);
}

#[tokio::test]
async fn test_evicted_tcp_member_is_no_longer_relayed() {
    // テスト項目: 退去させられた TCP メンバーの以降の入力は中継されず、退出アナウンスが 1 回だけ届く
    // given (前提条件):
    let relay = TestRelay::start().await;
    let mut alice = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(1).await;
    let mut bob = TcpClient::join(&relay, "bob").await;
    relay.wait_for_members(2).await;
    assert_eq!(alice.next_line().await, "bob has joined the chat!");

    // when (操作): bob を退去させた後、bob が送信を続ける
    relay.evict("bob").await;
    let _ = bob.writer.write_all(b"ghost\n").await;

    // then (期待する結果):
    assert_eq!(alice.next_line().await, "bob has left the chat.");
    alice.expect_silence().await;
    relay.wait_for_members(1).await;

    relay.stop().await;
}

#[tokio::test]
async fn test_evicted_websocket_member_is_no_longer_relayed() {
    // テスト項目: 退去させられた WebSocket メンバーがクローズフレームを無視して送信しても中継されない
    // given (前提条件):
    let relay = TestRelay::start().await;
    let mut alice = TcpClient::join(&relay, "alice").await;
    relay.wait_for_members(1).await;
    let mut bob = WsClient::login(&relay, "bob").await;
    relay.wait_for_members(2).await;
    assert_eq!(alice.next_line().await, "bob has joined the chat!");

    // when (操作):
    relay.evict("bob").await;
    let _ = bob.ws.send(Message::text("ghost")).await;

    // then (期待する結果):
    assert_eq!(alice.next_line().await, "bob has left the chat.");
    alice.expect_silence().await;
    relay.wait_for_members(1).await;

    relay.stop().await;
}
