//! Server state shared by the session handlers.

use std::{sync::Arc, time::Duration};

use crate::{
    domain::IdentityService,
    infrastructure::registry::ConnectionRegistry,
    usecase::{
        AuthenticateUseCase, BroadcastUseCase, JoinSessionUseCase, LeaveSessionUseCase,
        SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// 接続レジストリ（唯一の共有可変状態）
    pub registry: Arc<ConnectionRegistry>,
    /// JoinSessionUseCase（セッション参加のユースケース）
    pub join_session_usecase: Arc<JoinSessionUseCase>,
    /// LeaveSessionUseCase（セッション退出のユースケース）
    pub leave_session_usecase: Arc<LeaveSessionUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// AuthenticateUseCase（ハンドシェイク認証のユースケース）
    pub authenticate_usecase: Arc<AuthenticateUseCase>,
}

impl AppState {
    /// Wire the use cases around one registry
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        identity: Arc<dyn IdentityService>,
        write_timeout: Duration,
    ) -> Self {
        let broadcast = Arc::new(BroadcastUseCase::new(registry.clone(), write_timeout));
        Self {
            join_session_usecase: Arc::new(JoinSessionUseCase::new(
                registry.clone(),
                broadcast.clone(),
            )),
            leave_session_usecase: Arc::new(LeaveSessionUseCase::new(
                registry.clone(),
                broadcast.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(broadcast)),
            authenticate_usecase: Arc::new(AuthenticateUseCase::new(identity)),
            registry,
        }
    }
}
