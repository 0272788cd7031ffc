//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{ConnectionId, DomainError, IdentityError};

/// セッション参加時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// 同じ接続が既に登録されている
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),
}

/// メッセージ送信時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// 空のメッセージはブロードキャストしない
    #[error("message is empty")]
    EmptyMessage,
}

/// ハンドシェイクでの認証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticateError {
    /// ユーザー名が表示名として使えない
    #[error("invalid username: {0}")]
    InvalidName(#[from] DomainError),

    /// 外部認証サービスが失敗した
    #[error(transparent)]
    Identity(#[from] IdentityError),
}
