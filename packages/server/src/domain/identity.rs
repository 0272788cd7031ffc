//! IdentityService trait 定義
//!
//! Framed トランスポートのハンドシェイクで呼び出す外部認証サービスの
//! インターフェースです。HTTP による具体的な実装は Infrastructure 層が提供します。

use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

use super::DomainError;

/// Answer to the `1. Login / 2. Register` prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChoice {
    Login,
    Register,
}

impl FromStr for AuthChoice {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(1) => Ok(AuthChoice::Login),
            Ok(2) => Ok(AuthChoice::Register),
            _ => Err(DomainError::InvalidAuthChoice(s.to_string())),
        }
    }
}

/// Username and password collected during the handshake
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful identity exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Login accepted; the token is opaque and not used by the relay
    LoggedIn { token: String },
    /// Account created
    Registered,
}

/// Identity service failures. Each one ends only the session that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Could not reach the service
    #[error("identity request failed: {0}")]
    Request(String),

    /// The service answered with a status other than the success status
    #[error("identity service returned status {actual} (expected {expected})")]
    UnexpectedStatus { expected: u16, actual: u16 },

    /// The success response body could not be decoded
    #[error("invalid identity response: {0}")]
    InvalidResponse(String),
}

/// External identity service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// `POST /login`; success is 200 with a `token` field
    async fn login(&self, credentials: &Credentials) -> Result<AuthOutcome, IdentityError>;

    /// `POST /register`; success is 201
    async fn register(&self, credentials: &Credentials) -> Result<AuthOutcome, IdentityError>;
}
