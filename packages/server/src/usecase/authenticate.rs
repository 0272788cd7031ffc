//! UseCase: ハンドシェイク認証
//!
//! Framed トランスポートのハンドシェイクで集めた選択・ユーザー名・パスワードを
//! 外部認証サービスに問い合わせ、確認メッセージと表示名を返します。
//! 認証サービスの失敗はこのセッションだけのエラーとして返し、プロセスは止めません。

use std::sync::Arc;

use crate::domain::{AuthChoice, AuthOutcome, Credentials, DisplayName, IdentityService};

use super::error::AuthenticateError;

/// 認証成功時の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    /// チャットで使う表示名（ユーザー名を trim したもの）
    pub name: DisplayName,
    /// クライアントへ送る確認メッセージ
    pub confirmation: String,
    pub outcome: AuthOutcome,
}

/// ハンドシェイク認証のユースケース
pub struct AuthenticateUseCase {
    identity: Arc<dyn IdentityService>,
}

impl AuthenticateUseCase {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self { identity }
    }

    /// 認証を実行
    ///
    /// ユーザー名が表示名として使えない場合は認証サービスを呼ばずに失敗する
    pub async fn execute(
        &self,
        choice: AuthChoice,
        credentials: Credentials,
    ) -> Result<Authenticated, AuthenticateError> {
        let name = DisplayName::try_from(credentials.username.as_str())?;

        let outcome = match choice {
            AuthChoice::Login => self.identity.login(&credentials).await?,
            AuthChoice::Register => self.identity.register(&credentials).await?,
        };

        let confirmation = match &outcome {
            AuthOutcome::LoggedIn { .. } => {
                format!("{} logged in successfully", credentials.username)
            }
            AuthOutcome::Registered => format!("{} created successfully", credentials.username),
        };
        tracing::info!("Identity confirmed for '{}' ({:?})", name, choice);

        Ok(Authenticated {
            name,
            confirmation,
            outcome,
        })
    }
}
