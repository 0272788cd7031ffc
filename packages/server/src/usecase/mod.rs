//! UseCase 層
//!
//! セッションハンドラ（UI 層）から呼ばれるアプリケーションロジックです。
//! 全てのメッセージ配送は `BroadcastUseCase` を経由します。

mod authenticate;
mod broadcast;
mod error;
mod join_session;
mod leave_session;
mod send_message;

pub use authenticate::{AuthenticateUseCase, Authenticated};
pub use broadcast::{BroadcastReport, BroadcastUseCase, DEFAULT_WRITE_TIMEOUT};
pub use error::{AuthenticateError, JoinError, SendMessageError};
pub use join_session::JoinSessionUseCase;
pub use leave_session::LeaveSessionUseCase;
pub use send_message::SendMessageUseCase;
