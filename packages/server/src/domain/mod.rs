//! Domain 層
//!
//! 接続・トランスポート・認証に関する型と trait を定義します。
//! 具体的な I/O は Infrastructure 層が提供します（依存性の逆転）。

mod chat;
mod connection;
mod error;
mod identity;
mod members;
mod transport;

pub use chat::{chat_line, join_announcement, leave_announcement};
pub use connection::{
    ConnectionId, ConnectionRecord, ConnectionSnapshot, DisplayName, Timestamp, TransportKind,
};
pub use error::DomainError;
pub use identity::{AuthChoice, AuthOutcome, Credentials, IdentityError, IdentityService};
#[cfg(test)]
pub use identity::MockIdentityService;
pub use members::Members;
pub use transport::{Transport, TransportError};
