//! Infrastructure 層
//!
//! Domain 層が定義する trait の具体的な実装（TCP / WebSocket トランスポート、
//! 外部認証サービスの HTTP クライアント）と、インメモリの接続レジストリを提供します。

pub mod dto;
pub mod identity;
pub mod registry;
pub mod transport;
