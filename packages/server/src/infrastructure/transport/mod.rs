//! `Transport` trait の具体的な実装
//!
//! - `tcp`: 生のバイトストリーム（改行区切りで送信）
//! - `websocket`: WebSocket のテキストフレーム（1 メッセージ = 1 フレーム）

mod tcp;
mod websocket;

#[cfg(test)]
pub mod fake;

pub use tcp::TcpTransport;
pub use websocket::WebSocketTransport;
