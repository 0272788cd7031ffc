//! UseCase: メッセージ送信処理
//!
//! アクティブなセッションが受信したテキストを `"<name>: <text>"` にして
//! 送信者以外へブロードキャストします。

use std::sync::Arc;

use crate::domain::{ConnectionRecord, chat_line};

use super::{BroadcastReport, BroadcastUseCase, error::SendMessageError};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    broadcast: Arc<BroadcastUseCase>,
}

impl SendMessageUseCase {
    pub fn new(broadcast: Arc<BroadcastUseCase>) -> Self {
        Self { broadcast }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `from` - 送信者のレコード
    /// * `text` - 受信したテキスト（そのまま配送される）
    pub async fn execute(
        &self,
        from: &ConnectionRecord,
        text: &str,
    ) -> Result<BroadcastReport, SendMessageError> {
        if text.is_empty() {
            return Err(SendMessageError::EmptyMessage);
        }
        tracing::debug!("Message from '{}': {}", from.display_name(), text);
        let line = chat_line(from.display_name(), text);
        Ok(self.broadcast.execute(&line, Some(from.id())).await)
    }
}
