//! UseCase: セッション退出処理
//!
//! アクティブだったセッションが終了したときに呼ばれます。
//! レジストリから削除し、トランスポートを閉じ、退出アナウンスを配送します。
//! ブロードキャスト中の送信失敗で既に退去済みの場合でも、削除とクローズは冪等です。

use std::sync::Arc;

use crate::{
    domain::{ConnectionRecord, leave_announcement},
    infrastructure::registry::ConnectionRegistry,
};

use super::BroadcastUseCase;

/// セッション退出のユースケース
pub struct LeaveSessionUseCase {
    registry: Arc<ConnectionRegistry>,
    broadcast: Arc<BroadcastUseCase>,
}

impl LeaveSessionUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>, broadcast: Arc<BroadcastUseCase>) -> Self {
        Self {
            registry,
            broadcast,
        }
    }

    /// 退出を実行
    ///
    /// # Returns
    ///
    /// このセッション自身がレジストリから削除した場合は `true`。
    /// 既に退去済みだった場合は `false`（アナウンスは行う）
    pub async fn execute(&self, record: &ConnectionRecord) -> bool {
        let removed = self.registry.remove(record.id()).await.is_some();
        record.transport().close().await;
        tracing::info!(
            "'{}' left ({}, {})",
            record.display_name(),
            record.transport().kind().label(),
            record.address()
        );

        self.broadcast
            .execute(&leave_announcement(record.display_name()), Some(record.id()))
            .await;

        removed
    }
}
