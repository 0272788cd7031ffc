//! UseCase: セッション参加処理
//!
//! ハンドシェイクを終えた接続をレジストリに登録し、
//! 他のメンバーへ参加アナウンスをブロードキャストします。
//! 登録はハンドシェイク完了後に行うため、名前の無い接続が配送対象になることはありません。

use std::sync::Arc;

use hiroba_shared::time::get_jst_timestamp;

use crate::{
    domain::{ConnectionRecord, DisplayName, Timestamp, Transport, join_announcement},
    infrastructure::registry::ConnectionRegistry,
};

use super::{BroadcastUseCase, error::JoinError};

/// セッション参加のユースケース
pub struct JoinSessionUseCase {
    registry: Arc<ConnectionRegistry>,
    broadcast: Arc<BroadcastUseCase>,
}

impl JoinSessionUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>, broadcast: Arc<BroadcastUseCase>) -> Self {
        Self {
            registry,
            broadcast,
        }
    }

    /// 参加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<ConnectionRecord>)` - 登録されたレコード（退出時に使う）
    /// * `Err(JoinError)` - 同じ接続が既に登録されている
    pub async fn execute(
        &self,
        transport: Arc<dyn Transport>,
        name: DisplayName,
    ) -> Result<Arc<ConnectionRecord>, JoinError> {
        let record = Arc::new(ConnectionRecord::new(
            transport,
            name,
            Timestamp::new(get_jst_timestamp()),
        ));

        if !self.registry.add(record.clone()).await {
            return Err(JoinError::AlreadyRegistered(record.id()));
        }
        tracing::info!(
            "'{}' joined via {} from {}",
            record.display_name(),
            record.transport().kind().label(),
            record.address()
        );

        self.broadcast
            .execute(&join_announcement(record.display_name()), Some(record.id()))
            .await;

        Ok(record)
    }
}
