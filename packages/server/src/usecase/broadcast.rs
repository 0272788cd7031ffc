//! UseCase: ブロードキャスト
//!
//! ## 概要
//!
//! 送信者以外の全メンバーへメッセージを配送します。
//!
//! - 1 回の配送（パス）の間、レジストリのロックを保持し続ける
//!   （パスの途中でメンバーが増減することはない）
//! - 送信者の除外は接続 ID で判定する（表示名では判定しない）
//! - 送信に失敗した（またはタイムアウトした）メンバーはトランスポートを閉じて退去させる。
//!   退去は走査が終わってから、ロックを保持したまま適用する
//! - 失敗は呼び出し元に返さない（ベストエフォート）

use std::{sync::Arc, time::Duration};

use futures_util::future::join_all;

use crate::{
    domain::{ConnectionId, TransportError},
    infrastructure::registry::ConnectionRegistry,
};

/// 既定の書き込みタイムアウト
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// 1 回のブロードキャストの結果（ログとテスト用）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 送信に成功したメンバー数
    pub delivered: usize,
    /// 送信に失敗して退去させたメンバー
    pub evicted: Vec<ConnectionId>,
}

/// ブロードキャストのユースケース（Broadcast Engine）
pub struct BroadcastUseCase {
    registry: Arc<ConnectionRegistry>,
    write_timeout: Duration,
}

impl BroadcastUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>, write_timeout: Duration) -> Self {
        Self {
            registry,
            write_timeout,
        }
    }

    /// `sender` 以外の全メンバーへ `message` を配送する
    ///
    /// # Arguments
    ///
    /// * `message` - 配送するテキスト（区切り文字はトランスポートが付ける）
    /// * `sender` - 除外する接続。`None` なら全員に配送する
    pub async fn execute(&self, message: &str, sender: Option<ConnectionId>) -> BroadcastReport {
        let mut members = self.registry.lock().await;

        let deliveries = members
            .iter()
            .filter(|record| Some(record.id()) != sender)
            .map(|record| async move {
                let result = match tokio::time::timeout(
                    self.write_timeout,
                    record.transport().send(message),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout),
                };
                (record.clone(), result)
            });
        let results = join_all(deliveries).await;

        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();
        for (record, result) in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Broadcast to {} ('{}', {}) failed: {}",
                        record.transport().kind().label(),
                        record.display_name(),
                        record.address(),
                        e
                    );
                    failed.push(record);
                }
            }
        }

        for record in failed {
            record.transport().close().await;
            members.remove(record.id());
            report.evicted.push(record.id());
        }

        tracing::debug!(
            "Broadcast delivered to {} member(s), evicted {}",
            report.delivered,
            report.evicted.len()
        );
        report
    }
}
