//! InMemory Connection Registry 実装
//!
//! 接続中の全ての `ConnectionRecord` を 1 つの Mutex で保護して保持します。
//! 追加・削除・ブロードキャスト 1 回分の走査・表示用スナップショットは
//! 全て同じロックの下で行われるため、走査中にメンバーが増減することはありません。
//!
//! ロックの順序は常に「レジストリ → 各トランスポート」です。

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{ConnectionId, ConnectionRecord, ConnectionSnapshot, Members};

/// 接続中のクライアントを管理するレジストリ
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    members: Mutex<Members>,
}

impl ConnectionRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// レコードを追加し、以降のブロードキャストとスナップショットの対象にする
    ///
    /// 同じ接続 ID が既に登録されている場合は追加せず `false` を返す
    pub async fn add(&self, record: Arc<ConnectionRecord>) -> bool {
        let mut members = self.members.lock().await;
        let inserted = members.insert(record.clone());
        if inserted {
            tracing::debug!(
                "Registered {} ({}) as '{}'; {} member(s)",
                record.id(),
                record.address(),
                record.display_name(),
                members.len()
            );
        } else {
            tracing::warn!("Connection {} is already registered", record.id());
        }
        inserted
    }

    /// 接続 ID に一致するレコードを削除
    ///
    /// 存在しない ID の削除は何もしない（冪等）
    pub async fn remove(&self, id: ConnectionId) -> Option<Arc<ConnectionRecord>> {
        let mut members = self.members.lock().await;
        let removed = members.remove(id);
        if let Some(record) = &removed {
            tracing::debug!(
                "Unregistered {} ('{}'); {} member(s)",
                id,
                record.display_name(),
                members.len()
            );
        }
        removed
    }

    /// メンバー集合への排他アクセス
    ///
    /// ガードを保持している間、他の add / remove / 走査は待たされる
    pub async fn lock(&self) -> MutexGuard<'_, Members> {
        self.members.lock().await
    }

    /// 表示用に現在のメンバーをコピーして返す
    pub async fn snapshot(&self) -> Vec<ConnectionSnapshot> {
        self.members.lock().await.snapshot()
    }

    /// 全メンバーを削除してトランスポートを閉じる（シャットダウン時）
    pub async fn close_all(&self) -> usize {
        let mut members = self.members.lock().await;
        let drained = members.drain();
        for record in &drained {
            record.transport().close().await;
        }
        drained.len()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.members.lock().await.contains(id)
    }

    pub async fn len(&self) -> usize {
        self.members.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.lock().await.is_empty()
    }
}
