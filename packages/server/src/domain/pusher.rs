//! MessagePusher trait 定義
//!
//! 接続へのイベント送信を抽象化する。
//! 送信は fire-and-forget で、配信確認も再送も行わない。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, OutboundEvent};

/// 接続ごとの送信チャンネル（UI 層の pusher ループが WebSocket へ書き出す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// 1 つの接続へ送信する
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続へ送信する。一部の送信失敗は許容する
    ///
    /// # Returns
    ///
    /// 送信を試行できた接続の数
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &OutboundEvent,
    ) -> Result<usize, MessagePushError>;

    /// 登録済みの全接続へ送信する
    async fn broadcast_all(&self, event: &OutboundEvent) -> Result<usize, MessagePushError>;

    async fn connection_count(&self) -> usize;
}
