//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - `OutboundEvent` を JSON にエンコードして送信（push_to, broadcast, broadcast_all）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 送信は fire-and-forget で、チャンネルに書き込めた時点で完了とみなします。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, OutboundEvent, PusherChannel},
    infrastructure::dto::websocket::ServerMessage,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new(Arc::new(Mutex::new(HashMap::new())));
/// pusher.register_connection(connection_id, tx).await;
/// pusher.push_to(&connection_id, &event).await?;
/// ```
pub struct WebSocketMessagePusher {
    /// Key: ConnectionId, Value: 送信チャンネル
    connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { connections }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

fn encode(event: &OutboundEvent) -> Result<String, MessagePushError> {
    serde_json::to_string(&ServerMessage::from(event))
        .map_err(|e| MessagePushError::Encode(e.to_string()))
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError> {
        let content = encode(event)?;
        let connections = self.connections.lock().await;

        let sender = connections
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        sender
            .send(content)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed '{}' to connection '{}'", event.name(), connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &OutboundEvent,
    ) -> Result<usize, MessagePushError> {
        let content = encode(event)?;
        let connections = self.connections.lock().await;

        let mut delivered = 0;
        for target in targets {
            match connections.get(target) {
                Some(sender) => {
                    // ブロードキャストでは一部の送信失敗を許容
                    if let Err(e) = sender.send(content.clone()) {
                        tracing::warn!("Failed to push '{}' to '{}': {}", event.name(), target, e);
                    } else {
                        delivered += 1;
                    }
                }
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }
        Ok(delivered)
    }

    async fn broadcast_all(&self, event: &OutboundEvent) -> Result<usize, MessagePushError> {
        let content = encode(event)?;
        let connections = self.connections.lock().await;

        let mut delivered = 0;
        for (connection_id, sender) in connections.iter() {
            if let Err(e) = sender.send(content.clone()) {
                tracing::warn!(
                    "Failed to push '{}' to '{}': {}",
                    event.name(),
                    connection_id,
                    e
                );
            } else {
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }
}
