//! Broadcast Dispatcher
//!
//! ルーム ID またはユーザー Identity を受け取り、適切な接続へイベントを配信する。
//!
//! - `to_room`: ルームの全メンバー（送信者自身も含む）
//! - `to_room_except_sender`: 送信者以外のメンバー
//! - `to_user`: Presence Directory で解決した 1 接続（オフラインなら何もしない）
//! - `to_all`: 全接続（presence 変更の通知にのみ使う）
//!
//! 配信は fire-and-forget。戻り値は送信を試行できた接続の数で、失敗はログに残すだけ。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConversationId, Identity, MessagePushError, MessagePusher, OutboundEvent,
    PresenceRepository, RoomRepository,
};

pub struct BroadcastDispatcher {
    presence: Arc<dyn PresenceRepository>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl BroadcastDispatcher {
    pub fn new(
        presence: Arc<dyn PresenceRepository>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            presence,
            rooms,
            message_pusher,
        }
    }

    pub async fn to_room(&self, room_id: &ConversationId, event: &OutboundEvent) -> usize {
        let targets = self.rooms.members(room_id).await;
        let delivered = self.deliver(&targets, event).await;
        tracing::debug!(
            "Dispatched '{}' to room '{}' ({}/{} members)",
            event.name(),
            room_id,
            delivered,
            targets.len()
        );
        delivered
    }

    pub async fn to_room_except_sender(
        &self,
        room_id: &ConversationId,
        sender: &ConnectionId,
        event: &OutboundEvent,
    ) -> usize {
        let targets = self.rooms.members_except(room_id, sender).await;
        let delivered = self.deliver(&targets, event).await;
        tracing::debug!(
            "Dispatched '{}' to room '{}' except '{}' ({}/{} members)",
            event.name(),
            room_id,
            sender,
            delivered,
            targets.len()
        );
        delivered
    }

    /// Returns `true` if the event was written to the user's connection.
    pub async fn to_user(&self, identity: &Identity, event: &OutboundEvent) -> bool {
        let Some(connection_id) = self.presence.lookup(identity).await else {
            tracing::debug!("'{}' is offline, '{}' not delivered", identity, event.name());
            return false;
        };
        self.to_connection(&connection_id, event).await
    }

    pub async fn to_connection(&self, connection_id: &ConnectionId, event: &OutboundEvent) -> bool {
        match self.message_pusher.push_to(connection_id, event).await {
            Ok(()) => true,
            Err(MessagePushError::ConnectionNotFound(_)) => {
                // presence 参照と切断が競合した場合
                tracing::debug!(
                    "Connection '{}' is gone, '{}' not delivered",
                    connection_id,
                    event.name()
                );
                false
            }
            Err(e) => {
                tracing::warn!("Failed to deliver '{}': {}", event.name(), e);
                false
            }
        }
    }

    pub async fn to_all(&self, event: &OutboundEvent) -> usize {
        match self.message_pusher.broadcast_all(event).await {
            Ok(delivered) => {
                tracing::debug!("Dispatched '{}' to {} connections", event.name(), delivered);
                delivered
            }
            Err(e) => {
                tracing::warn!("Failed to broadcast '{}': {}", event.name(), e);
                0
            }
        }
    }

    async fn deliver(&self, targets: &[ConnectionId], event: &OutboundEvent) -> usize {
        if targets.is_empty() {
            return 0;
        }
        match self.message_pusher.broadcast(targets, event).await {
            Ok(delivered) => delivered,
            Err(e) => {
                tracing::warn!("Failed to broadcast '{}': {}", event.name(), e);
                0
            }
        }
    }
}
