//! UseCase: WebSocket 接続の開始
//!
//! 接続 ID を払い出し、送信チャンネルを MessagePusher に登録して、
//! 本人にだけ `connected`（接続 ID と現在のオンライン一覧）を送る。
//! この時点ではまだ Presence Directory には載らない（identify が必要）。

use std::sync::Arc;

use dengon_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConnectionIdFactory, MessagePusher, OutboundEvent, PresenceRepository,
    PusherChannel,
};

pub struct ConnectSessionUseCase {
    presence: Arc<dyn PresenceRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectSessionUseCase {
    pub fn new(
        presence: Arc<dyn PresenceRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            presence,
            message_pusher,
            clock,
        }
    }

    /// 新しい接続を登録する
    ///
    /// # Returns
    ///
    /// 払い出した接続 ID
    pub async fn execute(&self, sender: PusherChannel) -> ConnectionId {
        let connection_id = ConnectionIdFactory::generate();
        self.message_pusher
            .register_connection(connection_id, sender)
            .await;

        let event = OutboundEvent::Connected {
            connection_id,
            online: self.presence.online_identities().await,
            connected_at: self.clock.now_millis(),
        };
        if let Err(e) = self.message_pusher.push_to(&connection_id, &event).await {
            tracing::warn!("Failed to send 'connected' to '{}': {}", connection_id, e);
        }

        tracing::info!("Connection '{}' opened", connection_id);
        connection_id
    }
}
