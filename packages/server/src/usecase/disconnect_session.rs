//! UseCase: WebSocket 接続の終了
//!
//! 切断された接続を MessagePusher・Room Registry・Presence Directory の全てから取り除き、
//! presence が変わった場合だけ残りの全接続へオンライン一覧を配信する。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 切断した接続が所有していた Identity だけが消えること
//! - 後から同じ Identity で identify した接続のマッピングが消えないこと
//! - identify していない接続の切断では presence 配信が起きないこと

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConversationId, Identity, MessagePusher, OutboundEvent, PresenceRepository,
    RoomRepository,
};

use super::BroadcastDispatcher;

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// オフラインになった Identity
    pub went_offline: Vec<Identity>,
    /// 退出したルーム
    pub left_rooms: Vec<ConversationId>,
}

pub struct DisconnectSessionUseCase {
    presence: Arc<dyn PresenceRepository>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    dispatcher: Arc<BroadcastDispatcher>,
}

impl DisconnectSessionUseCase {
    pub fn new(
        presence: Arc<dyn PresenceRepository>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        dispatcher: Arc<BroadcastDispatcher>,
    ) -> Self {
        Self {
            presence,
            rooms,
            message_pusher,
            dispatcher,
        }
    }

    pub async fn execute(&self, connection_id: &ConnectionId) -> DisconnectOutcome {
        // 1. 以降の配信対象から外す
        self.message_pusher
            .unregister_connection(connection_id)
            .await;

        // 2. 全ルームから外す（identify していなくても行う）
        let left_rooms = self.rooms.remove_connection(connection_id).await;

        // 3. この接続が所有する Identity だけを消す
        let went_offline = self.presence.clear_if_owner(connection_id).await;

        if !went_offline.is_empty() {
            let online = self.presence.online_identities().await;
            self.dispatcher
                .to_all(&OutboundEvent::PresenceChanged { online })
                .await;
        }

        tracing::info!(
            "Connection '{}' closed (offline: {:?}, rooms left: {})",
            connection_id,
            went_offline.iter().map(Identity::as_str).collect::<Vec<_>>(),
            left_rooms.len()
        );

        DisconnectOutcome {
            went_offline,
            left_rooms,
        }
    }
}
