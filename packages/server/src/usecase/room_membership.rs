//! UseCase: ルームへの参加・退出

use std::sync::Arc;

use crate::domain::{ConnectionId, ConversationId, RoomRepository};

pub struct RoomMembershipUseCase {
    rooms: Arc<dyn RoomRepository>,
}

impl RoomMembershipUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    /// ルームに参加する（参加済みなら何もしない）
    pub async fn join(&self, connection_id: ConnectionId, room_id: ConversationId) -> bool {
        let label = room_id.to_string();
        let joined = self.rooms.join(connection_id, room_id).await;
        if joined {
            tracing::debug!("Connection '{}' joined room '{}'", connection_id, label);
        }
        joined
    }

    /// ルームから退出する（メンバーでなければ何もしない）
    pub async fn leave(&self, connection_id: &ConnectionId, room_id: &ConversationId) -> bool {
        let left = self.rooms.leave(connection_id, room_id).await;
        if left {
            tracing::debug!("Connection '{}' left room '{}'", connection_id, room_id);
        }
        left
    }
}
