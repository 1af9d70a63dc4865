//! UseCase: 現在のオンライン一覧・ルーム概要の取得

use std::sync::Arc;

use crate::domain::{ConversationId, Identity, PresenceRepository, RoomRepository};

pub struct GetPresenceUseCase {
    presence: Arc<dyn PresenceRepository>,
}

impl GetPresenceUseCase {
    pub fn new(presence: Arc<dyn PresenceRepository>) -> Self {
        Self { presence }
    }

    pub async fn execute(&self) -> Vec<Identity> {
        self.presence.online_identities().await
    }
}

/// ルームの概要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: ConversationId,
    pub member_count: usize,
}

pub struct GetRoomSummaryUseCase {
    rooms: Arc<dyn RoomRepository>,
}

impl GetRoomSummaryUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    /// メンバーのいないルームは 0 人として返す
    pub async fn execute(&self, room_id: ConversationId) -> RoomSummary {
        let member_count = self.rooms.member_count(&room_id).await;
        RoomSummary {
            id: room_id,
            member_count,
        }
    }
}
