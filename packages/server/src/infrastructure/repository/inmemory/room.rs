//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `RoomRegistry` を Mutex で保護する。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConversationId, RoomRegistry, RoomRepository};

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    registry: Arc<Mutex<RoomRegistry>>,
}

impl InMemoryRoomRepository {
    pub fn new(registry: Arc<Mutex<RoomRegistry>>) -> Self {
        Self { registry }
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(RoomRegistry::new())))
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn join(&self, connection_id: ConnectionId, room_id: ConversationId) -> bool {
        let mut registry = self.registry.lock().await;
        registry.join(connection_id, room_id)
    }

    async fn leave(&self, connection_id: &ConnectionId, room_id: &ConversationId) -> bool {
        let mut registry = self.registry.lock().await;
        registry.leave(connection_id, room_id)
    }

    async fn members(&self, room_id: &ConversationId) -> Vec<ConnectionId> {
        let registry = self.registry.lock().await;
        registry.members(room_id)
    }

    async fn members_except(
        &self,
        room_id: &ConversationId,
        exclude: &ConnectionId,
    ) -> Vec<ConnectionId> {
        let registry = self.registry.lock().await;
        registry.members_except(room_id, exclude)
    }

    async fn remove_connection(&self, connection_id: &ConnectionId) -> Vec<ConversationId> {
        let mut registry = self.registry.lock().await;
        registry.remove_connection(connection_id)
    }

    async fn member_count(&self, room_id: &ConversationId) -> usize {
        let registry = self.registry.lock().await;
        registry.member_count(room_id)
    }
}
