//! UseCase テスト用の共通セットアップ
//!
//! Presence Directory / Room Registry / MessagePusher は実装（インメモリ）をそのまま使い、
//! 接続はチャンネルの受信側で WebSocket クライアントを代替する。

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use crate::domain::{
    ConnectionId, ConnectionIdFactory, ConversationId, Identity, MessagePusher, PresenceDirectory,
    PresenceRepository, RoomRegistry, RoomRepository,
};
use crate::infrastructure::{
    message_pusher::WebSocketMessagePusher,
    repository::{InMemoryPresenceRepository, InMemoryRoomRepository},
};

use super::BroadcastDispatcher;

pub(crate) struct TestRelay {
    pub presence: Arc<InMemoryPresenceRepository>,
    pub rooms: Arc<InMemoryRoomRepository>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub dispatcher: Arc<BroadcastDispatcher>,
}

impl TestRelay {
    pub fn new() -> Self {
        let presence = Arc::new(InMemoryPresenceRepository::new(Arc::new(Mutex::new(
            PresenceDirectory::new(),
        ))));
        let rooms = Arc::new(InMemoryRoomRepository::new(Arc::new(Mutex::new(
            RoomRegistry::new(),
        ))));
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let dispatcher = Arc::new(BroadcastDispatcher::new(
            presence.clone(),
            rooms.clone(),
            pusher.clone(),
        ));
        Self {
            presence,
            rooms,
            pusher,
            dispatcher,
        }
    }

    /// 新しい接続を MessagePusher に登録する
    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection_id = ConnectionIdFactory::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        self.pusher.register_connection(connection_id, tx).await;
        (connection_id, rx)
    }

    pub async fn identify(&self, connection_id: ConnectionId, identity: &str) {
        self.presence
            .set_online(self.identity(identity), connection_id)
            .await;
    }

    pub async fn join(&self, connection_id: ConnectionId, room: &str) {
        self.rooms.join(connection_id, self.room(room)).await;
    }

    pub fn identity(&self, value: &str) -> Identity {
        Identity::new(value.to_string()).unwrap()
    }

    pub fn room(&self, value: &str) -> ConversationId {
        ConversationId::new(value.to_string()).unwrap()
    }
}

/// 次のイベントを JSON として受け取る（1 秒でタイムアウト）
pub(crate) async fn recv_event(rx: &mut mpsc::UnboundedReceiver<String>) -> Value {
    let raw = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed");
    serde_json::from_str(&raw).unwrap()
}

pub(crate) fn assert_no_event(rx: &mut mpsc::UnboundedReceiver<String>) {
    if let Ok(raw) = rx.try_recv() {
        panic!("unexpected event: {raw}");
    }
}
