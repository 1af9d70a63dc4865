//! ドメイン層
//!
//! 値オブジェクト、エンティティ（Presence Directory / Room Registry / 会話ドキュメント）、
//! イベント、および Infrastructure 層が実装する trait を定義する。

pub mod conversation;
pub mod error;
pub mod event;
pub mod presence;
pub mod pusher;
pub mod repository;
pub mod room;
pub mod value_object;

pub use conversation::{
    ConversationPreview, ConversationRecord, PREVIEW_CHAT_NOT_FOUND, PREVIEW_FETCH_ERROR,
    PREVIEW_NEW_MESSAGE, ParticipantState, StoredMessage,
};
pub use error::{MessagePushError, StoreError, ValueObjectError};
pub use event::{ConnectionCommand, OutboundEvent, PublishAction, PublishedEvent, RelayEvent};
pub use presence::PresenceDirectory;
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::{ConversationStore, PresenceRepository, RoomRepository};
pub use room::RoomRegistry;
pub use value_object::{ConnectionId, ConnectionIdFactory, ConversationId, Identity, MessageId};

#[cfg(test)]
pub use repository::MockConversationStore;
