//! リレーが扱うイベント
//!
//! - `RelayEvent`: Ingress で正規化された受信イベント（WebSocket / HTTP 共通の形）
//! - `OutboundEvent`: 接続へ配信するイベント

use serde_json::Value;

use super::{ConnectionId, ConversationId, ConversationPreview, Identity, MessageId};

/// 外部（HTTP publish）から受け付けるアクションの閉じた集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishAction {
    NewMessage,
    MessageReact,
    MessageEdit,
    MessageDelete,
}

impl PublishAction {
    pub const ALL: [PublishAction; 4] = [
        PublishAction::NewMessage,
        PublishAction::MessageReact,
        PublishAction::MessageEdit,
        PublishAction::MessageDelete,
    ];

    /// ワイヤー上の名前からアクションを解決する（未知の名前は `None`）
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PublishAction::NewMessage => "newMessage",
            PublishAction::MessageReact => "messageReact",
            PublishAction::MessageEdit => "messageEdit",
            PublishAction::MessageDelete => "messageDelete",
        }
    }
}

/// HTTP publish 経由のコンテンツイベント
///
/// `payload` は中身を解釈せずにそのままルームへ中継する。
/// `sender` / `receiver` は永続化の副作用にだけ使われ、欠けていても配信は行う。
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub action: PublishAction,
    pub conversation_id: ConversationId,
    pub sender: Option<Identity>,
    pub receiver: Option<Identity>,
    pub payload: Value,
}

/// 正規化済みのコンテンツイベント
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    Published(PublishedEvent),
    Typing {
        conversation_id: ConversationId,
        sender: Identity,
    },
    StopTyping {
        conversation_id: ConversationId,
        sender: Identity,
    },
    MessageSeen {
        conversation_id: ConversationId,
        message_id: MessageId,
        viewer: Identity,
    },
    ConversationSeen {
        conversation_id: ConversationId,
        viewer: Identity,
    },
}

impl RelayEvent {
    pub fn conversation_id(&self) -> &ConversationId {
        match self {
            RelayEvent::Published(event) => &event.conversation_id,
            RelayEvent::Typing {
                conversation_id, ..
            }
            | RelayEvent::StopTyping {
                conversation_id, ..
            }
            | RelayEvent::MessageSeen {
                conversation_id, ..
            }
            | RelayEvent::ConversationSeen {
                conversation_id, ..
            } => conversation_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::Published(event) => event.action.as_str(),
            RelayEvent::Typing { .. } => "typing",
            RelayEvent::StopTyping { .. } => "stopTyping",
            RelayEvent::MessageSeen { .. } => "messageSeen",
            RelayEvent::ConversationSeen { .. } => "conversationSeen",
        }
    }
}

/// WebSocket 接続から届くコマンド
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionCommand {
    Identify(Identity),
    JoinRoom(ConversationId),
    LeaveRoom(ConversationId),
    Relay(RelayEvent),
}

/// 接続へ配信されるイベント
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// 接続直後に本人へ送る
    Connected {
        connection_id: ConnectionId,
        online: Vec<Identity>,
        connected_at: i64,
    },
    PresenceChanged {
        online: Vec<Identity>,
    },
    Relayed {
        action: PublishAction,
        conversation_id: ConversationId,
        payload: Value,
    },
    Typing {
        conversation_id: ConversationId,
        sender: Identity,
    },
    StopTyping {
        conversation_id: ConversationId,
        sender: Identity,
    },
    MessageSeenUpdate {
        conversation_id: ConversationId,
        message_id: MessageId,
        viewer: Identity,
    },
    ConversationSeen {
        conversation_id: ConversationId,
        viewer: Identity,
    },
    /// 会話一覧の更新（特定ユーザーにのみ送る）
    ConversationUpdate {
        conversation_id: ConversationId,
        preview: ConversationPreview,
    },
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::Connected { .. } => "connected",
            OutboundEvent::PresenceChanged { .. } => "presenceChanged",
            OutboundEvent::Relayed { action, .. } => action.as_str(),
            OutboundEvent::Typing { .. } => "typing",
            OutboundEvent::StopTyping { .. } => "stopTyping",
            OutboundEvent::MessageSeenUpdate { .. } => "messageSeenUpdate",
            OutboundEvent::ConversationSeen { .. } => "conversationSeen",
            OutboundEvent::ConversationUpdate { .. } => "conversationUpdate",
        }
    }
}
