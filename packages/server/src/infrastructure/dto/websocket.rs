//! WebSocket message DTOs.
//!
//! Every frame is a JSON text frame. Inbound frames are discriminated by
//! `"event"`. Outbound frames have the shape `{"event": <name>, "data": {...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frame sent by a client.
///
/// Every field is optional on the wire: a frame with missing fields still
/// parses and is dropped afterwards during conversion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Identify {
        #[serde(alias = "email")]
        identity: Option<String>,
    },
    JoinRoom {
        room_id: Option<String>,
    },
    LeaveRoom {
        room_id: Option<String>,
    },
    Typing {
        room_id: Option<String>,
        #[serde(alias = "senderIdentity")]
        sender: Option<String>,
    },
    StopTyping {
        room_id: Option<String>,
        #[serde(alias = "senderIdentity")]
        sender: Option<String>,
    },
    MessageSeen {
        room_id: Option<String>,
        message_id: Option<String>,
        #[serde(alias = "viewerIdentity")]
        viewer: Option<String>,
    },
    ConversationSeen {
        room_id: Option<String>,
        #[serde(alias = "viewerIdentity")]
        viewer: Option<String>,
    },
}

/// Frame sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    Connected(ConnectedPayload),
    PresenceChanged(PresenceChangedPayload),
    NewMessage(RelayedPayload),
    MessageReact(RelayedPayload),
    MessageEdit(RelayedPayload),
    MessageDelete(RelayedPayload),
    Typing(TypingPayload),
    StopTyping(TypingPayload),
    MessageSeenUpdate(MessageSeenUpdatePayload),
    ConversationSeen(ConversationSeenPayload),
    ConversationUpdate(ConversationUpdatePayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    pub connection_id: String,
    pub online: Vec<String>,
    /// RFC 3339 (UTC)
    pub connected_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceChangedPayload {
    pub online: Vec<String>,
}

/// Content event relayed verbatim from the publish interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedPayload {
    pub conversation_id: String,
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub conversation_id: String,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSeenUpdatePayload {
    pub conversation_id: String,
    pub message_id: String,
    pub viewer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSeenPayload {
    pub conversation_id: String,
    pub viewer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationUpdatePayload {
    pub conversation_id: String,
    pub unread_count: u32,
    pub last_message_preview: String,
    /// RFC 3339 (UTC)
    pub last_message_at: Option<String>,
}
