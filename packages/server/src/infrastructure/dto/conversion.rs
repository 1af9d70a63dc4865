//! Conversion logic between DTOs and domain types.

use thiserror::Error;

use dengon_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ConnectionCommand, ConversationId, Identity, MessageId, OutboundEvent, PublishAction,
    RelayEvent, ValueObjectError,
};
use crate::infrastructure::dto::websocket as dto;

/// Reason a client frame was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error(transparent)]
    Invalid(#[from] ValueObjectError),
}

fn required<T>(
    value: Option<String>,
    field: &'static str,
    build: fn(String) -> Result<T, ValueObjectError>,
) -> Result<T, FrameError> {
    let value = value.ok_or(FrameError::MissingField(field))?;
    Ok(build(value)?)
}

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<dto::ClientMessage> for ConnectionCommand {
    type Error = FrameError;

    fn try_from(message: dto::ClientMessage) -> Result<Self, Self::Error> {
        use dto::ClientMessage as M;

        let command = match message {
            M::Identify { identity } => {
                ConnectionCommand::Identify(required(identity, "identity", Identity::new)?)
            }
            M::JoinRoom { room_id } => {
                ConnectionCommand::JoinRoom(required(room_id, "roomId", ConversationId::new)?)
            }
            M::LeaveRoom { room_id } => {
                ConnectionCommand::LeaveRoom(required(room_id, "roomId", ConversationId::new)?)
            }
            M::Typing { room_id, sender } => ConnectionCommand::Relay(RelayEvent::Typing {
                conversation_id: required(room_id, "roomId", ConversationId::new)?,
                sender: required(sender, "sender", Identity::new)?,
            }),
            M::StopTyping { room_id, sender } => ConnectionCommand::Relay(RelayEvent::StopTyping {
                conversation_id: required(room_id, "roomId", ConversationId::new)?,
                sender: required(sender, "sender", Identity::new)?,
            }),
            M::MessageSeen {
                room_id,
                message_id,
                viewer,
            } => ConnectionCommand::Relay(RelayEvent::MessageSeen {
                conversation_id: required(room_id, "roomId", ConversationId::new)?,
                message_id: required(message_id, "messageId", MessageId::new)?,
                viewer: required(viewer, "viewer", Identity::new)?,
            }),
            M::ConversationSeen { room_id, viewer } => {
                ConnectionCommand::Relay(RelayEvent::ConversationSeen {
                    conversation_id: required(room_id, "roomId", ConversationId::new)?,
                    viewer: required(viewer, "viewer", Identity::new)?,
                })
            }
        };
        Ok(command)
    }
}

// ========================================
// Domain → DTO
// ========================================

fn identities_to_strings(identities: &[Identity]) -> Vec<String> {
    identities.iter().map(|i| i.as_str().to_string()).collect()
}

impl From<&OutboundEvent> for dto::ServerMessage {
    fn from(event: &OutboundEvent) -> Self {
        match event {
            OutboundEvent::Connected {
                connection_id,
                online,
                connected_at,
            } => dto::ServerMessage::Connected(dto::ConnectedPayload {
                connection_id: connection_id.to_string(),
                online: identities_to_strings(online),
                connected_at: timestamp_to_rfc3339(*connected_at),
            }),
            OutboundEvent::PresenceChanged { online } => {
                dto::ServerMessage::PresenceChanged(dto::PresenceChangedPayload {
                    online: identities_to_strings(online),
                })
            }
            OutboundEvent::Relayed {
                action,
                conversation_id,
                payload,
            } => {
                let relayed = dto::RelayedPayload {
                    conversation_id: conversation_id.to_string(),
                    payload: payload.clone(),
                };
                match action {
                    PublishAction::NewMessage => dto::ServerMessage::NewMessage(relayed),
                    PublishAction::MessageReact => dto::ServerMessage::MessageReact(relayed),
                    PublishAction::MessageEdit => dto::ServerMessage::MessageEdit(relayed),
                    PublishAction::MessageDelete => dto::ServerMessage::MessageDelete(relayed),
                }
            }
            OutboundEvent::Typing {
                conversation_id,
                sender,
            } => dto::ServerMessage::Typing(dto::TypingPayload {
                conversation_id: conversation_id.to_string(),
                sender: sender.to_string(),
            }),
            OutboundEvent::StopTyping {
                conversation_id,
                sender,
            } => dto::ServerMessage::StopTyping(dto::TypingPayload {
                conversation_id: conversation_id.to_string(),
                sender: sender.to_string(),
            }),
            OutboundEvent::MessageSeenUpdate {
                conversation_id,
                message_id,
                viewer,
            } => dto::ServerMessage::MessageSeenUpdate(dto::MessageSeenUpdatePayload {
                conversation_id: conversation_id.to_string(),
                message_id: message_id.to_string(),
                viewer: viewer.to_string(),
            }),
            OutboundEvent::ConversationSeen {
                conversation_id,
                viewer,
            } => dto::ServerMessage::ConversationSeen(dto::ConversationSeenPayload {
                conversation_id: conversation_id.to_string(),
                viewer: viewer.to_string(),
            }),
            OutboundEvent::ConversationUpdate {
                conversation_id,
                preview,
            } => dto::ServerMessage::ConversationUpdate(dto::ConversationUpdatePayload {
                conversation_id: conversation_id.to_string(),
                unread_count: preview.unread_count,
                last_message_preview: preview.last_message_preview.clone(),
                last_message_at: preview.last_message_at.and_then(timestamp_to_rfc3339),
            }),
        }
    }
}
