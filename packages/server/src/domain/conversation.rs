//! 会話ドキュメント（永続ストア側のレコード）
//!
//! リレーはこのドキュメントを所有しない。未読数・既読フラグの条件付き更新と、
//! 会話一覧向けプレビューの計算にのみ使用する。

use serde::{Deserialize, Serialize};

use super::{ConversationId, Identity, MessageId};

/// プレビュー文字列の最大文字数
pub const PREVIEW_MAX_CHARS: usize = 50;

/// 会話にメッセージが 1 件もない場合のプレビュー
pub const PREVIEW_NEW_MESSAGE: &str = "New message";
/// 会話ドキュメントが見つからない場合のプレビュー
pub const PREVIEW_CHAT_NOT_FOUND: &str = "Chat not found";
/// 会話ドキュメントの取得に失敗した場合のプレビュー
pub const PREVIEW_FETCH_ERROR: &str = "Error fetching preview";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantState {
    pub identity: Identity,
    #[serde(default)]
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: Identity,
    #[serde(default)]
    pub receiver: Option<Identity>,
    /// Unix timestamp (milliseconds)
    pub created_at: i64,
    #[serde(default)]
    pub is_seen: bool,
}

/// Conversation document as held by the durable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: ConversationId,
    #[serde(default)]
    pub participants: Vec<ParticipantState>,
    /// 作成順
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

impl ConversationRecord {
    pub fn new(id: ConversationId, participants: Vec<Identity>) -> Self {
        Self {
            id,
            participants: participants
                .into_iter()
                .map(|identity| ParticipantState {
                    identity,
                    unread_count: 0,
                })
                .collect(),
            messages: Vec::new(),
        }
    }

    pub fn participant(&self, identity: &Identity) -> Option<&ParticipantState> {
        self.participants.iter().find(|p| &p.identity == identity)
    }

    pub fn participant_mut(&mut self, identity: &Identity) -> Option<&mut ParticipantState> {
        self.participants.iter_mut().find(|p| &p.identity == identity)
    }

    pub fn message_mut(&mut self, message_id: &MessageId) -> Option<&mut StoredMessage> {
        self.messages.iter_mut().find(|m| &m.id == message_id)
    }

    pub fn unread_count_for(&self, identity: &Identity) -> u32 {
        self.participant(identity).map_or(0, |p| p.unread_count)
    }

    /// `identity` から見た会話一覧用のプレビューを計算する
    pub fn preview_for(&self, identity: &Identity) -> ConversationPreview {
        let unread_count = self.unread_count_for(identity);
        match self.messages.last() {
            Some(last) => ConversationPreview {
                unread_count,
                last_message_preview: truncate_preview(&last.text),
                last_message_at: Some(last.created_at),
            },
            None => ConversationPreview {
                unread_count,
                last_message_preview: PREVIEW_NEW_MESSAGE.to_string(),
                last_message_at: None,
            },
        }
    }
}

/// 会話一覧の 1 行分（conversationUpdate で個別配信される）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPreview {
    pub unread_count: u32,
    pub last_message_preview: String,
    /// Unix timestamp (milliseconds)
    pub last_message_at: Option<i64>,
}

impl ConversationPreview {
    /// 取得に失敗した場合のプレビュー（未読数は不明なので 0）
    pub fn fallback(text: &str) -> Self {
        Self {
            unread_count: 0,
            last_message_preview: text.to_string(),
            last_message_at: None,
        }
    }
}

fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_MAX_CHARS {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
    truncated.push('…');
    truncated
}
