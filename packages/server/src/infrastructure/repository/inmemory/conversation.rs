//! InMemory Conversation Store 実装
//!
//! 外部の永続ストアの代替。`ConversationStore` の各操作を 1 回のロック内で
//! 実行することで、ドキュメント単位のアトミックな条件付き更新を再現する。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConversationId, ConversationRecord, ConversationStore, Identity, MessageId, StoreError,
};

/// インメモリ会話ストア
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: Mutex<HashMap<ConversationId, ConversationRecord>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存のドキュメント群で初期化する（シードファイル用）
    pub fn with_records(records: Vec<ConversationRecord>) -> Self {
        let conversations = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            conversations: Mutex::new(conversations),
        }
    }

    /// Runs `update` against one document under the lock.
    async fn update_document<F>(
        &self,
        conversation_id: &ConversationId,
        update: F,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(&mut ConversationRecord) -> Result<(), StoreError> + Send,
    {
        let mut conversations = self.conversations.lock().await;
        let record = conversations
            .get_mut(conversation_id)
            .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.to_string()))?;
        update(record)
    }
}

fn no_match(conversation_id: &ConversationId, element: &'static str) -> StoreError {
    StoreError::NoMatch {
        conversation_id: conversation_id.to_string(),
        element,
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn increment_unread(
        &self,
        conversation_id: &ConversationId,
        identity: &Identity,
    ) -> Result<(), StoreError> {
        self.update_document(conversation_id, |record| {
            let participant = record
                .participant_mut(identity)
                .ok_or_else(|| no_match(conversation_id, "participant"))?;
            participant.unread_count = participant.unread_count.saturating_add(1);
            Ok(())
        })
        .await
    }

    async fn reset_unread(
        &self,
        conversation_id: &ConversationId,
        identity: &Identity,
    ) -> Result<(), StoreError> {
        self.update_document(conversation_id, |record| {
            let participant = record
                .participant_mut(identity)
                .ok_or_else(|| no_match(conversation_id, "participant"))?;
            participant.unread_count = 0;
            Ok(())
        })
        .await
    }

    async fn mark_message_seen(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<(), StoreError> {
        self.update_document(conversation_id, |record| {
            let message = record
                .message_mut(message_id)
                .ok_or_else(|| no_match(conversation_id, "message"))?;
            message.is_seen = true;
            Ok(())
        })
        .await
    }

    async fn find_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<ConversationRecord>, StoreError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations.get(conversation_id).cloned())
    }
}
