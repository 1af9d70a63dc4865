//! UseCase: 未読数・既読状態の同期
//!
//! ルームへの配信が済んだ後に、外部ストアの会話ドキュメントを更新する。
//! ストア呼び出しは全て `store_timeout` で打ち切られ、失敗はログに残して握りつぶす。
//! リトライは行わない。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 受信者の未読数インクリメントと、オンラインの受信者への conversationUpdate 送信
//! - messageSeen で 2 つの条件付き更新が独立して実行されること
//! - ストア障害・タイムアウト時のセンチネルプレビュー
//!
//! ### どのような状況を想定しているか
//! - 正常系：受信者がオンライン / オフライン
//! - 異常系：ストアが失敗する、応答しない、会話が存在しない

use std::{future::Future, sync::Arc, time::Duration};

use crate::domain::{
    ConversationId, ConversationPreview, ConversationStore, Identity, MessageId, OutboundEvent,
    PREVIEW_CHAT_NOT_FOUND, PREVIEW_FETCH_ERROR, PresenceRepository, StoreError,
};

use super::BroadcastDispatcher;

/// newMessage の同期結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewMessageSync {
    pub incremented: bool,
    /// conversationUpdate を受信者の接続に書き込めたか
    pub notified: bool,
}

/// messageSeen の同期結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSeenSync {
    pub message_marked: bool,
    pub unread_reset: bool,
}

pub struct UnreadSyncUseCase {
    store: Arc<dyn ConversationStore>,
    presence: Arc<dyn PresenceRepository>,
    dispatcher: Arc<BroadcastDispatcher>,
    store_timeout: Duration,
}

impl UnreadSyncUseCase {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        presence: Arc<dyn PresenceRepository>,
        dispatcher: Arc<BroadcastDispatcher>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            presence,
            dispatcher,
            store_timeout,
        }
    }

    /// 受信者の未読数を 1 増やし、オンラインなら会話一覧の更新を送る
    ///
    /// インクリメントの成否にかかわらず、オンラインの受信者には conversationUpdate を送る。
    pub async fn on_new_message(
        &self,
        conversation_id: &ConversationId,
        receiver: &Identity,
    ) -> NewMessageSync {
        let incremented = match self
            .bounded(self.store.increment_unread(conversation_id, receiver))
            .await
        {
            Ok(()) => {
                tracing::debug!(
                    "Incremented unread count of '{}' in '{}'",
                    receiver,
                    conversation_id
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to increment unread count of '{}' in '{}': {}",
                    receiver,
                    conversation_id,
                    e
                );
                false
            }
        };

        if self.presence.lookup(receiver).await.is_none() {
            tracing::debug!("'{}' is offline, conversationUpdate skipped", receiver);
            return NewMessageSync {
                incremented,
                notified: false,
            };
        }

        let preview = self.build_preview(conversation_id, receiver).await;
        let event = OutboundEvent::ConversationUpdate {
            conversation_id: conversation_id.clone(),
            preview,
        };
        let notified = self.dispatcher.to_user(receiver, &event).await;

        NewMessageSync {
            incremented,
            notified,
        }
    }

    /// メッセージを既読にし、閲覧者の未読数を 0 にする
    ///
    /// 2 つの更新は独立していて、片方の失敗はもう片方に影響しない。
    pub async fn on_message_seen(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        viewer: &Identity,
    ) -> MessageSeenSync {
        let (marked, reset) = tokio::join!(
            self.bounded(self.store.mark_message_seen(conversation_id, message_id)),
            self.bounded(self.store.reset_unread(conversation_id, viewer)),
        );

        let message_marked = match marked {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to mark message '{}' in '{}' as seen: {}",
                    message_id,
                    conversation_id,
                    e
                );
                false
            }
        };
        let unread_reset = self.log_reset(conversation_id, viewer, reset);

        MessageSeenSync {
            message_marked,
            unread_reset,
        }
    }

    /// 閲覧者の未読数を 0 にする
    pub async fn on_conversation_seen(
        &self,
        conversation_id: &ConversationId,
        viewer: &Identity,
    ) -> bool {
        let result = self
            .bounded(self.store.reset_unread(conversation_id, viewer))
            .await;
        self.log_reset(conversation_id, viewer, result)
    }

    /// 受信者向けの会話プレビューを組み立てる
    pub async fn build_preview(
        &self,
        conversation_id: &ConversationId,
        identity: &Identity,
    ) -> ConversationPreview {
        match self
            .bounded(self.store.find_conversation(conversation_id))
            .await
        {
            Ok(Some(record)) => record.preview_for(identity),
            Ok(None) => {
                tracing::warn!("Conversation '{}' not found for preview", conversation_id);
                ConversationPreview::fallback(PREVIEW_CHAT_NOT_FOUND)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch conversation '{}' for preview: {}",
                    conversation_id,
                    e
                );
                ConversationPreview::fallback(PREVIEW_FETCH_ERROR)
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .unwrap_or(Err(StoreError::Timeout(self.store_timeout)))
    }

    fn log_reset(
        &self,
        conversation_id: &ConversationId,
        viewer: &Identity,
        result: Result<(), StoreError>,
    ) -> bool {
        match result {
            Ok(()) => {
                tracing::debug!(
                    "Reset unread count of '{}' in '{}'",
                    viewer,
                    conversation_id
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to reset unread count of '{}' in '{}': {}",
                    viewer,
                    conversation_id,
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConversationRecord, MockConversationStore, PREVIEW_NEW_MESSAGE, StoredMessage,
    };
    use crate::infrastructure::repository::InMemoryConversationStore;
    use crate::usecase::test_support::{TestRelay, assert_no_event, recv_event};

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn create_usecase(relay: &TestRelay, store: Arc<dyn ConversationStore>) -> UnreadSyncUseCase {
        UnreadSyncUseCase::new(
            store,
            relay.presence.clone(),
            relay.dispatcher.clone(),
            TIMEOUT,
        )
    }

    fn seeded_store(relay: &TestRelay) -> Arc<InMemoryConversationStore> {
        let mut record = ConversationRecord::new(
            relay.room("conv1"),
            vec![
                relay.identity("alice@example.com"),
                relay.identity("bob@example.com"),
            ],
        );
        record.messages.push(StoredMessage {
            id: MessageId::new("m1".to_string()).unwrap(),
            text: "hi bob".to_string(),
            sender: relay.identity("alice@example.com"),
            receiver: Some(relay.identity("bob@example.com")),
            created_at: 1672531200000,
            is_seen: false,
        });
        Arc::new(InMemoryConversationStore::with_records(vec![record]))
    }

    #[tokio::test]
    async fn test_new_message_notifies_online_receiver() {
        // テスト項目: オンラインの受信者に未読数 1 の conversationUpdate が届く
        // given (前提条件):
        let relay = TestRelay::new();
        let store = seeded_store(&relay);
        let usecase = create_usecase(&relay, store.clone());
        let (bob, mut bob_rx) = relay.connect().await;
        relay.identify(bob, "bob@example.com").await;

        // when (操作):
        let result = usecase
            .on_new_message(&relay.room("conv1"), &relay.identity("bob@example.com"))
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            NewMessageSync {
                incremented: true,
                notified: true
            }
        );
        let event = recv_event(&mut bob_rx).await;
        assert_eq!(event["event"], "conversationUpdate");
        assert_eq!(event["data"]["conversationId"], "conv1");
        assert_eq!(event["data"]["unreadCount"], 1);
        assert_eq!(event["data"]["lastMessagePreview"], "hi bob");
        assert_eq!(event["data"]["lastMessageAt"], "2023-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn test_new_message_offline_receiver_only_increments() {
        // テスト項目: オフラインの受信者は未読数だけ増え、何も送られない
        // given (前提条件):
        let relay = TestRelay::new();
        let store = seeded_store(&relay);
        let usecase = create_usecase(&relay, store.clone());
        let (_other, mut other_rx) = relay.connect().await;

        // when (操作):
        let result = usecase
            .on_new_message(&relay.room("conv1"), &relay.identity("bob@example.com"))
            .await;

        // then (期待する結果):
        assert!(result.incremented);
        assert!(!result.notified);
        assert_no_event(&mut other_rx);
        let record = store
            .find_conversation(&relay.room("conv1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            record.unread_count_for(&relay.identity("bob@example.com")),
            1
        );
    }

    #[tokio::test]
    async fn test_repeated_new_message_double_counts() {
        // テスト項目: 同じ newMessage を 2 回処理すると未読数は 2 になる（重複排除なし）
        // given (前提条件):
        let relay = TestRelay::new();
        let store = seeded_store(&relay);
        let usecase = create_usecase(&relay, store.clone());
        let conversation_id = relay.room("conv1");
        let bob = relay.identity("bob@example.com");

        // when (操作):
        usecase.on_new_message(&conversation_id, &bob).await;
        usecase.on_new_message(&conversation_id, &bob).await;

        // then (期待する結果):
        let record = store
            .find_conversation(&conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.unread_count_for(&bob), 2);
    }

    #[tokio::test]
    async fn test_new_message_store_failure_still_notifies_with_sentinel() {
        // テスト項目: ストアが失敗しても、オンラインの受信者には "Error fetching preview" が届く
        // given (前提条件):
        let relay = TestRelay::new();
        let mut store = MockConversationStore::new();
        store
            .expect_increment_unread()
            .times(1)
            .returning(|_, _| Err(StoreError::Unavailable("connection refused".to_string())));
        store
            .expect_find_conversation()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("connection refused".to_string())));
        let usecase = create_usecase(&relay, Arc::new(store));
        let (bob, mut bob_rx) = relay.connect().await;
        relay.identify(bob, "bob@example.com").await;

        // when (操作):
        let result = usecase
            .on_new_message(&relay.room("conv1"), &relay.identity("bob@example.com"))
            .await;

        // then (期待する結果):
        assert!(!result.incremented);
        assert!(result.notified);
        let event = recv_event(&mut bob_rx).await;
        assert_eq!(event["data"]["lastMessagePreview"], PREVIEW_FETCH_ERROR);
        assert_eq!(event["data"]["unreadCount"], 0);
        assert!(event["data"]["lastMessageAt"].is_null());
    }

    #[tokio::test]
    async fn test_build_preview_missing_conversation() {
        // テスト項目: 会話が存在しない場合のプレビューは "Chat not found"
        // given (前提条件):
        let relay = TestRelay::new();
        let usecase = create_usecase(&relay, Arc::new(InMemoryConversationStore::new()));

        // when (操作):
        let preview = usecase
            .build_preview(&relay.room("ghost"), &relay.identity("bob@example.com"))
            .await;

        // then (期待する結果):
        assert_eq!(preview, ConversationPreview::fallback(PREVIEW_CHAT_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_build_preview_empty_conversation() {
        // テスト項目: メッセージのない会話のプレビューは "New message"
        // given (前提条件):
        let relay = TestRelay::new();
        let record = ConversationRecord::new(
            relay.room("conv1"),
            vec![relay.identity("bob@example.com")],
        );
        let store = InMemoryConversationStore::with_records(vec![record]);
        let usecase = create_usecase(&relay, Arc::new(store));

        // when (操作):
        let preview = usecase
            .build_preview(&relay.room("conv1"), &relay.identity("bob@example.com"))
            .await;

        // then (期待する結果):
        assert_eq!(preview.last_message_preview, PREVIEW_NEW_MESSAGE);
        assert_eq!(preview.last_message_at, None);
    }

    #[tokio::test]
    async fn test_bounded_call_returns_timeout_error() {
        // テスト項目: 上限時間内に終わらないストア呼び出しは StoreError::Timeout になる
        // given (前提条件):
        let relay = TestRelay::new();
        let limit = Duration::from_millis(20);
        let usecase = UnreadSyncUseCase::new(
            Arc::new(InMemoryConversationStore::new()),
            relay.presence.clone(),
            relay.dispatcher.clone(),
            limit,
        );
        let never = std::future::pending::<Result<(), StoreError>>();

        // when (操作):
        let result = usecase.bounded(never).await;

        // then (期待する結果):
        assert_eq!(result, Err(StoreError::Timeout(limit)));
    }

    #[tokio::test]
    async fn test_message_seen_updates_are_independent() {
        // テスト項目: mark_message_seen が失敗しても reset_unread は実行される
        // given (前提条件):
        let relay = TestRelay::new();
        let mut store = MockConversationStore::new();
        store.expect_mark_message_seen().times(1).returning(|c, _| {
            Err(StoreError::NoMatch {
                conversation_id: c.to_string(),
                element: "message",
            })
        });
        store
            .expect_reset_unread()
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = create_usecase(&relay, Arc::new(store));

        // when (操作):
        let result = usecase
            .on_message_seen(
                &relay.room("conv1"),
                &MessageId::new("ghost".to_string()).unwrap(),
                &relay.identity("bob@example.com"),
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            MessageSeenSync {
                message_marked: false,
                unread_reset: true
            }
        );
    }

    #[tokio::test]
    async fn test_message_seen_marks_message_and_resets_unread() {
        // テスト項目: messageSeen でメッセージが既読になり未読数が 0 になる
        // given (前提条件):
        let relay = TestRelay::new();
        let store = seeded_store(&relay);
        let usecase = create_usecase(&relay, store.clone());
        let conversation_id = relay.room("conv1");
        let bob = relay.identity("bob@example.com");
        usecase.on_new_message(&conversation_id, &bob).await;

        // when (操作):
        let result = usecase
            .on_message_seen(
                &conversation_id,
                &MessageId::new("m1".to_string()).unwrap(),
                &bob,
            )
            .await;

        // then (期待する結果):
        assert!(result.message_marked && result.unread_reset);
        let record = store
            .find_conversation(&conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert!(record.messages[0].is_seen);
        assert_eq!(record.unread_count_for(&bob), 0);
    }

    #[tokio::test]
    async fn test_conversation_seen_for_non_participant_fails_quietly() {
        // テスト項目: 参加者でない閲覧者の reset は NoMatch になり false を返す
        // given (前提条件):
        let relay = TestRelay::new();
        let store = seeded_store(&relay);
        let usecase = create_usecase(&relay, store);

        // when (操作):
        let reset = usecase
            .on_conversation_seen(&relay.room("conv1"), &relay.identity("eve@example.com"))
            .await;

        // then (期待する結果):
        assert!(!reset);
    }
}
