//! UseCase: コンテンツイベントの中継
//!
//! 正規化済みの `RelayEvent` をルームへ配信し、必要なら永続化の同期をバックグラウンドで起動する。
//! 配信は常に同期処理の前に行われ、同期の結果を待たない。

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::{
    ConnectionId, ConversationId, OutboundEvent, PublishAction, PublishedEvent, RelayEvent,
};

use super::{BroadcastDispatcher, UnreadSyncUseCase};

/// 中継の結果
#[derive(Debug)]
pub struct RelayOutcome {
    /// 配信を試行した接続の数
    pub delivered: usize,
    /// 起動したストア同期タスク（起動しなかった場合は `None`）
    pub reconciliation: Option<JoinHandle<()>>,
}

pub struct RelayEventUseCase {
    dispatcher: Arc<BroadcastDispatcher>,
    sync: Arc<UnreadSyncUseCase>,
}

impl RelayEventUseCase {
    pub fn new(dispatcher: Arc<BroadcastDispatcher>, sync: Arc<UnreadSyncUseCase>) -> Self {
        Self { dispatcher, sync }
    }

    /// イベントを中継する
    ///
    /// # Arguments
    ///
    /// * `origin` - イベントを送った接続（HTTP publish の場合は `None`）
    /// * `event` - 正規化済みのイベント
    pub async fn execute(&self, origin: Option<ConnectionId>, event: RelayEvent) -> RelayOutcome {
        let name = event.name();
        let room = event.conversation_id().clone();
        let outcome = match event {
            RelayEvent::Published(published) => self.relay_published(published).await,
            RelayEvent::Typing {
                conversation_id,
                sender,
            } => {
                let event = OutboundEvent::Typing {
                    conversation_id: conversation_id.clone(),
                    sender,
                };
                RelayOutcome {
                    delivered: self.to_room_from(origin, &conversation_id, &event).await,
                    reconciliation: None,
                }
            }
            RelayEvent::StopTyping {
                conversation_id,
                sender,
            } => {
                let event = OutboundEvent::StopTyping {
                    conversation_id: conversation_id.clone(),
                    sender,
                };
                RelayOutcome {
                    delivered: self.to_room_from(origin, &conversation_id, &event).await,
                    reconciliation: None,
                }
            }
            RelayEvent::MessageSeen {
                conversation_id,
                message_id,
                viewer,
            } => {
                let event = OutboundEvent::MessageSeenUpdate {
                    conversation_id: conversation_id.clone(),
                    message_id: message_id.clone(),
                    viewer: viewer.clone(),
                };
                let delivered = self.dispatcher.to_room(&conversation_id, &event).await;

                let sync = self.sync.clone();
                let reconciliation = tokio::spawn(async move {
                    sync.on_message_seen(&conversation_id, &message_id, &viewer)
                        .await;
                });
                RelayOutcome {
                    delivered,
                    reconciliation: Some(reconciliation),
                }
            }
            RelayEvent::ConversationSeen {
                conversation_id,
                viewer,
            } => {
                let event = OutboundEvent::ConversationSeen {
                    conversation_id: conversation_id.clone(),
                    viewer: viewer.clone(),
                };
                let delivered = self.to_room_from(origin, &conversation_id, &event).await;

                let sync = self.sync.clone();
                let reconciliation = tokio::spawn(async move {
                    sync.on_conversation_seen(&conversation_id, &viewer).await;
                });
                RelayOutcome {
                    delivered,
                    reconciliation: Some(reconciliation),
                }
            }
        };

        tracing::debug!(
            "Relayed '{}' in '{}' to {} connections (reconciliation: {})",
            name,
            room,
            outcome.delivered,
            outcome.reconciliation.is_some()
        );
        outcome
    }

    async fn relay_published(&self, published: PublishedEvent) -> RelayOutcome {
        let PublishedEvent {
            action,
            conversation_id,
            receiver,
            payload,
            ..
        } = published;

        let event = OutboundEvent::Relayed {
            action,
            conversation_id: conversation_id.clone(),
            payload,
        };
        let delivered = self.dispatcher.to_room(&conversation_id, &event).await;

        // 未読数の同期は newMessage のみ
        let reconciliation = match (action, receiver) {
            (PublishAction::NewMessage, Some(receiver)) => {
                let sync = self.sync.clone();
                Some(tokio::spawn(async move {
                    sync.on_new_message(&conversation_id, &receiver).await;
                }))
            }
            _ => None,
        };

        RelayOutcome {
            delivered,
            reconciliation,
        }
    }

    /// 送信元の接続があればそれを除いてルームに配信する
    async fn to_room_from(
        &self,
        origin: Option<ConnectionId>,
        conversation_id: &ConversationId,
        event: &OutboundEvent,
    ) -> usize {
        match origin {
            Some(origin) => {
                self.dispatcher
                    .to_room_except_sender(conversation_id, &origin, event)
                    .await
            }
            None => self.dispatcher.to_room(conversation_id, event).await,
        }
    }
}
