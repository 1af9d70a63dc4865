//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - `PresenceRepository` / `RoomRepository`: プロセス内のインメモリ状態
//! - `ConversationStore`: 外部の永続ストア（条件付き更新のみを使う）

use async_trait::async_trait;

use super::{ConnectionId, ConversationId, ConversationRecord, Identity, MessageId, StoreError};

/// Presence Directory へのインターフェース
///
/// 各操作はアトミックに実行される。呼び出し側で read-modify-write をしてはいけない。
#[async_trait]
pub trait PresenceRepository: Send + Sync {
    /// Identity をオンラインにする。上書きされた以前の接続を返す
    async fn set_online(&self, identity: Identity, connection_id: ConnectionId)
    -> Option<ConnectionId>;

    /// 接続が所有する Identity を削除し、削除した Identity を返す
    async fn clear_if_owner(&self, connection_id: &ConnectionId) -> Vec<Identity>;

    async fn lookup(&self, identity: &Identity) -> Option<ConnectionId>;

    /// オンラインの Identity 一覧（昇順）
    async fn online_identities(&self) -> Vec<Identity>;
}

/// Room Registry へのインターフェース
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn join(&self, connection_id: ConnectionId, room_id: ConversationId) -> bool;

    async fn leave(&self, connection_id: &ConnectionId, room_id: &ConversationId) -> bool;

    async fn members(&self, room_id: &ConversationId) -> Vec<ConnectionId>;

    async fn members_except(
        &self,
        room_id: &ConversationId,
        exclude: &ConnectionId,
    ) -> Vec<ConnectionId>;

    /// 接続を全ルームから外し、外したルームを返す
    async fn remove_connection(&self, connection_id: &ConnectionId) -> Vec<ConversationId>;

    async fn member_count(&self, room_id: &ConversationId) -> usize;
}

/// 外部の永続ストア（会話ドキュメント）へのインターフェース
///
/// 更新系は全て単一ドキュメントに対するサーバー側のアトミックな条件付き更新。
/// 述語に一致する要素がない場合は `StoreError::NoMatch` を返す。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// participants[identity == identity].unreadCount を 1 増やす
    async fn increment_unread(
        &self,
        conversation_id: &ConversationId,
        identity: &Identity,
    ) -> Result<(), StoreError>;

    /// participants[identity == identity].unreadCount を 0 にする
    async fn reset_unread(
        &self,
        conversation_id: &ConversationId,
        identity: &Identity,
    ) -> Result<(), StoreError>;

    /// messages[id == message_id].isSeen を true にする
    async fn mark_message_seen(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<(), StoreError>;

    /// 会話ドキュメントを取得する（存在しなければ `Ok(None)`）
    async fn find_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<ConversationRecord>, StoreError>;
}
