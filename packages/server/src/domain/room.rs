//! Room Registry
//!
//! 会話 ID ごとの接続メンバー集合。ルームは最初の join で暗黙的に作られ、
//! 最後のメンバーが抜けた時点でレジストリから取り除かれる。
//!
//! 接続ごとの所属ルームも保持しており、切断時には全ルームから一括で外せる。
//! Presence Directory とは独立している（identify せずにルームへ参加する接続もある）。

use std::collections::{HashMap, HashSet};

use super::{ConnectionId, ConversationId};

#[derive(Debug, Default, Clone)]
pub struct RoomRegistry {
    rooms: HashMap<ConversationId, HashSet<ConnectionId>>,
    memberships: HashMap<ConnectionId, HashSet<ConversationId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// ルームに参加する（冪等）
    ///
    /// # Returns
    ///
    /// 新規に参加した場合は `true`、既にメンバーだった場合は `false`
    pub fn join(&mut self, connection_id: ConnectionId, room_id: ConversationId) -> bool {
        let inserted = self
            .rooms
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id);
        if inserted {
            self.memberships
                .entry(connection_id)
                .or_default()
                .insert(room_id);
        }
        inserted
    }

    /// ルームから退出する（冪等、非メンバーなら何もしない）
    pub fn leave(&mut self, connection_id: &ConnectionId, room_id: &ConversationId) -> bool {
        let removed = match self.rooms.get_mut(room_id) {
            Some(members) => {
                let removed = members.remove(connection_id);
                if members.is_empty() {
                    self.rooms.remove(room_id);
                }
                removed
            }
            None => false,
        };

        if removed && let Some(rooms) = self.memberships.get_mut(connection_id) {
            rooms.remove(room_id);
            if rooms.is_empty() {
                self.memberships.remove(connection_id);
            }
        }
        removed
    }

    /// 接続を所属している全てのルームから外す
    ///
    /// # Returns
    ///
    /// 外されたルームの ID 一覧
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> Vec<ConversationId> {
        let Some(rooms) = self.memberships.remove(connection_id) else {
            return Vec::new();
        };

        for room_id in &rooms {
            if let Some(members) = self.rooms.get_mut(room_id) {
                members.remove(connection_id);
                if members.is_empty() {
                    self.rooms.remove(room_id);
                }
            }
        }
        rooms.into_iter().collect()
    }

    pub fn members(&self, room_id: &ConversationId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// `exclude` を除いたメンバー一覧（送信者以外へのブロードキャスト用）
    pub fn members_except(
        &self,
        room_id: &ConversationId,
        exclude: &ConnectionId,
    ) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| {
                members
                    .iter()
                    .filter(|id| *id != exclude)
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn member_count(&self, room_id: &ConversationId) -> usize {
        self.rooms.get(room_id).map_or(0, HashSet::len)
    }
}
