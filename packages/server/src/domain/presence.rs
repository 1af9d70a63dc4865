//! Presence Directory
//!
//! Identity → ConnectionId の対応表。`identify` で上書きされ、接続の切断で消える。
//!
//! 切断時の削除を決定的にするため、ConnectionId → Identity 集合の逆引きも保持する。
//! 1 つの接続が複数の Identity を名乗った場合、切断時にはそれら全てが削除される。

use std::collections::{BTreeSet, HashMap};

use super::{ConnectionId, Identity};

#[derive(Debug, Default, Clone)]
pub struct PresenceDirectory {
    routes: HashMap<Identity, ConnectionId>,
    owners: HashMap<ConnectionId, BTreeSet<Identity>>,
}

impl PresenceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// `identity` を `connection_id` にマッピングする（last-writer-wins）
    ///
    /// 以前のマッピングが別の接続を指していた場合、その接続の逆引きからは外す。
    /// 古い接続はルームには残り続けるが、個別配信の宛先ではなくなる。
    ///
    /// # Returns
    ///
    /// 上書きされた以前の接続（同じ接続への再設定なら `None`）
    pub fn set_online(
        &mut self,
        identity: Identity,
        connection_id: ConnectionId,
    ) -> Option<ConnectionId> {
        let previous = self.routes.insert(identity.clone(), connection_id);

        let displaced = match previous {
            Some(prev) if prev != connection_id => {
                if let Some(identities) = self.owners.get_mut(&prev) {
                    identities.remove(&identity);
                    if identities.is_empty() {
                        self.owners.remove(&prev);
                    }
                }
                Some(prev)
            }
            _ => None,
        };

        self.owners.entry(connection_id).or_default().insert(identity);
        displaced
    }

    /// `connection_id` が現在所有している Identity を全て削除する
    ///
    /// # Returns
    ///
    /// 削除された Identity（昇順）。空なら何も変化していない。
    pub fn clear_if_owner(&mut self, connection_id: &ConnectionId) -> Vec<Identity> {
        let Some(identities) = self.owners.remove(connection_id) else {
            return Vec::new();
        };

        for identity in &identities {
            self.routes.remove(identity);
        }
        identities.into_iter().collect()
    }

    pub fn lookup(&self, identity: &Identity) -> Option<ConnectionId> {
        self.routes.get(identity).copied()
    }

    /// オンラインの Identity 一覧（昇順）
    pub fn online_identities(&self) -> Vec<Identity> {
        let mut identities: Vec<Identity> = self.routes.keys().cloned().collect();
        identities.sort();
        identities
    }
}
