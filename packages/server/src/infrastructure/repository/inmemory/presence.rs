//! InMemory Presence Repository 実装
//!
//! ドメイン層が定義する PresenceRepository trait の具体的な実装。
//! `PresenceDirectory` を Mutex で保護し、各操作をロック内で完結させる。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Identity, PresenceDirectory, PresenceRepository};

/// インメモリ Presence Repository 実装
pub struct InMemoryPresenceRepository {
    directory: Arc<Mutex<PresenceDirectory>>,
}

impl InMemoryPresenceRepository {
    pub fn new(directory: Arc<Mutex<PresenceDirectory>>) -> Self {
        Self { directory }
    }
}

impl Default for InMemoryPresenceRepository {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(PresenceDirectory::new())))
    }
}

#[async_trait]
impl PresenceRepository for InMemoryPresenceRepository {
    async fn set_online(
        &self,
        identity: Identity,
        connection_id: ConnectionId,
    ) -> Option<ConnectionId> {
        let mut directory = self.directory.lock().await;
        directory.set_online(identity, connection_id)
    }

    async fn clear_if_owner(&self, connection_id: &ConnectionId) -> Vec<Identity> {
        let mut directory = self.directory.lock().await;
        directory.clear_if_owner(connection_id)
    }

    async fn lookup(&self, identity: &Identity) -> Option<ConnectionId> {
        let directory = self.directory.lock().await;
        directory.lookup(identity)
    }

    async fn online_identities(&self) -> Vec<Identity> {
        let directory = self.directory.lock().await;
        directory.online_identities()
    }
}
