//! UseCase: 接続に Identity を紐付ける

use std::sync::Arc;

use crate::domain::{ConnectionId, Identity, OutboundEvent, PresenceRepository};

use super::BroadcastDispatcher;

pub struct IdentifyUserUseCase {
    presence: Arc<dyn PresenceRepository>,
    dispatcher: Arc<BroadcastDispatcher>,
}

impl IdentifyUserUseCase {
    pub fn new(presence: Arc<dyn PresenceRepository>, dispatcher: Arc<BroadcastDispatcher>) -> Self {
        Self {
            presence,
            dispatcher,
        }
    }

    /// Identity をオンラインにし、全接続へ最新のオンライン一覧を配信する
    ///
    /// 同じ Identity が別の接続で identify 済みの場合は上書きする（後勝ち）。
    ///
    /// # Returns
    ///
    /// 配信したオンライン一覧
    pub async fn execute(&self, connection_id: ConnectionId, identity: Identity) -> Vec<Identity> {
        if let Some(previous) = self
            .presence
            .set_online(identity.clone(), connection_id)
            .await
        {
            tracing::info!(
                "'{}' moved from connection '{}' to '{}'",
                identity,
                previous,
                connection_id
            );
        } else {
            tracing::info!("'{}' is online on '{}'", identity, connection_id);
        }

        let online = self.presence.online_identities().await;
        self.dispatcher
            .to_all(&OutboundEvent::PresenceChanged {
                online: online.clone(),
            })
            .await;
        online
    }
}
