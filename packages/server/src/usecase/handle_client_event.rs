//! UseCase: WebSocket 接続から届いたコマンドの振り分け
//!
//! インメモリの状態変更と配信はここで完了させる。これを接続の受信ループで await することで、
//! 1 接続内のイベント順序が保たれる。ストア同期だけはバックグラウンドに逃がす。

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::{ConnectionCommand, ConnectionId};

use super::{IdentifyUserUseCase, RelayEventUseCase, RoomMembershipUseCase};

pub struct HandleClientEventUseCase {
    identify: Arc<IdentifyUserUseCase>,
    membership: Arc<RoomMembershipUseCase>,
    relay: Arc<RelayEventUseCase>,
}

impl HandleClientEventUseCase {
    pub fn new(
        identify: Arc<IdentifyUserUseCase>,
        membership: Arc<RoomMembershipUseCase>,
        relay: Arc<RelayEventUseCase>,
    ) -> Self {
        Self {
            identify,
            membership,
            relay,
        }
    }

    /// コマンドを処理する
    ///
    /// # Returns
    ///
    /// ストア同期を起動した場合はそのタスク
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        command: ConnectionCommand,
    ) -> Option<JoinHandle<()>> {
        match command {
            ConnectionCommand::Identify(identity) => {
                self.identify.execute(connection_id, identity).await;
                None
            }
            ConnectionCommand::JoinRoom(room_id) => {
                self.membership.join(connection_id, room_id).await;
                None
            }
            ConnectionCommand::LeaveRoom(room_id) => {
                self.membership.leave(&connection_id, &room_id).await;
                None
            }
            ConnectionCommand::Relay(event) => {
                self.relay
                    .execute(Some(connection_id), event)
                    .await
                    .reconciliation
            }
        }
    }
}
