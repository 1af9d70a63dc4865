//! UseCase 層
//!
//! 1 操作につき 1 つの構造体。依存は全て trait object（`Arc<dyn ...>`）で受け取る。

pub mod broadcast;
pub mod connect_session;
pub mod disconnect_session;
pub mod error;
pub mod get_presence;
pub mod handle_client_event;
pub mod identify_user;
pub mod publish_event;
pub mod relay_event;
pub mod room_membership;
pub mod sync_unread;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcast::BroadcastDispatcher;
pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::{DisconnectOutcome, DisconnectSessionUseCase};
pub use error::PublishError;
pub use get_presence::{GetPresenceUseCase, GetRoomSummaryUseCase, RoomSummary};
pub use handle_client_event::HandleClientEventUseCase;
pub use identify_user::IdentifyUserUseCase;
pub use publish_event::{PublishEventUseCase, PublishInput, PublishOutcome};
pub use relay_event::{RelayEventUseCase, RelayOutcome};
pub use room_membership::RoomMembershipUseCase;
pub use sync_unread::{MessageSeenSync, NewMessageSync, UnreadSyncUseCase};
