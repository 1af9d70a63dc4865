//! Dependency wiring shared by the binary and the integration tests.

use std::sync::Arc;

use dengon_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    config::RelayConfig,
    domain::{ConversationStore, PresenceDirectory, RoomRegistry},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryPresenceRepository, InMemoryRoomRepository},
    },
    ui::Server,
    usecase::{
        BroadcastDispatcher, ConnectSessionUseCase, DisconnectSessionUseCase, GetPresenceUseCase,
        GetRoomSummaryUseCase, HandleClientEventUseCase, IdentifyUserUseCase, PublishEventUseCase,
        RelayEventUseCase, RoomMembershipUseCase, UnreadSyncUseCase,
    },
};

/// Build a server with fresh in-memory presence and room state.
pub fn build_server(
    config: &RelayConfig,
    store: Arc<dyn ConversationStore>,
    clock: Arc<dyn Clock>,
) -> Server {
    // 1. Repository (in-memory state owned by this process)
    let presence = Arc::new(InMemoryPresenceRepository::new(Arc::new(Mutex::new(
        PresenceDirectory::new(),
    ))));
    let rooms = Arc::new(InMemoryRoomRepository::new(Arc::new(Mutex::new(
        RoomRegistry::new(),
    ))));

    // 2. MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::default());

    // 3. UseCases
    let dispatcher = Arc::new(BroadcastDispatcher::new(
        presence.clone(),
        rooms.clone(),
        message_pusher.clone(),
    ));
    let sync = Arc::new(UnreadSyncUseCase::new(
        store,
        presence.clone(),
        dispatcher.clone(),
        config.store_timeout,
    ));
    let relay = Arc::new(RelayEventUseCase::new(dispatcher.clone(), sync));

    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        presence.clone(),
        message_pusher.clone(),
        clock,
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
        presence.clone(),
        rooms.clone(),
        message_pusher,
        dispatcher.clone(),
    ));
    let handle_client_event_usecase = Arc::new(HandleClientEventUseCase::new(
        Arc::new(IdentifyUserUseCase::new(presence.clone(), dispatcher)),
        Arc::new(RoomMembershipUseCase::new(rooms.clone())),
        relay.clone(),
    ));
    let publish_event_usecase = Arc::new(PublishEventUseCase::new(relay));
    let get_presence_usecase = Arc::new(GetPresenceUseCase::new(presence));
    let get_room_summary_usecase = Arc::new(GetRoomSummaryUseCase::new(rooms));

    // 4. Server
    Server::new(
        connect_session_usecase,
        disconnect_session_usecase,
        handle_client_event_usecase,
        publish_event_usecase,
        get_presence_usecase,
        get_room_summary_usecase,
    )
}
