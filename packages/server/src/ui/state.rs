//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    ConnectSessionUseCase, DisconnectSessionUseCase, GetPresenceUseCase, GetRoomSummaryUseCase,
    HandleClientEventUseCase, PublishEventUseCase,
};

pub struct AppState {
    /// ConnectSessionUseCase（接続開始のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（接続終了のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// HandleClientEventUseCase（接続からのイベント処理のユースケース）
    pub handle_client_event_usecase: Arc<HandleClientEventUseCase>,
    /// PublishEventUseCase（外部 publish のユースケース）
    pub publish_event_usecase: Arc<PublishEventUseCase>,
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
    pub get_room_summary_usecase: Arc<GetRoomSummaryUseCase>,
}
