//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{
    ConnectSessionUseCase, DisconnectSessionUseCase, GetPresenceUseCase, GetRoomSummaryUseCase,
    HandleClientEventUseCase, PublishEventUseCase,
};

use super::{
    handler::{get_presence, get_room_summary, health_check, publish, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Presence-and-broadcast relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_session_usecase,
///     disconnect_session_usecase,
///     handle_client_event_usecase,
///     publish_event_usecase,
///     get_presence_usecase,
///     get_room_summary_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    connect_session_usecase: Arc<ConnectSessionUseCase>,
    disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    handle_client_event_usecase: Arc<HandleClientEventUseCase>,
    publish_event_usecase: Arc<PublishEventUseCase>,
    get_presence_usecase: Arc<GetPresenceUseCase>,
    get_room_summary_usecase: Arc<GetRoomSummaryUseCase>,
}

impl Server {
    pub fn new(
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
        handle_client_event_usecase: Arc<HandleClientEventUseCase>,
        publish_event_usecase: Arc<PublishEventUseCase>,
        get_presence_usecase: Arc<GetPresenceUseCase>,
        get_room_summary_usecase: Arc<GetRoomSummaryUseCase>,
    ) -> Self {
        Self {
            connect_session_usecase,
            disconnect_session_usecase,
            handle_client_event_usecase,
            publish_event_usecase,
            get_presence_usecase,
            get_room_summary_usecase,
        }
    }

    /// Build the router with every endpoint
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_session_usecase: self.connect_session_usecase,
            disconnect_session_usecase: self.disconnect_session_usecase,
            handle_client_event_usecase: self.handle_client_event_usecase,
            publish_event_usecase: self.publish_event_usecase,
            get_presence_usecase: self.get_presence_usecase,
            get_room_summary_usecase: self.get_room_summary_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/publish", post(publish))
            .route("/api/presence", get(get_presence))
            .route("/api/rooms/{room_id}", get(get_room_summary))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let local_addr = listener.local_addr()?;
        let app = self.router();

        tracing::info!("Relay server listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}/ws", local_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Run the relay server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        self.serve(listener).await
    }
}
