//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::ConversationId,
    infrastructure::dto::http::{
        PresenceResponse, PublishErrorResponse, PublishRequest, PublishResponse, RoomSummaryDto,
    },
    ui::state::AppState,
    usecase::{PublishError, PublishInput},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Externally-triggered publish
///
/// Rejections are reported with 400 and a stable `code`. A recognized action
/// with incomplete `data` is still broadcast and answered with a warning.
/// A body that is not a JSON object is rejected the same way.
pub async fn publish(
    State(state): State<Arc<AppState>>,
    request: Result<Json<PublishRequest>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return reject(PublishError::InvalidField {
                field: "body",
                reason: rejection.body_text(),
            });
        }
    };

    let input = PublishInput {
        conversation_id: request.conversation_id,
        action: request.action,
        data: request.data,
    };

    match state.publish_event_usecase.execute(input).await {
        Ok(outcome) => {
            // `outcome.reconciliation` keeps running detached
            let body = PublishResponse {
                success: true,
                warning: outcome.warning,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => reject(e),
    }
}

fn reject(e: PublishError) -> Response {
    tracing::warn!("Rejected publish: {}", e);
    let body = PublishErrorResponse {
        success: false,
        code: e.code().to_string(),
        error: e.to_string(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Currently online identities
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<PresenceResponse> {
    let online = state
        .get_presence_usecase
        .execute()
        .await
        .into_iter()
        .map(|identity| identity.into_string())
        .collect();
    Json(PresenceResponse { online })
}

/// Get room summary by ID
pub async fn get_room_summary(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSummaryDto>, StatusCode> {
    let room_id = ConversationId::new(room_id).map_err(|e| {
        tracing::debug!("Invalid room id: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    let summary = state.get_room_summary_usecase.execute(room_id).await;
    Ok(Json(RoomSummaryDto {
        id: summary.id.into_string(),
        member_count: summary.member_count,
    }))
}
