//! HTTP API DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /api/publish` request body.
///
/// Top-level fields are kept as raw JSON so that a missing or mistyped field is
/// reported by the publish use case with its own error code instead of a
/// generic JSON extractor rejection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub conversation_id: Option<Value>,
    pub action: Option<Value>,
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishErrorResponse {
    pub success: bool,
    pub code: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceResponse {
    pub online: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub member_count: usize,
}
