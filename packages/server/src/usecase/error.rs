//! UseCase 層のエラー定義

use thiserror::Error;

/// HTTP publish の入力検証エラー
///
/// いずれの場合も配信も永続化も行われない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl PublishError {
    /// レスポンスの `code` に載せる機械可読な識別子
    pub fn code(&self) -> &'static str {
        match self {
            PublishError::MissingField(_) => "MISSING_FIELD",
            PublishError::UnknownAction(_) => "UNKNOWN_ACTION",
            PublishError::InvalidField { .. } => "INVALID_FIELD",
        }
    }
}
