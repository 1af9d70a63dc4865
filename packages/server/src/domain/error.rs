//! ドメイン層のエラー型

use std::time::Duration;

use thiserror::Error;

/// 値オブジェクト生成時のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// 空文字列（または空白のみ）
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// 最大長を超過
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// ConnectionId が UUID として解釈できない
    #[error("invalid connection id: {0}")]
    InvalidConnectionId(String),
}

/// 永続ストア（ConversationStore）操作のエラー
///
/// いずれも呼び出し元には返さず、ログに記録して処理を続行する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 指定した会話ドキュメントが存在しない
    #[error("conversation '{0}' not found")]
    ConversationNotFound(String),

    /// 条件付き更新の述語に一致する要素がない
    #[error("no {element} matched in conversation '{conversation_id}'")]
    NoMatch {
        conversation_id: String,
        element: &'static str,
    },

    /// ストアに到達できない
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// ストア呼び出しがタイムアウトした
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

/// メッセージ送信（MessagePusher）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 送信先の接続が登録されていない
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    /// 送信チャンネルが閉じている
    #[error("failed to push message: {0}")]
    PushFailed(String),

    /// イベントを JSON にエンコードできない
    #[error("failed to encode event: {0}")]
    Encode(String),
}
