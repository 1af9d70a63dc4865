//! UseCase: 外部からの publish
//!
//! `{conversationId, action, data}` を検証し、ルームへ中継する。
//! `action` が未知、またはトップレベルのフィールドが欠けている場合は拒否する。
//! `data` の中身が不完全でも配信は必ず行い、永続化の副作用だけを省いて警告を返す。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 入力検証（MISSING_FIELD / UNKNOWN_ACTION / INVALID_FIELD）
//! - 拒否された場合に配信もストア呼び出しも行われないこと
//! - 部分的な成功（警告つき）
//!
//! ### どのような状況を想定しているか
//! - A と B がオンラインで A だけがルームに参加している状態の newMessage
//! - 未知のアクション "foo"

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use crate::domain::{ConversationId, Identity, PublishAction, PublishedEvent, RelayEvent};

use super::{RelayEventUseCase, error::PublishError};

/// publish の入力（HTTP ボディをそのまま渡す）
///
/// 型の誤りも検証エラーとして扱うため、各フィールドは生の JSON 値で受け取る。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishInput {
    pub conversation_id: Option<Value>,
    pub action: Option<Value>,
    pub data: Option<Value>,
}

#[derive(Debug)]
pub struct PublishOutcome {
    pub delivered: usize,
    /// 永続化を省いた場合の警告
    pub warning: Option<String>,
    pub reconciliation: Option<JoinHandle<()>>,
}

pub struct PublishEventUseCase {
    relay: Arc<RelayEventUseCase>,
}

impl PublishEventUseCase {
    pub fn new(relay: Arc<RelayEventUseCase>) -> Self {
        Self { relay }
    }

    pub async fn execute(&self, input: PublishInput) -> Result<PublishOutcome, PublishError> {
        let (event, warning) = validate(input)?;

        tracing::info!(
            "Publishing '{}' to room '{}'",
            event.action.as_str(),
            event.conversation_id
        );
        if let Some(warning) = &warning {
            tracing::warn!("{}", warning);
        }

        let outcome = self.relay.execute(None, RelayEvent::Published(event)).await;
        Ok(PublishOutcome {
            delivered: outcome.delivered,
            warning,
            reconciliation: outcome.reconciliation,
        })
    }
}

fn validate(input: PublishInput) -> Result<(PublishedEvent, Option<String>), PublishError> {
    let conversation_id = required(input.conversation_id, "conversationId")?;
    let action = required(input.action, "action")?;
    let data = required(input.data, "data")?;

    let Value::String(conversation_id) = conversation_id else {
        return Err(PublishError::InvalidField {
            field: "conversationId",
            reason: "must be a string".to_string(),
        });
    };
    let conversation_id =
        ConversationId::new(conversation_id).map_err(|e| PublishError::InvalidField {
            field: "conversationId",
            reason: e.to_string(),
        })?;
    // 文字列でない action は既知のアクションになり得ない
    let action = match action {
        Value::String(action) => {
            PublishAction::parse(&action).ok_or(PublishError::UnknownAction(action))?
        }
        other => return Err(PublishError::UnknownAction(other.to_string())),
    };
    let Value::Object(fields) = &data else {
        return Err(PublishError::InvalidField {
            field: "data",
            reason: "must be a JSON object".to_string(),
        });
    };

    let sender = identity_field(fields, &["sender", "senderIdentity"]);
    let receiver = identity_field(fields, &["receiver", "receiverIdentity"]);

    let warning = match (action, &sender, &receiver) {
        (PublishAction::NewMessage, _, None) => {
            Some("newMessage without receiver: broadcast only, unread count not updated".to_string())
        }
        (PublishAction::NewMessage, None, Some(_)) => {
            Some("newMessage without sender: broadcast and unread count updated".to_string())
        }
        _ => None,
    };

    Ok((
        PublishedEvent {
            action,
            conversation_id,
            sender,
            receiver,
            payload: data,
        },
        warning,
    ))
}

/// 欠落と `null` はどちらも MISSING_FIELD
fn required(value: Option<Value>, field: &'static str) -> Result<Value, PublishError> {
    match value {
        None | Some(Value::Null) => Err(PublishError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

/// `data` から Identity を取り出す（欠けている・不正な値は `None`）
fn identity_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<Identity> {
    keys.iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .and_then(|value| Identity::new(value.to_string()).ok())
}
