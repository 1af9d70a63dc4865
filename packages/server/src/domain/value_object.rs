//! 値オブジェクト
//!
//! 接続・ユーザー・会話・メッセージを識別する ID 群。
//! 生成時にバリデーションを行い、不正な値はドメイン層に入り込まない。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValueObjectError;

/// Identity の最大長（メールアドレスの上限に合わせる）
pub const IDENTITY_MAX_LEN: usize = 254;

/// Defines a validated, non-blank string identifier.
macro_rules! string_value_object {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                if value.trim().is_empty() {
                    return Err(ValueObjectError::Empty($field));
                }
                if let Some(max) = $max {
                    if value.chars().count() > max {
                        return Err(ValueObjectError::TooLong { field: $field, max });
                    }
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_value_object!(
    /// ユーザーの識別子（メールアドレス形式、ユーザーごとに一意）
    Identity,
    "identity",
    Some(IDENTITY_MAX_LEN)
);

string_value_object!(
    /// 会話 ID。ルーム ID と永続ストアの会話ドキュメント ID を兼ねる
    ConversationId,
    "conversationId",
    None::<usize>
);

string_value_object!(
    /// 会話内のメッセージ ID
    MessageId,
    "messageId",
    None::<usize>
);

/// 1 本のトランスポートセッション（WebSocket 接続）を識別する ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| ValueObjectError::InvalidConnectionId(value.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// ConnectionId の生成器
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// 新しい ConnectionId を UUID v4 で生成
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4())
    }
}
