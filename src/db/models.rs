use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Web,
    Phone,
    Voice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Escalated,
    Closed,
}

/// Text-column enums stored by their lowercase name.
macro_rules! text_enum {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                Self::parse(text).ok_or_else(|| {
                    FromSqlError::Other(format!("unknown {} {text:?}", stringify!($ty)).into())
                })
            }
        }
    };
}

text_enum!(Channel {
    Web => "web",
    Phone => "phone",
    Voice => "voice",
});

text_enum!(ConversationStatus {
    Active => "active",
    Escalated => "escalated",
    Closed => "closed",
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: Option<String>,
    pub channel: Channel,
    pub language: String,
    pub status: ConversationStatus,
    pub sentiment_avg: f64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub message_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: String,
    pub role: String,
    pub content: String,
    pub sentiment_score: Option<f64>,
    pub emotion: Option<String>,
    pub is_urgent: bool,
    pub created_at: DateTime<Utc>,
}

/// A message about to be stored.
#[derive(Debug, Clone, Copy)]
pub struct NewMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
    pub sentiment_score: Option<f64>,
    pub emotion: Option<&'a str>,
    pub is_urgent: bool,
}

impl<'a> NewMessage<'a> {
    pub fn plain(role: &'a str, content: &'a str) -> Self {
        Self {
            role,
            content,
            sentiment_score: None,
            emotion: None,
            is_urgent: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enums_parse_their_own_names() {
        for status in [
            ConversationStatus::Active,
            ConversationStatus::Escalated,
            ConversationStatus::Closed,
        ] {
            assert_eq!(ConversationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(Channel::parse("phone"), Some(Channel::Phone));
        assert_eq!(Channel::parse("whatsapp"), None);
    }

    #[test]
    fn summary_flattens_conversation() {
        let summary = ConversationSummary {
            conversation: Conversation {
                id: "c1".into(),
                user_id: None,
                channel: Channel::Web,
                language: "en".into(),
                status: ConversationStatus::Active,
                sentiment_avg: 0.25,
                started_at: DateTime::from_timestamp(0, 0).unwrap(),
                ended_at: None,
            },
            message_count: 4,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["id"], "c1");
        assert_eq!(value["channel"], "web");
        assert_eq!(value["message_count"], 4);
        assert_eq!(value["started_at"], "1970-01-01T00:00:00Z");
    }
}
