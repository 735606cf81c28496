use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::{ActivityRecord, ActivityStatus};

const PRIVATE_SUPERGROUP_PREFIX: &str = "-100";

/// Chat identifier as delivered by the transport, either numeric or already stringified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatRef {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRef::Numeric(id) => write!(f, "{id}"),
            ChatRef::Text(id) => write!(f, "{}", id.trim()),
        }
    }
}

/// Inbound message from the group chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub has_media: bool,
    pub event_timestamp: DateTime<Utc>,
    pub chat_id: ChatRef,
    pub message_id: i64,
}

impl ChatEvent {
    /// Message text, falling back to the media caption.
    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }

    pub fn proof_link(&self) -> String {
        proof_link(&self.chat_id.to_string(), self.message_id)
    }
}

/// Deep link to a message, dropping the `-100` private-supergroup marker when present.
pub fn proof_link(chat_id: &str, message_id: i64) -> String {
    let chat_id = chat_id
        .strip_prefix(PRIVATE_SUPERGROUP_PREFIX)
        .unwrap_or(chat_id);
    format!("https://t.me/c/{chat_id}/{message_id}")
}

/// Controls which outcomes are answered in the chat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgmentPolicy {
    pub announce_rejections: bool,
}

impl AcknowledgmentPolicy {
    pub fn render(&self, record: &ActivityRecord) -> Option<String> {
        match record.status {
            ActivityStatus::Valid => Some(format!(
                "✅ {} saved! Points added.",
                record.category.label()
            )),
            ActivityStatus::Invalid | ActivityStatus::Excess if self.announce_rejections => {
                Some(format!(
                    "⚠️ {} not counted: {}",
                    record.category.label(),
                    record.reason
                ))
            }
            ActivityStatus::Invalid | ActivityStatus::Excess => None,
        }
    }
}
