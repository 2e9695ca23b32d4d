//! Conversation message types.

use crate::attachment::FileHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

impl MessageRole {
    /// Wire name used by chat-completion style APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Speaker label used when history is flattened into a prompt.
    pub fn speaker(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation.
///
/// Messages are append-only. `is_expanded` is the only field that changes
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque unique identifier (UUID format)
    pub id: String,
    /// Store-wide creation order; later messages always have larger values
    pub sequence: u64,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    /// Owning conversation
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<FileHandle>,
    /// Full answer behind an assistant synopsis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_content: Option<String>,
    #[serde(default)]
    pub is_expanded: bool,
}

impl Message {
    /// True when there is more to show than `content`.
    pub fn has_expanded_content(&self) -> bool {
        self.expanded_content
            .as_deref()
            .is_some_and(|expanded| expanded != self.content)
    }

    /// The text a reader currently sees for this message.
    pub fn display_text(&self) -> &str {
        match self.expanded_content.as_deref() {
            Some(expanded) if self.is_expanded => expanded,
            _ => &self.content,
        }
    }
}

/// A `{role, content}` pair handed to the AI as prior context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}
