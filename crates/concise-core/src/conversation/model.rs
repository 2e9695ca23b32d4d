//! Conversation domain model.

use super::message::{HistoryEntry, Message};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A main conversation or a branch.
///
/// A conversation with `parent_message_id` set is a branch. Its
/// `conversation_history` is a frozen copy of the main conversation up to
/// the branch point; it feeds the AI but is never shown as messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier (UUID format)
    pub id: String,
    pub title: String,
    /// Messages in insertion order
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Message of the main conversation this branch was created from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<HistoryEntry>>,
}

impl Conversation {
    pub fn is_branch(&self) -> bool {
        self.parent_message_id.is_some()
    }

    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == message_id)
    }

    pub fn contains_message(&self, message_id: &str) -> bool {
        self.message(message_id).is_some()
    }
}
