//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `model`: `Conversation` (main conversations and branches)
//! - `message`: `Message`, `MessageRole`, `HistoryEntry`
//! - `store`: `ConversationStore`, the in-memory owner of every record

mod message;
mod model;
mod store;
#[cfg(test)]
mod store_test;

// Re-export public API
pub use message::{HistoryEntry, Message, MessageRole};
pub use model::Conversation;
pub use store::{
    BranchRejection, ConversationOutline, ConversationStore, DEFAULT_TITLE, OutlineEntry,
    truncate_title,
};
