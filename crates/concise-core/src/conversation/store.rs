use super::message::{HistoryEntry, Message, MessageRole};
use super::model::Conversation;
use crate::attachment::FileHandle;
use crate::response::AiResponse;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Title of a conversation that has no messages yet.
pub const DEFAULT_TITLE: &str = "New Conversation";

const TITLE_LIMIT: usize = 30;

/// Why a branch request was refused. The store is left untouched in every case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BranchRejection {
    #[error("You cannot branch off a branch.")]
    BranchAlreadyActive,
    #[error("No conversation is selected.")]
    NoCurrentConversation,
    #[error("Message '{0}' is not part of the current conversation.")]
    MessageNotFound(String),
}

/// A main conversation together with the branches created from its messages.
#[derive(Debug, Clone)]
pub struct OutlineEntry {
    pub conversation: Arc<Conversation>,
    pub branches: Vec<Arc<Conversation>>,
}

/// Main/branch structure of the whole store.
#[derive(Debug, Clone, Default)]
pub struct ConversationOutline {
    pub entries: Vec<OutlineEntry>,
    pub main_count: usize,
    pub branch_count: usize,
}

/// In-memory owner of every conversation and message.
///
/// `ConversationStore` is responsible for:
/// - Creating main conversations and branches
/// - Appending messages (append-only, insertion order)
/// - Tracking the current conversation and the single active branch
/// - Cascading deletes from a main conversation to its branches
///
/// Records are held as `Arc<Conversation>` and replaced copy-on-write, so a
/// snapshot handed out by [`ConversationStore::conversation`] never changes
/// underneath its holder.
#[derive(Debug, Default, Clone)]
pub struct ConversationStore {
    conversations: Vec<Arc<Conversation>>,
    current_conversation_id: Option<String>,
    branch_conversation_id: Option<String>,
    next_sequence: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty main conversation, makes it current and clears any
    /// active branch.
    pub fn create_conversation(&mut self) -> String {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            parent_message_id: None,
            conversation_history: None,
        };
        let id = conversation.id.clone();

        self.conversations.push(Arc::new(conversation));
        self.current_conversation_id = Some(id.clone());
        self.branch_conversation_id = None;

        tracing::debug!("[ConversationStore] Created conversation {}", id);
        id
    }

    /// Appends a message to a conversation.
    ///
    /// Returns the new message id, or `None` (and changes nothing) when
    /// `conversation_id` does not exist. The first message of a conversation
    /// also becomes its title.
    pub fn append_message(
        &mut self,
        conversation_id: &str,
        content: impl Into<String>,
        role: MessageRole,
        attachments: Vec<FileHandle>,
    ) -> Option<String> {
        self.push_message(conversation_id, content.into(), role, attachments, None)
    }

    /// Appends an assistant message built from an AI response: the synopsis
    /// becomes the content and the full text the expanded content.
    pub fn append_reply(&mut self, conversation_id: &str, response: &AiResponse) -> Option<String> {
        self.push_message(
            conversation_id,
            response.short.clone(),
            MessageRole::Assistant,
            Vec::new(),
            Some(response.expanded.clone()),
        )
    }

    fn push_message(
        &mut self,
        conversation_id: &str,
        content: String,
        role: MessageRole,
        attachments: Vec<FileHandle>,
        expanded_content: Option<String>,
    ) -> Option<String> {
        let index = self.index_of(conversation_id)?;

        let now = Utc::now();
        let message = Message {
            id: Uuid::new_v4().to_string(),
            sequence: self.next_sequence,
            content,
            role,
            timestamp: now,
            conversation_id: conversation_id.to_string(),
            attachments,
            expanded_content,
            is_expanded: false,
        };
        self.next_sequence += 1;
        let message_id = message.id.clone();

        let conversation = Arc::make_mut(&mut self.conversations[index]);
        if conversation.messages.is_empty() {
            conversation.title = truncate_title(&message.content);
        }
        conversation.messages.push(message);
        conversation.updated_at = now;

        Some(message_id)
    }

    /// Creates a branch off `message_id` of the current main conversation.
    ///
    /// Only one level of branching exists: while a branch is active every
    /// request is rejected. The new branch starts without messages; its
    /// history is the main conversation up to and including the branch point.
    /// The main conversation stays current.
    pub fn branch(&mut self, message_id: &str, content: &str) -> Result<String, BranchRejection> {
        if self.branch_conversation_id.is_some() {
            return Err(BranchRejection::BranchAlreadyActive);
        }

        let parent = self
            .current()
            .ok_or(BranchRejection::NoCurrentConversation)?;
        let branch_point = parent
            .message(message_id)
            .ok_or_else(|| BranchRejection::MessageNotFound(message_id.to_string()))?;

        let history = parent
            .messages
            .iter()
            .filter(|message| message.sequence <= branch_point.sequence)
            .map(HistoryEntry::from)
            .collect();

        let now = Utc::now();
        let branch = Conversation {
            id: Uuid::new_v4().to_string(),
            title: format!("Branch: {}", truncate_title(content)),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            parent_message_id: Some(message_id.to_string()),
            conversation_history: Some(history),
        };
        let branch_id = branch.id.clone();

        tracing::debug!(
            "[ConversationStore] Branched {} off message {} of {}",
            branch_id,
            message_id,
            parent.id
        );

        self.conversations.push(Arc::new(branch));
        self.branch_conversation_id = Some(branch_id.clone());
        Ok(branch_id)
    }

    /// Flips `is_expanded` on a message. Returns `false` when the message or
    /// conversation is unknown.
    pub fn toggle_expansion(&mut self, message_id: &str, conversation_id: &str) -> bool {
        let Some(index) = self.index_of(conversation_id) else {
            return false;
        };
        let Some(position) = self.conversations[index]
            .messages
            .iter()
            .position(|message| message.id == message_id)
        else {
            return false;
        };

        let conversation = Arc::make_mut(&mut self.conversations[index]);
        let message = &mut conversation.messages[position];
        message.is_expanded = !message.is_expanded;
        true
    }

    /// Deletes a conversation.
    ///
    /// Deleting a main conversation also deletes every branch created from
    /// one of its messages. Deleting a branch touches nothing else. A deleted
    /// current conversation falls back to the most recent remaining main
    /// conversation; a deleted active branch is cleared.
    ///
    /// Returns the ids that were removed.
    pub fn delete_conversation(&mut self, conversation_id: &str, is_main: bool) -> Vec<String> {
        let Some(target) = self.conversation(conversation_id) else {
            return Vec::new();
        };

        let mut removed = vec![target.id.clone()];
        if is_main {
            removed.extend(
                self.conversations
                    .iter()
                    .filter(|candidate| {
                        candidate
                            .parent_message_id
                            .as_deref()
                            .is_some_and(|parent| target.contains_message(parent))
                    })
                    .map(|branch| branch.id.clone()),
            );
        }

        self.conversations
            .retain(|conversation| !removed.contains(&conversation.id));

        if self
            .branch_conversation_id
            .as_ref()
            .is_some_and(|id| removed.contains(id))
        {
            self.branch_conversation_id = None;
        }
        if self
            .current_conversation_id
            .as_ref()
            .is_some_and(|id| removed.contains(id))
        {
            self.current_conversation_id = self
                .conversations
                .iter()
                .rev()
                .find(|conversation| !conversation.is_branch())
                .map(|conversation| conversation.id.clone());
        }

        tracing::debug!("[ConversationStore] Deleted conversations {:?}", removed);
        removed
    }

    /// Makes an existing main conversation current.
    pub fn select_conversation(&mut self, conversation_id: &str) -> bool {
        match self.conversation(conversation_id) {
            Some(conversation) if !conversation.is_branch() => {
                self.current_conversation_id = Some(conversation.id.clone());
                true
            }
            _ => false,
        }
    }

    /// Clears the active branch selection. The branch itself is kept.
    pub fn close_branch(&mut self) -> Option<String> {
        self.branch_conversation_id.take()
    }

    pub fn conversation(&self, conversation_id: &str) -> Option<Arc<Conversation>> {
        self.index_of(conversation_id)
            .map(|index| Arc::clone(&self.conversations[index]))
    }

    pub fn current(&self) -> Option<Arc<Conversation>> {
        self.current_conversation_id
            .as_deref()
            .and_then(|id| self.conversation(id))
    }

    pub fn active_branch(&self) -> Option<Arc<Conversation>> {
        self.branch_conversation_id
            .as_deref()
            .and_then(|id| self.conversation(id))
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_conversation_id.as_deref()
    }

    pub fn branch_id(&self) -> Option<&str> {
        self.branch_conversation_id.as_deref()
    }

    /// All conversations in creation order.
    pub fn conversations(&self) -> &[Arc<Conversation>] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// History handed to the AI for a conversation: a branch's frozen
    /// snapshot followed by the conversation's own messages.
    pub fn context_for(&self, conversation_id: &str) -> Vec<HistoryEntry> {
        let Some(conversation) = self.conversation(conversation_id) else {
            return Vec::new();
        };

        conversation
            .conversation_history
            .iter()
            .flatten()
            .cloned()
            .chain(conversation.messages.iter().map(HistoryEntry::from))
            .collect()
    }

    /// Groups every main conversation with the branches created from it.
    pub fn outline(&self) -> ConversationOutline {
        let (branches, mains): (Vec<_>, Vec<_>) = self
            .conversations
            .iter()
            .cloned()
            .partition(|conversation| conversation.is_branch());

        let entries = mains
            .iter()
            .map(|main| OutlineEntry {
                conversation: Arc::clone(main),
                branches: branches
                    .iter()
                    .filter(|branch| {
                        branch
                            .parent_message_id
                            .as_deref()
                            .is_some_and(|parent| main.contains_message(parent))
                    })
                    .cloned()
                    .collect(),
            })
            .collect();

        ConversationOutline {
            entries,
            main_count: mains.len(),
            branch_count: branches.len(),
        }
    }

    fn index_of(&self, conversation_id: &str) -> Option<usize> {
        self.conversations
            .iter()
            .position(|conversation| conversation.id == conversation_id)
    }
}

/// Shortens text to 30 characters, appending `...` when anything was cut.
pub fn truncate_title(content: &str) -> String {
    if content.chars().count() <= TITLE_LIMIT {
        return content.to_string();
    }
    let mut title: String = content.chars().take(TITLE_LIMIT).collect();
    title.push_str("...");
    title
}
