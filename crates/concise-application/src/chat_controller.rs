//! Application Controller.
//!
//! `ChatController` turns user intents into Conversation Store mutations and
//! orchestrator calls. It owns the two lanes of outstanding work (the
//! current main conversation and the active branch), each with its own
//! loading flag.

use crate::notice::Notice;
use concise_core::attachment::FileHandle;
use concise_core::conversation::{
    Conversation, ConversationOutline, ConversationStore, MessageRole,
};
use concise_core::response::AiResponse;
use concise_infrastructure::AttachmentPolicy;
use concise_infrastructure::extraction::{self, BatchExtractor, format_for_ai};
use concise_interaction::{OrchestratorError, ResponseOrchestrator};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Which conversation a send goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// The current main conversation
    Main,
    /// The active branch
    Branch,
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lane::Main => write!(f, "main"),
            Lane::Branch => write!(f, "branch"),
        }
    }
}

/// What happened to one send.
///
/// `user_message_id` is `None` when the send was rejected before anything
/// was appended. `failed` is set when the reply is an error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOutcome {
    pub conversation_id: Option<String>,
    pub user_message_id: Option<String>,
    pub reply_message_id: Option<String>,
    pub notices: Vec<Notice>,
    pub failed: bool,
}

impl SendOutcome {
    fn rejected(notices: Vec<Notice>) -> Self {
        Self {
            notices,
            ..Self::default()
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.user_message_id.is_none()
    }
}

/// Read-only view of the controller state.
#[derive(Debug, Clone)]
pub struct ChatSnapshot {
    pub conversations: Vec<Arc<Conversation>>,
    pub current: Option<Arc<Conversation>>,
    pub branch: Option<Arc<Conversation>>,
    pub main_loading: bool,
    pub branch_loading: bool,
}

/// Clears a lane's loading flag when dropped, on every exit path.
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Coordinates the store, attachment handling and the AI pipeline.
///
/// The store sits behind a `RwLock` that is only held for the duration of
/// a store call; extraction and provider calls run without it.
pub struct ChatController {
    store: Arc<RwLock<ConversationStore>>,
    orchestrator: Arc<ResponseOrchestrator>,
    extractor: BatchExtractor,
    policy: AttachmentPolicy,
    main_loading: AtomicBool,
    branch_loading: AtomicBool,
}

impl ChatController {
    pub fn new(
        store: ConversationStore,
        orchestrator: Arc<ResponseOrchestrator>,
        extractor: BatchExtractor,
        policy: AttachmentPolicy,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            orchestrator,
            extractor,
            policy,
            main_loading: AtomicBool::new(false),
            branch_loading: AtomicBool::new(false),
        }
    }

    fn loading_flag(&self, lane: Lane) -> &AtomicBool {
        match lane {
            Lane::Main => &self.main_loading,
            Lane::Branch => &self.branch_loading,
        }
    }

    pub fn is_loading(&self, lane: Lane) -> bool {
        self.loading_flag(lane).load(Ordering::Acquire)
    }

    /// Sends a user message on `lane` and appends the assistant's reply.
    ///
    /// Attachments that cannot be read or fail validation are dropped with a
    /// notice. The text of the accepted ones is extracted and added to the
    /// prompt, while the stored user message keeps only the typed content.
    pub async fn send_message(
        &self,
        lane: Lane,
        content: &str,
        attachment_paths: &[PathBuf],
    ) -> SendOutcome {
        let content = content.trim();
        if content.is_empty() {
            return SendOutcome::rejected(vec![Notice::warning("Message is empty.")]);
        }

        let Some(_loading) = LoadingGuard::acquire(self.loading_flag(lane)) else {
            tracing::debug!("[ChatController] {} lane is busy", lane);
            return SendOutcome::rejected(vec![Notice::warning(format!(
                "Still waiting for a reply in the {lane} conversation."
            ))]);
        };

        let (attachments, mut notices) = self.accept_attachments(attachment_paths).await;

        // Append the user message and capture the history that precedes it
        let (conversation_id, user_message_id, history) = {
            let mut store = self.store.write().await;
            let conversation_id = match lane {
                Lane::Main => match store.current_id().map(str::to_string) {
                    Some(id) => id,
                    None => store.create_conversation(),
                },
                Lane::Branch => match store.branch_id().map(str::to_string) {
                    Some(id) => id,
                    None => {
                        notices.push(Notice::error("No branch is open."));
                        return SendOutcome::rejected(notices);
                    }
                },
            };
            let history = store.context_for(&conversation_id);
            let Some(user_message_id) = store.append_message(
                &conversation_id,
                content,
                MessageRole::User,
                attachments.clone(),
            ) else {
                notices.push(Notice::error("The conversation no longer exists."));
                return SendOutcome::rejected(notices);
            };
            (conversation_id, user_message_id, history)
        };

        tracing::info!(
            "[ChatController] Sending on {} lane ({} attachment(s))",
            lane,
            attachments.len()
        );

        let attachment_context = self.attachment_context(&attachments).await;
        let (reply, failed) = match self
            .orchestrator
            .get_response_with_attachments(content, attachment_context.as_deref(), &history)
            .await
        {
            Ok(response) => (response, false),
            Err(err) => {
                tracing::error!("[ChatController] No reply on {} lane: {}", lane, err);
                (error_reply(&err), true)
            }
        };

        let reply_message_id = self
            .store
            .write()
            .await
            .append_reply(&conversation_id, &reply);
        if reply_message_id.is_none() {
            notices.push(Notice::warning(
                "The conversation was deleted before the reply arrived.",
            ));
        }

        SendOutcome {
            conversation_id: Some(conversation_id),
            user_message_id: Some(user_message_id),
            reply_message_id,
            notices,
            failed,
        }
    }

    async fn accept_attachments(&self, paths: &[PathBuf]) -> (Vec<FileHandle>, Vec<Notice>) {
        let mut handles = Vec::with_capacity(paths.len());
        let mut notices = Vec::new();
        for path in paths {
            match extraction::inspect(path).await {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    tracing::warn!("[ChatController] Cannot attach {}: {}", path.display(), err);
                    notices.push(Notice::warning(format!(
                        "Could not read {}: {}",
                        path.display(),
                        err
                    )));
                }
            }
        }

        let (accepted, rejections) = self.policy.validate(handles);
        notices.extend(rejections.into_iter().map(Notice::warning));
        (accepted, notices)
    }

    async fn attachment_context(&self, attachments: &[FileHandle]) -> Option<String> {
        if attachments.is_empty() {
            return None;
        }
        let outcomes = self.extractor.extract(attachments).await;
        Some(format_for_ai(&outcomes))
    }

    /// Branches off a message of the current main conversation.
    pub async fn branch_from(&self, message_id: &str) -> Result<String, Notice> {
        let mut store = self.store.write().await;
        let content = store
            .current()
            .and_then(|conversation| {
                conversation
                    .message(message_id)
                    .map(|message| message.content.clone())
            })
            .unwrap_or_default();

        store.branch(message_id, &content).map_err(|rejection| {
            tracing::info!("[ChatController] Branch rejected: {}", rejection);
            Notice::warning(rejection.to_string())
        })
    }

    /// Flips the expanded view of a message in the given lane.
    pub async fn toggle_expansion(&self, lane: Lane, message_id: &str) -> bool {
        let mut store = self.store.write().await;
        let conversation_id = match lane {
            Lane::Main => store.current_id(),
            Lane::Branch => store.branch_id(),
        }
        .map(str::to_string);

        conversation_id.is_some_and(|id| store.toggle_expansion(message_id, &id))
    }

    /// Deletes a conversation; a main conversation takes its branches along.
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<Vec<String>, Notice> {
        let mut store = self.store.write().await;
        let Some(conversation) = store.conversation(conversation_id) else {
            return Err(Notice::error(format!(
                "Conversation '{conversation_id}' not found."
            )));
        };
        Ok(store.delete_conversation(conversation_id, !conversation.is_branch()))
    }

    pub async fn select_conversation(&self, conversation_id: &str) -> Result<(), Notice> {
        if self.store.write().await.select_conversation(conversation_id) {
            Ok(())
        } else {
            Err(Notice::error(format!(
                "Conversation '{conversation_id}' not found."
            )))
        }
    }

    pub async fn close_branch(&self) -> Option<String> {
        self.store.write().await.close_branch()
    }

    pub async fn new_conversation(&self) -> String {
        self.store.write().await.create_conversation()
    }

    pub async fn outline(&self) -> ConversationOutline {
        self.store.read().await.outline()
    }

    pub async fn snapshot(&self) -> ChatSnapshot {
        let store = self.store.read().await;
        ChatSnapshot {
            conversations: store.conversations().to_vec(),
            current: store.current(),
            branch: store.active_branch(),
            main_loading: self.is_loading(Lane::Main),
            branch_loading: self.is_loading(Lane::Branch),
        }
    }
}

/// Assistant message shown when no provider produced an answer.
fn error_reply(err: &OrchestratorError) -> AiResponse {
    let expanded = match err {
        OrchestratorError::Timeout { after, .. } => format!(
            "The AI service did not answer within {} seconds. It may be busy or unreachable. Please wait a moment and send your message again.",
            after.as_secs()
        ),
        OrchestratorError::Exhausted { attempts } => {
            let mut text = format!("{err}");
            if !attempts.is_empty() {
                text.push_str("\n\nProvider errors:");
                for attempt in attempts {
                    text.push_str(&format!("\n- {attempt}"));
                }
            }
            text
        }
    };
    AiResponse::new(err.reply_text(), expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use concise_core::config::AiConfig;
    use concise_interaction::{ProviderError, ProviderRequest, ResponseProvider};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    // Records every request and answers with a fixed text
    struct RecordingProvider {
        answer: Option<&'static str>,
        gate: Option<Arc<Notify>>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl RecordingProvider {
        fn answering(answer: &'static str) -> Arc<Self> {
            Arc::new(Self {
                answer: Some(answer),
                gate: None,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answer: None,
                gate: None,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn gated(answer: &'static str, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                answer: Some(answer),
                gate: Some(gate),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> ProviderRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ResponseProvider for RecordingProvider {
        fn name(&self) -> &str {
            "Recording"
        }

        async fn attempt(&self, request: &ProviderRequest) -> Result<AiResponse, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.answer {
                Some(text) => Ok(AiResponse::new(text, format!("{text} in full"))),
                None => Err(ProviderError::EmptyResponse {
                    provider: "Recording".to_string(),
                }),
            }
        }
    }

    struct HangingProvider;

    #[async_trait]
    impl ResponseProvider for HangingProvider {
        fn name(&self) -> &str {
            "Hanging"
        }

        async fn attempt(&self, _request: &ProviderRequest) -> Result<AiResponse, ProviderError> {
            std::future::pending().await
        }
    }

    fn controller(provider: Arc<dyn ResponseProvider>) -> ChatController {
        let orchestrator =
            ResponseOrchestrator::new(vec![provider], "system", Duration::from_secs(45));
        ChatController::new(
            ConversationStore::new(),
            Arc::new(orchestrator),
            BatchExtractor::default(),
            AttachmentPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_first_send_creates_conversation() {
        let orchestrator = ResponseOrchestrator::local_only(&AiConfig::default());
        let controller = ChatController::new(
            ConversationStore::new(),
            Arc::new(orchestrator),
            BatchExtractor::default(),
            AttachmentPolicy::default(),
        );

        let outcome = controller
            .send_message(Lane::Main, "  what is the capital of france  ", &[])
            .await;

        assert!(!outcome.failed);
        assert!(outcome.notices.is_empty());
        let snapshot = controller.snapshot().await;
        let current = snapshot.current.unwrap();
        assert_eq!(current.title, "what is the capital of france");
        assert_eq!(current.messages.len(), 2);
        assert_eq!(current.messages[0].content, "what is the capital of france");
        assert_eq!(current.messages[1].role, MessageRole::Assistant);
        assert!(current.messages[1].content.contains("Paris"));
        assert!(current.messages[1].expanded_content.is_some());
        assert!(!snapshot.main_loading);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let provider = RecordingProvider::answering("unused");
        let controller = controller(provider.clone());

        let outcome = controller.send_message(Lane::Main, "   ", &[]).await;

        assert!(outcome.is_rejected());
        assert_eq!(outcome.notices.len(), 1);
        assert!(controller.snapshot().await.conversations.is_empty());
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_branch_lane_without_branch() {
        let controller = controller(RecordingProvider::answering("unused"));

        let outcome = controller.send_message(Lane::Branch, "hello", &[]).await;

        assert!(outcome.is_rejected());
        assert_eq!(outcome.notices, vec![Notice::error("No branch is open.")]);
        assert!(!controller.is_loading(Lane::Branch));
    }

    #[tokio::test]
    async fn test_branch_send_uses_frozen_history() {
        let provider = RecordingProvider::answering("ok");
        let controller = controller(provider.clone());

        let first = controller.send_message(Lane::Main, "first question", &[]).await;
        controller.send_message(Lane::Main, "second question", &[]).await;

        let branch_id = controller
            .branch_from(first.reply_message_id.as_deref().unwrap())
            .await
            .unwrap();
        let outcome = controller.send_message(Lane::Branch, "side question", &[]).await;

        assert_eq!(outcome.conversation_id.as_deref(), Some(branch_id.as_str()));
        let history = provider.last_request().history;
        let contents: Vec<_> = history.iter().map(|entry| entry.content.as_str()).collect();
        assert_eq!(contents, vec!["first question", "ok"]);

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.current.unwrap().messages.len(), 4);
        assert_eq!(snapshot.branch.unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_second_branch_is_a_notice() {
        let controller = controller(RecordingProvider::answering("ok"));
        let outcome = controller.send_message(Lane::Main, "topic", &[]).await;
        let message_id = outcome.user_message_id.unwrap();

        controller.branch_from(&message_id).await.unwrap();
        let before = controller.snapshot().await.conversations.len();
        let notice = controller.branch_from(&message_id).await.unwrap_err();

        assert_eq!(notice.message, "You cannot branch off a branch.");
        assert_eq!(controller.snapshot().await.conversations.len(), before);
    }

    #[tokio::test]
    async fn test_busy_lane_rejects_while_other_lane_is_free() {
        let gate = Arc::new(Notify::new());
        let controller = Arc::new(controller(RecordingProvider::gated("done", gate.clone())));

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.send_message(Lane::Main, "slow one", &[]).await }
        });
        while !controller.is_loading(Lane::Main) {
            tokio::task::yield_now().await;
        }

        let second = controller.send_message(Lane::Main, "impatient", &[]).await;
        assert!(second.is_rejected());
        assert!(!controller.is_loading(Lane::Branch));

        gate.notify_one();
        let first = pending.await.unwrap();
        assert!(first.reply_message_id.is_some());
        assert!(!controller.is_loading(Lane::Main));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_error_message() {
        let orchestrator = ResponseOrchestrator::new(
            vec![Arc::new(HangingProvider)],
            "system",
            Duration::from_secs(45),
        );
        let controller = ChatController::new(
            ConversationStore::new(),
            Arc::new(orchestrator),
            BatchExtractor::default(),
            AttachmentPolicy::default(),
        );

        let outcome = controller.send_message(Lane::Main, "hello?", &[]).await;

        assert!(outcome.failed);
        let current = controller.snapshot().await.current.unwrap();
        let reply = &current.messages[1];
        assert_eq!(reply.content, "Sorry, the AI took too long to respond. Please try again.");
        assert!(reply.expanded_content.as_deref().unwrap().contains("45 seconds"));
        assert!(!controller.is_loading(Lane::Main));
    }

    #[tokio::test]
    async fn test_exhaustion_becomes_error_message() {
        let controller = controller(RecordingProvider::failing());

        let outcome = controller.send_message(Lane::Main, "anyone there", &[]).await;

        assert!(outcome.failed);
        let current = controller.snapshot().await.current.unwrap();
        assert!(current.messages[1].content.starts_with("Sorry, I couldn't get a response."));
        assert!(current.messages[1]
            .expanded_content
            .as_deref()
            .unwrap()
            .contains("Provider errors:"));
    }

    #[tokio::test]
    async fn test_attachments_feed_the_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let notes = temp_dir.path().join("notes.txt");
        let binary = temp_dir.path().join("tool.exe");
        std::fs::write(&notes, "launch on friday").unwrap();
        std::fs::write(&binary, [0u8; 4]).unwrap();
        let missing = temp_dir.path().join("missing.md");

        let provider = RecordingProvider::answering("noted");
        let controller = controller(provider.clone());

        let outcome = controller
            .send_message(Lane::Main, "summarize this", &[notes, binary, missing])
            .await;

        assert_eq!(outcome.notices.len(), 2);
        let request = provider.last_request();
        assert_eq!(request.user_text, "summarize this");
        let prompt = request.prompt();
        assert!(prompt.starts_with("summarize this\n\nAttached files:\n\n=== File 1: notes.txt ==="));
        assert!(prompt.contains("launch on friday"));
        assert!(!prompt.contains("tool.exe"));

        let current = controller.snapshot().await.current.unwrap();
        assert_eq!(current.messages[0].content, "summarize this");
        assert_eq!(current.messages[0].attachments.len(), 1);
        assert_eq!(current.messages[0].attachments[0].name, "notes.txt");
    }

    #[tokio::test]
    async fn test_local_answer_ignores_attached_text() {
        let temp_dir = TempDir::new().unwrap();
        let agenda = temp_dir.path().join("agenda.txt");
        std::fs::write(&agenda, "Sprint review 10-15 in room B").unwrap();

        let orchestrator = ResponseOrchestrator::local_only(&AiConfig::default());
        let controller = ChatController::new(
            ConversationStore::new(),
            Arc::new(orchestrator),
            BatchExtractor::default(),
            AttachmentPolicy::default(),
        );

        let outcome = controller
            .send_message(Lane::Main, "what is the capital of france", &[agenda.clone()])
            .await;
        assert!(!outcome.failed);
        controller.send_message(Lane::Main, "thanks", &[agenda]).await;

        let current = controller.snapshot().await.current.unwrap();
        assert_eq!(current.messages[0].attachments.len(), 1);
        assert_eq!(current.messages[1].content, "The capital of France is Paris.");
        assert_eq!(
            current.messages[3].content,
            "You're welcome! 😊"
        );
    }

    #[tokio::test]
    async fn test_delete_select_and_toggle() {
        let controller = controller(RecordingProvider::answering("ok"));
        let outcome = controller.send_message(Lane::Main, "topic", &[]).await;
        let main_id = outcome.conversation_id.unwrap();
        let reply_id = outcome.reply_message_id.unwrap();

        assert!(controller.toggle_expansion(Lane::Main, &reply_id).await);
        let current = controller.snapshot().await.current.unwrap();
        assert!(current.messages[1].is_expanded);
        assert!(!controller.toggle_expansion(Lane::Branch, &reply_id).await);

        let branch_id = controller.branch_from(&reply_id).await.unwrap();
        let removed = controller.delete_conversation(&main_id).await.unwrap();
        assert_eq!(removed, vec![main_id.clone(), branch_id]);

        let snapshot = controller.snapshot().await;
        assert!(snapshot.conversations.is_empty());
        assert!(snapshot.current.is_none());
        assert!(snapshot.branch.is_none());

        assert!(controller.delete_conversation(&main_id).await.is_err());
        assert!(controller.select_conversation(&main_id).await.is_err());
    }
}
