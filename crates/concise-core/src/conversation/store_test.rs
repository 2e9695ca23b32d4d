#[cfg(test)]
mod tests {
    use crate::attachment::FileHandle;
    use crate::conversation::{
        BranchRejection, ConversationStore, DEFAULT_TITLE, HistoryEntry, MessageRole,
    };
    use crate::response::AiResponse;
    use std::path::PathBuf;

    /// Builds a store with one main conversation holding `turns` user/assistant pairs.
    fn store_with_turns(turns: usize) -> (ConversationStore, String) {
        let mut store = ConversationStore::new();
        let id = store.create_conversation();
        for turn in 0..turns {
            store
                .append_message(&id, format!("question {turn}"), MessageRole::User, Vec::new())
                .unwrap();
            store
                .append_reply(&id, &AiResponse::new(format!("answer {turn}"), "long"))
                .unwrap();
        }
        (store, id)
    }

    #[test]
    fn test_create_conversation_becomes_current() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation();

        let current = store.current().unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.title, DEFAULT_TITLE);
        assert!(current.messages.is_empty());
        assert!(!current.is_branch());
    }

    #[test]
    fn test_create_conversation_clears_active_branch() {
        let (mut store, id) = store_with_turns(1);
        let first = store.conversation(&id).unwrap().messages[0].id.clone();
        store.branch(&first, "question 0").unwrap();
        assert!(store.branch_id().is_some());

        store.create_conversation();
        assert!(store.branch_id().is_none());
    }

    #[test]
    fn test_first_message_sets_title() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation();

        store.append_message(&id, "short title", MessageRole::User, Vec::new());
        store.append_message(&id, "ignored afterwards", MessageRole::User, Vec::new());

        assert_eq!(store.conversation(&id).unwrap().title, "short title");
    }

    #[test]
    fn test_long_first_message_is_truncated_with_ellipsis() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation();
        let content = "abcdefghijklmnopqrstuvwxyz0123456789";

        store.append_message(&id, content, MessageRole::User, Vec::new());

        let title = store.conversation(&id).unwrap().title.clone();
        assert_eq!(title, "abcdefghijklmnopqrstuvwxyz0123...");
    }

    #[test]
    fn test_title_truncation_counts_characters() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation();
        let content = "é".repeat(31);

        store.append_message(&id, content, MessageRole::User, Vec::new());

        let title = store.conversation(&id).unwrap().title.clone();
        assert_eq!(title.chars().count(), 33);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_append_to_unknown_conversation_is_noop() {
        let (mut store, _) = store_with_turns(2);
        let before = store.clone();

        let result = store.append_message("missing", "hello", MessageRole::User, Vec::new());

        assert!(result.is_none());
        assert_eq!(store.len(), before.len());
        for (after, before) in store.conversations().iter().zip(before.conversations()) {
            assert_eq!(after.as_ref(), before.as_ref());
        }
    }

    #[test]
    fn test_messages_are_append_only() {
        let (mut store, id) = store_with_turns(2);
        let before: Vec<String> = store
            .conversation(&id)
            .unwrap()
            .messages
            .iter()
            .map(|m| m.id.clone())
            .collect();

        store.append_message(&id, "later", MessageRole::User, Vec::new());
        let first = before[0].clone();
        store.toggle_expansion(&before[1], &id);
        store.branch(&first, "question 0").unwrap();

        let after = store.conversation(&id).unwrap();
        let ids: Vec<&str> = after.messages.iter().map(|m| m.id.as_str()).collect();
        let expected: Vec<&str> = before.iter().map(String::as_str).collect();
        assert_eq!(ids[..before.len()].to_vec(), expected);
        assert_eq!(after.messages.len(), before.len() + 1);
        assert!(after.messages.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }

    #[test]
    fn test_append_keeps_attachments_and_owner() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation();
        let handle = FileHandle {
            name: "notes.txt".to_string(),
            path: PathBuf::from("/tmp/notes.txt"),
            mime_type: "text/plain".to_string(),
            size: 12,
        };

        let message_id = store
            .append_message(&id, "see file", MessageRole::User, vec![handle.clone()])
            .unwrap();

        let conversation = store.conversation(&id).unwrap();
        let message = conversation.message(&message_id).unwrap();
        assert_eq!(message.attachments, vec![handle]);
        assert_eq!(message.conversation_id, id);
        assert!(conversation.updated_at >= conversation.created_at);
    }

    #[test]
    fn test_snapshots_do_not_change_after_mutation() {
        let (mut store, id) = store_with_turns(1);
        let snapshot = store.conversation(&id).unwrap();

        store.append_message(&id, "more", MessageRole::User, Vec::new());

        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(store.conversation(&id).unwrap().messages.len(), 3);
    }

    #[test]
    fn test_branch_copies_history_up_to_branch_point() {
        let (mut store, id) = store_with_turns(3);
        let main = store.conversation(&id).unwrap();
        let branch_point = main.messages[3].clone();

        let branch_id = store.branch(&branch_point.id, &branch_point.content).unwrap();

        let branch = store.conversation(&branch_id).unwrap();
        assert!(branch.is_branch());
        assert!(branch.messages.is_empty());
        assert_eq!(branch.parent_message_id.as_deref(), Some(branch_point.id.as_str()));
        let history = branch.conversation_history.as_ref().unwrap();
        let expected: Vec<HistoryEntry> = main.messages[..4].iter().map(HistoryEntry::from).collect();
        assert_eq!(history, &expected);
        assert_eq!(branch.title, "Branch: answer 1");

        // main stays current, branch becomes active
        assert_eq!(store.current_id(), Some(id.as_str()));
        assert_eq!(store.branch_id(), Some(branch_id.as_str()));
    }

    #[test]
    fn test_branch_rejected_while_branch_active() {
        let (mut store, id) = store_with_turns(2);
        let messages = store.conversation(&id).unwrap().messages.clone();
        store.branch(&messages[0].id, "first").unwrap();
        let before = store.clone();

        for message in &messages {
            let result = store.branch(&message.id, &message.content);
            assert_eq!(result, Err(BranchRejection::BranchAlreadyActive));
        }
        assert_eq!(store.len(), before.len());
        assert_eq!(store.branch_id(), before.branch_id());
    }

    #[test]
    fn test_branch_rejected_for_foreign_message() {
        let (mut store, _) = store_with_turns(1);
        let result = store.branch("not-a-message", "x");
        assert_eq!(
            result,
            Err(BranchRejection::MessageNotFound("not-a-message".to_string()))
        );
        assert!(store.branch_id().is_none());
    }

    #[test]
    fn test_branch_without_current_conversation() {
        let mut store = ConversationStore::new();
        assert_eq!(
            store.branch("anything", "x"),
            Err(BranchRejection::NoCurrentConversation)
        );
    }

    #[test]
    fn test_close_branch_allows_new_branch() {
        let (mut store, id) = store_with_turns(1);
        let first = store.conversation(&id).unwrap().messages[0].id.clone();
        let branch_id = store.branch(&first, "q").unwrap();

        assert_eq!(store.close_branch(), Some(branch_id.clone()));
        assert!(store.conversation(&branch_id).is_some());
        assert!(store.branch(&first, "q").is_ok());
    }

    #[test]
    fn test_toggle_expansion_flips_flag() {
        let (mut store, id) = store_with_turns(1);
        let reply = store.conversation(&id).unwrap().messages[1].clone();
        assert!(!reply.is_expanded);
        assert_eq!(reply.display_text(), "answer 0");

        assert!(store.toggle_expansion(&reply.id, &id));
        let expanded = store.conversation(&id).unwrap().messages[1].clone();
        assert!(expanded.is_expanded);
        assert_eq!(expanded.display_text(), "long");

        assert!(store.toggle_expansion(&reply.id, &id));
        assert!(!store.conversation(&id).unwrap().messages[1].is_expanded);
    }

    #[test]
    fn test_toggle_expansion_unknown_target() {
        let (mut store, id) = store_with_turns(1);
        assert!(!store.toggle_expansion("missing", &id));
        assert!(!store.toggle_expansion("missing", "missing"));
    }

    #[test]
    fn test_delete_main_removes_its_branches() {
        let (mut store, id) = store_with_turns(2);
        let first = store.conversation(&id).unwrap().messages[0].id.clone();
        let branch_id = store.branch(&first, "q").unwrap();
        store.close_branch();
        let second_branch = store.branch(&first, "q again").unwrap();

        let removed = store.delete_conversation(&id, true);

        assert_eq!(removed.len(), 3);
        assert!(removed.contains(&branch_id));
        assert!(removed.contains(&second_branch));
        assert!(store.is_empty());
        assert!(store.current_id().is_none());
        assert!(store.branch_id().is_none());
    }

    #[test]
    fn test_delete_main_keeps_unrelated_branches() {
        let (mut store, first_main) = store_with_turns(1);
        let first_msg = store.conversation(&first_main).unwrap().messages[0].id.clone();
        let kept_branch = store.branch(&first_msg, "q").unwrap();

        let second_main = store.create_conversation();
        store.append_message(&second_main, "hi", MessageRole::User, Vec::new());

        store.delete_conversation(&second_main, true);

        assert!(store.conversation(&kept_branch).is_some());
        assert_eq!(store.current_id(), Some(first_main.as_str()));
    }

    #[test]
    fn test_delete_branch_leaves_main_untouched() {
        let (mut store, id) = store_with_turns(2);
        let first = store.conversation(&id).unwrap().messages[0].id.clone();
        let branch_id = store.branch(&first, "q").unwrap();
        store.append_message(&branch_id, "in branch", MessageRole::User, Vec::new());
        let main_before = store.conversation(&id).unwrap();

        let removed = store.delete_conversation(&branch_id, false);

        assert_eq!(removed, vec![branch_id]);
        assert_eq!(store.conversation(&id).unwrap().as_ref(), main_before.as_ref());
        assert_eq!(store.current_id(), Some(id.as_str()));
        assert!(store.branch_id().is_none());
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let (mut store, _) = store_with_turns(1);
        assert!(store.delete_conversation("missing", true).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_select_conversation() {
        let mut store = ConversationStore::new();
        let first = store.create_conversation();
        let second = store.create_conversation();
        assert_eq!(store.current_id(), Some(second.as_str()));

        assert!(store.select_conversation(&first));
        assert_eq!(store.current_id(), Some(first.as_str()));
        assert!(!store.select_conversation("missing"));
        assert_eq!(store.current_id(), Some(first.as_str()));
    }

    #[test]
    fn test_context_for_branch_includes_snapshot_then_own_messages() {
        let (mut store, id) = store_with_turns(1);
        let reply = store.conversation(&id).unwrap().messages[1].id.clone();
        let branch_id = store.branch(&reply, "answer 0").unwrap();
        store.append_message(&branch_id, "follow up", MessageRole::User, Vec::new());

        let context = store.context_for(&branch_id);

        assert_eq!(
            context,
            vec![
                HistoryEntry::new(MessageRole::User, "question 0"),
                HistoryEntry::new(MessageRole::Assistant, "answer 0"),
                HistoryEntry::new(MessageRole::User, "follow up"),
            ]
        );
        assert!(store.context_for("missing").is_empty());
    }

    #[test]
    fn test_outline_groups_branches_under_their_main() {
        let (mut store, first_main) = store_with_turns(1);
        let msg = store.conversation(&first_main).unwrap().messages[0].id.clone();
        let branch_id = store.branch(&msg, "q").unwrap();
        let second_main = store.create_conversation();

        let outline = store.outline();

        assert_eq!(outline.main_count, 2);
        assert_eq!(outline.branch_count, 1);
        let first = &outline.entries[0];
        assert_eq!(first.conversation.id, first_main);
        assert_eq!(first.branches.len(), 1);
        assert_eq!(first.branches[0].id, branch_id);
        assert_eq!(outline.entries[1].conversation.id, second_main);
        assert!(outline.entries[1].branches.is_empty());
    }
}
