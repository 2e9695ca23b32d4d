//! Terminal rendering of conversations, outlines and notices.

use colored::Colorize;
use concise_application::{ChatSnapshot, Notice, NoticeLevel};
use concise_core::conversation::{Conversation, ConversationOutline, Message, MessageRole};
use concise_infrastructure::extraction::kilobytes;

pub fn notices(notices: &[Notice]) {
    for notice in notices {
        let line = match notice.level {
            NoticeLevel::Warning => notice.message.yellow(),
            NoticeLevel::Error => notice.message.red(),
        };
        println!("{line}");
    }
}

/// Prints one message; `number` is its 1-based position in the conversation.
pub fn message(number: usize, message: &Message, in_branch: bool) {
    match message.role {
        MessageRole::User => {
            println!("{}", format!("[{number}] You: {}", message.content).green());
            for attachment in &message.attachments {
                println!(
                    "{}",
                    format!(
                        "    attached {} ({})",
                        attachment.name,
                        kilobytes(attachment.size)
                    )
                    .bright_black()
                );
            }
        }
        MessageRole::Assistant => {
            println!("{}", format!("[{number}] AI:").bright_magenta());
            for line in message.display_text().lines() {
                println!("{}", line.bright_blue());
            }
            if message.has_expanded_content() && !message.is_expanded {
                println!(
                    "{}",
                    format!(
                        "    (/expand {}{number} for the full answer)",
                        if in_branch { "b" } else { "" }
                    )
                    .bright_black()
                );
            }
        }
    }
}

pub fn conversation(conversation: &Conversation) {
    let header = format!("=== {} ===", conversation.title);
    if conversation.is_branch() {
        println!("{}", header.bright_cyan().bold());
    } else {
        println!("{}", header.bright_magenta().bold());
    }
    for (index, entry) in conversation.messages.iter().enumerate() {
        message(index + 1, entry, conversation.is_branch());
    }
}

/// Lists main conversations, numbered as `/select` expects.
pub fn conversation_list(snapshot: &ChatSnapshot) {
    let current_id = snapshot.current.as_ref().map(|conversation| conversation.id.as_str());
    let mains: Vec<_> = snapshot
        .conversations
        .iter()
        .filter(|conversation| !conversation.is_branch())
        .collect();

    if mains.is_empty() {
        println!("{}", "No conversations yet.".bright_black());
        return;
    }
    for (index, conversation) in mains.iter().enumerate() {
        let marker = if Some(conversation.id.as_str()) == current_id {
            "*"
        } else {
            " "
        };
        println!(
            "{} {}. {} ({} messages)",
            marker.bright_green(),
            index + 1,
            conversation.title,
            conversation.messages.len()
        );
    }
    if let Some(branch) = &snapshot.branch {
        println!("{}", format!("  open branch: {}", branch.title).bright_cyan());
    }
}

pub fn outline(outline: &ConversationOutline) {
    println!(
        "{}",
        format!(
            "{} conversation(s), {} branch(es)",
            outline.main_count, outline.branch_count
        )
        .bright_magenta()
    );
    for entry in &outline.entries {
        println!("{}", entry.conversation.title.bold());
        for branch in &entry.branches {
            let point = branch
                .parent_message_id
                .as_deref()
                .and_then(|parent| {
                    entry
                        .conversation
                        .messages
                        .iter()
                        .position(|message| message.id == parent)
                })
                .map(|position| format!("from message {}", position + 1))
                .unwrap_or_default();
            println!(
                "  {} {} {}",
                "└─".bright_black(),
                branch.title.bright_cyan(),
                point.bright_black()
            );
        }
    }
}
