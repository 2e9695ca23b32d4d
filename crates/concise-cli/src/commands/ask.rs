//! One-shot question.

use super::Settings;
use crate::render;
use anyhow::{Result, bail};
use colored::Colorize;
use concise_application::Lane;
use std::path::PathBuf;

pub async fn run(settings: &Settings, text: &str, files: &[PathBuf], expanded: bool) -> Result<()> {
    let controller = settings.controller();
    let outcome = controller.send_message(Lane::Main, text, files).await;
    render::notices(&outcome.notices);

    let Some(conversation) = controller.snapshot().await.current else {
        bail!("No answer was produced");
    };
    let Some(reply) = outcome
        .reply_message_id
        .as_deref()
        .and_then(|id| conversation.message(id))
    else {
        bail!("No answer was produced");
    };

    println!("{}", reply.content);
    if expanded {
        if let Some(full) = &reply.expanded_content {
            println!();
            println!("{}", full.bright_blue());
        }
    }

    if outcome.failed {
        bail!("All providers failed");
    }
    Ok(())
}
