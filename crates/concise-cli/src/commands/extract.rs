//! Prints the attachment section the AI would receive for some files.

use super::Settings;
use anyhow::Result;
use colored::Colorize;
use concise_infrastructure::AttachmentPolicy;
use concise_infrastructure::extraction::{self, format_for_ai};
use std::path::PathBuf;

pub async fn run(settings: &Settings, paths: &[PathBuf]) -> Result<()> {
    let policy = AttachmentPolicy::from(&settings.config.attachments);

    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        match extraction::inspect(path).await {
            Ok(handle) => handles.push(handle),
            Err(err) => eprintln!("{}", format!("Could not read {}: {err}", path.display()).red()),
        }
    }

    let (accepted, rejections) = policy.validate(handles);
    for rejection in &rejections {
        eprintln!("{}", rejection.yellow());
    }
    if accepted.is_empty() {
        return Ok(());
    }

    let outcomes = settings.extractor().extract(&accepted).await;
    println!("{}", format_for_ai(&outcomes));
    Ok(())
}
