//! File handles carried by messages.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file attached to a user message.
///
/// Only metadata is kept on the message; extracted text goes into the
/// prompt and is never stored in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    /// Original filename
    pub name: String,
    /// Where the file was read from
    pub path: PathBuf,
    /// MIME type guessed from the extension
    pub mime_type: String,
    /// File size in bytes
    pub size: u64,
}

impl FileHandle {
    /// Lowercased extension, or an empty string when the name has none.
    pub fn extension(&self) -> String {
        file_extension(&self.name)
    }
}

/// Returns the lowercased text after the last `.` of a filename.
///
/// A name without a dot yields the whole name, matching how the upload
/// whitelist has always treated such files (they fail the lookup).
pub fn file_extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_lowercase()
}
