//! Upload checks applied before a file is attached to a message.

use crate::extraction::{is_supported_extension, kilobytes};
use concise_core::ConciseError;
use concise_core::attachment::FileHandle;
use concise_core::config::{AttachmentConfig, DEFAULT_MAX_FILE_SIZE_BYTES};
use concise_core::error::Result;

/// Extension whitelist plus a per-file size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentPolicy {
    max_file_size_bytes: u64,
}

impl AttachmentPolicy {
    pub fn new(max_file_size_bytes: u64) -> Self {
        Self {
            max_file_size_bytes,
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    /// Accepts a file whose extension is whitelisted and whose size does not
    /// exceed the ceiling.
    pub fn check(&self, file: &FileHandle) -> Result<()> {
        let extension = file.extension();
        if !is_supported_extension(&extension) {
            return Err(ConciseError::validation(format!(
                "File type .{} is not supported: {}",
                extension, file.name
            )));
        }
        if file.size > self.max_file_size_bytes {
            return Err(ConciseError::validation(format!(
                "File too large: {} ({}). Maximum size is {}MB",
                file.name,
                kilobytes(file.size),
                self.max_file_size_bytes / (1024 * 1024)
            )));
        }
        Ok(())
    }

    /// Splits `files` into accepted handles and one notice per rejected file.
    pub fn validate(&self, files: Vec<FileHandle>) -> (Vec<FileHandle>, Vec<String>) {
        let mut accepted = Vec::with_capacity(files.len());
        let mut notices = Vec::new();

        for file in files {
            match self.check(&file) {
                Ok(()) => accepted.push(file),
                Err(ConciseError::Validation(notice)) => {
                    tracing::info!("[Attachments] Rejected {}: {}", file.name, notice);
                    notices.push(notice);
                }
                Err(err) => notices.push(err.to_string()),
            }
        }

        (accepted, notices)
    }
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE_BYTES)
    }
}

impl From<&AttachmentConfig> for AttachmentPolicy {
    fn from(config: &AttachmentConfig) -> Self {
        Self::new(config.max_file_size_bytes)
    }
}
