//! File Extraction Adapter.
//!
//! Routes a file to the extractor for its category and normalizes the
//! result into text plus metadata. Failures are returned as data
//! (`success == false`), so N files always yield N outcomes.

mod batch;
mod category;
mod delimited;
mod excel;
mod format;
mod media;
mod pdf;
mod text;
mod word;

pub use batch::{BatchExtractor, extract_batch};
pub use category::{FileCategory, is_supported_extension, supported_extensions};
pub use format::format_for_ai;

use chrono::{DateTime, Utc};
use concise_core::attachment::{FileHandle, file_extension};
use concise_core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A file's bytes plus the metadata extractors need.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl SourceFile {
    /// Reads a file from disk.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let last_modified = tokio::fs::metadata(path)
            .await
            .and_then(|metadata| metadata.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            mime_type: guess_mime(&name),
            size: bytes.len() as u64,
            name,
            bytes,
            last_modified,
        })
    }

    /// An in-memory file; the MIME type is guessed from the name.
    #[cfg(test)]
    pub(crate) fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            mime_type: guess_mime(&name),
            size: bytes.len() as u64,
            name,
            bytes,
            last_modified: None,
        }
    }

    pub fn extension(&self) -> String {
        file_extension(&self.name)
    }

    /// Size in kilobytes with one decimal, e.g. `1.5KB`.
    pub fn size_label(&self) -> String {
        kilobytes(self.size)
    }

    pub fn info(&self) -> FileInfo {
        FileInfo {
            name: self.name.clone(),
            size: self.size,
            mime_type: self.mime_type.clone(),
            extension: self.extension(),
            last_modified: self.last_modified,
        }
    }
}

/// Builds the handle stored on a message for a file on disk.
pub async fn inspect(path: &Path) -> Result<FileHandle> {
    let metadata = tokio::fs::metadata(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(FileHandle {
        mime_type: guess_mime(&name),
        name,
        path: path.to_path_buf(),
        size: metadata.len(),
    })
}

pub(crate) fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// File size as shown to users and the AI, e.g. `1.5KB`.
pub fn kilobytes(size: u64) -> String {
    format!("{:.1}KB", size as f64 / 1024.0)
}

/// Metadata of the file an outcome belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub extension: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Counters reported by the extractors; unset ones do not apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub word_count: Option<usize>,
    pub char_count: Option<usize>,
    pub page_count: Option<usize>,
    pub sheet_count: Option<usize>,
    pub total_rows: Option<usize>,
    pub row_count: Option<usize>,
    pub column_count: Option<usize>,
}

impl ExtractionStats {
    pub(crate) fn for_text(text: &str) -> Self {
        Self {
            word_count: Some(text.split_whitespace().count()),
            char_count: Some(text.chars().count()),
            ..Self::default()
        }
    }
}

/// Result of extracting one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub success: bool,
    pub category: FileCategory,
    pub content: Option<String>,
    pub error: Option<String>,
    /// Description used in place of content when extraction failed
    pub fallback_content: Option<String>,
    pub stats: ExtractionStats,
    pub file_info: FileInfo,
}

/// What an extractor produces on success.
pub(crate) struct Extracted {
    pub content: String,
    pub stats: ExtractionStats,
}

/// What an extractor produces on failure.
pub(crate) struct ExtractionFailure {
    pub message: String,
    pub fallback: Option<String>,
}

impl ExtractionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fallback: None,
        }
    }
}

/// Extracts one file. Never fails; problems are reported in the outcome.
pub fn extract(file: &SourceFile) -> ExtractionOutcome {
    let extension = file.extension();
    let category = FileCategory::detect(&extension, &file.mime_type);

    let result = match category {
        FileCategory::Pdf => pdf::extract(file),
        FileCategory::Word => word::extract(file),
        FileCategory::Excel => excel::extract(file),
        FileCategory::Csv => delimited::extract(file),
        FileCategory::Image => Ok(media::describe_image(file)),
        FileCategory::Archive => Ok(media::describe_archive(file)),
        FileCategory::Text => text::extract(file),
        FileCategory::Unsupported | FileCategory::Batch => Err(ExtractionFailure::new(format!(
            "Unsupported file type: {}. Supported types include: {}",
            extension,
            supported_extensions().join(", ")
        ))),
    };

    match result {
        Ok(extracted) => {
            tracing::debug!(
                "[Extraction] Extracted {} as {} ({} chars)",
                file.name,
                category,
                extracted.content.len()
            );
            ExtractionOutcome {
                success: true,
                category,
                content: Some(extracted.content),
                error: None,
                fallback_content: None,
                stats: extracted.stats,
                file_info: file.info(),
            }
        }
        Err(failure) => {
            tracing::warn!(
                "[Extraction] Failed to extract {}: {}",
                file.name,
                failure.message
            );
            ExtractionOutcome {
                success: false,
                category,
                content: None,
                error: Some(failure.message),
                fallback_content: failure.fallback,
                stats: ExtractionStats::default(),
                file_info: file.info(),
            }
        }
    }
}
