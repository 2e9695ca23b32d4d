use serde::{Deserialize, Serialize};
use std::fmt;

pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "json", "xml", "log", "js", "ts", "jsx", "tsx", "html", "css", "scss", "py",
    "java", "cpp", "c", "php", "rb", "go", "rs", "swift", "kt",
];
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];
pub const WORD_EXTENSIONS: &[&str] = &["docx", "doc"];
pub const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xls"];
pub const CSV_EXTENSIONS: &[&str] = &["csv"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"];
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz"];

/// Which extractor handles a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Text,
    Pdf,
    Word,
    Excel,
    Csv,
    Image,
    Archive,
    Unsupported,
    /// Synthetic outcome standing for a whole attachment batch
    Batch,
}

impl FileCategory {
    /// Picks the extractor for a file. Extension tables are consulted in
    /// order; any `text/*` MIME type counts as text.
    pub fn detect(extension: &str, mime_type: &str) -> Self {
        let ext = extension.to_lowercase();
        let ext = ext.as_str();

        if PDF_EXTENSIONS.contains(&ext) {
            FileCategory::Pdf
        } else if WORD_EXTENSIONS.contains(&ext) {
            FileCategory::Word
        } else if EXCEL_EXTENSIONS.contains(&ext) {
            FileCategory::Excel
        } else if CSV_EXTENSIONS.contains(&ext) {
            FileCategory::Csv
        } else if IMAGE_EXTENSIONS.contains(&ext) {
            FileCategory::Image
        } else if ARCHIVE_EXTENSIONS.contains(&ext) {
            FileCategory::Archive
        } else if TEXT_EXTENSIONS.contains(&ext) || mime_type.starts_with("text/") {
            FileCategory::Text
        } else {
            FileCategory::Unsupported
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Text => "text",
            FileCategory::Pdf => "pdf",
            FileCategory::Word => "word",
            FileCategory::Excel => "excel",
            FileCategory::Csv => "csv",
            FileCategory::Image => "image",
            FileCategory::Archive => "archive",
            FileCategory::Unsupported => "unsupported",
            FileCategory::Batch => "batch",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every accepted extension, in category order.
pub fn supported_extensions() -> Vec<&'static str> {
    [
        TEXT_EXTENSIONS,
        PDF_EXTENSIONS,
        WORD_EXTENSIONS,
        EXCEL_EXTENSIONS,
        CSV_EXTENSIONS,
        IMAGE_EXTENSIONS,
        ARCHIVE_EXTENSIONS,
    ]
    .concat()
}

pub fn is_supported_extension(extension: &str) -> bool {
    let ext = extension.to_lowercase();
    supported_extensions().contains(&ext.as_str())
}
