//! Images and archives are described, not opened.

use super::{Extracted, ExtractionStats, SourceFile};

pub(crate) fn describe_image(file: &SourceFile) -> Extracted {
    Extracted {
        content: format!(
            "[Image file: {}]\nSize: {}\nType: {}\nDimensions: Unknown\n\nNote: This is an image file. I can see the file details but cannot analyze the visual content. Consider describing what you see in the image or asking specific questions about it.",
            file.name,
            file.size_label(),
            file.mime_type
        ),
        stats: ExtractionStats::default(),
    }
}

pub(crate) fn describe_archive(file: &SourceFile) -> Extracted {
    Extracted {
        content: format!(
            "[Archive file: {}]\nSize: {}\nType: {}\n\nNote: This is an archive file (ZIP, RAR, etc.). I cannot extract or read the contents of archive files directly. Please extract the files and upload them individually if you need me to analyze their contents.",
            file.name,
            file.size_label(),
            file.mime_type
        ),
        stats: ExtractionStats::default(),
    }
}
