use super::{Extracted, ExtractionFailure, ExtractionStats, SourceFile};

/// Plain text and source code. Invalid UTF-8 is replaced, not rejected.
pub(crate) fn extract(file: &SourceFile) -> Result<Extracted, ExtractionFailure> {
    let content = String::from_utf8_lossy(&file.bytes).into_owned();
    Ok(Extracted {
        stats: ExtractionStats::for_text(&content),
        content,
    })
}
