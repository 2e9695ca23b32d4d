//! PDF text extraction, page by page, using lopdf.

use super::{Extracted, ExtractionFailure, ExtractionStats, SourceFile};
use lopdf::Document;

pub(crate) fn extract(file: &SourceFile) -> Result<Extracted, ExtractionFailure> {
    read_pages(&file.bytes).map_err(|reason| ExtractionFailure {
        message: format!(
            "PDF processing failed: {reason}. This might be due to a corrupted PDF or password protection. Please try with a different PDF file."
        ),
        fallback: Some(fallback_description(file)),
    })
}

fn read_pages(bytes: &[u8]) -> Result<Extracted, String> {
    let document = Document::load_mem(bytes).map_err(|err| err.to_string())?;
    if document.is_encrypted() {
        return Err("the document is password protected".to_string());
    }

    let pages = document.get_pages();
    let mut text = String::new();
    for (index, page_number) in pages.keys().enumerate() {
        let page_text = document
            .extract_text(&[*page_number])
            .map_err(|err| format!("page {page_number}: {err}"))?;
        text.push_str(&format!("Page {}:\n{}\n\n", index + 1, page_text.trim()));
    }

    let content = text.trim().to_string();
    Ok(Extracted {
        stats: ExtractionStats {
            page_count: Some(pages.len()),
            ..ExtractionStats::for_text(&content)
        },
        content,
    })
}

fn fallback_description(file: &SourceFile) -> String {
    format!(
        "[PDF file: {}]\nSize: {}\nType: {}\n\nNote: Unable to extract text from this PDF. This could be due to:\n- Password protection\n- Corrupted file\n- PDF contains only images/scanned content\n\nPlease try with a different PDF or describe what you need help with regarding this document.",
        file.name,
        file.size_label(),
        file.mime_type
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_pdf_fails_with_fallback() {
        let file = SourceFile::from_bytes("broken.pdf", b"%PDF-1.4 not really".to_vec());
        let failure = match extract(&file) {
            Err(failure) => failure,
            Ok(_) => panic!("corrupt PDF should not extract"),
        };

        assert!(failure.message.starts_with("PDF processing failed:"));
        let fallback = failure.fallback.unwrap();
        assert!(fallback.starts_with("[PDF file: broken.pdf]"));
        assert!(fallback.contains("Type: application/pdf"));
    }
}
