//! Raw text of Word documents: the paragraphs of `word/document.xml`.

use super::{Extracted, ExtractionFailure, ExtractionStats, SourceFile};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use zip::ZipArchive;

pub(crate) fn extract(file: &SourceFile) -> Result<Extracted, ExtractionFailure> {
    if file.extension() == "doc" {
        return Err(ExtractionFailure::new(
            "Failed to read Word document: legacy .doc files are not supported, save it as .docx",
        ));
    }

    let xml = document_xml(&file.bytes)
        .map_err(|err| ExtractionFailure::new(format!("Failed to read Word document: {err}")))?;
    let content = paragraphs(&xml)
        .map_err(|err| ExtractionFailure::new(format!("Failed to read Word document: {err}")))?;

    Ok(Extracted {
        stats: ExtractionStats::for_text(&content),
        content,
    })
}

fn document_xml(bytes: &[u8]) -> Result<String, String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|err| err.to_string())?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|_| "word/document.xml is missing".to_string())?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|err| err.to_string())?;
    Ok(xml)
}

/// Text runs (`w:t`) joined per paragraph (`w:p`), one paragraph per line.
fn paragraphs(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut in_text = false;
    let mut current = String::new();
    let mut lines = Vec::new();

    loop {
        match reader.read_event().map_err(|err| err.to_string())? {
            Event::Start(element) if element.name().as_ref() == b"w:t" => in_text = true,
            Event::End(element) => match element.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => lines.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(element) => match element.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => lines.push(String::new()),
                _ => {}
            },
            Event::Text(text) if in_text => {
                current.push_str(&text.unescape().map_err(|err| err.to_string())?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines.join("\n").trim().to_string())
}
