//! CSV extraction with the first line as header.

use super::excel::PREVIEW_ROWS;
use super::{Extracted, ExtractionFailure, ExtractionStats, SourceFile};
use csv::ReaderBuilder;
use serde_json::{Map, Value};

pub(crate) fn extract(file: &SourceFile) -> Result<Extracted, ExtractionFailure> {
    let failure = |err: csv::Error| ExtractionFailure::new(format!("Failed to read CSV file: {err}"));

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file.bytes.as_slice());

    let headers: Vec<String> = reader
        .headers()
        .map_err(failure)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(failure)?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, field)| (header.clone(), Value::String(field.to_string())))
            .collect();
        rows.push(Value::Object(row));
    }

    let columns = if headers.is_empty() {
        "No headers".to_string()
    } else {
        headers.join(", ")
    };

    let mut content = String::from("CSV Analysis:\n");
    content.push_str(&format!("Total Rows: {}\n", rows.len()));
    content.push_str(&format!("Columns: {columns}\n\n"));

    let preview = &rows[..rows.len().min(PREVIEW_ROWS)];
    content.push_str(&format!("Preview (first {} rows):\n", preview.len()));
    for (index, row) in preview.iter().enumerate() {
        content.push_str(&format!("Row {}: {}\n", index + 1, row));
    }
    if rows.len() > PREVIEW_ROWS {
        content.push_str(&format!("... and {} more rows\n", rows.len() - PREVIEW_ROWS));
    }

    Ok(Extracted {
        content: content.trim().to_string(),
        stats: ExtractionStats {
            row_count: Some(rows.len()),
            column_count: Some(headers.len()),
            ..ExtractionStats::default()
        },
    })
}
