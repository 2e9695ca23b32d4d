//! Renders extraction outcomes as a prompt section for the AI.

use super::{ExtractionOutcome, kilobytes};
use std::fmt::Write;

/// Formats every outcome as a `=== File i: name ===` block.
///
/// Failed files are included too, so the assistant can tell the user which
/// attachment could not be read.
pub fn format_for_ai(outcomes: &[ExtractionOutcome]) -> String {
    let mut out = String::new();

    for (index, outcome) in outcomes.iter().enumerate() {
        let _ = writeln!(out, "=== File {}: {} ===", index + 1, outcome.file_info.name);
        let _ = writeln!(out, "Type: {}", outcome.category.as_str().to_uppercase());
        let _ = writeln!(out, "Size: {}", kilobytes(outcome.file_info.size));

        if outcome.success {
            out.push_str("Status: Successfully processed\n");
            let _ = writeln!(out, "Content:\n{}", outcome.content.as_deref().unwrap_or_default());

            let stats = &outcome.stats;
            let metadata = [
                ("Word Count", stats.word_count),
                ("Character Count", stats.char_count),
                ("Pages", stats.page_count),
                ("Sheets", stats.sheet_count),
                ("Rows", stats.total_rows.or(stats.row_count)),
            ];
            for (label, value) in metadata {
                if let Some(value) = value.filter(|value| *value > 0) {
                    let _ = writeln!(out, "{label}: {value}");
                }
            }
        } else {
            out.push_str("Status: Failed to process\n");
            let _ = writeln!(out, "Error: {}", outcome.error.as_deref().unwrap_or("Unknown error"));
            if let Some(fallback) = &outcome.fallback_content {
                let _ = writeln!(out, "Fallback Information:\n{fallback}");
            }
        }

        out.push_str("\n---\n\n");
    }

    out.trim().to_string()
}
