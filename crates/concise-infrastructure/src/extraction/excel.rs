//! Spreadsheet extraction: every sheet as row arrays, first rows only.

use super::{Extracted, ExtractionFailure, ExtractionStats, SourceFile};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde_json::Value;
use std::io::Cursor;

pub(crate) const PREVIEW_ROWS: usize = 10;

pub(crate) fn extract(file: &SourceFile) -> Result<Extracted, ExtractionFailure> {
    let failure = |err: calamine::Error| {
        ExtractionFailure::new(format!("Failed to read Excel file: {err}"))
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(file.bytes.clone())).map_err(failure)?;
    let sheet_names = workbook.sheet_names();

    let mut content = String::new();
    let mut total_rows = 0;
    for sheet_name in &sheet_names {
        let range = workbook.worksheet_range(sheet_name).map_err(failure)?;
        let rows: Vec<Value> = range
            .rows()
            .map(|row| Value::Array(row.iter().map(cell_value).collect()))
            .collect();
        total_rows += rows.len();

        content.push_str(&format!("Sheet: {sheet_name}\n"));
        content.push_str(&format!("Rows: {}\n", rows.len()));
        content.push_str("Data:\n");
        for (index, row) in rows.iter().take(PREVIEW_ROWS).enumerate() {
            content.push_str(&format!("Row {}: {}\n", index + 1, row));
        }
        if rows.len() > PREVIEW_ROWS {
            content.push_str(&format!("... and {} more rows\n", rows.len() - PREVIEW_ROWS));
        }
        content.push('\n');
    }

    Ok(Extracted {
        content: content.trim().to_string(),
        stats: ExtractionStats {
            sheet_count: Some(sheet_names.len()),
            total_rows: Some(total_rows),
            ..ExtractionStats::default()
        },
    })
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Bool(value) => Value::Bool(*value),
        Data::Int(value) => Value::from(*value),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            Value::from(*value as i64)
        }
        Data::Float(value) => Value::from(*value),
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            Value::String(value.clone())
        }
        Data::DateTime(value) => Value::from(value.as_f64()),
        Data::Error(err) => Value::String(format!("{err:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_values_render_like_json() {
        let row = Value::Array(
            [
                Data::String("Total".to_string()),
                Data::Float(3.0),
                Data::Float(2.5),
                Data::Empty,
                Data::Bool(true),
            ]
            .iter()
            .map(cell_value)
            .collect(),
        );
        assert_eq!(row.to_string(), r#"["Total",3,2.5,null,true]"#);
    }

    #[test]
    fn test_garbage_is_a_failure() {
        let file = SourceFile::from_bytes("sheet.xlsx", b"definitely not a workbook".to_vec());
        let failure = match extract(&file) {
            Err(failure) => failure,
            Ok(_) => panic!("should fail"),
        };
        assert!(failure.message.starts_with("Failed to read Excel file:"));
    }
}
