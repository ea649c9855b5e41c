//! Workbook decoding.
//!
//! Turns an uploaded xlsx/xls payload into the neutral `SheetData` shape the
//! ingestion validator and parser consume. Only the first worksheet is read;
//! row 0 is the header.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use fields_core::models::{SheetData, SheetRow};
use fields_core::{AppError, IngestError};

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            // Excel stores integers as floats; render 42.0 as "42".
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Decode the first worksheet of an uploaded workbook.
pub fn decode_workbook(bytes: &[u8]) -> Result<SheetData, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::BadRequest(format!("Unable to read spreadsheet: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(AppError::Ingest(IngestError::MissingHeaderRow))?
        .map_err(|e| AppError::BadRequest(format!("Unable to read spreadsheet: {}", e)))?;

    let mut rows = range.rows();

    let header = rows
        .next()
        .ok_or(AppError::Ingest(IngestError::MissingHeaderRow))?
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default().trim().to_string())
        .collect();

    let rows = rows
        .map(|row| SheetRow::new(row.iter().map(cell_text).collect()))
        .collect();

    Ok(SheetData { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_variants() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("India".to_string())), Some("India".to_string()));
        assert_eq!(cell_text(&Data::Float(42.0)), Some("42".to_string()));
        assert_eq!(cell_text(&Data::Float(1.5)), Some("1.5".to_string()));
        assert_eq!(cell_text(&Data::Int(7)), Some("7".to_string()));
        assert_eq!(cell_text(&Data::Bool(true)), Some("true".to_string()));
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let err = decode_workbook(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
