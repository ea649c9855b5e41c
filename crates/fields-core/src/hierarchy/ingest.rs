//! Spreadsheet ingestion validation.
//!
//! Runs before parsing for both master-list create and update: checks the
//! uploaded file itself, the caller's level metadata, and the cross-mapping
//! between spreadsheet headers and declared levels. Every rejection carries a
//! stable machine code surfaced in the error envelope.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::models::custom_field::keys;
use crate::models::SheetData;

/// Upload allow-lists and the level ceiling, from configuration.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    pub max_levels: usize,
}

/// One declared hierarchy level from the caller's `customFieldData` metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMeta {
    pub attribute_name: String,
    /// Display label (`name`); falls back to the attribute key when absent.
    pub label: Option<String>,
    pub level: i64,
}

impl LevelMeta {
    pub fn label_or_attribute(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.attribute_name)
    }
}

/// Result of a successful header validation: the attribute key per column and
/// the attribute-to-label map handed to the parser.
#[derive(Debug, Clone)]
pub struct ValidatedSheet {
    pub headers: Vec<String>,
    pub attribute_labels: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("uploaded file is absent or empty")]
    UploadedFileEmpty,

    #[error("unsupported file type '{0}'; only Excel files are allowed")]
    UnsupportedFileType(String),

    #[error("customFieldData must be a non-empty array of level definitions")]
    InvalidMetadata,

    #[error("hierarchy declares more than the maximum of {max} levels")]
    LevelLimitExceeded { max: usize },

    #[error("spreadsheet has no header row")]
    MissingHeaderRow,

    #[error("spreadsheet has {actual} columns but the metadata declares {expected} levels")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("spreadsheet has {actual} columns, more than the maximum of {max}")]
    ColumnLimitExceeded { max: usize, actual: usize },

    #[error("header '{header}' in column {column} does not match any declared level")]
    HeaderNotRecognized { column: usize, header: String },

    #[error(
        "header '{header}' in column {column} resolves to attribute '{resolved}', expected '{expected}'"
    )]
    HeaderMismatch {
        column: usize,
        header: String,
        resolved: String,
        expected: String,
    },

    #[error("column {column} declares level {declared}, expected {column}")]
    LevelMismatch { column: usize, declared: i64 },
}

impl IngestError {
    /// Stable machine code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::UploadedFileEmpty => "UPLOADED_FILE_EMPTY",
            IngestError::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            IngestError::InvalidMetadata => "INVALID_METADATA",
            IngestError::LevelLimitExceeded { .. } => "LEVEL_LIMIT_EXCEEDED",
            IngestError::MissingHeaderRow => "MISSING_HEADER_ROW",
            IngestError::ColumnCountMismatch { .. } => "COLUMN_COUNT_MISMATCH",
            IngestError::ColumnLimitExceeded { .. } => "COLUMN_LIMIT_EXCEEDED",
            IngestError::HeaderNotRecognized { .. } => "HEADER_NOT_RECOGNIZED",
            IngestError::HeaderMismatch { .. } => "HEADER_MISMATCH",
            IngestError::LevelMismatch { .. } => "LEVEL_MISMATCH",
        }
    }
}

/// Check the uploaded file: present, non-empty, allow-listed extension and
/// declared content type.
pub fn check_upload(
    file_name: Option<&str>,
    content_type: Option<&str>,
    size: usize,
    policy: &UploadPolicy,
) -> Result<(), IngestError> {
    if size == 0 {
        return Err(IngestError::UploadedFileEmpty);
    }

    let name = file_name.ok_or(IngestError::UploadedFileEmpty)?;
    let extension_ok = policy
        .allowed_extensions
        .iter()
        .any(|ext| name.to_lowercase().ends_with(&ext.to_lowercase()));
    if !extension_ok {
        return Err(IngestError::UnsupportedFileType(name.to_string()));
    }

    let declared = content_type.unwrap_or_default();
    let content_type_ok = policy
        .allowed_content_types
        .iter()
        .any(|allowed| allowed == declared);
    if !content_type_ok {
        return Err(IngestError::UnsupportedFileType(declared.to_string()));
    }

    Ok(())
}

/// Parse the metadata's `customFieldData` array into level declarations.
/// Every entry must carry `attributeName` and `level`.
pub fn parse_level_metadata(custom_field_data: Option<&JsonValue>) -> Result<Vec<LevelMeta>, IngestError> {
    let entries = custom_field_data
        .and_then(JsonValue::as_array)
        .filter(|a| !a.is_empty())
        .ok_or(IngestError::InvalidMetadata)?;

    entries
        .iter()
        .map(|entry| {
            let attribute_name = entry
                .get(keys::ATTRIBUTE_NAME)
                .and_then(JsonValue::as_str)
                .filter(|s| !s.trim().is_empty())
                .ok_or(IngestError::InvalidMetadata)?;
            let level = entry
                .get(keys::LEVEL)
                .and_then(JsonValue::as_i64)
                .ok_or(IngestError::InvalidMetadata)?;
            let label = entry
                .get(keys::NAME)
                .and_then(JsonValue::as_str)
                .map(str::to_string);
            Ok(LevelMeta {
                attribute_name: attribute_name.to_string(),
                label,
                level,
            })
        })
        .collect()
}

/// Validate the decoded sheet against the declared levels.
///
/// Column count must exactly equal the declared level count, and must also
/// stay within the configured maximum. Header text resolves to an attribute
/// key case-insensitively through the declared labels (or the attribute keys
/// themselves); the resolved attribute must match the declaration at that
/// position and the declared level must be the 1-indexed column number.
pub fn validate_sheet(
    sheet: &SheetData,
    levels: &[LevelMeta],
    policy: &UploadPolicy,
) -> Result<ValidatedSheet, IngestError> {
    if levels.is_empty() {
        return Err(IngestError::InvalidMetadata);
    }
    if levels.len() > policy.max_levels {
        return Err(IngestError::LevelLimitExceeded {
            max: policy.max_levels,
        });
    }
    if sheet.header.is_empty() {
        return Err(IngestError::MissingHeaderRow);
    }

    let columns = sheet.header.len();
    // Column cap first, so an over-wide sheet reports the cap rather than a
    // count mismatch.
    if columns > policy.max_levels {
        return Err(IngestError::ColumnLimitExceeded {
            max: policy.max_levels,
            actual: columns,
        });
    }
    if columns != levels.len() {
        return Err(IngestError::ColumnCountMismatch {
            expected: levels.len(),
            actual: columns,
        });
    }

    // label (or attribute key) lowercased -> attribute key
    let mut resolve: HashMap<String, String> = HashMap::new();
    for meta in levels {
        resolve.insert(
            meta.label_or_attribute().to_lowercase(),
            meta.attribute_name.clone(),
        );
        resolve.insert(
            meta.attribute_name.to_lowercase(),
            meta.attribute_name.clone(),
        );
    }

    let mut headers = Vec::with_capacity(columns);
    for (i, raw_header) in sheet.header.iter().enumerate() {
        let header = raw_header.trim();
        let column = i + 1;

        let resolved = resolve.get(&header.to_lowercase()).ok_or_else(|| {
            IngestError::HeaderNotRecognized {
                column,
                header: header.to_string(),
            }
        })?;

        let expected = &levels[i].attribute_name;
        if resolved != expected {
            return Err(IngestError::HeaderMismatch {
                column,
                header: header.to_string(),
                resolved: resolved.clone(),
                expected: expected.clone(),
            });
        }
        if levels[i].level != column as i64 {
            return Err(IngestError::LevelMismatch {
                column,
                declared: levels[i].level,
            });
        }

        headers.push(resolved.clone());
    }

    let attribute_labels = levels
        .iter()
        .map(|meta| {
            (
                meta.attribute_name.clone(),
                meta.label_or_attribute().to_string(),
            )
        })
        .collect();

    Ok(ValidatedSheet {
        headers,
        attribute_labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SheetRow;
    use serde_json::json;

    fn policy() -> UploadPolicy {
        UploadPolicy {
            allowed_extensions: vec![".xlsx".to_string(), ".xls".to_string()],
            allowed_content_types: vec![
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ],
            max_levels: 4,
        }
    }

    fn sheet(header: &[&str]) -> SheetData {
        SheetData {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: vec![SheetRow::new(vec![Some("x".to_string())])],
        }
    }

    fn levels(defs: &[(&str, &str, i64)]) -> Vec<LevelMeta> {
        defs.iter()
            .map(|(attr, label, level)| LevelMeta {
                attribute_name: attr.to_string(),
                label: Some(label.to_string()),
                level: *level,
            })
            .collect()
    }

    #[test]
    fn test_check_upload_rejects_empty_file() {
        let err = check_upload(Some("a.xlsx"), Some("application/vnd.ms-excel"), 0, &policy());
        assert_eq!(err, Err(IngestError::UploadedFileEmpty));
    }

    #[test]
    fn test_check_upload_rejects_wrong_extension() {
        let err = check_upload(
            Some("a.csv"),
            Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            10,
            &policy(),
        );
        assert!(matches!(err, Err(IngestError::UnsupportedFileType(_))));
    }

    #[test]
    fn test_check_upload_rejects_wrong_content_type() {
        let err = check_upload(Some("a.xlsx"), Some("text/csv"), 10, &policy());
        assert!(matches!(err, Err(IngestError::UnsupportedFileType(_))));
    }

    #[test]
    fn test_check_upload_accepts_allowed_file() {
        let ok = check_upload(
            Some("master.XLSX"),
            Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            10,
            &policy(),
        );
        assert_eq!(ok, Ok(()));
    }

    #[test]
    fn test_parse_level_metadata_rejects_missing_or_empty_array() {
        assert_eq!(
            parse_level_metadata(None),
            Err(IngestError::InvalidMetadata)
        );
        assert_eq!(
            parse_level_metadata(Some(&json!([]))),
            Err(IngestError::InvalidMetadata)
        );
        assert_eq!(
            parse_level_metadata(Some(&json!([{"name": "Country"}]))),
            Err(IngestError::InvalidMetadata)
        );
    }

    #[test]
    fn test_parse_level_metadata_reads_levels() {
        let metas = parse_level_metadata(Some(&json!([
            {"name": "Country", "attributeName": "country", "level": 1},
            {"attributeName": "state", "level": 2},
        ])))
        .expect("valid metadata");
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].label_or_attribute(), "Country");
        assert_eq!(metas[1].label_or_attribute(), "state");
    }

    #[test]
    fn test_validate_sheet_rejects_missing_header_row() {
        let empty = SheetData::default();
        let err = validate_sheet(&empty, &levels(&[("country", "Country", 1)]), &policy());
        assert_eq!(err.unwrap_err(), IngestError::MissingHeaderRow);
    }

    #[test]
    fn test_validate_sheet_requires_exact_column_count() {
        let err = validate_sheet(
            &sheet(&["Country"]),
            &levels(&[("country", "Country", 1), ("state", "State", 2)]),
            &policy(),
        );
        assert_eq!(
            err.unwrap_err(),
            IngestError::ColumnCountMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_validate_sheet_rejects_level_limit() {
        let err = validate_sheet(
            &sheet(&["A", "B", "C", "D", "E"]),
            &levels(&[
                ("a", "A", 1),
                ("b", "B", 2),
                ("c", "C", 3),
                ("d", "D", 4),
                ("e", "E", 5),
            ]),
            &policy(),
        );
        assert_eq!(err.unwrap_err(), IngestError::LevelLimitExceeded { max: 4 });
    }

    #[test]
    fn test_validate_sheet_rejects_over_wide_sheet_with_column_limit() {
        // Declared levels are within the cap; the sheet alone is too wide.
        // The cap wins over the count mismatch.
        let err = validate_sheet(
            &sheet(&["A", "B", "C", "D", "E"]),
            &levels(&[("a", "A", 1), ("b", "B", 2), ("c", "C", 3), ("d", "D", 4)]),
            &policy(),
        );
        assert_eq!(
            err.unwrap_err(),
            IngestError::ColumnLimitExceeded { max: 4, actual: 5 }
        );
    }

    #[test]
    fn test_validate_sheet_rejects_unknown_header() {
        let err = validate_sheet(
            &sheet(&["Continent"]),
            &levels(&[("country", "Country", 1)]),
            &policy(),
        );
        assert_eq!(
            err.unwrap_err(),
            IngestError::HeaderNotRecognized {
                column: 1,
                header: "Continent".to_string()
            }
        );
    }

    #[test]
    fn test_validate_sheet_rejects_header_in_wrong_column() {
        let err = validate_sheet(
            &sheet(&["State", "Country"]),
            &levels(&[("country", "Country", 1), ("state", "State", 2)]),
            &policy(),
        );
        assert_eq!(
            err.unwrap_err(),
            IngestError::HeaderMismatch {
                column: 1,
                header: "State".to_string(),
                resolved: "state".to_string(),
                expected: "country".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_sheet_rejects_out_of_order_levels() {
        let err = validate_sheet(
            &sheet(&["Country", "State"]),
            &levels(&[("country", "Country", 1), ("state", "State", 3)]),
            &policy(),
        );
        assert_eq!(
            err.unwrap_err(),
            IngestError::LevelMismatch {
                column: 2,
                declared: 3
            }
        );
    }

    #[test]
    fn test_validate_sheet_resolves_labels_case_insensitively() {
        let validated = validate_sheet(
            &sheet(&["COUNTRY", "state"]),
            &levels(&[("country", "Country", 1), ("state", "State", 2)]),
            &policy(),
        )
        .expect("valid sheet");
        assert_eq!(validated.headers, vec!["country", "state"]);
        assert_eq!(
            validated.attribute_labels.get("country").map(String::as_str),
            Some("Country")
        );
    }
}
