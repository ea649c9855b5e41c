/// Decoded spreadsheet contents: one header row plus every non-null data row,
/// in original top-to-bottom order. The API crate fills this from the
/// uploaded workbook; the parser and ingestion validator only ever see this
/// shape.
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    /// Raw header cell text, one entry per column (row 0).
    pub header: Vec<String>,
    pub rows: Vec<SheetRow>,
}

/// One data row. Cells are trimmed; blank cells are `None`.
#[derive(Debug, Clone, Default)]
pub struct SheetRow {
    cells: Vec<Option<String>>,
}

impl SheetRow {
    /// Build a row from raw cell text; whitespace-only cells become blank.
    pub fn new(raw: Vec<Option<String>>) -> Self {
        let cells = raw
            .into_iter()
            .map(|c| c.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
            .collect();
        Self { cells }
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index)?.as_deref()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_blanks_cells() {
        let row = SheetRow::new(vec![
            Some(" India ".to_string()),
            Some("   ".to_string()),
            None,
        ]);
        assert_eq!(row.cell(0), Some("India"));
        assert_eq!(row.cell(1), None);
        assert_eq!(row.cell(2), None);
        assert_eq!(row.cell(7), None);
        assert!(!row.is_blank());
        assert!(SheetRow::new(vec![None, Some(" ".to_string())]).is_blank());
    }
}
