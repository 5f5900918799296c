//! Workbook reader - .xlsx → cell values.

use crate::error::{BridgeError, BridgeResult};
use crate::types::CellValue;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::Path;

/// Values of one worksheet, addressed 1-based like the written grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetData {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl SheetData {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self, row: u32, col: u16) -> CellValue {
        if row == 0 || col == 0 {
            return CellValue::Empty;
        }
        self.rows
            .get(row as usize - 1)
            .and_then(|r| r.get(col as usize - 1))
            .cloned()
            .unwrap_or_default()
    }

    /// Trimmed text of a cell.
    pub fn text(&self, row: u32, col: u16) -> String {
        self.value(row, col).as_text().trim().to_string()
    }

    /// Content of A1: the identity anchor of sheets this crate wrote.
    pub fn identity(&self) -> String {
        self.text(1, 1)
    }

    /// Last row holding any cell.
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn column_count(&self) -> u16 {
        self.rows.iter().map(Vec::len).max().unwrap_or(0) as u16
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookData {
    pub sheets: Vec<SheetData>,
}

impl WorkbookData {
    pub fn sheet(&self, name: &str) -> Option<&SheetData> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::text(if *b { "True" } else { "False" }),
        Data::DateTime(d) => CellValue::Number(d.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn to_sheet_data(name: &str, range: &Range<Data>) -> SheetData {
    let Some((last_row, last_col)) = range.end() else {
        return SheetData::new(name, Vec::new());
    };
    // Positions are absolute so that row 1 stays row 1 even when A1 is blank.
    let rows = (0..=last_row)
        .map(|r| {
            (0..=last_col)
                .map(|c| range.get_value((r, c)).map(to_cell_value).unwrap_or_default())
                .collect()
        })
        .collect();
    SheetData::new(name, rows)
}

/// Read every worksheet of an .xlsx file.
pub fn read_workbook(path: &Path) -> BridgeResult<WorkbookData> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| BridgeError::Import(format!("Failed to open Excel file: {}", e)))?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            BridgeError::Import(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;
        sheets.push(to_sheet_data(&sheet_name, &range));
    }
    Ok(WorkbookData { sheets })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_cells_are_empty() {
        let data = SheetData::new("S", vec![vec![CellValue::text(" id ")]]);
        assert_eq!(data.identity(), "id");
        assert_eq!(data.value(0, 1), CellValue::Empty);
        assert_eq!(data.value(5, 9), CellValue::Empty);
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(to_cell_value(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(to_cell_value(&Data::String(String::new())), CellValue::Empty);
        assert_eq!(to_cell_value(&Data::Bool(true)), CellValue::text("True"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_workbook(&dir.path().join("missing.xlsx"));
        assert!(matches!(result, Err(BridgeError::Import(_))));
    }
}
