//! Flat in-memory table built from a schedule before layout.

use crate::types::CellValue;

/// Column 0: element unique id.
pub const ID_COLUMN: &str = "ID";
/// Column 1: "Family: Type" label of the element's type.
pub const FAMILY_AND_TYPE_COLUMN: &str = "FamilyAndType";

/// One element row. `locked[i]` is the resolved read-only state of cell `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub values: Vec<CellValue>,
    pub locked: Vec<bool>,
}

impl FlatRow {
    pub fn new(width: usize) -> Self {
        Self {
            values: vec![CellValue::Empty; width],
            locked: vec![true; width],
        }
    }

    pub fn set(&mut self, column: usize, value: CellValue, locked: bool) {
        self.values[column] = value;
        self.locked[column] = locked;
    }

    /// Element unique id held in column 0.
    pub fn id(&self) -> String {
        self.values.first().map(|v| v.as_text()).unwrap_or_default()
    }

    pub fn family_and_type(&self) -> String {
        self.values.get(1).map(|v| v.as_text()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<FlatRow>,
}

impl FlatTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column lookup by trimmed, case-insensitive name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.columns
            .iter()
            .position(|c| c.trim().to_lowercase() == wanted)
    }

    pub fn push(&mut self, row: FlatRow) {
        self.rows.push(row);
    }
}

/// Make column names unique: later duplicates become `Name(1)`, `Name(2)`, ...
/// The same scheme is used when matching sheet headers on import.
pub fn dedupe_names<'a>(names: impl IntoIterator<Item = &'a str>, taken: &[&str]) -> Vec<String> {
    let mut seen: Vec<String> = taken.iter().map(|s| s.to_string()).collect();
    let mut out = Vec::new();
    for name in names {
        let mut candidate = name.to_string();
        let mut i = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}({})", name, i);
            i += 1;
        }
        seen.push(candidate.clone());
        out.push(candidate);
    }
    out
}
