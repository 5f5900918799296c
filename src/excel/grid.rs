//! In-memory worksheet the layout is built on before it is written out.
//!
//! Rows and columns are 1-based. Every row carries a stable [`RowKey`] so
//! formulas keep pointing at the right cells while rows are inserted above
//! them; references are turned into A1 addresses only when rendered.

use super::reader::SheetData;
use super::styles::CellStyle;
use crate::error::{BridgeError, BridgeResult};
use crate::types::CellValue;
use std::collections::{BTreeMap, BTreeSet};

/// Stable identity of a grid row, independent of its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(u64);

/// Formula kept in symbolic form until the sheet is written.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// `=C12`
    Ref { row: RowKey, col: u16 },
    /// `=SUBTOTAL(9,C5:C9)`
    Subtotal { col: u16, first: RowKey, last: RowKey },
}

/// A cell: its value (the cached result for formulas), formula and style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridCell {
    pub value: CellValue,
    pub formula: Option<FormulaExpr>,
    pub style: Option<CellStyle>,
}

#[derive(Debug, Clone)]
pub struct GridRow {
    key: RowKey,
    cells: BTreeMap<u16, GridCell>,
    hidden: bool,
    outline: u8,
}

impl GridRow {
    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn cells(&self) -> impl Iterator<Item = (u16, &GridCell)> {
        self.cells.iter().map(|(col, cell)| (*col, cell))
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn outline(&self) -> u8 {
        self.outline
    }
}

/// Cells merged across one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub row: RowKey,
    pub first_col: u16,
    pub last_col: u16,
}

/// Spreadsheet column letters for a 1-based column index.
pub fn column_letter(col: u16) -> String {
    let mut n = col as u32;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[derive(Debug, Clone)]
pub struct SheetGrid {
    name: String,
    rows: Vec<GridRow>,
    next_key: u64,
    hidden_columns: BTreeSet<u16>,
    merges: Vec<Merge>,
    frozen_rows: u32,
    protected: bool,
    collapsed: bool,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            next_key: 0,
            hidden_columns: BTreeSet::new(),
            merges: Vec::new(),
            frozen_rows: 0,
            protected: false,
            collapsed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Highest column holding a cell.
    pub fn column_count(&self) -> u16 {
        self.rows
            .iter()
            .filter_map(|r| r.cells.keys().next_back().copied())
            .max()
            .unwrap_or(0)
    }

    fn new_row(&mut self) -> GridRow {
        let key = RowKey(self.next_key);
        self.next_key += 1;
        GridRow {
            key,
            cells: BTreeMap::new(),
            hidden: false,
            outline: 0,
        }
    }

    /// Append a row and return its index.
    pub fn push_row(&mut self) -> u32 {
        let row = self.new_row();
        self.rows.push(row);
        self.row_count()
    }

    /// Grow the sheet so that `row` exists.
    pub fn ensure_row(&mut self, row: u32) {
        while self.row_count() < row {
            self.push_row();
        }
    }

    /// Insert an empty row at `row`, shifting that row and everything below it
    /// down by one.
    pub fn insert_row(&mut self, row: u32) -> u32 {
        let at = (row.max(1) as usize - 1).min(self.rows.len());
        let new_row = self.new_row();
        self.rows.insert(at, new_row);
        at as u32 + 1
    }

    pub fn key(&self, row: u32) -> Option<RowKey> {
        self.row_ref(row).map(|r| r.key)
    }

    /// Current 1-based position of a keyed row.
    pub fn row_of(&self, key: RowKey) -> Option<u32> {
        self.rows
            .iter()
            .position(|r| r.key == key)
            .map(|i| i as u32 + 1)
    }

    fn row_ref(&self, row: u32) -> Option<&GridRow> {
        if row == 0 {
            return None;
        }
        self.rows.get(row as usize - 1)
    }

    fn row_mut(&mut self, row: u32) -> &mut GridRow {
        self.ensure_row(row.max(1));
        &mut self.rows[row.max(1) as usize - 1]
    }

    fn cell_mut(&mut self, row: u32, col: u16) -> &mut GridCell {
        self.row_mut(row).cells.entry(col).or_default()
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&GridCell> {
        self.row_ref(row)?.cells.get(&col)
    }

    /// Displayed value; the cached result for formula cells.
    pub fn value(&self, row: u32, col: u16) -> CellValue {
        self.cell(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let cell = self.cell_mut(row, col);
        cell.value = value;
        cell.formula = None;
    }

    pub fn set_formula(&mut self, row: u32, col: u16, formula: FormulaExpr, cached: CellValue) {
        let cell = self.cell_mut(row, col);
        cell.value = cached;
        cell.formula = Some(formula);
    }

    pub fn formula(&self, row: u32, col: u16) -> Option<&FormulaExpr> {
        self.cell(row, col)?.formula.as_ref()
    }

    pub fn set_style(&mut self, row: u32, col: u16, style: CellStyle) {
        self.cell_mut(row, col).style = Some(style);
    }

    pub fn style(&self, row: u32, col: u16) -> Option<&CellStyle> {
        self.cell(row, col)?.style.as_ref()
    }

    /// Apply `style` to columns `first..=last` of `row`.
    pub fn style_row(&mut self, row: u32, first: u16, last: u16, style: &CellStyle) {
        for col in first..=last {
            self.set_style(row, col, style.clone());
        }
    }

    pub fn hide_row(&mut self, row: u32) {
        self.row_mut(row).hidden = true;
    }

    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.row_ref(row).is_some_and(|r| r.hidden)
    }

    pub fn hide_column(&mut self, col: u16) {
        self.hidden_columns.insert(col);
    }

    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.hidden_columns.contains(&col)
    }

    pub fn hidden_columns(&self) -> impl Iterator<Item = u16> + '_ {
        self.hidden_columns.iter().copied()
    }

    pub fn set_outline(&mut self, row: u32, level: u8) {
        self.row_mut(row).outline = level;
    }

    pub fn outline(&self, row: u32) -> u8 {
        self.row_ref(row).map_or(0, |r| r.outline)
    }

    /// Collapse the innermost outline level when the sheet is opened.
    pub fn collapse_outline(&mut self) {
        self.collapsed = true;
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Merge `first_col..=last_col` on `row`. A span of one cell is not a
    /// merge and is ignored.
    pub fn merge(&mut self, row: u32, first_col: u16, last_col: u16) {
        self.ensure_row(row);
        if last_col <= first_col {
            return;
        }
        if let Some(key) = self.key(row) {
            self.merges.push(Merge {
                row: key,
                first_col,
                last_col,
            });
        }
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Keep the first `rows` rows in view while scrolling.
    pub fn freeze_rows(&mut self, rows: u32) {
        self.frozen_rows = rows;
    }

    pub fn frozen_rows(&self) -> u32 {
        self.frozen_rows
    }

    pub fn protect(&mut self) {
        self.protected = true;
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// A1-style rendering of a symbolic formula at the current row positions.
    pub fn render_formula(&self, formula: &FormulaExpr) -> BridgeResult<String> {
        let position = |key: RowKey| {
            self.row_of(key).ok_or_else(|| {
                BridgeError::Export(format!("Formula references a removed row in '{}'", self.name))
            })
        };
        Ok(match formula {
            FormulaExpr::Ref { row, col } => {
                format!("={}{}", column_letter(*col), position(*row)?)
            }
            FormulaExpr::Subtotal { col, first, last } => {
                let letter = column_letter(*col);
                format!(
                    "=SUBTOTAL(9,{}{}:{}{})",
                    letter,
                    position(*first)?,
                    letter,
                    position(*last)?
                )
            }
        })
    }

    /// Rendered formula text of a cell, if it holds one.
    pub fn formula_text(&self, row: u32, col: u16) -> Option<String> {
        self.formula(row, col)
            .and_then(|f| self.render_formula(f).ok())
    }

    /// The values a reader would see after the sheet is written and opened
    /// again.
    pub fn to_sheet_data(&self) -> SheetData {
        let width = self.column_count() as usize;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = vec![CellValue::Empty; width];
                for (col, cell) in &row.cells {
                    values[*col as usize - 1] = match &cell.value {
                        CellValue::Text(s) if s.is_empty() => CellValue::Empty,
                        other => other.clone(),
                    };
                }
                values
            })
            .collect();
        SheetData::new(self.name.clone(), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn test_insert_shifts_rows_and_keeps_keys() {
        let mut grid = SheetGrid::new("S");
        grid.ensure_row(3);
        grid.set_value(2, 1, CellValue::text("b"));
        let key = grid.key(2).unwrap();
        assert_eq!(grid.insert_row(2), 2);
        assert_eq!(grid.row_of(key), Some(3));
        assert_eq!(grid.value(3, 1), CellValue::text("b"));
        assert_eq!(grid.value(2, 1), CellValue::Empty);
        assert_eq!(grid.row_count(), 4);
    }

    #[test]
    fn test_formulas_follow_inserted_rows() {
        let mut grid = SheetGrid::new("S");
        grid.ensure_row(6);
        let first = grid.key(5).unwrap();
        let last = grid.key(6).unwrap();
        grid.set_formula(
            7,
            3,
            FormulaExpr::Subtotal { col: 3, first, last },
            CellValue::Number(5.0),
        );
        assert_eq!(grid.formula_text(7, 3).as_deref(), Some("=SUBTOTAL(9,C5:C6)"));
        grid.insert_row(1);
        assert_eq!(grid.formula_text(8, 3).as_deref(), Some("=SUBTOTAL(9,C6:C7)"));
        assert_eq!(grid.value(8, 3), CellValue::Number(5.0));
    }

    #[test]
    fn test_reference_formula() {
        let mut grid = SheetGrid::new("S");
        grid.set_value(4, 2, CellValue::text("x"));
        let row = grid.key(4).unwrap();
        grid.set_formula(9, 2, FormulaExpr::Ref { row, col: 2 }, CellValue::text("x"));
        assert_eq!(grid.formula_text(9, 2).as_deref(), Some("=B4"));
    }

    #[test]
    fn test_sheet_data_view() {
        let mut grid = SheetGrid::new("S");
        grid.set_value(1, 1, CellValue::text("id"));
        grid.set_value(2, 3, CellValue::Number(2.5));
        grid.set_value(2, 2, CellValue::text(""));
        let data = grid.to_sheet_data();
        assert_eq!(data.identity(), "id");
        assert_eq!(data.value(2, 3), CellValue::Number(2.5));
        assert_eq!(data.value(2, 2), CellValue::Empty);
        assert_eq!(data.column_count(), 3);
    }

    #[test]
    fn test_single_cell_merge_is_ignored() {
        let mut grid = SheetGrid::new("S");
        grid.merge(2, 1, 1);
        assert!(grid.merges().is_empty());
        assert_eq!(grid.row_count(), 2);
        grid.merge(3, 1, 4);
        assert_eq!(grid.merges().len(), 1);
    }

    #[test]
    fn test_hidden_rows_columns_and_outline() {
        let mut grid = SheetGrid::new("S");
        grid.hide_row(1);
        grid.hide_column(2);
        grid.set_outline(3, 2);
        assert!(grid.is_row_hidden(1));
        assert!(!grid.is_row_hidden(2));
        assert!(grid.is_column_hidden(2));
        assert_eq!(grid.outline(3), 2);
        assert_eq!(grid.outline(10), 0);
    }
}
