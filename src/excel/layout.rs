//! Schedule sheet layout: header rows, per-cell locking, type-column
//! references, grouping with subtotal rows and the grand total.
//!
//! Sheet structure:
//!
//! | row | content |
//! |-----|---------|
//! | 1   | identity in A1 (hidden) |
//! | 2   | machine column names (hidden) |
//! | 3   | column headings |
//! | 4   | value-kind labels |
//! | 5.. | data, subtotal rows, grand total |
//!
//! Columns 1 and 2 hold the element unique id and the family-and-type label
//! and are hidden.

use super::grid::{FormulaExpr, RowKey, SheetGrid};
use super::styles::CellStyle;
use crate::core::table::FlatTable;
use crate::error::{BridgeError, BridgeResult};
use crate::session::CancellationToken;
use crate::types::{CellValue, FieldKind};
use std::collections::HashMap;

pub const IDENTITY_ROW: u32 = 1;
pub const MACHINE_HEADER_ROW: u32 = 2;
pub const HEADING_ROW: u32 = 3;
pub const KIND_ROW: u32 = 4;
pub const FIRST_DATA_ROW: u32 = 5;

/// Text of the merged row shown under sheets holding formula columns.
pub const FORMULA_WARNING: &str =
    "Formula columns are computed by the model and are not imported back.";

/// How one table column is presented.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Machine name written to the hidden header row.
    pub name: String,
    pub heading: String,
    pub kind_label: String,
    /// `None` for the id and family-and-type columns.
    pub field_kind: Option<FieldKind>,
    pub hidden: bool,
    pub totals: bool,
    pub number_format: Option<String>,
}

impl ColumnSpec {
    /// One of the two leading bookkeeping columns.
    pub fn fixed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            heading: name.to_string(),
            kind_label: "Text".to_string(),
            field_kind: None,
            hidden: true,
            totals: false,
            number_format: None,
        }
    }

    /// Columns summed by subtotal and total rows.
    pub fn is_totalled(&self) -> bool {
        self.totals || matches!(self.field_kind, Some(FieldKind::Count | FieldKind::HostCount))
    }

    fn is_formula(&self) -> bool {
        self.field_kind == Some(FieldKind::Formula)
    }

    fn is_type_level(&self) -> bool {
        self.field_kind == Some(FieldKind::ElementType)
    }
}

/// One grouping level; index 0 is the outermost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupLevel {
    /// Index of the grouping column in the table.
    pub column: usize,
    pub show_footer: bool,
}

pub struct ScheduleLayout<'a> {
    pub identity: &'a str,
    pub sheet_name: &'a str,
    pub table: &'a FlatTable,
    pub columns: &'a [ColumnSpec],
    pub groups: &'a [GroupLevel],
    pub itemized: bool,
    /// Last table row index per family-and-type label.
    pub canonical_rows: &'a HashMap<String, usize>,
}

/// Index of the last row carrying each family-and-type label.
pub fn last_row_per_type(table: &FlatTable) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (i, row) in table.rows.iter().enumerate() {
        let label = row.family_and_type().trim().to_string();
        if !label.is_empty() {
            index.insert(label, i);
        }
    }
    index
}

fn grid_col(index: usize) -> u16 {
    index as u16 + 1
}

fn data_row(index: usize) -> u32 {
    FIRST_DATA_ROW + index as u32
}

impl ScheduleLayout<'_> {
    /// Build the sheet. Returns `None` when cancelled.
    pub fn build(&self, cancel: &CancellationToken) -> BridgeResult<Option<SheetGrid>> {
        if self.columns.len() != self.table.width() {
            return Err(BridgeError::Export(format!(
                "Sheet '{}' has {} columns but {} column specs",
                self.sheet_name,
                self.table.width(),
                self.columns.len()
            )));
        }

        let mut grid = SheetGrid::new(self.sheet_name);
        self.write_headers(&mut grid);
        if !self.write_body(&mut grid, cancel) {
            return Ok(None);
        }
        if !self.write_groups(&mut grid, cancel) {
            return Ok(None);
        }
        self.write_grand_total(&mut grid);
        self.write_formula_warning(&mut grid);

        for (i, column) in self.columns.iter().enumerate() {
            if column.hidden {
                grid.hide_column(grid_col(i));
            }
        }
        grid.hide_column(1);
        grid.hide_column(2);
        grid.freeze_rows(KIND_ROW);
        grid.protect();
        Ok(Some(grid))
    }

    fn last_col(&self) -> u16 {
        grid_col(self.columns.len().saturating_sub(1))
    }

    fn write_headers(&self, grid: &mut SheetGrid) {
        grid.set_value(IDENTITY_ROW, 1, CellValue::text(self.identity));
        grid.hide_row(IDENTITY_ROW);

        for (i, column) in self.columns.iter().enumerate() {
            let col = grid_col(i);
            grid.set_value(MACHINE_HEADER_ROW, col, CellValue::text(&column.name));
            grid.set_value(HEADING_ROW, col, CellValue::text(&column.heading));
            grid.set_style(HEADING_ROW, col, CellStyle::header());
            grid.set_value(KIND_ROW, col, CellValue::text(&column.kind_label));
            grid.set_style(KIND_ROW, col, CellStyle::header_type_field());
        }
        grid.hide_row(MACHINE_HEADER_ROW);
    }

    fn write_body(&self, grid: &mut SheetGrid, cancel: &CancellationToken) -> bool {
        for (r, row) in self.table.rows.iter().enumerate() {
            for (c, value) in row.values.iter().enumerate() {
                grid.set_value(data_row(r), grid_col(c), value.clone());
            }
        }

        for (c, column) in self.columns.iter().enumerate() {
            if cancel.is_cancelled() {
                return false;
            }
            let col = grid_col(c);
            let num_format = column.number_format.as_deref();
            let editable_type_column = column.is_type_level()
                && self.table.rows.iter().any(|row| !row.locked[c]);

            for (r, row) in self.table.rows.iter().enumerate() {
                let at = data_row(r);
                let locked = c < 2 || row.locked[c];
                let style = if column.is_formula() {
                    CellStyle::formula()
                } else if locked {
                    CellStyle::cell_locked()
                } else {
                    CellStyle::cell_unlocked()
                };
                grid.set_style(at, col, style.with_num_format(num_format));

                if editable_type_column && !locked {
                    self.link_to_canonical(grid, r, c, num_format);
                }
            }
        }
        true
    }

    /// Type-level values are shared by every instance of a type; only the
    /// last row of each type stays editable and the others reference it.
    fn link_to_canonical(&self, grid: &mut SheetGrid, r: usize, c: usize, num_format: Option<&str>) {
        let label = self.table.rows[r].family_and_type().trim().to_string();
        let Some(&canonical) = self.canonical_rows.get(&label) else {
            return;
        };
        if canonical == r || self.table.rows[canonical].locked[c] {
            return;
        }
        let col = grid_col(c);
        let Some(target) = grid.key(data_row(canonical)) else {
            return;
        };
        let cached = self.table.rows[canonical].values[c].clone();
        // A formula over a blank cell reads back as 0.
        if !cached.is_empty() {
            grid.set_formula(
                data_row(r),
                col,
                FormulaExpr::Ref { row: target, col },
                cached,
            );
        }
        grid.set_style(
            data_row(r),
            col,
            CellStyle::element_type().with_num_format(num_format),
        );
    }

    fn is_data_row(grid: &SheetGrid, row: u32) -> bool {
        !grid.value(row, 1).is_empty()
    }

    /// Group values of levels `0..=level` for one row.
    fn group_key(&self, grid: &SheetGrid, row: u32, level: usize) -> Vec<String> {
        self.groups[..=level]
            .iter()
            .map(|g| grid.value(row, grid_col(g.column)).as_text())
            .collect()
    }

    /// Runs of consecutive data rows sharing the group values of
    /// `0..=level`. Rows that are not data rows end a run.
    fn runs(&self, grid: &SheetGrid, level: usize) -> Vec<(RowKey, RowKey)> {
        let mut runs = Vec::new();
        let mut current: Option<(RowKey, RowKey, Vec<String>)> = None;
        for row in FIRST_DATA_ROW..=grid.row_count() {
            let Some(key) = grid.key(row) else { continue };
            if !Self::is_data_row(grid, row) {
                if let Some((first, last, _)) = current.take() {
                    runs.push((first, last));
                }
                continue;
            }
            let values = self.group_key(grid, row, level);
            current = match current.take() {
                Some((first, _, open)) if open == values => Some((first, key, values)),
                Some((first, last, _)) => {
                    runs.push((first, last));
                    Some((key, key, values))
                }
                None => Some((key, key, values)),
            };
        }
        if let Some((first, last, _)) = current {
            runs.push((first, last));
        }
        runs
    }

    fn write_groups(&self, grid: &mut SheetGrid, cancel: &CancellationToken) -> bool {
        let depth = self.groups.len();
        if depth == 0 {
            return true;
        }

        for level in 0..depth {
            let footer = self.groups[level].show_footer || !self.itemized;
            for (first, last) in self.runs(grid, level) {
                if cancel.is_cancelled() {
                    return false;
                }
                if footer {
                    self.insert_subtotal(grid, level, first, last);
                }
            }
        }

        let outline = depth.min(7) as u8;
        for row in FIRST_DATA_ROW..=grid.row_count() {
            if Self::is_data_row(grid, row) {
                grid.set_outline(row, outline);
            }
        }
        if !self.itemized {
            grid.collapse_outline();
        }
        true
    }

    fn insert_subtotal(&self, grid: &mut SheetGrid, level: usize, first: RowKey, last: RowKey) {
        let (Some(first_row), Some(last_row)) = (grid.row_of(first), grid.row_of(last)) else {
            return;
        };
        let at = grid.insert_row(last_row + 1);
        let style = CellStyle::subtotal(level + 1);

        for (c, column) in self.columns.iter().enumerate() {
            let col = grid_col(c);
            grid.set_style(
                at,
                col,
                style.clone().with_num_format(column.number_format.as_deref()),
            );
            if column.is_totalled() {
                let sum = sum_rows(grid, col, first_row..=last_row);
                grid.set_formula(
                    at,
                    col,
                    FormulaExpr::Subtotal { col, first, last },
                    CellValue::Number(sum),
                );
            } else if self.groups[..=level].iter().any(|g| g.column == c) {
                let key = grid.value(last_row, col).as_text().replace('"', "''");
                grid.set_value(at, col, CellValue::Text(key));
            }
        }
        grid.set_outline(at, (level + 1).min(7) as u8);
    }

    fn write_grand_total(&self, grid: &mut SheetGrid) {
        if self.table.rows.is_empty() {
            return;
        }
        let last_body = grid.row_count();
        let (Some(first), Some(last)) = (grid.key(FIRST_DATA_ROW), grid.key(last_body)) else {
            return;
        };
        let at = grid.push_row();
        let style = CellStyle::total();

        for (c, column) in self.columns.iter().enumerate() {
            let col = grid_col(c);
            grid.set_style(
                at,
                col,
                style.clone().with_num_format(column.number_format.as_deref()),
            );
            if column.is_totalled() {
                // Subtotal rows inside the range are skipped by SUBTOTAL itself.
                let sum: f64 = (FIRST_DATA_ROW..=last_body)
                    .filter(|r| Self::is_data_row(grid, *r))
                    .map(|r| grid.value(r, col).as_number().unwrap_or(0.0))
                    .sum();
                grid.set_formula(
                    at,
                    col,
                    FormulaExpr::Subtotal { col, first, last },
                    CellValue::Number(sum),
                );
            }
        }
    }

    fn write_formula_warning(&self, grid: &mut SheetGrid) {
        if !self.columns.iter().any(ColumnSpec::is_formula) {
            return;
        }
        let at = grid.row_count() + 2;
        let last_col = self.last_col().max(2);
        grid.set_value(at, 2, CellValue::text(FORMULA_WARNING));
        grid.style_row(at, 2, last_col, &CellStyle::formula_warning());
        grid.merge(at, 2, last_col);
    }
}

fn sum_rows(grid: &SheetGrid, col: u16, rows: std::ops::RangeInclusive<u32>) -> f64 {
    rows.map(|r| grid.value(r, col).as_number().unwrap_or(0.0))
        .sum()
}
