//! Workbook writer - [`SheetGrid`] → .xlsx

use super::grid::SheetGrid;
use crate::error::{BridgeError, BridgeResult};
use crate::types::CellValue;
use regex::Regex;
use rust_xlsxwriter::{Format, Formula, ProtectionOptions, Workbook, Worksheet};
use std::fs::OpenOptions;
use std::path::Path;

/// Longest worksheet name a workbook accepts.
pub const MAX_SHEET_NAME: usize = 31;
const NAME_STEM: usize = 28;

fn truncate(name: &str, chars: usize) -> String {
    name.chars().take(chars).collect()
}

/// Replace characters a worksheet name may not hold and shorten long names.
pub fn sanitize_sheet_name(name: &str) -> BridgeResult<String> {
    let forbidden = Regex::new(r"[:?/\\\[\]*]")
        .map_err(|e| BridgeError::Export(format!("Regex error: {}", e)))?;
    let clean = forbidden.replace_all(name, " ").to_string();
    let clean = if clean.trim().is_empty() {
        "Sheet".to_string()
    } else {
        clean
    };
    Ok(if clean.chars().count() > MAX_SHEET_NAME {
        format!("{}001", truncate(&clean, NAME_STEM))
    } else {
        clean
    })
}

/// Fail early when `path` exists but cannot be opened for writing.
///
/// Catches a workbook held open by Excel on Windows (sharing violation) and
/// targets that are not writable files. Advisory locks on Linux and macOS are
/// not seen, and a read-only file passes when running as root; the save
/// itself reports those.
pub fn check_not_locked(path: &Path) -> BridgeResult<()> {
    if !path.exists() {
        return Ok(());
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map(|_| ())
        .map_err(|_| BridgeError::FileLocked(path.display().to_string()))
}

/// Collects sheets and writes them as one workbook.
pub struct WorkbookWriter {
    workbook: Workbook,
    names: Vec<String>,
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            names: Vec::new(),
        }
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name for a new sheet, unique within this workbook.
    fn unique_name(&self, wanted: &str) -> BridgeResult<String> {
        let base = sanitize_sheet_name(wanted)?;
        let taken = |n: &str| self.names.iter().any(|t| t.eq_ignore_ascii_case(n));
        if !taken(&base) {
            return Ok(base);
        }
        let stem = truncate(&base, NAME_STEM);
        let mut n = 2;
        loop {
            let candidate = format!("{}{:03}", stem, n);
            if !taken(&candidate) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Render `grid` as a new worksheet and return the name it received.
    pub fn add_sheet(&mut self, grid: &SheetGrid) -> BridgeResult<String> {
        let name = self.unique_name(grid.name())?;
        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(&name)
            .map_err(|e| BridgeError::Export(format!("Failed to set worksheet name: {}", e)))?;
        render_sheet(worksheet, grid)?;
        self.names.push(name.clone());
        Ok(name)
    }

    pub fn save(mut self, path: &Path) -> BridgeResult<()> {
        self.workbook
            .save(path)
            .map_err(|e| BridgeError::Export(format!("Failed to save Excel file: {}", e)))
    }
}

fn xlsx_err(what: &'static str) -> impl Fn(rust_xlsxwriter::XlsxError) -> BridgeError {
    move |e| BridgeError::Export(format!("Failed to {}: {}", what, e))
}

fn write_cell(
    worksheet: &mut Worksheet,
    grid: &SheetGrid,
    row: u32,
    col: u16,
) -> BridgeResult<()> {
    let Some(cell) = grid.cell(row, col) else {
        return Ok(());
    };
    let format = cell
        .style
        .as_ref()
        .map(|s| s.to_format())
        .unwrap_or_else(Format::new);
    let (r, c) = (row - 1, col - 1);

    if let Some(formula) = &cell.formula {
        let text = grid.render_formula(formula)?;
        let formula = Formula::new(text).set_result(cell.value.as_text());
        worksheet
            .write_formula_with_format(r, c, formula, &format)
            .map_err(xlsx_err("write formula"))?;
        return Ok(());
    }

    match &cell.value {
        CellValue::Number(v) => {
            worksheet
                .write_number_with_format(r, c, *v, &format)
                .map_err(xlsx_err("write number"))?;
        }
        CellValue::Text(s) if !s.is_empty() => {
            worksheet
                .write_string_with_format(r, c, s, &format)
                .map_err(xlsx_err("write text"))?;
        }
        _ => {
            if cell.style.is_some() {
                worksheet
                    .write_blank(r, c, &format)
                    .map_err(xlsx_err("write blank cell"))?;
            }
        }
    }
    Ok(())
}

/// Outline groups: for each depth, every run of consecutive rows at or
/// below it becomes one group.
fn write_outline(worksheet: &mut Worksheet, grid: &SheetGrid) -> BridgeResult<()> {
    let depth = grid.rows().iter().map(|r| r.outline()).max().unwrap_or(0);
    for level in 1..=depth {
        let mut runs = Vec::new();
        let mut start: Option<u32> = None;
        for (i, row) in grid.rows().iter().enumerate() {
            let index = i as u32;
            match (row.outline() >= level, start) {
                (true, None) => start = Some(index),
                (false, Some(first)) => {
                    runs.push((first, index - 1));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(first) = start {
            runs.push((first, grid.row_count() - 1));
        }

        for (first, last) in runs {
            if grid.is_collapsed() && level == depth {
                worksheet
                    .group_rows_collapsed(first, last)
                    .map_err(xlsx_err("group rows"))?;
            } else {
                worksheet
                    .group_rows(first, last)
                    .map_err(xlsx_err("group rows"))?;
            }
        }
    }
    Ok(())
}

/// Write every cell, merge, outline and sheet setting of `grid`.
pub fn render_sheet(worksheet: &mut Worksheet, grid: &SheetGrid) -> BridgeResult<()> {
    for (i, row) in grid.rows().iter().enumerate() {
        let r = i as u32 + 1;
        for (col, _) in row.cells() {
            write_cell(worksheet, grid, r, col)?;
        }
        if row.is_hidden() {
            worksheet
                .set_row_hidden(r - 1)
                .map_err(xlsx_err("hide row"))?;
        }
    }

    for merge in grid.merges() {
        let Some(row) = grid.row_of(merge.row) else {
            continue;
        };
        let text = grid.value(row, merge.first_col).as_text();
        let format = grid
            .style(row, merge.first_col)
            .map(|s| s.to_format())
            .unwrap_or_else(Format::new);
        worksheet
            .merge_range(
                row - 1,
                merge.first_col - 1,
                row - 1,
                merge.last_col - 1,
                &text,
                &format,
            )
            .map_err(xlsx_err("merge cells"))?;
    }

    write_outline(worksheet, grid)?;

    if grid.frozen_rows() > 0 {
        worksheet
            .set_freeze_panes(grid.frozen_rows(), 0)
            .map_err(xlsx_err("freeze panes"))?;
    }

    worksheet.autofit();
    for col in grid.hidden_columns() {
        worksheet
            .set_column_hidden(col - 1)
            .map_err(xlsx_err("hide column"))?;
    }

    if grid.is_protected() {
        let options = ProtectionOptions {
            format_cells: true,
            format_columns: true,
            format_rows: true,
            sort: true,
            use_autofilter: true,
            ..ProtectionOptions::new()
        };
        worksheet.protect_with_options(&options);
    }
    Ok(())
}
