//! Spreadsheet side of the bridge
//!
//! Sheets are laid out on an in-memory [`SheetGrid`] first and written with
//! `rust_xlsxwriter` afterwards; workbooks are read back with `calamine`.

pub mod grid;
pub mod layout;
pub mod legend;
pub mod reader;
pub mod styles;
pub mod writer;

pub use grid::{FormulaExpr, SheetGrid};
pub use layout::{ColumnSpec, GroupLevel, ScheduleLayout};
pub use legend::{legend_sheet, LEGEND_ID};
pub use reader::{read_workbook, SheetData, WorkbookData};
pub use styles::CellStyle;
pub use writer::{check_not_locked, sanitize_sheet_name, WorkbookWriter};
