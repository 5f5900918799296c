//! Colour legend sheet explaining the cell styles.

use super::grid::SheetGrid;
use super::styles::{palette, CellStyle};
use crate::types::CellValue;

/// Identity stored in A1 of the legend sheet.
pub const LEGEND_ID: &str = "D6A707D0-AA32-4948-82A5-67C02D6381DF";

pub const LEGEND_SHEET_NAME: &str = "Legend";

const ENTRIES: [(u32, &str); 9] = [
    (palette::HEADER, "Column title"),
    (palette::HEADER_TYPE_FIELD, "Type of value expected in the column"),
    (palette::CELL_LOCKED, "Locked parameter value"),
    (
        palette::COL_ELEMENT_TYPE,
        "Type parameter value; edit it on the last row of the same type",
    ),
    (palette::TYPE_FORMULA, "Computed value that is not imported"),
    (palette::WHITE, "Editable parameter value"),
    (palette::LEVEL_1, "Subtotal, level 1"),
    (palette::LEVEL_2, "Subtotal, level 2 and deeper"),
    (palette::TOTAL, "Total"),
];

/// Build the legend sheet.
pub fn legend_sheet() -> SheetGrid {
    let mut grid = SheetGrid::new(LEGEND_SHEET_NAME);
    grid.set_value(1, 1, CellValue::text(LEGEND_ID));
    grid.hide_row(1);

    grid.set_value(2, 2, CellValue::text("Colour legend"));
    grid.style_row(2, 2, 3, &CellStyle::legend_title());
    grid.merge(2, 2, 3);

    grid.set_value(3, 2, CellValue::text("Color"));
    grid.set_value(3, 3, CellValue::text("Description"));
    grid.style_row(3, 2, 3, &CellStyle::column_title().centered());

    for (i, (fill, description)) in ENTRIES.iter().enumerate() {
        let row = 4 + i as u32;
        grid.set_style(
            row,
            2,
            CellStyle {
                fill: Some(*fill),
                ..CellStyle::default()
            },
        );
        grid.set_value(row, 3, CellValue::text(*description));
        grid.set_style(row, 3, CellStyle::default());
    }
    grid.protect();
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_layout() {
        let grid = legend_sheet();
        assert_eq!(grid.value(1, 1), CellValue::text(LEGEND_ID));
        assert!(grid.is_row_hidden(1));
        assert_eq!(grid.value(3, 2), CellValue::text("Color"));
        assert_eq!(grid.row_count(), 12);
        assert_eq!(grid.style(12, 2).and_then(|s| s.fill), Some(palette::TOTAL));
        assert_eq!(grid.merges().len(), 1);
    }
}
