//! Standards import: category line styles and project information.

use crate::core::{write_cell, TranslationTable, WriteOutcome};
use crate::error::{BridgeError, BridgeResult};
use crate::excel::SheetData;
use crate::export::standards::{COL_LINE_WEIGHT_CUT, FIELD_HEADER_ROW, FIRST_DATA_ROW};
use crate::export::Standard;
use crate::model::{CategoryStyle, HostModel, ParamRef};
use crate::session::{JobContext, Progress};
use crate::settings::{ParametersSettings, PROJECT_INFORMATION_LOCATION};
use crate::types::{CategoryId, CellValue, Rgb};

/// Positive whole line weight of a cell, if any.
fn line_weight(cell: &CellValue) -> Option<i32> {
    cell.as_number()
        .map(|w| w.round() as i32)
        .filter(|w| *w > 0)
}

fn report_row(cx: &JobContext, row: u32, last_row: u32) {
    cx.report(Progress::Row {
        current: (row + 1).saturating_sub(FIRST_DATA_ROW) as usize,
        total: (last_row + 1).saturating_sub(FIRST_DATA_ROW) as usize,
    });
}

/// Apply an object style or line style sheet. Only values differing from the
/// model are written. Returns the number of categories changed, or `None`
/// when cancelled.
pub fn import_categories(
    model: &mut dyn HostModel,
    standard: Standard,
    sheet: &SheetData,
    cx: &JobContext,
) -> BridgeResult<Option<usize>> {
    if standard.category_kind().is_none() && standard != Standard::LineStyles {
        return Err(BridgeError::UnknownStandard(standard.sheet_name().to_string()));
    }
    let last_row = sheet.row_count();
    if sheet.column_count() < 2 || last_row < FIRST_DATA_ROW {
        return Ok(Some(0));
    }
    let has_cut = sheet.text(FIELD_HEADER_ROW, 4) == COL_LINE_WEIGHT_CUT;
    let color_col = if has_cut { 5 } else { 4 };

    let mut changed = 0;
    for row in FIRST_DATA_ROW..=last_row {
        if cx.is_cancelled() {
            return Ok(None);
        }
        report_row(cx, row, last_row);
        let id_text = sheet.text(row, 1);
        if id_text.is_empty() {
            continue;
        }
        let id = id_text.parse::<i64>().map(CategoryId).map_err(|e| {
            BridgeError::Import(format!("Invalid category id '{}' on row {}: {}", id_text, row, e))
        })?;
        let Some(category) = model.category(id) else {
            tracing::debug!("Row {}: category {} not found", row, id);
            continue;
        };

        let mut style = CategoryStyle::default();
        if let Some(weight) = line_weight(&sheet.value(row, 3)) {
            if category.line_weight_projection != Some(weight) {
                style.projection = Some(weight);
            }
        }
        if has_cut && category.cuttable {
            if let Some(weight) = line_weight(&sheet.value(row, 4)) {
                if category.line_weight_cut != Some(weight) {
                    style.cut = Some(weight);
                }
            }
        }
        if let Some(color) = Rgb::parse(&sheet.text(row, color_col)) {
            if category.line_color != Some(color) {
                style.color = Some(color);
            }
        }
        if !style.is_empty() {
            model.set_category_style(id, &style)?;
            changed += 1;
        }
    }
    Ok(Some(changed))
}

/// Apply the project information sheet: values are matched to parameters by
/// name and reverse translated. Returns the number of parameters written, or
/// `None` when cancelled.
pub fn import_project_information(
    model: &mut dyn HostModel,
    settings: &ParametersSettings,
    sheet: &SheetData,
    cx: &JobContext,
) -> BridgeResult<Option<usize>> {
    let last_row = sheet.row_count();
    if sheet.column_count() < 3 || last_row < FIRST_DATA_ROW {
        return Ok(Some(0));
    }
    let info = model
        .project_info()
        .map(|e| e.id)
        .ok_or_else(|| BridgeError::Import("Model has no project information".to_string()))?;
    let translations = TranslationTable::at(settings, PROJECT_INFORMATION_LOCATION);

    let mut written = 0;
    for row in FIRST_DATA_ROW..=last_row {
        if cx.is_cancelled() {
            return Ok(None);
        }
        report_row(cx, row, last_row);
        if sheet.text(row, 1).is_empty() {
            continue;
        }
        let name = sheet.text(row, 2);
        let Some(parameter) = model
            .element(info)
            .and_then(|e| e.lookup_parameter(&name))
            .filter(|p| !p.read_only)
        else {
            tracing::debug!("Row {}: no writable project parameter '{}'", row, name);
            continue;
        };
        let target = ParamRef::new(info, parameter.id);

        let mut cell = sheet.value(row, 3);
        if !cell.is_empty() && translations.applies_to(&name) {
            cell = CellValue::Text(translations.text_to_value(&name, &cell.as_text())?);
        }
        if write_cell(model, target, None, &cell)? == WriteOutcome::Written {
            written += 1;
        }
    }
    Ok(Some(written))
}
