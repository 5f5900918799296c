//! Worksheet classification: which sheets of a workbook can be imported.

use crate::error::{BridgeError, BridgeResult};
use crate::excel::{SheetData, WorkbookData, LEGEND_ID};
use crate::export::Standard;
use crate::model::HostModel;
use crate::types::ElementId;

/// What a worksheet's identity points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Schedule(ElementId),
    Standard(Standard),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub sheet: String,
    pub kind: Option<SheetKind>,
    /// Why the sheet cannot be imported. `None` for importable sheets.
    pub reason: Option<String>,
}

/// Worksheets split into importable and non-importable buckets. The legend
/// goes in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub can_import: Vec<CatalogEntry>,
    pub cannot_import: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn importable_names(&self) -> Vec<&str> {
        self.can_import.iter().map(|e| e.sheet.as_str()).collect()
    }
}

fn classify_sheet(sheet: &SheetData, model: &dyn HostModel) -> (Option<SheetKind>, Option<&'static str>) {
    let identity = sheet.identity();
    if let Some(schedule) = model.schedule_by_unique_id(identity.trim()) {
        let kind = Some(SheetKind::Schedule(schedule.id));
        if schedule.is_import_blocked() {
            return (kind, Some("schedule kind is export only"));
        }
        return (kind, None);
    }
    match Standard::from_id(&identity) {
        Some(standard) if standard.is_importable() => (Some(SheetKind::Standard(standard)), None),
        Some(standard) => (Some(SheetKind::Standard(standard)), Some("read-only standard")),
        None => (None, Some("unknown sheet identity")),
    }
}

/// Sort every worksheet into the import buckets. Fails when no sheet carries
/// a known identity, which means the file was not produced by an export.
pub fn classify(workbook: &WorkbookData, model: &dyn HostModel) -> BridgeResult<Catalog> {
    let mut catalog = Catalog::default();
    let mut recognised = false;

    for sheet in &workbook.sheets {
        if sheet.identity().trim().eq_ignore_ascii_case(LEGEND_ID) {
            recognised = true;
            continue;
        }
        let (kind, reason) = classify_sheet(sheet, model);
        recognised |= kind.is_some();
        let entry = CatalogEntry {
            sheet: sheet.name().to_string(),
            kind,
            reason: reason.map(str::to_string),
        };
        if entry.reason.is_none() {
            catalog.can_import.push(entry);
        } else {
            catalog.cannot_import.push(entry);
        }
    }

    if !recognised {
        return Err(BridgeError::Import(
            "The workbook was not exported by this tool: no sheet has a known identity".to_string(),
        ));
    }
    Ok(catalog)
}
