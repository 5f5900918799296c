//! Import orchestration
//!
//! Every importable sheet runs in its own transaction. A sheet that fails is
//! rolled back and reported as an [`ImportIssue`] while the remaining sheets
//! continue; cancellation rolls back the open sheet and stops.

pub mod catalog;
pub mod schedule;
pub mod standards;

pub use catalog::{classify, Catalog, CatalogEntry, SheetKind};
pub use schedule::ScheduleImporter;

use crate::core::ReadOnlySet;
use crate::error::{BridgeError, BridgeResult};
use crate::excel::{SheetData, WorkbookData};
use crate::export::Standard;
use crate::model::HostModel;
use crate::session::{JobContext, Outcome, Progress};
use crate::settings::ParametersSettings;

pub const SCHEDULE_TRANSACTION: &str = "Schedule Import from Excel";
pub const STANDARD_TRANSACTION: &str = "Import from Excel";

/// A sheet-level failure collected during import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportIssue {
    /// Schedule or standard name.
    pub source_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Sheets whose transaction was committed.
    pub imported: Vec<String>,
    /// Sheets left alone, with the reason.
    pub skipped: Vec<CatalogEntry>,
    pub issues: Vec<ImportIssue>,
    /// Parameters and category styles written.
    pub changes: usize,
}

impl ImportReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Errors that stop the whole import instead of failing one sheet.
fn is_fatal(error: &BridgeError) -> bool {
    matches!(error, BridgeError::Host(_) | BridgeError::Transaction(_))
}

fn import_sheet(
    model: &mut dyn HostModel,
    settings: &ParametersSettings,
    forced: &ReadOnlySet,
    kind: SheetKind,
    sheet: &SheetData,
    cx: &JobContext,
) -> BridgeResult<Option<usize>> {
    match kind {
        SheetKind::Schedule(id) => ScheduleImporter::new(settings, forced).import(model, id, sheet, cx),
        SheetKind::Standard(Standard::ProjectInformation) => {
            standards::import_project_information(model, settings, sheet, cx)
        }
        SheetKind::Standard(standard) if standard.is_importable() => {
            standards::import_categories(model, standard, sheet, cx)
        }
        SheetKind::Standard(standard) => {
            Err(BridgeError::UnknownStandard(standard.sheet_name().to_string()))
        }
    }
}

/// Import the importable sheets of `workbook`, or only those named in
/// `only` when it is not empty.
pub fn run_import(
    model: &mut dyn HostModel,
    settings: &ParametersSettings,
    workbook: &WorkbookData,
    only: &[String],
    cx: &JobContext,
) -> BridgeResult<Outcome<ImportReport>> {
    let catalog = classify(workbook, &*model)?;
    let mut report = ImportReport {
        skipped: catalog.cannot_import.clone(),
        ..ImportReport::default()
    };

    for name in only {
        if !catalog.can_import.iter().any(|e| &e.sheet == name) {
            report.issues.push(ImportIssue {
                source_name: name.clone(),
                message: "Sheet not found or cannot be imported".to_string(),
            });
        }
    }
    let selected: Vec<&CatalogEntry> = catalog
        .can_import
        .iter()
        .filter(|e| only.is_empty() || only.contains(&e.sheet))
        .collect();

    let forced = ReadOnlySet::from_settings(settings);
    let total = selected.len();
    tracing::info!("Importing {} sheet(s)", total);
    cx.report(Progress::Started { sheets: total });

    for (index, entry) in selected.into_iter().enumerate() {
        if cx.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        let (Some(kind), Some(sheet)) = (entry.kind, workbook.sheet(&entry.sheet)) else {
            continue;
        };
        cx.report(Progress::Sheet {
            name: entry.sheet.clone(),
            index,
            total,
        });
        let transaction = match kind {
            SheetKind::Schedule(_) => SCHEDULE_TRANSACTION,
            SheetKind::Standard(_) => STANDARD_TRANSACTION,
        };

        model.begin_transaction(transaction)?;
        match import_sheet(model, settings, &forced, kind, sheet, cx) {
            Ok(Some(changes)) => {
                model.commit_transaction()?;
                tracing::debug!("Sheet '{}' imported: {} change(s)", entry.sheet, changes);
                report.changes += changes;
                report.imported.push(entry.sheet.clone());
            }
            Ok(None) => {
                model.rollback_transaction()?;
                tracing::info!("Import cancelled during sheet '{}'", entry.sheet);
                return Ok(Outcome::Cancelled);
            }
            Err(e) => {
                model.rollback_transaction()?;
                tracing::error!("Sheet '{}' rolled back: {}", entry.sheet, e);
                if is_fatal(&e) {
                    return Err(e);
                }
                cx.report(Progress::Issue {
                    source_name: entry.sheet.clone(),
                    message: e.to_string(),
                });
                report.issues.push(ImportIssue {
                    source_name: entry.sheet.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    if report.has_issues() {
        tracing::warn!("Import finished with {} issue(s)", report.issues.len());
    }
    tracing::info!(
        "Imported {} sheet(s), {} change(s)",
        report.imported.len(),
        report.changes
    );
    Ok(Outcome::Completed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::LEGEND_ID;
    use crate::model::ModelSnapshot;
    use crate::types::{CellValue, ElementId, ParameterId};
    use crate::model::ParamRef;
    use pretty_assertions::assert_eq;

    const MODEL: &str = r#"
categories:
  - { id: -2000023, name: Doors, line_weight_projection: 1 }
elements:
  - id: 20
    unique_id: door-20
    name: Door
    kind: family_instance
    parameters:
      - { id: 100, name: Mark, storage: string, kind: text, value: D1 }
      - { id: 101, name: Fire Rating, storage: integer, kind: integer, value: 30 }
schedules:
  - id: 500
    unique_id: sched-doors
    name: Doors
    fields:
      - { name: Mark, kind: instance, parameter_id: 100 }
      - { name: Fire Rating, kind: instance, parameter_id: 101 }
    elements: [20]
"#;

    fn schedule_sheet(mark: &str, rating: CellValue) -> SheetData {
        let t = CellValue::text;
        SheetData::new(
            "Doors",
            vec![
                vec![t("sched-doors")],
                vec![t("ID"), t("FamilyAndType"), t("Mark"), t("Fire Rating")],
                vec![],
                vec![],
                vec![t("door-20"), t(""), t(mark), rating],
            ],
        )
    }

    fn category_sheet(weight: f64) -> SheetData {
        let t = CellValue::text;
        SheetData::new(
            "Model Objects",
            vec![
                vec![t(Standard::ModelObjects.id())],
                vec![t("ID"), t("Category"), t("Line Weight - Projection")],
                vec![],
                vec![t("-2000023"), t("Doors"), CellValue::Number(weight)],
            ],
        )
    }

    fn mark(model: &ModelSnapshot) -> String {
        model
            .parameter(ParamRef::new(ElementId(20), ParameterId(100)))
            .and_then(|p| p.as_string())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_failed_sheet_rolls_back_and_others_continue() {
        let mut model = ModelSnapshot::from_yaml_str(MODEL).unwrap();
        let workbook = WorkbookData {
            sheets: vec![
                schedule_sheet("D9", CellValue::text("not a number")),
                category_sheet(4.0),
                SheetData::new("Legend", vec![vec![CellValue::text(LEGEND_ID)]]),
            ],
        };
        let report = run_import(
            &mut model,
            &ParametersSettings::default(),
            &workbook,
            &[],
            &JobContext::detached(),
        )
        .unwrap()
        .completed()
        .unwrap();

        assert_eq!(report.imported, vec!["Model Objects"]);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].source_name, "Doors");
        assert_eq!(mark(&model), "D1");
        assert_eq!(model.write_count(), 1);
        assert!(!model.in_transaction());
    }

    #[test]
    fn test_only_selected_sheets() {
        let mut model = ModelSnapshot::from_yaml_str(MODEL).unwrap();
        let workbook = WorkbookData {
            sheets: vec![schedule_sheet("D9", CellValue::Number(30.0)), category_sheet(4.0)],
        };
        let report = run_import(
            &mut model,
            &ParametersSettings::default(),
            &workbook,
            &["Doors".to_string(), "Nope".to_string()],
            &JobContext::detached(),
        )
        .unwrap()
        .completed()
        .unwrap();
        assert_eq!(report.imported, vec!["Doors"]);
        assert_eq!(report.changes, 1);
        assert_eq!(report.issues[0].source_name, "Nope");
        assert_eq!(mark(&model), "D9");
    }

    #[test]
    fn test_cancelled_import_leaves_model_untouched() {
        let mut model = ModelSnapshot::from_yaml_str(MODEL).unwrap();
        let workbook = WorkbookData {
            sheets: vec![schedule_sheet("D9", CellValue::Number(60.0))],
        };
        let cx = JobContext::detached();
        cx.cancel_token().cancel();
        let outcome = run_import(&mut model, &ParametersSettings::default(), &workbook, &[], &cx)
            .unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(model.write_count(), 0);
        assert_eq!(mark(&model), "D1");
    }
}
