//! Export -> read -> import round trips against the sample project.

use pretty_assertions::assert_eq;
use sheetbridge::excel::{read_workbook, SheetData, WorkbookData, LEGEND_ID};
use sheetbridge::export::{run_export, ExportRequest, StandardGroup};
use sheetbridge::import::run_import;
use sheetbridge::model::{HostModel, ModelSnapshot, ParamRef};
use sheetbridge::parser::parse_snapshot;
use sheetbridge::session::{JobContext, Outcome, Progress, Session};
use sheetbridge::settings::ParametersSettings;
use sheetbridge::types::{CellValue, ElementId, ParameterId};
use sheetbridge::BridgeError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DOOR_200: &str = "4d5e6f70-0000-4000-8000-000000000200";

fn test_data_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("test-data");
    path.push(filename);
    path
}

fn load() -> (ModelSnapshot, ParametersSettings) {
    let model = parse_snapshot(&test_data_path("project.yaml")).unwrap();
    let settings = ParametersSettings::load(&test_data_path("settings.yaml")).unwrap();
    (model, settings)
}

fn export_to(
    dir: &Path,
    model: &ModelSnapshot,
    settings: &ParametersSettings,
    standards: Vec<StandardGroup>,
) -> PathBuf {
    let output = dir.join("bridge.xlsx");
    let request = ExportRequest {
        schedules: vec!["Door Schedule".to_string()],
        standards,
        basic: false,
        output: output.clone(),
    };
    let outcome = run_export(model, settings, &request, &JobContext::detached()).unwrap();
    assert!(!outcome.is_cancelled());
    output
}

fn row_of(sheet: &SheetData, unique_id: &str) -> u32 {
    (1..=sheet.row_count())
        .find(|&r| sheet.text(r, 1) == unique_id)
        .unwrap()
}

fn column_of(sheet: &SheetData, field: &str) -> u16 {
    (1..=sheet.column_count())
        .find(|&c| sheet.text(2, c) == field)
        .unwrap()
}

fn with_cell(sheet: &SheetData, row: u32, col: u16, value: CellValue) -> SheetData {
    let mut rows: Vec<Vec<CellValue>> = (1..=sheet.row_count())
        .map(|r| (1..=sheet.column_count()).map(|c| sheet.value(r, c)).collect())
        .collect();
    rows[row as usize - 1][col as usize - 1] = value;
    SheetData::new(sheet.name(), rows)
}

fn replace_sheet(book: &WorkbookData, sheet: SheetData) -> WorkbookData {
    WorkbookData {
        sheets: book
            .sheets
            .iter()
            .map(|s| if s.name() == sheet.name() { sheet.clone() } else { s.clone() })
            .collect(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ZERO-WRITE ROUND TRIP
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unedited_workbook_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (mut model, settings) = load();
    let path = export_to(dir.path(), &model, &settings, StandardGroup::ALL.to_vec());

    let book = read_workbook(&path).unwrap();
    let report = run_import(&mut model, &settings, &book, &[], &JobContext::detached())
        .unwrap()
        .completed()
        .unwrap();

    assert!(!report.has_issues(), "{:?}", report.issues);
    assert_eq!(report.changes, 0);
    assert_eq!(model.write_count(), 0);
    assert!(report.imported.contains(&"Door Schedule".to_string()));
    assert!(report.imported.contains(&"Project Information".to_string()));
}

#[test]
fn test_exported_sheets_carry_identities() {
    let dir = TempDir::new().unwrap();
    let (model, settings) = load();
    let path = export_to(dir.path(), &model, &settings, vec![StandardGroup::LineStyles]);

    let book = read_workbook(&path).unwrap();
    let schedule = book.sheet("Door Schedule").unwrap();
    assert_eq!(schedule.identity(), "9e8d7c6b-0000-4000-8000-000000000800");
    assert_eq!(schedule.text(2, 1), "ID");
    assert_eq!(schedule.text(2, 2), "FamilyAndType");
    assert_eq!(book.sheets.last().unwrap().identity(), LEGEND_ID);
}

// ═══════════════════════════════════════════════════════════════════════════
// EDITED WORKBOOKS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_edited_comment_is_written_back() {
    let dir = TempDir::new().unwrap();
    let (mut model, settings) = load();
    let path = export_to(dir.path(), &model, &settings, vec![]);

    let book = read_workbook(&path).unwrap();
    let sheet = book.sheet("Door Schedule").unwrap();
    let edited = with_cell(
        sheet,
        row_of(sheet, DOOR_200),
        column_of(sheet, "Comments"),
        CellValue::text("Closer required"),
    );
    let book = replace_sheet(&book, edited);

    let report = run_import(&mut model, &settings, &book, &[], &JobContext::detached())
        .unwrap()
        .completed()
        .unwrap();

    assert_eq!(report.changes, 1);
    let comment = model.parameter(ParamRef::new(ElementId(200), ParameterId(6003)));
    assert_eq!(comment.and_then(|p| p.as_string()), Some("Closer required"));
}

#[test]
fn test_read_only_column_edits_are_ignored() {
    let dir = TempDir::new().unwrap();
    let (mut model, settings) = load();
    let path = export_to(dir.path(), &model, &settings, vec![]);

    let book = read_workbook(&path).unwrap();
    let sheet = book.sheet("Door Schedule").unwrap();
    let edited = with_cell(
        sheet,
        row_of(sheet, DOOR_200),
        column_of(sheet, "Width"),
        CellValue::Number(1234.0),
    );
    let book = replace_sheet(&book, edited);

    let report = run_import(&mut model, &settings, &book, &[], &JobContext::detached())
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(report.changes, 0);
    assert_eq!(model.write_count(), 0);
}

#[test]
fn test_untranslatable_project_status_fails_only_that_sheet() {
    let dir = TempDir::new().unwrap();
    let (mut model, settings) = load();
    let path = export_to(dir.path(), &model, &settings, vec![StandardGroup::ProjectInformation]);

    let book = read_workbook(&path).unwrap();
    let info = book.sheet("Project Information").unwrap();
    let row = (4..=info.row_count())
        .find(|&r| info.text(r, 2) == "Project Status")
        .unwrap();
    assert_eq!(info.text(row, 3), "Construction");
    let book = replace_sheet(&book, with_cell(info, row, 3, CellValue::text("Demolished")));

    let report = run_import(&mut model, &settings, &book, &[], &JobContext::detached())
        .unwrap()
        .completed()
        .unwrap();

    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].source_name, "Project Information");
    assert!(report.imported.contains(&"Door Schedule".to_string()));
    assert!(!model.in_transaction());
}

// ═══════════════════════════════════════════════════════════════════════════
// UNKNOWN WORKBOOKS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_workbook_without_known_identity_is_rejected() {
    let (mut model, settings) = load();
    let book = WorkbookData {
        sheets: vec![SheetData::new(
            "Budget",
            vec![vec![CellValue::text("not-an-identity")]],
        )],
    };
    let err = run_import(&mut model, &settings, &book, &[], &JobContext::detached()).unwrap_err();
    assert!(matches!(err, BridgeError::Import(_)));
}

// ═══════════════════════════════════════════════════════════════════════════
// SESSIONS AND CANCELLATION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cancelled_export_writes_no_file() {
    let dir = TempDir::new().unwrap();
    let (model, settings) = load();
    let output = dir.path().join("cancelled.xlsx");
    let request = ExportRequest {
        schedules: vec!["Door Schedule".to_string()],
        standards: StandardGroup::ALL.to_vec(),
        basic: false,
        output: output.clone(),
    };
    let cx = JobContext::detached();
    cx.cancel_token().cancel();

    let outcome = run_export(&model, &settings, &request, &cx).unwrap();
    assert!(outcome.is_cancelled());
    assert!(!output.exists());
}

#[test]
fn test_session_runs_export_and_reports_progress() {
    let dir = TempDir::new().unwrap();
    let (model, settings) = load();
    let request = ExportRequest {
        schedules: vec!["Door Schedule".to_string()],
        standards: vec![StandardGroup::ObjectStyles],
        basic: false,
        output: dir.path().join("session.xlsx"),
    };

    let session = Session::new();
    let worker = session.spawn(model, move |model, cx| run_export(&*model, &settings, &request, cx));
    let (model, outcome) = worker.join().unwrap();

    let summary = match outcome {
        Outcome::Completed(summary) => summary,
        Outcome::Cancelled => panic!("export was not cancelled"),
    };
    assert!(summary.path.exists());
    assert_eq!(model.schedules().len(), 1);

    let events: Vec<Progress> = session.progress().try_iter().collect();
    assert!(matches!(events.first(), Some(Progress::Started { .. })));
    assert!(events.iter().any(|p| matches!(p, Progress::Sheet { name, .. } if name == "Door Schedule")));
}
