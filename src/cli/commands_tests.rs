use super::*;
use crate::export::Standard;
use crate::model::ModelSnapshot;
use tempfile::TempDir;

const PROJECT: &str = include_str!("../../test-data/project.yaml");
const SETTINGS: &str = include_str!("../../test-data/settings.yaml");

fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("project.yaml");
    let settings = dir.path().join("settings.yaml");
    std::fs::write(&model, PROJECT).unwrap();
    std::fs::write(&settings, SETTINGS).unwrap();
    (dir, model, settings)
}

fn reload(path: &Path) -> ModelSnapshot {
    parser::parse_snapshot(path).unwrap()
}

// =========================================================================
// load_settings Tests
// =========================================================================

#[test]
fn test_load_settings_default_when_absent() {
    assert_eq!(load_settings(None).unwrap(), ParametersSettings::default());
}

#[test]
fn test_load_settings_from_file() {
    let (_dir, _, settings) = workspace();
    let loaded = load_settings(Some(&settings)).unwrap();
    assert_eq!(loaded.parameter_translations.len(), 1);
}

#[test]
fn test_load_settings_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(load_settings(Some(&dir.path().join("nope.yaml"))).is_err());
}

// =========================================================================
// export Tests
// =========================================================================

#[test]
fn test_export_all_schedules_by_default() {
    let (dir, model, settings) = workspace();
    let output = dir.path().join("out.xlsx");
    export(model, output.clone(), vec![], vec![], false, Some(settings), false).unwrap();

    let book = read_workbook(&output).unwrap();
    let names: Vec<&str> = book.sheets.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Door Schedule", "Legend"]);
}

#[test]
fn test_export_standards_only() {
    let (dir, model, settings) = workspace();
    let output = dir.path().join("standards.xlsx");
    export(
        model,
        output.clone(),
        vec![],
        vec![StandardGroup::LineStyles, StandardGroup::ProjectInformation],
        false,
        Some(settings),
        true,
    )
    .unwrap();

    let book = read_workbook(&output).unwrap();
    let info = book.sheet("Project Information").unwrap();
    assert_eq!(info.identity(), Standard::ProjectInformation.id());
    assert!(book.sheet("Line Styles").is_some());
    assert!(book.sheet("Door Schedule").is_none());
}

#[test]
fn test_export_unknown_schedule_fails() {
    let (dir, model, _) = workspace();
    let output = dir.path().join("out.xlsx");
    let result = export(model, output.clone(), vec!["Windows".into()], vec![], false, None, false);
    assert!(result.is_err());
    assert!(!output.exists());
}

// =========================================================================
// import Tests
// =========================================================================

#[test]
fn test_import_unchanged_workbook_keeps_model() {
    let (dir, model, settings) = workspace();
    let output = dir.path().join("out.xlsx");
    export(model.clone(), output.clone(), vec![], vec![StandardGroup::ObjectStyles], false, Some(settings.clone()), false)
        .unwrap();

    let written = dir.path().join("after.yaml");
    import(model.clone(), output, vec![], Some(settings), Some(written.clone()), false, false).unwrap();

    let before = reload(&model);
    let after = reload(&written);
    assert_eq!(before.elements, after.elements);
    assert_eq!(before.categories, after.categories);
}

#[test]
fn test_import_dry_run_writes_nothing() {
    let (dir, model, _) = workspace();
    let output = dir.path().join("out.xlsx");
    export(model.clone(), output.clone(), vec![], vec![], false, None, false).unwrap();

    let written = dir.path().join("after.yaml");
    import(model, output, vec![], None, Some(written.clone()), true, false).unwrap();
    assert!(!written.exists());
}

// =========================================================================
// inspect Tests
// =========================================================================

#[test]
fn test_inspect_exported_workbook() {
    let (dir, model, _) = workspace();
    let output = dir.path().join("out.xlsx");
    export(model.clone(), output.clone(), vec![], vec![StandardGroup::FamilyListing], false, None, false)
        .unwrap();
    assert!(inspect(output, model).is_ok());
}

#[test]
fn test_inspect_foreign_workbook_fails() {
    let (dir, model, _) = workspace();
    let path = dir.path().join("foreign.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    workbook
        .add_worksheet()
        .write_string(0, 0, "hello")
        .unwrap();
    workbook.save(&path).unwrap();
    assert!(inspect(path, model).is_err());
}
