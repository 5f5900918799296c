//! Schedule sheet import: write edited cells back through the same field
//! resolution used by the export.

use crate::core::table::{dedupe_names, FAMILY_AND_TYPE_COLUMN, ID_COLUMN};
use crate::core::{write_cell, FieldResolver, PermissionPolicy, ReadOnlySet, TranslationTable, WriteOutcome};
use crate::error::{BridgeError, BridgeResult};
use crate::excel::layout::{FIRST_DATA_ROW, MACHINE_HEADER_ROW};
use crate::excel::SheetData;
use crate::model::{HostModel, ParamRef};
use crate::session::{JobContext, Progress};
use crate::settings::{schedule_location, ParametersSettings};
use crate::types::{CellValue, ElementId, ScheduleDefinition, ScheduleField};
use std::collections::HashMap;

/// First column holding a schedule field.
const FIRST_FIELD_COLUMN: u16 = 3;

pub struct ScheduleImporter<'a> {
    settings: &'a ParametersSettings,
    forced: &'a ReadOnlySet,
}

impl<'a> ScheduleImporter<'a> {
    pub fn new(settings: &'a ParametersSettings, forced: &'a ReadOnlySet) -> Self {
        Self { settings, forced }
    }

    /// Column names as the export wrote them, mapped back to their fields.
    fn field_dictionary<'s>(&self, schedule: &'s ScheduleDefinition) -> HashMap<String, &'s ScheduleField> {
        let location = schedule_location(&schedule.name);
        let fields: Vec<&ScheduleField> = schedule
            .fields
            .iter()
            .filter(|f| self.settings.can_export_field(&f.name, &location))
            .collect();
        let names = dedupe_names(
            fields.iter().map(|f| f.name.as_str()),
            &[ID_COLUMN, FAMILY_AND_TYPE_COLUMN],
        );
        names.into_iter().zip(fields).collect()
    }

    /// Sheet columns matched to schedule fields through the hidden header.
    fn mapped_columns<'s>(
        &self,
        schedule: &'s ScheduleDefinition,
        sheet: &SheetData,
    ) -> Vec<(u16, &'s ScheduleField)> {
        let dictionary = self.field_dictionary(schedule);
        (FIRST_FIELD_COLUMN..=sheet.column_count())
            .filter_map(|col| {
                let name = sheet.text(MACHINE_HEADER_ROW, col);
                match dictionary.get(&name) {
                    Some(field) => Some((col, *field)),
                    None => {
                        if !name.is_empty() {
                            tracing::debug!("Column '{}' matches no field of '{}'", name, schedule.name);
                        }
                        None
                    }
                }
            })
            .collect()
    }

    /// Apply the sheet to the model. The caller owns the transaction.
    /// Returns the number of parameters written, or `None` when cancelled.
    pub fn import(
        &self,
        model: &mut dyn HostModel,
        schedule_id: ElementId,
        sheet: &SheetData,
        cx: &JobContext,
    ) -> BridgeResult<Option<usize>> {
        let schedule = model
            .schedules()
            .iter()
            .find(|s| s.id == schedule_id)
            .cloned()
            .ok_or_else(|| BridgeError::Import(format!("Schedule {} not found", schedule_id)))?;
        let columns = self.mapped_columns(&schedule, sheet);
        let translations = TranslationTable::at(self.settings, &schedule_location(&schedule.name));
        let policy = PermissionPolicy::new(self.forced);

        let last_row = sheet.row_count();
        let mut written = 0;
        for row in FIRST_DATA_ROW..=last_row {
            if cx.is_cancelled() {
                return Ok(None);
            }
            cx.report(Progress::Row {
                current: (row - FIRST_DATA_ROW) as usize + 1,
                total: last_row.saturating_sub(FIRST_DATA_ROW - 1) as usize,
            });
            let unique_id = sheet.text(row, 1);
            if unique_id.is_empty() {
                continue;
            }

            let plan: Vec<(ParamRef, &ScheduleField, CellValue)> = {
                let view: &dyn HostModel = &*model;
                let Some(element) = view.element_by_unique_id(&unique_id) else {
                    tracing::debug!("Row {}: no element with id '{}'", row, unique_id);
                    continue;
                };
                let resolver = FieldResolver::new(view);
                let phase = resolver.element_phase(element);
                let mut plan = Vec::new();
                for &(col, field) in &columns {
                    if cx.is_cancelled() {
                        return Ok(None);
                    }
                    let Some(resolved) = resolver.resolve(element, field, phase) else {
                        continue;
                    };
                    if policy.is_read_only(Some(resolved.parameter), field) {
                        continue;
                    }
                    let mut cell = sheet.value(row, col);
                    let name = &resolved.parameter.name;
                    if !cell.is_empty() && translations.applies_to(name) {
                        cell = CellValue::Text(translations.text_to_value(name, &cell.as_text())?);
                    }
                    plan.push((resolved.target(), field, cell));
                }
                plan
            };

            for (target, field, cell) in plan {
                if write_cell(model, target, Some(field), &cell)? == WriteOutcome::Written {
                    written += 1;
                }
            }
        }
        tracing::debug!("Schedule '{}': {} parameter(s) written", schedule.name, written);
        Ok(Some(written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelSnapshot;
    use crate::types::ParameterId;

    const MODEL: &str = r#"
elements:
  - id: 20
    unique_id: door-20
    name: Door
    kind: family_instance
    parameters:
      - { id: 100, name: Mark, storage: string, kind: text, value: D1 }
      - { id: 101, name: Mark, storage: string, kind: text, value: X }
      - { id: 200, name: Status, storage: string, kind: text, value: "1" }
      - { id: 300, name: Area, storage: double, kind: area, read_only: true, value: 2.0 }
schedules:
  - id: 500
    unique_id: sched-doors
    name: Doors
    fields:
      - { name: Mark, kind: instance, parameter_id: 100 }
      - { name: Mark, kind: instance, parameter_id: 101 }
      - { name: Status, kind: instance, parameter_id: 200 }
      - { name: Area, kind: instance, parameter_id: 300 }
      - { name: Count, kind: count }
    elements: [20]
"#;

    const SETTINGS: &str = r#"
parameter_translations:
  - location: ViewSchedule_Doors
    name: Status
    translations:
      - { text: Open, value: "1" }
      - { text: Closed, value: "2" }
"#;

    fn sheet(rows: Vec<Vec<CellValue>>) -> SheetData {
        let t = CellValue::text;
        let mut all = vec![
            vec![t("sched-doors")],
            vec![t("ID"), t("FamilyAndType"), t("Mark"), t("Mark(1)"), t("Status"), t("Area"), t("Count")],
            vec![t(""), t(""), t("Mark"), t("Mark"), t("Status"), t("Area"), t("Count")],
            vec![t(""), t(""), t("Text"), t("Text"), t("Text"), t("Area"), t("")],
        ];
        all.extend(rows);
        SheetData::new("Doors", all)
    }

    fn run(model: &mut ModelSnapshot, data: &SheetData, cx: &JobContext) -> BridgeResult<Option<usize>> {
        let settings = ParametersSettings::from_yaml_str(SETTINGS).unwrap();
        let forced = ReadOnlySet::from_settings(&settings);
        model.begin_transaction("test").unwrap();
        let result = ScheduleImporter::new(&settings, &forced).import(model, ElementId(500), data, cx);
        model.commit_transaction().unwrap();
        result
    }

    fn text_of(model: &ModelSnapshot, id: i64) -> String {
        model
            .element(ElementId(20))
            .unwrap()
            .parameter(ParameterId(id))
            .unwrap()
            .as_string()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_unchanged_sheet_writes_nothing() {
        let mut model = ModelSnapshot::from_yaml_str(MODEL).unwrap();
        let t = CellValue::text;
        let data = sheet(vec![vec![
            t("door-20"),
            t(": "),
            t("D1"),
            t("X"),
            t("Open"),
            CellValue::Number(2.0),
            CellValue::Number(1.0),
        ]]);
        let written = run(&mut model, &data, &JobContext::detached()).unwrap();
        assert_eq!(written, Some(0));
        assert_eq!(model.write_count(), 0);
    }

    #[test]
    fn test_edits_follow_deduplicated_columns_and_translations() {
        let mut model = ModelSnapshot::from_yaml_str(MODEL).unwrap();
        let t = CellValue::text;
        let data = sheet(vec![
            vec![t("door-20"), t(""), t("D1"), t("Y"), t("Closed"), CellValue::Number(9.0)],
            vec![t(""), t(""), t("subtotal")],
            vec![t("missing-element"), t(""), t("Z")],
        ]);
        let written = run(&mut model, &data, &JobContext::detached()).unwrap();
        assert_eq!(written, Some(2));
        assert_eq!(text_of(&model, 100), "D1");
        assert_eq!(text_of(&model, 101), "Y");
        assert_eq!(text_of(&model, 200), "2");
    }

    #[test]
    fn test_unknown_translation_fails_the_sheet() {
        let mut model = ModelSnapshot::from_yaml_str(MODEL).unwrap();
        let t = CellValue::text;
        let data = sheet(vec![vec![t("door-20"), t(""), t("D1"), t("X"), t("Ajar")]]);
        let err = run(&mut model, &data, &JobContext::detached()).unwrap_err();
        assert!(matches!(err, BridgeError::Translation(text) if text == "Ajar"));
    }

    #[test]
    fn test_untranslated_stored_value_fails_unedited_sheet() {
        // Stored "9" has no entry, so the export shows "9" and import rejects it.
        let mut model = ModelSnapshot::from_yaml_str(&MODEL.replace("value: \"1\"", "value: \"9\"")).unwrap();
        let t = CellValue::text;
        let data = sheet(vec![vec![t("door-20"), t(""), t("D1"), t("X"), t("9")]]);
        let err = run(&mut model, &data, &JobContext::detached()).unwrap_err();
        assert!(matches!(err, BridgeError::Translation(text) if text == "9"));
        assert_eq!(text_of(&model, 200), "9");
    }

    #[test]
    fn test_cancelled_import_stops() {
        let mut model = ModelSnapshot::from_yaml_str(MODEL).unwrap();
        let t = CellValue::text;
        let data = sheet(vec![vec![t("door-20"), t(""), t("Changed")]]);
        let cx = JobContext::detached();
        cx.cancel_token().cancel();
        assert_eq!(run(&mut model, &data, &cx).unwrap(), None);
        assert_eq!(text_of(&model, 100), "D1");
    }
}
