//! Schedule export: model → flat table → laid-out sheet.

use crate::core::filter::RowFilter;
use crate::core::resolver::hops;
use crate::core::sorter::{sort_spec, sort_table};
use crate::core::table::{dedupe_names, FlatRow, FlatTable, FAMILY_AND_TYPE_COLUMN, ID_COLUMN};
use crate::core::{FieldResolver, PermissionPolicy, ReadOnlySet, TranslationTable, ValueCodec};
use crate::error::BridgeResult;
use crate::excel::layout::{last_row_per_type, ColumnSpec, GroupLevel, ScheduleLayout};
use crate::excel::styles::CellStyle;
use crate::excel::SheetGrid;
use crate::model::HostModel;
use crate::session::{JobContext, Progress};
use crate::settings::{schedule_location, ParametersSettings};
use crate::types::{
    CellValue, Element, ElementKind, Parameter, ParameterType, ScheduleDefinition, ScheduleField,
    ScheduleKind,
};
use crate::units::number_format;

/// Value-kind label shown under a column heading.
pub fn kind_label(parameter: &Parameter) -> String {
    match parameter.kind {
        ParameterType::Invalid => parameter.storage.label().to_string(),
        ParameterType::YesNo => "TrueFalse".to_string(),
        other => other.label().to_string(),
    }
}

/// `"Family: Type"` label of an element's type.
pub fn family_and_type(model: &dyn HostModel, element: &Element) -> String {
    match hops::type_of(model, element) {
        Some(ty) => format!(
            "{}: {}",
            ty.family_name.as_deref().unwrap_or_default().trim(),
            ty.name.trim()
        ),
        None => String::new(),
    }
}

/// A schedule flattened into rows, with the presentation of each column.
#[derive(Debug, Clone)]
pub struct ScheduleTable {
    pub table: FlatTable,
    pub columns: Vec<ColumnSpec>,
    pub groups: Vec<GroupLevel>,
}

pub struct ScheduleExporter<'a> {
    model: &'a dyn HostModel,
    settings: &'a ParametersSettings,
    forced: &'a ReadOnlySet,
}

impl<'a> ScheduleExporter<'a> {
    pub fn new(
        model: &'a dyn HostModel,
        settings: &'a ParametersSettings,
        forced: &'a ReadOnlySet,
    ) -> Self {
        Self {
            model,
            settings,
            forced,
        }
    }

    /// Fields not excluded by the settings at this schedule's location.
    fn exported_fields<'s>(&self, schedule: &'s ScheduleDefinition) -> Vec<&'s ScheduleField> {
        let location = schedule_location(&schedule.name);
        schedule
            .fields
            .iter()
            .filter(|f| self.settings.can_export_field(&f.name, &location))
            .collect()
    }

    fn scheduled_elements(&self, schedule: &ScheduleDefinition) -> Vec<&'a Element> {
        schedule
            .elements
            .iter()
            .filter_map(|id| {
                let element = self.model.element(*id);
                if element.is_none() {
                    tracing::debug!("Schedule '{}' lists unknown element {}", schedule.name, id);
                }
                element
            })
            .filter(|e| !e.kind.is_element_type() && e.kind != ElementKind::LinkInstance)
            .filter(|e| !e.name.is_empty() || schedule.kind == ScheduleKind::AnalyticalNodes)
            .collect()
    }

    /// Resolve every cell of the schedule, then filter and sort the rows.
    /// Returns `None` when cancelled.
    pub fn build_table(
        &self,
        schedule: &ScheduleDefinition,
        cx: &JobContext,
    ) -> BridgeResult<Option<ScheduleTable>> {
        let fields = self.exported_fields(schedule);
        let mut names = vec![ID_COLUMN.to_string(), FAMILY_AND_TYPE_COLUMN.to_string()];
        names.extend(dedupe_names(
            fields.iter().map(|f| f.name.as_str()),
            &[ID_COLUMN, FAMILY_AND_TYPE_COLUMN],
        ));
        let mut table = FlatTable::new(&schedule.name, names);

        let resolver = FieldResolver::new(self.model);
        let codec = ValueCodec::new(self.model);
        let policy = PermissionPolicy::new(self.forced);
        let translations = TranslationTable::at(self.settings, &schedule_location(&schedule.name));
        let mut samples: Vec<Option<&Parameter>> = vec![None; fields.len()];

        let elements = self.scheduled_elements(schedule);
        for (i, &element) in elements.iter().enumerate() {
            cx.report(Progress::Row {
                current: i + 1,
                total: elements.len(),
            });
            let mut row = FlatRow::new(table.width());
            row.set(0, CellValue::text(&element.unique_id), true);
            row.set(1, CellValue::text(family_and_type(self.model, element)), true);

            let phase = resolver.element_phase(element);
            for (f, field) in fields.iter().enumerate() {
                if cx.is_cancelled() {
                    return Ok(None);
                }
                let resolved = resolver.resolve(element, field, phase);
                let parameter = resolved.map(|r| r.parameter);
                if samples[f].is_none() {
                    samples[f] = parameter;
                }
                let value = codec.cell_value(element, field, parameter, &translations);
                row.set(2 + f, value, policy.is_read_only(parameter, field));
            }
            table.push(row);
        }

        RowFilter::compile(schedule, &table.columns).apply(&mut table);

        let spec = sort_spec(schedule);
        if !spec.is_empty() {
            match sort_table(&table, &spec) {
                Ok(sorted) => table = sorted,
                Err(e) => tracing::warn!("Keeping '{}' unsorted: {}", schedule.name, e),
            }
        }

        let mut columns = vec![
            ColumnSpec::fixed(ID_COLUMN),
            ColumnSpec::fixed(FAMILY_AND_TYPE_COLUMN),
        ];
        for (f, field) in fields.iter().enumerate() {
            let sample = samples[f];
            let unit = field
                .unit_override()
                .or(sample.and_then(|p| p.unit))
                .or(field.unit);
            columns.push(ColumnSpec {
                name: table.columns[2 + f].clone(),
                heading: field.heading().to_string(),
                kind_label: sample.map(kind_label).unwrap_or_default(),
                field_kind: Some(field.kind),
                hidden: field.hidden,
                totals: field.totals,
                number_format: unit.and_then(|u| number_format(&u.label())),
            });
        }

        let groups = schedule
            .sort_group
            .iter()
            .filter_map(|g| {
                let column = table.columns.iter().position(|c| *c == g.field)?;
                Some(GroupLevel {
                    column,
                    show_footer: g.show_footer,
                })
            })
            .collect();

        Ok(Some(ScheduleTable {
            table,
            columns,
            groups,
        }))
    }

    /// The full round-trip sheet of a schedule. Returns `None` when cancelled.
    pub fn export(
        &self,
        schedule: &ScheduleDefinition,
        cx: &JobContext,
    ) -> BridgeResult<Option<SheetGrid>> {
        let Some(built) = self.build_table(schedule, cx)? else {
            return Ok(None);
        };
        let canonical_rows = last_row_per_type(&built.table);
        ScheduleLayout {
            identity: &schedule.unique_id,
            sheet_name: &schedule.name,
            table: &built.table,
            columns: &built.columns,
            groups: &built.groups,
            itemized: schedule.itemized,
            canonical_rows: &canonical_rows,
        }
        .build(cx.cancel_token())
    }

    /// Visible cell values only: no identity, locking or grouping. Sheets
    /// written this way cannot be imported back.
    pub fn export_basic(
        &self,
        schedule: &ScheduleDefinition,
        cx: &JobContext,
    ) -> BridgeResult<Option<SheetGrid>> {
        let Some(built) = self.build_table(schedule, cx)? else {
            return Ok(None);
        };
        let visible: Vec<(usize, &ColumnSpec)> = built
            .columns
            .iter()
            .enumerate()
            .skip(2)
            .filter(|(_, c)| !c.hidden)
            .collect();

        let mut grid = SheetGrid::new(&schedule.name);
        for (out, (_, column)) in visible.iter().enumerate() {
            let col = out as u16 + 1;
            grid.set_value(1, col, CellValue::text(&column.heading));
            grid.set_style(1, col, CellStyle::header());
        }
        for (r, row) in built.table.rows.iter().enumerate() {
            let at = r as u32 + 2;
            for (out, (index, column)) in visible.iter().enumerate() {
                let col = out as u16 + 1;
                grid.set_value(at, col, row.values[*index].clone());
                if let Some(format) = &column.number_format {
                    grid.set_style(at, col, CellStyle::default().with_num_format(Some(format)));
                }
            }
        }
        grid.freeze_rows(1);
        Ok(Some(grid))
    }
}
