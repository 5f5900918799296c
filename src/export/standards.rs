//! Project standards export: category line styles, family listing,
//! parameter definitions and project information.
//!
//! Every standard sheet carries its identity in the hidden A1 cell, a hidden
//! machine header on row 2 and the visible header on row 3. Data starts on
//! row 4 and column 1 (the id) is hidden.

use crate::core::TranslationTable;
use crate::error::BridgeResult;
use crate::excel::styles::CellStyle;
use crate::excel::SheetGrid;
use crate::model::HostModel;
use crate::session::JobContext;
use crate::settings::{ParametersSettings, PROJECT_INFORMATION_LOCATION};
use crate::types::{Category, CategoryId, CategoryKind, CellValue, ParameterType};
use std::collections::BTreeMap;

/// Row holding the standard identity.
pub const IDENTITY_ROW: u32 = 1;
/// Hidden header with the machine column names read back on import.
pub const FIELD_HEADER_ROW: u32 = 2;
pub const DISPLAY_HEADER_ROW: u32 = 3;
pub const FIRST_DATA_ROW: u32 = 4;

pub const BANNER_TEXT: &str = "This table cannot be imported";

/// Built-in category holding the line styles as subcategories.
pub const LINES_CATEGORY: CategoryId = CategoryId(-2000051);

const CHILD_PREFIX: &str = "      |----  ";

pub const COL_LINE_WEIGHT_PROJECTION: &str = "Line Weight - Projection";
pub const COL_LINE_WEIGHT_CUT: &str = "Line Weight - Cut";
pub const COL_LINE_COLOR: &str = "Line Color (R,G,B)";

/// The groups a user picks from when exporting standards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum StandardGroup {
    LineStyles,
    ObjectStyles,
    FamilyListing,
    SharedParameters,
    ProjectParameters,
    ProjectInformation,
}

impl StandardGroup {
    pub const ALL: [StandardGroup; 6] = [
        StandardGroup::LineStyles,
        StandardGroup::ObjectStyles,
        StandardGroup::FamilyListing,
        StandardGroup::SharedParameters,
        StandardGroup::ProjectParameters,
        StandardGroup::ProjectInformation,
    ];

    pub fn id(self) -> &'static str {
        match self {
            StandardGroup::LineStyles => "014AC4AB-A153-4C04-A883-87D7B492F6B3",
            StandardGroup::ObjectStyles => "D5188A53-7377-4FF3-8BDB-860926239A9B",
            StandardGroup::FamilyListing => "1BD3D396-C580-40B7-89B3-A8349158E871",
            StandardGroup::SharedParameters => "46DE8088-F939-4F7C-9150-9CD4F1E25B77",
            StandardGroup::ProjectParameters => "39AC2AF0-614D-4A4A-AD8E-63B9ADA91775",
            StandardGroup::ProjectInformation => "EAC2EF30-980B-45F7-A6AE-1116E0D0BD6C",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StandardGroup::LineStyles => "Line Styles",
            StandardGroup::ObjectStyles => "Object Styles",
            StandardGroup::FamilyListing => "Family Listing",
            StandardGroup::SharedParameters => "Shared Parameters",
            StandardGroup::ProjectParameters => "Project Parameters",
            StandardGroup::ProjectInformation => "Project Information",
        }
    }

    /// Sheets this group exports, in order.
    pub fn standards(self) -> &'static [Standard] {
        match self {
            StandardGroup::LineStyles => &[Standard::LineStyles],
            StandardGroup::ObjectStyles => &[
                Standard::AnnotationObjects,
                Standard::ModelObjects,
                Standard::AnalyticalModelObjects,
            ],
            StandardGroup::FamilyListing => &[Standard::FamilyListing],
            StandardGroup::SharedParameters => &[Standard::SharedParameters],
            StandardGroup::ProjectParameters => &[Standard::ProjectParameters],
            StandardGroup::ProjectInformation => &[Standard::ProjectInformation],
        }
    }
}

/// One standard sheet, identified by the GUID stored in its A1 cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Standard {
    LineStyles,
    AnnotationObjects,
    ModelObjects,
    AnalyticalModelObjects,
    FamilyListing,
    SharedParameters,
    ProjectParameters,
    ProjectInformation,
}

impl Standard {
    pub const ALL: [Standard; 8] = [
        Standard::LineStyles,
        Standard::AnnotationObjects,
        Standard::ModelObjects,
        Standard::AnalyticalModelObjects,
        Standard::FamilyListing,
        Standard::SharedParameters,
        Standard::ProjectParameters,
        Standard::ProjectInformation,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Standard::LineStyles => "B1BE8541-A03F-43D2-91B3-9E482519F899",
            Standard::AnnotationObjects => "F1E71406-CD04-44A0-8B94-BD54AB435714",
            Standard::ModelObjects => "0553FD22-9454-47C1-8592-C2B2785C9F08",
            Standard::AnalyticalModelObjects => "1592B2F9-814D-4EC2-A549-2681A0DE20EC",
            Standard::FamilyListing => "4E610F90-C02D-4528-B1C5-C9168CC3B308",
            Standard::SharedParameters => "C6950EA3-FFBF-49DD-82C7-9855BD27A35A",
            Standard::ProjectParameters => "A82D5634-F4EB-43FA-AB1E-D0CAE6C77DAF",
            Standard::ProjectInformation => "1AFA95D4-A5CB-42E9-9927-3DB4E26CACCE",
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            Standard::LineStyles => "Line Styles",
            Standard::AnnotationObjects => "Annotation Objects",
            Standard::ModelObjects => "Model Objects",
            Standard::AnalyticalModelObjects => "Analytical Model Objects",
            Standard::FamilyListing => "Family Listing",
            Standard::SharedParameters => "Shared Project Parameters",
            Standard::ProjectParameters => "Project Parameters",
            Standard::ProjectInformation => "Project Information",
        }
    }

    pub fn from_id(id: &str) -> Option<Standard> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.id().eq_ignore_ascii_case(id))
    }

    /// Whether the sheet can be imported back into the model.
    pub fn is_importable(self) -> bool {
        !matches!(
            self,
            Standard::FamilyListing | Standard::SharedParameters | Standard::ProjectParameters
        )
    }

    /// Category kind listed by an object style sheet.
    pub fn category_kind(self) -> Option<CategoryKind> {
        match self {
            Standard::AnnotationObjects => Some(CategoryKind::Annotation),
            Standard::ModelObjects => Some(CategoryKind::Model),
            Standard::AnalyticalModelObjects => Some(CategoryKind::AnalyticalModel),
            _ => None,
        }
    }

    /// Only the model objects sheet carries a cut line weight column.
    pub fn has_cut_weight(self) -> bool {
        self == Standard::ModelObjects
    }
}

fn by_name(categories: &[Category]) -> Vec<&Category> {
    let mut sorted: Vec<&Category> = categories.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

/// Identity, hidden machine header and display header.
fn start_sheet(grid: &mut SheetGrid, standard: Standard, headers: &[&str]) {
    grid.set_value(IDENTITY_ROW, 1, CellValue::text(standard.id()));
    grid.hide_row(IDENTITY_ROW);
    let last = headers.len() as u16;
    for (i, header) in headers.iter().enumerate() {
        let col = i as u16 + 1;
        grid.set_value(FIELD_HEADER_ROW, col, CellValue::text(*header));
        grid.set_value(DISPLAY_HEADER_ROW, col, CellValue::text(*header));
    }
    grid.hide_row(FIELD_HEADER_ROW);
    grid.style_row(DISPLAY_HEADER_ROW, 1, last, &CellStyle::header());
    grid.freeze_rows(DISPLAY_HEADER_ROW);
    grid.protect();
}

/// Merged notice closing a sheet that cannot be imported.
fn add_banner(grid: &mut SheetGrid, last_col: u16) {
    let row = grid.row_count() + 1;
    grid.set_value(row, 1, CellValue::text(BANNER_TEXT));
    grid.style_row(row, 1, last_col, &CellStyle::banner());
    grid.merge(row, 1, last_col);
}

fn yes_no(flag: bool) -> CellValue {
    CellValue::text(if flag { "True" } else { "False" })
}

pub struct StandardsExporter<'a> {
    model: &'a dyn HostModel,
    settings: &'a ParametersSettings,
}

impl<'a> StandardsExporter<'a> {
    pub fn new(model: &'a dyn HostModel, settings: &'a ParametersSettings) -> Self {
        Self { model, settings }
    }

    /// Sheets of one standards group. Returns `None` when cancelled.
    pub fn export(
        &self,
        group: StandardGroup,
        cx: &JobContext,
    ) -> BridgeResult<Option<Vec<SheetGrid>>> {
        let mut sheets = Vec::new();
        for &standard in group.standards() {
            if cx.is_cancelled() {
                return Ok(None);
            }
            let sheet = match standard {
                Standard::LineStyles => self.line_styles(),
                Standard::AnnotationObjects
                | Standard::ModelObjects
                | Standard::AnalyticalModelObjects => self.object_styles(standard, cx),
                Standard::FamilyListing => self.family_listing(cx),
                Standard::SharedParameters => self.shared_parameters(),
                Standard::ProjectParameters => self.project_parameters(),
                Standard::ProjectInformation => self.project_information()?,
            };
            if cx.is_cancelled() {
                return Ok(None);
            }
            if let Some(sheet) = sheet {
                sheets.push(sheet);
            }
        }
        Ok(Some(sheets))
    }

    fn category_sheet(standard: Standard) -> SheetGrid {
        let mut grid = SheetGrid::new(standard.sheet_name());
        let mut headers = vec!["ID", "Category", COL_LINE_WEIGHT_PROJECTION];
        if standard.has_cut_weight() {
            headers.push(COL_LINE_WEIGHT_CUT);
        }
        headers.push(COL_LINE_COLOR);
        start_sheet(&mut grid, standard, &headers);
        grid.hide_column(1);
        grid
    }

    /// One row for `category`, then one per subcategory sorted by name.
    fn write_category(grid: &mut SheetGrid, category: &Category, cut: bool) {
        let rows = std::iter::once((category, category.name.clone())).chain(
            by_name(&category.subcategories)
                .into_iter()
                .map(|sub| (sub, format!("{}{}", CHILD_PREFIX, sub.name))),
        );
        for (cat, label) in rows {
            let row = grid.row_count() + 1;
            grid.set_value(row, 1, CellValue::text(cat.id.to_string()));
            grid.set_value(row, 2, CellValue::text(label));
            grid.style_row(row, 1, 2, &CellStyle::cell_locked());

            let mut values = vec![cat
                .line_weight_projection
                .map(|w| CellValue::Number(w as f64))
                .unwrap_or_default()];
            if cut {
                values.push(
                    cat.line_weight_cut
                        .map(|w| CellValue::Number(w as f64))
                        .unwrap_or_default(),
                );
            }
            values.push(
                cat.line_color
                    .map(|c| CellValue::text(c.to_string()))
                    .unwrap_or_default(),
            );
            for (i, value) in values.into_iter().enumerate() {
                let col = 3 + i as u16;
                grid.set_value(row, col, value);
                grid.set_style(row, col, CellStyle::cell_unlocked().centered());
            }
        }
    }

    fn line_styles(&self) -> Option<SheetGrid> {
        let lines = self
            .model
            .category(LINES_CATEGORY)
            .or_else(|| self.model.categories().iter().find(|c| c.name == "Lines"))?;
        let mut grid = Self::category_sheet(Standard::LineStyles);
        Self::write_category(&mut grid, lines, false);
        Some(grid)
    }

    fn object_styles(&self, standard: Standard, cx: &JobContext) -> Option<SheetGrid> {
        let kind = standard.category_kind()?;
        let mut grid = Self::category_sheet(standard);
        let categories = by_name(self.model.categories());
        for category in categories.into_iter().filter(|c| c.kind == kind) {
            if cx.is_cancelled() {
                return None;
            }
            Self::write_category(&mut grid, category, standard.has_cut_weight());
        }
        Some(grid)
    }

    /// Families grouped under their category name. Read-only.
    fn family_listing(&self, cx: &JobContext) -> Option<SheetGrid> {
        let mut grid = SheetGrid::new(Standard::FamilyListing.sheet_name());
        start_sheet(&mut grid, Standard::FamilyListing, &["Name"]);

        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for family in self.model.families() {
            grouped
                .entry(family.category.as_str())
                .or_default()
                .push(family.name.as_str());
        }
        for (category, mut families) in grouped {
            if cx.is_cancelled() {
                return None;
            }
            families.sort_unstable();
            let row = grid.row_count() + 1;
            grid.set_value(row, 1, CellValue::text(category));
            grid.set_style(row, 1, CellStyle::cell_locked().bold());
            for family in families {
                let row = grid.row_count() + 1;
                grid.set_value(row, 1, CellValue::text(format!("{}{}", CHILD_PREFIX, family)));
                grid.set_style(row, 1, CellStyle::cell_locked());
            }
        }
        add_banner(&mut grid, 1);
        Some(grid)
    }

    /// Every bound parameter definition. Read-only.
    fn project_parameters(&self) -> Option<SheetGrid> {
        const HEADERS: [&str; 9] = [
            "GUID",
            "Name",
            "Group",
            "Type",
            "Instance Binding",
            "Visible",
            "Is Shared",
            "Owner Group Name",
            "Categories",
        ];
        let mut grid = SheetGrid::new(Standard::ProjectParameters.sheet_name());
        start_sheet(&mut grid, Standard::ProjectParameters, &HEADERS);
        for binding in self.model.parameter_bindings() {
            let row = grid.row_count() + 1;
            let values = [
                CellValue::text(binding.shared_guid.clone().unwrap_or_default()),
                CellValue::text(&binding.name),
                CellValue::text(&binding.group),
                CellValue::text(binding.parameter_type.label()),
                yes_no(binding.instance),
                yes_no(binding.visible),
                yes_no(binding.shared_guid.is_some()),
                CellValue::text(binding.owner_group.clone().unwrap_or_default()),
                CellValue::text(binding.categories.join(",")),
            ];
            for (i, value) in values.into_iter().enumerate() {
                grid.set_value(row, i as u16 + 1, value);
            }
            grid.style_row(row, 1, HEADERS.len() as u16, &CellStyle::cell_locked());
        }
        add_banner(&mut grid, HEADERS.len() as u16);
        Some(grid)
    }

    /// Shared parameter definitions. No sheet when the project has none.
    fn shared_parameters(&self) -> Option<SheetGrid> {
        const HEADERS: [&str; 5] = ["GUID", "Name", "Group", "Type", "Visible"];
        let shared: Vec<_> = self
            .model
            .parameter_bindings()
            .iter()
            .filter_map(|b| b.shared_guid.as_ref().map(|guid| (guid, b)))
            .collect();
        if shared.is_empty() {
            return None;
        }
        let mut grid = SheetGrid::new(Standard::SharedParameters.sheet_name());
        start_sheet(&mut grid, Standard::SharedParameters, &HEADERS);
        for (guid, binding) in shared {
            let row = grid.row_count() + 1;
            grid.set_value(row, 1, CellValue::text(guid));
            grid.set_value(row, 2, CellValue::text(&binding.name));
            grid.set_value(row, 3, CellValue::text(&binding.group));
            grid.set_value(row, 4, CellValue::text(binding.parameter_type.label()));
            grid.set_value(row, 5, yes_no(binding.visible));
            grid.style_row(row, 1, HEADERS.len() as u16, &CellStyle::cell_locked());
        }
        add_banner(&mut grid, HEADERS.len() as u16);
        Some(grid)
    }

    /// Writable text parameters of the project information element, ordered
    /// by group then name. A name is listed once.
    fn project_information(&self) -> BridgeResult<Option<SheetGrid>> {
        let Some(info) = self.model.project_info() else {
            tracing::warn!("Model has no project information element");
            return Ok(None);
        };
        let translations = TranslationTable::at(self.settings, PROJECT_INFORMATION_LOCATION);
        let mut grid = SheetGrid::new(Standard::ProjectInformation.sheet_name());
        start_sheet(&mut grid, Standard::ProjectInformation, &["ID", "Properties", "PValue"]);
        grid.hide_column(1);

        let mut parameters: Vec<_> = info
            .ordered_parameters()
            .iter()
            .filter(|p| !p.read_only && p.kind == ParameterType::Text)
            .filter(|p| {
                self.settings
                    .can_export_parameter(&p.name, PROJECT_INFORMATION_LOCATION)
            })
            .collect();
        parameters.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.name.cmp(&b.name)));
        parameters.dedup_by(|a, b| a.name == b.name);

        for parameter in parameters {
            let row = grid.row_count() + 1;
            let value = parameter.as_string().unwrap_or_default();
            grid.set_value(row, 1, CellValue::text(parameter.id.to_string()));
            grid.set_value(row, 2, CellValue::text(&parameter.name));
            grid.style_row(row, 1, 2, &CellStyle::cell_locked());
            grid.set_value(
                row,
                3,
                CellValue::text(translations.value_to_text(&parameter.name, value)),
            );
            grid.set_style(row, 3, CellStyle::cell_unlocked());
        }
        Ok(Some(grid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelSnapshot;
    use pretty_assertions::assert_eq;

    const MODEL: &str = r#"
name: Standards
categories:
  - id: -2000051
    name: Lines
    kind: annotation
    line_weight_projection: 1
    line_color: { red: 0, green: 0, blue: 0 }
    subcategories:
      - { id: 501, name: Wide Lines, kind: annotation, line_weight_projection: 5 }
      - { id: 502, name: Hidden Lines, kind: annotation, line_weight_projection: 2 }
  - id: -2000023
    name: Doors
    cuttable: true
    line_weight_projection: 1
    line_weight_cut: 3
  - id: -2000011
    name: Walls
    cuttable: true
    line_weight_projection: 2
    line_color: { red: 255, green: 0, blue: 0 }
families:
  - { id: 1, name: Single Door, category: Doors }
  - { id: 2, name: Double Door, category: Doors }
  - { id: 3, name: Basic Wall, category: Walls }
parameter_bindings:
  - { name: Cost Code, group: Data, parameter_type: text, instance: true, categories: [Doors, Walls] }
  - { name: Fire Zone, group: Data, parameter_type: text, shared_guid: 9f1c2a44-0000-4000-8000-000000000001, categories: [Doors] }
elements:
  - id: 1000
    unique_id: project-info
    name: Project Information
    kind: project_info
    parameters:
      - { id: 10, name: Project Name, storage: string, kind: text, group: Identity, value: Tower }
      - { id: 11, name: Client Name, storage: string, kind: text, group: Identity, value: ACME }
      - { id: 12, name: Status, storage: string, kind: text, group: Data, value: "1" }
      - { id: 13, name: Project Number, storage: string, kind: text, group: Identity, read_only: true, value: P-1 }
      - { id: 14, name: Floors, storage: integer, kind: integer, group: Data, value: 12 }
"#;

    const SETTINGS: &str = r#"
parameter_translations:
  - location: Project Information
    name: Status
    translations:
      - { text: Approved, value: "1" }
"#;

    fn export(group: StandardGroup) -> Vec<SheetGrid> {
        let model = ModelSnapshot::from_yaml_str(MODEL).unwrap();
        let settings = ParametersSettings::from_yaml_str(SETTINGS).unwrap();
        StandardsExporter::new(&model, &settings)
            .export(group, &JobContext::detached())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_standard_lookup_by_id() {
        assert_eq!(
            Standard::from_id("0553fd22-9454-47c1-8592-c2b2785c9f08"),
            Some(Standard::ModelObjects)
        );
        assert_eq!(Standard::from_id("nope"), None);
        assert!(!Standard::FamilyListing.is_importable());
        assert!(Standard::ProjectInformation.is_importable());
    }

    #[test]
    fn test_line_styles_sheet() {
        let sheets = export(StandardGroup::LineStyles);
        assert_eq!(sheets.len(), 1);
        let grid = &sheets[0];
        assert_eq!(grid.value(1, 1), CellValue::text(Standard::LineStyles.id()));
        assert!(grid.is_row_hidden(1) && grid.is_row_hidden(2));
        assert!(grid.is_column_hidden(1));
        assert_eq!(grid.value(2, 4), CellValue::text(COL_LINE_COLOR));
        assert_eq!(grid.value(4, 2), CellValue::text("Lines"));
        assert_eq!(grid.value(4, 4), CellValue::text("0, 0, 0"));
        assert_eq!(grid.value(5, 2), CellValue::text("      |----  Hidden Lines"));
        assert_eq!(grid.value(6, 3), CellValue::Number(5.0));
        assert!(!grid.style(6, 3).unwrap().locked);
        assert!(grid.style(6, 2).unwrap().locked);
    }

    #[test]
    fn test_object_styles_split_by_kind() {
        let sheets = export(StandardGroup::ObjectStyles);
        let names: Vec<&str> = sheets.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["Annotation Objects", "Model Objects", "Analytical Model Objects"]
        );
        let model = &sheets[1];
        assert_eq!(model.value(2, 4), CellValue::text(COL_LINE_WEIGHT_CUT));
        assert_eq!(model.value(4, 2), CellValue::text("Doors"));
        assert_eq!(model.value(4, 4), CellValue::Number(3.0));
        assert_eq!(model.value(5, 5), CellValue::text("255, 0, 0"));
        assert_eq!(sheets[2].row_count(), 3);
    }

    #[test]
    fn test_family_listing_is_grouped_and_closed_by_banner() {
        let sheets = export(StandardGroup::FamilyListing);
        let grid = &sheets[0];
        assert_eq!(grid.value(4, 1), CellValue::text("Doors"));
        assert_eq!(grid.value(5, 1), CellValue::text("      |----  Double Door"));
        assert_eq!(grid.value(7, 1), CellValue::text("Walls"));
        assert_eq!(grid.value(9, 1), CellValue::text(BANNER_TEXT));
        // One column wide: the banner is a plain cell, not a merge.
        assert!(grid.merges().is_empty());
    }

    #[test]
    fn test_parameter_definitions() {
        let project = &export(StandardGroup::ProjectParameters)[0];
        assert_eq!(project.value(4, 2), CellValue::text("Cost Code"));
        assert_eq!(project.value(4, 7), CellValue::text("False"));
        assert_eq!(project.value(5, 7), CellValue::text("True"));
        assert_eq!(project.value(4, 9), CellValue::text("Doors,Walls"));
        assert_eq!(project.value(6, 1), CellValue::text(BANNER_TEXT));

        let shared = &export(StandardGroup::SharedParameters)[0];
        assert_eq!(shared.name(), "Shared Project Parameters");
        assert_eq!(shared.value(4, 2), CellValue::text("Fire Zone"));
        assert_eq!(shared.row_count(), 5);
    }

    #[test]
    fn test_no_shared_parameters_no_sheet() {
        let model = ModelSnapshot::from_yaml_str("name: Empty\n").unwrap();
        let settings = ParametersSettings::default();
        let sheets = StandardsExporter::new(&model, &settings)
            .export(StandardGroup::SharedParameters, &JobContext::detached())
            .unwrap()
            .unwrap();
        assert!(sheets.is_empty());
    }

    #[test]
    fn test_project_information_rows() {
        let grid = &export(StandardGroup::ProjectInformation)[0];
        // Data group sorts before Identity; read-only and integer parameters are left out.
        assert_eq!(grid.value(4, 2), CellValue::text("Status"));
        assert_eq!(grid.value(4, 3), CellValue::text("Approved"));
        assert_eq!(grid.value(5, 2), CellValue::text("Client Name"));
        assert_eq!(grid.value(6, 2), CellValue::text("Project Name"));
        assert_eq!(grid.row_count(), 6);
        assert!(!grid.style(6, 3).unwrap().locked);
        assert_eq!(grid.value(6, 1), CellValue::text("10"));
    }

    #[test]
    fn test_cancelled_export_yields_nothing() {
        let model = ModelSnapshot::from_yaml_str(MODEL).unwrap();
        let settings = ParametersSettings::default();
        let cx = JobContext::detached();
        cx.cancel_token().cancel();
        let out = StandardsExporter::new(&model, &settings)
            .export(StandardGroup::ObjectStyles, &cx)
            .unwrap();
        assert!(out.is_none());
    }
}
