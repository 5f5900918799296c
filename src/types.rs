use crate::units::DisplayUnit;
use serde::{Deserialize, Serialize};
use std::fmt;

//==============================================================================
// Identifiers
//==============================================================================

/// Host element identifier. Negative values are built-in ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl ElementId {
    /// The host's "no element" id.
    pub const INVALID: ElementId = ElementId(-1);

    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameter definition identifier. Positive ids are shared/project parameters,
/// negative ids are built-in parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterId(pub i64);

impl ParameterId {
    pub const INVALID: ParameterId = ParameterId(-1);

    /// Shared and project parameters carry a positive id.
    pub fn is_shared(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category identifier (built-in categories are negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Well-known built-in parameter ids.
pub mod builtin {
    use super::ParameterId;

    pub const ELEM_TYPE_PARAM: ParameterId = ParameterId(-1002050);
    pub const ELEM_FAMILY_PARAM: ParameterId = ParameterId(-1002051);
    pub const ELEM_FAMILY_AND_TYPE_PARAM: ParameterId = ParameterId(-1002052);
    pub const AREA_SCHEME_ID: ParameterId = ParameterId(-1012701);
    pub const PHASE_CREATED: ParameterId = ParameterId(-1012100);
    pub const STRUCTURAL_MATERIAL_PARAM: ParameterId = ParameterId(-1005500);
    pub const MATERIAL_AREA: ParameterId = ParameterId(-1012803);
    pub const MATERIAL_VOLUME: ParameterId = ParameterId(-1012802);
    pub const MATERIAL_ASPAINT: ParameterId = ParameterId(-1012806);
    pub const PHY_MATERIAL_PARAM_UNIT_WEIGHT: ParameterId = ParameterId(-1012823);
}

//==============================================================================
// Parameters
//==============================================================================

/// Physical storage of a parameter value. Fixed for the parameter's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Double,
    String,
    Integer,
    ElementId,
}

impl StorageType {
    pub fn label(self) -> &'static str {
        match self {
            StorageType::Double => "Double",
            StorageType::String => "String",
            StorageType::Integer => "Integer",
            StorageType::ElementId => "ElementId",
        }
    }
}

/// Logical type of a parameter definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    #[default]
    Invalid,
    Text,
    MultilineText,
    Integer,
    Number,
    Length,
    Area,
    Volume,
    Angle,
    Slope,
    Currency,
    Mass,
    MassDensity,
    UnitWeight,
    Url,
    Material,
    FamilyType,
    YesNo,
    Image,
}

impl ParameterType {
    /// Display name used in value-kind labels.
    pub fn label(self) -> &'static str {
        match self {
            ParameterType::Invalid => "Invalid",
            ParameterType::Text => "Text",
            ParameterType::MultilineText => "MultilineText",
            ParameterType::Integer => "Integer",
            ParameterType::Number => "Number",
            ParameterType::Length => "Length",
            ParameterType::Area => "Area",
            ParameterType::Volume => "Volume",
            ParameterType::Angle => "Angle",
            ParameterType::Slope => "Slope",
            ParameterType::Currency => "Currency",
            ParameterType::Mass => "Mass",
            ParameterType::MassDensity => "MassDensity",
            ParameterType::UnitWeight => "UnitWeight",
            ParameterType::Url => "URL",
            ParameterType::Material => "Material",
            ParameterType::FamilyType => "FamilyType",
            ParameterType::YesNo => "YesNo",
            ParameterType::Image => "Image",
        }
    }
}

/// A raw stored value. The variant is checked against the parameter's
/// [`StorageType`] on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int(i) => write!(f, "{}", i),
            RawValue::Float(v) => write!(f, "{}", v),
            RawValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A typed value slot attached to an element or its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ParameterId,
    pub name: String,
    pub storage: StorageType,
    #[serde(default)]
    pub kind: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<DisplayUnit>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawValue>,
    /// Host-formatted rendering, used for parameters displayed via their value string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

impl Parameter {
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn as_double(&self) -> Option<f64> {
        match self.value {
            Some(RawValue::Float(v)) => Some(v),
            Some(RawValue::Int(i)) => Some(i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            Some(RawValue::Int(i)) => Some(i),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match &self.value {
            Some(RawValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_element_id(&self) -> Option<ElementId> {
        self.as_integer().map(ElementId)
    }

    /// Whether `value` matches this parameter's storage type.
    pub fn accepts(&self, value: &RawValue) -> bool {
        matches!(
            (self.storage, value),
            (StorageType::Double, RawValue::Float(_))
                | (StorageType::Double, RawValue::Int(_))
                | (StorageType::Integer, RawValue::Int(_))
                | (StorageType::ElementId, RawValue::Int(_))
                | (StorageType::String, RawValue::Text(_))
        )
    }
}

//==============================================================================
// Elements
//==============================================================================

/// Host object class. Drives the sub-object hops of field resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    #[default]
    Generic,
    FamilyInstance,
    FamilySymbol,
    Wall,
    WallType,
    Floor,
    FloorType,
    WallFoundation,
    ElementType,
    Room,
    Space,
    Material,
    StructuralAsset,
    AnalyticalModel,
    ProjectInfo,
    LinkInstance,
}

impl ElementKind {
    pub fn is_element_type(self) -> bool {
        matches!(
            self,
            ElementKind::FamilySymbol
                | ElementKind::WallType
                | ElementKind::FloorType
                | ElementKind::ElementType
        )
    }
}

/// Rooms an element belongs to during one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRooms {
    pub phase: ElementId,
    #[serde(default)]
    pub room: Option<ElementId>,
    #[serde(default)]
    pub from_room: Option<ElementId>,
    #[serde(default)]
    pub to_room: Option<ElementId>,
}

/// One material's contribution to an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialUse {
    pub material: ElementId,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub paint: bool,
}

/// References from an element to its related sub-objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementLinks {
    /// Family symbol of a family instance (defaults to the type).
    pub symbol: Option<ElementId>,
    /// Space containing a family instance.
    pub space: Option<ElementId>,
    /// Room of a space.
    pub room: Option<ElementId>,
    pub phase_rooms: Vec<PhaseRooms>,
    pub analytical: Option<ElementId>,
    /// Structural material of a family instance or floor type.
    pub structural_material: Option<ElementId>,
    /// Structural asset of a material.
    pub structural_asset: Option<ElementId>,
    pub materials: Vec<MaterialUse>,
}

/// A host element as seen by the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub unique_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<ElementId>,
    /// Family name of an element type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub links: ElementLinks,
}

impl Element {
    /// Look up a parameter by definition id.
    pub fn parameter(&self, id: ParameterId) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    pub fn parameter_mut(&mut self, id: ParameterId) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.id == id)
    }

    /// Look up a parameter by definition name.
    pub fn lookup_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Parameters in their declared order.
    pub fn ordered_parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

/// A construction phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: ElementId,
    pub name: String,
}

/// A loaded family and the name of the category it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: ElementId,
    pub name: String,
    pub category: String,
}

//==============================================================================
// Categories and parameter bindings
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    #[default]
    Model,
    Annotation,
    AnalyticalModel,
    Internal,
}

/// An RGB line colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    /// Parse `"r, g, b"`. Anything else yields `None`.
    pub fn parse(text: &str) -> Option<Rgb> {
        let parts: Vec<&str> = text.split(',').collect();
        if parts.len() != 3 {
            return None;
        }
        Some(Rgb {
            red: parts[0].trim().parse().ok()?,
            green: parts[1].trim().parse().ok()?,
            blue: parts[2].trim().parse().ok()?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.red, self.green, self.blue)
    }
}

/// A model category with its graphic styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub kind: CategoryKind,
    #[serde(default)]
    pub cuttable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_weight_projection: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_weight_cut: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<Category>,
}

impl Category {
    /// Find this category or one of its descendants by id.
    pub fn find(&self, id: CategoryId) -> Option<&Category> {
        if self.id == id {
            return Some(self);
        }
        self.subcategories.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: CategoryId) -> Option<&mut Category> {
        if self.id == id {
            return Some(self);
        }
        self.subcategories.iter_mut().find_map(|c| c.find_mut(id))
    }
}

/// A project or shared parameter bound to categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBinding {
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub instance: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// GUID of a shared parameter; `None` for project parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_group: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

fn default_true() -> bool {
    true
}

//==============================================================================
// Schedules
//==============================================================================

/// Field-type tag of a schedule field as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Instance,
    ElementType,
    Count,
    HostCount,
    Formula,
    Space,
    Room,
    FromRoom,
    ToRoom,
    ProjectInfo,
    MaterialQuantity,
    StructuralMaterial,
    Analytical,
    PhysicalInstance,
    ViewBased,
    Material,
}

/// Unit/format override carried by a schedule field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatOverride {
    #[serde(default = "default_true")]
    pub use_default: bool,
    #[serde(default)]
    pub unit: Option<DisplayUnit>,
}

/// One logical column of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default = "invalid_parameter")]
    pub parameter_id: ParameterId,
    #[serde(default)]
    pub hidden: bool,
    /// Display-type totals requested for this column.
    #[serde(default)]
    pub totals: bool,
    /// Unit of the field's value spec, used for computed values and filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<DisplayUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatOverride>,
}

fn invalid_parameter() -> ParameterId {
    ParameterId::INVALID
}

impl ScheduleField {
    pub fn new(name: impl Into<String>, kind: FieldKind, parameter_id: ParameterId) -> Self {
        Self {
            name: name.into(),
            heading: None,
            kind,
            parameter_id,
            hidden: false,
            totals: false,
            unit: None,
            format: None,
        }
    }

    /// Column heading, falling back to the field name.
    pub fn heading(&self) -> &str {
        self.heading.as_deref().unwrap_or(&self.name)
    }

    /// The field-level unit override, when the format does not use the default.
    pub fn unit_override(&self) -> Option<DisplayUnit> {
        match &self.format {
            Some(f) if !f.use_default => f.unit,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// One sort/group level. Level 1 is the first entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortGroupField {
    /// Name of the schedule field.
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub show_footer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Contains,
    NotContains,
    BeginsWith,
    EndsWith,
    HasValue,
}

/// A stored schedule filter. Float values are in internal units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFilter {
    pub field: String,
    pub op: FilterOp,
    #[serde(default)]
    pub value: Option<RawValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    #[default]
    Regular,
    MaterialTakeoff,
    TitleblockRevision,
    AnalyticalNodes,
}

/// A schedule view: fields, sort/group levels, filters and element scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDefinition {
    pub id: ElementId,
    pub unique_id: String,
    pub name: String,
    #[serde(default)]
    pub kind: ScheduleKind,
    #[serde(default = "default_true")]
    pub itemized: bool,
    pub fields: Vec<ScheduleField>,
    #[serde(default)]
    pub sort_group: Vec<SortGroupField>,
    #[serde(default)]
    pub filters: Vec<ScheduleFilter>,
    #[serde(default)]
    pub elements: Vec<ElementId>,
}

impl ScheduleDefinition {
    pub fn field(&self, name: &str) -> Option<&ScheduleField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Schedules that are exported but never imported back.
    pub fn is_import_blocked(&self) -> bool {
        matches!(
            self.kind,
            ScheduleKind::MaterialTakeoff | ScheduleKind::TitleblockRevision
        )
    }
}

//==============================================================================
// Cell values
//==============================================================================

/// A spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Text rendering used for comparison, translation and parsing.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(v) => v.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Numeric reading of the cell, parsing text when needed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Empty => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}
