//! Host model contract.
//!
//! The bridge never owns the building model. Everything it needs (element and
//! parameter lookup, parameter writes, category styles, transactions) goes
//! through [`HostModel`]. [`snapshot::ModelSnapshot`] is the YAML-backed
//! implementation used by the CLI and the tests.

pub mod snapshot;

use crate::error::BridgeResult;
use crate::types::{
    Category, CategoryId, Element, ElementId, ElementKind, Family, Parameter, ParameterBinding,
    ParameterId, Phase, RawValue, Rgb, ScheduleDefinition,
};

pub use snapshot::ModelSnapshot;

/// Address of one parameter slot: the element holding it and its definition id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamRef {
    pub owner: ElementId,
    pub id: ParameterId,
}

impl ParamRef {
    pub fn new(owner: ElementId, id: ParameterId) -> Self {
        Self { owner, id }
    }
}

/// Graphic style changes applied to one category. `None` leaves a value as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryStyle {
    pub projection: Option<i32>,
    pub cut: Option<i32>,
    pub color: Option<Rgb>,
}

impl CategoryStyle {
    pub fn is_empty(&self) -> bool {
        self.projection.is_none() && self.cut.is_none() && self.color.is_none()
    }
}

pub trait HostModel {
    fn elements(&self) -> &[Element];

    fn element(&self, id: ElementId) -> Option<&Element>;

    fn element_by_unique_id(&self, unique_id: &str) -> Option<&Element>;

    fn phases(&self) -> &[Phase];

    fn families(&self) -> &[Family];

    /// Top-level categories; subcategories hang off each entry.
    fn categories(&self) -> &[Category];

    fn schedules(&self) -> &[ScheduleDefinition];

    fn parameter_bindings(&self) -> &[ParameterBinding];

    /// Write a raw value. Fails outside a transaction, on read-only
    /// parameters and on storage mismatches.
    fn set_parameter(&mut self, target: ParamRef, value: RawValue) -> BridgeResult<()>;

    fn set_category_style(&mut self, id: CategoryId, style: &CategoryStyle) -> BridgeResult<()>;

    fn begin_transaction(&mut self, name: &str) -> BridgeResult<()>;

    fn commit_transaction(&mut self) -> BridgeResult<()>;

    fn rollback_transaction(&mut self) -> BridgeResult<()>;

    /// All element types (family symbols, wall types, ...).
    fn element_types(&self) -> Vec<&Element> {
        self.elements()
            .iter()
            .filter(|e| e.kind.is_element_type())
            .collect()
    }

    /// The project information singleton.
    fn project_info(&self) -> Option<&Element> {
        self.elements()
            .iter()
            .find(|e| e.kind == ElementKind::ProjectInfo)
    }

    /// Category or subcategory by id.
    fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories().iter().find_map(|c| c.find(id))
    }

    fn schedule_by_unique_id(&self, unique_id: &str) -> Option<&ScheduleDefinition> {
        self.schedules().iter().find(|s| s.unique_id == unique_id)
    }

    fn parameter(&self, target: ParamRef) -> Option<&Parameter> {
        self.element(target.owner)?.parameter(target.id)
    }
}
