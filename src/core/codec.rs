//! Conversion between stored parameter values and spreadsheet cells.
//!
//! Export renders a parameter in its display unit (or the schedule field's
//! override), import parses a cell back and plans a write only when the value
//! actually changed. Doubles compare at four decimals, strings without case.

use super::translation::TranslationTable;
use crate::error::{BridgeError, BridgeResult};
use crate::model::{HostModel, ParamRef};
use crate::types::{
    builtin, CategoryId, CellValue, Element, ElementId, FieldKind, Parameter, ParameterType, RawValue,
    ScheduleField, StorageType,
};
use crate::units::{round4, DisplayUnit};

/// Result of applying one cell to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Display unit of a parameter: the field's override, else the parameter's own.
fn display_unit(parameter: &Parameter, field: Option<&ScheduleField>) -> Option<DisplayUnit> {
    field.and_then(|f| f.unit_override()).or(parameter.unit)
}

/// Parse spreadsheet text as a yes/no flag.
fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

pub struct ValueCodec<'m> {
    model: &'m dyn HostModel,
}

impl<'m> ValueCodec<'m> {
    pub fn new(model: &'m dyn HostModel) -> Self {
        Self { model }
    }

    /// Parameter value as the host displays it.
    pub fn display_value(&self, parameter: &Parameter, field: Option<&ScheduleField>) -> CellValue {
        match parameter.storage {
            StorageType::Double => {
                let internal = parameter.as_double().unwrap_or(0.0);
                match display_unit(parameter, field) {
                    Some(unit) if unit.is_percentage() => CellValue::Number(unit.to_display(internal) / 100.0),
                    Some(unit) => CellValue::Number(unit.to_display(internal)),
                    None => CellValue::Number(internal),
                }
            }
            StorageType::String => CellValue::text(parameter.as_string().unwrap_or_default()),
            StorageType::Integer => {
                let value = parameter.as_integer().unwrap_or(0);
                if parameter.kind == ParameterType::YesNo {
                    CellValue::text(if value == 0 { "False" } else { "True" })
                } else {
                    CellValue::Number(value as f64)
                }
            }
            StorageType::ElementId => self.reference_text(parameter),
        }
    }

    fn reference_text(&self, parameter: &Parameter) -> CellValue {
        let Some(id) = parameter.as_element_id() else {
            return CellValue::Empty;
        };
        if id.0 < 0 {
            return self
                .model
                .category(CategoryId(id.0))
                .map(|c| CellValue::text(c.name.clone()))
                .unwrap_or_default();
        }
        if parameter.id == builtin::ELEM_FAMILY_PARAM || parameter.id == builtin::ELEM_FAMILY_AND_TYPE_PARAM {
            let Some(element_type) = self.model.element(id) else {
                return CellValue::Empty;
            };
            let family = element_type.family_name.clone().unwrap_or_default();
            return if parameter.id == builtin::ELEM_FAMILY_AND_TYPE_PARAM {
                CellValue::text(format!("{}: {}", family, element_type.name))
            } else {
                CellValue::text(family)
            };
        }
        if parameter.id == builtin::AREA_SCHEME_ID {
            return parameter
                .value_string
                .clone()
                .map(CellValue::Text)
                .unwrap_or_default();
        }
        self.model
            .element(id)
            .map(|e| CellValue::text(e.name.clone()))
            .unwrap_or_default()
    }

    /// Cell rendered for one element and schedule field. `resolved` is the
    /// parameter found by the resolver; it wins over computed values.
    pub fn cell_value(
        &self,
        element: &Element,
        field: &ScheduleField,
        resolved: Option<&Parameter>,
        translations: &TranslationTable<'_>,
    ) -> CellValue {
        let computed = match field.kind {
            FieldKind::Formula => CellValue::Number(0.0),
            FieldKind::Count | FieldKind::HostCount => CellValue::Number(1.0),
            FieldKind::MaterialQuantity => self.material_quantity(element, field),
            _ => CellValue::Empty,
        };
        let Some(parameter) = resolved else {
            return computed;
        };
        let value = self.display_value(parameter, Some(field));
        if translations.applies_to(&parameter.name) {
            CellValue::text(translations.value_to_text(&parameter.name, &value.as_text()))
        } else {
            value
        }
    }

    fn material_quantity(&self, element: &Element, field: &ScheduleField) -> CellValue {
        let to_display = |v: f64| field.unit.map_or(v, |u| u.to_display(v));
        let id = field.parameter_id;
        if id == builtin::MATERIAL_AREA {
            CellValue::Number(to_display(self.material_area(element)))
        } else if id == builtin::MATERIAL_VOLUME {
            CellValue::Number(to_display(self.material_volume(element)))
        } else if id == builtin::MATERIAL_ASPAINT {
            let painted = element.links.materials.iter().any(|m| m.paint);
            CellValue::text(if painted { "Yes" } else { "No" })
        } else if id == builtin::PHY_MATERIAL_PARAM_UNIT_WEIGHT {
            let total: f64 = element
                .links
                .materials
                .iter()
                .filter(|m| !m.paint)
                .filter_map(|m| self.model.element(m.material))
                .filter_map(|material| self.model.element(material.links.structural_asset?))
                .filter_map(|asset| asset.parameter(id))
                .filter_map(|p| self.display_value(p, Some(field)).as_number())
                .sum();
            CellValue::Number(total)
        } else {
            CellValue::Empty
        }
    }

    /// Summed area of the element's non-paint materials, in internal units.
    pub fn material_area(&self, element: &Element) -> f64 {
        element
            .links
            .materials
            .iter()
            .filter(|m| !m.paint)
            .map(|m| m.area)
            .sum()
    }

    /// Summed volume of the element's non-paint materials, in internal units.
    pub fn material_volume(&self, element: &Element) -> f64 {
        element
            .links
            .materials
            .iter()
            .filter(|m| !m.paint)
            .map(|m| m.volume)
            .sum()
    }

    /// Raw value to store for `cell`, or `None` when the parameter already
    /// holds it (or is a reference kind that is never written).
    pub fn plan_write(
        &self,
        parameter: &Parameter,
        cell: &CellValue,
        field: Option<&ScheduleField>,
    ) -> BridgeResult<Option<RawValue>> {
        let text = cell.as_text();
        match parameter.storage {
            StorageType::Double => {
                let mut value = if cell.is_empty() {
                    0.0
                } else {
                    cell.as_number()
                        .ok_or_else(|| BridgeError::write_rejected(parameter.name.clone(), &text))?
                };
                let unit = display_unit(parameter, field);
                let current = parameter.as_double().unwrap_or(0.0);
                let current = unit.map_or(current, |u| u.to_display(current));
                if unit.is_some_and(|u| u.is_percentage()) {
                    value *= 100.0;
                }
                if round4(current) == round4(value) {
                    return Ok(None);
                }
                Ok(Some(RawValue::Float(unit.map_or(value, |u| u.to_internal(value)))))
            }
            StorageType::String => {
                let changed = match parameter.as_string() {
                    Some(current) => current.to_lowercase() != text.to_lowercase(),
                    None => !text.is_empty(),
                };
                Ok(changed.then_some(RawValue::Text(text)))
            }
            StorageType::Integer => {
                let value = if parameter.kind == ParameterType::YesNo {
                    parse_flag(&text).map(i64::from)
                } else if cell.is_empty() {
                    Some(0)
                } else {
                    cell.as_number()
                        .filter(|v| v.fract() == 0.0)
                        .map(|v| v as i64)
                };
                let value =
                    value.ok_or_else(|| BridgeError::write_rejected(parameter.name.clone(), &text))?;
                if value == parameter.as_integer().unwrap_or(0) {
                    return Ok(None);
                }
                Ok(Some(RawValue::Int(value)))
            }
            StorageType::ElementId => Ok(self.plan_reference(parameter, text.trim())),
        }
    }

    fn plan_reference(&self, parameter: &Parameter, name: &str) -> Option<RawValue> {
        let types = self.model.element_types();
        let replacement = if parameter.id == builtin::ELEM_TYPE_PARAM {
            types.into_iter().find(|t| t.name.trim() == name)
        } else if parameter.id == builtin::ELEM_FAMILY_PARAM {
            types.into_iter().find(|t| {
                t.family_name
                    .as_deref()
                    .is_some_and(|f| f.trim().eq_ignore_ascii_case(name))
            })
        } else {
            return None;
        };
        let original = parameter
            .as_element_id()
            .and_then(|id| self.model.element(id));
        match (original, replacement) {
            (Some(_), None) => Some(RawValue::Int(ElementId::INVALID.0)),
            (Some(o), Some(r)) if o.id == r.id => None,
            (_, Some(r)) => Some(RawValue::Int(r.id.0)),
            (None, None) => None,
        }
    }
}

/// Apply one cell to the parameter at `target`.
pub fn write_cell(
    model: &mut dyn HostModel,
    target: ParamRef,
    field: Option<&ScheduleField>,
    cell: &CellValue,
) -> BridgeResult<WriteOutcome> {
    let planned = {
        let parameter = model.parameter(target).ok_or_else(|| {
            BridgeError::Host(format!(
                "Parameter {} not found on element {}",
                target.id, target.owner
            ))
        })?;
        ValueCodec::new(&*model).plan_write(parameter, cell, field)?
    };
    match planned {
        Some(value) => {
            model.set_parameter(target, value)?;
            Ok(WriteOutcome::Written)
        }
        None => Ok(WriteOutcome::Unchanged),
    }
}
