//! Field resolution: locate the parameter behind a schedule field for one
//! element, whichever object actually holds it.
//!
//! Dispatch is a flat table over [`ResolutionKind`]. Each rule is a short
//! chain of [`hops`] (type-of, symbol-of, room-of, material-of, asset-of...)
//! followed by a parameter lookup. A miss anywhere yields `None`, which callers
//! render as an empty cell.

use crate::model::{HostModel, ParamRef};
use crate::types::{builtin, Element, ElementId, ElementKind, FieldKind, Parameter, ParameterId, ScheduleField};

/// Which relation of a family instance to a room a field reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomRelation {
    Room,
    From,
    To,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Formula and count columns; no parameter behind them.
    Synthetic,
    TypeLevel,
    Space,
    Room(RoomRelation),
    Analytical,
    ProjectInfo,
    /// Material quantities and physical instance fields read the element itself.
    OwnParameter,
    StructuralMaterial,
    Instance,
    /// Analytical companion, then the element, then its type.
    Fallback,
}

impl From<FieldKind> for ResolutionKind {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Formula | FieldKind::Count | FieldKind::HostCount => ResolutionKind::Synthetic,
            FieldKind::ElementType => ResolutionKind::TypeLevel,
            FieldKind::Space => ResolutionKind::Space,
            FieldKind::Room => ResolutionKind::Room(RoomRelation::Room),
            FieldKind::FromRoom => ResolutionKind::Room(RoomRelation::From),
            FieldKind::ToRoom => ResolutionKind::Room(RoomRelation::To),
            FieldKind::Analytical => ResolutionKind::Analytical,
            FieldKind::ProjectInfo => ResolutionKind::ProjectInfo,
            FieldKind::MaterialQuantity | FieldKind::PhysicalInstance => ResolutionKind::OwnParameter,
            FieldKind::StructuralMaterial => ResolutionKind::StructuralMaterial,
            FieldKind::Instance => ResolutionKind::Instance,
            FieldKind::ViewBased | FieldKind::Material => ResolutionKind::Fallback,
        }
    }
}

/// A resolved parameter together with the object that holds it.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'m> {
    pub owner: &'m Element,
    pub parameter: &'m Parameter,
}

impl<'m> Resolved<'m> {
    /// Write address of the resolved parameter.
    pub fn target(&self) -> ParamRef {
        ParamRef::new(self.owner.id, self.parameter.id)
    }
}

/// Single-step navigation between related host objects.
pub mod hops {
    use super::RoomRelation;
    use crate::model::HostModel;
    use crate::types::{builtin, Element, ElementId, ElementKind};

    pub fn type_of<'m>(model: &'m dyn HostModel, element: &Element) -> Option<&'m Element> {
        model.element(element.type_id?)
    }

    /// Family symbol of a family instance.
    pub fn symbol_of<'m>(model: &'m dyn HostModel, element: &Element) -> Option<&'m Element> {
        if element.kind != ElementKind::FamilyInstance {
            return None;
        }
        model.element(element.links.symbol.or(element.type_id)?)
    }

    /// Type of a wall.
    pub fn wall_type_of<'m>(model: &'m dyn HostModel, element: &Element) -> Option<&'m Element> {
        if element.kind != ElementKind::Wall {
            return None;
        }
        type_of(model, element)
    }

    /// Space containing a family instance.
    pub fn space_of<'m>(model: &'m dyn HostModel, element: &Element) -> Option<&'m Element> {
        if element.kind != ElementKind::FamilyInstance {
            return None;
        }
        model.element(element.links.space?)
    }

    /// Room related to a family instance during `phase`, or the room of a space.
    pub fn room_of<'m>(
        model: &'m dyn HostModel,
        element: &Element,
        phase: Option<ElementId>,
        relation: RoomRelation,
    ) -> Option<&'m Element> {
        match element.kind {
            ElementKind::FamilyInstance => {
                let phase = phase?;
                let rooms = element.links.phase_rooms.iter().find(|r| r.phase == phase)?;
                let id = match relation {
                    RoomRelation::Room => rooms.room,
                    RoomRelation::From => rooms.from_room,
                    RoomRelation::To => rooms.to_room,
                }?;
                model.element(id)
            }
            ElementKind::Space => model.element(element.links.room?),
            _ => None,
        }
    }

    pub fn analytical_of<'m>(model: &'m dyn HostModel, element: &Element) -> Option<&'m Element> {
        model.element(element.links.analytical?)
    }

    pub fn material_of(model: &dyn HostModel, id: ElementId) -> Option<&Element> {
        model
            .element(id)
            .filter(|e| e.kind == ElementKind::Material)
    }

    /// Material referenced by an object's structural material parameter.
    pub fn material_by_parameter<'m>(model: &'m dyn HostModel, holder: &Element) -> Option<&'m Element> {
        let id = holder
            .parameter(builtin::STRUCTURAL_MATERIAL_PARAM)?
            .as_element_id()?;
        material_of(model, id)
    }

    pub fn asset_of<'m>(model: &'m dyn HostModel, material: &Element) -> Option<&'m Element> {
        model.element(material.links.structural_asset?)
    }

    pub fn project_info(model: &dyn HostModel) -> Option<&Element> {
        model.project_info()
    }
}

fn on(owner: &Element, id: ParameterId) -> Option<Resolved<'_>> {
    owner
        .parameter(id)
        .map(|parameter| Resolved { owner, parameter })
}

pub struct FieldResolver<'m> {
    model: &'m dyn HostModel,
}

impl<'m> FieldResolver<'m> {
    pub fn new(model: &'m dyn HostModel) -> Self {
        Self { model }
    }

    /// Phase the element was created in, when it names a known phase.
    pub fn element_phase(&self, element: &Element) -> Option<ElementId> {
        let id = element.parameter(builtin::PHASE_CREATED)?.as_element_id()?;
        self.model
            .phases()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.id)
    }

    pub fn resolve(
        &self,
        element: &'m Element,
        field: &ScheduleField,
        phase: Option<ElementId>,
    ) -> Option<Resolved<'m>> {
        let id = field.parameter_id;
        let model = self.model;
        match ResolutionKind::from(field.kind) {
            ResolutionKind::Synthetic => None,
            ResolutionKind::TypeLevel => self.type_level(element, id),
            ResolutionKind::Space => hops::space_of(model, element).and_then(|s| on(s, id)),
            ResolutionKind::Room(relation) => {
                hops::room_of(model, element, phase, relation).and_then(|r| on(r, id))
            }
            ResolutionKind::Analytical => hops::analytical_of(model, element).and_then(|a| on(a, id)),
            ResolutionKind::ProjectInfo => hops::project_info(model).and_then(|p| on(p, id)),
            ResolutionKind::OwnParameter => on(element, id),
            ResolutionKind::StructuralMaterial => self.structural_material(element, id),
            ResolutionKind::Instance => self.instance(element, id),
            ResolutionKind::Fallback => self.fallback(element, id),
        }
    }

    fn type_level(&self, element: &'m Element, id: ParameterId) -> Option<Resolved<'m>> {
        if let Some(found) = on(element, id) {
            return Some(found);
        }
        let found = hops::type_of(self.model, element).and_then(|t| on(t, id))?;
        Some(self.refine_type_level(element, found))
    }

    fn instance(&self, element: &'m Element, id: ParameterId) -> Option<Resolved<'m>> {
        if id.is_shared() {
            let from_type = hops::type_of(self.model, element)
                .and_then(|t| on(t, id))
                .map(|f| self.refine_type_level(element, f));
            match from_type {
                Some(found) if found.parameter.has_value() => Some(found),
                _ => on(element, id).map(|f| self.refine_instance_level(element, f)),
            }
        } else {
            let own = on(element, id);
            if own.is_some_and(|f| f.parameter.has_value()) {
                return own;
            }
            let found = match hops::analytical_of(self.model, element) {
                Some(analytical) => on(analytical, id),
                None => own,
            };
            found.map(|f| self.refine_instance_level(element, f))
        }
    }

    fn fallback(&self, element: &'m Element, id: ParameterId) -> Option<Resolved<'m>> {
        let found = hops::analytical_of(self.model, element)
            .and_then(|a| on(a, id))
            .or_else(|| on(element, id));
        match found {
            Some(found) => Some(self.refine_instance_level(element, found)),
            None => hops::type_of(self.model, element)
                .and_then(|t| on(t, id))
                .map(|f| self.refine_type_level(element, f)),
        }
    }

    fn structural_material(&self, element: &'m Element, id: ParameterId) -> Option<Resolved<'m>> {
        let model = self.model;
        let mut found = None;
        if element.kind == ElementKind::FamilyInstance {
            let direct = element
                .links
                .structural_material
                .and_then(|m| hops::material_of(model, m));
            found = match direct {
                Some(material) => self.on_material(material, id),
                None => hops::symbol_of(model, element)
                    .and_then(|s| hops::material_by_parameter(model, s))
                    .and_then(|m| self.on_material(m, id)),
            };
        }
        if found.is_none() && element.kind == ElementKind::Floor {
            found = hops::type_of(model, element)
                .and_then(|t| t.links.structural_material)
                .and_then(|m| hops::material_of(model, m))
                .and_then(|m| self.on_material(m, id));
        }
        if found.is_none() && matches!(element.kind, ElementKind::Wall | ElementKind::WallFoundation) {
            found = hops::type_of(model, element)
                .and_then(|t| hops::material_by_parameter(model, t))
                .and_then(|m| self.on_material(m, id));
        }
        found
    }

    /// Structural asset parameter, else the material's own.
    fn on_material(&self, material: &'m Element, id: ParameterId) -> Option<Resolved<'m>> {
        hops::asset_of(self.model, material)
            .and_then(|a| on(a, id))
            .or_else(|| on(material, id))
    }

    fn refine_type_level(&self, element: &'m Element, found: Resolved<'m>) -> Resolved<'m> {
        match found.owner.kind {
            ElementKind::FamilySymbol => self.symbol_level(element, found),
            ElementKind::WallType => self.wall_type_level(element, found),
            _ => found,
        }
    }

    fn refine_instance_level(&self, element: &'m Element, found: Resolved<'m>) -> Resolved<'m> {
        match found.owner.kind {
            ElementKind::FamilyInstance if found.parameter.shared && found.parameter.read_only => {
                self.symbol_level(element, found)
            }
            ElementKind::FamilySymbol => self.symbol_level(element, found),
            _ => found,
        }
    }

    /// Re-look the parameter on the element's family symbol, keeping the
    /// current one when the symbol lacks it.
    fn symbol_level(&self, element: &'m Element, found: Resolved<'m>) -> Resolved<'m> {
        hops::symbol_of(self.model, element)
            .and_then(|s| on(s, found.parameter.id))
            .unwrap_or(found)
    }

    fn wall_type_level(&self, element: &'m Element, found: Resolved<'m>) -> Resolved<'m> {
        hops::wall_type_of(self.model, element)
            .and_then(|t| on(t, found.parameter.id))
            .unwrap_or(found)
    }
}
