//! Per-cell read-only policy.

use crate::settings::ParametersSettings;
use crate::types::{FieldKind, Parameter, ParameterId, ScheduleField};
use std::collections::HashSet;

/// Built-in parameters that must never be edited from a sheet: phases,
/// levels, constraints, structural and system types and similar.
pub const LOCKED_PARAMETER_IDS: [i64; 60] = [
    -1152384, -1012101, -1012100, -1002064, -1002063, -1001305, -1001304, -1012201, -1007110,
    -1012030, -1012023, -1007235, -1007201, -1007200, -1006922, -1151210, -1151209, -1151208,
    -1151207, -1008620, -1005500, -1001107, -1001105, -1001103, -1140036, -1140334, -1150115,
    -1150114, -1150113, -1150112, -1150110, -1114251, -1114172, -1018257, -1018256, -1018255,
    -1018254, -1018023, -1018022, -1018021, -1018020, -1012809, -1012800, -1002107, -1017701,
    -1017733, -1017604, -1017603, -1012819, -1012836, -1152335, -1018361, -1018305, -1018300,
    -1015000, -1013411, -1012701, -1017705, -1152385, -1140217,
];

/// Forced read-only parameter ids: the configured list plus the locked
/// built-ins. Built once per session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOnlySet {
    ids: HashSet<ParameterId>,
}

impl ReadOnlySet {
    pub fn from_settings(settings: &ParametersSettings) -> Self {
        let ids = settings
            .readonly_parameters
            .iter()
            .map(|p| ParameterId(p.id))
            .chain(LOCKED_PARAMETER_IDS.iter().map(|&id| ParameterId(id)))
            .collect();
        Self { ids }
    }

    pub fn contains(&self, id: ParameterId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Field kinds whose values are derived or aggregated and have no single
/// writable target.
pub fn is_derived_kind(kind: FieldKind) -> bool {
    matches!(
        kind,
        FieldKind::Formula
            | FieldKind::Count
            | FieldKind::HostCount
            | FieldKind::Space
            | FieldKind::Analytical
            | FieldKind::ProjectInfo
            | FieldKind::FromRoom
            | FieldKind::ToRoom
            | FieldKind::Room
            | FieldKind::MaterialQuantity
            | FieldKind::StructuralMaterial
    )
}

#[derive(Debug, Clone, Copy)]
pub struct PermissionPolicy<'a> {
    forced: &'a ReadOnlySet,
}

impl<'a> PermissionPolicy<'a> {
    pub fn new(forced: &'a ReadOnlySet) -> Self {
        Self { forced }
    }

    /// A cell is read-only when its field kind is derived, nothing resolved,
    /// the field's parameter is forced read-only, or the parameter itself is
    /// read-only. No caller setting can relax this.
    pub fn is_read_only(&self, parameter: Option<&Parameter>, field: &ScheduleField) -> bool {
        match parameter {
            None => true,
            Some(p) => {
                is_derived_kind(field.kind)
                    || self.forced.contains(field.parameter_id)
                    || self.forced.contains(p.id)
                    || p.read_only
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ReadonlyParameter;
    use crate::types::{ParameterType, StorageType};

    fn param(id: i64, read_only: bool) -> Parameter {
        Parameter {
            id: ParameterId(id),
            name: "P".into(),
            storage: StorageType::String,
            kind: ParameterType::Text,
            unit: None,
            read_only,
            shared: false,
            group: String::new(),
            value: None,
            value_string: None,
        }
    }

    fn forced() -> ReadOnlySet {
        let settings = ParametersSettings {
            readonly_parameters: vec![ReadonlyParameter {
                id: 77,
                name: "Custom".into(),
            }],
            ..Default::default()
        };
        ReadOnlySet::from_settings(&settings)
    }

    #[test]
    fn test_set_contains_configured_and_built_in() {
        let set = forced();
        assert!(set.contains(ParameterId(77)));
        assert!(set.contains(ParameterId(-1012100)));
        assert_eq!(set.len(), 61);
    }

    #[test]
    fn test_missing_parameter_is_read_only() {
        let set = forced();
        let policy = PermissionPolicy::new(&set);
        let field = ScheduleField::new("Mark", FieldKind::Instance, ParameterId(-1001203));
        assert!(policy.is_read_only(None, &field));
    }

    #[test]
    fn test_derived_kinds_are_read_only() {
        let set = forced();
        let policy = PermissionPolicy::new(&set);
        let p = param(5, false);
        for kind in [FieldKind::Room, FieldKind::Formula, FieldKind::StructuralMaterial] {
            let field = ScheduleField::new("X", kind, ParameterId(5));
            assert!(policy.is_read_only(Some(&p), &field));
        }
        let field = ScheduleField::new("X", FieldKind::Instance, ParameterId(5));
        assert!(!policy.is_read_only(Some(&p), &field));
    }

    #[test]
    fn test_forced_and_intrinsic_read_only() {
        let set = forced();
        let policy = PermissionPolicy::new(&set);
        let forced_field = ScheduleField::new("Custom", FieldKind::Instance, ParameterId(77));
        assert!(policy.is_read_only(Some(&param(77, false)), &forced_field));
        let field = ScheduleField::new("X", FieldKind::ElementType, ParameterId(9));
        assert!(policy.is_read_only(Some(&param(9, true)), &field));
    }

    #[test]
    fn test_policy_is_idempotent() {
        let set = forced();
        let policy = PermissionPolicy::new(&set);
        let p = param(12, false);
        for kind in [FieldKind::Instance, FieldKind::Count, FieldKind::ElementType] {
            let field = ScheduleField::new("X", kind, ParameterId(12));
            let first = policy.is_read_only(Some(&p), &field);
            assert_eq!(first, policy.is_read_only(Some(&p), &field));
        }
    }
}
