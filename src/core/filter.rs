//! Row predicate compiled from a schedule's stored filters.
//!
//! Only the six comparison operators carry over; text matching operators and
//! filters without a value are left to the host and skipped here. All clauses
//! are joined with AND.

use super::table::{FlatRow, FlatTable};
use crate::types::{CellValue, FilterOp, RawValue, ScheduleDefinition};
use crate::units::round4;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    column: usize,
    op: FilterOp,
    operand: Operand,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    clauses: Vec<Clause>,
}

fn is_comparison(op: FilterOp) -> bool {
    matches!(
        op,
        FilterOp::Equal
            | FilterOp::NotEqual
            | FilterOp::Greater
            | FilterOp::GreaterOrEqual
            | FilterOp::Less
            | FilterOp::LessOrEqual
    )
}

impl RowFilter {
    /// Compile the schedule's filters against the table's column names.
    /// Float operands are stored in internal units and converted to the
    /// field's display unit.
    pub fn compile(schedule: &ScheduleDefinition, columns: &[String]) -> Self {
        let mut clauses = Vec::new();
        for filter in &schedule.filters {
            if !is_comparison(filter.op) {
                continue;
            }
            let Some(field) = schedule.field(&filter.field) else {
                continue;
            };
            let Some(column) = columns.iter().position(|c| *c == field.name) else {
                continue;
            };
            let operand = match &filter.value {
                Some(RawValue::Float(v)) => {
                    Operand::Number(field.unit.map_or(*v, |u| u.to_display(*v)))
                }
                Some(RawValue::Int(i)) => Operand::Number(*i as f64),
                Some(RawValue::Text(s)) => Operand::Text(s.clone()),
                None => continue,
            };
            clauses.push(Clause {
                column,
                op: filter.op,
                operand,
            });
        }
        Self { clauses }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, row: &FlatRow) -> bool {
        self.clauses.iter().all(|clause| clause.matches(row))
    }

    /// Drop rows that fail the predicate, keeping the order of the rest.
    pub fn apply(&self, table: &mut FlatTable) {
        if self.is_empty() {
            return;
        }
        table.rows.retain(|row| self.matches(row));
    }
}

impl Clause {
    fn matches(&self, row: &FlatRow) -> bool {
        let cell = match row.values.get(self.column) {
            Some(CellValue::Empty) | None => return false,
            Some(cell) => cell,
        };
        let ord = match &self.operand {
            Operand::Number(n) => match cell.as_number() {
                Some(v) => round4(v).partial_cmp(&round4(*n)),
                None => None,
            },
            Operand::Text(s) => Some(cell.as_text().to_lowercase().cmp(&s.to_lowercase())),
        };
        let Some(ord) = ord else {
            return false;
        };
        match self.op {
            FilterOp::Equal => ord == Ordering::Equal,
            FilterOp::NotEqual => ord != Ordering::Equal,
            FilterOp::Greater => ord == Ordering::Greater,
            FilterOp::GreaterOrEqual => ord != Ordering::Less,
            FilterOp::Less => ord == Ordering::Less,
            FilterOp::LessOrEqual => ord != Ordering::Greater,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementId, FieldKind, ParameterId, ScheduleField, ScheduleFilter};
    use crate::units::DisplayUnit;

    fn schedule(filters: Vec<ScheduleFilter>) -> ScheduleDefinition {
        let mut width = ScheduleField::new("Width", FieldKind::Instance, ParameterId(-1001300));
        width.unit = Some(DisplayUnit::Millimeters);
        ScheduleDefinition {
            id: ElementId(1),
            unique_id: "s-1".into(),
            name: "Doors".into(),
            kind: Default::default(),
            itemized: true,
            fields: vec![
                ScheduleField::new("Mark", FieldKind::Instance, ParameterId(-1001203)),
                width,
            ],
            sort_group: vec![],
            filters,
            elements: vec![],
        }
    }

    fn table() -> FlatTable {
        let mut t = FlatTable::new(
            "Doors",
            vec!["ID".into(), "FamilyAndType".into(), "Mark".into(), "Width".into()],
        );
        for (id, mark, width) in [("a", "D1", 914.4), ("b", "d2", 762.0), ("c", "D3", 1000.0)] {
            let mut r = FlatRow::new(4);
            r.set(0, CellValue::text(id), true);
            r.set(2, CellValue::text(mark), false);
            r.set(3, CellValue::Number(width), false);
            t.push(r);
        }
        t
    }

    fn ids(t: &FlatTable) -> Vec<String> {
        t.rows.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_double_filter_in_display_units() {
        // 3 ft = 914.4 mm
        let s = schedule(vec![ScheduleFilter {
            field: "Width".into(),
            op: FilterOp::GreaterOrEqual,
            value: Some(RawValue::Float(3.0)),
        }]);
        let mut t = table();
        RowFilter::compile(&s, &t.columns).apply(&mut t);
        assert_eq!(ids(&t), vec!["a", "c"]);
    }

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let s = schedule(vec![ScheduleFilter {
            field: "Mark".into(),
            op: FilterOp::NotEqual,
            value: Some(RawValue::Text("D2".into())),
        }]);
        let mut t = table();
        RowFilter::compile(&s, &t.columns).apply(&mut t);
        assert_eq!(ids(&t), vec!["a", "c"]);
    }

    #[test]
    fn test_unsupported_operators_are_skipped() {
        let s = schedule(vec![
            ScheduleFilter {
                field: "Mark".into(),
                op: FilterOp::Contains,
                value: Some(RawValue::Text("zzz".into())),
            },
            ScheduleFilter {
                field: "Mark".into(),
                op: FilterOp::Equal,
                value: None,
            },
        ]);
        let t = table();
        assert!(RowFilter::compile(&s, &t.columns).is_empty());
    }

    #[test]
    fn test_clauses_are_conjoined() {
        let s = schedule(vec![
            ScheduleFilter {
                field: "Width".into(),
                op: FilterOp::Less,
                value: Some(RawValue::Float(3.2)),
            },
            ScheduleFilter {
                field: "Mark".into(),
                op: FilterOp::Equal,
                value: Some(RawValue::Text("d1".into())),
            },
        ]);
        let mut t = table();
        RowFilter::compile(&s, &t.columns).apply(&mut t);
        assert_eq!(ids(&t), vec!["a"]);
    }

    #[test]
    fn test_number_against_text_cell_fails() {
        let s = schedule(vec![ScheduleFilter {
            field: "Mark".into(),
            op: FilterOp::Equal,
            value: Some(RawValue::Int(1)),
        }]);
        let mut t = table();
        RowFilter::compile(&s, &t.columns).apply(&mut t);
        assert!(t.rows.is_empty());
    }
}
