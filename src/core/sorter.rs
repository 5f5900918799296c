//! Stable multi-key insertion sort driven by a sort specification string
//! such as `"[Level] asc, [Mark] desc"`.

use super::natural::natural_cmp;
use super::table::FlatTable;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{ScheduleDefinition, SortOrder};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub order: SortOrder,
}

/// Build the sort specification string of a schedule's sort/group levels.
pub fn sort_spec(schedule: &ScheduleDefinition) -> String {
    schedule
        .sort_group
        .iter()
        .filter(|g| schedule.field(&g.field).is_some())
        .map(|g| {
            let dir = match g.order {
                SortOrder::Ascending => "asc",
                SortOrder::Descending => "desc",
            };
            format!("[{}] {}", g.field, dir)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a sort specification against the table's columns.
pub fn parse_sort_spec(spec: &str, columns: &[String]) -> BridgeResult<Vec<SortKey>> {
    let mut keys = Vec::new();
    for term in spec.split(',') {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }
        let name = match (term.find('['), term.rfind(']')) {
            (Some(open), Some(close)) if close > open => &term[open + 1..close],
            _ => term.split_whitespace().next().unwrap_or(term),
        };
        let order = if term.to_lowercase().contains("desc") {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        let wanted = name.trim().to_lowercase();
        let column = columns
            .iter()
            .position(|c| c.trim().to_lowercase() == wanted)
            .ok_or_else(|| BridgeError::Sort(format!("Cannot find index for column {}", name)))?;
        keys.push(SortKey { column, order });
    }
    Ok(keys)
}

/// Insert each row after the nearest already-placed row it does not precede.
///
/// Placed rows are scanned from the most recently placed backwards, so rows
/// that compare equal on every key keep their original relative order.
pub fn insertion_sort<R, F>(rows: Vec<R>, keys: &[SortKey], cell: F) -> Vec<R>
where
    F: Fn(&R, usize) -> String,
{
    let mut placed: Vec<R> = Vec::with_capacity(rows.len());
    for row in rows {
        let mut position = 0;
        for i in (0..placed.len()).rev() {
            let mut found = true;
            for key in keys {
                let ord = natural_cmp(&cell(&row, key.column), &cell(&placed[i], key.column));
                match (ord, key.order) {
                    (Ordering::Equal, _) => continue,
                    (Ordering::Greater, SortOrder::Ascending) | (Ordering::Less, SortOrder::Descending) => {}
                    _ => found = false,
                }
                break;
            }
            if found {
                position = i + 1;
                break;
            }
        }
        placed.insert(position, row);
    }
    placed
}

/// Sort a table by `spec`. On error the input is left untouched and the
/// caller keeps the unsorted table.
pub fn sort_table(table: &FlatTable, spec: &str) -> BridgeResult<FlatTable> {
    let keys = parse_sort_spec(spec, &table.columns)?;
    let mut sorted = table.clone();
    if keys.is_empty() {
        return Ok(sorted);
    }
    let rows = std::mem::take(&mut sorted.rows);
    sorted.rows = insertion_sort(rows, &keys, |row, col| row.values[col].as_text());
    Ok(sorted)
}
