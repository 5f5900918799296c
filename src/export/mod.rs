//! Export orchestration
//!
//! Builds every requested sheet in memory first and writes the workbook only
//! when all of them completed, so a cancelled export leaves no file behind.

pub mod schedule;
pub mod standards;

pub use schedule::{ScheduleExporter, ScheduleTable};
pub use standards::{Standard, StandardGroup, StandardsExporter};

use crate::core::ReadOnlySet;
use crate::error::{BridgeError, BridgeResult};
use crate::excel::{check_not_locked, legend_sheet, SheetGrid, WorkbookWriter};
use crate::model::HostModel;
use crate::session::{JobContext, Outcome, Progress};
use crate::settings::ParametersSettings;
use crate::types::ScheduleDefinition;
use std::path::PathBuf;

/// What to export and where.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    /// Schedule names or unique ids.
    pub schedules: Vec<String>,
    pub standards: Vec<StandardGroup>,
    /// Plain values only: no identity, styles or legend.
    pub basic: bool,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub sheets: Vec<String>,
}

fn find_schedule<'m>(model: &'m dyn HostModel, key: &str) -> BridgeResult<&'m ScheduleDefinition> {
    model
        .schedules()
        .iter()
        .find(|s| s.name == key || s.unique_id == key)
        .ok_or_else(|| BridgeError::Export(format!("Schedule '{}' not found", key)))
}

/// Export the requested schedules and standards into one workbook.
pub fn run_export(
    model: &dyn HostModel,
    settings: &ParametersSettings,
    request: &ExportRequest,
    cx: &JobContext,
) -> BridgeResult<Outcome<ExportSummary>> {
    check_not_locked(&request.output)?;

    let schedules = request
        .schedules
        .iter()
        .map(|key| find_schedule(model, key))
        .collect::<BridgeResult<Vec<_>>>()?;
    let total = schedules.len() + request.standards.len();
    tracing::info!(
        "Exporting {} schedule(s) and {} standard group(s) to {}",
        schedules.len(),
        request.standards.len(),
        request.output.display()
    );
    cx.report(Progress::Started { sheets: total });

    let forced = ReadOnlySet::from_settings(settings);
    let exporter = ScheduleExporter::new(model, settings, &forced);
    let mut grids: Vec<SheetGrid> = Vec::new();

    for (index, schedule) in schedules.iter().enumerate() {
        if cx.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        cx.report(Progress::Sheet {
            name: schedule.name.clone(),
            index,
            total,
        });
        tracing::debug!("Building sheet for schedule '{}'", schedule.name);
        let built = if request.basic {
            exporter.export_basic(schedule, cx)?
        } else {
            exporter.export(schedule, cx)?
        };
        match built {
            Some(grid) => grids.push(grid),
            None => return Ok(Outcome::Cancelled),
        }
    }

    let standards = StandardsExporter::new(model, settings);
    for (offset, group) in request.standards.iter().enumerate() {
        if cx.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        cx.report(Progress::Sheet {
            name: group.label().to_string(),
            index: schedules.len() + offset,
            total,
        });
        match standards.export(*group, cx)? {
            Some(sheets) => grids.extend(sheets),
            None => return Ok(Outcome::Cancelled),
        }
    }

    if grids.is_empty() {
        return Err(BridgeError::Export("Nothing to export".to_string()));
    }
    if !request.basic {
        grids.push(legend_sheet());
    }
    if cx.is_cancelled() {
        return Ok(Outcome::Cancelled);
    }

    let mut writer = WorkbookWriter::new();
    for grid in &grids {
        writer.add_sheet(grid)?;
    }
    let sheets = writer.sheet_names().to_vec();
    writer.save(&request.output)?;
    tracing::info!("Wrote {} sheet(s) to {}", sheets.len(), request.output.display());

    Ok(Outcome::Completed(ExportSummary {
        path: request.output.clone(),
        sheets,
    }))
}
