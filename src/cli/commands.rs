use crate::error::BridgeResult;
use crate::excel::read_workbook;
use crate::export::{run_export, ExportRequest, ExportSummary, StandardGroup};
use crate::import::{classify, run_import, ImportReport};
use crate::model::HostModel;
use crate::parser;
use crate::session::{Outcome, Progress, Session, Worker};
use crate::settings::ParametersSettings;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn load_settings(path: Option<&Path>) -> BridgeResult<ParametersSettings> {
    match path {
        Some(path) => ParametersSettings::load(path),
        None => Ok(ParametersSettings::default()),
    }
}

fn print_progress(progress: &Progress, verbose: bool) {
    match progress {
        Progress::Sheet { name, index, total } => {
            println!("   [{}/{}] {}", index + 1, total, name.bright_blue());
        }
        Progress::Issue {
            source_name,
            message,
        } => {
            println!("   {} {}: {}", "⚠".yellow(), source_name.bold(), message);
        }
        Progress::Row { current, total } if verbose => {
            println!("      row {}/{}", current, total);
        }
        _ => {}
    }
}

/// Print progress while the worker runs, then hand back its result.
fn follow<M, T>(session: &Session, worker: Worker<M, T>, verbose: bool) -> BridgeResult<(M, Outcome<T>)> {
    while !worker.is_finished() {
        if let Ok(progress) = session.progress().recv_timeout(Duration::from_millis(50)) {
            print_progress(&progress, verbose);
        }
    }
    for progress in session.progress().try_iter() {
        print_progress(&progress, verbose);
    }
    worker.join()
}

/// Execute the export command
pub fn export(
    model_path: PathBuf,
    output: PathBuf,
    schedules: Vec<String>,
    standards: Vec<StandardGroup>,
    basic: bool,
    settings: Option<PathBuf>,
    verbose: bool,
) -> BridgeResult<()> {
    println!("{}", "📤 sheetbridge - Excel Export".bold().green());
    println!("   Model:  {}", model_path.display());
    println!("   Output: {}\n", output.display());

    let model = parser::parse_snapshot(&model_path)?;
    let settings = load_settings(settings.as_deref())?;

    // Without any selection every schedule is exported.
    let schedules = if schedules.is_empty() && standards.is_empty() {
        model.schedules().iter().map(|s| s.name.clone()).collect()
    } else {
        schedules
    };
    if verbose {
        println!(
            "   {} schedule(s), {} standard group(s)\n",
            schedules.len(),
            standards.len()
        );
    }

    let request = ExportRequest {
        schedules,
        standards,
        basic,
        output,
    };
    let session = Session::new();
    let worker = session.spawn(model, move |model, cx| {
        run_export(&*model, &settings, &request, cx)
    });
    let (_, outcome) = follow(&session, worker, verbose)?;

    match outcome {
        Outcome::Completed(ExportSummary { path, sheets }) => {
            println!("\n{}", "✅ Export Complete!".bold().green());
            println!("   Excel file: {}", path.display());
            println!("   Sheets:     {}\n", sheets.join(", "));
        }
        Outcome::Cancelled => println!("\n{}", "Export cancelled, no file written".yellow()),
    }
    Ok(())
}

fn print_report(report: &ImportReport) {
    for sheet in &report.imported {
        println!("   {} {}", "✓".green(), sheet);
    }
    for entry in &report.skipped {
        println!(
            "   {} {} ({})",
            "-".dimmed(),
            entry.sheet,
            entry.reason.as_deref().unwrap_or("skipped")
        );
    }
    for issue in &report.issues {
        println!(
            "   {} {}: {}",
            "✗".red(),
            issue.source_name.bold(),
            issue.message
        );
    }
}

/// Execute the import command
pub fn import(
    model_path: PathBuf,
    workbook_path: PathBuf,
    sheets: Vec<String>,
    settings: Option<PathBuf>,
    output: Option<PathBuf>,
    dry_run: bool,
    verbose: bool,
) -> BridgeResult<()> {
    println!("{}", "📥 sheetbridge - Excel Import".bold().green());
    println!("   Model:    {}", model_path.display());
    println!("   Workbook: {}\n", workbook_path.display());

    let model = parser::parse_snapshot(&model_path)?;
    let settings = load_settings(settings.as_deref())?;
    let workbook = read_workbook(&workbook_path)?;
    if verbose {
        println!("   Found {} sheet(s)\n", workbook.sheets.len());
    }

    let session = Session::new();
    let worker = session.spawn(model, move |model, cx| {
        run_import(model, &settings, &workbook, &sheets, cx)
    });
    let (model, outcome) = follow(&session, worker, verbose)?;

    let report = match outcome {
        Outcome::Completed(report) => report,
        Outcome::Cancelled => {
            println!("\n{}", "Import cancelled, model unchanged".yellow());
            return Ok(());
        }
    };
    println!();
    print_report(&report);

    if dry_run {
        println!(
            "\n{} {} change(s), nothing written",
            "🔍 Dry run:".cyan(),
            report.changes
        );
        return Ok(());
    }

    let target = output.unwrap_or(model_path);
    parser::write_snapshot(&target, &model)?;
    println!("\n{}", "✅ Import Complete!".bold().green());
    println!("   {} change(s) written to {}\n", report.changes, target.display());
    Ok(())
}

/// Execute the inspect command
pub fn inspect(workbook_path: PathBuf, model_path: PathBuf) -> BridgeResult<()> {
    let model = parser::parse_snapshot(&model_path)?;
    let workbook = read_workbook(&workbook_path)?;
    let catalog = classify(&workbook, &model)?;

    println!("{}", "Can be imported:".bold().green());
    for entry in &catalog.can_import {
        println!("   {}", entry.sheet);
    }
    println!("{}", "Cannot be imported:".bold().yellow());
    for entry in &catalog.cannot_import {
        println!(
            "   {} ({})",
            entry.sheet,
            entry.reason.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
