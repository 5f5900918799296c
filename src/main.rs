use clap::{Parser, Subcommand};
use sheetbridge::cli;
use sheetbridge::export::StandardGroup;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetbridge")]
#[command(about = "Round-trip model schedules and standards tables through Excel workbooks.")]
#[command(long_about = "sheetbridge - Model schedules <-> Excel workbooks

Exports schedules and standards tables from a model snapshot to .xlsx,
and imports edited workbooks back into the model.

COMMANDS:
  export   - Model snapshot to Excel (.xlsx)
  import   - Edited Excel workbook back into the model
  inspect  - List which sheets of a workbook can be imported

EXAMPLES:
  sheetbridge export project.yaml doors.xlsx --schedule \"Door Schedule\"
  sheetbridge export project.yaml standards.xlsx --standards object-styles
  sheetbridge import project.yaml doors.xlsx --dry-run
  sheetbridge inspect doors.xlsx project.yaml

Logging: set RUST_LOG (default sheetbridge=info).")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Export schedules and standards to an Excel workbook.

Each schedule becomes one sheet with grouping, subtotals and a totals row.
Editable cells stay unlocked; read-only cells are locked and shaded.
A Legend sheet explaining the colours is added last unless --basic is given.

With neither --schedule nor --standards every schedule is exported.

STANDARD GROUPS:
  line-styles, object-styles, family-listing, shared-parameters,
  project-parameters, project-information")]
    /// Export schedules and standards to Excel (.xlsx)
    Export {
        /// Path to the model snapshot (YAML)
        model: PathBuf,

        /// Output Excel file (.xlsx)
        output: PathBuf,

        /// Schedule to export, by name or unique id (repeatable)
        #[arg(short, long = "schedule")]
        schedule: Vec<String>,

        /// Standards group to export (repeatable)
        #[arg(long, value_enum)]
        standards: Vec<StandardGroup>,

        /// Plain export: no formulas, no legend
        #[arg(long)]
        basic: bool,

        /// Parameter settings file (YAML)
        #[arg(long, env = "SHEETBRIDGE_SETTINGS")]
        settings: Option<PathBuf>,

        /// Show verbose export steps
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Import an edited workbook back into the model.

Sheets are matched to schedules and standards through their identity cell.
Each sheet is applied in its own transaction: a failing sheet is rolled back
and reported while the others are kept.

The updated snapshot is written to --output, or back over the model file.
Use --dry-run to count changes without writing anything.")]
    /// Import an Excel workbook into the model
    Import {
        /// Path to the model snapshot (YAML)
        model: PathBuf,

        /// Edited Excel file (.xlsx)
        workbook: PathBuf,

        /// Only import this sheet (repeatable)
        #[arg(long = "sheet")]
        sheet: Vec<String>,

        /// Parameter settings file (YAML)
        #[arg(long, env = "SHEETBRIDGE_SETTINGS")]
        settings: Option<PathBuf>,

        /// Write the updated snapshot here instead of over the model
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview changes without writing to file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show verbose import steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the sheets of a workbook that can and cannot be imported
    Inspect {
        /// Excel file (.xlsx)
        workbook: PathBuf,

        /// Path to the model snapshot (YAML)
        model: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetbridge=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            model,
            output,
            schedule,
            standards,
            basic,
            settings,
            verbose,
        } => cli::export(model, output, schedule, standards, basic, settings, verbose)?,

        Commands::Import {
            model,
            workbook,
            sheet,
            settings,
            output,
            dry_run,
            verbose,
        } => cli::import(model, workbook, sheet, settings, output, dry_run, verbose)?,

        Commands::Inspect { workbook, model } => cli::inspect(workbook, model)?,
    }
    Ok(())
}
