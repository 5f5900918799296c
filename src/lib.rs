//! sheetbridge - round-trip model schedules through Excel workbooks
//!
//! This library exports the schedules and standards tables of a building
//! model to `.xlsx` workbooks, and imports edited workbooks back into the
//! model with per-sheet transactions.
//!
//! # Features
//!
//! - Grouped schedule sheets with subtotal and total formulas
//! - Locked read-only cells, editable cells left open
//! - Standards tables (line styles, object styles, parameters, project info)
//! - Value translations and ignored/read-only parameter settings
//! - Cancellable background jobs with progress reporting
//!
//! # Example
//!
//! ```no_run
//! use sheetbridge::export::{run_export, ExportRequest};
//! use sheetbridge::parser::parse_snapshot;
//! use sheetbridge::session::JobContext;
//! use sheetbridge::settings::ParametersSettings;
//! use std::path::{Path, PathBuf};
//!
//! let model = parse_snapshot(Path::new("project.yaml"))?;
//! let request = ExportRequest {
//!     schedules: vec!["Door Schedule".to_string()],
//!     standards: vec![],
//!     basic: false,
//!     output: PathBuf::from("doors.xlsx"),
//! };
//! let outcome = run_export(
//!     &model,
//!     &ParametersSettings::default(),
//!     &request,
//!     &JobContext::detached(),
//! )?;
//! println!("Cancelled: {}", outcome.is_cancelled());
//! # Ok::<(), sheetbridge::error::BridgeError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod export;
pub mod import;
pub mod model;
pub mod parser;
pub mod session;
pub mod settings;
pub mod types;
pub mod units;

// Re-export commonly used types
pub use error::{BridgeError, BridgeResult};
pub use model::{HostModel, ModelSnapshot};
pub use session::{JobContext, Outcome, Session};
