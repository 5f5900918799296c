//! Core engine: field resolution, value conversion, permissions, sorting and filtering

pub mod codec;
pub mod filter;
pub mod natural;
pub mod permission;
pub mod resolver;
pub mod sorter;
pub mod table;
pub mod translation;

pub use codec::{write_cell, ValueCodec, WriteOutcome};
pub use permission::{PermissionPolicy, ReadOnlySet};
pub use resolver::{FieldResolver, ResolutionKind, Resolved};
pub use table::{FlatRow, FlatTable};
pub use translation::TranslationTable;
