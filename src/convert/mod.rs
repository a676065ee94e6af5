//! Formula conversion engine
//!
//! Rewrites cell-addressed spreadsheet formulas (`B2*C2`) into column
//! formulas (`$Price * $Quantity`):
//! - column letters ↔ indices
//! - header text → unique destination identifiers
//! - reference parsing, tokenizing, substitution, operator spacing
//! - per-sheet reporting

pub mod column_letter;
pub mod formatter;
pub mod functions;
pub mod mapper;
pub mod reference;
pub mod reporter;
pub mod sanitize;
pub mod tokenizer;
pub mod transpiler;

pub use column_letter::{column_index, column_letter};
pub use formatter::format_operators;
pub use mapper::ColumnMapper;
pub use reference::ReferenceParser;
pub use reporter::{ConversionReporter, ConversionStatus, ReportEntry, ReportSummary};
pub use sanitize::{sanitize_identifier, sanitize_table_name, IdentifierPicker};
pub use transpiler::{FormulaTranspiler, SheetRegistry};
