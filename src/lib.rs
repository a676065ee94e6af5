//! Formport - spreadsheet formulas → column formulas
//!
//! This library reads workbooks, decides which columns are formula-driven,
//! and rewrites their cell-addressed formulas into column-oriented syntax,
//! reporting every reference it could not translate safely.
//!
//! # Features
//!
//! - Cell references to current-row values (`B2` → `$Price`)
//! - Same-column ranges to whole-column references (`A2:A10` → `Table1.Product`)
//! - Absolute rows to fixed-row access (`A$2` → `Product[0]`), with a warning
//! - Pass-through plus warning for anything that cannot be translated
//! - Header text sanitized into unique, valid identifiers
//!
//! # Example
//!
//! ```
//! use royalbit_formport::config::ConvertOptions;
//! use royalbit_formport::convert::{ColumnMapper, FormulaTranspiler};
//!
//! let options = ConvertOptions::default();
//! let mapper = ColumnMapper::from_headers(&["Product", "Price", "Quantity"], &options);
//! let transpiler = FormulaTranspiler::new(&mapper, &options)?;
//!
//! let result = transpiler.convert("=B2*C2");
//! assert!(result.success);
//! assert_eq!(result.output_formula, "$Price * $Quantity");
//! # Ok::<(), royalbit_formport::error::FormportError>(())
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use config::ConvertOptions;
pub use error::{FormportError, FormportResult};
pub use types::{CellReference, ColumnMetadata, ConversionResult, ImportPlan, SheetData};
