//! Workbook import
//!
//! This module adapts spreadsheet files to the conversion engine:
//! - Read: .xlsx/.xls/.ods (or JSON) → per-sheet cell tables
//! - Detect: formula columns from the first data row
//! - Import: per-sheet conversion sessions → import plan

pub mod detector;
pub mod importer;
pub mod reader;

pub use detector::{build_sheet, build_sheet_at, detect_columns};
pub use importer::{convert_sheet, convert_workbook, ExcelImporter, ImportOutcome, SheetReport};
pub use reader::WorkbookReader;
