use serde::{Deserialize, Serialize};
use std::fmt;

//==============================================================================
// References
//==============================================================================

/// A parsed spreadsheet reference: a single cell (`B2`, `$A$1`), a whole
/// column (`A`), or a range of either (`A2:A10`, `B:B`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellReference {
    /// Column letters, always uppercase (A, B, ..., AA)
    pub column: String,
    /// 1-based spreadsheet row, `None` for whole-column references
    pub row: Option<u32>,
    pub column_absolute: bool,
    pub row_absolute: bool,
    pub is_range: bool,
    /// Right-hand side of a range; present iff `is_range`
    pub range_end: Option<Box<CellReference>>,
}

impl CellReference {
    /// Build a non-range reference
    pub fn single(
        column: impl Into<String>,
        row: Option<u32>,
        column_absolute: bool,
        row_absolute: bool,
    ) -> Self {
        Self {
            column: column.into(),
            row,
            column_absolute,
            row_absolute,
            is_range: false,
            range_end: None,
        }
    }

    /// Compose two bounds into one range reference
    pub fn range(start: CellReference, end: CellReference) -> Self {
        Self {
            is_range: true,
            range_end: Some(Box::new(end)),
            ..start
        }
    }

    /// True when both bounds of a range sit in the same column.
    /// Single references are trivially single-column.
    pub fn is_single_column(&self) -> bool {
        match &self.range_end {
            Some(end) => end.column == self.column,
            None => true,
        }
    }

    /// True when every bound carries an absolute row marker (`A$2:A$10`)
    pub fn rows_absolute(&self) -> bool {
        match &self.range_end {
            Some(end) => self.row_absolute && end.row_absolute,
            None => self.row_absolute,
        }
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.column_absolute {
            f.write_str("$")?;
        }
        f.write_str(&self.column)?;
        if let Some(row) = self.row {
            if self.row_absolute {
                f.write_str("$")?;
            }
            write!(f, "{}", row)?;
        }
        if let Some(end) = &self.range_end {
            write!(f, ":{}", end)?;
        }
        Ok(())
    }
}

//==============================================================================
// Workbook input
//==============================================================================

/// Whether a cell holds a formula or a literal value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Formula,
    Value,
}

/// A literal cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// One cell as delivered by the workbook reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    /// Cached value (for formula cells: the last computed result)
    pub value: CellValue,
    /// Formula text, with or without a leading `=`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(rename = "type")]
    pub kind: CellKind,
    /// A1-style address, e.g. `AA100`
    pub address: String,
}

impl CellData {
    pub fn value(value: CellValue, address: impl Into<String>) -> Self {
        Self {
            value,
            formula: None,
            kind: CellKind::Value,
            address: address.into(),
        }
    }

    pub fn formula(formula: impl Into<String>, value: CellValue, address: impl Into<String>) -> Self {
        Self {
            value,
            formula: Some(formula.into()),
            kind: CellKind::Formula,
            address: address.into(),
        }
    }

    pub fn is_formula(&self) -> bool {
        self.kind == CellKind::Formula
    }
}

/// Per-column classification, decided from the first data row only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    /// 0-based column index
    pub index: usize,
    pub letter: String,
    pub is_formula: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_value: Option<CellValue>,
}

/// One worksheet, read once and never mutated afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub headers: Vec<String>,
    pub columns: Vec<ColumnMetadata>,
    /// Data rows only; the header row is not included
    pub rows: Vec<Vec<CellData>>,
    pub formula_count: usize,
    /// 0-based spreadsheet column of `headers[0]` (1 when the used range starts in B)
    pub first_column: usize,
    /// 1-based spreadsheet row of the first data row
    pub data_start_row: u32,
}

impl SheetData {
    /// Cells of one column, top to bottom. Short rows yield no cell.
    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = Option<&CellData>> + '_ {
        self.rows.iter().map(move |row| row.get(index))
    }
}

//==============================================================================
// Conversion output
//==============================================================================

/// Outcome of converting a single formula. Always produced, never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub output_formula: String,
    pub success: bool,
    pub warnings: Vec<String>,
    pub original_formula: String,
}

impl ConversionResult {
    pub fn converted(
        original_formula: impl Into<String>,
        output_formula: impl Into<String>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            output_formula: output_formula.into(),
            success: true,
            warnings,
            original_formula: original_formula.into(),
        }
    }

    pub fn failed(original_formula: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            output_formula: String::new(),
            success: false,
            warnings: vec![reason.to_string()],
            original_formula: original_formula.into(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// One destination column, as handed to the schema writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutput {
    pub identifier: String,
    /// Original header text
    pub label: String,
    pub is_formula: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_formula: Option<String>,
    /// Row data; always empty for formula columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<CellValue>,
}

/// One destination table built from one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePlan {
    pub name: String,
    pub sheet: String,
    pub columns: Vec<ColumnOutput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl TablePlan {
    pub fn formula_columns(&self) -> impl Iterator<Item = &ColumnOutput> + '_ {
        self.columns.iter().filter(|c| c.is_formula)
    }
}

/// Everything produced from one workbook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPlan {
    pub tables: Vec<TablePlan>,
}
