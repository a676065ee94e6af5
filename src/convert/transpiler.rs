//! Formula translation - Excel cell formulas → column formulas
//!
//! Converts Excel formulas like "=B2*C2" to column formulas like
//! "$Price * $Quantity", using the sheet's [`ColumnMapper`].
//!
//! Rewrites, per reference token:
//! - `A2`, `$A2`          → `$Product` (this row's value)
//! - `A$2`, `$A$2`        → `Product[0]` (fixed row, warned)
//! - `A2:A10`, `B:B`      → `Table1.Product` (whole column)
//! - `A2:C10`             → unchanged, warned
//!
//! Nothing here returns an error to the caller: problems with one reference
//! become warnings and the token is kept as written.

use crate::config::ConvertOptions;
use crate::convert::formatter::format_tokens;
use crate::convert::functions::{is_supported_function, strip_future_prefix};
use crate::convert::mapper::ColumnMapper;
use crate::convert::reference::ReferenceParser;
use crate::convert::tokenizer::{Token, TokenKind, Tokenizer};
use crate::error::{FormportError, FormportResult};
use crate::types::{CellReference, ConversionResult};
use std::collections::HashMap;
use tracing::debug;

/// Column mappers of every sheet in a workbook, stored by sheet position.
///
/// Name lookup is case-insensitive, as Excel treats sheet names. When two
/// sheets share a name, lookups by that name find the first one.
#[derive(Debug, Clone, Default)]
pub struct SheetRegistry {
    mappers: Vec<ColumnMapper>,
    by_name: HashMap<String, usize>,
}

impl SheetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next sheet's mapper and return its position
    pub fn insert(&mut self, sheet_name: &str, mapper: ColumnMapper) -> usize {
        let position = self.mappers.len();
        self.mappers.push(mapper);
        self.by_name
            .entry(sheet_name.to_uppercase())
            .or_insert(position);
        position
    }

    /// Mapper of the sheet a reference like `Name!A:A` points at
    pub fn get(&self, sheet_name: &str) -> Option<&ColumnMapper> {
        self.position_of(sheet_name).and_then(|idx| self.at(idx))
    }

    /// Position of the first sheet with this name
    pub fn position_of(&self, sheet_name: &str) -> Option<usize> {
        self.by_name.get(&sheet_name.to_uppercase()).copied()
    }

    pub fn at(&self, position: usize) -> Option<&ColumnMapper> {
        self.mappers.get(position)
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

/// Which sheet a reference resolves against
enum SheetTarget<'m> {
    /// The sheet being converted
    Local,
    Other(&'m ColumnMapper),
}

/// Translates one sheet's formulas to column-formula syntax
pub struct FormulaTranspiler<'a> {
    mapper: &'a ColumnMapper,
    parser: ReferenceParser,
    /// 1-based spreadsheet row of the first data row; fixed-row index 0
    data_start_row: u32,
    warn_unknown_functions: bool,
    sheet_name: Option<String>,
    sheets: Option<&'a SheetRegistry>,
}

impl<'a> FormulaTranspiler<'a> {
    /// Create a transpiler for one sheet
    pub fn new(mapper: &'a ColumnMapper, options: &ConvertOptions) -> FormportResult<Self> {
        Ok(Self {
            mapper,
            parser: ReferenceParser::new()?,
            data_start_row: options.header_rows.saturating_add(1),
            warn_unknown_functions: options.warn_unknown_functions,
            sheet_name: None,
            sheets: None,
        })
    }

    /// Resolve `Sheet!Ref` references against other sheets. `sheet_name` is
    /// the sheet being converted, so references qualified with it resolve
    /// locally.
    pub fn with_sheets(mut self, sheet_name: &str, sheets: &'a SheetRegistry) -> Self {
        self.sheet_name = Some(sheet_name.to_string());
        self.sheets = Some(sheets);
        self
    }

    /// Spreadsheet row (1-based) holding the first data row, when the sheet
    /// does not start at row 1
    pub fn with_data_start_row(mut self, row: u32) -> Self {
        self.data_start_row = row.max(1);
        self
    }

    /// Convert a formula with no knowledge of which row it came from
    pub fn convert(&self, formula: &str) -> ConversionResult {
        self.convert_at_row(formula, None)
    }

    /// Convert a formula taken from spreadsheet row `row` (1-based). Knowing
    /// the row lets relative references to other rows be flagged.
    pub fn convert_at_row(&self, formula: &str, row: Option<u32>) -> ConversionResult {
        match self.translate(formula, row) {
            Ok((output, warnings)) => {
                debug!(
                    original = formula,
                    converted = output.as_str(),
                    warnings = warnings.len(),
                    "formula converted"
                );
                ConversionResult::converted(formula, output, warnings)
            }
            Err(err) => {
                debug!(original = formula, error = %err, "formula conversion failed");
                let err = match err {
                    FormportError::InternalConversionFailure(_) => err,
                    other => FormportError::InternalConversionFailure(other.to_string()),
                };
                ConversionResult::failed(formula, err)
            }
        }
    }

    fn translate(&self, formula: &str, row: Option<u32>) -> FormportResult<(String, Vec<String>)> {
        // Remove leading = if present
        let body = formula.strip_prefix('=').unwrap_or(formula);
        if body.trim().is_empty() {
            return Ok((String::new(), Vec::new()));
        }

        let mut tokens = Tokenizer::new(body)
            .tokenize()
            .map_err(|e| FormportError::InternalConversionFailure(e.to_string()))?;
        let mut warnings = Warnings::default();

        // Ranges first: their bounds must never be seen as lone cells
        for token in tokens.iter_mut() {
            if matches!(token.kind, TokenKind::RangeRef { .. }) {
                self.substitute_range(token, &mut warnings);
            }
        }

        for token in tokens.iter_mut() {
            match token.kind {
                TokenKind::CellRef { .. } => self.substitute_cell(token, row, &mut warnings),
                TokenKind::Function => self.check_function(token, &mut warnings),
                TokenKind::Name => warnings.push(format!(
                    "Unrecognized name '{}' kept unchanged (named ranges are not supported)",
                    token.text
                )),
                TokenKind::ErrorLiteral => {
                    warnings.push(format!("Error literal '{}' kept unchanged", token.text))
                }
                _ => {}
            }
        }

        Ok((format_tokens(&tokens), warnings.into_vec()))
    }

    /// Pick the sheet a reference token resolves against. `Err` carries the
    /// warning when the sheet is unknown.
    fn resolve_sheet(&self, sheet: Option<&str>, text: &str) -> Result<SheetTarget<'a>, String> {
        let sheet = match sheet {
            None => return Ok(SheetTarget::Local),
            Some(sheet) => sheet,
        };
        if self
            .sheet_name
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(sheet))
        {
            return Ok(SheetTarget::Local);
        }
        self.sheets
            .and_then(|sheets| sheets.get(sheet))
            .map(SheetTarget::Other)
            .ok_or_else(|| format!("Unknown sheet '{}' in reference '{}'; kept unchanged", sheet, text))
    }

    fn substitute_range(&self, token: &mut Token, warnings: &mut Warnings) {
        let sheet = match &token.kind {
            TokenKind::RangeRef { sheet } => sheet.clone(),
            _ => return,
        };
        let mapper = match self.resolve_sheet(sheet.as_deref(), &token.text) {
            Ok(SheetTarget::Local) => self.mapper,
            Ok(SheetTarget::Other(mapper)) => mapper,
            Err(warning) => return warnings.push(warning),
        };

        let reference = match self.parser.parse(token.reference_text()) {
            Ok(reference) => reference,
            Err(err) => return warnings.push(err.to_string()),
        };

        if !reference.is_single_column() {
            return warnings.push(FormportError::UnsupportedRange(token.text.clone()).to_string());
        }

        let ident = match mapper.get(&reference.column) {
            Some(ident) => ident,
            None => return warnings.push(unknown_column(&reference, &token.text)),
        };

        let replacement = format!("{}.{}", mapper.table_name(), ident);
        if reference.row.is_some() && reference.rows_absolute() {
            warnings.push(format!(
                "Absolute range '{}' converted to whole column '{}'; its row bounds are dropped",
                token.text, replacement
            ));
        }
        token.text = replacement;
    }

    fn substitute_cell(&self, token: &mut Token, row: Option<u32>, warnings: &mut Warnings) {
        let sheet = match &token.kind {
            TokenKind::CellRef { sheet } => sheet.clone(),
            _ => return,
        };
        if let Some(sheet) = sheet.as_deref() {
            match self.resolve_sheet(Some(sheet), &token.text) {
                Ok(SheetTarget::Local) => {}
                Ok(SheetTarget::Other(_)) => {
                    return warnings.push(format!(
                        "Cross-sheet cell reference '{}' cannot be converted; kept unchanged",
                        token.text
                    ))
                }
                Err(warning) => return warnings.push(warning),
            }
        }

        let reference = match self.parser.parse(token.reference_text()) {
            Ok(reference) => reference,
            Err(err) => return warnings.push(err.to_string()),
        };

        let ident = match self.mapper.get(&reference.column) {
            Some(ident) => ident,
            None => return warnings.push(unknown_column(&reference, &token.text)),
        };

        // Parsed cell references always carry a row
        let ref_row = reference.row.unwrap_or_default();

        if reference.row_absolute {
            if ref_row < self.data_start_row {
                return warnings.push(format!(
                    "Absolute reference '{}' points into the header rows; kept unchanged",
                    token.text
                ));
            }
            let index = ref_row - self.data_start_row;
            let replacement = format!("{}[{}]", ident, index);
            warnings.push(format!(
                "Absolute row reference '{}' converted to fixed-row access '{}'; it will not follow row reordering",
                token.text, replacement
            ));
            token.text = replacement;
            return;
        }

        if let Some(own_row) = row {
            if own_row != ref_row {
                warnings.push(format!(
                    "Reference '{}' points at row {} from a formula in row {}; converted to the current row's value",
                    token.text, ref_row, own_row
                ));
            }
        }
        token.text = format!("${}", ident);
    }

    fn check_function(&self, token: &mut Token, warnings: &mut Warnings) {
        let name = strip_future_prefix(&token.text).to_string();
        if self.warn_unknown_functions && !is_supported_function(&name) {
            warnings.push(format!("Unsupported function '{}' kept unchanged", name));
        }
        token.text = name;
    }
}

fn unknown_column(reference: &CellReference, text: &str) -> String {
    FormportError::UnknownColumn {
        column: reference.column.clone(),
        reference: text.to_string(),
    }
    .to_string()
}

/// Ordered warning list without repeats
#[derive(Default)]
struct Warnings(Vec<String>);

impl Warnings {
    fn push(&mut self, warning: String) {
        if !self.0.contains(&warning) {
            self.0.push(warning);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.0
    }
}
