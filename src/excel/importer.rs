//! Excel importer implementation - workbook → import plan
//!
//! One conversion session per sheet: build the column mapping from the header
//! row, convert each formula column's first-row formula, and hand back column
//! definitions. Formula columns lose their row data so the destination
//! recomputes them; columns whose conversion failed are imported as data.

use crate::config::ConvertOptions;
use crate::convert::mapper::ColumnMapper;
use crate::convert::reporter::{ConversionReporter, ReportSummary};
use crate::convert::sanitize::IdentifierPicker;
use crate::convert::transpiler::{FormulaTranspiler, SheetRegistry};
use crate::error::FormportResult;
use crate::excel::reader::WorkbookReader;
use crate::types::{CellValue, ColumnOutput, ImportPlan, SheetData, TablePlan};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Conversion report for one sheet
#[derive(Debug, Clone)]
pub struct SheetReport {
    pub sheet: String,
    pub table: String,
    pub reporter: ConversionReporter,
}

/// Everything an import produces: the plan for the schema writer and the
/// per-sheet reports for review
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub plan: ImportPlan,
    pub reports: Vec<SheetReport>,
}

impl ImportOutcome {
    /// Counts across all sheets
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for report in &self.reports {
            summary.merge(&report.reporter.summary());
        }
        summary
    }
}

/// Excel importer for converting workbooks into an [`ImportPlan`]
pub struct ExcelImporter {
    path: PathBuf,
    options: ConvertOptions,
    sheet_filter: Option<String>,
    table_override: Option<String>,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new<P: AsRef<Path>>(path: P, options: ConvertOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
            sheet_filter: None,
            table_override: None,
        }
    }

    /// Only import the named sheet (case-insensitive)
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet_filter = Some(sheet.into());
        self
    }

    /// Use this table name instead of one derived from the sheet name.
    /// Only applies when a single sheet is imported.
    pub fn with_table_name(mut self, table: impl Into<String>) -> Self {
        self.table_override = Some(table.into());
        self
    }

    /// Read the workbook and convert it
    pub fn import(&self) -> FormportResult<ImportOutcome> {
        let mut sheets = WorkbookReader::new(&self.path)
            .with_header_rows(self.options.header_rows)
            .read()?;

        if let Some(filter) = &self.sheet_filter {
            sheets.retain(|s| s.name.eq_ignore_ascii_case(filter));
            if sheets.is_empty() {
                warn!(sheet = filter.as_str(), "sheet not found in workbook");
            }
        }

        let table_names = if sheets.len() == 1 {
            self.table_override.clone().map(|t| vec![t])
        } else {
            None
        };

        convert_workbook(&sheets, &self.options, table_names)
    }
}

/// Convert every sheet of a workbook. Table names come from `table_names`
/// when given (one per sheet), otherwise from the sanitized sheet names.
pub fn convert_workbook(
    sheets: &[SheetData],
    options: &ConvertOptions,
    table_names: Option<Vec<String>>,
) -> FormportResult<ImportOutcome> {
    let mut picker = IdentifierPicker::new().with_fallback("Table");
    let names: Vec<String> = match table_names {
        Some(names) if names.len() == sheets.len() => names,
        _ => sheets
            .iter()
            .map(|s| picker.pick_table(&s.name).identifier)
            .collect(),
    };

    // Every mapping is built before any formula is converted, so cross-sheet
    // references can resolve against any sheet
    let mut registry = SheetRegistry::new();
    for (sheet, table) in sheets.iter().zip(&names) {
        let sheet_options = options.clone().with_table_name(table.clone());
        let mapper = ColumnMapper::from_headers_at(&sheet.headers, sheet.first_column, &sheet_options);
        registry.insert(&sheet.name, mapper);
    }

    let mut outcome = ImportOutcome::default();
    for (position, sheet) in sheets.iter().enumerate() {
        let mapper = match registry.at(position) {
            Some(mapper) => mapper,
            None => continue,
        };
        let transpiler = FormulaTranspiler::new(mapper, options)?
            .with_sheets(&sheet.name, &registry)
            .with_data_start_row(sheet.data_start_row);
        let (mut table, reporter) = convert_sheet(sheet, mapper, &transpiler);

        if let Some(first) = registry.position_of(&sheet.name).filter(|&p| p != position) {
            warn!(
                sheet = sheet.name.as_str(),
                shadowed_by = sheets[first].name.as_str(),
                "duplicate sheet name"
            );
            table.warnings.push(format!(
                "Sheet '{}' has the same name as sheet '{}'; references to it from other sheets resolve to '{}'",
                sheet.name, sheets[first].name, sheets[first].name
            ));
        }

        let summary = reporter.summary();
        info!(
            sheet = sheet.name.as_str(),
            table = table.name.as_str(),
            formulas = summary.total,
            warnings = summary.with_warnings,
            failed = summary.failed,
            "sheet converted"
        );

        outcome.reports.push(SheetReport {
            sheet: sheet.name.clone(),
            table: table.name.clone(),
            reporter,
        });
        outcome.plan.tables.push(table);
    }

    Ok(outcome)
}

/// Convert one sheet with an already-built mapping
pub fn convert_sheet(
    sheet: &SheetData,
    mapper: &ColumnMapper,
    transpiler: &FormulaTranspiler<'_>,
) -> (TablePlan, ConversionReporter) {
    let mut reporter = ConversionReporter::new();
    let mut warnings: Vec<String> = mapper.warnings().to_vec();
    let mut columns = Vec::with_capacity(sheet.columns.len());

    for meta in &sheet.columns {
        let identifier = mapper
            .identifier_at(meta.index)
            .unwrap_or(meta.name.as_str())
            .to_string();

        let formula = meta.example_formula.as_deref().filter(|_| meta.is_formula);
        if let Some(formula) = formula {
            let result = transpiler.convert_at_row(formula, Some(sheet.data_start_row));

            if result.success {
                columns.push(ColumnOutput {
                    identifier,
                    label: meta.name.clone(),
                    is_formula: true,
                    formula: Some(result.output_formula.clone()),
                    original_formula: Some(result.original_formula.clone()),
                    values: Vec::new(),
                });
                reporter.add(meta.name.clone(), result);
                continue;
            }

            warn!(
                sheet = sheet.name.as_str(),
                column = meta.name.as_str(),
                formula,
                "formula not converted; importing column as data"
            );
            warnings.push(format!(
                "Column {} ({}): formula '{}' not converted; imported as data",
                meta.letter, meta.name, formula
            ));
            reporter.add(meta.name.clone(), result);
        }

        // Regular data column
        let values: Vec<CellValue> = sheet
            .column_cells(meta.index)
            .map(|cell| cell.map(|c| c.value.clone()).unwrap_or_default())
            .collect();
        columns.push(ColumnOutput {
            identifier,
            label: meta.name.clone(),
            is_formula: false,
            formula: None,
            original_formula: None,
            values,
        });
    }

    let table = TablePlan {
        name: mapper.table_name().to_string(),
        sheet: sheet.name.clone(),
        columns,
        warnings,
    };
    (table, reporter)
}
