//! Workbook reading - .xlsx/.xls/.ods (via calamine) or JSON → [`SheetData`]
//!
//! The first used row of every sheet holds the headers; data starts
//! `header_rows` rows further down. Each cell is tagged `formula` or `value`
//! and keeps its A1 address.

use crate::convert::column_letter::column_letter;
use crate::error::{FormportError, FormportResult};
use crate::excel::detector::{build_sheet, build_sheet_at};
use crate::types::{CellData, CellValue, SheetData};
use calamine::{open_workbook_auto, Data, Range, Reader};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A sheet in the plain JSON input shape:
/// `{ name, headers, rows: [[{ value, formula?, type, address }]] }`
#[derive(Debug, Deserialize)]
struct RawSheet {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<CellData>>,
}

/// Reads every sheet of a workbook file
pub struct WorkbookReader {
    path: PathBuf,
    header_rows: u32,
}

impl WorkbookReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            header_rows: 1,
        }
    }

    /// Rows from the first used row down to the first data row (at least 1)
    pub fn with_header_rows(mut self, header_rows: u32) -> Self {
        self.header_rows = header_rows.max(1);
        self
    }

    /// Read all sheets. `.json` files use the plain JSON shape; anything else
    /// goes through calamine.
    pub fn read(&self) -> FormportResult<Vec<SheetData>> {
        let is_json = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            return read_json(&self.path);
        }

        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            FormportError::Excel(format!(
                "Failed to open {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names().to_vec() {
            let range = match workbook.worksheet_range(&sheet_name) {
                Ok(range) => range,
                Err(e) => {
                    debug!(sheet = sheet_name.as_str(), error = %e, "skipping unreadable sheet");
                    continue;
                }
            };
            // Formulas are optional: .ods and some .xls files may not expose them
            let formulas = workbook.worksheet_formula(&sheet_name).ok();

            match sheet_from_ranges(&sheet_name, &range, formulas.as_ref(), self.header_rows) {
                Some(sheet) => {
                    info!(
                        sheet = sheet.name.as_str(),
                        columns = sheet.headers.len(),
                        rows = sheet.rows.len(),
                        formula_columns = sheet.formula_count,
                        "sheet read"
                    );
                    sheets.push(sheet);
                }
                None => debug!(sheet = sheet_name.as_str(), "skipping empty sheet"),
            }
        }

        Ok(sheets)
    }
}

/// Read sheets from the plain JSON shape (a list of sheets)
pub fn read_json(path: &Path) -> FormportResult<Vec<SheetData>> {
    let content = std::fs::read_to_string(path)?;
    sheets_from_json(&content)
}

pub fn sheets_from_json(content: &str) -> FormportResult<Vec<SheetData>> {
    let raw: Vec<RawSheet> = serde_json::from_str(content)?;
    Ok(raw
        .into_iter()
        .map(|sheet| build_sheet(sheet.name, sheet.headers, sheet.rows))
        .collect())
}

/// Build a sheet from calamine's value range and (optional) formula range.
/// Headers come from the first used row, data from `header_rows` rows below
/// it. Returns `None` for empty sheets.
pub fn sheet_from_ranges(
    sheet_name: &str,
    range: &Range<Data>,
    formulas: Option<&Range<String>>,
    header_rows: u32,
) -> Option<SheetData> {
    let (start_row, start_col) = range.start()?;
    let (end_row, end_col) = range.end()?;

    let headers: Vec<String> = (start_col..=end_col)
        .map(|col| match range.get_value((start_row, col)) {
            Some(Data::Empty) | None => String::new(),
            Some(cell) => cell.to_string(),
        })
        .collect();

    let data_start = start_row.saturating_add(header_rows.max(1));
    let mut rows = Vec::new();
    for row in data_start..=end_row {
        let cells: Vec<CellData> = (start_col..=end_col)
            .map(|col| {
                let address = format!("{}{}", column_letter(col as usize), row + 1);
                let value = range
                    .get_value((row, col))
                    .map(cell_value)
                    .unwrap_or_default();
                let formula = formulas
                    .and_then(|f| f.get_value((row, col)))
                    .filter(|f| !f.is_empty());
                match formula {
                    Some(formula) => CellData::formula(formula.clone(), value, address),
                    None => CellData::value(value, address),
                }
            })
            .collect();
        rows.push(cells);
    }

    Some(build_sheet_at(
        sheet_name,
        headers,
        rows,
        start_col as usize,
        data_start.saturating_add(1),
    ))
}

/// Convert a calamine cell to a [`CellValue`]
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_range() -> (Range<Data>, Range<String>) {
        let mut values = Range::new((0, 0), (2, 2));
        values.set_value((0, 0), Data::String("Price".to_string()));
        values.set_value((0, 1), Data::String("Qty".to_string()));
        values.set_value((0, 2), Data::String("Total".to_string()));
        values.set_value((1, 0), Data::Float(10.0));
        values.set_value((1, 1), Data::Int(3));
        values.set_value((1, 2), Data::Float(30.0));
        values.set_value((2, 0), Data::Float(4.5));
        values.set_value((2, 1), Data::Int(2));
        values.set_value((2, 2), Data::Float(9.0));

        let mut formulas = Range::new((1, 2), (2, 2));
        formulas.set_value((1, 2), "A2*B2".to_string());
        formulas.set_value((2, 2), "A3*B3".to_string());

        (values, formulas)
    }

    #[test]
    fn test_sheet_from_ranges() {
        let (values, formulas) = create_test_range();
        let sheet = sheet_from_ranges("Orders", &values, Some(&formulas), 1).unwrap();

        assert_eq!(sheet.name, "Orders");
        assert_eq!(sheet.headers, vec!["Price", "Qty", "Total"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][1].value, CellValue::Number(3.0));
        assert_eq!(sheet.rows[0][2].formula.as_deref(), Some("A2*B2"));
        assert_eq!(sheet.rows[1][2].address, "C3");
        assert_eq!(sheet.formula_count, 1);
        assert!(sheet.columns[2].is_formula);
    }

    #[test]
    fn test_sheet_without_formula_range() {
        let (values, _) = create_test_range();
        let sheet = sheet_from_ranges("Orders", &values, None, 1).unwrap();
        assert_eq!(sheet.formula_count, 0);
        assert!(!sheet.rows[0][2].is_formula());
    }

    #[test]
    fn test_offset_range_keeps_real_addresses() {
        let mut values = Range::new((2, 1), (3, 1));
        values.set_value((2, 1), Data::String("Amount".to_string()));
        values.set_value((3, 1), Data::Float(1.0));

        let sheet = sheet_from_ranges("Offset", &values, None, 1).unwrap();
        assert_eq!(sheet.headers, vec!["Amount"]);
        assert_eq!(sheet.rows[0][0].address, "B4");
        assert_eq!(sheet.first_column, 1);
        assert_eq!(sheet.data_start_row, 4);
        assert_eq!(sheet.columns[0].letter, "B");
    }

    #[test]
    fn test_header_rows_skip_rows_below_header() {
        let (values, formulas) = create_test_range();
        let sheet = sheet_from_ranges("Orders", &values, Some(&formulas), 2).unwrap();

        assert_eq!(sheet.headers, vec!["Price", "Qty", "Total"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0][2].address, "C3");
        assert_eq!(sheet.data_start_row, 3);
        assert_eq!(sheet.columns[2].example_formula.as_deref(), Some("A3*B3"));
    }

    #[test]
    fn test_empty_range() {
        let values: Range<Data> = Range::empty();
        assert!(sheet_from_ranges("Empty", &values, None, 1).is_none());
    }

    #[test]
    fn test_sheets_from_json() {
        let json = r#"[{
            "name": "Orders",
            "headers": ["Price", "Qty", "Total"],
            "rows": [[
                {"value": 10, "type": "value", "address": "A2"},
                {"value": 3, "type": "value", "address": "B2"},
                {"value": 30, "formula": "=A2*B2", "type": "formula", "address": "C2"}
            ]]
        }]"#;

        let sheets = sheets_from_json(json).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].formula_count, 1);
        assert_eq!(sheets[0].columns[2].example_formula.as_deref(), Some("=A2*B2"));
        assert_eq!(sheets[0].rows[0][0].value, CellValue::Number(10.0));
    }

    #[test]
    fn test_cell_value_conversion() {
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            cell_value(&Data::String("x".to_string())),
            CellValue::Text("x".to_string())
        );
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
    }
}
