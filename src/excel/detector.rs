//! Formula column detection
//!
//! A column is a formula column when its cell in the first data row holds a
//! formula. Later rows are never consulted, so a column whose formulas start
//! below the first data row is classified as data.

use crate::convert::column_letter::{column_index, column_letter};
use crate::types::{CellData, ColumnMetadata, SheetData};

/// Data start assumed when the rows carry no address to read it from
const DEFAULT_DATA_START_ROW: u32 = 2;

/// Classify every column from the first data row. `first_column` is the
/// 0-based spreadsheet column of `headers[0]`.
pub fn detect_columns<S: AsRef<str>>(
    headers: &[S],
    rows: &[Vec<CellData>],
    first_column: usize,
) -> Vec<ColumnMetadata> {
    let first_row = rows.first();

    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let cell = first_row.and_then(|row| row.get(index));
            let formula = cell
                .filter(|c| c.is_formula())
                .and_then(|c| c.formula.clone());

            ColumnMetadata {
                name: header.as_ref().to_string(),
                index,
                letter: column_letter(first_column + index),
                is_formula: formula.is_some(),
                example_value: match formula {
                    Some(_) => None,
                    None => cell.map(|c| c.value.clone()),
                },
                example_formula: formula,
            }
        })
        .collect()
}

/// Assemble a [`SheetData`], taking the sheet's origin from the address of
/// the first data cell (`B4` → first column B, data from row 4). Without rows
/// the origin is A2.
pub fn build_sheet(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<CellData>>) -> SheetData {
    let (first_column, data_start_row) = rows
        .first()
        .and_then(|row| row.first())
        .and_then(|cell| split_address(&cell.address))
        .unwrap_or((0, DEFAULT_DATA_START_ROW));
    build_sheet_at(name, headers, rows, first_column, data_start_row)
}

/// Assemble a [`SheetData`] whose origin is known, classifying its columns on
/// the way
pub fn build_sheet_at(
    name: impl Into<String>,
    headers: Vec<String>,
    rows: Vec<Vec<CellData>>,
    first_column: usize,
    data_start_row: u32,
) -> SheetData {
    let columns = detect_columns(&headers, &rows, first_column);
    let formula_count = columns.iter().filter(|c| c.is_formula).count();

    SheetData {
        name: name.into(),
        headers,
        columns,
        rows,
        formula_count,
        first_column,
        data_start_row,
    }
}

/// `AB12` → `(27, 12)`
fn split_address(address: &str) -> Option<(usize, u32)> {
    let digits_at = address.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = address.split_at(digits_at);
    let row = digits.parse().ok().filter(|row| *row > 0)?;
    Some((column_index(letters)?, row))
}
