//! Workbook import tests
//!
//! Fixtures are written with rust_xlsxwriter into a temp dir, then read back
//! through calamine by the importer.

use pretty_assertions::assert_eq;
use royalbit_formport::config::ConvertOptions;
use royalbit_formport::excel::{ExcelImporter, WorkbookReader};
use royalbit_formport::types::CellValue;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════

fn write_orders_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("orders.xlsx");
    let mut workbook = Workbook::new();

    let orders = workbook.add_worksheet();
    orders.set_name("Orders").unwrap();
    for (col, header) in ["Product", "Price", "Quantity", "Line Total", "Share"]
        .iter()
        .enumerate()
    {
        orders.write_string(0, col as u16, *header).unwrap();
    }
    let lines = [("Apple", 1.5, 4.0), ("Pear", 2.0, 1.0), ("Plum", 0.5, 10.0)];
    for (i, (product, price, qty)) in lines.iter().enumerate() {
        let row = (i + 1) as u32;
        let excel_row = row + 1;
        orders.write_string(row, 0, *product).unwrap();
        orders.write_number(row, 1, *price).unwrap();
        orders.write_number(row, 2, *qty).unwrap();
        orders
            .write_formula(row, 3, format!("=B{}*C{}", excel_row, excel_row).as_str())
            .unwrap();
        orders
            .write_formula(row, 4, format!("=D{}/SUM(D:D)", excel_row).as_str())
            .unwrap();
    }

    let rates = workbook.add_worksheet();
    rates.set_name("Rates").unwrap();
    rates.write_string(0, 0, "Region").unwrap();
    rates.write_string(0, 1, "Rate").unwrap();
    rates.write_string(1, 0, "North").unwrap();
    rates.write_number(1, 1, 0.2).unwrap();
    rates.write_string(2, 0, "South").unwrap();
    rates.write_number(2, 1, 0.1).unwrap();

    workbook.save(&path).unwrap();
    path
}

fn write_messy_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("messy.xlsx");
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("2024 Budget").unwrap();
    for (col, header) in ["Amount", "Amount", "class", "Block Sum", "Avg Rate"]
        .iter()
        .enumerate()
    {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_number(1, 0, 100.0).unwrap();
    sheet.write_number(1, 1, 50.0).unwrap();
    sheet.write_number(1, 2, 1.0).unwrap();
    sheet.write_formula(1, 3, "=SUM(A2:C2)").unwrap();
    sheet.write_formula(1, 4, "=AVERAGE(Rates!B:B)").unwrap();

    workbook.save(&path).unwrap();
    path
}

/// Header in B1:C1, data starting in B2
fn write_shifted_columns_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("shifted_columns.xlsx");
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Doubles").unwrap();
    sheet.write_string(0, 1, "Amount").unwrap();
    sheet.write_string(0, 2, "Double").unwrap();
    sheet.write_number(1, 1, 5.0).unwrap();
    sheet.write_formula(1, 2, "=B2*2").unwrap();
    sheet.write_number(2, 1, 7.0).unwrap();
    sheet.write_formula(2, 2, "=B3*2").unwrap();

    workbook.save(&path).unwrap();
    path
}

/// Header on row 3, data on rows 4 and 5
fn write_shifted_rows_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("shifted_rows.xlsx");
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Rates").unwrap();
    sheet.write_string(2, 0, "Rate").unwrap();
    sheet.write_string(2, 1, "Scaled").unwrap();
    sheet.write_number(3, 0, 0.5).unwrap();
    sheet.write_formula(3, 1, "=A4*A$4").unwrap();
    sheet.write_number(4, 0, 0.25).unwrap();
    sheet.write_formula(4, 1, "=A5*A$4").unwrap();

    workbook.save(&path).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// READER
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_reader_detects_formula_columns() {
    let dir = TempDir::new().unwrap();
    let path = write_orders_workbook(dir.path());

    let sheets = WorkbookReader::new(&path).read().unwrap();
    assert_eq!(sheets.len(), 2);

    let orders = &sheets[0];
    assert_eq!(orders.name, "Orders");
    assert_eq!(orders.rows.len(), 3);
    assert_eq!(orders.formula_count, 2);
    assert!(orders.columns[3].is_formula);
    assert_eq!(orders.columns[3].example_formula.as_deref(), Some("B2*C2"));
    assert_eq!(orders.rows[0][0].value, CellValue::Text("Apple".to_string()));
    assert_eq!(orders.rows[2][3].address, "D4");

    assert_eq!(sheets[1].formula_count, 0);
}

#[test]
fn test_reader_missing_file() {
    let result = WorkbookReader::new("does-not-exist.xlsx").read();
    assert!(result.is_err());
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORTER
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_import_orders_workbook() {
    let dir = TempDir::new().unwrap();
    let path = write_orders_workbook(dir.path());

    let outcome = ExcelImporter::new(&path, ConvertOptions::default())
        .import()
        .unwrap();

    assert_eq!(outcome.plan.tables.len(), 2);
    let orders = &outcome.plan.tables[0];
    assert_eq!(orders.name, "Orders");

    let identifiers: Vec<&str> = orders.columns.iter().map(|c| c.identifier.as_str()).collect();
    assert_eq!(
        identifiers,
        vec!["Product", "Price", "Quantity", "Line_Total", "Share"]
    );

    let total = &orders.columns[3];
    assert!(total.is_formula);
    assert_eq!(total.formula.as_deref(), Some("$Price * $Quantity"));
    assert_eq!(total.original_formula.as_deref(), Some("B2*C2"));
    assert!(total.values.is_empty());

    let share = &orders.columns[4];
    assert_eq!(share.formula.as_deref(), Some("$Line_Total / SUM(Orders.Line_Total)"));

    let price = &orders.columns[1];
    assert!(!price.is_formula);
    assert_eq!(
        price.values,
        vec![
            CellValue::Number(1.5),
            CellValue::Number(2.0),
            CellValue::Number(0.5)
        ]
    );

    let summary = outcome.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 0);
}

#[test]
fn test_import_single_sheet_with_table_name() {
    let dir = TempDir::new().unwrap();
    let path = write_orders_workbook(dir.path());

    let outcome = ExcelImporter::new(&path, ConvertOptions::default())
        .with_sheet("orders")
        .with_table_name("Sales")
        .import()
        .unwrap();

    assert_eq!(outcome.plan.tables.len(), 1);
    let table = &outcome.plan.tables[0];
    assert_eq!(table.name, "Sales");
    assert_eq!(table.sheet, "Orders");
    assert_eq!(
        table.columns[4].formula.as_deref(),
        Some("$Line_Total / SUM(Sales.Line_Total)")
    );
}

#[test]
fn test_import_unknown_sheet_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = write_orders_workbook(dir.path());

    let outcome = ExcelImporter::new(&path, ConvertOptions::default())
        .with_sheet("Nope")
        .import()
        .unwrap();
    assert!(outcome.plan.tables.is_empty());
}

#[test]
fn test_import_messy_headers_and_warnings() {
    let dir = TempDir::new().unwrap();
    let path = write_messy_workbook(dir.path());

    let outcome = ExcelImporter::new(&path, ConvertOptions::default())
        .import()
        .unwrap();
    let table = &outcome.plan.tables[0];

    // Sheet "2024 Budget" cannot start an identifier with a digit
    assert_eq!(table.name, "_2024_Budget");

    let identifiers: Vec<&str> = table.columns.iter().map(|c| c.identifier.as_str()).collect();
    assert_eq!(identifiers[0], "Amount");
    assert_eq!(identifiers[1], "Amount2");
    assert_eq!(identifiers[2], "class2");
    assert!(table.warnings.iter().any(|w| w.contains("already used")));
    assert!(table.warnings.iter().any(|w| w.contains("reserved")));

    // Multi-column range is kept, column still imported as a formula
    let block = &table.columns[3];
    assert!(block.is_formula);
    assert_eq!(block.formula.as_deref(), Some("SUM(A2:C2)"));

    // Rates is not in this workbook
    let avg = &table.columns[4];
    assert_eq!(avg.formula.as_deref(), Some("AVERAGE(Rates!B:B)"));

    let summary = outcome.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.with_warnings, 2);
}

#[test]
fn test_import_header_not_in_column_a() {
    let dir = TempDir::new().unwrap();
    let path = write_shifted_columns_workbook(dir.path());

    let outcome = ExcelImporter::new(&path, ConvertOptions::default())
        .import()
        .unwrap();
    let table = &outcome.plan.tables[0];

    let identifiers: Vec<&str> = table.columns.iter().map(|c| c.identifier.as_str()).collect();
    assert_eq!(identifiers, vec!["Amount", "Double"]);

    let double = &table.columns[1];
    assert!(double.is_formula);
    assert_eq!(double.formula.as_deref(), Some("$Amount * 2"));
    assert_eq!(table.columns[0].values, vec![CellValue::Number(5.0), CellValue::Number(7.0)]);
    assert_eq!(outcome.summary().with_warnings, 0);
}

#[test]
fn test_import_header_not_in_row_one() {
    let dir = TempDir::new().unwrap();
    let path = write_shifted_rows_workbook(dir.path());

    let sheets = WorkbookReader::new(&path).read().unwrap();
    assert_eq!(sheets[0].data_start_row, 4);
    assert_eq!(sheets[0].rows.len(), 2);

    let outcome = ExcelImporter::new(&path, ConvertOptions::default())
        .import()
        .unwrap();
    let scaled = &outcome.plan.tables[0].columns[1];
    assert_eq!(scaled.formula.as_deref(), Some("$Rate * Rate[0]"));
}

#[test]
fn test_import_honours_header_rows_option() {
    let dir = TempDir::new().unwrap();
    let path = write_shifted_rows_workbook(dir.path());

    // Header row plus one unit row; rates start on row 5
    let options = ConvertOptions {
        header_rows: 2,
        ..ConvertOptions::default()
    };
    let outcome = ExcelImporter::new(&path, options).import().unwrap();
    let table = &outcome.plan.tables[0];

    assert_eq!(table.columns[0].values, vec![CellValue::Number(0.25)]);
    let scaled = &table.columns[1];
    assert_eq!(scaled.original_formula.as_deref(), Some("A5*A$4"));
    assert_eq!(scaled.formula.as_deref(), Some("$Rate * A$4"));
    assert!(table.warnings.is_empty());
    let entries = outcome.reports[0].reporter.entries();
    assert!(entries[0].result.warnings[0].contains("header rows"));
}

#[test]
fn test_import_json_cell_dump() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dump.json");
    std::fs::write(
        &path,
        r#"[
  {
    "name": "Sheet1",
    "headers": ["Net", "Tax Rate", "Gross"],
    "rows": [
      [
        {"value": 100, "type": "value", "address": "A2"},
        {"value": 0.2, "type": "value", "address": "B2"},
        {"value": 120, "formula": "=A2*(1+B$2)", "type": "formula", "address": "C2"}
      ]
    ]
  }
]"#,
    )
    .unwrap();

    let outcome = ExcelImporter::new(&path, ConvertOptions::default())
        .import()
        .unwrap();
    let table = &outcome.plan.tables[0];
    assert_eq!(table.name, "Sheet1");

    let gross = &table.columns[2];
    assert_eq!(gross.formula.as_deref(), Some("$Net * (1 + Tax_Rate[0])"));

    let entries = outcome.reports[0].reporter.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].result.warnings.len(), 1);
}
