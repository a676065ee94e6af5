use clap::{Parser, Subcommand};
use royalbit_formport::cli::{self, ImportArgs, OutputFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "formport")]
#[command(about = "Convert spreadsheet formulas into column formulas.")]
#[command(long_about = "Formport - spreadsheet formulas → column formulas

Reads a workbook, detects formula columns from the first data row, and
rewrites their cell formulas into column syntax:

  B2*C2          →  $Price * $Quantity
  SUM(A2:A10)    →  SUM(Table1.Product)
  B$2            →  Price[0]            (warned: fixed row)
  SUM(A2:C10)    →  SUM(A2:C10)         (warned: multi-column range)

COMMANDS:
  import   - Workbook (.xlsx/.xls/.ods/.json) to an import plan
  convert  - Convert one formula against a header list

EXAMPLES:
  formport import sales.xlsx -o sales.yaml
  formport convert \"=IF(E2,B2*0.9,B2)\" --columns Product,Price,Qty,Total,\"Is Premium\"

Set RUST_LOG=formport=debug for per-formula logging.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Import a workbook and convert its formula columns.

Each sheet becomes a table. The first used row is the header row; headers are
sanitized into unique identifiers. A column is a formula column when its first
data cell holds a formula. Formula columns are emitted without row data so the
destination recomputes them; columns whose formula fails to convert are
imported as plain data.

OUTPUT:
  YAML by default, JSON with --format json or a .json output path.
  Without --output the plan is printed to stdout.

EXAMPLES:
  formport import model.xlsx -o model.yaml
  formport import model.xlsx --sheet Orders --table Orders -o orders.json")]
    /// Import a workbook and convert its formula columns
    Import {
        /// Path to workbook (.xlsx, .xls, .ods, or .json cell dump)
        input: PathBuf,

        /// Output file for the import plan
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from output extension, else yaml)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Table name to use (single-sheet imports only)
        #[arg(short, long, env = "FORMPORT_TABLE")]
        table: Option<String>,

        /// Only import this sheet
        #[arg(short, long)]
        sheet: Option<String>,

        /// YAML file with conversion options
        #[arg(short, long, env = "FORMPORT_CONFIG")]
        config: Option<PathBuf>,

        /// Show verbose import steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Convert a single formula against a list of column headers
    Convert {
        /// Excel formula, e.g. "=B2*C2"
        formula: String,

        /// Header texts in column order (A, B, C, ...)
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Table name for whole-column references
        #[arg(short, long, env = "FORMPORT_TABLE")]
        table: Option<String>,

        /// YAML file with conversion options
        #[arg(short, long, env = "FORMPORT_CONFIG")]
        config: Option<PathBuf>,

        /// Show the column mapping
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formport=warn,royalbit_formport=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            input,
            output,
            format,
            table,
            sheet,
            config,
            verbose,
        } => cli::import(ImportArgs {
            input,
            output,
            format,
            table,
            sheet,
            config,
            verbose,
        })?,

        Commands::Convert {
            formula,
            columns,
            table,
            config,
            verbose,
        } => cli::convert(formula, columns, table, config, verbose)?,
    }

    Ok(())
}
