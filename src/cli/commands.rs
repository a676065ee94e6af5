use crate::config::ConvertOptions;
use crate::convert::{ColumnMapper, ConversionStatus, FormulaTranspiler, ReportSummary};
use crate::error::{FormportError, FormportResult};
use crate::excel::{ExcelImporter, ImportOutcome};
use crate::types::ImportPlan;
use clap::ValueEnum;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Serialization format for the import plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    /// Pick a format from the output file extension, falling back to `default`
    pub fn for_path(path: Option<&Path>, default: OutputFormat) -> OutputFormat {
        match path.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                OutputFormat::Yaml
            }
            _ => default,
        }
    }

    pub fn render(self, plan: &ImportPlan) -> FormportResult<String> {
        Ok(match self {
            OutputFormat::Yaml => serde_yaml::to_string(plan)?,
            OutputFormat::Json => serde_json::to_string_pretty(plan)? + "\n",
        })
    }
}

/// Arguments of the import command
#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub table: Option<String>,
    pub sheet: Option<String>,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

fn load_options(config: Option<&Path>) -> FormportResult<ConvertOptions> {
    match config {
        Some(path) => ConvertOptions::from_yaml_file(path),
        None => Ok(ConvertOptions::default()),
    }
}

/// Execute the import command
pub fn import(args: ImportArgs) -> FormportResult<()> {
    let options = load_options(args.config.as_deref())?;

    println!("{}", "📥 Formport - Workbook Import".bold().green());
    println!("   Input:  {}", args.input.display());
    if let Some(output) = &args.output {
        println!("   Output: {}", output.display());
    }
    println!();

    if args.verbose {
        println!("{}", "📖 Reading workbook...".cyan());
    }

    let mut importer = ExcelImporter::new(&args.input, options);
    if let Some(sheet) = &args.sheet {
        importer = importer.with_sheet(sheet.clone());
    }
    if let Some(table) = &args.table {
        importer = importer.with_table_name(table.clone());
    }
    let outcome = importer.import()?;

    if outcome.plan.tables.is_empty() {
        return Err(FormportError::Excel(match &args.sheet {
            Some(sheet) => format!("Sheet '{}' not found or empty", sheet),
            None => "Workbook has no non-empty sheets".to_string(),
        }));
    }

    print_report(&outcome, args.verbose);

    let format = args
        .format
        .unwrap_or_else(|| OutputFormat::for_path(args.output.as_deref(), OutputFormat::Yaml));
    let rendered = format.render(&outcome.plan)?;

    match &args.output {
        Some(output) => {
            if args.verbose {
                println!("{}", "💾 Writing import plan...".cyan());
            }
            fs::write(output, rendered)?;
            println!("{}", "✅ Import plan written".bold().green());
            println!("   File: {}\n", output.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn print_report(outcome: &ImportOutcome, verbose: bool) {
    for (report, table) in outcome.reports.iter().zip(&outcome.plan.tables) {
        println!(
            "   📊 Sheet {} → table {}",
            report.sheet.bright_blue().bold(),
            report.table.bright_blue()
        );

        if verbose {
            for column in &table.columns {
                let kind = if column.is_formula { "formula" } else { "data" };
                println!("      {} ({}) [{}]", column.identifier.cyan(), column.label, kind);
            }
        }

        for warning in &table.warnings {
            println!("      {} {}", "⚠️".yellow(), warning.yellow());
        }

        for entry in report.reporter.entries() {
            let marker = match entry.status {
                ConversionStatus::Success => "✅".green(),
                ConversionStatus::Warning => "⚠️".yellow(),
                ConversionStatus::Failed => "❌".red(),
            };
            println!("      {} {}", marker, entry.column.bold());
            println!("         Excel:  {}", entry.result.original_formula);
            if entry.result.success {
                println!("         Column: {}", entry.result.output_formula.bright_green());
            }
            for warning in &entry.result.warnings {
                println!("         {}", warning.yellow());
            }
        }
        println!();
    }

    print_summary(&outcome.summary());
}

fn print_summary(summary: &ReportSummary) {
    println!("{}", "📋 Formula columns:".bold().cyan());
    println!("   Total:         {}", summary.total);
    println!("   Converted:     {}", summary.successful.to_string().green());
    println!("   With warnings: {}", summary.with_warnings.to_string().yellow());
    println!("   Failed:        {}", summary.failed.to_string().red());
    println!();
}

/// Execute the convert command: one formula against an ad-hoc header list
pub fn convert(
    formula: String,
    columns: Vec<String>,
    table: Option<String>,
    config: Option<PathBuf>,
    verbose: bool,
) -> FormportResult<()> {
    let mut options = load_options(config.as_deref())?;
    if let Some(table) = table {
        options = options.with_table_name(table);
    }
    options.validate()?;

    let mapper = ColumnMapper::from_headers(&columns, &options);
    if verbose {
        println!("{}", "🗺️  Column mapping:".bold().cyan());
        for (letter, ident) in mapper.entries() {
            println!("   {} → {}", letter, ident.cyan());
        }
        for warning in mapper.warnings() {
            println!("   {}", warning.yellow());
        }
        println!();
    }

    let transpiler = FormulaTranspiler::new(&mapper, &options)?;
    let result = transpiler.convert(&formula);

    println!("   Excel:  {}", result.original_formula);
    if result.success {
        println!("   Column: {}", result.output_formula.bright_green().bold());
    }
    for warning in &result.warnings {
        println!("   {} {}", "⚠️".yellow(), warning.yellow());
    }

    if !result.success {
        let reason = result
            .warnings
            .first()
            .map(|w| w.trim_start_matches("Conversion failed: ").to_string())
            .unwrap_or_default();
        return Err(FormportError::InternalConversionFailure(reason));
    }
    Ok(())
}
