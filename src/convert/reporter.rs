//! Per-sheet conversion report
//!
//! Collects the [`ConversionResult`] of every formula column and classifies
//! each one. Results are stored as given; nothing is rewritten here.

use crate::types::ConversionResult;
use serde::Serialize;

/// How one column's conversion went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    /// Converted with no warnings
    Success,
    /// Converted, but something was passed through or approximated
    Warning,
    /// Not converted; the column should be imported as plain data
    Failed,
}

impl ConversionStatus {
    pub fn of(result: &ConversionResult) -> Self {
        if !result.success {
            ConversionStatus::Failed
        } else if result.has_warnings() {
            ConversionStatus::Warning
        } else {
            ConversionStatus::Success
        }
    }
}

/// One column in the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub column: String,
    pub status: ConversionStatus,
    pub result: ConversionResult,
}

/// Counts across a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub successful: usize,
    pub with_warnings: usize,
    pub failed: usize,
}

impl ReportSummary {
    fn count(&mut self, status: ConversionStatus) {
        self.total += 1;
        match status {
            ConversionStatus::Success => self.successful += 1,
            ConversionStatus::Warning => self.with_warnings += 1,
            ConversionStatus::Failed => self.failed += 1,
        }
    }

    /// Add another summary's counts
    pub fn merge(&mut self, other: &ReportSummary) {
        self.total += other.total;
        self.successful += other.successful;
        self.with_warnings += other.with_warnings;
        self.failed += other.failed;
    }
}

/// Aggregates conversion results for one sheet
#[derive(Debug, Clone, Default)]
pub struct ConversionReporter {
    entries: Vec<ReportEntry>,
}

impl ConversionReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, column: impl Into<String>, result: ConversionResult) {
        let status = ConversionStatus::of(&result);
        self.entries.push(ReportEntry {
            column: column.into(),
            status,
            result,
        });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn with_status(&self, status: ConversionStatus) -> impl Iterator<Item = &ReportEntry> + '_ {
        self.entries.iter().filter(move |e| e.status == status)
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for entry in &self.entries {
            summary.count(entry.status);
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand the results over to the caller
    pub fn into_entries(self) -> Vec<ReportEntry> {
        self.entries
    }
}
