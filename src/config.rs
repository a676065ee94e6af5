//! Conversion options
//!
//! Options can come from defaults, a YAML file, or CLI flags (flags win).

use crate::error::{FormportError, FormportResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Table name used when the caller supplies none
pub const DEFAULT_TABLE_NAME: &str = "Table1";

/// Identifier used when a header sanitizes to nothing
pub const DEFAULT_FALLBACK_COLUMN: &str = "Column";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Destination table name used in whole-column references (`Table1.Price`)
    pub table_name: String,
    /// Rows from the top of a sheet's used range down to its first data row.
    /// Fixed-row access index = row - first data row; for standalone
    /// formulas the first data row is `header_rows + 1`.
    pub header_rows: u32,
    /// Identifier for headers that sanitize to an empty string
    pub fallback_column_name: String,
    /// Extra destination-reserved identifiers on top of the built-in list
    pub reserved_words: Vec<String>,
    /// Warn about function names outside the supported list
    pub warn_unknown_functions: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            header_rows: 1,
            fallback_column_name: DEFAULT_FALLBACK_COLUMN.to_string(),
            reserved_words: Vec::new(),
            warn_unknown_functions: true,
        }
    }
}

impl ConvertOptions {
    /// Load options from a YAML file; missing keys keep their defaults
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> FormportResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> FormportResult<Self> {
        let options: ConvertOptions = serde_yaml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Same options, different table
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn validate(&self) -> FormportResult<()> {
        if self.header_rows == 0 {
            return Err(FormportError::Config(
                "header_rows must be at least 1 (the header row itself)".to_string(),
            ));
        }
        if self.table_name.trim().is_empty() {
            return Err(FormportError::Config("table_name must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConvertOptions::default();
        assert_eq!(options.table_name, "Table1");
        assert_eq!(options.header_rows, 1);
        assert_eq!(options.fallback_column_name, "Column");
        assert!(options.warn_unknown_functions);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let options = ConvertOptions::from_yaml_str("table_name: Orders\n").unwrap();
        assert_eq!(options.table_name, "Orders");
        assert_eq!(options.header_rows, 1);
    }

    #[test]
    fn test_reserved_words_from_yaml() {
        let yaml = "reserved_words:\n  - Total\n  - Status\n";
        let options = ConvertOptions::from_yaml_str(yaml).unwrap();
        assert_eq!(options.reserved_words, vec!["Total", "Status"]);
    }

    #[test]
    fn test_zero_header_rows_rejected() {
        let result = ConvertOptions::from_yaml_str("header_rows: 0\n");
        assert!(matches!(result, Err(FormportError::Config(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ConvertOptions::from_yaml_str("tabel_name: Oops\n");
        assert!(matches!(result, Err(FormportError::Yaml(_))));
    }
}
