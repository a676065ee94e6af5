//! Column letter → destination identifier mapping, one per sheet

use crate::config::ConvertOptions;
use crate::convert::column_letter::{column_index, column_letter};
use crate::convert::sanitize::IdentifierPicker;

/// Maps spreadsheet column letters to destination identifiers (A → Product).
///
/// Built once from a sheet's header row and read-only afterwards, so it can be
/// shared by every formula conversion of that sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapper {
    table_name: String,
    /// 0-based spreadsheet column of `identifiers[0]`
    first_column: usize,
    /// Identifier per header position
    identifiers: Vec<String>,
    /// Renames made to keep identifiers unique
    warnings: Vec<String>,
}

impl ColumnMapper {
    /// Build a mapping from header texts, in column order starting at column A
    pub fn from_headers<S: AsRef<str>>(headers: &[S], options: &ConvertOptions) -> Self {
        Self::from_headers_at(headers, 0, options)
    }

    /// Build a mapping from header texts whose first header sits in spreadsheet
    /// column `first_column` (0-based: 1 means the headers start in B)
    pub fn from_headers_at<S: AsRef<str>>(
        headers: &[S],
        first_column: usize,
        options: &ConvertOptions,
    ) -> Self {
        let mut picker = IdentifierPicker::new()
            .with_reserved(&options.reserved_words)
            .with_fallback(options.fallback_column_name.clone());

        let mut identifiers = Vec::with_capacity(headers.len());
        let mut warnings = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            let picked = picker.pick(header.as_ref());
            if let Some(warning) = picked.warning {
                warnings.push(format!(
                    "Column {}: {}",
                    column_letter(first_column + idx),
                    warning
                ));
            }
            identifiers.push(picked.identifier);
        }

        Self {
            table_name: options.table_name.clone(),
            first_column,
            identifiers,
            warnings,
        }
    }

    /// Build directly from identifiers that are already valid and unique
    pub fn from_identifiers<I, S>(table_name: impl Into<String>, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table_name: table_name.into(),
            first_column: 0,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            warnings: Vec::new(),
        }
    }

    /// Identifier for a column letter (`"B"` → `"Price"`)
    pub fn get(&self, letter: &str) -> Option<&str> {
        let column = column_index(letter)?;
        self.identifier_at(column.checked_sub(self.first_column)?)
    }

    /// Identifier by header position (not spreadsheet column)
    pub fn identifier_at(&self, index: usize) -> Option<&str> {
        self.identifiers.get(index).map(String::as_str)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// `(letter, identifier)` pairs in column order
    pub fn entries(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.identifiers
            .iter()
            .enumerate()
            .map(|(idx, ident)| (column_letter(self.first_column + idx), ident.as_str()))
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}
