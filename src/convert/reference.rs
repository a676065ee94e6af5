//! Parsing of single reference tokens (`B2`, `$A$1`, `A2:A10`, `B:B`)
//!
//! Purely syntactic: whether the column exists in the sheet is the caller's
//! concern.

use crate::convert::column_letter::column_index;
use crate::error::{FormportError, FormportResult};
use crate::types::CellReference;
use regex::Regex;

/// Parses reference tokens into [`CellReference`]s
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    pattern: Regex,
}

impl ReferenceParser {
    pub fn new() -> FormportResult<Self> {
        let pattern = Regex::new(r"^(\$)?([A-Z]+)(\$)?([0-9]*)$").map_err(|e| {
            FormportError::InternalConversionFailure(format!("Regex error: {}", e))
        })?;
        Ok(Self { pattern })
    }

    /// Parse a cell, column, or range token
    pub fn parse(&self, token: &str) -> FormportResult<CellReference> {
        let mut parts = token.split(':');
        let first = parts.next().unwrap_or_default();
        match (parts.next(), parts.next()) {
            (None, _) => self.parse_bound(first, token),
            (Some(second), None) => {
                let start = self.parse_bound(first, token)?;
                let end = self.parse_bound(second, token)?;
                // A2:B and A:B2 mix cell and column bounds
                if start.row.is_some() != end.row.is_some() {
                    return Err(FormportError::InvalidReference(token.to_string()));
                }
                Ok(CellReference::range(start, end))
            }
            _ => Err(FormportError::InvalidReference(token.to_string())),
        }
    }

    fn parse_bound(&self, bound: &str, token: &str) -> FormportResult<CellReference> {
        let invalid = || FormportError::InvalidReference(token.to_string());

        let captures = self.pattern.captures(bound).ok_or_else(invalid)?;
        let column_absolute = captures.get(1).is_some();
        let column = captures.get(2).map(|m| m.as_str()).ok_or_else(invalid)?;
        let row_marker = captures.get(3).is_some();
        let digits = captures.get(4).map(|m| m.as_str()).unwrap_or_default();

        column_index(column).ok_or_else(invalid)?;

        let row = if digits.is_empty() {
            // `A$` has a row marker but no row
            if row_marker {
                return Err(invalid());
            }
            None
        } else {
            let row: u32 = digits.parse().map_err(|_| invalid())?;
            if row == 0 {
                return Err(invalid());
            }
            Some(row)
        };

        Ok(CellReference::single(
            column,
            row,
            column_absolute,
            row_marker,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ReferenceParser {
        ReferenceParser::new().unwrap()
    }

    #[test]
    fn test_parse_relative_cell() {
        let r = parser().parse("B2").unwrap();
        assert_eq!(r, CellReference::single("B", Some(2), false, false));
        assert!(!r.is_range);
        assert!(r.range_end.is_none());
    }

    #[test]
    fn test_parse_absolute_markers() {
        let p = parser();
        let r = p.parse("$A$1").unwrap();
        assert!(r.column_absolute && r.row_absolute);

        let r = p.parse("$A2").unwrap();
        assert!(r.column_absolute && !r.row_absolute);

        let r = p.parse("AA$100").unwrap();
        assert_eq!(r.column, "AA");
        assert_eq!(r.row, Some(100));
        assert!(!r.column_absolute && r.row_absolute);
    }

    #[test]
    fn test_parse_column_only() {
        let r = parser().parse("A").unwrap();
        assert_eq!(r.row, None);
    }

    #[test]
    fn test_parse_cell_range() {
        let r = parser().parse("A2:A10").unwrap();
        assert!(r.is_range);
        assert_eq!(r.row, Some(2));
        let end = r.range_end.as_ref().unwrap();
        assert_eq!(end.column, "A");
        assert_eq!(end.row, Some(10));
        assert!(r.is_single_column());
    }

    #[test]
    fn test_parse_column_range() {
        let r = parser().parse("B:B").unwrap();
        assert!(r.is_range);
        assert_eq!(r.row, None);
        assert_eq!(r.range_end.as_ref().unwrap().row, None);
    }

    #[test]
    fn test_parse_multi_column_range() {
        let r = parser().parse("A2:C10").unwrap();
        assert!(!r.is_single_column());
    }

    #[test]
    fn test_parse_invalid() {
        let p = parser();
        for token in ["", "2A", "a2", "A0", "A$", "A2:B", "A:B:C", "A-1", "A2:", "$$A1"] {
            assert!(
                matches!(p.parse(token), Err(FormportError::InvalidReference(_))),
                "expected '{}' to be rejected",
                token
            );
        }
    }

    #[test]
    fn test_parse_row_overflow() {
        let result = parser().parse("A99999999999");
        assert!(matches!(result, Err(FormportError::InvalidReference(_))));
    }
}
