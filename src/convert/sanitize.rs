//! Identifier sanitizing
//!
//! The one canonical sanitizer. Column headers, sheet names and anything else
//! that becomes a destination identifier goes through [`sanitize_identifier`];
//! uniqueness within a table (or workbook) is handled by [`IdentifierPicker`].

use std::collections::HashSet;

/// Python keywords; destination formulas are evaluated as Python expressions
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Column identifiers the destination table creates on its own
const BUILTIN_COLUMNS: &[&str] = &["id", "manualSort"];

/// Sanitize with the default `"Column"` fallback
pub fn sanitize_identifier(raw: &str) -> String {
    sanitize_identifier_or(raw, crate::config::DEFAULT_FALLBACK_COLUMN)
}

/// Turn arbitrary text into `[A-Za-z_][A-Za-z0-9_]*`.
///
/// Step order matters: the digit guard runs after trimming, otherwise the
/// underscore it adds would be trimmed right back off.
pub fn sanitize_identifier_or(raw: &str, fallback: &str) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' };
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.trim_matches('_');

    let ident = if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    };

    if ident.is_empty() {
        // The fallback must satisfy the same pattern as everything else
        return sanitize_fallback(fallback);
    }
    ident
}

fn sanitize_fallback(fallback: &str) -> String {
    let ident: String = fallback
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    match ident.chars().next() {
        None => crate::config::DEFAULT_FALLBACK_COLUMN.to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", ident),
        Some(_) => ident,
    }
}

/// Sanitize a sheet name into a table identifier: fallback `Table`,
/// first letter capitalised.
pub fn sanitize_table_name(raw: &str) -> String {
    let ident = sanitize_identifier_or(raw, "Table");
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => ident,
    }
}

/// Whether `ident` is a destination-reserved word (exact-case Python keyword
/// or case-insensitive builtin column name)
pub fn is_reserved(ident: &str) -> bool {
    KEYWORDS.contains(&ident)
        || BUILTIN_COLUMNS
            .iter()
            .any(|builtin| builtin.eq_ignore_ascii_case(ident))
}

/// Result of picking one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedIdentifier {
    pub identifier: String,
    /// Present when a suffix had to be added
    pub warning: Option<String>,
}

/// Hands out sanitized identifiers that are unique (case-insensitively) and
/// never reserved. Each picked identifier is remembered.
#[derive(Debug, Clone, Default)]
pub struct IdentifierPicker {
    taken: HashSet<String>,
    extra_reserved: HashSet<String>,
    fallback: Option<String>,
}

impl IdentifierPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat these names as reserved in addition to the built-in list
    pub fn with_reserved<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra_reserved
            .extend(words.into_iter().map(|w| w.as_ref().to_uppercase()));
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Sanitize `raw` and make it unique
    pub fn pick(&mut self, raw: &str) -> PickedIdentifier {
        let base = match &self.fallback {
            Some(fallback) => sanitize_identifier_or(raw, fallback),
            None => sanitize_identifier(raw),
        };
        self.claim(base, raw)
    }

    /// Like [`pick`](Self::pick), but for table names
    pub fn pick_table(&mut self, raw: &str) -> PickedIdentifier {
        let base = sanitize_table_name(raw);
        self.claim(base, raw)
    }

    fn claim(&mut self, base: String, raw: &str) -> PickedIdentifier {
        if self.is_free(&base) {
            self.taken.insert(base.to_uppercase());
            return PickedIdentifier {
                identifier: base,
                warning: None,
            };
        }

        let reason = if self.is_reserved_here(&base) {
            format!("'{}' is a reserved name", base)
        } else {
            format!("'{}' is already used", base)
        };

        let stem = if base.ends_with(|c: char| c.is_ascii_digit()) {
            format!("{}_", base)
        } else {
            base.clone()
        };
        let mut suffix = 2u32;
        let identifier = loop {
            let candidate = format!("{}{}", stem, suffix);
            if self.is_free(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        self.taken.insert(identifier.to_uppercase());

        PickedIdentifier {
            warning: Some(format!(
                "{}; '{}' renamed to '{}'",
                reason,
                raw.trim(),
                identifier
            )),
            identifier,
        }
    }

    fn is_reserved_here(&self, ident: &str) -> bool {
        is_reserved(ident) || self.extra_reserved.contains(&ident.to_uppercase())
    }

    fn is_free(&self, ident: &str) -> bool {
        !self.is_reserved_here(ident) && !self.taken.contains(&ident.to_uppercase())
    }
}
