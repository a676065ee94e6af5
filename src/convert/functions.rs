//! Functions known to carry over to the destination formula language.
//!
//! Anything else is passed through with a warning. Lookup and array functions
//! (VLOOKUP, INDEX, MATCH, OFFSET, ...) are deliberately absent: their
//! arguments are cell grids, which have no column-formula equivalent.

/// Prefixes Excel puts in front of newer function names in stored formulas
const FUTURE_FUNCTION_PREFIXES: &[&str] = &["_xlfn._xlws.", "_xlfn.", "_xlws."];

/// Check if a function is supported (don't warn about these!)
pub fn is_supported_function(name: &str) -> bool {
    let upper = name.to_uppercase();
    matches!(
        upper.as_str(),
        // Aggregation functions
        "SUM"
            | "AVERAGE"
            | "AVERAGEA"
            | "MAX"
            | "MAXA"
            | "MIN"
            | "MINA"
            | "COUNT"
            | "COUNTA"
            | "PRODUCT"
            | "MEDIAN"
            | "STDEV"
            | "STDEVA"
            | "STDEVP"
            | "STDEVPA"
            | "VAR"
            | "VARA"
            | "VARP"
            | "VARPA"
            // Conditional aggregations
            | "SUMIF"
            | "SUMIFS"
            | "COUNTIF"
            | "COUNTIFS"
            | "AVERAGEIF"
            | "AVERAGEIFS"
            // Logical functions
            | "IF"
            | "IFS"
            | "AND"
            | "OR"
            | "NOT"
            | "XOR"
            | "TRUE"
            | "FALSE"
            | "IFERROR"
            | "IFNA"
            | "ISBLANK"
            | "ISERROR"
            | "ISNUMBER"
            | "ISTEXT"
            // Math functions
            | "ABS"
            | "ROUND"
            | "ROUNDUP"
            | "ROUNDDOWN"
            | "INT"
            | "TRUNC"
            | "SQRT"
            | "POWER"
            | "EXP"
            | "LN"
            | "LOG"
            | "LOG10"
            | "PI"
            | "MOD"
            | "CEILING"
            | "FLOOR"
            | "SIGN"
            | "EVEN"
            | "ODD"
            // Text functions
            | "CONCAT"
            | "CONCATENATE"
            | "LEFT"
            | "RIGHT"
            | "MID"
            | "LEN"
            | "UPPER"
            | "LOWER"
            | "PROPER"
            | "TRIM"
            | "SUBSTITUTE"
            | "REPLACE"
            | "REPT"
            | "FIND"
            | "SEARCH"
            | "TEXT"
            | "VALUE"
            | "EXACT"
            // Date functions
            | "TODAY"
            | "NOW"
            | "DATE"
            | "DATEVALUE"
            | "YEAR"
            | "MONTH"
            | "DAY"
            | "HOUR"
            | "MINUTE"
            | "SECOND"
            | "WEEKDAY"
            | "EDATE"
            | "EOMONTH"
    )
}

/// `_xlfn.CONCAT` → `CONCAT`; other names unchanged
pub fn strip_future_prefix(name: &str) -> &str {
    FUTURE_FUNCTION_PREFIXES
        .iter()
        .find_map(|prefix| {
            name.get(..prefix.len())
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .map(|_| &name[prefix.len()..])
        })
        .unwrap_or(name)
}
