//! Spreadsheet column letters ↔ 0-based indices (A=0, Z=25, AA=26, ...)
//!
//! Bijective base-26: there is no zero digit, so Z is followed by AA, not Z0.

/// Convert column index to Excel column letter (0→A, 1→B, 25→Z, 26→AA, etc.)
pub fn column_letter(index: usize) -> String {
    let mut result = String::new();
    let mut num = index;

    loop {
        let remainder = (num % 26) as u8;
        result.insert(0, (b'A' + remainder) as char);
        if num < 26 {
            break;
        }
        num = num / 26 - 1;
    }

    result
}

/// Convert Excel column letters to a 0-based index (A→0, AA→26).
///
/// Returns `None` for empty input, anything other than `A`-`Z`, or letters
/// too long to fit in a `usize`.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    let mut value: usize = 0;
    for b in letters.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        let digit = (b - b'A') as usize + 1;
        value = value.checked_mul(26)?.checked_add(digit)?;
    }

    Some(value - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        // Single letters
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");

        // Double letters
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
        assert_eq!(column_letter(701), "ZZ");

        // Triple letters
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("Z"), Some(25));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index("AZ"), Some(51));
        assert_eq!(column_index("BA"), Some(52));
        assert_eq!(column_index("ZZ"), Some(701));
        assert_eq!(column_index("AAA"), Some(702));
        assert_eq!(column_index("XFD"), Some(16383));
    }

    #[test]
    fn test_column_index_rejects_garbage() {
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("a"), None);
        assert_eq!(column_index("A1"), None);
        assert_eq!(column_index("$A"), None);
        assert_eq!(column_index(&"Z".repeat(40)), None);
    }

    #[test]
    fn test_round_trip_first_block() {
        for n in 0..2000 {
            assert_eq!(column_index(&column_letter(n)), Some(n), "index {}", n);
        }
    }
}
