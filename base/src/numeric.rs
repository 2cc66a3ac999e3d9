//! Scanning of numeric and character literals.
//!
//! Literals follow the conventions of C's `%i` conversion: an
//! optional sign, then a hexadecimal (`0x`), octal (leading `0`) or
//! decimal number.  Scanning stops at the first character which is
//! not a digit in the selected base, and the digits before it are
//! the value.
use super::types::Word;

/// Scan a leading integer from `s`.  Returns `None` if `s` does not
/// start with at least one digit (after an optional sign).
///
/// Arithmetic wraps at the word width, so `-1` scans as
/// `0xFFFF_FFFF`.
#[must_use]
pub fn scan_integer(s: &str) -> Option<Word> {
    let s = s.trim_start();
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits): (u32, &str) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        // "0x" with no hex digit after it is just the number zero
        // followed by junk.
        Some(hex) if hex.starts_with(|ch: char| ch.is_ascii_hexdigit()) => (16, hex),
        _ if unsigned.starts_with('0') => (8, unsigned),
        _ => (10, unsigned),
    };

    let mut value: Word = 0;
    let mut seen_digit = false;
    for digit in digits.chars().map_while(|ch| ch.to_digit(radix)) {
        value = value.wrapping_mul(radix).wrapping_add(digit);
        seen_digit = true;
    }
    if !seen_digit {
        return None;
    }
    Some(if negative { value.wrapping_neg() } else { value })
}

/// Scan a character literal such as `'x'`.  As with the C `'%c'`
/// scan pattern, only the opening quote and the character are
/// required.
#[must_use]
pub fn scan_char_literal(s: &str) -> Option<Word> {
    let mut chars = s.strip_prefix('\'')?.chars();
    chars.next().map(Word::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn test_scan_decimal() {
        assert_eq!(scan_integer("0"), Some(0));
        assert_eq!(scan_integer("42"), Some(42));
        assert_eq!(scan_integer("+7"), Some(7));
        assert_eq!(scan_integer("-1"), Some(0xFFFF_FFFF));
    }

    #[test]
    fn test_scan_alternate_bases() {
        assert_eq!(scan_integer("0x1F"), Some(31));
        assert_eq!(scan_integer("0XfF"), Some(255));
        assert_eq!(scan_integer("017"), Some(15));
        assert_eq!(scan_integer("-0x10"), Some(0u32.wrapping_sub(16)));
    }

    #[test]
    fn test_scan_stops_at_first_non_digit() {
        assert_eq!(scan_integer("12abc"), Some(12));
        assert_eq!(scan_integer("08"), Some(0));
        assert_eq!(scan_integer("0xg"), Some(0));
    }

    #[test]
    fn test_scan_rejects_non_numbers() {
        assert_eq!(scan_integer(""), None);
        assert_eq!(scan_integer("-"), None);
        assert_eq!(scan_integer("loop"), None);
        assert_eq!(scan_integer("$2"), None);
        assert_eq!(scan_integer("-x"), None);
        assert_eq!(scan_integer("'a'"), None);
    }

    #[test]
    fn test_char_literal() {
        assert_eq!(scan_char_literal("'a'"), Some(97));
        assert_eq!(scan_char_literal("'H"), Some(72));
        assert_eq!(scan_char_literal("'"), None);
        assert_eq!(scan_char_literal("a"), None);
    }

    #[proptest]
    fn decimal_rendering_scans_back(n: u32) {
        assert_eq!(scan_integer(&n.to_string()), Some(n));
        assert_eq!(scan_integer(&format!("{n:#x}")), Some(n));
    }
}
