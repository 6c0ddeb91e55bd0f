//! Plain-decimal text parsing for field values and step/min/max attributes.
//!
//! The accepted grammar is an optional leading minus, an optional integer
//! part, an optional fractional part, with at least one digit somewhere and
//! only surrounding whitespace tolerated. No exponent notation, no grouping
//! separators, no localized decimal marks. Anything else degrades to the
//! caller-supplied default instead of failing.

use std::sync::LazyLock;

use fancy_regex::Regex;

static NUMBER_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?(?:\d+)?\.?\d+)\s*$").expect("number pattern is valid")
});

static PRECISION_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-?(?:\d+)?\.(\d+)\s*$").expect("precision pattern is valid")
});

static INTEGER_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-?\d+\s*$").expect("integer pattern is valid"));

/// Parses `text` as a plain decimal number, or returns `None` when the text
/// does not wholly match the grammar.
pub fn parse_number_opt(text: &str) -> Option<f64> {
    let captures = NUMBER_EXPR.captures(text).ok().flatten()?;
    let matched = captures.get(1)?;
    matched.as_str().parse::<f64>().ok()
}

/// Parses `text` as a plain decimal number, substituting `default_value` for
/// empty, whitespace-only, or malformed input.
pub fn parse_number(text: &str, default_value: f64) -> f64 {
    parse_number_opt(text).unwrap_or(default_value)
}

/// Counts the fractional digits of a decimal text. Returns `default_value`
/// when the text has no fractional part or does not match the grammar, so
/// `parse_precision("5", 0) == 0` and `parse_precision("", 3) == 3`.
pub fn parse_precision(text: &str, default_value: usize) -> usize {
    let Ok(Some(captures)) = PRECISION_EXPR.captures(text) else {
        return default_value;
    };
    captures
        .get(1)
        .map(|m| m.as_str().len())
        .unwrap_or(default_value)
}

/// True iff the trimmed text is an optional minus followed by digits only.
pub fn is_integer_text(text: &str) -> bool {
    INTEGER_EXPR.is_match(text).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_accepts_plain_decimals() {
        assert_eq!(parse_number("3.14", 0.0), 3.14);
        assert_eq!(parse_number("-5", 0.0), -5.0);
        assert_eq!(parse_number(".5", 0.0), 0.5);
        assert_eq!(parse_number("-.5", 0.0), -0.5);
        assert_eq!(parse_number("  42  ", 0.0), 42.0);
    }

    #[test]
    fn parse_number_degrades_to_default() {
        assert_eq!(parse_number("", 99.0), 99.0);
        assert_eq!(parse_number("   ", 99.0), 99.0);
        assert_eq!(parse_number("abc", 99.0), 99.0);
        assert_eq!(parse_number("1e3", 99.0), 99.0);
        assert_eq!(parse_number("1.2.3", 99.0), 99.0);
        assert_eq!(parse_number("5.", 99.0), 99.0);
        assert_eq!(parse_number("--5", 99.0), 99.0);
        assert_eq!(parse_number("5 5", 99.0), 99.0);
    }

    #[test]
    fn parse_number_opt_distinguishes_failure_from_zero() {
        assert_eq!(parse_number_opt("0"), Some(0.0));
        assert_eq!(parse_number_opt("x"), None);
        assert_eq!(parse_number_opt(""), None);
    }

    #[test]
    fn parse_precision_counts_fractional_digits() {
        assert_eq!(parse_precision("0.25", 0), 2);
        assert_eq!(parse_precision("-1.5", 0), 1);
        assert_eq!(parse_precision(".125", 0), 3);
    }

    #[test]
    fn parse_precision_requires_a_fractional_part() {
        assert_eq!(parse_precision("5", 0), 0);
        assert_eq!(parse_precision("-17", 4), 4);
        assert_eq!(parse_precision("", 3), 3);
        assert_eq!(parse_precision("5.", 2), 2);
        assert_eq!(parse_precision("abc", 1), 1);
    }

    #[test]
    fn is_integer_text_rejects_fractions_and_garbage() {
        assert!(is_integer_text("10"));
        assert!(is_integer_text("-3"));
        assert!(is_integer_text(" 7 "));
        assert!(!is_integer_text("1.5"));
        assert!(!is_integer_text("1."));
        assert!(!is_integer_text(""));
        assert!(!is_integer_text("- 3"));
        assert!(!is_integer_text("x"));
    }
}
