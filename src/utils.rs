//! Small helpers.

use regex::Regex;
use std::sync::LazyLock;

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("number pattern compiles")
});

/// Lenient float coercion for numeric text fields.
///
/// Reads the longest numeric prefix ("12.5 USD" -> 12.5); blank or
/// non-numeric text yields 0.
pub fn parse_amount(s: &str) -> f64 {
    LEADING_NUMBER
        .find(s.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Header text reduced to lowercase ASCII letters and digits ("News Event" -> "newsevent").
pub fn alnum_key(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// First non-empty value, mirroring `a || b` on text fields.
pub fn first_non_empty(values: &[Option<&str>]) -> String {
    values
        .iter()
        .flatten()
        .find(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_parse_with_defaults() {
        assert_eq!(parse_amount("100"), 100.0);
        assert_eq!(parse_amount("-50.25"), -50.25);
        assert_eq!(parse_amount("  12.5 USD"), 12.5);
        assert_eq!(parse_amount(".5"), 0.5);
        assert_eq!(parse_amount("1e3"), 1000.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("$100"), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
    }

    #[test]
    fn header_keys_are_alphanumeric() {
        assert_eq!(alnum_key("News Event"), "newsevent");
        assert_eq!(alnum_key("Cycle-Timeframe"), "cycletimeframe");
    }

    #[test]
    fn first_non_empty_skips_blanks() {
        assert_eq!(first_non_empty(&[Some(""), None, Some("EURUSD")]), "EURUSD");
        assert_eq!(first_non_empty(&[None, Some("")]), "");
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(33.333_333, 1), 33.3);
        assert_eq!(round_to(2.0, 2), 2.0);
        assert_eq!(round_to(1.666, 2), 1.67);
    }
}
