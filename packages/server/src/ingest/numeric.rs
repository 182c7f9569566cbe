//! Parsing of price, rating and count fields.

use crate::config::NumericPolicy;
use crate::error::CatalogError;

/// Parse a decimal field according to `policy`.
///
/// Lenient parsing drops every character other than digits, `.` and `-`
/// first, so `"$24,500"` becomes `24500`. What remains must still be a single
/// well-formed number: `"1.2.3"` or `"--5"` are rejected under both policies.
pub fn parse_decimal(field: &str, raw: &str, policy: NumericPolicy) -> Result<f64, CatalogError> {
    let candidate: String = match policy {
        NumericPolicy::Lenient => raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect(),
        NumericPolicy::Strict => raw.trim().to_string(),
    };

    if !is_plain_decimal(&candidate) {
        return Err(CatalogError::validation(format!(
            "{field} must be a number, got '{}'",
            raw.trim()
        )));
    }

    candidate
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CatalogError::validation(format!("{field} is out of range")))
}

/// Parse a decimal field that must not be negative.
pub fn parse_amount(field: &str, raw: &str, policy: NumericPolicy) -> Result<f64, CatalogError> {
    let value = parse_decimal(field, raw, policy)?;
    if value < 0.0 {
        return Err(CatalogError::validation(format!(
            "{field} cannot be negative"
        )));
    }
    Ok(value)
}

/// Parse a whole-number field such as a year or a seat count.
pub fn parse_integer(field: &str, raw: &str) -> Result<i32, CatalogError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| CatalogError::validation(format!("{field} must be a whole number")))
}

/// Optional sign, digits, optional single fractional part.
fn is_plain_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());

    match frac {
        None => !int.is_empty() && digits(int),
        Some(f) => (!int.is_empty() || !f.is_empty()) && digits(int) && digits(f),
    }
}
