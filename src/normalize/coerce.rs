//! Total field coercions: every function returns a value for any JSON input.

use serde_json::Value;

/// Non-blank string (trimmed) or number rendered as text; anything else is `default`.
pub fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

/// Non-blank string entries of an array. Non-arrays, and arrays with no usable
/// entry, become `[default]`.
pub fn names_or(value: Option<&Value>, default: &str) -> Vec<String> {
    let names: Vec<String> = value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        vec![default.to_string()]
    } else {
        names
    }
}

/// Numeric year, kept unrounded so the range check sees the value as given.
///
/// Strings use their leading integer (`"2021a"` is 2021). A missing or
/// non-numeric value, or a string whose leading integer is zero, becomes
/// `fallback`. Numbers too large for any calendar are kept as-is; the range
/// filter is what rejects them.
pub fn year_or(value: Option<&Value>, fallback: i32) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => leading_int(s).filter(|&y| y != 0.0),
        _ => None,
    };
    parsed.unwrap_or(f64::from(fallback))
}

/// Non-negative numbers truncated to an integer; everything else is 0.
pub fn count_or_zero(value: Option<&Value>) -> u64 {
    let Some(Value::Number(n)) = value else {
        return 0;
    };
    if let Some(count) = n.as_u64() {
        return count;
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
        _ => 0,
    }
}

/// Optional sign followed by decimal digits, after leading whitespace.
/// Trailing characters are ignored. Digit runs longer than an `i64` still parse.
fn leading_int(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: f64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
