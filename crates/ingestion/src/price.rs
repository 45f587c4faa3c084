//! Price normalization into the reference currency (US dollars).
//!
//! Marketplace exports mix plain USD amounts, yen amounts carrying the `円`
//! marker and thousands separators. Everything is reduced to a single `f64`
//! in USD using a fixed conversion rate.

use sales_core::{FieldValue, YEN_MARKER};

/// Yen per US dollar. A fixed simplification, not a live exchange rate.
pub const YEN_PER_USD: f64 = 150.0;

/// Convert a parsed cell into the reference currency.
///
/// Numbers pass through unchanged; text goes through
/// [`text_to_reference_currency`]. Never fails.
pub fn to_reference_currency(raw: &FieldValue) -> f64 {
    match raw {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => text_to_reference_currency(s),
    }
}

/// Convert a price string into the reference currency.
///
/// Yen-marked strings are divided by [`YEN_PER_USD`]; anything else is read
/// as USD. Unparseable input yields 0.
pub fn text_to_reference_currency(raw: &str) -> f64 {
    let amount = parse_price_number(raw);
    if raw.contains(YEN_MARKER) {
        amount / YEN_PER_USD
    } else {
        amount
    }
}

/// Strip everything but ASCII digits, `.` and `-`, then read the longest
/// leading decimal number. Returns 0 when no number is found.
pub fn parse_price_number(raw: &str) -> f64 {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    parse_leading_float(&stripped)
}

/// Read the longest prefix of `s` shaped like `-?digits[.digits]`.
fn parse_leading_float(s: &str) -> f64 {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let mut digits = 0;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if digits == 0 {
        return 0.0;
    }

    match s[..end].parse::<f64>() {
        // -0 collapses to 0 like any other falsy result.
        Ok(v) if v != 0.0 && !v.is_nan() => v,
        _ => 0.0,
    }
}

/// Format an amount with en-US thousands grouping and at most three
/// fraction digits, e.g. `15000.0` -> `15,000`, `1234.5` -> `1,234.5`.
pub fn format_grouped(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return (if value > 0.0 { "∞" } else { "-∞" }).to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Display form of a yen amount: grouped number, a space, then the marker.
pub fn format_yen_display(amount: f64) -> String {
    format!("{} {}", format_grouped(amount), YEN_MARKER)
}
