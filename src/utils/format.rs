//! Display helpers for money, percentages and dates

use chrono::DateTime;

/// Format `amount` with two decimals and the currency's grouping convention.
///
/// `INR` uses the Indian system (last three digits, then pairs):
/// `1234567.891` becomes `₹12,34,567.89`.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    let code = currency.to_uppercase();
    let grouped = if code == "INR" {
        group_indian(&whole)
    } else {
        group_thousands(&whole)
    };

    let symbol = match code.as_str() {
        "INR" => "₹".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        other => format!("{} ", other),
    };

    format!("{}{}{}.{:02}", sign, symbol, grouped, fraction)
}

fn group_thousands(digits: &str) -> String {
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let bytes = head.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out.push(',');
    out.push_str(tail);
    out
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

/// Relative change from `old` to `new` in percent. `None` when `old` is zero.
pub fn percentage_change(old: f64, new: f64) -> Option<f64> {
    if old == 0.0 {
        return None;
    }
    Some((new - old) / old.abs() * 100.0)
}

/// `2026-10-19T08:30:00+00:00` -> `19 Oct 2026`. Unparseable input is returned as is.
pub fn format_date(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.format("%d %b %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Round to two decimals for money values in API responses
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
