//! Text formatting for document custom fields.

use rust_decimal::{Decimal, RoundingStrategy};

/// `1` -> `1st`, `12` -> `12th`, `23` -> `23rd`.
pub fn format_ordinal(n: i64) -> String {
    let suffix = match (n.rem_euclid(100), n.rem_euclid(10)) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Two decimal places followed by `%`.
pub fn format_percentage(value: Decimal) -> String {
    format!("{:.2}%", round_cents(value))
}

/// US dollars with thousands separators; empty for a missing amount.
pub fn format_money(amount: Option<Decimal>) -> String {
    let Some(amount) = amount else {
        return String::new();
    };

    let rounded = round_cents(amount);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// Integer part only, truncated toward zero.
pub fn format_integer(value: Decimal) -> String {
    value.trunc().normalize().to_string()
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
