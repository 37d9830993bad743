//! Parsing and display of money amounts in minor units.
//!
//! Amounts carry no fractional subunits: every non-digit character in user input is
//! treated as decoration or a grouping separator, so `"$200.000"`, `"200,000"` and
//! `"200000"` all mean `200000`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("amount cannot be negative: `{0}`")]
    Negative(String),
    #[error("`{0}` is not a valid amount")]
    NotANumber(String),
    #[error("amount `{0}` is too large")]
    Overflow(String),
}

/// Parses a display string into an amount. Blank input is zero.
pub fn parse_money(input: &str) -> Result<u64, MoneyError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let unsigned = trimmed.trim_start_matches(|c: char| c == '$' || c.is_whitespace());
    if trimmed.starts_with('-') || unsigned.starts_with('-') {
        return Err(MoneyError::Negative(trimmed.to_string()));
    }

    let mut value: u64 = 0;
    let mut seen_digit = false;
    for ch in trimmed.chars() {
        if ch.is_ascii_digit() {
            let digit = u64::from(ch as u8 - b'0');
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| MoneyError::Overflow(trimmed.to_string()))?;
            seen_digit = true;
        }
    }
    if !seen_digit {
        return Err(MoneyError::NotANumber(trimmed.to_string()));
    }
    Ok(value)
}

/// Display preferences for amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyFormat {
    pub symbol: String,
    pub grouping_separator: char,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".into(),
            grouping_separator: '.',
        }
    }
}

/// Formats `amount` with the symbol and thousands grouping, e.g. `$200.000`.
pub fn format_money(amount: u64, format: &MoneyFormat) -> String {
    format!(
        "{}{}",
        format.symbol,
        group_digits(&amount.to_string(), format.grouping_separator)
    )
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (idx, ch) in digits.chars().enumerate() {
        if idx != 0 && (len - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decorated_amounts() {
        assert_eq!(parse_money("$200.000"), Ok(200_000));
        assert_eq!(parse_money("200,000"), Ok(200_000));
        assert_eq!(parse_money(" 200000 "), Ok(200_000));
        assert_eq!(parse_money(""), Ok(0));
        assert_eq!(parse_money("   "), Ok(0));
    }

    #[test]
    fn rejects_negative_and_non_numeric_input() {
        assert!(matches!(parse_money("-500"), Err(MoneyError::Negative(_))));
        assert!(matches!(parse_money("$-500"), Err(MoneyError::Negative(_))));
        assert!(matches!(parse_money("abc"), Err(MoneyError::NotANumber(_))));
        assert!(matches!(
            parse_money("99999999999999999999999"),
            Err(MoneyError::Overflow(_))
        ));
    }

    #[test]
    fn formats_with_grouping() {
        let format = MoneyFormat::default();
        assert_eq!(format_money(0, &format), "$0");
        assert_eq!(format_money(999, &format), "$999");
        assert_eq!(format_money(1_000, &format), "$1.000");
        assert_eq!(format_money(200_000, &format), "$200.000");
        assert_eq!(format_money(1_234_567, &format), "$1.234.567");

        let comma = MoneyFormat {
            symbol: "CLP ".into(),
            grouping_separator: ',',
        };
        assert_eq!(format_money(1_234_567, &comma), "CLP 1,234,567");
    }
}
