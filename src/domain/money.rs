use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Money is stored as integer cents of the base currency.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

const CENTS_PER_UNIT: i64 = 100;

/// Format cents as a plain decimal string with two fraction digits.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Parse a user supplied amount into cents.
///
/// Accepts `.` or `,` as decimal separator and at most two fraction digits:
/// "50" -> 5000, "12.5" -> 1250, "0,01" -> 1. Anything finer than a cent is
/// rejected instead of being silently truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let normalized = digits.replace(',', ".");
    let (units_str, fraction_str) = match normalized.split_once('.') {
        Some((units, fraction)) => (units, fraction),
        None => (normalized.as_str(), ""),
    };

    if units_str.is_empty() && fraction_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !fraction_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }
    if fraction_str.len() > 2 {
        return Err(ParseCentsError::TooManyDecimals);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseCentsError::Overflow)?
    };
    let fraction: i64 = match fraction_str.len() {
        0 => 0,
        1 => fraction_str.parse::<i64>().map_err(|_| ParseCentsError::InvalidFormat)? * 10,
        _ => fraction_str.parse().map_err(|_| ParseCentsError::InvalidFormat)?,
    };

    let cents = units
        .checked_mul(CENTS_PER_UNIT)
        .and_then(|c| c.checked_add(fraction))
        .ok_or(ParseCentsError::Overflow)?;

    Ok(if negative { -cents } else { cents })
}

/// Convert cents to a decimal amount in base units (scale 2).
pub fn cents_to_decimal(cents: Cents) -> Decimal {
    Decimal::new(cents, 2)
}

/// Convert a decimal amount in base units to cents.
/// Fails if the amount has sub-cent precision or does not fit in `Cents`.
pub fn decimal_to_cents(amount: Decimal) -> Result<Cents, ParseCentsError> {
    let normalized = amount.normalize();
    if normalized.scale() > 2 {
        return Err(ParseCentsError::TooManyDecimals);
    }
    normalized
        .checked_mul(Decimal::from(CENTS_PER_UNIT))
        .and_then(|d| d.to_i64())
        .ok_or(ParseCentsError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid money format")]
    InvalidFormat,
    #[error("amounts support at most two decimal places")]
    TooManyDecimals,
    #[error("amount is too large")]
    Overflow,
}
