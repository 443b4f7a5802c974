//! Decimal handling shared by account creation and transfers.
//!
//! Amounts travel as strings and are parsed exactly; a value that cannot be
//! represented without rounding is rejected rather than silently truncated.

use rust_decimal::Decimal;
use serde::Serializer;

use crate::error::{LedgerError, Result};

/// Parses a decimal string without rounding.
pub fn parse_decimal(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidParams("amount cannot be empty".into()));
    }
    Decimal::from_str_exact(trimmed)
        .map_err(|e| LedgerError::InvalidParams(format!("invalid amount format: {}", e)))
}

/// Initial balances may be zero but never negative.
pub fn parse_initial_balance(raw: &str) -> Result<Decimal> {
    let balance = parse_decimal(raw)?;
    if balance < Decimal::ZERO {
        return Err(LedgerError::NegativeBalance);
    }
    Ok(balance)
}

/// Transfer amounts must be strictly positive.
pub fn parse_transfer_amount(raw: &str) -> Result<Decimal> {
    let amount = parse_decimal(raw)?;
    ensure_positive(amount)?;
    Ok(amount)
}

pub fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount("amount must be positive".into()));
    }
    Ok(())
}

/// `a + b`, or `None` when the sum overflows or would need rounding.
///
/// Decimal arithmetic rounds once a result needs more than 28 significant
/// digits, so both differences are checked against the operands.
pub fn exact_add(a: Decimal, b: Decimal) -> Option<Decimal> {
    let sum = a.checked_add(b)?;
    (sum.checked_sub(a)? == b && sum.checked_sub(b)? == a).then_some(sum)
}

/// `a - b`, or `None` when the difference overflows or would need rounding.
pub fn exact_sub(a: Decimal, b: Decimal) -> Option<Decimal> {
    let diff = a.checked_sub(b)?;
    (a.checked_sub(diff)? == b && diff.checked_add(b)? == a).then_some(diff)
}

/// Canonical wire form: no trailing fractional zeros, `100.00` becomes `100`.
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn serialize_normalized<S>(value: &Decimal, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_decimal(*value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_keeps_full_precision() {
        assert_eq!(parse_decimal("100.12345678").unwrap(), dec!(100.12345678));
        assert_eq!(parse_decimal(" 0.00000001 ").unwrap(), dec!(0.00000001));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_decimal("abc"),
            Err(LedgerError::InvalidParams(_))
        ));
        assert!(matches!(parse_decimal(""), Err(LedgerError::InvalidParams(_))));
        assert!(matches!(
            parse_decimal("1.2.3"),
            Err(LedgerError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_initial_balance_rules() {
        assert_eq!(parse_initial_balance("0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_initial_balance("-0").unwrap(), Decimal::ZERO);
        assert!(matches!(
            parse_initial_balance("-50.00"),
            Err(LedgerError::NegativeBalance)
        ));
    }

    #[test]
    fn test_transfer_amount_must_be_positive() {
        assert_eq!(parse_transfer_amount("10.5").unwrap(), dec!(10.5));
        assert!(matches!(
            parse_transfer_amount("0"),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_transfer_amount("-1"),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_exact_arithmetic() {
        assert_eq!(exact_add(dec!(500.98765432), dec!(100.12345678)), Some(dec!(601.1111111)));
        assert_eq!(exact_sub(dec!(1000.12345678), dec!(100.12345678)), Some(dec!(900)));
        assert_eq!(exact_sub(dec!(0.00000001), dec!(0.00000001)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_exact_arithmetic_rejects_rounding() {
        let large = dec!(1000000000000000000000000000);
        assert_eq!(exact_sub(large, dec!(0.00000001)), None);
        assert_eq!(exact_add(large, dec!(0.00000001)), None);
        assert_eq!(exact_add(dec!(0.00000001), large), None);
        assert_eq!(exact_add(Decimal::MAX, Decimal::ONE), None);
    }

    #[test]
    fn test_format_strips_trailing_zeros() {
        assert_eq!(format_decimal(dec!(100.00)), "100");
        assert_eq!(format_decimal(dec!(925.43209877)), "925.43209877");
        assert_eq!(format_decimal(dec!(0.50)), "0.5");
    }
}
