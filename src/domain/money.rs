//! Monetary types and currency rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::ValidationError;

/// Currency amount represented as a Decimal for precision.
pub type Amount = Decimal;

/// Number of decimal places kept for settled amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// Smallest representable currency unit ($0.01).
pub const MIN_UNIT: Amount = dec!(0.01);

/// Round an amount to currency precision, half away from zero.
///
/// Only final results go through here; intermediate ratios stay exact.
#[must_use]
pub fn round_currency(amount: Amount) -> Amount {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Add two amounts, failing instead of leaving the decimal range.
pub fn checked_add(
    a: Amount,
    b: Amount,
    operation: &'static str,
) -> Result<Amount, ValidationError> {
    a.checked_add(b)
        .ok_or(ValidationError::AmountOverflow { operation })
}

/// Sum amounts, failing instead of leaving the decimal range.
pub fn checked_sum(
    amounts: impl IntoIterator<Item = Amount>,
    operation: &'static str,
) -> Result<Amount, ValidationError> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| checked_add(acc, amount, operation))
}

/// Compute `a * b / c`, failing instead of leaving the decimal range.
///
/// The product is formed first so no ratio is rounded; only when the
/// product alone would overflow is `a / c` taken first. `c` must be
/// non-zero.
pub fn checked_mul_div(
    a: Decimal,
    b: Decimal,
    c: Decimal,
    operation: &'static str,
) -> Result<Decimal, ValidationError> {
    let result = match a.checked_mul(b) {
        Some(product) => product.checked_div(c),
        None => a.checked_div(c).and_then(|ratio| ratio.checked_mul(b)),
    };
    result.ok_or(ValidationError::AmountOverflow { operation })
}

/// Express `part / whole` as a percentage with currency precision.
///
/// Returns zero for an empty whole. `part` is expected to be no larger
/// than `whole`, which keeps the result within 0..=100.
#[must_use]
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_currency(part / whole * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_unit_is_one_cent() {
        assert_eq!(MIN_UNIT, dec!(0.01));
    }

    #[test]
    fn round_currency_rounds_half_up() {
        assert_eq!(round_currency(dec!(1.005)), dec!(1.01));
        assert_eq!(round_currency(dec!(1.0049)), dec!(1.00));
        assert_eq!(round_currency(dec!(31.818181)), dec!(31.82));
    }

    #[test]
    fn checked_sum_adds_exactly() {
        let sum = checked_sum([dec!(0.1), dec!(0.2), dec!(0.3)], "test").unwrap();
        assert_eq!(sum, dec!(0.6));
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        assert_eq!(
            checked_add(Decimal::MAX, dec!(1), "pool total"),
            Err(ValidationError::AmountOverflow {
                operation: "pool total"
            })
        );
        assert!(checked_mul_div(Decimal::MAX, dec!(2), dec!(1), "payout").is_err());
        let big = Decimal::from(1_000_000_000_000_000_i64);
        assert_eq!(checked_mul_div(big, big * dec!(2), big, "payout"), Ok(big * dec!(2)));
        assert_eq!(
            checked_mul_div(dec!(25), dec!(70), dec!(55), "payout")
                .map(round_currency)
                .unwrap(),
            dec!(31.82)
        );
    }

    #[test]
    fn percentage_of_huge_amounts_stays_in_range() {
        assert_eq!(percentage(Decimal::MAX, Decimal::MAX), dec!(100));
    }

    #[test]
    fn percentage_of_zero_whole_is_zero() {
        assert_eq!(percentage(dec!(5), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn percentage_rounds_to_two_places() {
        assert_eq!(percentage(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(percentage(dec!(2), dec!(3)), dec!(66.67));
    }
}
