//! Pari-mutuel payout math.
//!
//! Winners split the whole pool in proportion to their share of the
//! winning answer's pool. All arithmetic is decimal; rounding to currency
//! precision happens once, on the final amount. Results that would leave
//! the decimal range fail with [`ValidationError::AmountOverflow`].

use rust_decimal::Decimal;

use super::error::ValidationError;
use super::money::{checked_add, checked_mul_div, round_currency, Amount};

/// Potential winnings for `stake` given the pool totals.
///
/// `total_pool` and `winning_answer_pool` must already include `stake`
/// when previewing a bet that has not been placed yet; see
/// [`prospective_winnings`]. When nobody has chosen the answer the
/// bettor simply gets their stake back.
pub fn potential_winnings(
    stake: Amount,
    total_pool: Amount,
    winning_answer_pool: Amount,
) -> Result<Amount, ValidationError> {
    if winning_answer_pool.is_zero() {
        return Ok(stake);
    }
    checked_mul_div(stake, total_pool, winning_answer_pool, "payout").map(round_currency)
}

/// Potential winnings for a bet that is not in the pool yet.
///
/// Both totals are passed explicitly and grown by `stake` here, so the
/// preview reflects the pool after the hypothetical bet.
pub fn prospective_winnings(
    stake: Amount,
    total_pool: Amount,
    answer_pool: Amount,
) -> Result<Amount, ValidationError> {
    potential_winnings(
        stake,
        checked_add(total_pool, stake, "pool total")?,
        checked_add(answer_pool, stake, "answer pool")?,
    )
}

/// Amount returned per unit staked on an answer, if anyone chose it.
pub fn payout_multiplier(
    total_pool: Amount,
    answer_pool: Amount,
) -> Result<Option<Decimal>, ValidationError> {
    if answer_pool.is_zero() {
        return Ok(None);
    }
    total_pool
        .checked_div(answer_pool)
        .map(|m| Some(round_currency(m)))
        .ok_or(ValidationError::AmountOverflow {
            operation: "payout multiplier",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn winner_takes_share_of_whole_pool() {
        assert_eq!(potential_winnings(dec!(25), dec!(70), dec!(55)).unwrap(), dec!(31.82));
        assert_eq!(potential_winnings(dec!(30), dec!(70), dec!(55)).unwrap(), dec!(38.18));
    }

    #[test]
    fn empty_answer_pool_returns_stake() {
        assert_eq!(potential_winnings(dec!(10), dec!(40), dec!(0)).unwrap(), dec!(10));
    }

    #[test]
    fn sole_bettor_gets_stake_back() {
        assert_eq!(potential_winnings(dec!(10), dec!(10), dec!(10)).unwrap(), dec!(10));
    }

    #[test]
    fn no_intermediate_rounding() {
        // 1/3 of the answer pool entitles the bettor to 1/3 of 100.
        assert_eq!(potential_winnings(dec!(1), dec!(100), dec!(3)).unwrap(), dec!(33.33));
        assert_eq!(potential_winnings(dec!(2), dec!(100), dec!(3)).unwrap(), dec!(66.67));
    }

    #[test]
    fn prospective_includes_the_new_stake() {
        // Pool is 40 total, 10 on the answer; adding 10 gives 20 of 50.
        assert_eq!(prospective_winnings(dec!(10), dec!(40), dec!(10)).unwrap(), dec!(25));
        // Nobody on the answer yet: 10 of 50 pays the whole pool.
        assert_eq!(prospective_winnings(dec!(10), dec!(40), dec!(0)).unwrap(), dec!(50));
    }

    #[test]
    fn multiplier_requires_a_stake_on_the_answer() {
        assert_eq!(payout_multiplier(dec!(70), dec!(55)).unwrap(), Some(dec!(1.27)));
        assert_eq!(payout_multiplier(dec!(70), dec!(0)).unwrap(), None);
    }

    #[test]
    fn huge_stakes_overflow_instead_of_panicking() {
        let stake = Decimal::from(1_000_000_000_000_000_i64);
        let total = stake * Decimal::from(2);
        assert_eq!(potential_winnings(stake, total, stake), Ok(total));

        let huge = Decimal::MAX / Decimal::from(2);
        assert_eq!(
            potential_winnings(huge, Decimal::MAX, dec!(3)),
            Err(ValidationError::AmountOverflow { operation: "payout" })
        );
        assert!(prospective_winnings(huge, Decimal::MAX, dec!(1)).is_err());
        assert!(payout_multiplier(Decimal::MAX, dec!(0.01)).is_err());
    }
}
