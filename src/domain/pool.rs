//! Per-answer stake pools derived from a question's bets.
//!
//! A [`Pool`] is recomputed on demand from the bets it is given and is
//! never persisted. Sums are exact decimal additions.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::bet::Bet;
use super::error::ValidationError;
use super::money::{checked_add, percentage, Amount};

/// Summed stakes per answer plus the grand total for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pool {
    by_answer: BTreeMap<String, Amount>,
    total: Amount,
}

impl Pool {
    /// Aggregate the stakes of `bets`. An empty input yields an empty pool.
    ///
    /// Fails with [`ValidationError::AmountOverflow`] if a sum leaves the
    /// decimal range.
    pub fn from_bets<'a>(
        bets: impl IntoIterator<Item = &'a Bet>,
    ) -> Result<Self, ValidationError> {
        let mut pool = Self::default();
        for bet in bets {
            let answer = pool
                .by_answer
                .entry(bet.chosen_answer().to_string())
                .or_insert(Decimal::ZERO);
            *answer = checked_add(*answer, bet.stake(), "answer pool")?;
            pool.total = checked_add(pool.total, bet.stake(), "pool total")?;
        }
        Ok(pool)
    }

    /// Summed stake on `answer`, zero when nobody chose it.
    #[must_use]
    pub fn answer_total(&self, answer: &str) -> Amount {
        self.by_answer.get(answer).copied().unwrap_or(Decimal::ZERO)
    }

    /// Grand total across all answers.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.total
    }

    /// Iterate answers with at least one stake, in label order.
    pub fn answers(&self) -> impl Iterator<Item = (&str, Amount)> {
        self.by_answer.iter().map(|(a, v)| (a.as_str(), *v))
    }

    /// Share of the grand total staked on `answer`, as a percentage.
    #[must_use]
    pub fn share(&self, answer: &str) -> Decimal {
        percentage(self.answer_total(answer), self.total)
    }

    /// Returns true if no stakes have been aggregated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_answer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BetId, EventId, ParticipantId, QuestionId};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn bet(who: &str, answer: &str, stake: Decimal) -> Bet {
        Bet::try_new(
            BetId::new(format!("b-{who}")),
            ParticipantId::new(who),
            QuestionId::new("q-1"),
            EventId::new("e-1"),
            answer,
            stake,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_bets_give_empty_pool() {
        let pool = Pool::from_bets(&[]).unwrap();
        assert!(pool.is_empty());
        assert_eq!(pool.total(), Decimal::ZERO);
        assert_eq!(pool.answer_total("Yes"), Decimal::ZERO);
    }

    #[test]
    fn stakes_sum_per_answer_and_overall() {
        let bets = vec![
            bet("a", "Yes", dec!(25)),
            bet("b", "No", dec!(15)),
            bet("c", "Yes", dec!(30)),
        ];
        let pool = Pool::from_bets(&bets).unwrap();

        assert_eq!(pool.answer_total("Yes"), dec!(55));
        assert_eq!(pool.answer_total("No"), dec!(15));
        assert_eq!(pool.total(), dec!(70));
    }

    #[test]
    fn cent_amounts_do_not_drift() {
        let bets: Vec<Bet> = (0..10)
            .map(|i| bet(&format!("p{i}"), "Yes", dec!(0.10)))
            .collect();
        let pool = Pool::from_bets(&bets).unwrap();
        assert_eq!(pool.total(), dec!(1.00));
    }

    #[test]
    fn share_is_percentage_of_total() {
        let bets = vec![bet("a", "Yes", dec!(30)), bet("b", "No", dec!(10))];
        let pool = Pool::from_bets(&bets).unwrap();
        assert_eq!(pool.share("Yes"), dec!(75));
        assert_eq!(pool.share("Maybe"), Decimal::ZERO);
    }

    #[test]
    fn totals_beyond_decimal_range_are_rejected() {
        let bets = vec![bet("a", "Yes", Decimal::MAX), bet("b", "No", dec!(1))];
        assert_eq!(
            Pool::from_bets(&bets),
            Err(ValidationError::AmountOverflow {
                operation: "pool total"
            })
        );
    }
}
