//! Settlement netting.
//!
//! Turns a resolved question's bets into payer -> payee obligations.
//! Each loser's stake is split across winners in proportion to each
//! winner's net gain (winnings minus own stake). Allocations are rounded
//! to the cent; anything below one cent is dropped and not redistributed.
//! Allocations between the same ordered pair on the same question are
//! merged, so at most one obligation exists per pair per question.
//!
//! The output is a pure function of the input bets and is sorted by
//! obligation key, so re-running it yields identical obligations that
//! storage can upsert.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::application::odds::ensure_bets_belong;
use crate::domain::money::{checked_add, checked_mul_div, checked_sum};
use crate::domain::{
    round_currency, Amount, Bet, BetId, BetStatus, ObligationStatus, Outcome, ParticipantId,
    Question, QuestionId, QuestionStatus, SettlementObligation, MIN_UNIT,
};
use crate::error::EngineError;

/// Obligations generated for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementPlan {
    pub question_id: QuestionId,
    /// Obligations ordered by (payer, payee).
    pub obligations: Vec<SettlementObligation>,
    /// Sum of all obligation amounts.
    pub total: Amount,
    /// Losers' stakes minus everything allocated. Non-zero only through
    /// cent rounding or dropped sub-cent allocations.
    pub rounding_slack: Amount,
}

impl SettlementPlan {
    fn empty(question_id: QuestionId) -> Self {
        Self {
            question_id,
            obligations: Vec::new(),
            total: Decimal::ZERO,
            rounding_slack: Decimal::ZERO,
        }
    }
}

/// Generate settlement obligations for a resolved question.
///
/// Fails with `InsufficientPoolData` if the question or any of its bets
/// has not been resolved yet.
pub fn generate_settlements(
    question: &Question,
    bets: &[Bet],
) -> Result<SettlementPlan, EngineError> {
    if question.status() != QuestionStatus::Resolved {
        return Err(EngineError::InsufficientPoolData {
            question_id: question.id().clone(),
            reason: format!("question is {}", question.status()),
        });
    }
    ensure_bets_belong(question, bets)?;

    let mut payables: BTreeMap<ParticipantId, Amount> = BTreeMap::new();
    let mut receivables: BTreeMap<ParticipantId, Amount> = BTreeMap::new();

    for bet in bets {
        match bet.outcome() {
            None => {
                return Err(EngineError::InsufficientPoolData {
                    question_id: question.id().clone(),
                    reason: format!("bet {} is not resolved", bet.id()),
                });
            }
            Some(Outcome::Lost) => {
                let owed = payables
                    .entry(bet.participant_id().clone())
                    .or_insert(Decimal::ZERO);
                *owed = checked_add(*owed, bet.stake(), "loser stakes")?;
            }
            Some(Outcome::Won) => {
                let gain = bet.net_gain().ok_or_else(|| EngineError::InsufficientPoolData {
                    question_id: question.id().clone(),
                    reason: format!("won bet {} has no winnings", bet.id()),
                })?;
                if gain > Decimal::ZERO {
                    let gained = receivables
                        .entry(bet.participant_id().clone())
                        .or_insert(Decimal::ZERO);
                    *gained = checked_add(*gained, gain, "winner gains")?;
                }
            }
        }
    }

    let total_gain = checked_sum(receivables.values().copied(), "winner gains")?;
    let total_owed = checked_sum(payables.values().copied(), "loser stakes")?;

    if total_gain.is_zero() {
        if !total_owed.is_zero() {
            warn!(
                question_id = %question.id(),
                owed = %total_owed,
                "Losers remain but no winner has a net gain; no obligations created"
            );
        }
        return Ok(SettlementPlan::empty(question.id().clone()));
    }

    let mut merged: BTreeMap<(ParticipantId, ParticipantId), Amount> = BTreeMap::new();
    let mut slack = Decimal::ZERO;

    for (payer, stake) in &payables {
        let mut allocated = Decimal::ZERO;
        for (payee, gain) in &receivables {
            let share = checked_mul_div(*stake, *gain, total_gain, "allocation")?;
            let owed = round_currency(share);
            if owed < MIN_UNIT {
                continue;
            }
            allocated = checked_add(allocated, owed, "allocation")?;
            let pair = merged
                .entry((payer.clone(), payee.clone()))
                .or_insert(Decimal::ZERO);
            *pair = checked_add(*pair, owed, "allocation")?;
        }

        if allocated != *stake {
            warn!(
                question_id = %question.id(),
                payer = %payer,
                stake = %stake,
                allocated = %allocated,
                slack = %(*stake - allocated),
                "Settlement rounding slack"
            );
            slack = checked_add(slack, *stake - allocated, "rounding slack")?;
        }
    }

    let obligations = merged
        .into_iter()
        .map(|((payer, payee), amount)| {
            SettlementObligation::try_new(payer, payee, amount, question.id().clone())
        })
        .collect::<Result<Vec<_>, _>>()?;
    let total = checked_sum(
        obligations.iter().map(SettlementObligation::amount),
        "settlement total",
    )?;

    debug!(
        question_id = %question.id(),
        obligations = obligations.len(),
        owed = %total_owed,
        gain = %total_gain,
        "Settlements generated"
    );

    Ok(SettlementPlan {
        question_id: question.id().clone(),
        obligations,
        total,
        rounding_slack: slack,
    })
}

/// Generate settlements for every resolved question of an event.
///
/// Questions that are not resolved yet are skipped. Bets are matched to
/// questions by question ID; bets of questions not listed are ignored.
pub fn generate_event_settlements(
    questions: &[Question],
    bets: &[Bet],
) -> Result<Vec<SettlementPlan>, EngineError> {
    let mut by_question: HashMap<&QuestionId, Vec<Bet>> = HashMap::new();
    for bet in bets {
        by_question
            .entry(bet.question_id())
            .or_default()
            .push(bet.clone());
    }

    let mut plans = Vec::new();
    for question in questions {
        if question.status() != QuestionStatus::Resolved {
            debug!(
                question_id = %question.id(),
                status = %question.status(),
                "Skipping unresolved question"
            );
            continue;
        }
        let question_bets = by_question.remove(question.id()).unwrap_or_default();
        plans.push(generate_settlements(question, &question_bets)?);
    }
    Ok(plans)
}

/// Bets whose obligations on their question are all completed.
///
/// A bet with no obligations at all is left alone: nothing was owed on
/// it, so there is nothing to settle.
#[must_use]
pub fn bets_to_settle(bets: &[Bet], obligations: &[SettlementObligation]) -> Vec<BetId> {
    bets.iter()
        .filter(|bet| matches!(bet.status(), BetStatus::Won | BetStatus::Lost))
        .filter(|bet| {
            let mut related = obligations
                .iter()
                .filter(|o| {
                    o.question_id() == bet.question_id() && o.involves(bet.participant_id())
                })
                .peekable();
            related.peek().is_some() && related.all(|o| o.status() == ObligationStatus::Completed)
        })
        .map(|bet| bet.id().clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::resolver::resolve_question;
    use crate::domain::error::ValidationError;
    use crate::testkit::domain::{bet, binary_question, closed, multiple_choice};
    use rust_decimal_macros::dec;

    fn resolved(question: Question, bets: Vec<Bet>, answer: &str) -> (Question, Vec<Bet>) {
        let resolution = resolve_question(&closed(question), &bets, answer).unwrap();
        (resolution.question, resolution.bets)
    }

    fn amount_between(plan: &SettlementPlan, payer: &str, payee: &str) -> Option<Decimal> {
        plan.obligations
            .iter()
            .find(|o| o.payer().as_str() == payer && o.payee().as_str() == payee)
            .map(SettlementObligation::amount)
    }

    #[test]
    fn loser_pays_winners_by_net_gain() {
        let (q, bets) = resolved(
            binary_question("q-1"),
            vec![
                bet("a", "q-1", "Yes", dec!(25)),
                bet("b", "q-1", "No", dec!(15)),
                bet("c", "q-1", "Yes", dec!(30)),
            ],
            "Yes",
        );

        let plan = generate_settlements(&q, &bets).unwrap();

        assert_eq!(plan.obligations.len(), 2);
        assert_eq!(amount_between(&plan, "b", "a"), Some(dec!(6.82)));
        assert_eq!(amount_between(&plan, "b", "c"), Some(dec!(8.18)));
        assert_eq!(plan.total, dec!(15.00));
        assert_eq!(plan.rounding_slack, Decimal::ZERO);
    }

    #[test]
    fn sole_bettor_owes_and_is_owed_nothing() {
        let (q, bets) = resolved(
            binary_question("q-1"),
            vec![bet("a", "q-1", "Yes", dec!(10))],
            "Yes",
        );
        let plan = generate_settlements(&q, &bets).unwrap();
        assert!(plan.obligations.is_empty());
    }

    #[test]
    fn everyone_on_the_same_answer_needs_no_settlement() {
        let (q, bets) = resolved(
            binary_question("q-1"),
            vec![
                bet("a", "q-1", "Yes", dec!(10)),
                bet("b", "q-1", "Yes", dec!(20)),
            ],
            "Yes",
        );
        let plan = generate_settlements(&q, &bets).unwrap();
        assert!(plan.obligations.is_empty());
    }

    #[test]
    fn no_winners_means_no_obligations() {
        let (q, bets) = resolved(
            multiple_choice("q-1", &["Red", "Green", "Blue"]),
            vec![
                bet("a", "q-1", "Red", dec!(10)),
                bet("b", "q-1", "Green", dec!(20)),
            ],
            "Blue",
        );
        let plan = generate_settlements(&q, &bets).unwrap();
        assert!(plan.obligations.is_empty());
    }

    #[test]
    fn several_losers_each_split_across_winners() {
        let (q, bets) = resolved(
            multiple_choice("q-1", &["Red", "Green", "Blue"]),
            vec![
                bet("a", "q-1", "Red", dec!(10)),
                bet("b", "q-1", "Red", dec!(30)),
                bet("c", "q-1", "Green", dec!(20)),
                bet("d", "q-1", "Blue", dec!(20)),
            ],
            "Red",
        );

        let plan = generate_settlements(&q, &bets).unwrap();

        // Total 80 on a Red pool of 40: a wins 20 (gain 10), b wins 60 (gain 30).
        assert_eq!(plan.obligations.len(), 4);
        assert_eq!(amount_between(&plan, "c", "a"), Some(dec!(5)));
        assert_eq!(amount_between(&plan, "c", "b"), Some(dec!(15)));
        assert_eq!(amount_between(&plan, "d", "a"), Some(dec!(5)));
        assert_eq!(amount_between(&plan, "d", "b"), Some(dec!(15)));
    }

    #[test]
    fn sub_cent_allocations_are_dropped() {
        // a's gain is tiny relative to b's, so c's 0.01 stake splits below a cent.
        let (q, bets) = resolved(
            binary_question("q-1"),
            vec![
                bet("a", "q-1", "Yes", dec!(0.01)),
                bet("b", "q-1", "Yes", dec!(100)),
                bet("c", "q-1", "No", dec!(0.01)),
            ],
            "Yes",
        );

        let plan = generate_settlements(&q, &bets).unwrap();
        for obligation in &plan.obligations {
            assert!(obligation.amount() >= MIN_UNIT);
            assert_ne!(obligation.payer(), obligation.payee());
        }
    }

    #[test]
    fn obligations_are_positive_and_never_self_owed() {
        let (q, bets) = resolved(
            multiple_choice("q-1", &["A", "B", "C"]),
            vec![
                bet("p1", "q-1", "A", dec!(3.33)),
                bet("p2", "q-1", "A", dec!(7.77)),
                bet("p3", "q-1", "B", dec!(1.11)),
                bet("p4", "q-1", "C", dec!(9.99)),
                bet("p5", "q-1", "B", dec!(0.05)),
            ],
            "A",
        );

        let plan = generate_settlements(&q, &bets).unwrap();
        assert!(!plan.obligations.is_empty());
        for obligation in &plan.obligations {
            assert!(obligation.amount() > Decimal::ZERO);
            assert_ne!(obligation.payer(), obligation.payee());
            assert_eq!(obligation.status(), ObligationStatus::Pending);
        }
    }

    #[test]
    fn regenerating_gives_identical_obligations() {
        let (q, bets) = resolved(
            binary_question("q-1"),
            vec![
                bet("a", "q-1", "Yes", dec!(25)),
                bet("b", "q-1", "No", dec!(15)),
                bet("c", "q-1", "Yes", dec!(30)),
            ],
            "Yes",
        );

        let first = generate_settlements(&q, &bets).unwrap();
        let mut reversed = bets.clone();
        reversed.reverse();
        let second = generate_settlements(&q, &reversed).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn unresolved_question_has_insufficient_data() {
        let q = closed(binary_question("q-1"));
        let bets = vec![bet("a", "q-1", "Yes", dec!(10))];
        assert!(matches!(
            generate_settlements(&q, &bets),
            Err(EngineError::InsufficientPoolData { .. })
        ));
    }

    #[test]
    fn active_bet_on_resolved_question_has_insufficient_data() {
        let (q, mut bets) = resolved(
            binary_question("q-1"),
            vec![bet("a", "q-1", "Yes", dec!(10))],
            "Yes",
        );
        bets.push(bet("late", "q-1", "No", dec!(5)));
        assert!(matches!(
            generate_settlements(&q, &bets),
            Err(EngineError::InsufficientPoolData { .. })
        ));
    }

    #[test]
    fn foreign_bets_are_rejected() {
        let (q, mut bets) = resolved(
            binary_question("q-1"),
            vec![bet("a", "q-1", "Yes", dec!(10))],
            "Yes",
        );
        let (_, other) = resolved(
            binary_question("q-2"),
            vec![bet("b", "q-2", "No", dec!(10))],
            "Yes",
        );
        bets.extend(other);
        assert!(matches!(
            generate_settlements(&q, &bets),
            Err(EngineError::Validation(
                ValidationError::BetQuestionMismatch { .. }
            ))
        ));
    }

    #[test]
    fn event_settlements_skip_unresolved_questions() {
        let (q1, mut bets) = resolved(
            binary_question("q-1"),
            vec![
                bet("a", "q-1", "Yes", dec!(10)),
                bet("b", "q-1", "No", dec!(10)),
            ],
            "Yes",
        );
        let q2 = binary_question("q-2");
        bets.push(bet("a", "q-2", "No", dec!(5)));

        let plans = generate_event_settlements(&[q1, q2], &bets).unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].question_id.as_str(), "q-1");
        assert_eq!(amount_between(&plans[0], "b", "a"), Some(dec!(10)));
    }

    #[test]
    fn bets_settle_once_all_their_obligations_complete() {
        let (q, bets) = resolved(
            binary_question("q-1"),
            vec![
                bet("a", "q-1", "Yes", dec!(25)),
                bet("b", "q-1", "No", dec!(15)),
                bet("c", "q-1", "Yes", dec!(30)),
            ],
            "Yes",
        );
        let mut obligations = generate_settlements(&q, &bets).unwrap().obligations;

        assert!(bets_to_settle(&bets, &obligations).is_empty());

        // b -> a completes: a is fully paid, b still owes c.
        obligations[0].complete().unwrap();
        let settled = bets_to_settle(&bets, &obligations);
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].as_str(), "b-a-q-1");

        obligations[1].complete().unwrap();
        assert_eq!(bets_to_settle(&bets, &obligations).len(), 3);
    }

    #[test]
    fn very_large_stakes_settle_without_overflow() {
        let stake = Decimal::from(1_000_000_000_000_000_i64);
        let (q, bets) = resolved(
            binary_question("q-1"),
            vec![bet("a", "q-1", "Yes", stake), bet("b", "q-1", "No", stake)],
            "Yes",
        );

        let plan = generate_settlements(&q, &bets).unwrap();

        assert_eq!(amount_between(&plan, "b", "a"), Some(stake));
        assert_eq!(plan.total, stake);
    }
}
