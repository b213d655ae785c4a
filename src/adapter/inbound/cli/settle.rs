//! Settlement commands.

use rust_decimal::Decimal;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::{EventArg, ObligationArgs, QuestionArg};
use super::{output, Context};
use crate::application::settlement::SettlementPlan;
use crate::domain::{
    net_balances, EventId, ObligationKey, ObligationStatus, ParticipantId, QuestionId,
    SettlementObligation,
};
use crate::error::Result;
use crate::port::WagerStore;

#[derive(Tabled)]
struct ObligationRow {
    #[tabled(rename = "Payer")]
    payer: String,
    #[tabled(rename = "Payee")]
    payee: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn obligation_table(obligations: &[SettlementObligation]) -> String {
    let rows: Vec<ObligationRow> = obligations
        .iter()
        .map(|o| ObligationRow {
            payer: o.payer().to_string(),
            payee: o.payee().to_string(),
            amount: o.amount().to_string(),
            status: o.status().to_string(),
        })
        .collect();
    Table::new(rows).to_string()
}

fn print_plan(plan: &SettlementPlan) {
    output::section(&format!("Settlement for {}", plan.question_id));
    if plan.obligations.is_empty() {
        output::note("Nothing to settle");
        return;
    }
    output::lines(&obligation_table(&plan.obligations));
    output::field("Total", plan.total);
    if !plan.rounding_slack.is_zero() {
        output::warning(&format!("Rounding slack: {}", plan.rounding_slack));
    }
}

/// Settle one question.
pub async fn question(ctx: &Context, args: QuestionArg) -> Result<()> {
    let plan = ctx
        .service
        .generate_settlements(&QuestionId::new(args.question))
        .await?;
    ctx.save()?;

    output::json_output(&json!({ "command": "settle", "plan": plan }));
    print_plan(&plan);
    Ok(())
}

/// Settle every resolved question of an event.
pub async fn event(ctx: &Context, args: EventArg) -> Result<()> {
    let event_id = EventId::new(args.event);
    let plans = ctx.service.generate_event_settlements(&event_id).await?;
    ctx.save()?;

    output::json_output(&json!({
        "command": "settle-event",
        "event_id": event_id,
        "plans": plans,
    }));
    if plans.is_empty() {
        output::note(&format!("No resolved questions in {event_id}"));
    }
    for plan in &plans {
        print_plan(plan);
    }
    Ok(())
}

/// Complete or dispute an obligation.
pub async fn obligation(ctx: &Context, args: ObligationArgs) -> Result<()> {
    let key = ObligationKey {
        payer: ParticipantId::new(args.payer),
        payee: ParticipantId::new(args.payee),
        question_id: QuestionId::new(args.question),
    };
    let status = ObligationStatus::from(args.action);

    let obligation = ctx.service.update_obligation_status(&key, status).await?;
    ctx.save()?;

    output::json_output(&json!({ "command": "obligation", "obligation": obligation }));
    output::success(&format!("{key} is {}", obligation.status()));
    output::field("Amount", obligation.amount());
    Ok(())
}

/// Show a question's obligations and everyone's net position.
pub async fn balances(ctx: &Context, args: QuestionArg) -> Result<()> {
    let question_id = QuestionId::new(args.question);
    let obligations = ctx.store.fetch_obligations_for_question(&question_id).await?;
    let balances = net_balances(&obligations)?;

    output::json_output(&json!({
        "command": "balances",
        "question_id": question_id,
        "obligations": obligations,
        "balances": balances,
    }));

    output::section(&format!("Obligations for {question_id}"));
    if obligations.is_empty() {
        output::note("No obligations");
        return Ok(());
    }
    output::lines(&obligation_table(&obligations));

    output::section("Net balances");
    for (participant, net) in &balances {
        let net = if *net < Decimal::ZERO {
            output::negative(net)
        } else {
            output::positive(net)
        };
        output::field(participant.as_str(), net);
    }
    Ok(())
}
