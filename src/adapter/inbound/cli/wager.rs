//! Question and bet commands.

use chrono::Utc;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::{
    AddParticipantArgs, AddQuestionArgs, BetArgs, OddsArgs, QuestionArg, ResolveArgs,
};
use super::{output, Context};
use crate::application::odds::ProspectiveBet;
use crate::application::placement::BetRequest;
use crate::domain::{EventId, Participant, ParticipantId, Question, QuestionId};
use crate::error::Result;

#[derive(Tabled)]
struct OddsRow {
    #[tabled(rename = "Answer")]
    answer: String,
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Share %")]
    share: String,
    #[tabled(rename = "Multiplier")]
    multiplier: String,
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Participant")]
    participant: String,
    #[tabled(rename = "Answer")]
    answer: String,
    #[tabled(rename = "Stake")]
    stake: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Winnings")]
    winnings: String,
}

/// Register a participant.
pub fn add_participant(ctx: &Context, args: AddParticipantArgs) -> Result<()> {
    let participant = Participant::new(args.id, args.name);
    ctx.store.add_participant(participant.clone());
    ctx.save()?;

    output::json_output(&json!({ "command": "add-participant", "participant": participant }));
    output::success(&format!("Participant {} ({})", participant.id, participant.name));
    Ok(())
}

/// Create a question.
pub fn add_question(ctx: &Context, args: AddQuestionArgs) -> Result<()> {
    let question = Question::try_new(
        QuestionId::new(args.id),
        EventId::new(args.event),
        args.title,
        args.kind.into(),
        args.options,
        args.closes_at,
    )?;
    ctx.store.add_question(question.clone());
    ctx.save()?;

    output::json_output(&json!({ "command": "add-question", "question": question }));
    output::success(&format!("Question {} created", question.id()));
    output::field("Kind", question.kind());
    if !question.options().is_empty() {
        output::field("Answers", question.options().join(", "));
    }
    output::field("Closes", question.betting_closes_at().to_rfc3339());
    Ok(())
}

/// Show live odds, optionally with a bet preview.
pub async fn odds(ctx: &Context, args: OddsArgs) -> Result<()> {
    let question_id = QuestionId::new(args.question);
    let prospective = match (args.answer, args.stake) {
        (Some(answer), Some(stake)) => Some(ProspectiveBet { answer, stake }),
        _ => None,
    };

    let odds = ctx
        .service
        .live_odds(&question_id, prospective.as_ref())
        .await?;

    output::json_output(&json!({ "command": "odds", "odds": odds }));

    output::section(&format!("Odds for {question_id}"));
    output::field("Total pool", odds.total_pool);
    let rows: Vec<OddsRow> = odds
        .answers
        .iter()
        .map(|a| OddsRow {
            answer: a.answer.clone(),
            pool: a.pool.to_string(),
            share: a.share.to_string(),
            multiplier: a
                .multiplier
                .map_or_else(|| "-".to_string(), |m| format!("{m}x")),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());

    if let Some(preview) = &odds.preview {
        output::section("Preview");
        output::field("Bet", format!("{} on {}", preview.stake, preview.answer));
        output::field("Pool after", preview.total_pool_after);
        output::field("Answer after", preview.answer_pool_after);
        output::field("Would win", output::positive(preview.potential_winnings));
    }
    Ok(())
}

/// Place a bet now.
pub async fn bet(ctx: &Context, args: BetArgs) -> Result<()> {
    let question_id = QuestionId::new(args.question);
    let participant_id = ParticipantId::new(args.participant);
    let request = BetRequest {
        participant_id: participant_id.clone(),
        answer: args.answer,
        stake: args.stake,
    };

    let bet = ctx.service.place_bet(&question_id, request, Utc::now()).await?;
    ctx.store.ensure_participant(&participant_id);
    ctx.save()?;

    output::json_output(&json!({ "command": "bet", "bet": bet }));
    output::success(&format!(
        "{} bet {} on '{}'",
        bet.participant_id(),
        bet.stake(),
        bet.chosen_answer()
    ));
    output::field("Bet", bet.id());
    Ok(())
}

/// Close betting.
pub async fn close(ctx: &Context, args: QuestionArg) -> Result<()> {
    let question = ctx
        .service
        .close_question(&QuestionId::new(args.question))
        .await?;
    ctx.save()?;

    output::json_output(&json!({ "command": "close", "question": question }));
    output::success(&format!("Question {} is {}", question.id(), question.status()));
    Ok(())
}

/// Resolve a question and list every bet's outcome.
pub async fn resolve(ctx: &Context, args: ResolveArgs) -> Result<()> {
    let question_id = QuestionId::new(args.question);
    let resolution = ctx
        .service
        .resolve(&question_id, &args.answer, Utc::now())
        .await?;
    if !resolution.already_resolved {
        ctx.save()?;
    }

    output::json_output(&json!({
        "command": "resolve",
        "question_id": question_id,
        "correct_answer": resolution.correct_answer(),
        "already_resolved": resolution.already_resolved,
        "total_pool": resolution.pool.total(),
        "bets": resolution.bets,
    }));

    if resolution.already_resolved {
        output::note(&format!(
            "{question_id} was already resolved as '{}'",
            resolution.correct_answer()
        ));
    } else {
        output::success(&format!(
            "{question_id} resolved as '{}'",
            resolution.correct_answer()
        ));
    }
    output::field("Answer", output::highlight(resolution.correct_answer()));
    output::field("Pool", resolution.pool.total());
    output::field("Winners", resolution.winners().count());
    output::field("Losers", resolution.losers().count());

    let rows: Vec<OutcomeRow> = resolution
        .bets
        .iter()
        .map(|b| OutcomeRow {
            participant: b.participant_id().to_string(),
            answer: b.chosen_answer().to_string(),
            stake: b.stake().to_string(),
            status: b.status().to_string(),
            winnings: b
                .realized_winnings()
                .map_or_else(String::new, |w| w.to_string()),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
