//! Lifecycle validator
//!
//! Read-only predicates over persisted game state deciding whether editing,
//! poll-opening or play-start are currently permitted. Verdicts are values,
//! never errors: callers gate UI actions on them and must not crash on an
//! expected "not ready yet" condition. Nothing here mutates status.

use quizstage_common::db::{GameAnswerRow, GameRow, GameStatus, GameType};
use quizstage_common::{Error, Result};
use sqlx::SqlitePool;

/// Minimum number of questions a playable game needs
pub const MIN_QUESTIONS: usize = 10;

/// Required answer count per played question
pub const ANSWERS_PER_QUESTION: usize = 5;

/// Required per-question point sum
pub const POINTS_TARGET_SUM: i64 = 100;

/// Structured gate verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub ok: bool,
    pub reason: Option<String>,
    /// Editing a `ready` game is allowed but forces a reset back to draft
    /// with answer points zeroed; the caller must warn first.
    pub needs_reset_warning: bool,
}

impl Gate {
    fn allow() -> Gate {
        Gate { ok: true, reason: None, needs_reset_warning: false }
    }

    fn allow_with_reset_warning() -> Gate {
        Gate { ok: true, reason: None, needs_reset_warning: true }
    }

    fn deny(reason: impl Into<String>) -> Gate {
        Gate { ok: false, reason: Some(reason.into()), needs_reset_warning: false }
    }
}

/// Whether the game may be edited right now.
///
/// Pure: operates on the already-loaded game row.
pub fn can_enter_edit(game: &GameRow) -> Gate {
    let is_poll = game.game_type().map(|t| t.is_poll()).unwrap_or(false);

    if is_poll && game.status() == Some(GameStatus::PollOpen) {
        return Gate::deny("Cannot edit while the poll is open");
    }
    if game.status() == Some(GameStatus::Ready) {
        return Gate::allow_with_reset_warning();
    }
    Gate::allow()
}

/// Whether the game is structurally ready to be played.
///
/// Requires at least [`MIN_QUESTIONS`] questions; each of the first
/// [`MIN_QUESTIONS`] must have exactly [`ANSWERS_PER_QUESTION`] answers,
/// every point in `1..=100`, and a per-question sum of exactly
/// [`POINTS_TARGET_SUM`]. Poll kinds additionally require `ready` status.
pub async fn validate_ready_to_play(pool: &SqlitePool, game_id: &str) -> Result<Gate> {
    let game = load_game(pool, game_id).await?;
    let question_ids = load_question_ids(pool, game_id).await?;

    if question_ids.len() < MIN_QUESTIONS {
        return Ok(Gate::deny(format!(
            "Game has {} questions, needs at least {}",
            question_ids.len(),
            MIN_QUESTIONS
        )));
    }

    for (index, question_id) in question_ids.iter().take(MIN_QUESTIONS).enumerate() {
        let ordinal = index + 1;
        let answers = load_answers(pool, question_id).await?;

        if answers.len() != ANSWERS_PER_QUESTION {
            return Ok(Gate::deny(format!(
                "Question {} has {} answers, needs exactly {}",
                ordinal,
                answers.len(),
                ANSWERS_PER_QUESTION
            )));
        }

        if let Some(bad) = answers
            .iter()
            .find(|a| a.fixed_points <= 0 || a.fixed_points > POINTS_TARGET_SUM)
        {
            return Ok(Gate::deny(format!(
                "Question {} has an answer with invalid points ({})",
                ordinal, bad.fixed_points
            )));
        }

        let sum: i64 = answers.iter().map(|a| a.fixed_points).sum();
        if sum != POINTS_TARGET_SUM {
            return Ok(Gate::deny(format!(
                "Question {} points sum to {}, needs exactly {}",
                ordinal, sum, POINTS_TARGET_SUM
            )));
        }
    }

    let is_poll = game.game_type().map(|t| t.is_poll()).unwrap_or(false);
    if is_poll && game.status() != Some(GameStatus::Ready) {
        return Ok(Gate::deny("Poll results are not compiled yet"));
    }

    Ok(Gate::allow())
}

/// Whether the poll may be opened.
///
/// Requires a poll kind that is not already open and at least
/// [`MIN_QUESTIONS`] questions. For points polls every question also needs
/// its full answer skeleton (text content only — points come later); text
/// polls store no answers before the poll opens.
pub async fn validate_poll_ready_to_open(pool: &SqlitePool, game_id: &str) -> Result<Gate> {
    let game = load_game(pool, game_id).await?;

    let Some(game_type) = game.game_type() else {
        return Ok(Gate::deny("Unknown game type"));
    };
    if !game_type.is_poll() {
        return Ok(Gate::deny("Not a poll game"));
    }
    if game.status() == Some(GameStatus::PollOpen) {
        return Ok(Gate::deny("Poll is already open"));
    }

    let question_ids = load_question_ids(pool, game_id).await?;
    if question_ids.len() < MIN_QUESTIONS {
        return Ok(Gate::deny(format!(
            "Game has {} questions, needs at least {}",
            question_ids.len(),
            MIN_QUESTIONS
        )));
    }

    if game_type == GameType::PollPoints {
        for (index, question_id) in question_ids.iter().enumerate() {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM game_answers WHERE question_id = ?")
                    .bind(question_id)
                    .fetch_one(pool)
                    .await?;
            if count as usize != ANSWERS_PER_QUESTION {
                return Ok(Gate::deny(format!(
                    "Question {} has {} answers, needs exactly {}",
                    index + 1,
                    count,
                    ANSWERS_PER_QUESTION
                )));
            }
        }
    }

    Ok(Gate::allow())
}

async fn load_game(pool: &SqlitePool, game_id: &str) -> Result<GameRow> {
    let game: Option<GameRow> = sqlx::query_as(
        "SELECT guid, name, game_type, status, owner_id FROM games WHERE guid = ?",
    )
    .bind(game_id)
    .fetch_optional(pool)
    .await?;
    game.ok_or_else(|| Error::NotFound(format!("Game {}", game_id)))
}

async fn load_question_ids(pool: &SqlitePool, game_id: &str) -> Result<Vec<String>> {
    let ids: Vec<(String,)> =
        sqlx::query_as("SELECT guid FROM game_questions WHERE game_id = ? ORDER BY ord ASC")
            .bind(game_id)
            .fetch_all(pool)
            .await?;
    Ok(ids.into_iter().map(|(id,)| id).collect())
}

async fn load_answers(pool: &SqlitePool, question_id: &str) -> Result<Vec<GameAnswerRow>> {
    let rows: Vec<GameAnswerRow> = sqlx::query_as(
        "SELECT guid, question_id, ord, text, fixed_points FROM game_answers \
         WHERE question_id = ? ORDER BY ord ASC",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
