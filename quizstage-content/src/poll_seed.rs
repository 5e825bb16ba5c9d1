//! Poll sessions and synthetic vote seeding
//!
//! Opening a poll creates one session per question; seeding inserts
//! normalized vote/text-entry rows for synthetic voters, chunked to respect
//! batch payload limits. Chunks are written sequentially — there is no
//! dependency between them, but sequencing bounds memory and request size.

use crate::bundle::{PointsVoter, TextVoter};
use crate::sanitize::{clip_text, normalize_for_grouping, MAX_ENTRY_TEXT_LEN};
use quizstage_common::db::{GameStatus, PollSessionRow};
use quizstage_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

/// Maximum rows per batched insert
const INSERT_CHUNK_SIZE: usize = 500;

/// Open the poll for a game: create one open session per question (in
/// question order) and move the game to `poll_open`.
///
/// Callers are expected to consult `validate_poll_ready_to_open` first;
/// this function only performs the writes.
pub async fn open_poll(pool: &SqlitePool, game_id: &str) -> Result<Vec<PollSessionRow>> {
    let questions: Vec<(String, i64)> =
        sqlx::query_as("SELECT guid, ord FROM game_questions WHERE game_id = ? ORDER BY ord ASC")
            .bind(game_id)
            .fetch_all(pool)
            .await?;
    if questions.is_empty() {
        return Err(Error::NotFound(format!("Game {} has no questions", game_id)));
    }

    let mut sessions = Vec::with_capacity(questions.len());
    for (question_id, ord) in questions {
        let guid = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO poll_sessions (guid, game_id, question_id, question_ord, is_open) \
             VALUES (?, ?, ?, ?, 1)",
        )
        .bind(&guid)
        .bind(game_id)
        .bind(&question_id)
        .bind(ord)
        .execute(pool)
        .await?;

        sessions.push(PollSessionRow {
            guid,
            game_id: game_id.to_string(),
            question_id,
            question_ord: ord,
            is_open: true,
        });
    }

    set_status(pool, game_id, GameStatus::PollOpen).await?;
    debug!(game_id = %game_id, sessions = sessions.len(), "Poll opened");

    Ok(sessions)
}

/// Close the poll: mark every session closed and move the game to `ready`.
///
/// Compiling votes into answer points happens elsewhere.
pub async fn close_poll(pool: &SqlitePool, game_id: &str) -> Result<()> {
    sqlx::query("UPDATE poll_sessions SET is_open = 0 WHERE game_id = ?")
        .bind(game_id)
        .execute(pool)
        .await?;
    set_status(pool, game_id, GameStatus::Ready).await?;
    debug!(game_id = %game_id, "Poll closed");
    Ok(())
}

/// Seed text-poll entries for synthetic voters.
///
/// Each voter's `answers_raw` is index-aligned to the sessions in question
/// order; empty answers are skipped. Every row stores the raw (trimmed,
/// clipped) text plus a lowercase whitespace-collapsed copy for grouping.
/// One fresh voter token is generated per voter and reused across all of
/// that voter's rows. Returns the number of rows written.
pub async fn seed_text_votes(
    pool: &SqlitePool,
    sessions: &[PollSessionRow],
    voters: &[TextVoter],
) -> Result<u64> {
    let sessions = sessions_in_order(sessions);

    let mut rows: Vec<(String, String, String, String, String)> = Vec::new();
    for voter in voters {
        let token = Uuid::new_v4().to_string();
        for (index, session) in sessions.iter().enumerate() {
            let Some(raw) = voter.answers_raw.get(index) else {
                continue;
            };
            if raw.trim().is_empty() {
                continue;
            }
            let text = clip_text(raw, MAX_ENTRY_TEXT_LEN, "");
            let normalized = normalize_for_grouping(&text);
            rows.push((
                Uuid::new_v4().to_string(),
                session.guid.clone(),
                token.clone(),
                text,
                normalized,
            ));
        }
    }

    for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
        let mut builder = sqlx::QueryBuilder::new(
            "INSERT INTO poll_text_entries (guid, session_id, voter_token, entry_text, normalized_text) ",
        );
        builder.push_values(chunk, |mut row, (guid, session_id, token, text, normalized)| {
            row.push_bind(guid)
                .push_bind(session_id)
                .push_bind(token)
                .push_bind(text)
                .push_bind(normalized);
        });
        builder.build().execute(pool).await?;
    }

    debug!(rows = rows.len(), voters = voters.len(), "Seeded text poll entries");
    Ok(rows.len() as u64)
}

/// Seed points-poll votes for synthetic voters.
///
/// Each voter's `picks` holds, per question, an index into that question's
/// persisted answer list (ordered by ord); out-of-range indices are
/// skipped. Returns the number of rows written.
pub async fn seed_point_votes(
    pool: &SqlitePool,
    sessions: &[PollSessionRow],
    voters: &[PointsVoter],
) -> Result<u64> {
    let sessions = sessions_in_order(sessions);

    // Answer id lists aligned with the session order
    let mut answer_lists: Vec<Vec<String>> = Vec::with_capacity(sessions.len());
    for session in &sessions {
        let answers: Vec<(String,)> = sqlx::query_as(
            "SELECT guid FROM game_answers WHERE question_id = ? ORDER BY ord ASC",
        )
        .bind(&session.question_id)
        .fetch_all(pool)
        .await?;
        answer_lists.push(answers.into_iter().map(|(id,)| id).collect());
    }

    let mut rows: Vec<(String, String, String, String)> = Vec::new();
    for voter in voters {
        let token = Uuid::new_v4().to_string();
        for (index, session) in sessions.iter().enumerate() {
            let Some(&pick) = voter.picks.get(index) else {
                continue;
            };
            let answers = &answer_lists[index];
            if pick < 0 || pick as usize >= answers.len() {
                warn!(
                    session_id = %session.guid,
                    pick = pick,
                    "Skipping out-of-range answer pick"
                );
                continue;
            }
            rows.push((
                Uuid::new_v4().to_string(),
                session.guid.clone(),
                token.clone(),
                answers[pick as usize].clone(),
            ));
        }
    }

    for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
        let mut builder = sqlx::QueryBuilder::new(
            "INSERT INTO poll_votes (guid, session_id, voter_token, answer_id) ",
        );
        builder.push_values(chunk, |mut row, (guid, session_id, token, answer_id)| {
            row.push_bind(guid)
                .push_bind(session_id)
                .push_bind(token)
                .push_bind(answer_id);
        });
        builder.build().execute(pool).await?;
    }

    debug!(rows = rows.len(), voters = voters.len(), "Seeded point poll votes");
    Ok(rows.len() as u64)
}

/// Sessions sorted by question ord; positional voter answers align to this
fn sessions_in_order(sessions: &[PollSessionRow]) -> Vec<PollSessionRow> {
    let mut ordered = sessions.to_vec();
    ordered.sort_by_key(|s| s.question_ord);
    ordered
}

async fn set_status(pool: &SqlitePool, game_id: &str, status: GameStatus) -> Result<()> {
    let result = sqlx::query(
        "UPDATE games SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(status.as_str())
    .bind(game_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Game {}", game_id)));
    }
    Ok(())
}
