//! Game importer and editor surface
//!
//! Creates a single game (metadata + ordered questions + ordered answers)
//! from a bundle. Decoupled from the base importer on purpose: games carry
//! no category/tag tree, only a flat ordered question → answer chain.

use crate::bundle::GameBundle;
use crate::sanitize::{
    answer_placeholder, clamp_points, clip_text, normalize_game_type, question_placeholder,
    MAX_ANSWER_TEXT_LEN, MAX_NAME_LEN, MAX_QUESTION_TEXT_LEN,
};
use quizstage_common::db::GameStatus;
use quizstage_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// Import a game bundle for the given owner, returning the new game id.
///
/// The game is always created in `draft` status. Questions and answers are
/// created in array order with 1-based ords; empty texts get placeholder
/// defaults; each question's answers are written in one batched insert.
pub async fn import_game(pool: &SqlitePool, bundle: &GameBundle, owner_id: &str) -> Result<String> {
    let game_id = Uuid::new_v4().to_string();
    let name = clip_text(&bundle.game.name, MAX_NAME_LEN, "Untitled game");
    let game_type = normalize_game_type(&bundle.game.game_type);

    sqlx::query(
        "INSERT INTO games (guid, name, game_type, status, owner_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&game_id)
    .bind(&name)
    .bind(game_type.as_str())
    .bind(GameStatus::Draft.as_str())
    .bind(owner_id)
    .execute(pool)
    .await?;

    for (index, question) in bundle.questions.iter().enumerate() {
        let ord = index as i64 + 1;
        let question_id = Uuid::new_v4().to_string();
        let text = clip_text(&question.text, MAX_QUESTION_TEXT_LEN, &question_placeholder(ord));

        sqlx::query("INSERT INTO game_questions (guid, game_id, ord, text) VALUES (?, ?, ?, ?)")
            .bind(&question_id)
            .bind(&game_id)
            .bind(ord)
            .bind(&text)
            .execute(pool)
            .await?;

        if question.answers.is_empty() {
            continue;
        }

        // One batched insert per question keeps answer creation a single
        // store round-trip while preserving array order via ord.
        let mut builder = sqlx::QueryBuilder::new(
            "INSERT INTO game_answers (guid, question_id, ord, text, fixed_points) ",
        );
        builder.push_values(question.answers.iter().enumerate(), |mut row, (i, answer)| {
            let answer_ord = i as i64 + 1;
            row.push_bind(Uuid::new_v4().to_string())
                .push_bind(&question_id)
                .push_bind(answer_ord)
                .push_bind(clip_text(
                    &answer.text,
                    MAX_ANSWER_TEXT_LEN,
                    &answer_placeholder(answer_ord),
                ))
                .push_bind(clamp_points(answer.fixed_points));
        });
        builder.build().execute(pool).await?;
    }

    debug!(
        game_id = %game_id,
        game_type = game_type.as_str(),
        questions = bundle.questions.len(),
        "Game import complete"
    );

    Ok(game_id)
}

/// Reset a game for editing: zero all answer points and move the status
/// back to `draft`.
///
/// This is the side-effecting half of the `can_enter_edit` reset warning;
/// callers invoke it after the user confirms.
pub async fn reset_for_edit(pool: &SqlitePool, game_id: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM games WHERE guid = ?)")
        .bind(game_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(Error::NotFound(format!("Game {}", game_id)));
    }

    sqlx::query(
        r#"
        UPDATE game_answers SET fixed_points = 0
        WHERE question_id IN (SELECT guid FROM game_questions WHERE game_id = ?)
        "#,
    )
    .bind(game_id)
    .execute(pool)
    .await?;

    sqlx::query(
        "UPDATE games SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(GameStatus::Draft.as_str())
    .bind(game_id)
    .execute(pool)
    .await?;

    debug!(game_id = %game_id, "Game reset for editing");
    Ok(())
}
