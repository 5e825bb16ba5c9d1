//! Game export projector
//!
//! Projects a persisted game into a portable bundle whose answer/point
//! shape depends on the game's `(status, type)` pair:
//!
//! | status  | declared type | exported type | exported answers            |
//! |---------|---------------|---------------|-----------------------------|
//! | ready   | poll_*        | prepared      | answers with real points    |
//! | draft   | poll_points   | poll_points   | answers with points forced 0|
//! | draft   | poll_text     | poll_text     | no answers                  |
//! | any     | prepared      | prepared      | answers with real points    |
//!
//! A closed poll is re-exported as `prepared` so a reimport does not
//! re-trigger poll machinery; a draft poll must not leak placeholder
//! points as if they were meaningful. A `poll_open` game exports like the
//! draft of its kind: its points are not fixed yet either.

use crate::bundle::{GameAnswerEntry, GameBundle, GameMeta, GameQuestionEntry};
use quizstage_common::db::{GameAnswerRow, GameQuestionRow, GameStatus, GameType};
use quizstage_common::{Error, Result};
use sqlx::SqlitePool;

/// Export a persisted game as a bundle shaped like the importer's input.
///
/// `import_game(export_game(id))` round-trips semantically (a new game is
/// created, never byte-identical).
pub async fn export_game(pool: &SqlitePool, game_id: &str) -> Result<GameBundle> {
    let game: Option<(String, String, String)> =
        sqlx::query_as("SELECT name, game_type, status FROM games WHERE guid = ?")
            .bind(game_id)
            .fetch_optional(pool)
            .await?;
    let Some((name, type_str, status_str)) = game else {
        return Err(Error::NotFound(format!("Game {}", game_id)));
    };

    let game_type = GameType::parse(&type_str)
        .ok_or_else(|| Error::Internal(format!("Unknown game type '{}'", type_str)))?;
    let status = GameStatus::parse(&status_str)
        .ok_or_else(|| Error::Internal(format!("Unknown game status '{}'", status_str)))?;

    let questions: Vec<GameQuestionRow> = sqlx::query_as(
        "SELECT guid, game_id, ord, text FROM game_questions WHERE game_id = ? ORDER BY ord ASC",
    )
    .bind(game_id)
    .fetch_all(pool)
    .await?;

    // Explicit dispatch over the enumerated rule table; each arm yields the
    // exported type tag and how answers are shaped.
    let (exported_type, shape) = match (status, game_type) {
        (GameStatus::Ready, GameType::PollText | GameType::PollPoints) => {
            (GameType::Prepared, AnswerShape::RealPoints)
        }
        (_, GameType::Prepared) => (GameType::Prepared, AnswerShape::RealPoints),
        (GameStatus::Draft | GameStatus::PollOpen, GameType::PollPoints) => {
            (GameType::PollPoints, AnswerShape::ZeroPoints)
        }
        (GameStatus::Draft | GameStatus::PollOpen, GameType::PollText) => {
            (GameType::PollText, AnswerShape::NoAnswers)
        }
    };

    let mut exported_questions = Vec::with_capacity(questions.len());
    for question in &questions {
        let answers = match shape {
            AnswerShape::NoAnswers => Vec::new(),
            AnswerShape::RealPoints | AnswerShape::ZeroPoints => {
                let rows: Vec<GameAnswerRow> = sqlx::query_as(
                    "SELECT guid, question_id, ord, text, fixed_points FROM game_answers \
                     WHERE question_id = ? ORDER BY ord ASC",
                )
                .bind(&question.guid)
                .fetch_all(pool)
                .await?;
                rows.into_iter()
                    .map(|row| GameAnswerEntry {
                        text: row.text,
                        fixed_points: match shape {
                            AnswerShape::ZeroPoints => 0.0,
                            _ => row.fixed_points as f64,
                        },
                    })
                    .collect()
            }
        };

        exported_questions.push(GameQuestionEntry {
            text: question.text.clone(),
            answers,
        });
    }

    Ok(GameBundle {
        game: GameMeta {
            name,
            game_type: exported_type.as_str().to_string(),
        },
        questions: exported_questions,
    })
}

#[derive(Clone, Copy)]
enum AnswerShape {
    RealPoints,
    ZeroPoints,
    NoAnswers,
}
