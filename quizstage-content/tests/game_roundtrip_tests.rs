//! Game import/export round-trip tests
//!
//! Cover the status/type export rule table and the semantic round-trip
//! contract between the importer and the projector.

use quizstage_common::db::create_tables;
use quizstage_common::Error;
use quizstage_content::bundle::{GameAnswerEntry, GameBundle, GameMeta, GameQuestionEntry};
use quizstage_content::{export_game, import_game};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

const POINTS: [f64; 5] = [40.0, 30.0, 15.0, 10.0, 5.0];

async fn mem_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    create_tables(&pool).await.unwrap();
    pool
}

fn bundle(game_type: &str, question_count: usize) -> GameBundle {
    let questions = (1..=question_count)
        .map(|q| GameQuestionEntry {
            text: format!("Question number {}", q),
            answers: POINTS
                .iter()
                .enumerate()
                .map(|(i, points)| GameAnswerEntry {
                    text: format!("A{}-{}", q, i + 1),
                    fixed_points: *points,
                })
                .collect(),
        })
        .collect();
    GameBundle {
        game: GameMeta {
            name: "Saturday special".to_string(),
            game_type: game_type.to_string(),
        },
        questions,
    }
}

async fn set_status(pool: &SqlitePool, game_id: &str, status: &str) {
    sqlx::query("UPDATE games SET status = ? WHERE guid = ?")
        .bind(status)
        .bind(game_id)
        .execute(pool)
        .await
        .unwrap();
}

/// A closed points poll re-exports as prepared with its real points, and
/// reimporting the export yields identical per-answer points.
#[tokio::test]
async fn ready_points_poll_round_trips_as_prepared() {
    let pool = mem_pool().await;
    let game_id = import_game(&pool, &bundle("poll_points", 10), "host-1").await.unwrap();

    // Simulate compiled poll results: real points, status ready
    sqlx::query(
        "UPDATE game_answers SET fixed_points = 20 \
         WHERE question_id IN (SELECT guid FROM game_questions WHERE game_id = ?)",
    )
    .bind(&game_id)
    .execute(&pool)
    .await
    .unwrap();
    set_status(&pool, &game_id, "ready").await;

    let exported = export_game(&pool, &game_id).await.unwrap();
    assert_eq!(exported.game.game_type, "prepared");
    assert_eq!(exported.questions.len(), 10);
    for question in &exported.questions {
        assert_eq!(question.answers.len(), 5);
        for answer in &question.answers {
            assert_eq!(answer.fixed_points, 20.0);
        }
    }

    // Reimport: a new game whose stored points equal the exported ones
    let new_game_id = import_game(&pool, &exported, "host-1").await.unwrap();
    assert_ne!(new_game_id, game_id);

    let reexported = export_game(&pool, &new_game_id).await.unwrap();
    assert_eq!(reexported.game.game_type, "prepared");
    for (old, new) in exported.questions.iter().zip(reexported.questions.iter()) {
        assert_eq!(old.text, new.text);
        let old_points: Vec<f64> = old.answers.iter().map(|a| a.fixed_points).collect();
        let new_points: Vec<f64> = new.answers.iter().map(|a| a.fixed_points).collect();
        assert_eq!(old_points, new_points);
    }
}

/// A draft points poll must not leak its stored placeholder points.
#[tokio::test]
async fn draft_points_poll_exports_zero_points() {
    let pool = mem_pool().await;
    let game_id = import_game(&pool, &bundle("poll_points", 10), "host-1").await.unwrap();

    // Stored points are non-zero (the importer kept the bundle's values)
    let stored: i64 = sqlx::query_scalar(
        "SELECT SUM(fixed_points) FROM game_answers \
         WHERE question_id IN (SELECT guid FROM game_questions WHERE game_id = ?)",
    )
    .bind(&game_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(stored > 0);

    let exported = export_game(&pool, &game_id).await.unwrap();
    assert_eq!(exported.game.game_type, "poll_points");
    for question in &exported.questions {
        assert_eq!(question.answers.len(), 5);
        for answer in &question.answers {
            assert_eq!(answer.fixed_points, 0.0);
        }
    }
}

/// Draft text polls carry no answer skeleton at all.
#[tokio::test]
async fn draft_text_poll_exports_no_answers() {
    let pool = mem_pool().await;
    let game_id = import_game(&pool, &bundle("poll_text", 10), "host-1").await.unwrap();

    let exported = export_game(&pool, &game_id).await.unwrap();
    assert_eq!(exported.game.game_type, "poll_text");
    assert_eq!(exported.questions.len(), 10);
    assert!(exported.questions.iter().all(|q| q.answers.is_empty()));
}

/// Prepared games export as-is in any status.
#[tokio::test]
async fn prepared_game_exports_real_points() {
    let pool = mem_pool().await;
    let game_id = import_game(&pool, &bundle("prepared", 3), "host-1").await.unwrap();

    let exported = export_game(&pool, &game_id).await.unwrap();
    assert_eq!(exported.game.game_type, "prepared");
    let points: Vec<f64> = exported.questions[0]
        .answers
        .iter()
        .map(|a| a.fixed_points)
        .collect();
    assert_eq!(points, POINTS.to_vec());
}

/// A poll that is currently open exports like the draft of its kind.
#[tokio::test]
async fn open_poll_exports_like_draft() {
    let pool = mem_pool().await;
    let game_id = import_game(&pool, &bundle("poll_text", 10), "host-1").await.unwrap();
    set_status(&pool, &game_id, "poll_open").await;

    let exported = export_game(&pool, &game_id).await.unwrap();
    assert_eq!(exported.game.game_type, "poll_text");
    assert!(exported.questions.iter().all(|q| q.answers.is_empty()));
}

/// Sanitization on the import path: clipped texts, clamped points,
/// placeholder defaults, normalized type.
#[tokio::test]
async fn importer_sanitizes_fields() {
    let pool = mem_pool().await;
    let bundle = GameBundle {
        game: GameMeta {
            name: "  ".to_string(),
            game_type: "mystery".to_string(),
        },
        questions: vec![GameQuestionEntry {
            text: String::new(),
            answers: vec![
                GameAnswerEntry { text: "a very long answer indeed".into(), fixed_points: 250.0 },
                GameAnswerEntry { text: "  ".into(), fixed_points: -5.0 },
                GameAnswerEntry { text: "ok".into(), fixed_points: f64::NAN },
            ],
        }],
    };
    let game_id = import_game(&pool, &bundle, "host-1").await.unwrap();

    let (name, game_type): (String, String) =
        sqlx::query_as("SELECT name, game_type FROM games WHERE guid = ?")
            .bind(&game_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(name, "Untitled game");
    assert_eq!(game_type, "poll_text");

    let question_text: String =
        sqlx::query_scalar("SELECT text FROM game_questions WHERE game_id = ?")
            .bind(&game_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(question_text, "Question 1");

    let answers: Vec<(String, i64)> = sqlx::query_as(
        "SELECT text, fixed_points FROM game_answers \
         WHERE question_id IN (SELECT guid FROM game_questions WHERE game_id = ?) \
         ORDER BY ord ASC",
    )
    .bind(&game_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(answers.len(), 3);
    assert_eq!(answers[0].0.chars().count(), 17);
    assert_eq!(answers[0].1, 100);
    assert_eq!(answers[1].0, "Answer 2");
    assert_eq!(answers[1].1, 0);
    assert_eq!(answers[2].1, 0);
}

#[tokio::test]
async fn exporting_a_missing_game_is_not_found() {
    let pool = mem_pool().await;
    let err = export_game(&pool, "no-such-game").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
