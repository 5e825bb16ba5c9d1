//! Database initialization
//!
//! Creates the SQLite pool and the full quiz content schema. Table creation
//! is idempotent (`CREATE TABLE IF NOT EXISTS`) so startup is safe on both
//! fresh and existing databases.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Bound lock waits instead of failing immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all content tables (idempotent)
///
/// Split out from [`init_database`] so tests can build the schema on an
/// in-memory pool.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_bases_table(pool).await?;
    create_categories_table(pool).await?;
    create_tags_table(pool).await?;
    create_base_questions_table(pool).await?;
    create_question_tags_table(pool).await?;
    create_category_tags_table(pool).await?;
    create_games_table(pool).await?;
    create_game_questions_table(pool).await?;
    create_game_answers_table(pool).await?;
    create_poll_sessions_table(pool).await?;
    create_poll_votes_table(pool).await?;
    create_poll_text_entries_table(pool).await?;
    Ok(())
}

async fn create_bases_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bases (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_categories_table(pool: &SqlitePool) -> Result<()> {
    // parent_id is NULL for roots; a category's parent must already exist,
    // which the base importer guarantees by inserting parents first.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            guid TEXT PRIMARY KEY,
            base_id TEXT NOT NULL REFERENCES bases(guid) ON DELETE CASCADE,
            parent_id TEXT REFERENCES categories(guid) ON DELETE CASCADE,
            name TEXT NOT NULL,
            ord INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (ord >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_categories_base ON categories(base_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_tags_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            guid TEXT PRIMARY KEY,
            base_id TEXT NOT NULL REFERENCES bases(guid) ON DELETE CASCADE,
            name TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '',
            ord INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tags_base ON tags(base_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_base_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS base_questions (
            guid TEXT PRIMARY KEY,
            base_id TEXT NOT NULL REFERENCES bases(guid) ON DELETE CASCADE,
            category_id TEXT REFERENCES categories(guid) ON DELETE SET NULL,
            ord INTEGER NOT NULL DEFAULT 1,
            payload TEXT NOT NULL DEFAULT '{}',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_base_questions_base ON base_questions(base_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_base_questions_category ON base_questions(category_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_question_tags_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS question_tags (
            question_id TEXT NOT NULL REFERENCES base_questions(guid) ON DELETE CASCADE,
            tag_id TEXT NOT NULL REFERENCES tags(guid) ON DELETE CASCADE,
            PRIMARY KEY (question_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_category_tags_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS category_tags (
            category_id TEXT NOT NULL REFERENCES categories(guid) ON DELETE CASCADE,
            tag_id TEXT NOT NULL REFERENCES tags(guid) ON DELETE CASCADE,
            PRIMARY KEY (category_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_games_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            game_type TEXT NOT NULL CHECK (game_type IN ('prepared', 'poll_text', 'poll_points')),
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'poll_open', 'ready')),
            owner_id TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_games_owner ON games(owner_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_game_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS game_questions (
            guid TEXT PRIMARY KEY,
            game_id TEXT NOT NULL REFERENCES games(guid) ON DELETE CASCADE,
            ord INTEGER NOT NULL,
            text TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (ord >= 1)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_game_questions_game ON game_questions(game_id, ord)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_game_answers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS game_answers (
            guid TEXT PRIMARY KEY,
            question_id TEXT NOT NULL REFERENCES game_questions(guid) ON DELETE CASCADE,
            ord INTEGER NOT NULL,
            text TEXT NOT NULL,
            fixed_points INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (ord >= 1),
            CHECK (fixed_points >= 0 AND fixed_points <= 100)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_game_answers_question ON game_answers(question_id, ord)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_poll_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS poll_sessions (
            guid TEXT PRIMARY KEY,
            game_id TEXT NOT NULL REFERENCES games(guid) ON DELETE CASCADE,
            question_id TEXT NOT NULL REFERENCES game_questions(guid) ON DELETE CASCADE,
            question_ord INTEGER NOT NULL,
            is_open INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (game_id, question_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_poll_sessions_game ON poll_sessions(game_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_poll_votes_table(pool: &SqlitePool) -> Result<()> {
    // One vote per (session, voter); the voter token is an opaque
    // per-browser identifier, not a user account.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS poll_votes (
            guid TEXT PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES poll_sessions(guid) ON DELETE CASCADE,
            voter_token TEXT NOT NULL,
            answer_id TEXT NOT NULL REFERENCES game_answers(guid) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (session_id, voter_token)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_poll_votes_session ON poll_votes(session_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_poll_text_entries_table(pool: &SqlitePool) -> Result<()> {
    // normalized_text is the lowercase, whitespace-collapsed copy used for
    // grouping equivalent free-text answers when a poll is compiled.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS poll_text_entries (
            guid TEXT PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES poll_sessions(guid) ON DELETE CASCADE,
            voter_token TEXT NOT NULL,
            entry_text TEXT NOT NULL,
            normalized_text TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (session_id, voter_token)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_poll_text_entries_session ON poll_text_entries(session_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
