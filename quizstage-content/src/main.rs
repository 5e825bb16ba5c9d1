//! quizstage-content - Quiz content import/export operator tool
//!
//! Command-line surface over the content engine: parse question sheets,
//! import/export bases and games, run lifecycle gates, open/close polls and
//! seed synthetic votes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quizstage_common::config::{database_path, resolve_root_folder};
use quizstage_common::db::{init_database, PollSessionRow};
use quizstage_content::bundle::{BaseBundle, GameBundle, PointsVoter, TextVoter};
use quizstage_content::{
    can_enter_edit, close_poll, export_game, import_base, import_game, open_poll, parse,
    reset_for_edit, seed_point_votes, seed_text_votes, validate_poll_ready_to_open,
    validate_ready_to_play, Gate,
};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "quizstage-content", version, about = "Quiz content import/export tool")]
struct Cli {
    /// Root folder holding quizstage.db (falls back to QUIZSTAGE_ROOT, the
    /// config file, then the platform default)
    #[arg(long, global = true)]
    root: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a question sheet and print the structured result
    ParseText { file: PathBuf },
    /// Import a base bundle (categories, tags, questions, associations)
    ImportBase { bundle: PathBuf },
    /// Import a game bundle for an owner
    ImportGame {
        bundle: PathBuf,
        #[arg(long)]
        owner: String,
    },
    /// Export a game as a portable bundle (JSON to stdout)
    ExportGame { game_id: String },
    /// Run the edit/open/play gates for a game and print the verdicts
    Check { game_id: String },
    /// Open the poll: create sessions and set status poll_open
    OpenPoll { game_id: String },
    /// Close the poll: close sessions and set status ready
    ClosePoll { game_id: String },
    /// Reset a game for editing (zero points, back to draft)
    ResetEdit { game_id: String },
    /// Seed synthetic votes from a voter record file
    SeedPoll { game_id: String, voters: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting quizstage-content v{}", env!("CARGO_PKG_VERSION"));

    if let Command::ParseText { file } = &cli.command {
        // Parsing needs no database
        return run_parse_text(file);
    }

    let root_folder = resolve_root_folder(cli.root.as_deref());
    let db_path = database_path(&root_folder)?;
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    match cli.command {
        Command::ParseText { .. } => unreachable!(),
        Command::ImportBase { bundle } => {
            let raw = std::fs::read_to_string(&bundle)
                .with_context(|| format!("Failed to read {}", bundle.display()))?;
            let bundle = BaseBundle::from_json(&raw)?;
            let base_id = import_base(&pool, &bundle).await?;
            println!("{}", base_id);
        }
        Command::ImportGame { bundle, owner } => {
            let raw = std::fs::read_to_string(&bundle)
                .with_context(|| format!("Failed to read {}", bundle.display()))?;
            let bundle = GameBundle::from_json(&raw)?;
            let game_id = import_game(&pool, &bundle, &owner).await?;
            println!("{}", game_id);
        }
        Command::ExportGame { game_id } => {
            let bundle = export_game(&pool, &game_id).await?;
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        }
        Command::Check { game_id } => {
            run_check(&pool, &game_id).await?;
        }
        Command::OpenPoll { game_id } => {
            let sessions = open_poll(&pool, &game_id).await?;
            println!("Opened {} poll sessions", sessions.len());
        }
        Command::ClosePoll { game_id } => {
            close_poll(&pool, &game_id).await?;
            println!("Poll closed");
        }
        Command::ResetEdit { game_id } => {
            reset_for_edit(&pool, &game_id).await?;
            println!("Game reset to draft with points zeroed");
        }
        Command::SeedPoll { game_id, voters } => {
            run_seed_poll(&pool, &game_id, &voters).await?;
        }
    }

    Ok(())
}

fn run_parse_text(file: &PathBuf) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let sheet = parse(&raw)?;
    if let Some(name) = &sheet.name {
        println!("Name: {}", name);
    }
    for (index, question) in sheet.items.iter().enumerate() {
        println!("{}. {}", index + 1, question.text);
        for answer in &question.answers {
            match answer.points {
                Some(points) => println!("   - {} ({} pts)", answer.text, points),
                None => println!("   - {}", answer.text),
            }
        }
    }
    Ok(())
}

async fn run_check(pool: &SqlitePool, game_id: &str) -> Result<()> {
    let game: Option<quizstage_common::db::GameRow> = sqlx::query_as(
        "SELECT guid, name, game_type, status, owner_id FROM games WHERE guid = ?",
    )
    .bind(game_id)
    .fetch_optional(pool)
    .await?;
    let game = game.ok_or_else(|| anyhow::anyhow!("Game {} not found", game_id))?;

    print_gate("enter-edit", &can_enter_edit(&game));
    print_gate("open-poll", &validate_poll_ready_to_open(pool, game_id).await?);
    print_gate("start-play", &validate_ready_to_play(pool, game_id).await?);
    Ok(())
}

fn print_gate(label: &str, gate: &Gate) {
    let verdict = if gate.ok { "ok" } else { "blocked" };
    match &gate.reason {
        Some(reason) => println!("{:<12} {} ({})", label, verdict, reason),
        None if gate.needs_reset_warning => {
            println!("{:<12} {} (will reset points to 0 and status to draft)", label, verdict)
        }
        None => println!("{:<12} {}", label, verdict),
    }
}

async fn run_seed_poll(pool: &SqlitePool, game_id: &str, voters_file: &PathBuf) -> Result<()> {
    let game_type: Option<(String,)> =
        sqlx::query_as("SELECT game_type FROM games WHERE guid = ?")
            .bind(game_id)
            .fetch_optional(pool)
            .await?;
    let (game_type,) = game_type.ok_or_else(|| anyhow::anyhow!("Game {} not found", game_id))?;

    let sessions: Vec<PollSessionRow> = sqlx::query_as(
        "SELECT guid, game_id, question_id, question_ord, is_open FROM poll_sessions \
         WHERE game_id = ? ORDER BY question_ord ASC",
    )
    .bind(game_id)
    .fetch_all(pool)
    .await?;
    if sessions.is_empty() {
        anyhow::bail!("Game {} has no poll sessions; run open-poll first", game_id);
    }

    let raw = std::fs::read_to_string(voters_file)
        .with_context(|| format!("Failed to read {}", voters_file.display()))?;

    let written = match game_type.as_str() {
        "poll_text" => {
            let voters: Vec<TextVoter> =
                serde_json::from_str(&raw).context("Invalid text voter records")?;
            seed_text_votes(pool, &sessions, &voters).await?
        }
        "poll_points" => {
            let voters: Vec<PointsVoter> =
                serde_json::from_str(&raw).context("Invalid points voter records")?;
            seed_point_votes(pool, &sessions, &voters).await?
        }
        other => anyhow::bail!("Game type '{}' does not take poll votes", other),
    };

    println!("Seeded {} vote rows", written);
    Ok(())
}
