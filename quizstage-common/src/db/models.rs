//! Database row models and the game type/status enums

use serde::{Deserialize, Serialize};

/// Game kind, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// Hand-authored questions with pre-assigned answer points
    Prepared,
    /// Audience submits free-text answers during an open poll
    PollText,
    /// Audience picks among pre-seeded answers during an open poll
    PollPoints,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Prepared => "prepared",
            GameType::PollText => "poll_text",
            GameType::PollPoints => "poll_points",
        }
    }

    pub fn parse(s: &str) -> Option<GameType> {
        match s {
            "prepared" => Some(GameType::Prepared),
            "poll_text" => Some(GameType::PollText),
            "poll_points" => Some(GameType::PollPoints),
            _ => None,
        }
    }

    /// True for the two audience-poll kinds
    pub fn is_poll(&self) -> bool {
        matches!(self, GameType::PollText | GameType::PollPoints)
    }
}

/// Lifecycle status of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Draft,
    PollOpen,
    Ready,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Draft => "draft",
            GameStatus::PollOpen => "poll_open",
            GameStatus::Ready => "ready",
        }
    }

    pub fn parse(s: &str) -> Option<GameStatus> {
        match s {
            "draft" => Some(GameStatus::Draft),
            "poll_open" => Some(GameStatus::PollOpen),
            "ready" => Some(GameStatus::Ready),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BaseRow {
    pub guid: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryRow {
    pub guid: String,
    pub base_id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub ord: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagRow {
    pub guid: String,
    pub base_id: String,
    pub name: String,
    pub color: String,
    pub ord: i64,
}

/// Question owned by a base; carries an opaque JSON payload
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BaseQuestionRow {
    pub guid: String,
    pub base_id: String,
    pub category_id: Option<String>,
    pub ord: i64,
    pub payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameRow {
    pub guid: String,
    pub name: String,
    pub game_type: String,
    pub status: String,
    pub owner_id: String,
}

impl GameRow {
    /// Typed view of the `game_type` column
    pub fn game_type(&self) -> Option<GameType> {
        GameType::parse(&self.game_type)
    }

    /// Typed view of the `status` column
    pub fn status(&self) -> Option<GameStatus> {
        GameStatus::parse(&self.status)
    }
}

/// Question owned by a game; answers hang off it by `question_id`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameQuestionRow {
    pub guid: String,
    pub game_id: String,
    pub ord: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameAnswerRow {
    pub guid: String,
    pub question_id: String,
    pub ord: i64,
    pub text: String,
    pub fixed_points: i64,
}

/// Per-question record marking a poll question open for voting
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PollSessionRow {
    pub guid: String,
    pub game_id: String,
    pub question_id: String,
    pub question_ord: i64,
    pub is_open: bool,
}
