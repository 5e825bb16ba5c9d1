//! Import/export bundle wire types
//!
//! Bundles are transient JSON payloads, never persisted verbatim. All
//! identifiers inside an import bundle are caller-supplied opaque tokens
//! (strings or numbers) meaningful only within that one bundle; exported
//! identifiers are never reused as import identifiers.

use quizstage_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Bundle-local identifier: an opaque string or integer token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BundleId {
    Int(i64),
    Str(String),
}

impl std::fmt::Display for BundleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BundleId::Int(v) => write!(f, "{}", v),
            BundleId::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Base import bundle: a category tree, tags, questions and the two
/// association lists, all referencing the bundle's own identifier space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseBundle {
    pub base: BaseMeta,
    pub categories: Vec<CategoryEntry>,
    pub tags: Vec<TagEntry>,
    pub questions: Vec<QuestionEntry>,
    pub question_tags: Vec<QuestionTagEntry>,
    pub category_tags: Vec<CategoryTagEntry>,
}

impl BaseBundle {
    /// Deserialize and shape-check a bundle before anything touches the
    /// store. Missing required top-level keys are rejected, not guessed.
    pub fn from_json(raw: &str) -> Result<BaseBundle> {
        serde_json::from_str(raw).map_err(|e| Error::MalformedBundle(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseMeta {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: BundleId,
    #[serde(default)]
    pub parent_id: Option<BundleId>,
    pub name: String,
    #[serde(default = "default_ord")]
    pub ord: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagEntry {
    pub id: BundleId,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_ord")]
    pub ord: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEntry {
    pub id: BundleId,
    #[serde(default)]
    pub category_id: Option<BundleId>,
    #[serde(default = "default_ord")]
    pub ord: i64,
    /// Opaque payload, stored as-is
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTagEntry {
    pub question_id: BundleId,
    pub tag_id: BundleId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTagEntry {
    pub category_id: BundleId,
    pub tag_id: BundleId,
}

/// Game import/export bundle: metadata plus a flat ordered question →
/// answer ownership chain (no category/tag tree)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBundle {
    pub game: GameMeta,
    pub questions: Vec<GameQuestionEntry>,
}

impl GameBundle {
    /// Deserialize and shape-check a game bundle before any write
    pub fn from_json(raw: &str) -> Result<GameBundle> {
        serde_json::from_str(raw).map_err(|e| Error::MalformedBundle(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub game_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameQuestionEntry {
    pub text: String,
    #[serde(default)]
    pub answers: Vec<GameAnswerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAnswerEntry {
    pub text: String,
    #[serde(default)]
    pub fixed_points: f64,
}

/// Synthetic voter record for text polls: raw answers index-aligned to the
/// game's question order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextVoter {
    pub answers_raw: Vec<String>,
}

/// Synthetic voter record for points polls: answer indices (into each
/// question's persisted answer list) aligned to the question order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsVoter {
    pub picks: Vec<i64>,
}

fn default_ord() -> i64 {
    1
}
