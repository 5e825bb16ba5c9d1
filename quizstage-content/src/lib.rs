//! # Quizstage Content Engine
//!
//! Import/export and lifecycle validation for quiz content:
//! - Text grammar parser (free-form question sheets)
//! - Base importer (category tree + tags + questions + associations)
//! - Game importer/editor and export projector
//! - Lifecycle validator (edit / open-poll / play gates)
//! - Poll seeder (synthetic vote insertion)
//!
//! The engine only decides what rows to read/write and whether an operation
//! is allowed; transport, rendering and authentication live elsewhere.

pub mod base_import;
pub mod bundle;
pub mod export;
pub mod game_import;
pub mod lifecycle;
pub mod parser;
pub mod poll_seed;
pub mod sanitize;

pub use base_import::import_base;
pub use export::export_game;
pub use game_import::{import_game, reset_for_edit};
pub use lifecycle::{can_enter_edit, validate_poll_ready_to_open, validate_ready_to_play, Gate};
pub use parser::{parse, ParseError, ParsedSheet};
pub use poll_seed::{close_poll, open_poll, seed_point_votes, seed_text_votes};
