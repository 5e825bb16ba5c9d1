//! # Quizstage Common Library
//!
//! Shared code for the quizstage content tools including:
//! - Error types
//! - Database schema initialization and row models
//! - Configuration / root folder resolution

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
