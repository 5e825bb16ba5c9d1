//! Text grammar parser for question sheets
//!
//! Converts free-form multi-line text into an ordered list of questions and
//! answers, plus an optional sheet name. The grammar is fixed and small:
//!
//! ```text
//! @Sheet name          (optional, only before the first question)
//! #Question text       (one or more leading '#')
//! 1. Answer text /10   (optional ordinal prefix, optional /points suffix)
//! ```
//!
//! An answer line before the first question is a hard error; empty answers
//! and empty questions are dropped silently.

use crate::sanitize::{clip_text, MAX_ANSWER_TEXT_LEN, MAX_NAME_LEN, MAX_QUESTION_TEXT_LEN};
use thiserror::Error;

/// Parse failure, detected before anything is written anywhere
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An answer line appeared before any `#` question line
    #[error("answer before first question (line {line})")]
    AnswerBeforeQuestion { line: usize },

    /// The input committed zero questions
    #[error("no questions found")]
    NoQuestions,
}

/// One parsed answer line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnswer {
    pub text: String,
    /// Point value from a trailing `/N` suffix, if present
    pub points: Option<i64>,
}

/// One parsed question with its answers in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuestion {
    pub text: String,
    pub answers: Vec<ParsedAnswer>,
}

/// Successful parse result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSheet {
    /// Optional `@name` header taken before the first question
    pub name: Option<String>,
    pub items: Vec<ParsedQuestion>,
}

/// Parse a raw question sheet.
///
/// Line handling, in order:
/// - line endings normalized, each line trimmed with tabs collapsed to spaces
/// - `@text` before the first question sets the sheet name (first one wins;
///   `@` lines after the first question are ignored)
/// - `#text` (any number of leading `#`) starts a new question and commits
///   the previous one; questions whose text is empty are dropped
/// - any other non-empty line is an answer of the current question; if none
///   is open yet, parsing aborts with [`ParseError::AnswerBeforeQuestion`]
/// - zero committed questions is [`ParseError::NoQuestions`]
pub fn parse(input: &str) -> Result<ParsedSheet, ParseError> {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");

    let mut name: Option<String> = None;
    let mut items: Vec<ParsedQuestion> = Vec::new();
    let mut open: Option<ParsedQuestion> = None;

    for (idx, raw_line) in normalized.split('\n').enumerate() {
        let line = raw_line.replace('\t', " ");
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            // New question line; further '#' characters are part of the marker
            let text = rest.trim_start_matches('#').trim();
            commit(&mut items, open.take());
            open = Some(ParsedQuestion {
                text: clip_text(text, MAX_QUESTION_TEXT_LEN, ""),
                answers: Vec::new(),
            });
            continue;
        }

        if let Some(rest) = line.strip_prefix('@') {
            // One-shot header: only meaningful before the first question
            if open.is_none() && items.is_empty() && name.is_none() {
                let candidate = rest.trim();
                if !candidate.is_empty() {
                    name = Some(clip_text(candidate, MAX_NAME_LEN, ""));
                }
            }
            continue;
        }

        let Some(question) = open.as_mut() else {
            return Err(ParseError::AnswerBeforeQuestion { line: idx + 1 });
        };

        if let Some(answer) = parse_answer_line(line) {
            question.answers.push(answer);
        }
    }

    commit(&mut items, open.take());

    if items.is_empty() {
        return Err(ParseError::NoQuestions);
    }

    Ok(ParsedSheet { name, items })
}

/// Commit an open question, keeping it only when its text is non-empty
fn commit(items: &mut Vec<ParsedQuestion>, open: Option<ParsedQuestion>) {
    if let Some(question) = open {
        if !question.text.is_empty() {
            items.push(question);
        }
    }
}

/// Parse one answer line: split an optional `/points` suffix at the last
/// `/`, then strip a leading ordinal prefix (`2) `, `3-`, `10. `).
///
/// Returns `None` when the remaining answer text is empty.
fn parse_answer_line(line: &str) -> Option<ParsedAnswer> {
    let (text_part, points) = match line.rfind('/') {
        Some(pos) => {
            let suffix = line[pos + 1..].trim();
            match parse_points_suffix(suffix) {
                Some(points) => (&line[..pos], Some(points)),
                None => (line, None),
            }
        }
        None => (line, None),
    };

    let text = strip_ordinal_prefix(text_part.trim());
    if text.is_empty() {
        return None;
    }

    Some(ParsedAnswer {
        text: clip_text(text, MAX_ANSWER_TEXT_LEN, ""),
        points,
    })
}

/// A bare number (optionally signed, optionally decimal); anything else
/// means the `/` belonged to the answer text.
fn parse_points_suffix(suffix: &str) -> Option<i64> {
    if suffix.is_empty() {
        return None;
    }
    let value: f64 = suffix.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.floor() as i64)
}

/// Strip a leading ordinal of the form `\d+[.):-]*` plus following spaces
fn strip_ordinal_prefix(text: &str) -> &str {
    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return text;
    }
    let rest = &text[digits..];
    let punct = rest
        .chars()
        .take_while(|c| matches!(c, '.' | ')' | ':' | '-'))
        .count();
    rest[punct..].trim_start()
}
