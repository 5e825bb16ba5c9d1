//! Value sanitization for untrusted content fields
//!
//! Single point of truth for the format limits. Every scalar arriving from
//! a bundle, a parsed sheet or the CLI is routed through these helpers
//! before it reaches the database.

use quizstage_common::db::GameType;

/// Maximum length of a game or base name
pub const MAX_NAME_LEN: usize = 80;

/// Maximum length of a question text
pub const MAX_QUESTION_TEXT_LEN: usize = 200;

/// Maximum length of an answer text
pub const MAX_ANSWER_TEXT_LEN: usize = 17;

/// Maximum length of a free-text poll entry
pub const MAX_ENTRY_TEXT_LEN: usize = 80;

/// Inclusive upper bound for answer points
pub const MAX_POINTS: i64 = 100;

/// Clamp a point value into `0..=100`.
///
/// Non-finite input maps to 0; finite input is floored, then clamped.
pub fn clamp_points(v: f64) -> i64 {
    if !v.is_finite() {
        return 0;
    }
    (v.floor() as i64).clamp(0, MAX_POINTS)
}

/// Trim and truncate `s` to at most `max` characters, substituting
/// `default` when the trimmed text is empty.
pub fn clip_text(s: &str, max: usize, default: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return default.to_string();
    }
    trimmed.chars().take(max).collect()
}

/// Map an untrusted type tag to a known [`GameType`], defaulting to the
/// text-poll kind on anything unrecognized.
pub fn normalize_game_type(s: &str) -> GameType {
    GameType::parse(s.trim()).unwrap_or(GameType::PollText)
}

/// Placeholder text for a question imported with empty text (1-based ord)
pub fn question_placeholder(ord: i64) -> String {
    format!("Question {}", ord)
}

/// Placeholder text for an answer imported with empty text (1-based ord)
pub fn answer_placeholder(ord: i64) -> String {
    format!("Answer {}", ord)
}

/// Lowercase, whitespace-collapsed copy of a free-text poll entry,
/// used to group equivalent answers when a poll is compiled.
pub fn normalize_for_grouping(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_points_is_integer_in_range() {
        for v in [-10.0, -0.5, 0.0, 0.4, 1.0, 42.7, 99.99, 100.0, 100.1, 1e9] {
            let p = clamp_points(v);
            assert!((0..=100).contains(&p), "clamp_points({}) = {}", v, p);
        }
        assert_eq!(clamp_points(42.7), 42);
        assert_eq!(clamp_points(-3.0), 0);
        assert_eq!(clamp_points(250.0), 100);
    }

    #[test]
    fn clamp_points_non_finite_is_zero() {
        assert_eq!(clamp_points(f64::NAN), 0);
        assert_eq!(clamp_points(f64::INFINITY), 0);
        assert_eq!(clamp_points(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn clip_text_trims_truncates_defaults() {
        assert_eq!(clip_text("  hello  ", 80, "x"), "hello");
        assert_eq!(clip_text("abcdef", 3, "x"), "abc");
        assert_eq!(clip_text("   ", 80, "fallback"), "fallback");
        assert_eq!(clip_text("", 80, "fallback"), "fallback");
    }

    #[test]
    fn normalize_game_type_defaults_to_text_poll() {
        assert_eq!(normalize_game_type("prepared"), GameType::Prepared);
        assert_eq!(normalize_game_type("poll_points"), GameType::PollPoints);
        assert_eq!(normalize_game_type("poll_text"), GameType::PollText);
        assert_eq!(normalize_game_type("bogus"), GameType::PollText);
        assert_eq!(normalize_game_type(""), GameType::PollText);
    }

    #[test]
    fn normalize_for_grouping_collapses_whitespace() {
        assert_eq!(normalize_for_grouping("  The  Blue\tWhale "), "the blue whale");
    }
}
