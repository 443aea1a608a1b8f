//! Chat command grammar
//!
//! An ordered rule list evaluated top to bottom, first match wins.
//! Anything that matches here is handled directly and never reaches the
//! generation path.

#[path = "commands_tests.rs"]
mod commands_tests;

use minecraft_types::FeedbackKind;

/// A matched chat command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Status,
    FollowMe,
    StopMoving,
    /// Bare "bot rate" / "bot feedback" without a parseable rating
    RateHint,
    Rate {
        rating: u8,
        kind: FeedbackKind,
    },
    /// Grammar matched but the rating is outside 1..=5
    RateOutOfRange {
        rating: u8,
    },
}

/// Match a chat line against the command rules.
pub fn route(message: &str) -> Option<Command> {
    let lower = message.trim().to_lowercase();

    if lower.contains("bot help") || lower == "!help" {
        return Some(Command::Help);
    }
    if lower.contains("bot status") || lower == "!status" {
        return Some(Command::Status);
    }
    if lower.contains("bot follow me") {
        return Some(Command::FollowMe);
    }
    if lower.contains("bot stop") {
        return Some(Command::StopMoving);
    }
    // The full rating grammar must win over the bare hint
    if let Some(cmd) = parse_rating(&lower) {
        return Some(cmd);
    }
    if lower.contains("bot rate") || lower.contains("bot feedback") {
        return Some(Command::RateHint);
    }

    None
}

/// Parse `bot rate <n> <kind>` anywhere in an already-lowercased line.
fn parse_rating(lower: &str) -> Option<Command> {
    let rest = lower.split("bot rate ").nth(1)?;
    let mut tokens = rest.split_whitespace();

    let rating: u8 = tokens.next()?.parse().ok()?;
    let kind: FeedbackKind = tokens.next()?.parse().ok()?;

    if (1..=5).contains(&rating) {
        Some(Command::Rate { rating, kind })
    } else {
        Some(Command::RateOutOfRange { rating })
    }
}
