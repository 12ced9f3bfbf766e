//! Player command grammar: `T<n>: <free text>`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use detective_types::TurnId;

static COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^T([0-9]+):\s*(.+)$").expect("command pattern is valid"));

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("separator pattern is valid"));

/// A well-formed command addressed to a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub turn_id: TurnId,
    /// The free text after the marker, trimmed.
    pub message: String,
}

/// Parse `T<n>: text`. The marker is case-insensitive, the input must be a
/// single line, and turn numbers beyond `u32` are rejected.
#[must_use]
pub fn parse_command(input: &str) -> Option<Command> {
    let captures = COMMAND.captures(input)?;
    let turn = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let message = captures.get(2)?.as_str().trim().to_owned();
    Some(Command {
        turn_id: TurnId::new(turn),
        message,
    })
}

/// Lowercase the message and split it into word tokens.
#[must_use]
pub fn tokenize(message: &str) -> BTreeSet<String> {
    let lowered = message.to_lowercase();
    NON_WORD
        .split(&lowered)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// True when every keyword appears among the tokens. Holds trivially for an
/// empty keyword list.
#[must_use]
pub fn contains_all(tokens: &BTreeSet<String>, keywords: &[String]) -> bool {
    keywords
        .iter()
        .all(|keyword| tokens.contains(&keyword.to_lowercase()))
}

/// True when at least one keyword appears among the tokens.
#[must_use]
pub fn contains_any(tokens: &BTreeSet<String>, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| tokens.contains(&keyword.to_lowercase()))
}
