//! Parsing of move commands out of free-form issue text.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::board::Coordinate;

/// Error extracting a move from issue text.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum CommandError {
    /// Neither the title nor the body holds a move command.
    #[error("Invalid move format. Use `/move B4` or `Move: B4`.")]
    NoMoveCommand,
    /// A move command was found but its cell couldn't be read.
    #[error("`{0}` is not a valid cell. Use format like A1, B10, J5")]
    InvalidCell(String),
}

/// Find the move command in an issue, looking at the title before the body. Accepts
/// `/move B4` and `Move: B4` in any case.
pub fn parse_move(title: &str, body: &str) -> Result<Coordinate, CommandError> {
    /// Matcher for a move command and the cell it names.
    static MOVE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)(?:/move|move:)\s*([A-J](?:10|[1-9]))").unwrap());

    let cell = [title, body]
        .iter()
        .copied()
        .find_map(|text| MOVE.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(CommandError::NoMoveCommand)?;
    cell.parse()
        .map_err(|_| CommandError::InvalidCell(cell.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(title: &str, body: &str) -> Result<String, CommandError> {
        parse_move(title, body).map(|c| c.to_string())
    }

    #[test]
    fn accepts_both_forms_in_any_case() {
        assert_eq!(parsed("/move B4", ""), Ok("B4".into()));
        assert_eq!(parsed("Move: j10", ""), Ok("J10".into()));
        assert_eq!(parsed("MOVE:c7", ""), Ok("C7".into()));
        assert_eq!(parsed("please /Move   a1 thanks", ""), Ok("A1".into()));
    }

    #[test]
    fn title_wins_over_body() {
        assert_eq!(parsed("/move B4", "/move C5"), Ok("B4".into()));
        assert_eq!(parsed("my move", "Move: C5"), Ok("C5".into()));
    }

    #[test]
    fn missing_command() {
        assert_eq!(parsed("B4", "fire at B4"), Err(CommandError::NoMoveCommand));
        assert_eq!(parsed("", ""), Err(CommandError::NoMoveCommand));
    }

    #[test]
    fn cells_off_the_board() {
        assert_eq!(parsed("/move K5", ""), Err(CommandError::NoMoveCommand));
        assert_eq!(parsed("/move A0", ""), Err(CommandError::NoMoveCommand));
        assert_eq!(parsed("/move K5", "Move: D6"), Ok("D6".into()));
    }

    #[test]
    fn longest_valid_column_wins() {
        assert_eq!(parsed("/move B10", ""), Ok("B10".into()));
        assert_eq!(parsed("/move B100", ""), Ok("B10".into()));
        assert_eq!(parsed("/move b11", ""), Ok("B1".into()));
        assert_eq!(parsed("/move J9x", ""), Ok("J9".into()));
    }
}
