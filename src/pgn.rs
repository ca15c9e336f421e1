// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading and writing games in Portable Game Notation.
use std::fmt;

use pest::Parser;

use crate::history::{BoardStateManager, MoveHistoryEntry};
use crate::rules::{RulesEngine, RulesError};

/// Maximum width of a line of exported movetext.
pub const LINE_WIDTH: usize = 80;

#[derive(Parser)]
#[grammar = "pgn.pest"]
struct PgnParser;

/// Possible errors that can arise when reading a PGN game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PgnError {
    /// The text is not well-formed PGN.
    Syntax(String),
    /// The game's `FEN` tag does not describe a usable position.
    InvalidSetup(RulesError),
    /// A move in the movetext cannot be played. `ply` counts from zero.
    IllegalMove { ply: usize, san: String },
}

impl fmt::Display for PgnError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PgnError::Syntax(msg) => write!(f, "malformed PGN: {}", msg),
            PgnError::InvalidSetup(err) => write!(f, "bad FEN tag: {}", err),
            PgnError::IllegalMove { ply, san } => write!(f, "illegal move {} at ply {}", san, ply),
        }
    }
}

impl std::error::Error for PgnError {}

/// A parsed PGN game: its tag pairs in order of appearance, the moves in
/// standard algebraic notation, and the game termination marker, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PgnGame {
    pub tags: Vec<(String, String)>,
    pub moves: Vec<String>,
    pub result: Option<String>,
}

impl PgnGame {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub fn parse_pgn(text: &str) -> Result<PgnGame, PgnError> {
    let mut pairs =
        PgnParser::parse(Rule::game, text).map_err(|e| PgnError::Syntax(e.to_string()))?;
    let game = match pairs.next() {
        Some(game) => game,
        None => return Ok(PgnGame::default()),
    };

    let mut parsed = PgnGame::default();
    for item in game.into_inner() {
        match item.as_rule() {
            Rule::tag_pair => {
                let mut inner = item.into_inner();
                let key = inner.next().map(|p| p.as_str().to_owned());
                let value = inner.next().map(|p| unquote(p.as_str()));
                if let (Some(key), Some(value)) = (key, value) {
                    parsed.tags.push((key, value));
                }
            }
            Rule::san => parsed.moves.push(normalize_castling(item.as_str())),
            Rule::result => parsed.result = Some(item.as_str().to_owned()),
            _ => {}
        }
    }

    Ok(parsed)
}

/// Extracts the moves of a game, in standard algebraic notation. Move
/// numbers, comments, annotations and variations are dropped.
pub fn parse_movetext(text: &str) -> Result<Vec<String>, PgnError> {
    parse_pgn(text).map(|game| game.moves)
}

/// Plays the moves of a PGN game into a manager. A `FEN` tag resets the
/// manager to that position first; otherwise the moves continue from the
/// manager's cursor. Stops at the first move that cannot be played. Returns
/// the number of moves played.
pub fn import_pgn<R: RulesEngine>(
    manager: &mut BoardStateManager<R>,
    text: &str,
) -> Result<usize, PgnError> {
    let game = parse_pgn(text)?;
    if let Some(fen) = game.tag("FEN") {
        manager.reset(Some(fen)).map_err(PgnError::InvalidSetup)?;
    }

    for (ply, san) in game.moves.iter().enumerate() {
        if let Err(err) = manager.make_san_move(san) {
            warn!("stopping PGN import at ply {}: {}", ply, err);
            return Err(PgnError::IllegalMove {
                ply,
                san: san.clone(),
            });
        }
    }

    Ok(game.moves.len())
}

/// Renders a move history as PGN. Tags are written first, in the order
/// given, followed by a blank line and the numbered movetext. A `Result` tag
/// also terminates the movetext.
pub fn export_pgn(history: &[MoveHistoryEntry], tags: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (key, value) in tags {
        out.push_str(&format!("[{} \"{}\"]\n", key, escape(value)));
    }

    if !tags.is_empty() {
        out.push('\n');
    }

    let (mut number, mut white) = first_move(history);
    let mut tokens = Vec::with_capacity(history.len() + 1);
    for (idx, entry) in history.iter().enumerate() {
        if white {
            tokens.push(format!("{}. {}", number, entry.san));
        } else if idx == 0 {
            tokens.push(format!("{}... {}", number, entry.san));
        } else {
            tokens.push(entry.san.clone());
        }

        if !white {
            number += 1;
        }

        white = !white;
    }

    if let Some((_, result)) = tags.iter().find(|(key, _)| *key == "Result") {
        tokens.push((*result).to_owned());
    }

    out.push_str(&wrap(&tokens, LINE_WIDTH));
    out
}

/// The number of the first move in a history and whether White made it,
/// read back from the position recorded after that move.
fn first_move(history: &[MoveHistoryEntry]) -> (u32, bool) {
    let entry = match history.first() {
        Some(entry) => entry,
        None => return (1, true),
    };

    let fields: Vec<&str> = entry.fen.split_whitespace().collect();
    let fullmove = fields
        .get(5)
        .and_then(|n| n.parse::<u32>().ok())
        .unwrap_or(1);
    match fields.get(1) {
        // White is to move again, so Black made the first move.
        Some(&"w") => (fullmove.saturating_sub(1).max(1), false),
        _ => (fullmove, true),
    }
}

fn wrap(tokens: &[String], width: usize) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();
    for token in tokens {
        if !line.is_empty() && line.len() + 1 + token.len() > width {
            lines.push(std::mem::replace(&mut line, String::new()));
        }

        if !line.is_empty() {
            line.push(' ');
        }

        line.push_str(token);
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

// Castling is sometimes written with zeros.
fn normalize_castling(san: &str) -> String {
    if san.starts_with("0-0") {
        san.replace('0', "O")
    } else {
        san.to_owned()
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    inner.replace("\\\"", "\"").replace("\\\\", "\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movetext_with_noise() {
        let moves = parse_movetext(
            "1. e4 {king's pawn} e5 2. Nf3!? (2. f4 exf4) Nc6 $1 3. Bb5 a6 4. Ba4 Nf6 5. O-O 1-0",
        )
        .unwrap();
        assert_eq!(
            vec!["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6", "O-O"],
            moves
        );
    }

    #[test]
    fn nag_before_move_number() {
        let moves = parse_movetext("1. e4 $1 e5 $2 2. Nf3 $14 Nc6 $10\n3. Bb5").unwrap();
        assert_eq!(vec!["e4", "e5", "Nf3", "Nc6", "Bb5"], moves);
    }

    #[test]
    fn castling_with_zeros() {
        let game = parse_pgn("10. 0-0 0-0-0+ 11. Kh1 0-1").unwrap();
        assert_eq!(vec!["O-O", "O-O-O+", "Kh1"], game.moves);
        assert_eq!(Some("0-1".to_owned()), game.result);
    }

    #[test]
    fn tags_and_result() {
        let game = parse_pgn("[Event \"Casual\"]\n[White \"A \\\"B\\\" C\"]\n\n1. d4 d5 1/2-1/2\n")
            .unwrap();
        assert_eq!(Some("Casual"), game.tag("Event"));
        assert_eq!(Some("A \"B\" C"), game.tag("White"));
        assert_eq!(None, game.tag("Black"));
        assert_eq!(vec!["d4", "d5"], game.moves);
        assert_eq!(Some("1/2-1/2".to_owned()), game.result);
    }

    #[test]
    fn disambiguation_and_promotion() {
        let moves = parse_movetext("23. Rae1 Nbd7 24. R1e2 exd5 25. Qh4xe1 b8=Q+ 26. O-O-O#").unwrap();
        assert_eq!(
            vec!["Rae1", "Nbd7", "R1e2", "exd5", "Qh4xe1", "b8=Q+", "O-O-O#"],
            moves
        );
    }

    #[test]
    fn garbage_is_a_syntax_error() {
        match parse_movetext("1. e4 %%%") {
            Err(PgnError::Syntax(_)) => {}
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    fn entry(ply: usize, san: &str, fen: &str) -> MoveHistoryEntry {
        use crate::types::Square;
        MoveHistoryEntry {
            ply,
            san: san.to_owned(),
            fen: fen.to_owned(),
            from: Square::A1,
            to: Square::A2,
        }
    }

    #[test]
    fn export_numbers_moves() {
        let history = vec![
            entry(0, "e4", "x b KQkq - 0 1"),
            entry(1, "e5", "x w KQkq - 0 2"),
            entry(2, "Nf3", "x b KQkq - 1 2"),
        ];
        assert_eq!("1. e4 e5 2. Nf3", export_pgn(&history, &[]));
        assert_eq!(
            "[Event \"Test\"]\n[Result \"*\"]\n\n1. e4 e5 2. Nf3 *",
            export_pgn(&history, &[("Event", "Test"), ("Result", "*")])
        );
    }

    #[test]
    fn export_black_first() {
        let history = vec![
            entry(0, "Kd7", "x w - - 1 13"),
            entry(1, "Kd2", "x b - - 2 13"),
        ];
        assert_eq!("12... Kd7 13. Kd2", export_pgn(&history, &[]));
    }

    #[test]
    fn export_wraps_lines() {
        let history: Vec<_> = (0..60)
            .map(|ply| {
                let side = if ply % 2 == 0 { "b" } else { "w" };
                entry(ply, "Nf3", &format!("x {} - - 0 1", side))
            })
            .collect();
        let text = export_pgn(&history, &[]);
        assert!(text.lines().count() > 1);
        assert!(text.lines().all(|line| line.len() <= LINE_WIDTH));
        assert!(text.starts_with("1. Nf3 Nf3 2. Nf3"));
    }
}
