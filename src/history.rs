// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A linear, navigable log of moves played over a rules-engine position.
//!
//! The manager keeps a cursor into its history. `-1` is the starting position;
//! any other value is the index of the last move applied. Moving the cursor
//! never changes the history. Playing a move while the cursor is behind the
//! end discards every later move before the new one is appended.
//!
//! Each history entry stores the FEN reached after its move, and navigation
//! rebuilds a fresh position from that FEN rather than sharing positions
//! between entries.
use std::fmt;

use crate::codec::STARTING_FEN;
use crate::rules::{RulesEngine, RulesError, StandardRules};
use crate::types::{Color, Square};

pub use crate::rules::MoveRequest;

/// One move that has been played.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHistoryEntry {
    pub ply: usize,
    pub san: String,
    pub fen: String,
    pub from: Square,
    pub to: Square,
}

/// The result of asking the manager to play a move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was played and recorded.
    Played(MoveHistoryEntry),
    /// The move was rejected. Nothing changed.
    Illegal,
}

impl MoveOutcome {
    pub fn is_played(&self) -> bool {
        match self {
            MoveOutcome::Played(_) => true,
            MoveOutcome::Illegal => false,
        }
    }
}

/// A stored FEN failed to parse while navigating. The history was produced by
/// the rules engine itself, so this signals a defect, not bad input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayError {
    pub index: isize,
    pub fen: String,
    pub cause: RulesError,
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "cannot replay position at index {} ({}): {}",
            self.index, self.fen, self.cause
        )
    }
}

impl std::error::Error for ReplayError {}

pub struct BoardStateManager<R: RulesEngine = StandardRules> {
    rules: R,
    start_fen: String,
    position: R::Position,
    history: Vec<MoveHistoryEntry>,
    cursor: isize,
}

impl<R: RulesEngine> BoardStateManager<R> {
    /// Creates a manager at the given starting position, or at the standard
    /// initial position if none is given.
    pub fn new(rules: R, fen: Option<&str>) -> Result<BoardStateManager<R>, RulesError> {
        let start_fen = fen.unwrap_or(STARTING_FEN).trim().to_owned();
        let position = rules.parse_position(&start_fen)?;
        Ok(BoardStateManager {
            rules,
            start_fen,
            position,
            history: Vec::new(),
            cursor: -1,
        })
    }

    /// Discards all history and starts over from a new position. On error the
    /// manager is left as it was.
    pub fn reset(&mut self, fen: Option<&str>) -> Result<(), RulesError> {
        let start_fen = fen.unwrap_or(STARTING_FEN).trim().to_owned();
        let position = self.rules.parse_position(&start_fen)?;
        debug!("resetting move history to {}", start_fen);
        self.start_fen = start_fen;
        self.position = position;
        self.history.clear();
        self.cursor = -1;
        Ok(())
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn position(&self) -> &R::Position {
        &self.position
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    /// The FEN at the cursor: the starting FEN exactly as given at `-1`, and
    /// the recorded FEN of the entry otherwise.
    pub fn current_fen(&self) -> String {
        match self.current_index() {
            None => self.start_fen.clone(),
            Some(idx) => self.history[idx].fen.clone(),
        }
    }

    pub fn history(&self) -> &[MoveHistoryEntry] {
        &self.history
    }

    /// The raw cursor: `-1` at the starting position.
    pub fn cursor(&self) -> isize {
        self.cursor
    }

    /// Index of the last applied move, or `None` at the starting position.
    pub fn current_index(&self) -> Option<usize> {
        if self.cursor < 0 {
            None
        } else {
            Some(self.cursor as usize)
        }
    }

    pub fn side_to_move(&self) -> Color {
        self.rules.side_to_move(&self.position)
    }

    /// Squares the piece on `from` may legally move to, in ascending order.
    pub fn legal_moves(&self, from: Square) -> Vec<Square> {
        self.rules
            .legal_destinations(&self.position, from)
            .iter()
            .collect()
    }

    pub fn is_check(&self) -> bool {
        self.rules.is_check(&self.position)
    }

    pub fn is_checkmate(&self) -> bool {
        self.rules.is_checkmate(&self.position)
    }

    pub fn is_stalemate(&self) -> bool {
        self.rules.is_stalemate(&self.position)
    }

    /// Plays a move from the current position. Any moves after the cursor are
    /// discarded first. Illegal moves leave the manager untouched.
    pub fn make_move(&mut self, mov: MoveRequest) -> MoveOutcome {
        match self.try_move(mov) {
            Ok(entry) => MoveOutcome::Played(entry),
            Err(err) => {
                warn!("rejecting move: {}", err);
                MoveOutcome::Illegal
            }
        }
    }

    /// Plays a move written in standard algebraic notation.
    pub fn make_san_move(&mut self, san: &str) -> Result<MoveHistoryEntry, RulesError> {
        let mov = self.rules.parse_standard_algebraic(&self.position, san)?;
        self.try_move(mov)
    }

    fn try_move(&mut self, mov: MoveRequest) -> Result<MoveHistoryEntry, RulesError> {
        if !self
            .rules
            .legal_destinations(&self.position, mov.from)
            .test(mov.to)
        {
            return Err(RulesError::IllegalMove(mov));
        }

        let san = self.rules.to_standard_algebraic(&self.position, mov)?;
        // A castling king dropped on its rook is recorded on its g or c square.
        let to = self.rules.parse_standard_algebraic(&self.position, &san)?.to;
        let position = self.rules.apply_move(&self.position, mov)?;
        let fen = self.rules.serialize(&position);

        self.history.truncate((self.cursor + 1) as usize);
        let entry = MoveHistoryEntry {
            ply: self.history.len(),
            san,
            fen,
            from: mov.from,
            to,
        };

        debug!("ply {}: {}", entry.ply, entry.san);
        self.history.push(entry.clone());
        self.position = position;
        self.cursor = self.history.len() as isize - 1;
        Ok(entry)
    }

    /// Moves the cursor to `index`, rebuilding the position from the stored
    /// FEN. Returns `Ok(false)` without changing anything if `index` is outside
    /// `-1..history.len()`.
    pub fn go_to_move(&mut self, index: isize) -> Result<bool, ReplayError> {
        if index < -1 || index >= self.history.len() as isize {
            debug!("ignoring navigation to {}", index);
            return Ok(false);
        }

        let fen = if index == -1 {
            &self.start_fen
        } else {
            &self.history[index as usize].fen
        };

        match self.rules.parse_position(fen) {
            Ok(position) => {
                self.position = position;
                self.cursor = index;
                Ok(true)
            }
            Err(cause) => {
                let err = ReplayError {
                    index,
                    fen: fen.clone(),
                    cause,
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    pub fn first(&mut self) -> Result<bool, ReplayError> {
        self.go_to_move(-1)
    }

    pub fn last(&mut self) -> Result<bool, ReplayError> {
        let last = self.history.len() as isize - 1;
        self.go_to_move(last)
    }

    pub fn next(&mut self) -> Result<bool, ReplayError> {
        let next = self.cursor + 1;
        self.go_to_move(next)
    }

    pub fn previous(&mut self) -> Result<bool, ReplayError> {
        let previous = self.cursor - 1;
        self.go_to_move(previous)
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.history.len() as isize - 1
    }

    pub fn has_previous(&self) -> bool {
        self.cursor >= 0
    }
}

impl BoardStateManager<StandardRules> {
    /// A manager for orthodox chess.
    pub fn standard(fen: Option<&str>) -> Result<BoardStateManager<StandardRules>, RulesError> {
        BoardStateManager::new(StandardRules, fen)
    }
}
