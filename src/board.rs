// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The board a trainee studies and reconstructs. Unlike a rules-engine
//! position, a `Board` carries no side to move, castling rights, or any notion
//! of legality: it is sixty-four cells, each either empty or holding one piece.
use std::fmt;

use crate::bitboard::Bitboard;
use crate::types::{Piece, Square, TableIndex, FILES, RANKS};

lazy_static! {
    /// Squares in storage order: rank 8 down to rank 1, file a to file h
    /// within each rank. Every board traversal that is visible to callers
    /// (FEN encoding, diffs) walks the board in this order.
    pub static ref BOARD_ORDER: [Square; 64] = {
        let mut order = [Square::A1; 64];
        let mut idx = 0;
        for &rank in RANKS.iter().rev() {
            for &file in &FILES {
                order[idx] = Square::of(rank, file);
                idx += 1;
            }
        }

        order
    };
}

/// Opaque identity of a piece on a board, used by front ends to track a piece
/// across redraws. Identity never participates in board comparison.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceId(u64);

impl PieceId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A session-scoped source of piece identities. Whoever owns the session owns
/// one of these and threads it through every operation that spawns pieces.
#[derive(Clone, Debug, Default)]
pub struct PieceIds {
    next: u64,
}

impl PieceIds {
    pub fn new() -> PieceIds {
        PieceIds::default()
    }

    pub fn next_id(&mut self) -> PieceId {
        let id = PieceId(self.next);
        self.next += 1;
        id
    }
}

/// A piece standing on a board, along with its identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub piece: Piece,
    pub id: PieceId,
}

#[derive(Clone)]
pub struct Board {
    cells: [Option<Occupant>; 64],
}

impl Board {
    /// Constructs a board with all sixty-four squares empty.
    pub fn empty() -> Board {
        Board { cells: [None; 64] }
    }

    /// Constructs a board holding the given pieces, drawing an identity for
    /// each from `ids`. Later entries for the same square replace earlier ones.
    pub fn from_pieces<I>(pieces: I, ids: &mut PieceIds) -> Board
    where
        I: IntoIterator<Item = (Square, Piece)>,
    {
        let mut board = Board::empty();
        for (square, piece) in pieces {
            board.place(square, piece, ids.next_id());
        }

        board
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.cells[square.as_index()].map(|occ| occ.piece)
    }

    pub fn occupant(&self, square: Square) -> Option<Occupant> {
        self.cells[square.as_index()]
    }

    /// Puts a piece on a square, returning whatever was standing there before.
    pub fn place(&mut self, square: Square, piece: Piece, id: PieceId) -> Option<Occupant> {
        self.cells[square.as_index()].replace(Occupant { piece, id })
    }

    /// Lifts the piece off a square, if there is one.
    pub fn remove(&mut self, square: Square) -> Option<Occupant> {
        self.cells[square.as_index()].take()
    }

    /// Moves whatever stands on `from` to `to`, replacing anything already on
    /// `to`. Returns false, leaving the board untouched, if `from` is empty or
    /// the two squares are the same.
    pub fn move_piece(&mut self, from: Square, to: Square) -> bool {
        if from == to {
            return false;
        }

        match self.remove(from) {
            Some(occupant) => {
                self.cells[to.as_index()] = Some(occupant);
                true
            }
            None => false,
        }
    }

    /// Empties every square.
    pub fn clear(&mut self) {
        self.cells = [None; 64];
    }

    /// The set of occupied squares.
    pub fn occupancy(&self) -> Bitboard {
        Square::all().filter(|&sq| self.cells[sq.as_index()].is_some()).collect()
    }

    /// The set of squares holding exactly this piece.
    pub fn squares_with(&self, piece: Piece) -> Bitboard {
        Square::all()
            .filter(|&sq| self.piece_at(sq) == Some(piece))
            .collect()
    }

    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Walks the board in storage order (rank 8 to rank 1, a-file to h-file).
    pub fn squares<'a>(&'a self) -> impl Iterator<Item = (Square, Option<Occupant>)> + 'a {
        BOARD_ORDER
            .iter()
            .map(move |&sq| (sq, self.cells[sq.as_index()]))
    }

    /// Whether two boards hold the same kind and color of piece on every
    /// square. Piece identities are ignored.
    pub fn same_placement(&self, other: &Board) -> bool {
        Square::all().all(|sq| self.piece_at(sq) == other.piece_at(sq))
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::empty()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.same_placement(other)
    }
}

impl Eq for Board {}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Board")
            .field("placement", &crate::codec::encode_placement(self))
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &rank in RANKS.iter().rev() {
            for &file in &FILES {
                match self.piece_at(Square::of(rank, file)) {
                    Some(piece) => write!(f, " {} ", piece)?,
                    None => write!(f, " . ")?,
                }
            }

            writeln!(f, "| {}", rank)?;
        }

        for _ in &FILES {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for &file in &FILES {
            write!(f, " {} ", file)?;
        }

        writeln!(f)
    }
}
