// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Random training positions.
//!
//! A synthesized position is meant to be looked at and remembered, not
//! played. Apart from keeping the kings apart and pawns off the back ranks,
//! no chess legality is enforced: several queens, lopsided material and
//! kings standing in check are all fine.
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

use crate::bitboard::{Bitboard, BB_BACK_RANKS};
use crate::board::{Board, PieceIds};
use crate::types::{Color, Piece, PieceKind, Square, TableIndex, SCATTER_KINDS};

/// Number of random draws made for a square before falling back to scanning
/// the board in order.
pub const MAX_ATTEMPTS: u32 = 256;

/// Training difficulty. Each tier fixes how many pieces are scattered around
/// the two kings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Number of pieces placed in addition to the two kings.
    pub fn extra_piece_range(self) -> RangeInclusive<usize> {
        match self {
            Difficulty::Easy => 2..=4,
            Difficulty::Medium => 5..=8,
            Difficulty::Hard => 9..=14,
        }
    }

    /// Number of pieces on the board, kings included.
    pub fn total_piece_range(self) -> RangeInclusive<usize> {
        let extra = self.extra_piece_range();
        (extra.start() + 2)..=(extra.end() + 2)
    }

    pub fn label(self) -> String {
        let total = self.total_piece_range();
        format!("{}-{} pieces", total.start(), total.end())
    }

    /// Seconds a trainee gets to study a position of this difficulty.
    pub fn default_memorize_time(self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 15,
            Difficulty::Hard => 30,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Difficulty {
        Difficulty::Easy
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Difficulty, String> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("unknown difficulty: {}", s)),
        }
    }
}

/// Possible errors that can arise when synthesizing a position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SynthError {
    /// More pieces were requested than there are free squares.
    BoardFull { requested: usize, available: usize },
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SynthError::BoardFull {
                requested,
                available,
            } => write!(
                f,
                "cannot place {} pieces, only {} squares are free",
                requested, available
            ),
        }
    }
}

impl std::error::Error for SynthError {}

/// Generator of random training positions.
pub struct Synthesizer<R> {
    rng: R,
}

impl Synthesizer<ThreadRng> {
    pub fn from_entropy() -> Synthesizer<ThreadRng> {
        Synthesizer::new(rand::thread_rng())
    }
}

impl Synthesizer<StdRng> {
    /// A synthesizer that produces the same sequence of boards for the same seed.
    pub fn seeded(seed: u64) -> Synthesizer<StdRng> {
        Synthesizer::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Synthesizer<R> {
    pub fn new(rng: R) -> Synthesizer<R> {
        Synthesizer { rng }
    }

    /// Generates a board for the given difficulty: two non-adjacent kings plus
    /// a piece count drawn uniformly from the difficulty's range.
    pub fn generate(
        &mut self,
        difficulty: Difficulty,
        ids: &mut PieceIds,
    ) -> Result<Board, SynthError> {
        let range = difficulty.extra_piece_range();
        let extra = self.rng.gen_range(*range.start(), *range.end() + 1);
        debug!("synthesizing {} board with {} extra pieces", difficulty, extra);
        self.generate_with_count(extra, ids)
    }

    /// Generates a board with two non-adjacent kings and exactly `extra`
    /// further pieces.
    pub fn generate_with_count(
        &mut self,
        extra: usize,
        ids: &mut PieceIds,
    ) -> Result<Board, SynthError> {
        if extra > 62 {
            return Err(SynthError::BoardFull {
                requested: extra,
                available: 62,
            });
        }

        let mut board = Board::empty();
        let white_king = self.random_square();
        board.place(
            white_king,
            Piece::new(PieceKind::King, Color::White),
            ids.next_id(),
        );

        // The black king may go anywhere outside the white king's zone. The
        // zone has at most nine squares, so a candidate always exists.
        let allowed = !Bitboard::king_zone(white_king);
        let black_king = self.pick_square(allowed);
        board.place(
            black_king,
            Piece::new(PieceKind::King, Color::Black),
            ids.next_id(),
        );

        for _ in 0..extra {
            let (square, piece) = self.scatter_one(board.occupancy());
            board.place(square, piece, ids.next_id());
        }

        Ok(board)
    }

    fn random_square(&mut self) -> Square {
        Square::from_index(self.rng.gen_range(0, 64))
    }

    fn random_piece(&mut self) -> Piece {
        let kind = SCATTER_KINDS[self.rng.gen_range(0, SCATTER_KINDS.len())];
        let color = if self.rng.gen_bool(0.5) {
            Color::White
        } else {
            Color::Black
        };
        Piece::new(kind, color)
    }

    /// Rejection-samples a square from `allowed`, falling back to the lowest
    /// allowed square. `allowed` must not be empty.
    fn pick_square(&mut self, allowed: Bitboard) -> Square {
        for _ in 0..MAX_ATTEMPTS {
            let square = self.random_square();
            if allowed.test(square) {
                return square;
            }
        }

        debug!("no square drawn after {} attempts, scanning", MAX_ATTEMPTS);
        allowed.iter().next().unwrap_or(Square::A1)
    }

    /// Draws one non-king piece and an empty square it may stand on. Pawns are
    /// kept off the first and eighth ranks. Rejected draws do not consume the
    /// slot; they are simply redrawn.
    fn scatter_one(&mut self, occupied: Bitboard) -> (Square, Piece) {
        let empty = !occupied;
        for _ in 0..MAX_ATTEMPTS {
            let square = self.random_square();
            let piece = self.random_piece();
            if !empty.test(square) {
                continue;
            }

            if piece.kind == PieceKind::Pawn && BB_BACK_RANKS.test(square) {
                continue;
            }

            return (square, piece);
        }

        debug!("no piece placed after {} attempts, scanning", MAX_ATTEMPTS);
        let square = empty.iter().next().unwrap_or(Square::A1);
        let mut piece = self.random_piece();
        while piece.kind == PieceKind::Pawn && BB_BACK_RANKS.test(square) {
            piece = self.random_piece();
        }

        (square, piece)
    }
}
