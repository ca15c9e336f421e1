// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Scoring of a reconstruction against the board it was meant to reproduce.
//!
//! Two squares agree when both are empty or both hold a piece of the same kind
//! and color. There is no partial credit: a knight of the wrong color is as
//! wrong as an empty square.
use std::fmt;

use crate::board::Board;
use crate::types::{Piece, Square};

/// A square on which the attempt disagrees with the original.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub square: Square,
    pub expected: Option<Piece>,
    pub actual: Option<Piece>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn describe(piece: Option<Piece>) -> String {
            piece.map_or_else(|| "empty".to_owned(), |p| p.to_string())
        }

        write!(
            f,
            "{}: expected {}, found {}",
            self.square,
            describe(self.expected),
            describe(self.actual)
        )
    }
}

/// Percentage of the 64 squares on which `attempt` agrees with `original`,
/// rounded half-up to the nearest integer.
pub fn accuracy(original: &Board, attempt: &Board) -> u32 {
    let equal = Square::all()
        .filter(|&sq| original.piece_at(sq) == attempt.piece_at(sq))
        .count() as u32;
    percentage(equal)
}

/// Every square on which `attempt` disagrees with `original`, in board order:
/// rank 8 down to rank 1, the a-file to the h-file within a rank.
pub fn diff(original: &Board, attempt: &Board) -> Vec<Mismatch> {
    original
        .squares()
        .filter_map(|(square, occupant)| {
            let expected = occupant.map(|occ| occ.piece);
            let actual = attempt.piece_at(square);
            if expected == actual {
                None
            } else {
                Some(Mismatch {
                    square,
                    expected,
                    actual,
                })
            }
        })
        .collect()
}

// round(100 * equal / 64), half-up, without going through floating point.
fn percentage(equal: u32) -> u32 {
    (200 * equal + 64) / 128
}

/// The result of scoring one reconstruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub accuracy: u32,
    pub mismatches: Vec<Mismatch>,
}

impl ScoreReport {
    pub fn compare(original: &Board, attempt: &Board) -> ScoreReport {
        let mismatches = diff(original, attempt);
        let accuracy = percentage(64 - mismatches.len() as u32);
        ScoreReport {
            accuracy,
            mismatches,
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.mismatches.is_empty()
    }
}
