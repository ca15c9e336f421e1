// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Position engine for a blindfold chess trainer: boards and their FEN
//! encoding, random training positions, scoring of reconstructions, and a
//! navigable move history over a chess rules engine.

#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate pest_derive;

mod bitboard;
pub mod board;
pub mod codec;
pub mod data;
pub mod history;
pub mod pgn;
pub mod rules;
pub mod score;
pub mod session;
pub mod synth;
mod types;

pub use bitboard::{Bitboard, BitboardIterator};
pub use board::{Board, Occupant, PieceId, PieceIds};
pub use codec::{decode, encode, Fen, FenParseError, EMPTY_FEN, STARTING_FEN};
pub use history::{BoardStateManager, MoveHistoryEntry, MoveOutcome, ReplayError};
pub use rules::{MoveRequest, RulesEngine, RulesError, StandardRules};
pub use score::{accuracy, diff, Mismatch, ScoreReport};
pub use session::{GameMode, GameSettings, Phase, TickOutcome, TickToken, TrainingSession};
pub use synth::{Difficulty, SynthError, Synthesizer};
pub use types::{CastleStatus, Color, File, ParseSquareError, Piece, PieceKind, Rank, Square};
