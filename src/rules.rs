// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Chess rules. Everything that depends on actual legality (move generation,
//! check detection, algebraic notation) goes through the `RulesEngine` trait,
//! so that the move history never needs to know which engine sits behind it.
use std::fmt;
use std::iter;

use shakmaty::fen::Fen as EngineFen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position, PositionError, Role};

use crate::bitboard::Bitboard;
use crate::types::{Color, PieceKind, Square, TableIndex};

/// A request to move whatever stands on `from` to `to`. `promotion` is only
/// consulted for pawns reaching the last rank; when absent, pawns promote to
/// a queen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> MoveRequest {
        MoveRequest {
            from,
            to,
            promotion: None,
        }
    }

    pub fn promoting(from: Square, to: Square, kind: PieceKind) -> MoveRequest {
        MoveRequest {
            from,
            to,
            promotion: Some(kind),
        }
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }

        Ok(())
    }
}

/// Possible errors reported by a rules engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RulesError {
    /// The FEN could not be parsed, or describes an impossible position.
    InvalidPosition(String),
    /// The move is not legal in the position.
    IllegalMove(MoveRequest),
    /// The move text is not valid algebraic notation, or names no legal move.
    InvalidSan(String),
}

impl fmt::Display for RulesError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RulesError::InvalidPosition(fen) => write!(f, "invalid position: {}", fen),
            RulesError::IllegalMove(mov) => write!(f, "illegal move: {}", mov),
            RulesError::InvalidSan(san) => write!(f, "invalid move: {}", san),
        }
    }
}

impl std::error::Error for RulesError {}

/// A chess rules engine. Positions are opaque to callers; the only way in or
/// out of one is through FEN.
pub trait RulesEngine {
    type Position: Clone;

    fn parse_position(&self, fen: &str) -> Result<Self::Position, RulesError>;
    fn serialize(&self, pos: &Self::Position) -> String;

    /// Squares that the piece on `from` may legally move to. Empty if `from`
    /// is empty or holds a piece of the side not to move.
    fn legal_destinations(&self, pos: &Self::Position, from: Square) -> Bitboard;

    fn apply_move(
        &self,
        pos: &Self::Position,
        mov: MoveRequest,
    ) -> Result<Self::Position, RulesError>;

    /// Standard algebraic notation for a move, as it would be written before
    /// the move is played.
    fn to_standard_algebraic(
        &self,
        pos: &Self::Position,
        mov: MoveRequest,
    ) -> Result<String, RulesError>;

    fn parse_standard_algebraic(
        &self,
        pos: &Self::Position,
        san: &str,
    ) -> Result<MoveRequest, RulesError>;

    fn side_to_move(&self, pos: &Self::Position) -> Color;
    fn is_check(&self, pos: &Self::Position) -> bool;
    fn is_checkmate(&self, pos: &Self::Position) -> bool;
    fn is_stalemate(&self, pos: &Self::Position) -> bool;
}

/// Orthodox chess, backed by `shakmaty`.
#[derive(Copy, Clone, Debug, Default)]
pub struct StandardRules;

impl StandardRules {
    pub fn new() -> StandardRules {
        StandardRules
    }

    /// Finds the legal engine move matching a request. Castling is accepted
    /// both as the king moving two squares and as the king taking its rook,
    /// the same two squares `legal_destinations` reports.
    fn find_move(&self, pos: &Chess, mov: MoveRequest) -> Result<Move, RulesError> {
        let wanted = mov.promotion.map(to_role);
        pos.legal_moves()
            .into_iter()
            .find(|m| {
                if m.from() != Some(to_engine_square(mov.from)) {
                    return false;
                }

                let lands = destination(m) == mov.to || from_engine_square(m.to()) == mov.to;
                lands
                    && match m.promotion() {
                        None => true,
                        Some(role) => role == wanted.unwrap_or(Role::Queen),
                    }
            })
            .ok_or(RulesError::IllegalMove(mov))
    }
}

impl RulesEngine for StandardRules {
    type Position = Chess;

    /// Castling rights the board cannot support and unusable en passant
    /// squares are dropped rather than rejected.
    fn parse_position(&self, fen: &str) -> Result<Chess, RulesError> {
        let invalid = || RulesError::InvalidPosition(fen.to_owned());
        let parsed: EngineFen = fen.trim().parse().map_err(|_| invalid())?;
        parsed
            .into_position(CastlingMode::Standard)
            .or_else(PositionError::ignore_invalid_castling_rights)
            .or_else(PositionError::ignore_invalid_ep_square)
            .map_err(|_| invalid())
    }

    fn serialize(&self, pos: &Chess) -> String {
        EngineFen::from_position(pos.clone(), EnPassantMode::Legal).to_string()
    }

    /// A castling king may also be dropped on its own rook.
    fn legal_destinations(&self, pos: &Chess, from: Square) -> Bitboard {
        let from = to_engine_square(from);
        pos.legal_moves()
            .iter()
            .filter(|m| m.from() == Some(from))
            .flat_map(|m| {
                iter::once(destination(m)).chain(iter::once(from_engine_square(m.to())))
            })
            .collect()
    }

    fn apply_move(&self, pos: &Chess, mov: MoveRequest) -> Result<Chess, RulesError> {
        let m = self.find_move(pos, mov)?;
        let mut next = pos.clone();
        next.play_unchecked(&m);
        Ok(next)
    }

    fn to_standard_algebraic(&self, pos: &Chess, mov: MoveRequest) -> Result<String, RulesError> {
        let m = self.find_move(pos, mov)?;
        let mut scratch = pos.clone();
        Ok(SanPlus::from_move_and_play_unchecked(&mut scratch, &m).to_string())
    }

    fn parse_standard_algebraic(&self, pos: &Chess, san: &str) -> Result<MoveRequest, RulesError> {
        let invalid = || RulesError::InvalidSan(san.to_owned());
        let parsed: SanPlus = san.parse().map_err(|_| invalid())?;
        let m = parsed.san.to_move(pos).map_err(|_| invalid())?;
        let from = m.from().ok_or_else(invalid)?;
        Ok(MoveRequest {
            from: from_engine_square(from),
            to: destination(&m),
            promotion: m.promotion().map(from_role),
        })
    }

    fn side_to_move(&self, pos: &Chess) -> Color {
        match pos.turn() {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }

    fn is_check(&self, pos: &Chess) -> bool {
        pos.is_check()
    }

    fn is_checkmate(&self, pos: &Chess) -> bool {
        pos.is_checkmate()
    }

    fn is_stalemate(&self, pos: &Chess) -> bool {
        pos.is_stalemate()
    }
}

/// Where the moving piece ends up. The engine encodes castling as the king
/// capturing its own rook; players think of it as the king moving two files.
fn destination(m: &Move) -> Square {
    match *m {
        Move::Castle { king, rook } => {
            let file = if rook > king { 6 } else { 2 };
            let rank = from_engine_square(king).y();
            Square::from_coords(file, rank).unwrap_or_else(|| from_engine_square(king))
        }
        _ => from_engine_square(m.to()),
    }
}

// Both sides number squares a1 = 0 through h8 = 63.
fn to_engine_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::new(square.as_index() as u32)
}

fn from_engine_square(square: shakmaty::Square) -> Square {
    Square::from_index(square as usize)
}

fn to_role(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}

fn from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::STARTING_FEN;

    fn start() -> Chess {
        StandardRules.parse_position(STARTING_FEN).unwrap()
    }

    #[test]
    fn starting_position_round_trips() {
        let rules = StandardRules;
        assert_eq!(STARTING_FEN, rules.serialize(&start()));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = StandardRules.parse_position("not a fen").unwrap_err();
        assert_eq!(RulesError::InvalidPosition("not a fen".to_owned()), err);
    }

    #[test]
    fn knight_destinations() {
        let dests = StandardRules.legal_destinations(&start(), Square::G1);
        let mut squares: Vec<_> = dests.iter().collect();
        squares.sort();
        assert_eq!(vec![Square::F3, Square::H3], squares);
        assert!(StandardRules.legal_destinations(&start(), Square::E4).empty());
        assert!(StandardRules.legal_destinations(&start(), Square::E7).empty());
    }

    #[test]
    fn san_before_and_after() {
        let rules = StandardRules;
        let pos = start();
        let mov = MoveRequest::new(Square::E2, Square::E4);
        assert_eq!("e4", rules.to_standard_algebraic(&pos, mov).unwrap());

        let next = rules.apply_move(&pos, mov).unwrap();
        assert_eq!(Color::Black, rules.side_to_move(&next));
        assert_eq!(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
            rules.serialize(&next)
        );
        assert_eq!(
            MoveRequest::new(Square::E7, Square::E5),
            rules.parse_standard_algebraic(&next, "e5").unwrap()
        );
    }

    #[test]
    fn illegal_move_is_rejected() {
        let mov = MoveRequest::new(Square::E2, Square::E5);
        assert_eq!(
            RulesError::IllegalMove(mov),
            StandardRules.apply_move(&start(), mov).unwrap_err()
        );
    }

    #[test]
    fn castling_by_king_destination() {
        let rules = StandardRules;
        let pos = rules
            .parse_position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .unwrap();
        assert!(rules.legal_destinations(&pos, Square::E1).test(Square::G1));

        let mov = MoveRequest::new(Square::E1, Square::G1);
        assert_eq!("O-O", rules.to_standard_algebraic(&pos, mov).unwrap());
        let next = rules.apply_move(&pos, mov).unwrap();
        assert_eq!("r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1", rules.serialize(&next));
    }

    #[test]
    fn castling_by_taking_the_rook() {
        let rules = StandardRules;
        let pos = rules
            .parse_position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .unwrap();
        let dests = rules.legal_destinations(&pos, Square::E1);
        assert!(dests.test(Square::H1));
        assert!(dests.test(Square::A1));

        let mov = MoveRequest::new(Square::E1, Square::A1);
        assert_eq!("O-O-O", rules.to_standard_algebraic(&pos, mov).unwrap());
        let next = rules.apply_move(&pos, mov).unwrap();
        assert_eq!("r3k2r/8/8/8/8/8/8/2KR3R b kq - 1 1", rules.serialize(&next));
    }

    #[test]
    fn unusable_rights_are_dropped() {
        let rules = StandardRules;
        let pos = rules
            .parse_position("4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1")
            .unwrap();
        assert_eq!("4k3/8/8/8/8/8/8/4K3 w - - 0 1", rules.serialize(&pos));

        let pos = rules
            .parse_position("4k3/8/8/8/8/8/8/4K3 w - e6 0 1")
            .unwrap();
        assert_eq!("4k3/8/8/8/8/8/8/4K3 w - - 0 1", rules.serialize(&pos));
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let rules = StandardRules;
        let pos = rules.parse_position("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let queen = MoveRequest::new(Square::E7, Square::E8);
        assert_eq!("e8=Q", rules.to_standard_algebraic(&pos, queen).unwrap());

        let knight = MoveRequest::promoting(Square::E7, Square::E8, PieceKind::Knight);
        assert_eq!("e8=N", rules.to_standard_algebraic(&pos, knight).unwrap());
    }

    #[test]
    fn fools_mate() {
        let rules = StandardRules;
        let mut pos = start();
        for san in &["f3", "e5", "g4", "Qh4#"] {
            let mov = rules.parse_standard_algebraic(&pos, san).unwrap();
            pos = rules.apply_move(&pos, mov).unwrap();
        }

        assert!(rules.is_check(&pos));
        assert!(rules.is_checkmate(&pos));
        assert!(!rules.is_stalemate(&pos));
    }
}
