// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! FEN reading and writing for training boards.
//!
//! The placement field (the first of FEN's six fields) is all a training board
//! needs, so `decode` reads only that and ignores whatever follows it. `Fen`
//! handles the complete six-field record for callers that need the side to
//! move, castling rights, en-passant target and the two clocks as well.
use std::convert::TryFrom;
use std::fmt::{self, Write};

use crate::board::{Board, PieceIds};
use crate::types::{CastleStatus, Color, File, Piece, Rank, Square, FILES, RANKS};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const EMPTY_FEN: &str = "8/8/8/8/8/8/8/8 w - - 0 1";

/// Possible errors that can arise when parsing a FEN string.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FenParseError {
    UnexpectedChar(char),
    UnexpectedEnd,
    InvalidDigit(char),
    WrongRankCount(usize),
    RankOverflow(Rank),
    RankUnderflow(Rank),
    UnknownPiece(char),
    InvalidSideToMove,
    InvalidCastle,
    InvalidEnPassant,
    EmptyHalfmove,
    InvalidHalfmove,
    EmptyFullmove,
    InvalidFullmove,
}

impl fmt::Display for FenParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FenParseError::UnexpectedChar(c) => write!(f, "unexpected character {:?}", c),
            FenParseError::UnexpectedEnd => write!(f, "unexpected end of FEN"),
            FenParseError::InvalidDigit(c) => write!(f, "empty-square count {:?} is not 1-8", c),
            FenParseError::WrongRankCount(n) => write!(f, "expected 8 ranks, found {}", n),
            FenParseError::RankOverflow(rank) => write!(f, "rank {} describes more than 8 files", rank),
            FenParseError::RankUnderflow(rank) => write!(f, "rank {} describes fewer than 8 files", rank),
            FenParseError::UnknownPiece(c) => write!(f, "unknown piece {:?}", c),
            FenParseError::InvalidSideToMove => write!(f, "side to move must be 'w' or 'b'"),
            FenParseError::InvalidCastle => write!(f, "invalid castling rights"),
            FenParseError::InvalidEnPassant => write!(f, "invalid en-passant square"),
            FenParseError::EmptyHalfmove => write!(f, "missing halfmove clock"),
            FenParseError::InvalidHalfmove => write!(f, "invalid halfmove clock"),
            FenParseError::EmptyFullmove => write!(f, "missing fullmove number"),
            FenParseError::InvalidFullmove => write!(f, "invalid fullmove number"),
        }
    }
}

impl std::error::Error for FenParseError {}

/// Decodes the placement field of a FEN string into a board, drawing piece
/// identities from `ids`. Anything after the first whitespace is ignored, so
/// both bare placements and complete FEN records are accepted.
///
/// Every rank must describe exactly eight files; malformed input is reported
/// rather than producing a partially-filled board.
pub fn decode(fen: &str, ids: &mut PieceIds) -> Result<Board, FenParseError> {
    let placement = fen
        .split_whitespace()
        .next()
        .ok_or(FenParseError::UnexpectedEnd)?;

    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(FenParseError::WrongRankCount(rows.len()));
    }

    let mut board = Board::empty();
    for (row, &rank) in rows.iter().zip(RANKS.iter().rev()) {
        let mut file = 0usize;
        for c in row.chars() {
            // digits 1 through 8 indicate runs of empty squares.
            if c.is_ascii_digit() {
                if c < '1' || c > '8' {
                    return Err(FenParseError::InvalidDigit(c));
                }

                file += c as usize - '0' as usize;
                if file > 8 {
                    return Err(FenParseError::RankOverflow(rank));
                }

                continue;
            }

            // anything else has to be a piece, and it has to fit on the rank.
            let piece = Piece::try_from(c).map_err(|_| FenParseError::UnknownPiece(c))?;
            if file >= 8 {
                return Err(FenParseError::RankOverflow(rank));
            }

            let square = Square::of(rank, FILES[file]);
            board.place(square, piece, ids.next_id());
            file += 1;
        }

        if file < 8 {
            return Err(FenParseError::RankUnderflow(rank));
        }
    }

    Ok(board)
}

/// Encodes a board's placement field: ranks 8 through 1 joined by `/`, with
/// runs of empty squares collapsed into digits.
pub fn encode_placement(board: &Board) -> String {
    let mut buf = String::with_capacity(64);
    let mut empty_squares = 0;
    for (idx, (_, occupant)) in board.squares().enumerate() {
        if let Some(occupant) = occupant {
            if empty_squares != 0 {
                write!(&mut buf, "{}", empty_squares).unwrap();
                empty_squares = 0;
            }

            buf.push(occupant.piece.to_char());
        } else {
            empty_squares += 1;
        }

        if idx % 8 == 7 {
            if empty_squares != 0 {
                write!(&mut buf, "{}", empty_squares).unwrap();
                empty_squares = 0;
            }

            if idx != 63 {
                buf.push('/');
            }
        }
    }

    buf
}

/// Encodes a board together with the five trailing FEN fields, which are
/// written verbatim. Empty castling rights are written as `-`.
pub fn encode(
    board: &Board,
    side_to_move: Color,
    castling: CastleStatus,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
) -> String {
    let mut buf = encode_placement(board);
    write!(&mut buf, " {} {} ", side_to_move, castling).unwrap();
    match en_passant {
        Some(square) => write!(&mut buf, "{}", square).unwrap(),
        None => buf.push('-'),
    }

    write!(&mut buf, " {} {}", halfmove_clock, fullmove_number).unwrap();
    buf
}

/// A complete six-field FEN record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fen {
    pub board: Board,
    pub side_to_move: Color,
    pub castling: CastleStatus,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Fen {
    /// Wraps a board with White to move, no castling rights, no en-passant
    /// target, and fresh clocks.
    pub fn new(board: Board) -> Fen {
        Fen {
            board,
            side_to_move: Color::White,
            castling: CastleStatus::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parses all six fields of a FEN string.
    pub fn parse(fen: &str, ids: &mut PieceIds) -> Result<Fen, FenParseError> {
        use std::iter::Peekable;
        use std::str::Chars;

        type Stream<'a> = Peekable<Chars<'a>>;

        fn eat(iter: &mut Stream, expected: char) -> Result<(), FenParseError> {
            match iter.next() {
                Some(c) if c == expected => Ok(()),
                Some(c) => Err(FenParseError::UnexpectedChar(c)),
                None => Err(FenParseError::UnexpectedEnd),
            }
        }

        fn peek(iter: &mut Stream) -> Result<char, FenParseError> {
            iter.peek().cloned().ok_or(FenParseError::UnexpectedEnd)
        }

        fn eat_side_to_move(iter: &mut Stream) -> Result<Color, FenParseError> {
            let side = Color::try_from(peek(iter)?).map_err(|_| FenParseError::InvalidSideToMove)?;
            iter.next();
            Ok(side)
        }

        fn eat_castle_status(iter: &mut Stream) -> Result<CastleStatus, FenParseError> {
            if peek(iter)? == '-' {
                iter.next();
                return Ok(CastleStatus::NONE);
            }

            let mut status = CastleStatus::NONE;
            for _ in 0..4 {
                match iter.peek().cloned() {
                    Some('K') => status |= CastleStatus::WHITE_KINGSIDE,
                    Some('k') => status |= CastleStatus::BLACK_KINGSIDE,
                    Some('Q') => status |= CastleStatus::WHITE_QUEENSIDE,
                    Some('q') => status |= CastleStatus::BLACK_QUEENSIDE,
                    Some(' ') | None => break,
                    Some(_) => return Err(FenParseError::InvalidCastle),
                }

                iter.next();
            }

            if status.is_empty() {
                return Err(FenParseError::InvalidCastle);
            }

            Ok(status)
        }

        fn eat_en_passant(iter: &mut Stream) -> Result<Option<Square>, FenParseError> {
            if peek(iter)? == '-' {
                iter.next();
                return Ok(None);
            }

            let file = File::try_from(peek(iter)?).map_err(|_| FenParseError::InvalidEnPassant)?;
            iter.next();
            let rank = Rank::try_from(peek(iter)?).map_err(|_| FenParseError::InvalidEnPassant)?;
            iter.next();
            Ok(Some(Square::of(rank, file)))
        }

        fn eat_number(
            iter: &mut Stream,
            empty: FenParseError,
            invalid: FenParseError,
        ) -> Result<u32, FenParseError> {
            let mut buf = String::new();
            while let Some(&c) = iter.peek() {
                if !c.is_ascii_digit() {
                    break;
                }

                buf.push(c);
                iter.next();
            }

            if buf.is_empty() {
                return Err(empty);
            }

            buf.parse::<u32>().map_err(|_| invalid)
        }

        let fen = fen.trim();
        let split = fen.find(' ').ok_or(FenParseError::UnexpectedEnd)?;
        let board = decode(&fen[..split], ids)?;

        let iter = &mut fen[split..].chars().peekable();
        eat(iter, ' ')?;
        let side_to_move = eat_side_to_move(iter)?;
        eat(iter, ' ')?;
        let castling = eat_castle_status(iter)?;
        eat(iter, ' ')?;
        let en_passant = eat_en_passant(iter)?;
        eat(iter, ' ')?;
        let halfmove_clock =
            eat_number(iter, FenParseError::EmptyHalfmove, FenParseError::InvalidHalfmove)?;
        eat(iter, ' ')?;
        let fullmove_number =
            eat_number(iter, FenParseError::EmptyFullmove, FenParseError::InvalidFullmove)?;
        if let Some(c) = iter.next() {
            return Err(FenParseError::UnexpectedChar(c));
        }

        Ok(Fen {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&encode(
            &self.board,
            self.side_to_move,
            self.castling,
            self.en_passant,
            self.halfmove_clock,
            self.fullmove_number,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn decode_fresh(fen: &str) -> Result<Board, FenParseError> {
        decode(fen, &mut PieceIds::new())
    }

    #[test]
    fn empty_board() {
        let board = decode_fresh(EMPTY_FEN).unwrap();
        assert_eq!(0, board.piece_count());
        assert_eq!(64, board.squares().count());
    }

    #[test]
    fn starting_position() {
        let board = decode_fresh(STARTING_FEN).unwrap();
        assert_eq!(32, board.piece_count());
        assert_eq!(
            Some(Piece::new(PieceKind::King, Color::White)),
            board.piece_at(Square::E1)
        );
        assert_eq!(
            Some(Piece::new(PieceKind::Queen, Color::Black)),
            board.piece_at(Square::D8)
        );
        for sq in (Square::A3 as usize)..(Square::A7 as usize) {
            assert!(board.piece_at(crate::types::TableIndex::from_index(sq)).is_none());
        }
    }

    #[test]
    fn starting_position_encodes_identically() {
        let board = decode_fresh(STARTING_FEN).unwrap();
        let fen = encode(
            &board,
            Color::White,
            CastleStatus::WHITE | CastleStatus::BLACK,
            None,
            0,
            1,
        );
        assert_eq!(STARTING_FEN, fen);
    }

    #[test]
    fn placement_only_is_accepted() {
        let board = decode_fresh("4k3/8/8/8/8/8/8/4K3").unwrap();
        assert_eq!(2, board.piece_count());
    }

    #[test]
    fn empty_input() {
        assert_eq!(Err(FenParseError::UnexpectedEnd), decode_fresh(""));
        assert_eq!(Err(FenParseError::UnexpectedEnd), decode_fresh("   "));
    }

    #[test]
    fn wrong_rank_count() {
        assert_eq!(
            Err(FenParseError::WrongRankCount(7)),
            decode_fresh("8/8/8/8/8/8/8 w - - 0 1")
        );
        assert_eq!(
            Err(FenParseError::WrongRankCount(9)),
            decode_fresh("8/8/8/8/8/8/8/8/8")
        );
    }

    #[test]
    fn unknown_piece() {
        assert_eq!(
            Err(FenParseError::UnknownPiece('z')),
            decode_fresh("z7/8/8/8/8/8/8/8 w - - 0 0")
        );
    }

    #[test]
    fn invalid_digit() {
        assert_eq!(
            Err(FenParseError::InvalidDigit('9')),
            decode_fresh("9/8/8/8/8/8/8/8 w - - 0 0")
        );
        assert_eq!(
            Err(FenParseError::InvalidDigit('0')),
            decode_fresh("08/8/8/8/8/8/8/8 w - - 0 0")
        );
    }

    #[test]
    fn rank_overflow_by_digits() {
        assert_eq!(
            Err(FenParseError::RankOverflow(Rank::Eight)),
            decode_fresh("54/8/8/8/8/8/8/8 w - - 0 0")
        );
    }

    #[test]
    fn rank_overflow_by_pieces() {
        assert_eq!(
            Err(FenParseError::RankOverflow(Rank::One)),
            decode_fresh("8/8/8/8/8/8/8/RNBQKBNRP w - - 0 0")
        );
        assert_eq!(
            Err(FenParseError::RankOverflow(Rank::Four)),
            decode_fresh("8/8/8/8/8p/8/8/8 w - - 0 0")
        );
    }

    #[test]
    fn rank_underflow() {
        assert_eq!(
            Err(FenParseError::RankUnderflow(Rank::Seven)),
            decode_fresh("8/7/8/8/8/8/8/8 w - - 0 0")
        );
    }

    #[test]
    fn full_fen_smoke() {
        let fen = Fen::parse("8/8/8/8/8/8/8/8 w - - 0 0", &mut PieceIds::new()).unwrap();
        assert_eq!(Color::White, fen.side_to_move);
        assert!(fen.castling.is_empty());
        assert!(fen.en_passant.is_none());
        assert_eq!(0, fen.halfmove_clock);
        assert_eq!(0, fen.fullmove_number);
    }

    #[test]
    fn full_fen_fields() {
        let text = "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w Kq c6 0 2";
        let fen = Fen::parse(text, &mut PieceIds::new()).unwrap();
        assert_eq!(
            CastleStatus::WHITE_KINGSIDE | CastleStatus::BLACK_QUEENSIDE,
            fen.castling
        );
        assert_eq!(Some(Square::C6), fen.en_passant);
        assert_eq!(2, fen.fullmove_number);
        assert_eq!(text, fen.to_string());
    }

    #[test]
    fn bad_side_to_move() {
        let err = Fen::parse("8/8/8/8/8/8/8/8 c - - 0 0", &mut PieceIds::new()).unwrap_err();
        assert_eq!(FenParseError::InvalidSideToMove, err);
    }

    #[test]
    fn bad_castle_status() {
        let err = Fen::parse("8/8/8/8/8/8/8/8 w a - 0 0", &mut PieceIds::new()).unwrap_err();
        assert_eq!(FenParseError::InvalidCastle, err);
    }

    #[test]
    fn bad_en_passant() {
        let err = Fen::parse("8/8/8/8/8/8/8/8 w - 88 0 0", &mut PieceIds::new()).unwrap_err();
        assert_eq!(FenParseError::InvalidEnPassant, err);
    }

    #[test]
    fn empty_halfmove() {
        let err = Fen::parse("8/8/8/8/8/8/8/8 w - - q 0", &mut PieceIds::new()).unwrap_err();
        assert_eq!(FenParseError::EmptyHalfmove, err);
    }

    #[test]
    fn empty_fullmove() {
        let err = Fen::parse("8/8/8/8/8/8/8/8 w - - 0 q", &mut PieceIds::new()).unwrap_err();
        assert_eq!(FenParseError::EmptyFullmove, err);
    }

    #[test]
    fn fullmove_early_end() {
        let err = Fen::parse("8/8/8/8/8/8/8/8 w - - 0", &mut PieceIds::new()).unwrap_err();
        assert_eq!(FenParseError::UnexpectedEnd, err);
    }

    #[test]
    fn invalid_fullmove() {
        let err = Fen::parse(
            "8/8/8/8/8/8/8/8 w - - 0 999999999999",
            &mut PieceIds::new(),
        )
        .unwrap_err();
        assert_eq!(FenParseError::InvalidFullmove, err);
    }
}
