// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
extern crate blindfold;

use blindfold::codec::{decode, encode_placement};
use blindfold::{Board, Color, Difficulty, Piece, PieceIds, PieceKind, Synthesizer};

fn kings(board: &Board) -> Vec<(Color, blindfold::Square)> {
    board
        .squares()
        .filter_map(|(square, occ)| occ.map(|occ| (square, occ.piece)))
        .filter(|(_, piece)| piece.kind == PieceKind::King)
        .map(|(square, piece)| (piece.color, square))
        .collect()
}

fn assert_valid(board: &Board, difficulty: Difficulty) {
    let kings = kings(board);
    assert_eq!(2, kings.len(), "{}", board);
    assert_ne!(kings[0].0, kings[1].0);
    assert!(kings[0].1.distance(kings[1].1) > 1, "{}", board);

    for (square, occ) in board.squares() {
        if let Some(occ) = occ {
            if occ.piece.kind == PieceKind::Pawn {
                assert!(!square.is_back_rank(), "pawn on {}", square);
            }
        }
    }

    let extra = board.piece_count() - 2;
    assert!(difficulty.extra_piece_range().contains(&extra), "{} extra", extra);
}

#[test]
fn every_tier_obeys_its_constraints() {
    for &difficulty in &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        let mut synth = Synthesizer::seeded(0xb11d);
        let mut ids = PieceIds::new();
        for _ in 0..500 {
            let board = synth.generate(difficulty, &mut ids).unwrap();
            assert_valid(&board, difficulty);
        }
    }
}

#[test]
fn every_count_in_range_shows_up() {
    let mut synth = Synthesizer::seeded(17);
    let mut ids = PieceIds::new();
    let mut seen = [false; 15];
    for _ in 0..2000 {
        let board = synth.generate(Difficulty::Hard, &mut ids).unwrap();
        seen[board.piece_count() - 2] = true;
    }

    for extra in Difficulty::Hard.extra_piece_range() {
        assert!(seen[extra], "never generated {} extra pieces", extra);
    }
}

#[test]
fn dense_boards_still_obey_constraints() {
    let mut synth = Synthesizer::seeded(5);
    let mut ids = PieceIds::new();
    for &extra in &[30, 45, 60, 62] {
        let board = synth.generate_with_count(extra, &mut ids).unwrap();
        assert_eq!(extra + 2, board.piece_count());
        for (square, occ) in board.squares() {
            if let Some(occ) = occ {
                assert!(!(occ.piece.kind == PieceKind::Pawn && square.is_back_rank()));
            }
        }
    }
}

#[test]
fn generated_boards_survive_a_round_trip() {
    let mut synth = Synthesizer::seeded(99);
    let mut ids = PieceIds::new();
    for _ in 0..100 {
        let board = synth.generate(Difficulty::Medium, &mut ids).unwrap();
        let decoded = decode(&encode_placement(&board), &mut ids).unwrap();
        assert_eq!(board, decoded);
    }
}

#[test]
fn only_scatter_kinds_besides_kings() {
    let mut synth = Synthesizer::seeded(3);
    let mut ids = PieceIds::new();
    let board = synth.generate_with_count(40, &mut ids).unwrap();
    let white_kings = board
        .squares_with(Piece::new(PieceKind::King, Color::White))
        .count();
    let black_kings = board
        .squares_with(Piece::new(PieceKind::King, Color::Black))
        .count();
    assert_eq!(1, white_kings);
    assert_eq!(1, black_kings);
}
