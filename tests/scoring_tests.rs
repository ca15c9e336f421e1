// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
extern crate blindfold;

use blindfold::codec::decode;
use blindfold::{
    accuracy, diff, Board, Color, Difficulty, Piece, PieceIds, ScoreReport, Square, Synthesizer,
};

fn twelve_pieces(ids: &mut PieceIds) -> Board {
    decode("r3k3/1p3q2/8/3N4/2b1P3/8/P4P2/R3K2n", ids).unwrap()
}

#[test]
fn one_flipped_color() {
    let mut ids = PieceIds::new();
    let original = twelve_pieces(&mut ids);
    assert_eq!(12, original.piece_count());
    assert_eq!(100, accuracy(&original, &original));

    let mut attempt = original.clone();
    let knight = attempt.piece_at(Square::D5).unwrap();
    attempt.place(
        Square::D5,
        Piece::new(knight.kind, knight.color.toggle()),
        ids.next_id(),
    );

    assert_eq!(98, accuracy(&original, &attempt));
    let mismatches = diff(&original, &attempt);
    assert_eq!(1, mismatches.len());
    assert_eq!(Square::D5, mismatches[0].square);
    assert_eq!(Some(knight), mismatches[0].expected);
    assert_eq!(Color::Black, mismatches[0].actual.unwrap().color);
}

#[test]
fn identity_does_not_count() {
    let mut ids = PieceIds::new();
    let original = twelve_pieces(&mut ids);
    let rebuilt = twelve_pieces(&mut ids);
    assert_eq!(100, accuracy(&original, &rebuilt));
    assert!(diff(&original, &rebuilt).is_empty());
}

#[test]
fn empty_attempt() {
    let mut ids = PieceIds::new();
    let original = twelve_pieces(&mut ids);
    let report = ScoreReport::compare(&original, &Board::empty());
    // 52 of 64 squares agree: 81.25%
    assert_eq!(81, report.accuracy);
    assert_eq!(12, report.mismatches.len());
    assert!(report.mismatches.iter().all(|m| m.actual.is_none()));
    assert_eq!(Square::A8, report.mismatches[0].square);
    assert_eq!(Square::H1, report.mismatches[11].square);
}

#[test]
fn symmetric_and_consistent_with_diff() {
    let mut synth = Synthesizer::seeded(2024);
    let mut ids = PieceIds::new();
    for _ in 0..200 {
        let a = synth.generate(Difficulty::Hard, &mut ids).unwrap();
        let b = synth.generate(Difficulty::Easy, &mut ids).unwrap();
        let score = accuracy(&a, &b);
        assert_eq!(score, accuracy(&b, &a));
        assert!(score <= 100);

        let wrong = diff(&a, &b).len() as f64;
        let expected = (100.0 * (64.0 - wrong) / 64.0 + 0.5).floor() as u32;
        assert_eq!(expected, score);
        assert_eq!(score, ScoreReport::compare(&a, &b).accuracy);
    }
}

#[test]
fn report_serializes_square_names() {
    let mut ids = PieceIds::new();
    let original = decode("8/8/8/8/8/8/8/K7", &mut ids).unwrap();
    let report = ScoreReport::compare(&original, &Board::empty());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(98, json["accuracy"]);
    assert_eq!("a1", json["mismatches"][0]["square"]);
    assert_eq!("king", json["mismatches"][0]["expected"]["kind"]);
    assert_eq!("white", json["mismatches"][0]["expected"]["color"]);
    assert!(json["mismatches"][0]["actual"].is_null());
}
