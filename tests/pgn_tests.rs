// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
extern crate blindfold;

use blindfold::pgn::{export_pgn, import_pgn, parse_movetext, PgnError, LINE_WIDTH};
use blindfold::BoardStateManager;

const OPERA_GAME: &str = r#"[Event "Paris"]
[Site "Paris FRA"]
[Date "1858.??.??"]
[White "Paul Morphy"]
[Black "Duke Karl / Count Isouard"]
[Result "1-0"]

1. e4 e5 2. Nf3 d6 3. d4 Bg4 {This is a weak move already.} 4. dxe5 Bxf3
5. Qxf3 dxe5 6. Bc4 Nf6 7. Qb3 Qe7 8. Nc3 c6 9. Bg5 b5 10. Nxb5 cxb5
11. Bxb5+ Nbd7 12. O-O-O Rd8 13. Rxd7 Rxd7 14. Rd1 Qe6 15. Bxd7+ Nxd7
16. Qb8+ Nxb8 17. Rd8# 1-0
"#;

#[test]
fn import_opera_game() {
    let mut manager = BoardStateManager::standard(None).unwrap();
    let plies = import_pgn(&mut manager, OPERA_GAME).unwrap();
    assert_eq!(33, plies);
    assert_eq!(33, manager.history().len());
    assert!(manager.is_checkmate());
    assert_eq!("Rd8#", manager.history()[32].san);
    assert_eq!(
        "1n1Rkb1r/p4ppp/4q3/4p1B1/4P3/8/PPP2PPP/2K5 b k - 1 17",
        manager.current_fen()
    );
}

#[test]
fn export_then_reimport() {
    let mut manager = BoardStateManager::standard(None).unwrap();
    import_pgn(&mut manager, OPERA_GAME).unwrap();

    let text = export_pgn(
        manager.history(),
        &[("White", "Paul Morphy"), ("Result", "1-0")],
    );
    assert!(text.starts_with("[White \"Paul Morphy\"]\n[Result \"1-0\"]\n\n1. e4 e5 2. Nf3 d6"));
    assert!(text.ends_with("17. Rd8# 1-0"));
    assert!(text.lines().all(|line| line.len() <= LINE_WIDTH));

    let moves = parse_movetext(&text).unwrap();
    let sans: Vec<_> = manager.history().iter().map(|e| e.san.clone()).collect();
    assert_eq!(sans, moves);
}

#[test]
fn fen_tag_sets_up_the_board() {
    let pgn = "[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 12\"]\n\n12... Kd7 13. e4 *";
    let mut manager = BoardStateManager::standard(None).unwrap();
    assert_eq!(2, import_pgn(&mut manager, pgn).unwrap());
    assert_eq!("12... Kd7 13. e4", export_pgn(manager.history(), &[]));
}

#[test]
fn illegal_move_aborts_with_its_ply() {
    let mut manager = BoardStateManager::standard(None).unwrap();
    let err = import_pgn(&mut manager, "1. e4 e5 2. Ke3 Nc6").unwrap_err();
    assert_eq!(
        PgnError::IllegalMove {
            ply: 2,
            san: "Ke3".to_owned()
        },
        err
    );
    assert_eq!(2, manager.history().len());
}

#[test]
fn bad_fen_tag() {
    let mut manager = BoardStateManager::standard(None).unwrap();
    match import_pgn(&mut manager, "[FEN \"not a position\"]\n1. e4") {
        Err(PgnError::InvalidSetup(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn annotated_game_imports() {
    let pgn = "1. e4 $1 e5 2. Nf3 $2 Nc6 3. Bc4 Bc5 4. 0-0 $10 Nf6 5. d3 0-0 *";
    let mut manager = BoardStateManager::standard(None).unwrap();
    assert_eq!(10, import_pgn(&mut manager, pgn).unwrap());
    assert_eq!("O-O", manager.history()[6].san);
    assert_eq!("O-O", manager.history()[9].san);
    assert_eq!(
        "r1bq1rk1/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQ1RK1 w - - 1 6",
        manager.current_fen()
    );
}

#[test]
fn editor_fen_with_stale_castling_rights() {
    let pgn = "[FEN \"4k3/8/8/8/8/8/4P3/4K3 w KQkq - 0 1\"]\n\n1. e4 Kd7 *";
    let mut manager = BoardStateManager::standard(None).unwrap();
    assert_eq!(2, import_pgn(&mut manager, pgn).unwrap());
    assert_eq!("8/3k4/8/8/4P3/8/8/4K3 w - - 1 2", manager.current_fen());
}
