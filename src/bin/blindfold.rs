// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate clap;

use std::convert::TryFrom;
use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use blindfold::codec;
use blindfold::data::{CsvSessionRecorder, NullSessionRecorder, SessionRecord, SessionRecorder};
use blindfold::pgn::{export_pgn, import_pgn};
use blindfold::{
    BoardStateManager, Difficulty, GameSettings, Phase, Piece, PieceIds, ScoreReport, Square,
    Synthesizer, TickOutcome, TrainingSession,
};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use rand::Rng;

type CliResult = Result<(), Box<dyn Error>>;

fn main() {
    env_logger::init();
    let difficulty_arg = Arg::with_name("difficulty")
        .help("Training difficulty (easy, medium, hard)")
        .value_name("DIFFICULTY")
        .short("d")
        .long("difficulty")
        .takes_value(true);
    let record_arg = Arg::with_name("record")
        .help("Append a CSV row per round to this file")
        .value_name("FILE")
        .long("record")
        .takes_value(true);

    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("settings")
                .help("JSON file with game settings")
                .value_name("FILE")
                .short("s")
                .long("settings")
                .takes_value(true)
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("generate")
                .about("Generates random training positions")
                .arg(difficulty_arg.clone())
                .arg(
                    Arg::with_name("seed")
                        .help("Seed for reproducible positions")
                        .value_name("SEED")
                        .long("seed")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("count")
                        .help("Number of positions to generate")
                        .value_name("COUNT")
                        .short("n")
                        .long("count")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("score")
                .about("Scores a reconstruction against the original position")
                .arg(
                    Arg::with_name("ORIGINAL")
                        .help("FEN of the original position")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("ATTEMPT")
                        .help("FEN of the reconstruction")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::with_name("json")
                        .help("Print the report as JSON")
                        .long("json"),
                ),
        )
        .subcommand(
            SubCommand::with_name("replay")
                .about("Plays moves in algebraic notation and prints the history")
                .arg(
                    Arg::with_name("fen")
                        .help("Starting position")
                        .value_name("FEN")
                        .long("fen")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("MOVES")
                        .help("Moves to play, e.g. e4 e5 Nf3")
                        .multiple(true)
                        .index(1),
                ),
        )
        .subcommand(
            SubCommand::with_name("pgn")
                .about("Reads a PGN game and prints it back with its final position")
                .arg(
                    Arg::with_name("FILE")
                        .help("PGN file to load the game from")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            SubCommand::with_name("train")
                .about("Runs one training round in the terminal")
                .arg(difficulty_arg)
                .arg(
                    Arg::with_name("memorize")
                        .help("Seconds to study the position")
                        .value_name("SECONDS")
                        .short("m")
                        .long("memorize")
                        .takes_value(true),
                )
                .arg(record_arg),
        )
        .get_matches();

    let result = match matches.subcommand() {
        ("generate", Some(matches)) => run_generate(matches),
        ("score", Some(matches)) => run_score(matches),
        ("replay", Some(matches)) => run_replay(matches),
        ("pgn", Some(matches)) => run_pgn(matches),
        ("train", Some(matches)) => run_train(matches),
        _ => Ok(()),
    };

    if let Err(err) = result {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

/// Settings from the `--settings` file, if any, with command-line overrides
/// applied on top.
fn load_settings(matches: &ArgMatches) -> Result<GameSettings, Box<dyn Error>> {
    let mut settings = match matches.value_of("settings") {
        Some(path) => {
            let file = File::open(path)?;
            serde_json::from_reader(file)?
        }
        None => GameSettings::default(),
    };

    if matches.is_present("difficulty") {
        let difficulty = value_t!(matches, "difficulty", Difficulty)?;
        settings.difficulty = difficulty;
        settings.memorize_time = difficulty.default_memorize_time();
    }

    if matches.is_present("memorize") {
        settings.memorize_time = value_t!(matches, "memorize", u32)?;
    }

    Ok(settings)
}

fn run_generate(matches: &ArgMatches) -> CliResult {
    let settings = load_settings(matches)?;
    let count = if matches.is_present("count") {
        value_t!(matches, "count", usize)?
    } else {
        1
    };

    if matches.is_present("seed") {
        let seed = value_t!(matches, "seed", u64)?;
        print_boards(&mut Synthesizer::seeded(seed), settings.difficulty, count)
    } else {
        print_boards(&mut Synthesizer::from_entropy(), settings.difficulty, count)
    }
}

fn print_boards<R: Rng>(
    synth: &mut Synthesizer<R>,
    difficulty: Difficulty,
    count: usize,
) -> CliResult {
    let mut ids = PieceIds::new();
    for _ in 0..count {
        let board = synth.generate(difficulty, &mut ids)?;
        println!("{}", board);
        println!("{}", codec::encode_placement(&board));
        println!();
    }

    Ok(())
}

fn run_score(matches: &ArgMatches) -> CliResult {
    let mut ids = PieceIds::new();
    let original = codec::decode(matches.value_of("ORIGINAL").unwrap_or(""), &mut ids)?;
    let attempt = codec::decode(matches.value_of("ATTEMPT").unwrap_or(""), &mut ids)?;
    let report = ScoreReport::compare(&original, &attempt);
    if matches.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn run_replay(matches: &ArgMatches) -> CliResult {
    let mut manager = BoardStateManager::standard(matches.value_of("fen"))?;
    if let Some(moves) = matches.values_of("MOVES") {
        for san in moves {
            manager.make_san_move(san)?;
        }
    }

    for entry in manager.history() {
        println!("{:>3}  {:<8} {}", entry.ply, entry.san, entry.fen);
    }

    print_status(&manager);
    Ok(())
}

fn run_pgn(matches: &ArgMatches) -> CliResult {
    let text = fs::read_to_string(matches.value_of("FILE").unwrap_or(""))?;
    let mut manager = BoardStateManager::standard(None)?;
    let plies = import_pgn(&mut manager, &text)?;
    println!("{}", export_pgn(manager.history(), &[]));
    println!();
    println!("{} plies", plies);
    print_status(&manager);
    Ok(())
}

fn print_status(manager: &BoardStateManager) {
    println!("{}", manager.current_fen());
    if manager.is_checkmate() {
        println!("checkmate");
    } else if manager.is_stalemate() {
        println!("stalemate");
    } else if manager.is_check() {
        println!("check");
    }
}

fn print_report(report: &ScoreReport) {
    println!("accuracy: {}%", report.accuracy);
    for mismatch in &report.mismatches {
        println!("  {}", mismatch);
    }
}

fn run_train(matches: &ArgMatches) -> CliResult {
    let settings = load_settings(matches)?;
    let recorder: Box<dyn SessionRecorder> = match matches.value_of("record") {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Box::new(CsvSessionRecorder::new(file))
        }
        None => Box::new(NullSessionRecorder),
    };

    let mut session = TrainingSession::with_settings(settings)?;
    println!("{}", session.original());
    let token = session.token();
    loop {
        thread::sleep(Duration::from_secs(1));
        match session.tick(token) {
            TickOutcome::Counting(left) => {
                print!("\r{:>3}s ", left);
                io::stdout().flush()?;
            }
            _ => break,
        }
    }

    // Scroll the position out of view.
    println!("{}", "\n".repeat(40));
    println!("Rebuild the position. Commands: place <square> <piece>, remove <square>,");
    println!("move <from> <to>, clear, show, submit");

    println!("{}s to go", session.time_left());

    // Commands arrive on their own thread so the clock keeps running while
    // the prompt waits.
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let token = session.token();
    let mut next_tick = Instant::now() + Duration::from_secs(1);
    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        match rx.recv_timeout(wait) {
            Ok(line) => {
                let line = line?;
                let words: Vec<&str> = line.split_whitespace().collect();
                match run_command(&mut session, &words) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(err) => println!("{}", err),
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                next_tick += Duration::from_secs(1);
                match session.tick(token) {
                    TickOutcome::Counting(left) if left % 10 == 0 || left <= 5 => {
                        println!("{}s to go", left);
                    }
                    TickOutcome::Expired => {
                        println!("time is up");
                        break;
                    }
                    _ => {}
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if session.phase() == Phase::Reconstruct {
        session.submit()?;
    }

    if let Some(report) = session.report() {
        print_report(report);
    }

    println!("{}", session.original());
    if let Some(record) = session.record() {
        record_round(recorder.as_ref(), &record)?;
    }

    Ok(())
}

/// Applies one reconstruction command. Returns true once the attempt is
/// ready to be submitted.
fn run_command<R: Rng>(
    session: &mut TrainingSession<R>,
    words: &[&str],
) -> Result<bool, Box<dyn Error>> {
    match words {
        ["place", square, piece] => {
            let square = square.parse::<Square>()?;
            let piece = parse_piece(piece)?;
            session.place(square, piece)?;
        }
        ["remove", square] => {
            session.remove(square.parse::<Square>()?)?;
        }
        ["move", from, to] => {
            let from = from.parse::<Square>()?;
            let to = to.parse::<Square>()?;
            if !session.move_piece(from, to)? {
                println!("nothing to move on {}", from);
            }
        }
        ["clear"] => session.clear()?,
        ["show"] => println!("{}", session.attempt()),
        ["submit"] => return Ok(true),
        [] => {}
        _ => return Err(format!("unknown command: {}", words.join(" ")).into()),
    }

    Ok(false)
}

fn parse_piece(text: &str) -> Result<Piece, Box<dyn Error>> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            Piece::try_from(c).map_err(|_| format!("unknown piece: {}", c).into())
        }
        _ => Err(format!("expected a single piece letter, got {}", text).into()),
    }
}

fn record_round(recorder: &dyn SessionRecorder, record: &SessionRecord) -> CliResult {
    recorder.record(record)?;
    Ok(())
}
