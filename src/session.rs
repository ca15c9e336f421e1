// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! One round of training: study a position, rebuild it from memory, and get
//! it scored.
//!
//! The session does not own a clock. Whoever drives it is expected to call
//! `tick` once a second with a token obtained from `token`. Every phase
//! change invalidates outstanding tokens, so a tick scheduled during one
//! phase can never count down the next.
use std::fmt;

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::board::{Board, PieceIds};
use crate::codec::{self, FenParseError};
use crate::data::SessionRecord;
use crate::score::ScoreReport;
use crate::synth::{Difficulty, SynthError, Synthesizer};
use crate::types::{Piece, Square};

/// Seconds allowed for reconstruction when the settings do not say.
pub const DEFAULT_RECONSTRUCT_TIME: u32 = 60;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameMode {
    Classic,
    Progressive,
}

impl Default for GameMode {
    fn default() -> GameMode {
        GameMode::Classic
    }
}

/// How a session is set up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Seconds to study the position.
    pub memorize_time: u32,
    /// Seconds to rebuild it. Defaults to a minute.
    pub reconstruct_time: Option<u32>,
    /// A position to train on instead of a random one. Only the placement
    /// field is used.
    pub fen: Option<String>,
}

impl GameSettings {
    pub fn for_difficulty(difficulty: Difficulty) -> GameSettings {
        GameSettings {
            mode: GameMode::Classic,
            difficulty,
            memorize_time: difficulty.default_memorize_time(),
            reconstruct_time: None,
            fen: None,
        }
    }

    /// Settings for training on a specific position. Custom positions are
    /// treated as hard.
    pub fn custom(fen: &str) -> GameSettings {
        GameSettings {
            fen: Some(fen.to_owned()),
            ..GameSettings::for_difficulty(Difficulty::Hard)
        }
    }

    pub fn reconstruct_time(&self) -> u32 {
        self.reconstruct_time.unwrap_or(DEFAULT_RECONSTRUCT_TIME)
    }
}

impl Default for GameSettings {
    fn default() -> GameSettings {
        GameSettings::for_difficulty(Difficulty::default())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Memorize,
    Reconstruct,
    Result,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Phase::Memorize => "memorize",
            Phase::Reconstruct => "reconstruct",
            Phase::Result => "result",
        };
        f.write_str(name)
    }
}

/// Possible errors that can arise when driving a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The action is not available in the current phase.
    WrongPhase { expected: Phase, actual: Phase },
    /// The custom position could not be decoded.
    InvalidFen(FenParseError),
    Synth(SynthError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::WrongPhase { expected, actual } => write!(
                f,
                "only allowed in the {} phase, session is in the {} phase",
                expected, actual
            ),
            SessionError::InvalidFen(err) => write!(f, "invalid position: {}", err),
            SessionError::Synth(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<FenParseError> for SessionError {
    fn from(err: FenParseError) -> SessionError {
        SessionError::InvalidFen(err)
    }
}

impl From<SynthError> for SessionError {
    fn from(err: SynthError) -> SessionError {
        SessionError::Synth(err)
    }
}

/// Permission to count down the phase that was current when it was issued.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TickToken {
    epoch: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The token belongs to an earlier phase. Nothing changed.
    Stale,
    /// The clock ticked; this many seconds remain.
    Counting(u32),
    /// Memorization time ran out and reconstruction has begun. Outstanding
    /// tokens are now stale.
    Reconstructing,
    /// Reconstruction time ran out. The attempt can still be submitted.
    Expired,
    /// No clock is running.
    Idle,
}

pub struct TrainingSession<R = ThreadRng> {
    settings: GameSettings,
    synth: Synthesizer<R>,
    ids: PieceIds,
    phase: Phase,
    original: Board,
    attempt: Board,
    time_left: u32,
    epoch: u64,
    report: Option<ScoreReport>,
}

impl TrainingSession<ThreadRng> {
    pub fn with_settings(settings: GameSettings) -> Result<TrainingSession<ThreadRng>, SessionError> {
        TrainingSession::new(settings, Synthesizer::from_entropy())
    }
}

impl<R: Rng> TrainingSession<R> {
    /// Creates a session and starts its first round.
    pub fn new(
        settings: GameSettings,
        synth: Synthesizer<R>,
    ) -> Result<TrainingSession<R>, SessionError> {
        let mut session = TrainingSession {
            settings,
            synth,
            ids: PieceIds::new(),
            phase: Phase::Memorize,
            original: Board::empty(),
            attempt: Board::empty(),
            time_left: 0,
            epoch: 0,
            report: None,
        };

        session.start()?;
        Ok(session)
    }

    /// Begins a new round on a fresh position. If the position cannot be
    /// built, the session is left exactly as it was.
    pub fn start(&mut self) -> Result<(), SessionError> {
        let original = match self.settings.fen {
            Some(ref fen) => codec::decode(fen, &mut self.ids).map_err(|err| {
                warn!("rejecting custom position {:?}: {}", fen, err);
                err
            })?,
            None => self.synth.generate(self.settings.difficulty, &mut self.ids)?,
        };

        info!(
            "starting {} round with {} pieces",
            self.settings.difficulty,
            original.piece_count()
        );
        self.original = original;
        self.attempt = Board::empty();
        self.report = None;
        self.enter(Phase::Memorize, self.settings.memorize_time);
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.start()
    }

    fn enter(&mut self, phase: Phase, time: u32) {
        debug!("entering {} phase with {}s", phase, time);
        self.phase = phase;
        self.time_left = time;
        self.epoch += 1;
    }

    fn require(&self, expected: Phase) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn original(&self) -> &Board {
        &self.original
    }

    pub fn attempt(&self) -> &Board {
        &self.attempt
    }

    /// The score of the last submitted attempt, once in the result phase.
    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    /// A token for the clock of the current phase.
    pub fn token(&self) -> TickToken {
        TickToken { epoch: self.epoch }
    }

    /// Counts down one second of the phase the token was issued for.
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        if token.epoch != self.epoch {
            return TickOutcome::Stale;
        }

        match self.phase {
            Phase::Memorize => {
                self.time_left = self.time_left.saturating_sub(1);
                if self.time_left == 0 {
                    self.begin_reconstruction();
                    TickOutcome::Reconstructing
                } else {
                    TickOutcome::Counting(self.time_left)
                }
            }
            Phase::Reconstruct => {
                if self.time_left == 0 {
                    return TickOutcome::Idle;
                }

                self.time_left -= 1;
                if self.time_left == 0 {
                    info!("reconstruction time expired");
                    TickOutcome::Expired
                } else {
                    TickOutcome::Counting(self.time_left)
                }
            }
            Phase::Result => TickOutcome::Idle,
        }
    }

    fn begin_reconstruction(&mut self) {
        info!("memorization over, reconstructing");
        let time = self.settings.reconstruct_time();
        self.enter(Phase::Reconstruct, time);
    }

    /// Ends memorization early.
    pub fn skip_memorize(&mut self) -> Result<(), SessionError> {
        self.require(Phase::Memorize)?;
        self.begin_reconstruction();
        Ok(())
    }

    /// Adds study time. Returns the seconds now remaining.
    pub fn add_time(&mut self, seconds: u32) -> Result<u32, SessionError> {
        self.require(Phase::Memorize)?;
        self.time_left = self.time_left.saturating_add(seconds);
        Ok(self.time_left)
    }

    /// Puts a piece on the attempt board, replacing whatever was there.
    pub fn place(&mut self, square: Square, piece: Piece) -> Result<(), SessionError> {
        self.require(Phase::Reconstruct)?;
        let id = self.ids.next_id();
        self.attempt.place(square, piece, id);
        Ok(())
    }

    pub fn remove(&mut self, square: Square) -> Result<Option<Piece>, SessionError> {
        self.require(Phase::Reconstruct)?;
        Ok(self.attempt.remove(square).map(|occ| occ.piece))
    }

    /// Moves a piece on the attempt board. Returns false if `from` is empty or
    /// equal to `to`.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Result<bool, SessionError> {
        self.require(Phase::Reconstruct)?;
        Ok(self.attempt.move_piece(from, to))
    }

    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.require(Phase::Reconstruct)?;
        self.attempt.clear();
        Ok(())
    }

    /// Scores the attempt and ends the round.
    pub fn submit(&mut self) -> Result<ScoreReport, SessionError> {
        self.require(Phase::Reconstruct)?;
        let report = ScoreReport::compare(&self.original, &self.attempt);
        info!(
            "attempt scored {}% with {} mistakes",
            report.accuracy,
            report.mismatches.len()
        );
        self.report = Some(report.clone());
        self.enter(Phase::Result, 0);
        Ok(report)
    }

    /// A summary of the finished round, for recording.
    pub fn record(&self) -> Option<SessionRecord> {
        self.report
            .as_ref()
            .map(|report| SessionRecord::new(&self.original, self.settings.difficulty, report))
    }
}
