// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::io::Write;
use std::sync::Mutex;

use csv::Writer;

use crate::board::Board;
use crate::codec;
use crate::score::ScoreReport;
use crate::synth::Difficulty;

/// Summary of one finished training round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub fen: String,
    pub difficulty: Difficulty,
    pub piece_count: usize,
    pub accuracy: u32,
    pub mismatches: usize,
}

impl SessionRecord {
    pub fn new(original: &Board, difficulty: Difficulty, report: &ScoreReport) -> SessionRecord {
        SessionRecord {
            fen: codec::encode_placement(original),
            difficulty,
            piece_count: original.piece_count(),
            accuracy: report.accuracy,
            mismatches: report.mismatches.len(),
        }
    }
}

pub trait SessionRecorder {
    fn record(&self, rec: &SessionRecord) -> csv::Result<()>;
}

pub struct NullSessionRecorder;
impl SessionRecorder for NullSessionRecorder {
    fn record(&self, _rec: &SessionRecord) -> csv::Result<()> {
        Ok(())
    }
}

/// Appends one CSV row per round, with a header before the first.
pub struct CsvSessionRecorder<W: Write> {
    writer: Mutex<Writer<W>>,
}

impl<W: Write> CsvSessionRecorder<W> {
    pub fn new(writer: W) -> CsvSessionRecorder<W> {
        CsvSessionRecorder {
            writer: Mutex::new(Writer::from_writer(writer)),
        }
    }
}

impl<W: Write> SessionRecorder for CsvSessionRecorder<W> {
    fn record(&self, rec: &SessionRecord) -> csv::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.serialize(rec)?;
        writer.flush()?;
        Ok(())
    }
}
