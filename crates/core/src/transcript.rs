//! JSONL transcript of one agent/environment conversation.
//!
//! [`RecordingPort`] wraps any [`EnvironmentPort`] and appends one line per
//! exchanged message: the session header, each percept batch, the destination
//! report and each command. Every line is flushed as soon as it is written so a
//! transcript survives the agent being killed mid-episode. Recording failures
//! never disturb the conversation itself; they are logged and recording stops.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PortError;
use crate::port::EnvironmentPort;
use crate::types::{Command, Percept, Pos, SessionStart};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEvent {
    SessionStart { start: SessionStart },
    Percepts { percepts: Vec<Percept> },
    DestinationReport { destination: Option<Pos> },
    Command { command: Command },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub seq: u64,
    pub event: TranscriptEvent,
}

pub struct RecordingPort<P, W: Write> {
    inner: P,
    sink: Option<W>,
    next_seq: u64,
}

impl<P: EnvironmentPort> RecordingPort<P, BufWriter<File>> {
    /// Creates (or truncates) the transcript file at `path`.
    pub fn create(inner: P, path: &Path) -> io::Result<Self> {
        Ok(Self::new(inner, create_transcript_file(path)?))
    }
}

/// Creates (or truncates) a transcript file, making missing parent directories.
pub fn create_transcript_file(path: &Path) -> io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

impl<P: EnvironmentPort, W: Write> RecordingPort<P, W> {
    pub fn new(inner: P, sink: W) -> Self {
        Self { inner, sink: Some(sink), next_seq: 0 }
    }

    pub fn records_written(&self) -> u64 {
        self.next_seq
    }

    pub fn into_parts(self) -> (P, Option<W>) {
        (self.inner, self.sink)
    }

    fn record(&mut self, event: TranscriptEvent) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let record = TranscriptRecord { seq: self.next_seq, event };
        let written = serde_json::to_string(&record)
            .map_err(io::Error::other)
            .and_then(|json| writeln!(sink, "{json}"))
            .and_then(|()| sink.flush());
        match written {
            Ok(()) => self.next_seq += 1,
            Err(err) => {
                warn!(error = %err, seq = self.next_seq, "transcript write failed; recording stopped");
                self.sink = None;
            }
        }
    }
}

impl<P: EnvironmentPort, W: Write> EnvironmentPort for RecordingPort<P, W> {
    fn read_session_start(&mut self) -> Result<SessionStart, PortError> {
        let start = self.inner.read_session_start()?;
        self.record(TranscriptEvent::SessionStart { start });
        Ok(start)
    }

    fn read_percepts(&mut self) -> Result<Vec<Percept>, PortError> {
        let percepts = self.inner.read_percepts()?;
        self.record(TranscriptEvent::Percepts { percepts: percepts.clone() });
        Ok(percepts)
    }

    fn read_destination_report(&mut self) -> Result<Option<Pos>, PortError> {
        let destination = self.inner.read_destination_report()?;
        self.record(TranscriptEvent::DestinationReport { destination });
        Ok(destination)
    }

    fn send(&mut self, command: Command) -> Result<(), PortError> {
        self.inner.send(command)?;
        self.record(TranscriptEvent::Command { command });
        Ok(())
    }
}

/// Describes why a transcript file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptLoadError {
    #[error("transcript I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid transcript record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("transcript line {line}: expected seq {expected}, found {found}")]
    OutOfOrder { line: usize, expected: u64, found: u64 },
}

/// Loads every record of a transcript, checking that sequence numbers run from zero.
pub fn load_transcript(path: &Path) -> Result<Vec<TranscriptRecord>, TranscriptLoadError> {
    let content = fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let record: TranscriptRecord = serde_json::from_str(line).map_err(|e| {
            TranscriptLoadError::InvalidRecord { line: line_number, message: e.to_string() }
        })?;
        let expected = records.len() as u64;
        if record.seq != expected {
            return Err(TranscriptLoadError::OutOfOrder {
                line: line_number,
                expected,
                found: record.seq,
            });
        }
        records.push(record);
    }
    Ok(records)
}
