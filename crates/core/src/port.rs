//! The agent's only channel to the world.
//!
//! Strategies never touch streams directly: they issue [`Command`]s and read
//! percepts through an [`EnvironmentPort`]. [`StdioPort`] speaks the line
//! protocol over any `BufRead`/`Write` pair; the simulated world in
//! [`crate::sim`] implements the same trait in memory.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::error::PortError;
use crate::protocol::{parse_destination_line, parse_percept};
use crate::types::{Command, Percept, Pos, SessionStart};

pub trait EnvironmentPort {
    /// Reads the difficulty variant and the guide coordinate.
    fn read_session_start(&mut self) -> Result<SessionStart, PortError>;

    /// Reads one percept batch. Malformed records are dropped.
    fn read_percepts(&mut self) -> Result<Vec<Percept>, PortError>;

    /// Reads the one-line destination report. `Ok(None)` when the line does not
    /// carry a coordinate pair.
    fn read_destination_report(&mut self) -> Result<Option<Pos>, PortError>;

    fn send(&mut self, command: Command) -> Result<(), PortError>;
}

impl<P: EnvironmentPort + ?Sized> EnvironmentPort for &mut P {
    fn read_session_start(&mut self) -> Result<SessionStart, PortError> {
        (**self).read_session_start()
    }

    fn read_percepts(&mut self) -> Result<Vec<Percept>, PortError> {
        (**self).read_percepts()
    }

    fn read_destination_report(&mut self) -> Result<Option<Pos>, PortError> {
        (**self).read_destination_report()
    }

    fn send(&mut self, command: Command) -> Result<(), PortError> {
        (**self).send(command)
    }
}

/// Line protocol over a reader/writer pair. Tokens may span lines.
pub struct StdioPort<R, W> {
    reader: R,
    writer: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> StdioPort<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer, pending: VecDeque::new() }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn read_line(&mut self) -> Result<Option<String>, PortError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn next_token(&mut self) -> Result<String, PortError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            let line = self.read_line()?.ok_or(PortError::Closed)?;
            self.pending.extend(line.split_whitespace().map(str::to_owned));
        }
    }

    fn next_number<T: FromStr>(&mut self, expected: &'static str) -> Result<T, PortError> {
        let token = self.next_token()?;
        token.parse().map_err(|_| PortError::Malformed { expected, found: token })
    }
}

impl<R: BufRead, W: Write> EnvironmentPort for StdioPort<R, W> {
    fn read_session_start(&mut self) -> Result<SessionStart, PortError> {
        let variant = self.next_number("variant number")?;
        let x = self.next_number("guide x coordinate")?;
        let y = self.next_number("guide y coordinate")?;
        Ok(SessionStart { variant, guide: Pos { x, y } })
    }

    fn read_percepts(&mut self) -> Result<Vec<Percept>, PortError> {
        let count: usize = self.next_number("percept count")?;
        // The count is untrusted; records arrive one by one.
        let mut percepts = Vec::new();
        for _ in 0..count {
            let x = self.next_token()?;
            let y = self.next_token()?;
            let tag = self.next_token()?;
            if let Some(percept) = parse_percept(&x, &y, &tag) {
                percepts.push(percept);
            }
        }
        Ok(percepts)
    }

    fn read_destination_report(&mut self) -> Result<Option<Pos>, PortError> {
        // The report is the next whole line; leftovers of the current line are dropped.
        self.pending.clear();
        Ok(self.read_line()?.as_deref().and_then(parse_destination_line))
    }

    fn send(&mut self, command: Command) -> Result<(), PortError> {
        writeln!(self.writer, "{command}")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::types::{EnemyKind, PerceptTag};

    fn port(input: &str) -> StdioPort<Cursor<Vec<u8>>, Vec<u8>> {
        StdioPort::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn reads_header_and_batch() {
        let mut port = port("2\n4 5\n3\n0 1 P\n1 0 O\n9 9 Z\n");
        let start = port.read_session_start().expect("header");
        assert_eq!(start, SessionStart { variant: 2, guide: Pos::new(4, 5) });
        assert_eq!(start.perception_radius(), 2);

        let percepts = port.read_percepts().expect("batch");
        assert_eq!(
            percepts,
            vec![
                Percept { pos: Pos::new(0, 1), tag: PerceptTag::Ambient },
                Percept { pos: Pos::new(1, 0), tag: PerceptTag::Enemy(EnemyKind::Scout) },
            ]
        );
    }

    #[test]
    fn records_may_span_lines() {
        let mut port = port("2 0 1\nC 1 1 G\n");
        let percepts = port.read_percepts().expect("batch");
        assert_eq!(percepts.len(), 2);
    }

    #[test]
    fn destination_report_reads_the_next_whole_line() {
        let mut port = port("1\n0 0 G trailing\ntarget at 6 7\n0\n");
        let percepts = port.read_percepts().expect("batch");
        assert_eq!(percepts.len(), 1);
        assert_eq!(port.read_destination_report().expect("report"), Some(Pos::new(6, 7)));
        assert!(port.read_percepts().expect("empty batch").is_empty());
    }

    #[test]
    fn unparseable_destination_report_is_none() {
        let mut port = port("0\nnothing here\n");
        port.read_percepts().expect("batch");
        assert_eq!(port.read_destination_report().expect("report"), None);
        assert_eq!(port.read_destination_report().expect("eof report"), None);
    }

    #[test]
    fn closed_input_and_bad_counts_are_errors() {
        let mut closed = port("");
        assert!(matches!(closed.read_percepts(), Err(PortError::Closed)));

        let mut bad = port("many\n");
        assert!(matches!(
            bad.read_percepts(),
            Err(PortError::Malformed { expected: "percept count", .. })
        ));
    }

    #[test]
    fn huge_count_runs_out_of_input_instead_of_allocating() {
        let mut port = port("18446744073709551615\n0 1 P\n");
        assert!(matches!(port.read_percepts(), Err(PortError::Closed)));
    }

    #[test]
    fn commands_are_written_one_per_line() {
        let mut port = port("");
        port.send(Command::Move(Pos::new(1, 0))).expect("send");
        port.send(Command::CloakOn).expect("send");
        port.send(Command::End(None)).expect("send");
        let written = String::from_utf8(port.into_writer()).expect("utf8");
        assert_eq!(written, "m 1 0\nr\ne -1\n");
    }
}
