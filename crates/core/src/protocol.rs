//! Line protocol between the agent and the environment.
//! This module exists so wire spelling lives in one place, separate from transport.
//! It does not own reading or writing streams.

use std::fmt;

use crate::types::{Command, Percept, PerceptTag, Pos};

/// Sentinel carried by the episode-end command when no solution was found.
pub const NO_SOLUTION: i64 = -1;

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(pos) => write!(f, "m {} {}", pos.x, pos.y),
            Command::CloakOn => write!(f, "r"),
            Command::CloakOff => write!(f, "rr"),
            Command::End(Some(moves)) => write!(f, "e {moves}"),
            Command::End(None) => write!(f, "e {NO_SOLUTION}"),
        }
    }
}

/// Decodes one `x y tag` record. Malformed coordinates or unknown tags yield `None`.
pub fn parse_percept(x: &str, y: &str, tag: &str) -> Option<Percept> {
    let x = x.parse().ok()?;
    let y = y.parse().ok()?;
    let mut chars = tag.chars();
    let tag = PerceptTag::from_tag(chars.next()?)?;
    Some(Percept { pos: Pos { x, y }, tag })
}

/// Extracts the first two integers on a destination report line, skipping other tokens.
pub fn parse_destination_line(line: &str) -> Option<Pos> {
    let mut numbers = line.split_whitespace().filter_map(|token| token.parse::<i32>().ok());
    let x = numbers.next()?;
    let y = numbers.next()?;
    Some(Pos { x, y })
}
