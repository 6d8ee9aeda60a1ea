//! One episode over a reader/writer pair, optionally recorded to a transcript.

use std::io::{BufRead, Write};

use color_eyre::Result;
use tracing::{info, warn};
use warden_core::transcript::create_transcript_file;
use warden_core::{Outcome, RecordingPort, StdioPort, run_episode};

use crate::config::AgentConfig;

pub fn run_session<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    config: &AgentConfig,
) -> Result<Outcome> {
    let mut port = StdioPort::new(reader, writer);
    let Some(path) = &config.transcript else {
        return Ok(run_episode(&mut port, &config.session)?);
    };
    // A transcript is optional; the environment still gets its end line without one.
    let outcome = match create_transcript_file(path) {
        Ok(sink) => {
            info!(path = %path.display(), "recording transcript");
            run_episode(&mut RecordingPort::new(&mut port, sink), &config.session)?
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "transcript unavailable; playing unrecorded"
            );
            run_episode(&mut port, &config.session)?
        }
    };
    Ok(outcome)
}
