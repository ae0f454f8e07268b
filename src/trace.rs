//! The tracing collaborator: receives the current state name and the tape before every step.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::ops::Range;

use crate::alphabet::Alphabet;
use crate::tape::Tape;
use crate::types::{TuringMachineError, DEFAULT_WINDOW_END, DEFAULT_WINDOW_START};

/// Receives the machine's state before each step is performed.
pub trait Tracer {
    fn trace(
        &mut self,
        state: &str,
        tape: &Tape,
        alphabet: &Alphabet,
    ) -> Result<(), TuringMachineError>;
}

/// The range of tape offsets shown in a trace, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceWindow {
    pub start: isize,
    pub end: isize,
}

impl TraceWindow {
    pub fn new(start: isize, end: isize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<isize> {
        self.start..self.end
    }
}

impl Default for TraceWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_START, DEFAULT_WINDOW_END)
    }
}

/// Writes each traced step as the state name followed by the rendered tape window.
///
/// ```text
/// scan
///    v
/// __11_
/// ```
pub struct WriterTracer<W: Write> {
    writer: W,
    window: TraceWindow,
}

impl<W: Write> WriterTracer<W> {
    pub fn new(writer: W, window: TraceWindow) -> Self {
        Self { writer, window }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Tracer for WriterTracer<W> {
    fn trace(
        &mut self,
        state: &str,
        tape: &Tape,
        alphabet: &Alphabet,
    ) -> Result<(), TuringMachineError> {
        let view = tape.render(self.window.range(), alphabet);

        writeln!(self.writer, "{state}")
            .and_then(|_| self.writer.write_all(view.as_bytes()))
            .map_err(|e| TuringMachineError::TraceError(e.to_string()))
    }
}
