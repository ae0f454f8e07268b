//! This module defines the core data structures and types used throughout the Turing Machine
//! simulator, including transitions, head moves, terminal states, run outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::analyzer::AnalysisError;
use crate::Rule;

/// Dense index of a symbol within an [`Alphabet`](crate::alphabet::Alphabet). Index 0 is blank.
pub type SymbolId = usize;
/// Dense index of a state within a [`FlatMachine`](crate::flatten::FlatMachine).
pub type StateId = usize;

/// The alphabet used when none is configured. The first symbol is the blank.
pub const DEFAULT_ALPHABET: [char; 4] = ['_', '1', 'H', 'E'];
/// The maximum allowed size for a machine description in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// Default first offset (inclusive) of the traced tape window.
pub const DEFAULT_WINDOW_START: isize = -2;
/// Default last offset (exclusive) of the traced tape window.
pub const DEFAULT_WINDOW_END: isize = 340;

/// A single transition of an executable state, as written in the machine description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine transitions to.
    pub next_state: String,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The symbol written at the head position.
    pub write: char,
}

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Decodes a head-move code. Supports `L`/`<`, `R`/`>` and `-`/`S`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" | "<" => Some(Direction::Left),
            "R" | ">" => Some(Direction::Right),
            "-" | "S" => Some(Direction::Stay),
            _ => None,
        }
    }

    /// Offset applied to the head position.
    pub fn delta(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

/// The reserved states. Reaching one ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalState {
    Accept,
    Reject,
    Error,
    Halt,
    /// Placeholder exit meant to be connected to another machine.
    Out,
}

impl TerminalState {
    pub const ALL: [TerminalState; 5] = [
        TerminalState::Accept,
        TerminalState::Reject,
        TerminalState::Error,
        TerminalState::Halt,
        TerminalState::Out,
    ];

    /// Returns the reserved state name.
    pub fn name(self) -> &'static str {
        match self {
            TerminalState::Accept => "ACCEPT",
            TerminalState::Reject => "REJECT",
            TerminalState::Error => "ERROR",
            TerminalState::Halt => "HALT",
            TerminalState::Out => "OUT",
        }
    }

    /// Looks up a reserved state by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// The final result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted { steps: usize, cells: usize },
    Rejected { steps: usize, cells: usize },
    Halted { steps: usize, cells: usize },
    /// The machine entered the reserved ERROR state.
    Errored { steps: usize },
    /// The machine reached the reserved OUT state.
    Out,
    /// The step budget ran out before a terminal state was reached.
    StepLimitExceeded { steps: usize },
}

impl Outcome {
    /// Builds the outcome reported when a run stops in `terminal`.
    pub fn terminal(terminal: TerminalState, steps: usize, cells: usize) -> Self {
        match terminal {
            TerminalState::Accept => Outcome::Accepted { steps, cells },
            TerminalState::Reject => Outcome::Rejected { steps, cells },
            TerminalState::Halt => Outcome::Halted { steps, cells },
            TerminalState::Error => Outcome::Errored { steps },
            TerminalState::Out => Outcome::Out,
        }
    }

    /// Returns true if the machine stopped in a terminal state.
    pub fn is_halted(&self) -> bool {
        !matches!(self, Outcome::StepLimitExceeded { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (verb, steps, cells) = match *self {
            Outcome::Accepted { steps, cells } => ("accepted", steps, cells),
            Outcome::Rejected { steps, cells } => ("rejected", steps, cells),
            Outcome::Halted { steps, cells } => ("halted", steps, cells),
            Outcome::Errored { steps } => {
                return write!(f, "Turing machine threw error after {steps} steps.");
            }
            Outcome::Out => {
                return write!(
                    f,
                    "Turing machine execution incomplete: reached out state.\n\
                     Perhaps this Turing machine wants to be melded with another machine."
                );
            }
            Outcome::StepLimitExceeded { steps } => {
                return write!(f, "Turing machine ran for {steps} steps without halting.");
            }
        };

        write!(
            f,
            "Turing machine {verb} after {steps} steps.\n{cells} squares of memory were used."
        )
    }
}

/// Represents the outcome of a Turing Machine execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a transition and continues execution.
    Continue,
    /// The machine is in a terminal state.
    Halt(Outcome),
}

/// Represents various errors that can occur while loading or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// The description is structurally invalid.
    #[error("Malformed machine: {0}")]
    MalformedMachine(#[from] AnalysisError),
    /// A composite state could not be resolved to primitive transitions.
    #[error("Unresolved state '{state}' on symbol '{symbol}'")]
    UnresolvedState { state: String, symbol: char },
    /// A transition carries a head move outside {Left, Right, Stay}.
    #[error("Invalid head move '{code}' in state '{state}'")]
    InvalidHeadMove { state: String, code: String },
    /// Indicates an error during the parsing of a machine description.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    #[error("Invalid alphabet: {0}")]
    InvalidAlphabet(String),
    /// The initial tape input contains a symbol outside the alphabet.
    #[error("Invalid input: symbol '{0}' is not in the alphabet")]
    InvalidInput(char),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// Writing to the trace sink failed.
    #[error("Trace output error: {0}")]
    TraceError(String),
}
