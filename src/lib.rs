//! This crate provides the core logic for a single-tape Turing machine simulator.
//! It includes modules for parsing machine descriptions, validating and flattening their
//! state graphs, running them over a two-way unbounded tape, and tracing each step.

pub mod alphabet;
pub mod analyzer;
pub mod config;
pub mod flatten;
pub mod graph;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
pub use alphabet::Alphabet;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
pub use config::{Simulation, SimulationConfig};
pub use flatten::{flatten, FlatMachine, FlatState, FlatTransition};
pub use graph::{StateDef, StateGraph, StateKind};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
pub use tape::Tape;
pub use trace::{TraceWindow, Tracer, WriterTracer};
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Direction, Outcome, StateId, Step, SymbolId, TerminalState, Transition, TuringMachineError,
    MAX_PROGRAM_SIZE,
};
