//! Run configuration and the `Simulation` runner that ties loading, flattening and the
//! engine together.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::flatten::FlatMachine;
use crate::loader::ProgramLoader;
use crate::machine::TuringMachine;
use crate::trace::{TraceWindow, WriterTracer};
use crate::types::{Outcome, TuringMachineError};

/// Everything needed to load and run one machine.
///
/// Missing fields take their defaults when deserialized, so a JSON file only needs the
/// values it changes:
///
/// ```json
/// { "source": "machines/parity.tm", "alphabet": ["_", "1"], "input": "11", "quiet": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Path of the machine description.
    pub source: PathBuf,
    pub alphabet: Alphabet,
    /// Initial tape contents, written from offset 0.
    pub input: String,
    /// Maximum number of steps. `None` runs until a terminal state.
    pub step_limit: Option<usize>,
    /// Suppresses the per-step trace.
    pub quiet: bool,
    /// File receiving the trace. `None` writes to stdout.
    pub trace_output: Option<PathBuf>,
    pub window: TraceWindow,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            alphabet: Alphabet::default(),
            input: String::new(),
            step_limit: None,
            quiet: false,
            trace_output: None,
            window: TraceWindow::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(content: &str) -> Result<Self, TuringMachineError> {
        serde_json::from_str(content).map_err(|e| TuringMachineError::ConfigError(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            TuringMachineError::ConfigError(format!("{}: {}", path.display(), e))
        })
    }
}

/// A loaded machine plus the settings it runs with.
///
/// Construction does all the validation: a `Simulation` only exists for a description that
/// parsed, validated and flattened, so no step ever runs on an unresolved table.
pub struct Simulation {
    config: SimulationConfig,
    machine: TuringMachine,
}

impl Simulation {
    /// Loads `config.source` and prepares the machine.
    pub fn from_config(config: SimulationConfig) -> Result<Self, TuringMachineError> {
        if config.source.as_os_str().is_empty() {
            return Err(TuringMachineError::ConfigError(
                "no machine description given".to_string(),
            ));
        }

        let program = ProgramLoader::load_machine(&config.source, &config.alphabet)?;
        Self::with_program(config, program)
    }

    /// Prepares a machine from description text instead of `config.source`.
    pub fn from_source(config: SimulationConfig, source: &str) -> Result<Self, TuringMachineError> {
        let graph = ProgramLoader::load_program_from_string(source, &config.alphabet)?;
        let program = FlatMachine::from_graph(&graph)?;
        Self::with_program(config, program)
    }

    fn with_program(
        config: SimulationConfig,
        program: FlatMachine,
    ) -> Result<Self, TuringMachineError> {
        let machine = TuringMachine::with_input(program, &config.input)?;
        debug!(
            source = %config.source.display(),
            step_limit = ?config.step_limit,
            quiet = config.quiet,
            "simulation ready"
        );

        Ok(Self { config, machine })
    }

    /// Runs the machine, tracing to the configured output unless quiet.
    pub fn run(&mut self) -> Result<Outcome, TuringMachineError> {
        if self.config.quiet {
            return Ok(self.machine.run(self.config.step_limit));
        }

        match self.config.trace_output.clone() {
            Some(path) => {
                let file = File::create(&path).map_err(|e| {
                    TuringMachineError::FileError(format!(
                        "Failed to create trace file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                self.run_with_sink(BufWriter::new(file))
            }
            None => self.run_with_sink(io::stdout().lock()),
        }
    }

    /// Runs the machine, writing the trace to `sink` unless quiet.
    pub fn run_with_sink<W: Write>(&mut self, sink: W) -> Result<Outcome, TuringMachineError> {
        if self.config.quiet {
            return Ok(self.machine.run(self.config.step_limit));
        }

        let mut tracer = WriterTracer::new(sink, self.config.window);
        let outcome = self.machine.run_traced(self.config.step_limit, &mut tracer)?;

        tracer
            .into_inner()
            .flush()
            .map_err(|e| TuringMachineError::TraceError(e.to_string()))?;

        Ok(outcome)
    }

    pub fn machine(&self) -> &TuringMachine {
        &self.machine
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
