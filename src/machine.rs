//! This module defines the `TuringMachine` struct, which runs a flattened single-tape machine.
//! It owns the tape and the run state (current state, step counter) and dispatches every step
//! through the flat transition table.

use tracing::{debug, info};

use crate::alphabet::Alphabet;
use crate::flatten::{FlatMachine, FlatState};
use crate::loader::ProgramLoader;
use crate::tape::Tape;
use crate::trace::Tracer;
use crate::types::{Outcome, StateId, Step, SymbolId, TuringMachineError};

/// Represents a single-tape Turing Machine over a flattened transition table.
///
/// Each instance is self-contained: independent machines can run side by side in one
/// process without sharing any state.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    program: FlatMachine,
    input: Vec<SymbolId>,
    tape: Tape,
    state: StateId,
    step_count: usize,
}

impl TuringMachine {
    /// Creates a machine that will run `program` on an all-blank tape.
    pub fn new(program: FlatMachine) -> Self {
        Self::from_symbols(program, Vec::new())
    }

    /// Creates a machine that will run `program` with `input` written at offsets `0..`.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::InvalidInput)` if `input` contains a symbol outside the alphabet.
    pub fn with_input(program: FlatMachine, input: &str) -> Result<Self, TuringMachineError> {
        let symbols = program.alphabet().encode(input)?;
        Ok(Self::from_symbols(program, symbols))
    }

    /// Parses, validates and flattens `source` over `alphabet`, ready to run on a blank tape.
    pub fn from_source(source: &str, alphabet: &Alphabet) -> Result<Self, TuringMachineError> {
        let graph = ProgramLoader::load_program_from_string(source, alphabet)?;
        Ok(Self::new(FlatMachine::from_graph(&graph)?))
    }

    fn from_symbols(program: FlatMachine, input: Vec<SymbolId>) -> Self {
        let tape = Tape::with_input(program.alphabet().blank(), &input);
        let state = program.start();

        debug!(
            states = program.len(),
            input_len = input.len(),
            "created machine"
        );

        Self {
            program,
            input,
            tape,
            state,
            step_count: 0,
        }
    }

    /// Executes a single step of the machine's computation.
    ///
    /// Reads the symbol under the head, writes, moves the head, and switches to the next
    /// state, all through one indexed lookup into the flat table.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition was performed.
    /// * `Step::Halt(outcome)` if the machine is in a terminal state. Nothing is mutated.
    pub fn step(&mut self) -> Step {
        let transition = match self.program.state(self.state) {
            FlatState::Terminal(terminal) => {
                return Step::Halt(Outcome::terminal(
                    *terminal,
                    self.step_count,
                    self.tape.cells_used(),
                ));
            }
            FlatState::Executable(table) => table[self.tape.read()],
        };

        self.tape.write(transition.write);
        self.tape.move_head(transition.direction);
        self.state = transition.next;
        self.step_count += 1;

        Step::Continue
    }

    /// Runs until a terminal state is reached or `step_limit` steps have been executed.
    ///
    /// `None` means no limit. Reaching the limit is reported as
    /// `Outcome::StepLimitExceeded`, not as an error.
    pub fn run(&mut self, step_limit: Option<usize>) -> Outcome {
        loop {
            if let Some(outcome) = self.check(step_limit) {
                self.report(&outcome);
                return outcome;
            }
            self.step();
        }
    }

    /// Like [`run`](Self::run), but hands the current state and tape to `tracer` before
    /// each step, including the final terminal state.
    pub fn run_traced<T: Tracer + ?Sized>(
        &mut self,
        step_limit: Option<usize>,
        tracer: &mut T,
    ) -> Result<Outcome, TuringMachineError> {
        loop {
            tracer.trace(self.state_name(), &self.tape, self.program.alphabet())?;

            if let Some(outcome) = self.check(step_limit) {
                self.report(&outcome);
                return Ok(outcome);
            }
            self.step();
        }
    }

    /// Returns the outcome if the run must stop now: a terminal state first, then the budget.
    fn check(&self, step_limit: Option<usize>) -> Option<Outcome> {
        if let Some(outcome) = self.outcome() {
            return Some(outcome);
        }

        match step_limit {
            Some(limit) if self.step_count >= limit => Some(Outcome::StepLimitExceeded {
                steps: self.step_count,
            }),
            _ => None,
        }
    }

    fn report(&self, outcome: &Outcome) {
        info!(
            state = self.state_name(),
            steps = self.step_count,
            cells = self.tape.cells_used(),
            ?outcome,
            "run finished"
        );
    }

    /// The terminal outcome, if the machine is in a terminal state.
    pub fn outcome(&self) -> Option<Outcome> {
        self.program
            .state(self.state)
            .terminal()
            .map(|terminal| Outcome::terminal(terminal, self.step_count, self.tape.cells_used()))
    }

    /// Checks if the machine is in a terminal state.
    pub fn is_halted(&self) -> bool {
        self.program.state(self.state).is_terminal()
    }

    /// Returns the name of the current state.
    pub fn state_name(&self) -> &str {
        self.program.name(self.state)
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    /// Returns the total number of steps executed.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn program(&self) -> &FlatMachine {
        &self.program
    }

    /// Renders the materialized tape as symbols, lowest offset first.
    pub fn tape_contents(&self) -> String {
        let alphabet = self.program.alphabet();
        self.tape.cells().into_iter().map(|id| alphabet.symbol(id)).collect()
    }

    /// Resets the machine to its start state, the loaded input, and zero steps.
    pub fn reset(&mut self) {
        self.tape = Tape::with_input(self.program.alphabet().blank(), &self.input);
        self.state = self.program.start();
        self.step_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{TraceWindow, WriterTracer};

    fn load(source: &str) -> TuringMachine {
        TuringMachine::from_source(source, &Alphabet::parse("_1").unwrap()).unwrap()
    }

    const ACCEPT_IMMEDIATELY: &str = "accept
START a:
  _ -> ACCEPT: -: _
  1 -> ACCEPT: -: 1
";

    const WRITE_FOREVER: &str = "write forever
START loop:
  _ -> loop: R: 1
  1 -> loop: R: 1
";

    #[test]
    fn test_machine_creation() {
        let machine = load(ACCEPT_IMMEDIATELY);

        assert_eq!(machine.state_name(), "a");
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.tape().head(), 0);
        assert!(!machine.is_halted());
        assert_eq!(machine.outcome(), None);
    }

    #[test]
    fn test_accept_after_one_step() {
        let mut machine = load(ACCEPT_IMMEDIATELY);

        let outcome = machine.run(None);
        assert_eq!(outcome, Outcome::Accepted { steps: 1, cells: 1 });
        assert!(machine.is_halted());
    }

    #[test]
    fn test_step_in_terminal_state_does_nothing() {
        let mut machine = load(ACCEPT_IMMEDIATELY);

        assert_eq!(machine.step(), Step::Continue);
        let halt = machine.step();
        assert_eq!(halt, Step::Halt(Outcome::Accepted { steps: 1, cells: 1 }));
        assert_eq!(machine.step(), halt);
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_step_limit_exceeded() {
        let mut machine = load(WRITE_FOREVER);

        let outcome = machine.run(Some(5));
        assert_eq!(outcome, Outcome::StepLimitExceeded { steps: 5 });
        assert_eq!(machine.tape().cells_used(), 6);
        assert_eq!(machine.tape_contents(), "11111_");
        assert_eq!(machine.tape().head(), 5);
    }

    #[test]
    fn test_zero_step_limit() {
        let mut machine = load(WRITE_FOREVER);
        assert_eq!(
            machine.run(Some(0)),
            Outcome::StepLimitExceeded { steps: 0 }
        );
    }

    #[test]
    fn test_terminal_on_last_budgeted_step() {
        let mut machine = load(ACCEPT_IMMEDIATELY);
        assert_eq!(
            machine.run(Some(1)),
            Outcome::Accepted { steps: 1, cells: 1 }
        );
    }

    #[test]
    fn test_terminal_outcomes() {
        let cases = [
            ("REJECT", Outcome::Rejected { steps: 1, cells: 1 }),
            ("HALT", Outcome::Halted { steps: 1, cells: 1 }),
            ("ERROR", Outcome::Errored { steps: 1 }),
            ("OUT", Outcome::Out),
        ];

        for (terminal, expected) in cases {
            let source = format!(
                "terminal\nSTART a:\n  _ -> {terminal}: -: _\n  1 -> {terminal}: -: 1\n"
            );
            let mut machine = load(&source);

            assert_eq!(machine.run(Some(100)), expected, "terminal {terminal}");
            assert_eq!(machine.step_count(), 1);
        }
    }

    #[test]
    fn test_with_input() {
        let program = load(WRITE_FOREVER).program().clone();

        let machine = TuringMachine::with_input(program.clone(), "1_1").unwrap();
        assert_eq!(machine.tape_contents(), "1_1");
        assert_eq!(machine.tape().cells_used(), 3);

        assert_eq!(
            TuringMachine::with_input(program, "1x").unwrap_err(),
            TuringMachineError::InvalidInput('x')
        );
    }

    #[test]
    fn test_left_moves_extend_negative_side() {
        let mut machine = load(
            "left
START a:
  _ -> a: L: 1
  1 -> HALT: -: 1
",
        );
        machine.step();
        machine.step();

        assert_eq!(machine.tape().head(), -2);
        assert_eq!(machine.tape().negative_len(), 2);
        assert_eq!(machine.tape_contents(), "_11");
        assert_eq!(machine.tape().read_at(0), 1);
    }

    #[test]
    fn test_reset() {
        let program = load(WRITE_FOREVER).program().clone();
        let mut machine = TuringMachine::with_input(program, "1").unwrap();

        machine.run(Some(3));
        assert_eq!(machine.step_count(), 3);

        machine.reset();
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.state_name(), "loop");
        assert_eq!(machine.tape_contents(), "1");
        assert_eq!(machine.tape().head(), 0);
    }

    #[test]
    fn test_trace_shows_state_before_step() {
        let mut machine = load(ACCEPT_IMMEDIATELY);
        let mut tracer = WriterTracer::new(Vec::new(), TraceWindow::new(0, 2));

        let outcome = machine.run_traced(None, &mut tracer).unwrap();
        assert_eq!(outcome, Outcome::Accepted { steps: 1, cells: 1 });

        let output = String::from_utf8(tracer.into_inner()).unwrap();
        assert_eq!(output, "a\nv \n__\nACCEPT\nv \n__\n");
    }

    #[test]
    fn test_trace_stops_at_step_limit() {
        let mut machine = load(WRITE_FOREVER);
        let mut tracer = WriterTracer::new(Vec::new(), TraceWindow::new(0, 1));

        machine.run_traced(Some(2), &mut tracer).unwrap();

        let output = String::from_utf8(tracer.into_inner()).unwrap();
        assert_eq!(output.matches("loop\n").count(), 3);
    }
}
