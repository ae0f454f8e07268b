//! A read-only registry of sample machines embedded in the binary.

use crate::alphabet::Alphabet;
use crate::flatten::FlatMachine;
use crate::graph::StateGraph;
use crate::parser::parse;
use crate::types::TuringMachineError;

// (name, alphabet, source)
const PROGRAM_TEXTS: [(&str, &str, &str); 5] = [
    (
        "unary-increment",
        "_1",
        include_str!("../machines/unary-increment.tm"),
    ),
    ("parity", "_1", include_str!("../machines/parity.tm")),
    (
        "busy-beaver-2",
        "_1",
        include_str!("../machines/busy-beaver-2.tm"),
    ),
    (
        "binary-increment",
        "_01",
        include_str!("../machines/binary-increment.tm"),
    ),
    (
        "unary-addition",
        "_1HE",
        include_str!("../machines/unary-addition.tm"),
    ),
];

lazy_static::lazy_static! {
    /// Built once on first use and never mutated.
    pub static ref PROGRAMS: Vec<ProgramInfo> = PROGRAM_TEXTS
        .iter()
        .map(|&(name, alphabet, source)| ProgramInfo { name, alphabet, source })
        .collect();
}

/// An embedded sample machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramInfo {
    pub name: &'static str,
    /// The symbols the machine runs over, blank first.
    pub alphabet: &'static str,
    pub source: &'static str,
}

impl ProgramInfo {
    /// The header line of the description.
    pub fn description(&self) -> &'static str {
        self.source.lines().next().unwrap_or_default()
    }

    pub fn alphabet(&self) -> Result<Alphabet, TuringMachineError> {
        Alphabet::parse(self.alphabet)
    }

    pub fn graph(&self) -> Result<StateGraph, TuringMachineError> {
        parse(self.source, &self.alphabet()?)
    }

    pub fn machine(&self) -> Result<FlatMachine, TuringMachineError> {
        FlatMachine::from_graph(&self.graph()?)
    }
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<ProgramInfo, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .copied()
            .ok_or_else(|| TuringMachineError::ConfigError(format!("Program '{}' not found", name)))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name).collect()
    }

    pub fn programs() -> &'static [ProgramInfo] {
        &PROGRAMS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::TuringMachine;
    use crate::types::Outcome;

    fn run(name: &str, input: &str) -> (Outcome, String) {
        let program = ProgramManager::get_program_by_name(name).unwrap();
        let mut machine = TuringMachine::with_input(program.machine().unwrap(), input).unwrap();
        let outcome = machine.run(Some(10_000));
        (outcome, machine.tape_contents())
    }

    #[test]
    fn test_all_programs_load() {
        assert_eq!(ProgramManager::get_program_count(), PROGRAM_TEXTS.len());

        for program in ProgramManager::programs() {
            assert!(
                program.machine().is_ok(),
                "program {} failed to load",
                program.name
            );
            assert!(!program.description().is_empty());
        }
    }

    #[test]
    fn test_program_lookup() {
        assert!(ProgramManager::list_program_names().contains(&"parity"));
        assert!(matches!(
            ProgramManager::get_program_by_name("nope"),
            Err(TuringMachineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_unary_increment() {
        let (outcome, tape) = run("unary-increment", "111");
        assert_eq!(outcome, Outcome::Accepted { steps: 4, cells: 4 });
        assert_eq!(tape, "1111");
    }

    #[test]
    fn test_parity() {
        assert!(matches!(run("parity", "11").0, Outcome::Accepted { steps: 3, .. }));
        assert!(matches!(run("parity", "111").0, Outcome::Rejected { steps: 4, .. }));
    }

    #[test]
    fn test_busy_beaver() {
        let (outcome, tape) = run("busy-beaver-2", "");
        assert_eq!(outcome, Outcome::Halted { steps: 6, cells: 4 });
        assert_eq!(tape, "1111");
    }

    #[test]
    fn test_binary_increment() {
        let (outcome, tape) = run("binary-increment", "1011");
        assert_eq!(outcome, Outcome::Accepted { steps: 8, cells: 5 });
        assert_eq!(tape, "1100_");

        let (_, tape) = run("binary-increment", "111");
        assert_eq!(tape, "1000_");
    }

    #[test]
    fn test_unary_addition_uses_guard() {
        let (outcome, tape) = run("unary-addition", "11H111");
        assert_eq!(outcome, Outcome::Halted { steps: 8, cells: 7 });
        assert_eq!(tape, "11111__");

        let (outcome, _) = run("unary-addition", "1E");
        assert_eq!(outcome, Outcome::Errored { steps: 2 });
    }
}
