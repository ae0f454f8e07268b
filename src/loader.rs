//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! descriptions from files, strings, and directories.

use crate::alphabet::Alphabet;
use crate::flatten::FlatMachine;
use crate::graph::StateGraph;
use crate::parser::parse;
use crate::types::{TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension of machine descriptions.
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading machine descriptions.
/// It provides methods to load a description from a file or string content, and to
/// discover and load all `.tm` files within a directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads and validates a single machine description from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(StateGraph)` if the file is successfully read, parsed and validated.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or is too large.
    /// * `Err(TuringMachineError::ParseError)` if the file content is not a valid description.
    /// * `Err(TuringMachineError::MalformedMachine)` if the described machine is malformed.
    pub fn load_program(path: &Path, alphabet: &Alphabet) -> Result<StateGraph, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if content.len() > MAX_PROGRAM_SIZE {
            return Err(TuringMachineError::FileError(format!(
                "File {} exceeds the maximum description size of {} bytes",
                path.display(),
                MAX_PROGRAM_SIZE
            )));
        }

        debug!(path = %path.display(), bytes = content.len(), "loading machine description");

        Self::load_program_from_string(&content, alphabet)
    }

    /// Loads a single machine description from the provided string content.
    pub fn load_program_from_string(
        content: &str,
        alphabet: &Alphabet,
    ) -> Result<StateGraph, TuringMachineError> {
        parse(content, alphabet)
    }

    /// Loads a description from `path` and flattens it, ready to be run.
    pub fn load_machine(path: &Path, alphabet: &Alphabet) -> Result<FlatMachine, TuringMachineError> {
        let graph = Self::load_program(path, alphabet)?;
        FlatMachine::from_graph(&graph)
    }

    /// Loads all machine description files (`.tm` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Each element of the result
    /// is either the path and its graph, or the error met while loading that file.
    pub fn load_programs(
        directory: &Path,
        alphabet: &Alphabet,
    ) -> Vec<Result<(PathBuf, StateGraph), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and non-.tm files
                if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                    return None;
                }

                match Self::load_program(&path, alphabet) {
                    Ok(graph) => Some(Ok((path, graph))),
                    Err(e) => Some(Err(TuringMachineError::FileError(format!(
                        "Failed to load program from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect();

        // Directory order is platform dependent.
        results.sort_by_key(|result| result.as_ref().ok().map(|(path, _)| path.clone()));
        results
    }
}
