//! This module provides functions for analyzing a parsed state graph to detect structural errors
//! before it is flattened and run. This includes checks for the start state, references to
//! undefined states, and executable states missing a transition for some alphabet symbol.

use crate::graph::{StateGraph, StateKind};
use crate::types::TuringMachineError;
use std::collections::HashSet;
use thiserror::Error;

/// Represents the structural defects that make a machine description malformed.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AnalysisError {
    /// Zero or more than one state carries the `START` marker.
    #[error("expected exactly one START state, found {}: {:?}", .0.len(), .0)]
    StartStates(Vec<String>),
    /// A transition or `extends` clause names a state that is never declared.
    #[error("state '{state}' references undefined state '{target}'")]
    UndefinedState { state: String, target: String },
    /// An executable state has no transition for an alphabet symbol.
    #[error("state '{state}' has no transition for symbol '{symbol}'")]
    MissingTransition { state: String, symbol: char },
    /// A transition reads or writes a symbol outside the alphabet.
    #[error("state '{state}' uses symbol '{symbol}' which is not in the alphabet")]
    UnknownSymbol { state: String, symbol: char },
    /// A state lists two transitions for the same symbol.
    #[error("state '{state}' defines symbol '{symbol}' more than once")]
    DuplicateTransition { state: String, symbol: char },
    #[error("state '{0}' is declared more than once")]
    DuplicateState(String),
    /// A description declares one of the built-in terminal states.
    #[error("reserved state '{0}' cannot be declared")]
    ReservedState(String),
}

/// Analyzes a state graph for structural errors.
///
/// The checks run in a fixed order and the first defect found is returned, so the
/// reported error is deterministic for a given description.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TuringMachineError::MalformedMachine)` naming the offending state and symbol.
pub fn analyze(graph: &StateGraph) -> Result<(), TuringMachineError> {
    let errors = [check_start_state, check_undefined_states, check_totality]
        .iter()
        .filter_map(|f| f(graph).err())
        .collect::<Vec<_>>();

    if let Some(first_error) = errors.into_iter().next() {
        return Err(first_error.into());
    }

    Ok(())
}

/// Checks that exactly one state is marked as the start state.
fn check_start_state(graph: &StateGraph) -> Result<(), AnalysisError> {
    let starts = graph.start_states();

    if starts.len() != 1 {
        return Err(AnalysisError::StartStates(
            starts.into_iter().map(String::from).collect(),
        ));
    }

    Ok(())
}

/// Checks that every `next_state` and every `extends` base refers to a state in the graph.
///
/// The reserved terminal states are always present in the graph, so they never trip this check.
fn check_undefined_states(graph: &StateGraph) -> Result<(), AnalysisError> {
    for state in graph.states() {
        let transitions = match &state.kind {
            StateKind::Terminal(_) => continue,
            StateKind::Executable(table) => table,
            StateKind::Composite { base, overrides } => {
                if graph.get(base).is_none() {
                    return Err(AnalysisError::UndefinedState {
                        state: state.name.clone(),
                        target: base.clone(),
                    });
                }
                overrides
            }
        };

        for transition in transitions.iter().flatten() {
            if graph.get(&transition.next_state).is_none() {
                return Err(AnalysisError::UndefinedState {
                    state: state.name.clone(),
                    target: transition.next_state.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Checks that every executable state defines a transition for every alphabet symbol.
///
/// Composite states are skipped: their missing entries are delegated to the base state and
/// proven total when the graph is flattened.
fn check_totality(graph: &StateGraph) -> Result<(), AnalysisError> {
    for state in graph.states() {
        if let StateKind::Executable(table) = &state.kind {
            if let Some(id) = table.iter().position(Option::is_none) {
                return Err(AnalysisError::MissingTransition {
                    state: state.name.clone(),
                    symbol: graph.alphabet().symbol(id),
                });
            }
        }
    }

    Ok(())
}

/// Returns the declared states that cannot be reached from the start state, sorted by name.
///
/// Unreachable states are not an error; they are simply left out of the flattened table.
pub fn unreachable_states(graph: &StateGraph) -> Vec<String> {
    let Some(start) = graph.start_state() else {
        return Vec::new();
    };

    let mut visited = HashSet::new();
    let mut queue = vec![start.to_string()];

    while let Some(name) = queue.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }

        let Some(state) = graph.get(&name) else {
            continue;
        };

        let transitions = match &state.kind {
            StateKind::Terminal(_) => continue,
            StateKind::Executable(table) => table,
            StateKind::Composite { base, overrides } => {
                queue.push(base.clone());
                overrides
            }
        };

        for transition in transitions.iter().flatten() {
            if !visited.contains(&transition.next_state) {
                queue.push(transition.next_state.clone());
            }
        }
    }

    // BTreeMap order keeps this sorted.
    graph
        .states()
        .filter(|state| !state.is_terminal() && !visited.contains(&state.name))
        .map(|state| state.name.clone())
        .collect()
}
