//! Flattening turns a [`StateGraph`] into a [`FlatMachine`]: a dense table in which every
//! reachable state maps each symbol id directly to a `(next state, move, write)` triple.
//!
//! Composite states are resolved here by walking their `extends` chain until an executable
//! state supplies the transition. After flattening no state names or chains remain, so a
//! lookup during simulation is two indexed accesses.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::alphabet::Alphabet;
use crate::analyzer::{unreachable_states, AnalysisError};
use crate::graph::{StateGraph, StateKind};
use crate::types::{Direction, StateId, SymbolId, TerminalState, Transition, TuringMachineError};

/// A fully resolved transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatTransition {
    pub next: StateId,
    pub direction: Direction,
    pub write: SymbolId,
}

/// A state of the flattened machine. Composite states never appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatState {
    Terminal(TerminalState),
    /// One transition per alphabet symbol, indexed by [`SymbolId`].
    Executable(Box<[FlatTransition]>),
}

impl FlatState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlatState::Terminal(_))
    }

    pub fn terminal(&self) -> Option<TerminalState> {
        match self {
            FlatState::Terminal(terminal) => Some(*terminal),
            FlatState::Executable(_) => None,
        }
    }

    /// The transition for `symbol`, or `None` for terminal states.
    pub fn transition(&self, symbol: SymbolId) -> Option<&FlatTransition> {
        match self {
            FlatState::Terminal(_) => None,
            FlatState::Executable(table) => table.get(symbol),
        }
    }

    pub fn next_state(&self, symbol: SymbolId) -> Option<StateId> {
        self.transition(symbol).map(|t| t.next)
    }

    pub fn head_move(&self, symbol: SymbolId) -> Option<Direction> {
        self.transition(symbol).map(|t| t.direction)
    }

    pub fn write(&self, symbol: SymbolId) -> Option<SymbolId> {
        self.transition(symbol).map(|t| t.write)
    }
}

/// The directly dispatchable form of a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatMachine {
    alphabet: Alphabet,
    names: Vec<String>,
    states: Vec<FlatState>,
    start: StateId,
}

impl FlatMachine {
    /// Flattens a validated graph from its start state.
    ///
    /// Declared states that are unreachable from the start are logged and left out.
    pub fn from_graph(graph: &StateGraph) -> Result<Self, TuringMachineError> {
        let start = graph.start_state().ok_or_else(|| {
            AnalysisError::StartStates(graph.start_states().into_iter().map(String::from).collect())
        })?;

        let unreachable = unreachable_states(graph);
        if !unreachable.is_empty() {
            warn!(?unreachable, "states unreachable from '{}'", start);
        }

        flatten(graph, start)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state(&self, id: StateId) -> &FlatState {
        &self.states[id]
    }

    pub fn name(&self, id: StateId) -> &str {
        &self.names[id]
    }

    /// Looks up a state id by name.
    pub fn id(&self, name: &str) -> Option<StateId> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &str, &FlatState)> {
        self.names
            .iter()
            .zip(&self.states)
            .enumerate()
            .map(|(id, (name, state))| (id, name.as_str(), state))
    }
}

/// Flattens the states of `graph` reachable from `start`.
///
/// States are numbered in breadth-first order, so `start` is always id 0. Terminal states
/// pass through unchanged.
///
/// # Returns
///
/// * `Ok(FlatMachine)` with a total transition table for every executable state.
/// * `Err(TuringMachineError::UnresolvedState)` if a composite state's chain cycles or ends
///   in a terminal state for some symbol.
/// * `Err(TuringMachineError::MalformedMachine)` if a referenced state does not exist.
pub fn flatten(graph: &StateGraph, start: &str) -> Result<FlatMachine, TuringMachineError> {
    let alphabet = graph.alphabet();
    let mut ids: HashMap<String, StateId> = HashMap::new();
    let mut names: Vec<String> = Vec::new();
    let mut states: Vec<FlatState> = Vec::new();
    let mut queue = VecDeque::new();

    let mut intern = |name: &str, names: &mut Vec<String>, queue: &mut VecDeque<StateId>| {
        *ids.entry(name.to_string()).or_insert_with(|| {
            names.push(name.to_string());
            queue.push_back(names.len() - 1);
            names.len() - 1
        })
    };

    intern(start, &mut names, &mut queue);

    while let Some(id) = queue.pop_front() {
        let name = names[id].clone();
        let state = graph
            .get(&name)
            .ok_or_else(|| AnalysisError::UndefinedState {
                state: name.clone(),
                target: name.clone(),
            })?;

        let flat = match state.kind {
            StateKind::Terminal(terminal) => FlatState::Terminal(terminal),
            StateKind::Executable(_) | StateKind::Composite { .. } => {
                let mut table = Vec::with_capacity(alphabet.len());
                for symbol in 0..alphabet.len() {
                    let transition = resolve(graph, &name, symbol)?;
                    let write = alphabet.id(transition.write).ok_or_else(|| {
                        AnalysisError::UnknownSymbol {
                            state: name.clone(),
                            symbol: transition.write,
                        }
                    })?;

                    table.push(FlatTransition {
                        next: intern(&transition.next_state, &mut names, &mut queue),
                        direction: transition.direction,
                        write,
                    });
                }
                FlatState::Executable(table.into_boxed_slice())
            }
        };

        states.push(flat);
    }

    debug!(
        start,
        reachable = states.len(),
        declared = graph.declared_count(),
        "flattened state graph"
    );

    Ok(FlatMachine {
        alphabet: alphabet.clone(),
        names,
        states,
        start: 0,
    })
}

/// Follows the `extends` chain of `name` until some state defines a transition for `symbol`.
fn resolve<'g>(
    graph: &'g StateGraph,
    name: &str,
    symbol: SymbolId,
) -> Result<&'g Transition, TuringMachineError> {
    let unresolved = || TuringMachineError::UnresolvedState {
        state: name.to_string(),
        symbol: graph.alphabet().symbol(symbol),
    };

    let mut visited = HashSet::new();
    let mut current = name;

    loop {
        if !visited.insert(current) {
            return Err(unresolved());
        }

        let state = graph.get(current).ok_or_else(unresolved)?;
        if let Some(transition) = state.own_transition(symbol) {
            return Ok(transition);
        }

        match &state.kind {
            StateKind::Composite { base, .. } => current = base.as_str(),
            StateKind::Executable(_) | StateKind::Terminal(_) => return Err(unresolved()),
        }
    }
}
