//! The parsed, not yet flattened, state graph of a machine.

use std::collections::BTreeMap;

use crate::alphabet::Alphabet;
use crate::analyzer::AnalysisError;
use crate::types::{SymbolId, TerminalState, Transition};

/// The kinds of state a description can contain.
#[derive(Debug, Clone, PartialEq)]
pub enum StateKind {
    /// One of the reserved states. Carries no transitions.
    Terminal(TerminalState),
    /// One transition slot per alphabet symbol, indexed by [`SymbolId`].
    Executable(Vec<Option<Transition>>),
    /// A state declared with `extends base`: listed symbols override the base, the rest
    /// are delegated to it. Eliminated by flattening.
    Composite {
        base: String,
        overrides: Vec<Option<Transition>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateDef {
    pub name: String,
    pub start: bool,
    pub kind: StateKind,
}

impl StateDef {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, StateKind::Terminal(_))
    }

    /// The transition this state itself defines for `symbol`, without following any base.
    pub fn own_transition(&self, symbol: SymbolId) -> Option<&Transition> {
        match &self.kind {
            StateKind::Terminal(_) => None,
            StateKind::Executable(table) | StateKind::Composite { overrides: table, .. } => {
                table.get(symbol).and_then(Option::as_ref)
            }
        }
    }

    fn table_mut(&mut self) -> Option<&mut Vec<Option<Transition>>> {
        match &mut self.kind {
            StateKind::Terminal(_) => None,
            StateKind::Executable(table) | StateKind::Composite { overrides: table, .. } => {
                Some(table)
            }
        }
    }
}

/// A mapping from state name to definition, always containing the reserved terminal states.
#[derive(Debug, Clone, PartialEq)]
pub struct StateGraph {
    alphabet: Alphabet,
    states: BTreeMap<String, StateDef>,
}

impl StateGraph {
    pub fn new(alphabet: Alphabet) -> Self {
        let states = TerminalState::ALL
            .into_iter()
            .map(|terminal| {
                let def = StateDef {
                    name: terminal.name().to_string(),
                    start: false,
                    kind: StateKind::Terminal(terminal),
                };
                (def.name.clone(), def)
            })
            .collect();

        Self { alphabet, states }
    }

    /// Declares a new state. A `base` makes it a composite state.
    pub fn declare(
        &mut self,
        name: &str,
        start: bool,
        base: Option<String>,
    ) -> Result<(), AnalysisError> {
        if TerminalState::from_name(name).is_some() {
            return Err(AnalysisError::ReservedState(name.to_string()));
        }
        if self.states.contains_key(name) {
            return Err(AnalysisError::DuplicateState(name.to_string()));
        }

        let table = vec![None; self.alphabet.len()];
        let kind = match base {
            Some(base) => StateKind::Composite {
                base,
                overrides: table,
            },
            None => StateKind::Executable(table),
        };

        self.states.insert(
            name.to_string(),
            StateDef {
                name: name.to_string(),
                start,
                kind,
            },
        );

        Ok(())
    }

    /// Adds the transition taken by `state` when reading `symbol`.
    ///
    /// Both the read symbol and the written symbol must belong to the alphabet, and each
    /// symbol may be given only once per state.
    pub fn add_transition(
        &mut self,
        state: &str,
        symbol: char,
        transition: Transition,
    ) -> Result<(), AnalysisError> {
        let unknown = |symbol| AnalysisError::UnknownSymbol {
            state: state.to_string(),
            symbol,
        };

        let id = self.alphabet.id(symbol).ok_or_else(|| unknown(symbol))?;
        if !self.alphabet.contains(transition.write) {
            return Err(unknown(transition.write));
        }

        let table = self
            .states
            .get_mut(state)
            .and_then(StateDef::table_mut)
            .ok_or_else(|| AnalysisError::UndefinedState {
                state: state.to_string(),
                target: state.to_string(),
            })?;

        if table[id].is_some() {
            return Err(AnalysisError::DuplicateTransition {
                state: state.to_string(),
                symbol,
            });
        }
        table[id] = Some(transition);

        Ok(())
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn get(&self, name: &str) -> Option<&StateDef> {
        self.states.get(name)
    }

    /// All states, terminal ones included, ordered by name.
    pub fn states(&self) -> impl Iterator<Item = &StateDef> {
        self.states.values()
    }

    /// Number of declared (non-terminal) states.
    pub fn declared_count(&self) -> usize {
        self.states().filter(|state| !state.is_terminal()).count()
    }

    /// Names of every state carrying the `START` marker.
    pub fn start_states(&self) -> Vec<&str> {
        self.states()
            .filter(|state| state.start)
            .map(|state| state.name.as_str())
            .collect()
    }

    /// The start state, if exactly one is marked.
    pub fn start_state(&self) -> Option<&str> {
        match self.start_states().as_slice() {
            [start] => Some(*start),
            _ => None,
        }
    }
}
