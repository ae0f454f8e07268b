//! The ordered symbol set a machine works over.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{SymbolId, TuringMachineError, DEFAULT_ALPHABET};

/// A fixed, ordered set of symbols. The symbol at index 0 is the blank.
///
/// Symbols are addressed by their dense [`SymbolId`] at run time, so the per-step
/// dispatch never hashes a character. The character lookup is only used while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<char>", into = "Vec<char>")]
pub struct Alphabet {
    symbols: Vec<char>,
    ids: HashMap<char, SymbolId>,
}

impl Alphabet {
    /// Creates an alphabet from an ordered list of symbols.
    ///
    /// Fails if the list is empty, contains duplicates, or contains whitespace.
    pub fn new(symbols: Vec<char>) -> Result<Self, TuringMachineError> {
        if symbols.is_empty() {
            return Err(TuringMachineError::InvalidAlphabet(
                "alphabet must contain at least the blank symbol".to_string(),
            ));
        }

        let mut ids = HashMap::with_capacity(symbols.len());
        for (id, &symbol) in symbols.iter().enumerate() {
            if symbol.is_whitespace() {
                return Err(TuringMachineError::InvalidAlphabet(format!(
                    "whitespace symbol {symbol:?} is not allowed"
                )));
            }
            if ids.insert(symbol, id).is_some() {
                return Err(TuringMachineError::InvalidAlphabet(format!(
                    "duplicate symbol '{symbol}'"
                )));
            }
        }

        Ok(Self { symbols, ids })
    }

    /// Parses an alphabet written as a string of symbols, e.g. `"_1HE"`.
    pub fn parse(symbols: &str) -> Result<Self, TuringMachineError> {
        Self::new(symbols.chars().filter(|c| !c.is_whitespace()).collect())
    }

    /// The blank symbol id.
    pub fn blank(&self) -> SymbolId {
        0
    }

    pub fn blank_symbol(&self) -> char {
        self.symbols[0]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns the id of `symbol`, if it belongs to the alphabet.
    pub fn id(&self, symbol: char) -> Option<SymbolId> {
        self.ids.get(&symbol).copied()
    }

    /// Returns the character for `id`. Unknown ids render as `?`.
    pub fn symbol(&self, id: SymbolId) -> char {
        self.symbols.get(id).copied().unwrap_or('?')
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.ids.contains_key(&symbol)
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Encodes a string of symbols into ids.
    pub fn encode(&self, input: &str) -> Result<Vec<SymbolId>, TuringMachineError> {
        input
            .chars()
            .map(|c| self.id(c).ok_or(TuringMachineError::InvalidInput(c)))
            .collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        let symbols = DEFAULT_ALPHABET.to_vec();
        let ids = symbols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { symbols, ids }
    }
}

impl TryFrom<Vec<char>> for Alphabet {
    type Error = TuringMachineError;

    fn try_from(symbols: Vec<char>) -> Result<Self, Self::Error> {
        Self::new(symbols)
    }
}

impl From<Alphabet> for Vec<char> {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.symbols
    }
}
