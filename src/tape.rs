//! This module defines the `Tape`, an unbounded two-directional cell array addressed by an
//! integer head position.
//!
//! The tape is stored as two growable halves. Offsets `0, 1, 2, ..` live in `positive`, offsets
//! `-1, -2, ..` live in `negative` at index `!offset`. Moving the head one cell beyond the
//! materialized range on either side extends that half by exactly one blank cell.

use std::ops::Range;

use crate::alphabet::Alphabet;
use crate::types::{Direction, SymbolId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    blank: SymbolId,
    head: isize,
    positive: Vec<SymbolId>,
    negative: Vec<SymbolId>,
}

impl Tape {
    /// Creates an all-blank tape: one materialized cell at offset 0.
    pub fn new(blank: SymbolId) -> Self {
        Self {
            blank,
            head: 0,
            positive: vec![blank],
            negative: Vec::new(),
        }
    }

    /// Creates a tape holding `input` at offsets `0..input.len()`.
    pub fn with_input(blank: SymbolId, input: &[SymbolId]) -> Self {
        let mut tape = Self::new(blank);
        if !input.is_empty() {
            tape.positive = input.to_vec();
        }
        tape
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> SymbolId {
        self.read_at(self.head)
    }

    /// Returns the symbol at `offset`. Cells never materialized read as blank.
    pub fn read_at(&self, offset: isize) -> SymbolId {
        let cell = if offset >= 0 {
            self.positive.get(offset as usize)
        } else {
            self.negative.get(!offset as usize)
        };

        cell.copied().unwrap_or(self.blank)
    }

    /// Overwrites the symbol under the head.
    pub fn write(&mut self, symbol: SymbolId) {
        // The head cell is always materialized.
        if self.head >= 0 {
            self.positive[self.head as usize] = symbol;
        } else {
            self.negative[!self.head as usize] = symbol;
        }
    }

    /// Moves the head, materializing one blank cell if it steps past either end.
    pub fn move_head(&mut self, direction: Direction) {
        if direction == Direction::Stay {
            return;
        }

        self.head += direction.delta();

        let blank = self.blank;
        let (half, index) = if self.head >= 0 {
            (&mut self.positive, self.head as usize)
        } else {
            (&mut self.negative, !self.head as usize)
        };

        debug_assert!(index <= half.len());
        if index == half.len() {
            half.push(blank);
        }
    }

    pub fn head(&self) -> isize {
        self.head
    }

    pub fn blank(&self) -> SymbolId {
        self.blank
    }

    /// Number of cells ever materialized.
    pub fn cells_used(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    /// Number of materialized cells at offsets `>= 0`.
    pub fn positive_len(&self) -> usize {
        self.positive.len()
    }

    /// Number of materialized cells at offsets `< 0`.
    pub fn negative_len(&self) -> usize {
        self.negative.len()
    }

    /// The offsets currently materialized, lowest first.
    pub fn span(&self) -> Range<isize> {
        -(self.negative.len() as isize)..self.positive.len() as isize
    }

    /// Returns the materialized cells from the lowest offset to the highest.
    pub fn cells(&self) -> Vec<SymbolId> {
        self.negative
            .iter()
            .rev()
            .chain(self.positive.iter())
            .copied()
            .collect()
    }

    /// Renders the window `start..end` as two lines: a `v` marking the head, then the symbols.
    pub fn render(&self, window: Range<isize>, alphabet: &Alphabet) -> String {
        let mut marker = String::new();
        let mut symbols = String::new();

        for offset in window {
            marker.push(if offset == self.head { 'v' } else { ' ' });
            symbols.push(alphabet.symbol(self.read_at(offset)));
        }

        format!("{marker}\n{symbols}\n")
    }
}
