//! This module provides the parser for machine descriptions, utilizing the `pest` crate.
//! The grammar lives in `grammar.pest`; this module turns the parse tree into a validated
//! [`StateGraph`].
//!
//! A description is line oriented. The first line is a free-form header, blank lines and
//! `//` comments are ignored, and every other line either declares a state or adds a
//! transition to the most recently declared state:
//!
//! ```text
//! unary incrementer
//! START scan:
//!   _ -> ACCEPT: -: 1
//!   1 -> scan: R: 1
//! ```

use crate::{
    alphabet::Alphabet,
    analyzer::analyze,
    graph::StateGraph,
    types::{Direction, Transition, TuringMachineError},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the machine description grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct MachineParser;

/// Parses a machine description over `alphabet` into a validated `StateGraph`.
///
/// # Returns
///
/// * `Ok(StateGraph)` if the description is syntactically valid and well formed.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::InvalidHeadMove)` if a transition uses an unknown move code.
/// * `Err(TuringMachineError::MalformedMachine)` if the described graph is malformed.
pub fn parse(input: &str, alphabet: &Alphabet) -> Result<StateGraph, TuringMachineError> {
    let pairs = MachineParser::parse(Rule::machine, input)
        .map_err(|e| TuringMachineError::ParseError(Box::new(e)))?;

    let mut graph = StateGraph::new(alphabet.clone());
    let mut current: Option<String> = None;

    for pair in pairs.flat_map(Pair::into_inner) {
        match pair.as_rule() {
            Rule::declaration => current = Some(parse_declaration(pair, &mut graph)?),
            Rule::transition => {
                let span = pair.as_span();
                let state = current.as_deref().ok_or_else(|| {
                    parse_error("Transition appears before any state declaration", span)
                })?;
                parse_transition(pair, state, &mut graph)?;
            }
            _ => {} // Header and EOI
        }
    }

    analyze(&graph)?;

    Ok(graph)
}

/// Declares the state introduced by a `Pair<Rule::declaration>` and returns its name.
fn parse_declaration(
    pair: Pair<Rule>,
    graph: &mut StateGraph,
) -> Result<String, TuringMachineError> {
    let mut start = false;
    let mut name = String::new();
    let mut base = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::start_marker => start = true,
            Rule::state_name => name = p.as_str().to_string(),
            Rule::extends_clause => base = Some(parse_string(&mut p.into_inner())),
            _ => {}
        }
    }

    graph.declare(&name, start, base)?;

    Ok(name)
}

/// Adds the transition in a `Pair<Rule::transition>` to `state`.
///
/// Rule: transition > symbol, state_name, head_move, symbol
fn parse_transition(
    pair: Pair<Rule>,
    state: &str,
    graph: &mut StateGraph,
) -> Result<(), TuringMachineError> {
    let mut pairs = pair.into_inner();
    let read = parse_symbol(&mut pairs);
    let next_state = parse_string(&mut pairs);
    let code = parse_string(&mut pairs);
    let write = parse_symbol(&mut pairs);

    let direction =
        Direction::from_code(&code).ok_or_else(|| TuringMachineError::InvalidHeadMove {
            state: state.to_string(),
            code,
        })?;

    graph.add_transition(
        state,
        read,
        Transition {
            next_state,
            direction,
            write,
        },
    )?;

    Ok(())
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Extracts the string content from the current `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>) -> String {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts a single character symbol from the current `Pair` in a `Pairs` iterator.
fn parse_symbol(pairs: &mut Pairs<Rule>) -> char {
    pairs
        .next()
        .and_then(|p| p.as_str().chars().next())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalysisError;
    use crate::graph::StateKind;

    fn alphabet() -> Alphabet {
        Alphabet::parse("_1").unwrap()
    }

    #[test]
    fn test_parse_simple_machine() {
        let input = "unary incrementer
START scan:
  _ -> ACCEPT: -: 1
  1 -> scan: R: 1
";

        let graph = parse(input, &alphabet()).unwrap();
        assert_eq!(graph.start_state(), Some("scan"));
        assert_eq!(graph.declared_count(), 1);

        let scan = graph.get("scan").unwrap();
        assert_eq!(
            scan.own_transition(0),
            Some(&Transition {
                next_state: "ACCEPT".to_string(),
                direction: Direction::Stay,
                write: '1',
            })
        );
        assert_eq!(scan.own_transition(1).unwrap().direction, Direction::Right);
    }

    #[test]
    fn test_header_line_is_skipped() {
        // The header would otherwise declare a second START state.
        let input = "START ignored:
START real:
  _ -> HALT: L: _
  1 -> HALT: R: _
";

        let graph = parse(input, &alphabet()).unwrap();
        assert!(graph.get("ignored").is_none());
        assert_eq!(graph.start_state(), Some("real"));
    }

    #[test]
    fn test_comments_blank_lines_and_crlf() {
        let input = "header\r\n\r\n// the only state\r\nSTART a:   // trailing\r\n  _ -> b:R:1\r\n\r\n  1 -> REJECT: <: 1\r\nb:\r\n  _ -> a: >: _\r\n  1 -> a: S: 1\r\n";

        let graph = parse(input, &alphabet()).unwrap();
        assert_eq!(graph.declared_count(), 2);

        let a = graph.get("a").unwrap();
        assert_eq!(a.own_transition(0).unwrap().next_state, "b");
        assert_eq!(a.own_transition(1).unwrap().direction, Direction::Left);
    }

    #[test]
    fn test_parse_composite_state() {
        let input = "composite
START walk:
  _ -> ACCEPT: -: _
  1 -> walk: R: 1
back: extends walk
  1 -> back: L: 1
";

        let graph = parse(input, &alphabet()).unwrap();
        let back = graph.get("back").unwrap();
        assert!(matches!(
            &back.kind,
            StateKind::Composite { base, .. } if base == "walk"
        ));
        assert_eq!(back.own_transition(0), None);
        assert_eq!(back.own_transition(1).unwrap().next_state, "back");
    }

    #[test]
    fn test_state_named_like_marker() {
        let input = "header
START STARTER:
  _ -> START: -: _
  1 -> START: -: _
START:
  _ -> HALT: -: _
  1 -> HALT: -: _
";

        let graph = parse(input, &alphabet()).unwrap();
        assert_eq!(graph.start_state(), Some("STARTER"));
        assert!(!graph.get("START").unwrap().start);
    }

    #[test]
    fn test_missing_transition() {
        let input = "missing
START only:
  _ -> ACCEPT: R: 1
";

        let error = parse(input, &alphabet()).unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::MalformedMachine(AnalysisError::MissingTransition {
                state: "only".to_string(),
                symbol: '1',
            })
        );
    }

    #[test]
    fn test_unknown_symbol() {
        let input = "unknown
START a:
  x -> ACCEPT: R: 1
";

        let error = parse(input, &alphabet()).unwrap_err();
        assert!(matches!(
            error,
            TuringMachineError::MalformedMachine(AnalysisError::UnknownSymbol { symbol: 'x', .. })
        ));
    }

    #[test]
    fn test_invalid_head_move() {
        let input = "bad move
START a:
  _ -> ACCEPT: X: 1
  1 -> ACCEPT: R: 1
";

        let error = parse(input, &alphabet()).unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::InvalidHeadMove {
                state: "a".to_string(),
                code: "X".to_string(),
            }
        );
    }

    #[test]
    fn test_transition_before_declaration() {
        let input = "orphan
  _ -> ACCEPT: R: 1
";

        let error = parse(input, &alphabet()).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Transition appears before any state declaration"));
    }

    #[test]
    fn test_syntax_error() {
        let input = "syntax
START a:
  _ -> ACCEPT R 1
";

        let error = parse(input, &alphabet()).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
    }

    #[test]
    fn test_duplicate_and_reserved_declarations() {
        let duplicate = "dup
START a:
  _ -> a: R: _
  1 -> a: R: _
a:
";
        assert_eq!(
            parse(duplicate, &alphabet()).unwrap_err(),
            TuringMachineError::MalformedMachine(AnalysisError::DuplicateState("a".to_string()))
        );

        let reserved = "reserved
START a:
  _ -> a: R: _
  1 -> a: R: _
HALT:
";
        assert_eq!(
            parse(reserved, &alphabet()).unwrap_err(),
            TuringMachineError::MalformedMachine(AnalysisError::ReservedState(
                "HALT".to_string()
            ))
        );
    }

    #[test]
    fn test_start_state_count() {
        let none = "no start
a:
  _ -> a: R: _
  1 -> a: R: _
";
        assert!(matches!(
            parse(none, &alphabet()).unwrap_err(),
            TuringMachineError::MalformedMachine(AnalysisError::StartStates(ref starts)) if starts.is_empty()
        ));

        let two = "two starts
START a:
  _ -> b: R: _
  1 -> b: R: _
START b:
  _ -> a: R: _
  1 -> a: R: _
";
        assert!(matches!(
            parse(two, &alphabet()).unwrap_err(),
            TuringMachineError::MalformedMachine(AnalysisError::StartStates(ref starts)) if starts.len() == 2
        ));
    }

    #[test]
    fn test_undefined_next_state() {
        let input = "undefined
START a:
  _ -> nowhere: R: _
  1 -> a: R: _
";

        assert_eq!(
            parse(input, &alphabet()).unwrap_err(),
            TuringMachineError::MalformedMachine(AnalysisError::UndefinedState {
                state: "a".to_string(),
                target: "nowhere".to_string(),
            })
        );
    }
}
