//! Error types reported by the table-driven parser and by table loading.
//!
//! [`ParseError`] separates the one user-facing failure, a syntax error
//! at a given input position, from the internal invariant violations that
//! can only be caused by defective tables (a missing GOTO entry, a reduce
//! that pops below the bottom of the stack, or a dangling production
//! index). The latter never depend on the input and indicate a bug in
//! the generator or a corrupted artifact.
//!
//! [`TableError`] is raised while validating tables that were built or
//! deserialized outside of the generator.

use crate::{ProdId, StateId};
use smartstring::alias::String;
use std::fmt;
use thiserror::Error;

/// Failure of a single [`Parser::parse`](crate::Parser::parse) call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No action is defined for the current state and lookahead.
    #[error("syntax error at position {position}: unexpected `{unexpected}`, expected {}", Expected(.expected))]
    SyntaxError {
        /// Index of the offending token in the input sequence.
        position: usize,
        /// Terminal that could not be handled; `$` for end of input.
        unexpected: String,
        /// Terminals that have an action in the failing state, sorted.
        expected: Vec<String>,
    },

    /// A reduction left a state without a GOTO entry for the reduced
    /// non-terminal. Always a table defect.
    #[error("missing goto for state {state} on `{nonterminal}`")]
    MissingGoto {
        state: StateId,
        nonterminal: String,
    },

    /// A reduction tried to pop more states than the stack holds.
    #[error("stack underflow reducing production {production} (stack depth {depth})")]
    StackUnderflow { production: ProdId, depth: usize },

    /// A reduce action refers to a production that does not exist.
    #[error("reduce by unknown production {production}")]
    UnknownProduction { production: ProdId },
}

impl ParseError {
    /// Returns `true` for errors caused by the input rather than by the tables.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, ParseError::SyntaxError { .. })
    }
}

/// Inconsistency found while validating [`ParseTables`](crate::ParseTables).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("table has no states")]
    Empty,

    #[error("action and goto tables disagree on state count ({action} vs {goto})")]
    RowMismatch { action: usize, goto: usize },

    #[error("state {state} on `{symbol}` refers to missing state {target}")]
    DanglingState {
        state: StateId,
        symbol: String,
        target: StateId,
    },

    #[error("state {state} on `{symbol}` reduces by missing production {production}")]
    DanglingProduction {
        state: StateId,
        symbol: String,
        production: ProdId,
    },

    #[error("expected exactly one accept action, found {0}")]
    AcceptCount(usize),

    #[error("cannot read tables: {0}")]
    Read(std::string::String),

    #[error("malformed table data: {0}")]
    Json(std::string::String),
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::Json(err.to_string())
    }
}

struct Expected<'a>(&'a [String]);

impl fmt::Display for Expected<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("nothing");
        }
        f.write_str("one of ")?;
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "`{}`", t)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_lists_expected_terminals() {
        let err = ParseError::SyntaxError {
            position: 2,
            unexpected: "SEMICOLON".into(),
            expected: vec!["NUMBER".into(), "ID".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("position 2"));
        assert!(msg.contains("unexpected `SEMICOLON`"));
        assert!(msg.contains("one of `NUMBER`, `ID`"));
        assert!(err.is_syntax_error());
    }

    #[test]
    fn syntax_error_with_empty_expected_set() {
        let err = ParseError::SyntaxError {
            position: 0,
            unexpected: "$".into(),
            expected: Vec::new(),
        };
        assert!(err.to_string().ends_with("expected nothing"));
    }

    #[test]
    fn internal_errors_are_not_syntax_errors() {
        let err = ParseError::MissingGoto {
            state: 4,
            nonterminal: "expr".into(),
        };
        assert!(!err.is_syntax_error());
        assert_eq!(err.to_string(), "missing goto for state 4 on `expr`");
    }

    fn _assert_send_sync_static<T: Send + Sync + 'static>() {}
    #[test]
    fn errors_are_send_sync_static() {
        _assert_send_sync_static::<ParseError>();
        _assert_send_sync_static::<TableError>();
    }
}
