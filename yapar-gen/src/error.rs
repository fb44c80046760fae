//! Generator errors.
//!
//! Every failure aborts generation as a whole: no tables and no artifact
//! are produced once a [`GenError`] is raised.

use std::fmt;
use thiserror::Error;
use yapar::{Action, StateId, TableError};

/// Classification of an ACTION table collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl ConflictKind {
    /// Classifies a collision between two distinct actions for the same key.
    pub fn of(existing: Action, incoming: Action) -> Self {
        match (existing, incoming) {
            (Action::Shift(_), _) | (_, Action::Shift(_)) => ConflictKind::ShiftReduce,
            _ => ConflictKind::ReduceReduce,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ShiftReduce => f.write_str("shift/reduce"),
            ConflictKind::ReduceReduce => f.write_str("reduce/reduce"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenError {
    /// Malformed grammar text or an inconsistent grammar model.
    #[error("invalid grammar: {0}")]
    InvalidGrammar(String),

    /// Two different actions were derived for one ACTION table key.
    #[error("{kind} conflict in state {state} on `{terminal}`: {existing} vs {incoming}")]
    GrammarConflict {
        state: StateId,
        terminal: String,
        kind: ConflictKind,
        existing: Action,
        incoming: Action,
    },

    /// The automaton grew beyond the configured state ceiling.
    #[error("LR(0) automaton exceeds {limit} states")]
    ResourceExceeded { limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("generated tables are inconsistent: {0}")]
    Table(#[from] TableError),
}

impl GenError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GenError::InvalidGrammar(msg.into())
    }
}
