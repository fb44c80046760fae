//! SLR(1) parse tables.
//!
//! [`ParseTables`] is the immutable product of the generator: the ACTION
//! table indexed by state and terminal, the GOTO table indexed by state and
//! non-terminal, the original (non-augmented) production list in
//! declaration order, the start symbol, and the set of terminals the
//! engine skips. Rows are stored per state in ordered maps so that
//! serialized tables are byte-for-byte reproducible.

use crate::error::TableError;
use crate::{END_MARKER, ProdId, StateId};
use serde::{Deserialize, Serialize};
use smartstring::alias::String;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

/// A single ACTION table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Push the state and consume the lookahead.
    Shift(StateId),
    /// Reduce by the production with this index in [`ParseTables::productions`].
    Reduce(ProdId),
    /// The input has been recognized.
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "shift {}", state),
            Action::Reduce(prod) => write!(f, "reduce {}", prod),
            Action::Accept => f.write_str("accept"),
        }
    }
}

/// A grammar production `lhs -> rhs`; an empty `rhs` is the empty production.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<String>,
}

impl Production {
    pub fn new<S: AsRef<str>>(lhs: &str, rhs: &[S]) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: rhs.iter().map(|s| String::from(s.as_ref())).collect(),
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        if self.rhs.is_empty() {
            return f.write_str(" ε");
        }
        for sym in &self.rhs {
            write!(f, " {}", sym)?;
        }
        Ok(())
    }
}

/// ACTION and GOTO tables together with the grammar data the engine needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTables {
    start: String,
    productions: Vec<Production>,
    action: Vec<BTreeMap<String, Action>>,
    goto: Vec<BTreeMap<String, StateId>>,
    #[serde(default)]
    ignore: BTreeSet<String>,
}

impl ParseTables {
    /// Assembles tables from per-state rows. Row `i` describes state `i`.
    pub fn new(
        start: &str,
        productions: Vec<Production>,
        action: Vec<BTreeMap<String, Action>>,
        goto: Vec<BTreeMap<String, StateId>>,
    ) -> Self {
        Self {
            start: start.into(),
            productions,
            action,
            goto,
            ignore: BTreeSet::new(),
        }
    }

    /// Sets the terminals the engine drops from its input.
    pub fn with_ignore<I, S>(mut self, ignore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignore = ignore.into_iter().map(|s| String::from(s.as_ref())).collect();
        self
    }

    /// Builds tables from flat `(state, symbol, entry)` lists.
    ///
    /// Rows grow to cover every state mentioned, so inconsistent input is
    /// reported by [`validate`](Self::validate) rather than by a panic.
    pub fn from_entries<'a, A, G>(
        start: &str,
        n_states: usize,
        productions: Vec<Production>,
        action: A,
        goto: G,
    ) -> Self
    where
        A: IntoIterator<Item = (StateId, &'a str, Action)>,
        G: IntoIterator<Item = (StateId, &'a str, StateId)>,
    {
        let mut action_rows = vec![BTreeMap::new(); n_states];
        for (state, terminal, act) in action {
            if state >= action_rows.len() {
                action_rows.resize_with(state + 1, BTreeMap::new);
            }
            action_rows[state].insert(String::from(terminal), act);
        }
        let mut goto_rows = vec![BTreeMap::new(); n_states];
        for (state, nonterminal, target) in goto {
            if state >= goto_rows.len() {
                goto_rows.resize_with(state + 1, BTreeMap::new);
            }
            goto_rows[state].insert(String::from(nonterminal), target);
        }
        Self::new(start, productions, action_rows, goto_rows)
    }

    /// Builds tables from the constant arrays emitted into generated Rust
    /// sources.
    pub fn from_static(
        start: &str,
        n_states: usize,
        productions: &[(&str, &[&str])],
        action: &[(StateId, &str, Action)],
        goto: &[(StateId, &str, StateId)],
        ignore: &[&str],
    ) -> Self {
        let productions = productions
            .iter()
            .map(|&(lhs, rhs)| Production::new(lhs, rhs))
            .collect();
        Self::from_entries(
            start,
            n_states,
            productions,
            action.iter().copied(),
            goto.iter().copied(),
        )
        .with_ignore(ignore.iter())
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, prod: ProdId) -> Option<&Production> {
        self.productions.get(prod)
    }

    pub fn state_count(&self) -> usize {
        self.action.len()
    }

    pub fn ignored(&self) -> impl Iterator<Item = &str> {
        self.ignore.iter().map(|s| s.as_str())
    }

    #[inline]
    pub fn action(&self, state: StateId, terminal: &str) -> Option<Action> {
        self.action.get(state)?.get(terminal).copied()
    }

    #[inline]
    pub fn goto(&self, state: StateId, nonterminal: &str) -> Option<StateId> {
        self.goto.get(state)?.get(nonterminal).copied()
    }

    /// All ACTION entries of a state, ordered by terminal.
    pub fn actions(&self, state: StateId) -> impl Iterator<Item = (&str, Action)> {
        self.action
            .get(state)
            .into_iter()
            .flatten()
            .map(|(t, a)| (t.as_str(), *a))
    }

    /// All GOTO entries of a state, ordered by non-terminal.
    pub fn gotos(&self, state: StateId) -> impl Iterator<Item = (&str, StateId)> {
        self.goto
            .get(state)
            .into_iter()
            .flatten()
            .map(|(nt, s)| (nt.as_str(), *s))
    }

    /// Terminals that have an action in `state`, in sorted order.
    pub fn expected(&self, state: StateId) -> Vec<String> {
        self.actions(state).map(|(t, _)| String::from(t)).collect()
    }

    #[inline]
    pub fn is_ignored(&self, terminal: &str) -> bool {
        self.ignore.contains(terminal)
    }

    /// The state holding the single [`Action::Accept`] entry.
    pub fn accept_state(&self) -> Option<StateId> {
        (0..self.state_count()).find(|&s| self.action(s, END_MARKER) == Some(Action::Accept))
    }

    /// Checks that every shift, goto and reduce refers to an existing state
    /// or production and that exactly one accept action exists.
    pub fn validate(&self) -> Result<(), TableError> {
        let n_states = self.action.len();
        if n_states == 0 {
            return Err(TableError::Empty);
        }
        if n_states != self.goto.len() {
            return Err(TableError::RowMismatch {
                action: n_states,
                goto: self.goto.len(),
            });
        }
        let mut accepts = 0;
        for state in 0..n_states {
            for (symbol, act) in self.actions(state) {
                match act {
                    Action::Shift(target) if target >= n_states => {
                        return Err(TableError::DanglingState {
                            state,
                            symbol: symbol.into(),
                            target,
                        });
                    }
                    Action::Reduce(production) if production >= self.productions.len() => {
                        return Err(TableError::DanglingProduction {
                            state,
                            symbol: symbol.into(),
                            production,
                        });
                    }
                    Action::Accept => accepts += 1,
                    _ => {}
                }
            }
            for (symbol, target) in self.gotos(state) {
                if target >= n_states {
                    return Err(TableError::DanglingState {
                        state,
                        symbol: symbol.into(),
                        target,
                    });
                }
            }
        }
        if accepts != 1 {
            return Err(TableError::AcceptCount(accepts));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<std::string::String, TableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes and validates tables.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let tables: ParseTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Loads a JSON artifact written by the generator.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| TableError::Read(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json(&json)
    }
}
