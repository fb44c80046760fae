// SLR(1) ACTION/GOTO table construction on top of the LR(0) automaton.

use crate::error::{ConflictKind, GenError};
use crate::lr0::{AugmentedGrammar, Automaton};
use crate::sets::SymbolSets;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use yapar::{Action, END_MARKER, ParseTables, StateId};

/// Constructs the SLR(1) parse tables.
///
/// Entries are derived in a fixed order:
/// 1. GOTO entries from transitions on non-terminals.
/// 2. SHIFT entries from transitions on terminals.
/// 3. For each state in id order and each complete item in item order:
///    ACCEPT on `$` for `S' -> S ·`, otherwise REDUCE on every terminal of
///    FOLLOW(lhs).
///
/// # Parameters
/// - `automaton`: The canonical LR(0) collection of `grammar`.
/// - `grammar`: The augmented grammar.
/// - `follow`: FOLLOW sets of the original non-terminals.
///
/// # Returns
/// Tables whose reduce actions index the original (non-augmented)
/// production list, or [`GenError::GrammarConflict`] at the first key that
/// would receive two different actions. No conflict is ever resolved.
pub fn construct(
    automaton: &Automaton,
    grammar: &AugmentedGrammar,
    follow: &SymbolSets,
) -> Result<ParseTables, GenError> {
    let goto: Vec<(StateId, &str, StateId)> = automaton
        .transitions()
        .filter(|(_, sym, _)| grammar.is_nonterminal(sym))
        .collect();

    let mut action: BTreeMap<(StateId, String), Action> = BTreeMap::new();
    for (state, sym, target) in automaton.transitions() {
        if !grammar.is_nonterminal(sym) {
            insert(&mut action, state, sym, Action::Shift(target))?;
        }
    }

    for (state, items) in automaton.states().iter().enumerate() {
        for item in items.iter().filter(|item| grammar.is_complete(item)) {
            let Some(prod) = grammar.original_index(item.prod) else {
                insert(&mut action, state, END_MARKER, Action::Accept)?;
                continue;
            };
            let Some(production) = grammar.production(item.prod) else {
                continue;
            };
            for terminal in follow.get(production.lhs.as_str()).into_iter().flatten() {
                insert(&mut action, state, terminal, Action::Reduce(prod))?;
            }
        }
    }

    let productions = grammar.productions().iter().skip(1).cloned().collect();
    let tables = ParseTables::from_entries(
        grammar.original_start(),
        automaton.state_count(),
        productions,
        action.iter().map(|((s, t), a)| (*s, t.as_str(), *a)),
        goto,
    );
    tables.validate()?;
    log::debug!(
        "SLR tables: {} states, {} actions",
        tables.state_count(),
        action.len()
    );
    Ok(tables)
}

/// Inserts an ACTION entry, failing if the key already holds a different
/// action.
fn insert(
    action: &mut BTreeMap<(StateId, String), Action>,
    state: StateId,
    terminal: &str,
    incoming: Action,
) -> Result<(), GenError> {
    match action.entry((state, terminal.to_string())) {
        Entry::Vacant(e) => {
            e.insert(incoming);
            Ok(())
        }
        Entry::Occupied(e) if *e.get() == incoming => Ok(()),
        Entry::Occupied(e) => {
            let existing = *e.get();
            let kind = ConflictKind::of(existing, incoming);
            log::debug!(
                "{} conflict in state {} on {}: {} vs {}",
                kind,
                state,
                terminal,
                existing,
                incoming
            );
            Err(GenError::GrammarConflict {
                state,
                terminal: terminal.to_string(),
                kind,
                existing,
                incoming,
            })
        }
    }
}
