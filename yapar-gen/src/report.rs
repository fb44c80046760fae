//! Human-readable dumps of the generator's intermediate results.
//!
//! These back the `--show-*` flags of the `yapar` binary. Every record is
//! one comma-separated line whose first field names the record kind:
//!
//! ```text
//! PS,<number of productions>      P,<index>,<lhs> -> <rhs>
//! FIRST,<nt>,{<symbols>}          FOLLOW,<nt>,{<symbols>}
//! CS,<number of states>           C,<state>,<item>   T,<state>,<symbol>,<target>
//! TS,<number of states>           A,<state>,<terminal>,<action>   G,<state>,<nt>,<target>
//! ```

use crate::lr0::{AugmentedGrammar, Automaton};
use crate::sets::SymbolSets;
use std::io::{self, Write};
use yapar::ParseTables;

/// Writes the numbered productions of the augmented grammar.
///
/// The synthetic start production is labelled `0'`; the others carry the
/// index used by `reduce` actions.
///
/// # Parameters
/// - `out`: The output writer (e.g., file, buffer, or stdout).
/// - `grammar`: The augmented grammar.
///
/// # Returns
/// Returns `Ok(())` on success or an [`io::Error`] if writing fails.
pub fn write_grammar<W: Write>(out: &mut W, grammar: &AugmentedGrammar) -> io::Result<()> {
    writeln!(out, "PS,{}\n", grammar.productions().len())?;
    for (i, prod) in grammar.productions().iter().enumerate() {
        match grammar.original_index(i) {
            Some(p) => writeln!(out, "P,{},{}", p, prod)?,
            None => writeln!(out, "P,0',{}", prod)?,
        }
    }
    Ok(())
}

/// Writes FIRST sets followed by FOLLOW sets, one non-terminal per line.
///
/// # Parameters
/// - `out`: The output writer.
/// - `first`: FIRST sets, possibly containing `ε`.
/// - `follow`: FOLLOW sets.
pub fn write_first_follow<W: Write>(
    out: &mut W,
    first: &SymbolSets,
    follow: &SymbolSets,
) -> io::Result<()> {
    for (label, sets) in [("FIRST", first), ("FOLLOW", follow)] {
        for (nt, set) in sets {
            let symbols: Vec<&str> = set.iter().map(String::as_str).collect();
            writeln!(out, "{},{},{{{}}}", label, nt, symbols.join(", "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes every LR(0) item set and its outgoing transitions.
///
/// # Parameters
/// - `out`: The output writer.
/// - `automaton`: The canonical collection.
/// - `grammar`: The augmented grammar the items refer to.
///
/// # Returns
/// Returns `Ok(())` on success or an [`io::Error`] if writing fails.
pub fn write_automaton<W: Write>(
    out: &mut W,
    automaton: &Automaton,
    grammar: &AugmentedGrammar,
) -> io::Result<()> {
    writeln!(out, "CS,{}\n", automaton.state_count())?;
    let mut transitions = automaton.transitions().peekable();
    for (i, state) in automaton.states().iter().enumerate() {
        for item in state {
            writeln!(out, "C,{},{}", i, item.display(grammar))?;
        }
        while let Some((_, sym, target)) = transitions.next_if(|(from, _, _)| *from == i) {
            writeln!(out, "T,{},{},{}", i, sym, target)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the ACTION and GOTO rows of every state.
pub fn write_tables<W: Write>(out: &mut W, tables: &ParseTables) -> io::Result<()> {
    writeln!(out, "TS,{}\n", tables.state_count())?;
    for state in 0..tables.state_count() {
        for (terminal, action) in tables.actions(state) {
            writeln!(out, "A,{},{},{}", state, terminal, action)?;
        }
        for (nonterminal, target) in tables.gotos(state) {
            writeln!(out, "G,{},{},{}", state, nonterminal, target)?;
        }
    }
    Ok(())
}
