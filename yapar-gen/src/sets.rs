//! FIRST and FOLLOW set computation.
//!
//! Both sets are computed by fixed-point iteration over the productions
//! until no set grows. FIRST sets use [`EPSILON`] to mark nullable
//! non-terminals; FOLLOW sets use the end-marker `$` and never contain
//! [`EPSILON`].

use crate::grammar::Grammar;
use std::collections::{BTreeMap, BTreeSet};
use yapar::END_MARKER;

/// Marker for the empty string in FIRST sets.
pub const EPSILON: &str = "ε";

/// A set of terminals, possibly including [`EPSILON`] or the end-marker.
pub type SymbolSet = BTreeSet<String>;

/// Per non-terminal sets, keyed by non-terminal name.
pub type SymbolSets = BTreeMap<String, SymbolSet>;

/// Computes FIRST(A) for every non-terminal `A`.
///
/// # Parameters
/// - `grammar`: The grammar; a symbol is a terminal iff it is not a
///   non-terminal of `grammar`.
///
/// # Returns
/// A map from every non-terminal to its FIRST set. The set contains
/// [`EPSILON`] iff the non-terminal derives the empty string; it never
/// contains a non-terminal.
pub fn first_sets(grammar: &Grammar) -> SymbolSets {
    let mut first: SymbolSets = grammar
        .nonterminals()
        .map(|nt| (nt.to_string(), SymbolSet::new()))
        .collect();
    let mut changed = true;
    let mut rounds = 0;
    while changed {
        changed = false;
        rounds += 1;
        for (lhs, alts) in grammar.rules() {
            for rhs in alts {
                let (symbols, nullable) = first_of_sequence(grammar, &first, rhs);
                let set = first.entry(lhs.to_string()).or_default();
                for sym in symbols {
                    changed |= set.insert(sym);
                }
                if nullable {
                    changed |= set.insert(EPSILON.to_string());
                }
            }
        }
    }
    log::debug!("FIRST sets converged after {} rounds", rounds);
    first
}

/// FIRST of a symbol sequence without [`EPSILON`], and whether the whole
/// sequence is nullable.
fn first_of_sequence<S: AsRef<str>>(
    grammar: &Grammar,
    first: &SymbolSets,
    seq: &[S],
) -> (SymbolSet, bool) {
    let mut out = SymbolSet::new();
    for sym in seq {
        let sym = sym.as_ref();
        if !grammar.is_nonterminal(sym) {
            out.insert(sym.to_string());
            return (out, false);
        }
        let Some(set) = first.get(sym) else {
            return (out, false);
        };
        out.extend(set.iter().filter(|s| *s != EPSILON).cloned());
        if !set.contains(EPSILON) {
            return (out, false);
        }
    }
    (out, true)
}

/// Computes FOLLOW(A) for every non-terminal `A`.
///
/// # Parameters
/// - `grammar`: The grammar.
/// - `start`: The start symbol; its FOLLOW set is seeded with `$`.
/// - `first`: FIRST sets as returned by [`first_sets`].
///
/// # Returns
/// A map from every non-terminal to its FOLLOW set, made of terminals and
/// possibly `$`.
///
/// # Notes
/// Each production is scanned right to left with a *trailer* holding what
/// may follow the current position: a terminal replaces the trailer, a
/// nullable non-terminal extends it with its FIRST set, and any other
/// non-terminal replaces it with its FIRST set.
pub fn follow_sets(grammar: &Grammar, start: &str, first: &SymbolSets) -> SymbolSets {
    let mut follow: SymbolSets = grammar
        .nonterminals()
        .map(|nt| (nt.to_string(), SymbolSet::new()))
        .collect();
    follow
        .entry(start.to_string())
        .or_default()
        .insert(END_MARKER.to_string());

    let mut changed = true;
    while changed {
        changed = false;
        for (lhs, alts) in grammar.rules() {
            for rhs in alts {
                let mut trailer = follow.get(lhs).cloned().unwrap_or_default();
                for sym in rhs.iter().rev() {
                    if !grammar.is_nonterminal(sym) {
                        trailer = SymbolSet::from([sym.clone()]);
                        continue;
                    }
                    let set = follow.entry(sym.clone()).or_default();
                    for t in &trailer {
                        changed |= set.insert(t.clone());
                    }
                    let first_sym = first.get(sym.as_str());
                    let without_eps = first_sym
                        .into_iter()
                        .flatten()
                        .filter(|s| *s != EPSILON)
                        .cloned();
                    if first_sym.is_some_and(|f| f.contains(EPSILON)) {
                        trailer.extend(without_eps);
                    } else {
                        trailer = without_eps.collect();
                    }
                }
            }
        }
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tests::{arithmetic, statement};

    fn set(items: &[&str]) -> SymbolSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn arithmetic_first() {
        let first = first_sets(&arithmetic());
        assert_eq!(first["E"], set(&["(", "id"]));
        assert_eq!(first["E'"], set(&["+", "ε"]));
        assert_eq!(first["T"], set(&["(", "id"]));
        assert_eq!(first["T'"], set(&["*", "ε"]));
        assert_eq!(first["F"], set(&["(", "id"]));
    }

    #[test]
    fn arithmetic_follow() {
        let g = arithmetic();
        let first = first_sets(&g);
        let follow = follow_sets(&g, g.start(), &first);
        assert_eq!(follow["E"], set(&["$", ")"]));
        assert_eq!(follow["E'"], set(&["$", ")"]));
        assert_eq!(follow["T"], set(&["$", ")", "+"]));
        assert_eq!(follow["T'"], set(&["$", ")", "+"]));
        assert_eq!(follow["F"], set(&["$", ")", "*", "+"]));
    }

    #[test]
    fn first_never_contains_nonterminals() {
        for g in [arithmetic(), statement()] {
            for (nt, first) in first_sets(&g) {
                assert!(
                    first.iter().all(|s| !g.is_nonterminal(s)),
                    "FIRST({}) = {:?}",
                    nt,
                    first
                );
            }
        }
    }

    #[test]
    fn follow_of_start_contains_end_marker() {
        for g in [arithmetic(), statement()] {
            let follow = follow_sets(&g, g.start(), &first_sets(&g));
            assert!(follow[g.start()].contains(END_MARKER));
            assert!(follow.values().all(|f| !f.contains(EPSILON)));
        }
    }

    #[test]
    fn statement_sets() {
        let g = statement();
        let first = first_sets(&g);
        assert_eq!(first["s"], set(&["NUMBER"]));
        assert_eq!(first["p"], set(&["NUMBER"]));
        let follow = follow_sets(&g, "s", &first);
        assert_eq!(follow["s"], set(&["$"]));
        assert_eq!(follow["p"], set(&["SEMICOLON"]));
    }

    #[test]
    fn nullable_chain() {
        // a -> b c; b -> ε | X; c -> ε | Y
        let g = Grammar::builder()
            .rule("a", &[&["b", "c"]])
            .rule("b", &[&[], &["X"]])
            .rule("c", &[&[], &["Y"]])
            .build()
            .unwrap();
        let first = first_sets(&g);
        assert_eq!(first["a"], set(&["X", "Y", "ε"]));
        let follow = follow_sets(&g, "a", &first);
        assert_eq!(follow["b"], set(&["$", "Y"]));
        assert_eq!(follow["c"], set(&["$"]));
    }
}
