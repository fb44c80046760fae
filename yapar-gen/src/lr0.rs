// This module defines the augmented grammar, LR(0) items, the closure and
// goto operations, and the canonical collection of LR(0) item sets.

use crate::error::GenError;
use crate::grammar::Grammar;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use yapar::{ProdId, Production, StateId};

/// A grammar extended with the synthetic start production `S' -> S`.
///
/// The synthetic production always has index `0`; production `i + 1` is
/// production `i` of the original grammar. The synthetic start symbol is
/// the original start symbol followed by as many `'` as needed to make it
/// unique.
#[derive(Debug, Clone)]
pub struct AugmentedGrammar {
    start: String,
    original_start: String,
    productions: Vec<Production>,
    by_lhs: HashMap<String, Vec<usize>>,
}

impl AugmentedGrammar {
    pub fn new(grammar: &Grammar) -> Self {
        let terminals = grammar.terminals();
        let mut start = format!("{}'", grammar.start());
        while grammar.is_nonterminal(&start) || terminals.contains(start.as_str()) {
            start.push('\'');
        }

        let mut productions = vec![Production::new(&start, &[grammar.start()])];
        productions.extend(grammar.productions());

        let mut by_lhs: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, p) in productions.iter().enumerate() {
            by_lhs.entry(p.lhs.to_string()).or_default().push(i);
        }

        Self {
            start,
            original_start: grammar.start().to_string(),
            productions,
            by_lhs,
        }
    }

    /// The synthetic start symbol.
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn original_start(&self) -> &str {
        &self.original_start
    }

    /// All productions, the synthetic one first.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, prod: usize) -> Option<&Production> {
        self.productions.get(prod)
    }

    #[inline]
    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.by_lhs.contains_key(symbol)
    }

    /// Indices of the productions of `nonterminal`, in declaration order.
    pub fn alternatives(&self, nonterminal: &str) -> &[usize] {
        self.by_lhs.get(nonterminal).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Index of `prod` in the original grammar; `None` for the synthetic
    /// production.
    pub fn original_index(&self, prod: usize) -> Option<ProdId> {
        prod.checked_sub(1)
    }

    /// The symbol right after the dot, if the item is not complete.
    pub fn next_symbol(&self, item: &Item) -> Option<&str> {
        self.productions
            .get(item.prod)?
            .rhs
            .get(item.dot)
            .map(|s| s.as_str())
    }

    pub fn is_complete(&self, item: &Item) -> bool {
        self.productions
            .get(item.prod)
            .is_some_and(|p| item.dot >= p.rhs.len())
    }
}

/// An LR(0) item: a production index and a dot position in `0..=len(rhs)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Item {
    /// Index into [`AugmentedGrammar::productions`].
    pub prod: usize,
    /// Number of right-hand side symbols already recognized.
    pub dot: usize,
}

impl Item {
    pub fn new(prod: usize, dot: usize) -> Self {
        Self { prod, dot }
    }

    /// Renders the item as `A -> x · y` using the productions of `grammar`.
    pub fn display<'a>(&self, grammar: &'a AugmentedGrammar) -> ItemDisplay<'a> {
        ItemDisplay {
            item: *self,
            grammar,
        }
    }
}

pub struct ItemDisplay<'a> {
    item: Item,
    grammar: &'a AugmentedGrammar,
}

impl fmt::Display for ItemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(p) = self.grammar.production(self.item.prod) else {
            return write!(f, "<production {}>", self.item.prod);
        };
        write!(f, "{} ->", p.lhs)?;
        for (i, sym) in p.rhs.iter().enumerate() {
            if i == self.item.dot {
                f.write_str(" ·")?;
            }
            write!(f, " {}", sym)?;
        }
        if self.item.dot >= p.rhs.len() {
            f.write_str(" ·")?;
        }
        Ok(())
    }
}

/// A set of LR(0) items. Ordered, so equal sets hash and compare equal
/// regardless of insertion order.
pub type ItemSet = BTreeSet<Item>;

/// Computes the LR(0) closure of `items`.
///
/// # Parameters
/// - `items`: The kernel items.
/// - `grammar`: The augmented grammar the items refer to.
///
/// # Returns
/// The smallest superset of `items` that contains `B -> · γ` for every
/// production of `B` whenever it contains an item with `B` after the dot.
pub fn closure(items: &ItemSet, grammar: &AugmentedGrammar) -> ItemSet {
    let mut result = items.clone();
    let mut work: Vec<Item> = items.iter().copied().collect();
    while let Some(item) = work.pop() {
        let Some(sym) = grammar.next_symbol(&item) else {
            continue;
        };
        for &prod in grammar.alternatives(sym) {
            let new_item = Item::new(prod, 0);
            if result.insert(new_item) {
                work.push(new_item);
            }
        }
    }
    result
}

/// Computes the LR(0) goto of `items` on `symbol`.
///
/// # Returns
/// The closure of all items of `items` with `symbol` after the dot,
/// advanced past it. Empty if no item expects `symbol`.
pub fn goto(items: &ItemSet, symbol: &str, grammar: &AugmentedGrammar) -> ItemSet {
    let moved: ItemSet = items
        .iter()
        .filter(|item| grammar.next_symbol(item) == Some(symbol))
        .map(|item| Item::new(item.prod, item.dot + 1))
        .collect();
    if moved.is_empty() {
        return moved;
    }
    closure(&moved, grammar)
}

/// The canonical collection of LR(0) item sets with its transitions.
///
/// State `0` is the closure of `S' -> · S`. States are numbered
/// breadth-first: states are expanded in id order, and within a state the
/// symbols after the dot are visited terminals first, then non-terminals,
/// each in item order. The numbering is therefore a pure function of the
/// grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    states: Vec<ItemSet>,
    transitions: BTreeMap<(StateId, String), StateId>,
}

impl Automaton {
    /// Builds the canonical collection.
    ///
    /// # Parameters
    /// - `grammar`: The augmented grammar.
    /// - `max_states`: Optional ceiling on the number of states.
    ///
    /// # Returns
    /// The automaton, or [`GenError::ResourceExceeded`] as soon as a new
    /// state would exceed `max_states`.
    pub fn build(grammar: &AugmentedGrammar, max_states: Option<usize>) -> Result<Self, GenError> {
        let start = closure(&ItemSet::from([Item::new(0, 0)]), grammar);
        let mut states = vec![start.clone()];
        let mut index: HashMap<ItemSet, StateId> = HashMap::from([(start, 0)]);
        let mut transitions = BTreeMap::new();

        let mut current = 0;
        while current < states.len() {
            for sym in Self::outgoing_symbols(&states[current], grammar) {
                let next = goto(&states[current], &sym, grammar);
                if next.is_empty() {
                    continue;
                }
                let target = match index.get(&next) {
                    Some(&id) => id,
                    None => {
                        if let Some(limit) = max_states {
                            if states.len() >= limit {
                                return Err(GenError::ResourceExceeded { limit });
                            }
                        }
                        let id = states.len();
                        log::trace!("state {} = goto({}, {})", id, current, sym);
                        index.insert(next.clone(), id);
                        states.push(next);
                        id
                    }
                };
                transitions.insert((current, sym), target);
            }
            current += 1;
        }
        log::debug!(
            "LR(0) automaton: {} states, {} transitions",
            states.len(),
            transitions.len()
        );
        Ok(Self {
            states,
            transitions,
        })
    }

    fn outgoing_symbols(items: &ItemSet, grammar: &AugmentedGrammar) -> Vec<String> {
        let mut terminals: Vec<String> = Vec::new();
        let mut nonterminals: Vec<String> = Vec::new();
        for item in items {
            let Some(sym) = grammar.next_symbol(item) else {
                continue;
            };
            let bucket = if grammar.is_nonterminal(sym) {
                &mut nonterminals
            } else {
                &mut terminals
            };
            if !bucket.iter().any(|s| s == sym) {
                bucket.push(sym.to_string());
            }
        }
        terminals.extend(nonterminals);
        terminals
    }

    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// All transitions ordered by source state, then symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, &str, StateId)> {
        self.transitions
            .iter()
            .map(|((from, sym), to)| (*from, sym.as_str(), *to))
    }

    pub fn transition(&self, state: StateId, symbol: &str) -> Option<StateId> {
        self.transitions
            .get(&(state, symbol.to_string()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tests::{arithmetic, statement};

    fn single() -> Grammar {
        Grammar::builder().rule("S", &[&["a"]]).build().unwrap()
    }

    #[test]
    fn augmented_start_is_unique() {
        let aug = AugmentedGrammar::new(&single());
        assert_eq!(aug.start(), "S'");
        assert_eq!(aug.productions()[0].to_string(), "S' -> S");
        assert_eq!(aug.original_index(0), None);
        assert_eq!(aug.original_index(1), Some(0));

        // E' is already taken by the arithmetic grammar
        let aug = AugmentedGrammar::new(&arithmetic());
        assert_eq!(aug.start(), "E''");
        assert_eq!(aug.original_start(), "E");
        assert_eq!(aug.productions().len(), 9);
    }

    #[test]
    fn closure_of_start_item() {
        let aug = AugmentedGrammar::new(&statement());
        let c = closure(&ItemSet::from([Item::new(0, 0)]), &aug);
        let items: Vec<String> = c.iter().map(|i| i.display(&aug).to_string()).collect();
        assert_eq!(
            items,
            [
                "s' -> · s",
                "s -> · p SEMICOLON",
                "p -> · NUMBER PLUS NUMBER"
            ]
        );
    }

    #[test]
    fn closure_is_idempotent() {
        let aug = AugmentedGrammar::new(&arithmetic());
        let automaton = Automaton::build(&aug, None).unwrap();
        for state in automaton.states() {
            assert_eq!(&closure(state, &aug), state);
        }
        let kernel = ItemSet::from([Item::new(2, 1)]);
        let once = closure(&kernel, &aug);
        assert_eq!(closure(&once, &aug), once);
    }

    #[test]
    fn goto_on_unexpected_symbol_is_empty() {
        let aug = AugmentedGrammar::new(&statement());
        let c = closure(&ItemSet::from([Item::new(0, 0)]), &aug);
        assert!(goto(&c, "PLUS", &aug).is_empty());
        assert_eq!(goto(&c, "NUMBER", &aug), ItemSet::from([Item::new(2, 1)]));
    }

    #[test]
    fn single_production_states() {
        let aug = AugmentedGrammar::new(&single());
        let automaton = Automaton::build(&aug, None).unwrap();
        assert_eq!(automaton.state_count(), 3);
        assert_eq!(
            automaton.states()[0],
            closure(&ItemSet::from([Item::new(0, 0)]), &aug)
        );
        assert_eq!(automaton.transition(0, "a"), Some(1));
        assert_eq!(automaton.transition(0, "S"), Some(2));
        assert_eq!(automaton.states()[2], ItemSet::from([Item::new(0, 1)]));
        assert_eq!(automaton.transitions().count(), 2);
    }

    #[test]
    fn statement_states() {
        let aug = AugmentedGrammar::new(&statement());
        let automaton = Automaton::build(&aug, None).unwrap();
        assert_eq!(automaton.state_count(), 7);
        let transitions: Vec<(StateId, &str, StateId)> = automaton.transitions().collect();
        assert_eq!(
            transitions,
            [
                (0, "NUMBER", 1),
                (0, "p", 3),
                (0, "s", 2),
                (1, "PLUS", 4),
                (3, "SEMICOLON", 5),
                (4, "NUMBER", 6),
            ]
        );
    }

    #[test]
    fn arithmetic_state_count_is_reproducible() {
        let aug = AugmentedGrammar::new(&arithmetic());
        let first = Automaton::build(&aug, None).unwrap();
        assert_eq!(first.state_count(), 16);
        assert_eq!(first.transitions().count(), 26);
        let second = Automaton::build(&AugmentedGrammar::new(&arithmetic()), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn state_ceiling() {
        let aug = AugmentedGrammar::new(&arithmetic());
        assert!(matches!(
            Automaton::build(&aug, Some(10)),
            Err(GenError::ResourceExceeded { limit: 10 })
        ));
        assert!(Automaton::build(&aug, Some(16)).is_ok());
    }
}
