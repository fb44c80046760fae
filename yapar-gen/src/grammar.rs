//! Grammar model.
//!
//! A [`Grammar`] maps each non-terminal to its ordered list of
//! alternatives. Declaration order is significant: the first non-terminal
//! is the start symbol, and productions are numbered by walking the
//! non-terminals in declaration order and their alternatives in order.
//! Any symbol that is not a non-terminal is a terminal.

use crate::error::GenError;
use crate::sets::EPSILON;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use yapar::{END_OF_INPUT_ALIASES, Production};

/// An immutable context-free grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    start: String,
    tokens: Vec<String>,
    ignores: BTreeSet<String>,
    rules: IndexMap<String, Vec<Vec<String>>>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    /// Parses `.yalp` grammar text.
    pub fn from_yalp(text: &str) -> Result<Self, GenError> {
        crate::yalp::parse(text)
    }

    /// The first declared non-terminal.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Declared tokens, in declaration order. Empty when the grammar was
    /// built without a token section.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn ignores(&self) -> &BTreeSet<String> {
        &self.ignores
    }

    /// Non-terminals in declaration order.
    pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn alternatives(&self, nonterminal: &str) -> Option<&[Vec<String>]> {
        self.rules.get(nonterminal).map(Vec::as_slice)
    }

    /// Non-terminals with their alternatives, in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[Vec<String>])> {
        self.rules
            .iter()
            .map(|(lhs, alts)| (lhs.as_str(), alts.as_slice()))
    }

    #[inline]
    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.rules.contains_key(symbol)
    }

    /// The flattened production list; a production's position is the
    /// index used by reduce actions.
    pub fn productions(&self) -> Vec<Production> {
        self.rules()
            .flat_map(|(lhs, alts)| alts.iter().map(move |rhs| Production::new(lhs, rhs.as_slice())))
            .collect()
    }

    /// Declared tokens together with every terminal used in a production.
    pub fn terminals(&self) -> BTreeSet<&str> {
        let used = self
            .rules
            .values()
            .flatten()
            .flatten()
            .map(String::as_str)
            .filter(|s| !self.is_nonterminal(s));
        self.tokens.iter().map(String::as_str).chain(used).collect()
    }
}

impl FromStr for Grammar {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grammar::from_yalp(s)
    }
}

/// Renders the grammar in `.yalp` layout.
///
/// Symbols are written as-is. The `.yalp` reader only accepts identifier
/// symbols, so text produced for a grammar using symbols such as `+` or
/// `(` does not read back.
impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.tokens.is_empty() {
            writeln!(f, "%token {}", self.tokens.join(" "))?;
        }
        if !self.ignores.is_empty() {
            let ignores: Vec<&str> = self.ignores.iter().map(String::as_str).collect();
            writeln!(f, "IGNORE {}", ignores.join(" "))?;
        }
        writeln!(f, "%%")?;
        for (lhs, alts) in self.rules() {
            writeln!(f, "{}:", lhs)?;
            for (i, alt) in alts.iter().enumerate() {
                let sep = if i == 0 { ' ' } else { '|' };
                writeln!(f, "    {} {}", sep, alt.join(" "))?;
            }
            writeln!(f, ";")?;
        }
        Ok(())
    }
}

/// Incremental constructor for [`Grammar`]; all checks happen in
/// [`build`](GrammarBuilder::build).
///
/// ```
/// use yapar_gen::Grammar;
///
/// let grammar = Grammar::builder()
///     .tokens(["NUMBER", "PLUS", "SEMICOLON"])
///     .rule("s", &[&["p", "SEMICOLON"]])
///     .rule("p", &[&["NUMBER", "PLUS", "NUMBER"]])
///     .build()
///     .unwrap();
/// assert_eq!(grammar.start(), "s");
/// assert_eq!(grammar.productions().len(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct GrammarBuilder {
    tokens: Vec<String>,
    ignores: Vec<String>,
    rules: Vec<(String, Vec<Vec<String>>)>,
}

impl GrammarBuilder {
    pub fn tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn ignore<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignores.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Adds a non-terminal with its alternatives. An empty alternative is
    /// the empty production.
    pub fn rule(self, lhs: &str, alternatives: &[&[&str]]) -> Self {
        let alternatives = alternatives
            .iter()
            .map(|alt| alt.iter().map(|s| s.to_string()).collect())
            .collect();
        self.rule_owned(lhs, alternatives)
    }

    pub fn rule_owned(mut self, lhs: impl Into<String>, alternatives: Vec<Vec<String>>) -> Self {
        self.rules.push((lhs.into(), alternatives));
        self
    }

    pub fn build(self) -> Result<Grammar, GenError> {
        let mut rules: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();
        for (lhs, alts) in self.rules {
            if is_reserved(&lhs) || lhs == EPSILON {
                return Err(GenError::invalid(format!(
                    "reserved symbol `{}` used as a non-terminal",
                    lhs
                )));
            }
            let alts: Vec<Vec<String>> = alts
                .into_iter()
                .map(|alt| alt.into_iter().filter(|s| s != EPSILON).collect())
                .collect();
            if alts.is_empty() {
                return Err(GenError::invalid(format!(
                    "non-terminal `{}` has no alternatives",
                    lhs
                )));
            }
            if rules.contains_key(&lhs) {
                return Err(GenError::invalid(format!(
                    "non-terminal `{}` is defined more than once",
                    lhs
                )));
            }
            rules.insert(lhs, alts);
        }
        let Some(start) = rules.keys().next().cloned() else {
            return Err(GenError::invalid("grammar has no productions"));
        };

        let mut tokens: Vec<String> = Vec::with_capacity(self.tokens.len());
        for token in self.tokens {
            if rules.contains_key(&token) {
                return Err(GenError::invalid(format!(
                    "`{}` is declared both as a token and a non-terminal",
                    token
                )));
            }
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }

        let ignores: BTreeSet<String> = self.ignores.into_iter().collect();
        if !tokens.is_empty() {
            if let Some(undeclared) = ignores.iter().find(|t| !tokens.contains(t)) {
                return Err(GenError::invalid(format!(
                    "ignored token `{}` is not declared",
                    undeclared
                )));
            }
        }

        for (lhs, alts) in &rules {
            for sym in alts.iter().flatten() {
                if is_reserved(sym) {
                    return Err(GenError::invalid(format!(
                        "reserved symbol `{}` in production of `{}`",
                        sym, lhs
                    )));
                }
                if !tokens.is_empty() && !rules.contains_key(sym) && !tokens.contains(sym) {
                    return Err(GenError::invalid(format!(
                        "undefined symbol `{}` in production of `{}`",
                        sym, lhs
                    )));
                }
                if ignores.contains(sym) {
                    log::warn!("ignored token `{}` used in production of `{}`", sym, lhs);
                }
            }
        }

        log::debug!(
            "grammar: start `{}`, {} non-terminals, {} tokens",
            start,
            rules.len(),
            tokens.len()
        );
        Ok(Grammar {
            start,
            tokens,
            ignores,
            rules,
        })
    }
}

fn is_reserved(symbol: &str) -> bool {
    END_OF_INPUT_ALIASES.contains(&symbol)
}
