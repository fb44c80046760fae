//! Table-driven shift-reduce engine.
//!
//! A [`Parser`] borrows a [`ParseTables`] value and owns nothing else; the
//! state stack and input cursor live on the call frame of
//! [`Parser::parse`], so one table set can drive any number of parses
//! concurrently.

use crate::error::ParseError;
use crate::table::{Action, ParseTables, Production};
use crate::{END_MARKER, END_OF_INPUT_ALIASES, ProdId, StateId};
use smartstring::alias::String;
use std::fmt;

/// An input token as seen by the engine: only its terminal name matters.
pub trait Token {
    fn terminal(&self) -> &str;
}

impl Token for str {
    fn terminal(&self) -> &str {
        self
    }
}

impl Token for std::string::String {
    fn terminal(&self) -> &str {
        self.as_str()
    }
}

impl Token for String {
    fn terminal(&self) -> &str {
        self.as_str()
    }
}

/// A `(terminal, value)` pair; the value is carried along but never inspected.
impl<S: AsRef<str>, V> Token for (S, V) {
    fn terminal(&self) -> &str {
        self.0.as_ref()
    }
}

impl<T: Token + ?Sized> Token for &T {
    fn terminal(&self) -> &str {
        (**self).terminal()
    }
}

/// One step of the engine, passed to the trace callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'a> {
    Shift {
        state: StateId,
        terminal: &'a str,
        position: usize,
        target: StateId,
    },
    Reduce {
        state: StateId,
        prod: ProdId,
        production: &'a Production,
        target: StateId,
    },
    Accept {
        state: StateId,
        position: usize,
    },
    Error {
        state: StateId,
        terminal: &'a str,
        position: usize,
    },
}

impl fmt::Display for Step<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Shift {
                state,
                terminal,
                position,
                target,
            } => write!(f, "<{}> shift `{}`@{} -> {}", state, terminal, position, target),
            Step::Reduce {
                state,
                prod,
                production,
                target,
            } => write!(f, "<{}> reduce {} ({}) -> {}", state, prod, production, target),
            Step::Accept { state, position } => write!(f, "<{}> accept @{}", state, position),
            Step::Error {
                state,
                terminal,
                position,
            } => write!(f, "<{}> error on `{}`@{}", state, terminal, position),
        }
    }
}

/// Counters collected during a successful parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Tokens read from the input, not counting ignored ones.
    pub tokens: usize,
    pub shifts: usize,
    pub reductions: usize,
}

/// SLR(1) engine over a borrowed table set.
pub struct Parser<'t> {
    tables: &'t ParseTables,
    trace: Option<Box<dyn Fn(&Step<'_>) + 't>>,
}

impl<'t> Parser<'t> {
    pub fn new(tables: &'t ParseTables) -> Self {
        Self {
            tables,
            trace: None,
        }
    }

    /// Installs a callback invoked for every shift, reduce, accept and
    /// error step.
    pub fn with_trace<F>(mut self, trace: F) -> Self
    where
        F: Fn(&Step<'_>) + 't,
    {
        self.trace = Some(Box::new(trace));
        self
    }

    pub fn tables(&self) -> &'t ParseTables {
        self.tables
    }

    /// Runs the shift-reduce loop over `tokens`.
    ///
    /// The input is implicitly terminated by the end-marker; tokens named
    /// `EOF` or `$` are treated as the end-marker, and tokens whose
    /// terminal is in the table's ignore set are skipped. Positions in
    /// errors and trace steps are indices into the original sequence,
    /// ignored tokens included.
    ///
    /// The first end-of-input token ends the input: any tokens after it
    /// are never read.
    ///
    /// # Returns
    /// Parse statistics on acceptance, or the first [`ParseError`].
    pub fn parse<I, T>(&self, tokens: I) -> Result<ParserStats, ParseError>
    where
        I: IntoIterator<Item = T>,
        T: Token,
    {
        let mut stats = ParserStats::default();
        let mut input = tokens.into_iter();
        let mut cursor = 0;
        let mut stack: Vec<StateId> = vec![0];
        let mut state: StateId = 0;
        let (mut position, mut lookahead) = self.next_terminal(&mut input, &mut cursor, &mut stats);

        loop {
            if log::log_enabled!(log::Level::Trace) {
                log::trace!("{:?}  <-  {}@{}", stack, lookahead, position);
            }
            match self.tables.action(state, &lookahead) {
                Some(Action::Shift(target)) => {
                    self.emit(&Step::Shift {
                        state,
                        terminal: &lookahead,
                        position,
                        target,
                    });
                    stack.push(target);
                    state = target;
                    stats.shifts += 1;
                    (position, lookahead) =
                        self.next_terminal(&mut input, &mut cursor, &mut stats);
                }

                Some(Action::Reduce(prod)) => {
                    let production = self
                        .tables
                        .production(prod)
                        .ok_or(ParseError::UnknownProduction { production: prod })?;
                    let n = production.rhs.len();
                    if n >= stack.len() {
                        return Err(ParseError::StackUnderflow {
                            production: prod,
                            depth: stack.len(),
                        });
                    }
                    stack.truncate(stack.len() - n);
                    let top = stack[stack.len() - 1];
                    let target = self.tables.goto(top, &production.lhs).ok_or_else(|| {
                        ParseError::MissingGoto {
                            state: top,
                            nonterminal: production.lhs.clone(),
                        }
                    })?;
                    self.emit(&Step::Reduce {
                        state,
                        prod,
                        production,
                        target,
                    });
                    stack.push(target);
                    state = target;
                    stats.reductions += 1;
                }

                Some(Action::Accept) => {
                    self.emit(&Step::Accept { state, position });
                    return Ok(stats);
                }

                None => {
                    self.emit(&Step::Error {
                        state,
                        terminal: &lookahead,
                        position,
                    });
                    return Err(ParseError::SyntaxError {
                        position,
                        expected: self.tables.expected(state),
                        unexpected: lookahead,
                    });
                }
            }
        }
    }

    /// Pulls the next significant terminal and its position, mapping end
    /// of input aliases onto the end-marker. Past the last token the
    /// end-marker is returned at the input length.
    fn next_terminal<I, T>(
        &self,
        input: &mut I,
        cursor: &mut usize,
        stats: &mut ParserStats,
    ) -> (usize, String)
    where
        I: Iterator<Item = T>,
        T: Token,
    {
        for token in input.by_ref() {
            let position = *cursor;
            *cursor += 1;
            let terminal = token.terminal();
            if self.tables.is_ignored(terminal) {
                continue;
            }
            stats.tokens += 1;
            if END_OF_INPUT_ALIASES.contains(&terminal) {
                return (position, END_MARKER.into());
            }
            return (position, terminal.into());
        }
        (*cursor, END_MARKER.into())
    }

    fn emit(&self, step: &Step<'_>) {
        log::trace!("{}", step);
        if let Some(trace) = &self.trace {
            trace(step);
        }
    }
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("states", &self.tables.state_count())
            .field("trace", &self.trace.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // S -> a
    fn single() -> ParseTables {
        ParseTables::from_static(
            "S",
            3,
            &[("S", &["a"])],
            &[
                (0, "a", Action::Shift(1)),
                (1, "$", Action::Reduce(0)),
                (2, "$", Action::Accept),
            ],
            &[(0, "S", 2)],
            &[],
        )
    }

    // s -> p SEMICOLON
    // p -> NUMBER PLUS NUMBER
    fn statement() -> ParseTables {
        ParseTables::from_static(
            "s",
            7,
            &[
                ("s", &["p", "SEMICOLON"]),
                ("p", &["NUMBER", "PLUS", "NUMBER"]),
            ],
            &[
                (0, "NUMBER", Action::Shift(1)),
                (1, "PLUS", Action::Shift(4)),
                (2, "$", Action::Accept),
                (3, "SEMICOLON", Action::Shift(5)),
                (4, "NUMBER", Action::Shift(6)),
                (5, "$", Action::Reduce(0)),
                (6, "SEMICOLON", Action::Reduce(1)),
            ],
            &[(0, "s", 2), (0, "p", 3)],
            &["WS"],
        )
    }

    #[test]
    fn accepts_single_terminal() {
        init_logger();
        let tables = single();
        let stats = Parser::new(&tables).parse(["a"]).unwrap();
        assert_eq!(
            stats,
            ParserStats {
                tokens: 1,
                shifts: 1,
                reductions: 1,
            }
        );
    }

    #[test]
    fn accepts_statement_with_values() {
        init_logger();
        let tables = statement();
        let tokens = vec![
            ("NUMBER", 1),
            ("PLUS", 0),
            ("NUMBER", 2),
            ("SEMICOLON", 0),
        ];
        let stats = Parser::new(&tables).parse(&tokens).unwrap();
        assert_eq!(stats.tokens, 4);
        assert_eq!(stats.shifts, 4);
        assert_eq!(stats.reductions, 2);
    }

    #[test]
    fn rejects_missing_operand() {
        init_logger();
        let tables = statement();
        let err = Parser::new(&tables)
            .parse(["NUMBER", "PLUS", "SEMICOLON"])
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::SyntaxError {
                position: 2,
                unexpected: "SEMICOLON".into(),
                expected: vec!["NUMBER".into()],
            }
        );
    }

    #[test]
    fn rejects_premature_end_of_input() {
        let tables = statement();
        let err = Parser::new(&tables).parse(["NUMBER", "PLUS"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::SyntaxError {
                position: 2,
                unexpected: "$".into(),
                expected: vec!["NUMBER".into()],
            }
        );
    }

    #[test]
    fn rejects_empty_input() {
        let tables = single();
        let err = Parser::new(&tables)
            .parse(std::iter::empty::<&str>())
            .unwrap_err();
        assert!(matches!(err, ParseError::SyntaxError { position: 0, .. }));
    }

    #[test]
    fn end_of_input_aliases() {
        let tables = single();
        let parser = Parser::new(&tables);
        assert!(parser.parse(["a", "EOF"]).is_ok());
        assert!(parser.parse(["a", "$"]).is_ok());
        let err = parser.parse(["EOF"]).unwrap_err();
        assert!(matches!(err, ParseError::SyntaxError { ref unexpected, .. } if unexpected == "$"));
    }

    #[test]
    fn tokens_after_end_of_input_are_not_read() {
        let tables = single();
        let parser = Parser::new(&tables);
        let stats = parser.parse(["a", "EOF", "a", "a"]).unwrap();
        assert_eq!(stats.tokens, 2);
        assert_eq!(stats.shifts, 1);
    }

    #[test]
    fn ignored_tokens_are_skipped_but_counted_in_positions() {
        let tables = statement();
        let parser = Parser::new(&tables);
        let stats = parser
            .parse(["WS", "NUMBER", "WS", "PLUS", "NUMBER", "SEMICOLON", "WS"])
            .unwrap();
        assert_eq!(stats.tokens, 4);

        let err = parser
            .parse(["NUMBER", "WS", "PLUS", "WS", "SEMICOLON"])
            .unwrap_err();
        assert!(matches!(err, ParseError::SyntaxError { position: 4, .. }));
    }

    #[test]
    fn owned_token_types() {
        let tables = single();
        let parser = Parser::new(&tables);
        assert!(parser.parse(vec![std::string::String::from("a")]).is_ok());
        assert!(parser.parse(vec![String::from("a")]).is_ok());
    }

    #[test]
    fn trace_reports_every_step() {
        let tables = single();
        let steps = RefCell::new(Vec::new());
        let parser = Parser::new(&tables).with_trace(|step| steps.borrow_mut().push(step.to_string()));
        parser.parse(["a"]).unwrap();
        drop(parser);
        assert_eq!(
            steps.into_inner(),
            vec![
                "<0> shift `a`@0 -> 1",
                "<1> reduce 0 (S -> a) -> 2",
                "<2> accept @1",
            ]
        );
    }

    #[test]
    fn trace_reports_error_step() {
        let tables = single();
        let errors = RefCell::new(0);
        let parser = Parser::new(&tables).with_trace(|step| {
            if let Step::Error { terminal, .. } = step {
                assert_eq!(*terminal, "b");
                *errors.borrow_mut() += 1;
            }
        });
        assert!(parser.parse(["b"]).is_err());
        drop(parser);
        assert_eq!(errors.into_inner(), 1);
    }

    #[test]
    fn missing_goto_is_an_internal_error() {
        let tables = ParseTables::from_static(
            "S",
            3,
            &[("S", &["a"])],
            &[
                (0, "a", Action::Shift(1)),
                (1, "$", Action::Reduce(0)),
                (2, "$", Action::Accept),
            ],
            &[],
            &[],
        );
        let err = Parser::new(&tables).parse(["a"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingGoto {
                state: 0,
                nonterminal: "S".into(),
            }
        );
        assert!(!err.is_syntax_error());
    }

    #[test]
    fn overlong_reduce_underflows() {
        let tables = ParseTables::from_static(
            "S",
            3,
            &[("S", &["a", "a", "a"])],
            &[
                (0, "a", Action::Shift(1)),
                (1, "$", Action::Reduce(0)),
                (2, "$", Action::Accept),
            ],
            &[(0, "S", 2)],
            &[],
        );
        let err = Parser::new(&tables).parse(["a"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::StackUnderflow {
                production: 0,
                depth: 2,
            }
        );
    }

    #[test]
    fn reduce_by_unknown_production() {
        let tables = ParseTables::from_static(
            "S",
            2,
            &[("S", &["a"])],
            &[(0, "a", Action::Shift(1)), (1, "$", Action::Reduce(5))],
            &[],
            &[],
        );
        let err = Parser::new(&tables).parse(["a"]).unwrap_err();
        assert_eq!(err, ParseError::UnknownProduction { production: 5 });
    }

    #[test]
    fn tables_are_shared_across_threads() {
        let tables = statement();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let tables = &tables;
                    s.spawn(move || {
                        let tokens: &[&str] = if i % 2 == 0 {
                            &["NUMBER", "PLUS", "NUMBER", "SEMICOLON"]
                        } else {
                            &["NUMBER", "PLUS", "SEMICOLON"]
                        };
                        (i, Parser::new(tables).parse(tokens))
                    })
                })
                .collect();
            for handle in handles {
                let (i, result) = handle.join().unwrap();
                assert_eq!(result.is_ok(), i % 2 == 0);
            }
        });
    }
}
