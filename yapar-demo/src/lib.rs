//! # yapar-demo
//!
//! A recognizer for bracket expressions such as `a < [b > c]`, generated
//! from `src/brackets.yalp` by the build script and driven by the `yapar`
//! runtime.
//!
//! ```rust
//! use yapar_demo::{lex, recognize};
//!
//! assert!(recognize("a < [b > c]").is_ok());
//! assert!(recognize("a <").is_err());
//! assert_eq!(lex("a<b").unwrap()[1], ("LT", "<"));
//! ```

/// Generated tables and the `parse` entry point.
pub mod parser_data {
    include!(concat!(env!("OUT_DIR"), "/parser_data.rs"));
}

use yapar::{ParseError, ParserStats};

/// Splits `text` into `(terminal, lexeme)` pairs.
///
/// Whitespace runs become `WS` tokens, which the generated tables ignore.
///
/// # Returns
/// The tokens, or the byte offset of the first character that starts no
/// token.
pub fn lex(text: &str) -> Result<Vec<(&'static str, &str)>, usize> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        let len = match c {
            '<' | '>' | '[' | ']' => c.len_utf8(),
            c if c.is_whitespace() => rest
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len()),
            c if c.is_ascii_alphabetic() || c == '_' => rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len()),
            _ => return Err(text.len() - rest.len()),
        };
        let (lexeme, tail) = rest.split_at(len);
        let terminal = match c {
            '<' => "LT",
            '>' => "GT",
            '[' => "LBRACKET",
            ']' => "RBRACKET",
            c if c.is_whitespace() => "WS",
            _ => "ID",
        };
        log::trace!("token {} {:?}", terminal, lexeme);
        tokens.push((terminal, lexeme));
        rest = tail;
    }
    Ok(tokens)
}

/// Error of [`recognize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizeError {
    /// No token starts at this byte offset.
    Lex(usize),
    Parse(ParseError),
}

/// Lexes and parses `text`.
pub fn recognize(text: &str) -> Result<ParserStats, RecognizeError> {
    let tokens = lex(text).map_err(RecognizeError::Lex)?;
    parser_data::parse(tokens).map_err(RecognizeError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yapar::{Action, Parser};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn generated_tables() {
        let tables = parser_data::tables();
        assert_eq!(parser_data::N_STATES, 12);
        assert_eq!(tables.state_count(), 12);
        assert_eq!(tables.start(), "s");
        assert_eq!(tables.productions().len(), 6);
        assert_eq!(tables.action(0, "ID"), Some(Action::Shift(2)));
        assert_eq!(tables.action(3, "$"), Some(Action::Accept));
        assert_eq!(tables.goto(0, "s"), Some(3));
        assert!(tables.is_ignored("WS"));
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn accepts_token_names() {
        init_logger();
        let stats =
            parser_data::parse(["ID", "LT", "LBRACKET", "ID", "GT", "ID", "RBRACKET"]).unwrap();
        assert_eq!(stats.tokens, 7);
        assert_eq!(stats.shifts, 7);
        assert!(parser_data::parse(["ID", "EOF"]).is_ok());
    }

    #[test]
    fn rejects_dangling_operator() {
        assert_eq!(
            parser_data::parse(["ID", "LT"]),
            Err(ParseError::SyntaxError {
                position: 2,
                unexpected: "$".into(),
                expected: vec!["ID".into(), "LBRACKET".into()],
            })
        );
    }

    #[test]
    fn recognizes_text() {
        init_logger();
        assert!(recognize("a").is_ok());
        assert!(recognize("a < [b > c] < d").is_ok());
        assert!(recognize("[[x]]").is_ok());
        assert!(recognize("  a  >  b  ").is_ok());
        assert!(matches!(
            recognize("[a"),
            Err(RecognizeError::Parse(ParseError::SyntaxError { .. }))
        ));
        assert_eq!(recognize("a + b"), Err(RecognizeError::Lex(2)));
    }

    #[test]
    fn whitespace_counts_toward_positions() {
        match recognize("a > >") {
            Err(RecognizeError::Parse(ParseError::SyntaxError {
                position,
                unexpected,
                ..
            })) => {
                assert_eq!(position, 4);
                assert_eq!(unexpected, "GT");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn tables_are_shared_across_parsers() {
        let tables = parser_data::tables();
        std::thread::scope(|scope| {
            for input in ["a", "a < b", "[a > b]"] {
                scope.spawn(move || {
                    let tokens = lex(input).unwrap();
                    assert!(Parser::new(tables).parse(tokens).is_ok());
                });
            }
        });
    }
}
