//! Tokenizer for the production section of a `.yalp` file.
//!
//! Built on [`logos`]. Whitespace and `/* ... */` comments are dropped,
//! the literal `ε` is dropped as well (an alternative consisting only of
//! `ε` is the empty alternative), and every remaining token is paired
//! with its byte offset in the whole grammar text so that errors can be
//! reported by line.

use crate::error::GenError;
use logos::Logos;
use std::fmt;
use yapar::END_MARKER;

/// Tokens of the production section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Token {
    /// A terminal or non-terminal name.
    Ident(String),
    /// `:` after a rule name.
    Colon,
    /// `|` between alternatives.
    Pipe,
    /// `;` closing a rule.
    Semi,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "`{}`", name),
            Token::Colon => f.write_str("`:`"),
            Token::Pipe => f.write_str("`|`"),
            Token::Semi => f.write_str("`;`"),
        }
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum LogosToken {
    #[token(":")]
    Colon,

    #[token("|")]
    Pipe,

    #[token(";")]
    Semi,

    #[token("ε")]
    Epsilon,

    /// Lexed so that its use is reported as a reserved symbol rather than
    /// as a stray character.
    #[token("$")]
    EndMarker,

    #[regex(r"[A-Za-z_][A-Za-z0-9_']*")]
    Ident,

    #[token("/*", block_comment)]
    Comment,
}

fn block_comment(lex: &mut logos::Lexer<LogosToken>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

/// Maps byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    pub(crate) fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

/// Tokens of a production section with the byte offset of each.
#[derive(Debug, Default)]
pub(crate) struct Lexed {
    pub tokens: Vec<Token>,
    pub offsets: Vec<usize>,
}

/// Tokenizes `body`, which starts at byte `base` of the grammar text.
pub(crate) fn tokenize(body: &str, base: usize, lines: &LineIndex) -> Result<Lexed, GenError> {
    let mut lexed = Lexed::default();
    let mut lex = LogosToken::lexer(body);
    while let Some(tok) = lex.next() {
        let offset = base + lex.span().start;
        let token = match tok {
            Ok(LogosToken::Colon) => Token::Colon,
            Ok(LogosToken::Pipe) => Token::Pipe,
            Ok(LogosToken::Semi) => Token::Semi,
            Ok(LogosToken::Ident) => Token::Ident(lex.slice().to_string()),
            Ok(LogosToken::EndMarker) => Token::Ident(END_MARKER.to_string()),
            Ok(LogosToken::Epsilon | LogosToken::Comment) => continue,
            Err(()) if lex.slice().starts_with("/*") => {
                return Err(GenError::invalid(format!(
                    "line {}: unterminated comment",
                    lines.line(offset)
                )));
            }
            Err(()) => {
                return Err(GenError::invalid(format!(
                    "line {}: unexpected character `{}`",
                    lines.line(offset),
                    lex.slice()
                )));
            }
        };
        log::trace!("{}: {}", lines.line(offset), token);
        lexed.tokens.push(token);
        lexed.offsets.push(offset);
    }
    Ok(lexed)
}
