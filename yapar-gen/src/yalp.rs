//! Reader for `.yalp` grammar files.
//!
//! A `.yalp` file has a header and a production section separated by a
//! line holding only `%%`:
//!
//! ```text
//! /* tokens */
//! %token NUMBER [0-9]+
//! %token PLUS SEMICOLON
//! %token WS
//! IGNORE WS
//! %%
//! s : p SEMICOLON ;
//! p :
//!     NUMBER PLUS NUMBER
//! ;
//! ```
//!
//! The header is read line by line: `%token` declares the leading run of
//! upper-case names that follows it (anything after that run, typically
//! the token's pattern, is ignored), `IGNORE` marks declared tokens the
//! parser should skip, and a line starting with `/*` opens a comment that
//! runs to the next `*/`. Other header lines are skipped with a warning.
//!
//! The production section is free-form: each rule is
//! `name : alt | alt ;`, may span lines, and an empty alternative (or a
//! lone `ε`) is the empty production.

mod lexer;
mod parser;

use crate::error::GenError;
use crate::grammar::Grammar;
use chumsky::Parser as _;
use lexer::{LineIndex, Token};
use once_cell::sync::Lazy;
use parser::Rule;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use yapar::END_OF_INPUT_ALIASES;

static TOKEN_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%token((?:[ \t]+[A-Z_][A-Z0-9_]*\b)+)").unwrap());

static IGNORE_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^IGNORE((?:[ \t]+[A-Z_][A-Z0-9_]*\b)+)").unwrap());

#[derive(Debug, Default)]
struct Header {
    tokens: Vec<String>,
    ignores: Vec<String>,
}

/// Parses `.yalp` text into a [`Grammar`].
pub(crate) fn parse(text: &str) -> Result<Grammar, GenError> {
    let lines = LineIndex::new(text);
    let (header, base) = parse_header(text)?;
    let body = &text[base..];
    let lexed = lexer::tokenize(body, base, &lines)?;
    let rules = parser::parser()
        .parse(lexed.tokens.as_slice())
        .into_result()
        .map_err(|errs| {
            let line_of = |at: usize| match lexed.offsets.get(at) {
                Some(&offset) => lines.line(offset),
                None => lines.line(text.len()),
            };
            match errs.first() {
                Some(err) => {
                    let at = err.span().start;
                    let msg = match (err.found(), at.checked_sub(1).map(|i| &lexed.tokens[i])) {
                        (Some(Token::Colon), Some(Token::Ident(prev))) => {
                            format!("missing `;` before rule `{}`", prev)
                        }
                        (Some(found), _) => format!("unexpected {}", found),
                        (None, _) => "missing `;` at end of rule".to_string(),
                    };
                    GenError::invalid(format!("line {}: {}", line_of(at), msg))
                }
                None => GenError::invalid("malformed production section"),
            }
        })?;
    check_rules(&rules, &header, &lexed.offsets, &lines)?;

    let builder = rules.into_iter().fold(
        Grammar::builder()
            .tokens(header.tokens)
            .ignore(header.ignores),
        |builder, rule| {
            let alternatives = rule
                .alternatives
                .into_iter()
                .map(|alt| alt.into_iter().map(|sym| sym.name).collect())
                .collect();
            builder.rule_owned(rule.lhs.name, alternatives)
        },
    );
    builder.build()
}

/// Reads the header and returns it with the byte offset where the
/// production section starts.
fn parse_header(text: &str) -> Result<(Header, usize), GenError> {
    let mut header = Header::default();
    let mut comment_opened_at: Option<usize> = None;
    let mut offset = 0;
    for (i, raw) in text.split_inclusive('\n').enumerate() {
        let line_no = i + 1;
        offset += raw.len();
        let line = raw.trim();
        if comment_opened_at.is_some() {
            if line.contains("*/") {
                comment_opened_at = None;
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("/*") {
            if !rest.contains("*/") {
                comment_opened_at = Some(line_no);
            }
            continue;
        }
        if line == "%%" {
            log::debug!(
                "header: {} tokens, {} ignored",
                header.tokens.len(),
                header.ignores.len()
            );
            return Ok((header, offset));
        }
        if line.starts_with("%token") {
            header.tokens.extend(declared(&TOKEN_DECL, line, line_no)?);
        } else if line.starts_with("IGNORE") {
            header.ignores.extend(declared(&IGNORE_DECL, line, line_no)?);
        } else {
            log::warn!("line {}: skipping unknown directive `{}`", line_no, line);
        }
    }
    match comment_opened_at {
        Some(line_no) => Err(GenError::invalid(format!(
            "line {}: unterminated comment",
            line_no
        ))),
        None => Err(GenError::invalid("missing `%%` section separator")),
    }
}

fn declared(re: &Regex, line: &str, line_no: usize) -> Result<Vec<String>, GenError> {
    let caps = re.captures(line).ok_or_else(|| {
        GenError::invalid(format!("line {}: malformed declaration `{}`", line_no, line))
    })?;
    Ok(caps[1].split_whitespace().map(str::to_string).collect())
}

/// Semantic checks that can point at a line; the remaining ones are left
/// to [`GrammarBuilder::build`](crate::GrammarBuilder::build).
fn check_rules(
    rules: &[Rule],
    header: &Header,
    offsets: &[usize],
    lines: &LineIndex,
) -> Result<(), GenError> {
    let line_of = |at: usize| offsets.get(at).map_or(0, |&offset| lines.line(offset));
    if rules.is_empty() {
        return Err(GenError::invalid("grammar has no productions"));
    }
    let tokens: HashSet<&str> = header.tokens.iter().map(String::as_str).collect();
    let mut defined: HashMap<&str, usize> = HashMap::new();
    for rule in rules {
        let name = rule.lhs.name.as_str();
        let line = line_of(rule.lhs.at);
        if tokens.contains(name) {
            return Err(GenError::invalid(format!(
                "line {}: `{}` is declared both as a token and a non-terminal",
                line, name
            )));
        }
        if END_OF_INPUT_ALIASES.contains(&name) {
            return Err(GenError::invalid(format!(
                "line {}: reserved symbol `{}` used as a non-terminal",
                line, name
            )));
        }
        if let Some(first) = defined.insert(name, line) {
            return Err(GenError::invalid(format!(
                "line {}: non-terminal `{}` already defined on line {}",
                line, name, first
            )));
        }
    }
    for sym in rules.iter().flat_map(|r| r.alternatives.iter().flatten()) {
        let name = sym.name.as_str();
        if END_OF_INPUT_ALIASES.contains(&name) {
            return Err(GenError::invalid(format!(
                "line {}: reserved symbol `{}`",
                line_of(sym.at),
                name
            )));
        }
        if !tokens.is_empty() && !tokens.contains(name) && !defined.contains_key(name) {
            return Err(GenError::invalid(format!(
                "line {}: undefined symbol `{}`",
                line_of(sym.at),
                name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_GRAMMAR: &str = r#"
        /* Parser definition */

        /* BEGIN tokens section */
        %token TOKEN_1
        %token TOKEN_2
        %token TOKEN_3 TOKEN_4
        %token WS
        IGNORE WS
        /* END tokens section */

        %%

        /* BEGIN productions section */
        production1:
              production1 TOKEN_2 production2
            | production2
        ;
        production2:
              production2 TOKEN_2 production3
            | production3
        ;
        production3:
              TOKEN_3 production1 TOKEN_4
            | TOKEN_1
        ;
        /* END productions section */
        "#;

    fn error(text: &str) -> String {
        match parse(text) {
            Err(GenError::InvalidGrammar(msg)) => msg,
            other => panic!("expected InvalidGrammar, got {:?}", other),
        }
    }

    #[test]
    fn tokens_and_ignores() {
        let g = parse(TEST_GRAMMAR).unwrap();
        assert_eq!(g.tokens(), ["TOKEN_1", "TOKEN_2", "TOKEN_3", "TOKEN_4", "WS"]);
        assert_eq!(g.ignores().iter().collect::<Vec<_>>(), ["WS"]);
    }

    #[test]
    fn productions() {
        let g = parse(TEST_GRAMMAR).unwrap();
        assert_eq!(g.start(), "production1");
        assert_eq!(
            g.alternatives("production1").unwrap(),
            [
                vec!["production1", "TOKEN_2", "production2"],
                vec!["production2"],
            ]
        );
        assert_eq!(
            g.alternatives("production2").unwrap(),
            [
                vec!["production2", "TOKEN_2", "production3"],
                vec!["production3"],
            ]
        );
        assert_eq!(
            g.alternatives("production3").unwrap(),
            [vec!["TOKEN_3", "production1", "TOKEN_4"], vec!["TOKEN_1"]]
        );
    }

    #[test]
    fn token_patterns_are_ignored() {
        let g = parse(
            "%token NUMBER [0-9]+\n%token PLUS \\+\n%token SEMICOLON ;\n%%\ns : NUMBER PLUS NUMBER SEMICOLON ;\n",
        )
        .unwrap();
        assert_eq!(g.tokens(), ["NUMBER", "PLUS", "SEMICOLON"]);
    }

    #[test]
    fn multi_line_header_comment() {
        let g = parse("/* tokens\n %token HIDDEN\n */\n%token A\n%%\ns : A ;").unwrap();
        assert_eq!(g.tokens(), ["A"]);
    }

    #[test]
    fn unknown_directive_is_skipped() {
        let g = parse("%token A\n%start s\n%%\ns : A ;").unwrap();
        assert_eq!(g.tokens(), ["A"]);
    }

    #[test]
    fn empty_alternatives() {
        let g = parse("%%\nopt : A opt | ;\nrest : ε | B ;").unwrap();
        assert!(g.alternatives("opt").unwrap()[1].is_empty());
        assert!(g.alternatives("rest").unwrap()[0].is_empty());
    }

    #[test]
    fn missing_semicolon() {
        assert_eq!(
            error("%token A B\n%%\ns : A\np : B ;\n"),
            "line 4: missing `;` before rule `p`"
        );
        assert_eq!(
            error("%token A\n%%\ns : A\n"),
            "line 4: missing `;` at end of rule"
        );
    }

    #[test]
    fn stray_token() {
        assert_eq!(error("%%\ns : A ; | B ;"), "line 2: unexpected `|`");
    }

    #[test]
    fn zero_productions() {
        assert_eq!(
            error("%token A\n%%\n/* nothing */\n"),
            "grammar has no productions"
        );
    }

    #[test]
    fn missing_separator() {
        assert_eq!(error("%token A\ns : A ;"), "missing `%%` section separator");
    }

    #[test]
    fn unterminated_header_comment() {
        assert_eq!(
            error("%token A\n/* open\n%%\ns : A ;"),
            "line 2: unterminated comment"
        );
    }

    #[test]
    fn malformed_token_declaration() {
        assert!(error("%token lower\n%%\ns : A ;").starts_with("line 1: malformed declaration"));
    }

    #[test]
    fn duplicate_nonterminal() {
        assert_eq!(
            error("%token A\n%%\ns : A ;\n\ns : A A ;"),
            "line 5: non-terminal `s` already defined on line 3"
        );
    }

    #[test]
    fn token_used_as_nonterminal() {
        assert_eq!(
            error("%token A S\n%%\nS : A ;"),
            "line 3: `S` is declared both as a token and a non-terminal"
        );
    }

    #[test]
    fn undefined_symbol() {
        assert_eq!(
            error("%token A\n%%\ns : A\n  | B ;"),
            "line 4: undefined symbol `B`"
        );
    }

    #[test]
    fn reserved_end_marker() {
        assert_eq!(error("%%\ns : A $ ;"), "line 2: reserved symbol `$`");
        assert_eq!(error("%%\ns : A EOF ;"), "line 2: reserved symbol `EOF`");
    }
}
