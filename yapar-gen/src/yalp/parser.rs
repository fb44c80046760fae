//! Parser for the production section of a `.yalp` file.
//!
//! Consumes the token slice produced by [`super::lexer`] and yields one
//! [`Rule`] per `name : alt | alt ;` block. Symbols remember the index of
//! their token so that later checks can point at a line.

use super::lexer::Token;
use chumsky::prelude::*;

/// A symbol occurrence and the index of its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sym {
    pub name: String,
    pub at: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rule {
    pub lhs: Sym,
    pub alternatives: Vec<Vec<Sym>>,
}

pub(crate) fn parser<'a>() -> impl Parser<'a, &'a [Token], Vec<Rule>, extra::Err<Rich<'a, Token>>>
{
    let symbol = select! {
        Token::Ident(name) => name,
    }
    .map_with(|name, e| Sym {
        name,
        at: {
            let span: SimpleSpan = e.span();
            span.start
        },
    })
    .labelled("symbol");

    let alternative = symbol.clone().repeated().collect::<Vec<_>>();

    let alternatives = alternative
        .separated_by(just(Token::Pipe))
        .at_least(1)
        .collect::<Vec<_>>();

    let rule = symbol
        .then_ignore(just(Token::Colon))
        .then(alternatives)
        .then_ignore(just(Token::Semi))
        .map(|(lhs, alternatives)| Rule { lhs, alternatives });

    rule.repeated().collect::<Vec<_>>().then_ignore(end())
}
