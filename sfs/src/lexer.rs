//! Lexer for the save-file text format.
//!
//! A save file is a sequence of block names, braces and `key = value` assignments:
//!
//! ```text
//! GAME
//! {
//!     version = 1.12.5
//!     PARAMETERS
//!     {
//!         preset = Normal
//!     }
//! }
//! ```
//!
//! Values run to the end of their line. The exception is a run of `}` at the end of an
//! assignment line, each separated from the value by whitespace, which closes blocks so that
//! one-line blocks like `ORBIT { SMA = 12345.6789 }` lex as expected.

use chumsky::prelude::*;

use crate::span::Spanned;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A bare word naming the block opened by the next `{`.
    Name(String),
    Assign {
        key: String,
        value: String,
    },
    Open,
    Close,
}

pub fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<Spanned<Token>>, extra::Err<Rich<'a, char>>> {
    let blank = one_of(" \t\r\n").repeated();

    let open = just('{')
        .map_with(|_, e| {
            vec![Spanned {
                span: e.span(),
                val: Token::Open,
            }]
        })
        .labelled("`{`");

    let close = just('}')
        .map_with(|_, e| {
            vec![Spanned {
                span: e.span(),
                val: Token::Close,
            }]
        })
        .labelled("`}`");

    let key = none_of("={}\r\n").repeated().to_slice();

    let value = none_of("\r\n")
        .repeated()
        .to_slice()
        .map_with(|raw: &str, e| (raw, e.span()));

    let assign = key
        .then_ignore(just('='))
        .then(value)
        .map_with(|(key, (raw, value_span)), e| split_assignment(key, raw, value_span, e.span()))
        .labelled("assignment");

    let name = none_of("={}\r\n \t")
        .then(none_of("={}\r\n").repeated())
        .to_slice()
        .map_with(|name: &str, e| {
            vec![Spanned {
                span: e.span(),
                val: Token::Name(name.trim_end().to_string()),
            }]
        })
        .labelled("block name");

    let token = choice((open, close, assign, name));

    blank
        .clone()
        .ignore_then(token.then_ignore(blank).repeated().collect::<Vec<_>>())
        .then_ignore(end())
        .map(|groups: Vec<Vec<Spanned<Token>>>| groups.into_iter().flatten().collect::<Vec<_>>())
        .labelled("save file")
}

/// Builds the assignment token, peeling whitespace-separated `}` off the end of the value.
fn split_assignment(
    key: &str,
    raw: &str,
    value_span: SimpleSpan<usize>,
    span: SimpleSpan<usize>,
) -> Vec<Spanned<Token>> {
    let mut value = raw.trim_end();
    let mut closers = Vec::new();

    while let Some(rest) = value.strip_suffix('}') {
        if !(rest.is_empty() || rest.ends_with(char::is_whitespace)) {
            break;
        }
        let at = value_span.start + rest.len();
        closers.push(Spanned {
            span: SimpleSpan::new(at, at + 1),
            val: Token::Close,
        });
        value = rest.trim_end();
    }

    // `value` is still a prefix of `raw`, so its end is an offset into the line.
    let end = value_span.start + value.len();
    let mut tokens = Vec::with_capacity(closers.len() + 1);
    tokens.push(Spanned {
        span: SimpleSpan::new(span.start, end),
        val: Token::Assign {
            key: key.trim().to_string(),
            value: value.trim_start().to_string(),
        },
    });
    tokens.extend(closers.into_iter().rev());
    tokens
}
