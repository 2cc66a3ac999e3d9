//! Splits one source line into tokens.
//!
//! Tokens are separated by whitespace or commas.  A token may be
//! enclosed in double quotes, in which case it may be empty but may
//! not contain a double quote.
use logos::Logos;


fn unquote(lex: &mut logos::Lexer<Token>) -> String {
    let s = lex.slice();
    s[1..s.len() - 1].to_string()
}

fn verbatim(lex: &mut logos::Lexer<Token>) -> String {
    lex.slice().to_string()
}

#[derive(Debug, PartialEq, Eq, Logos, Clone)]
#[logos(skip r"[ \t\r\n,]+")]
pub(crate) enum Token {
    #[regex(r#""[^"]*""#, unquote)]
    Quoted(String),

    #[regex(r#"[^ \t\r\n,"]+"#, verbatim)]
    Bare(String),
}

impl Token {
    pub(crate) fn into_text(self) -> String {
        match self {
            Token::Quoted(s) | Token::Bare(s) => s,
        }
    }
}

/// Returned when a line contains a double quote with no partner.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct UnterminatedQuote {
    pub(crate) column: usize,
}

pub(crate) fn tokenize(line: &str) -> Result<Vec<String>, UnterminatedQuote> {
    let mut lexer = Token::lexer(line);
    let mut result = Vec::new();
    while let Some(item) = lexer.next() {
        match item {
            Ok(token) => result.push(token.into_text()),
            Err(()) => {
                return Err(UnterminatedQuote {
                    column: lexer.span().start,
                });
            }
        }
    }
    Ok(result)
}
