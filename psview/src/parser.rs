//! Splits script text into whitespace separated tokens, and classifies a
//! token at the time it is used.
//!
//! Line structure carries no meaning, a newline is just another white space.
use winnow::{
    ascii::{digit0, digit1},
    combinator::{alt, opt, preceded},
    token::{one_of, take_till, take_while},
    PResult, Parser,
};

/// A token borrowed from the script text.
///
/// `pos` is the index of the token in the raw token stream, used to locate
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub pos: usize,
    pub text: &'a str,
}

/// What a token means, decided when the token is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind<'a> {
    Number(f32),
    /// Looks like a number, but is not one, e.g. `1.2.3` or `12px`.
    MalformedNumber,
    /// `/name`, the name without leading slash.
    DefinitionStart(&'a str),
    /// `}`
    DefinitionEnd,
    /// `%!PS-Adobe-3.0` like header line emitted by script producers.
    Header,
    /// Operator name or defined name reference.
    Name(&'a str),
}

impl<'a> Token<'a> {
    pub fn new(pos: usize, text: &'a str) -> Self {
        Self { pos, text }
    }

    pub fn kind(&self) -> TokenKind<'a> {
        let s = self.text;
        if let Some(v) = parse_number(s) {
            TokenKind::Number(v)
        } else if looks_like_number(s) {
            TokenKind::MalformedNumber
        } else if let Some(name) = s.strip_prefix('/') {
            TokenKind::DefinitionStart(name)
        } else if s == "}" {
            TokenKind::DefinitionEnd
        } else if s.starts_with("%!") {
            TokenKind::Header
        } else {
            TokenKind::Name(s)
        }
    }
}

fn is_white_space(c: char) -> bool {
    c.is_whitespace()
}

fn white_space0<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(0.., is_white_space).parse_next(input)
}

/// Parses one token, skipping preceded white spaces.
fn token<'a>(input: &mut &'a str) -> PResult<&'a str> {
    preceded(white_space0, take_till(1.., is_white_space)).parse_next(input)
}

/// Matches a decimal number: optional sign, digits with optional fraction,
/// optional exponent. `.5` and `5.` are accepted.
fn number(input: &mut &str) -> PResult<()> {
    (
        opt(one_of(['+', '-'])),
        alt(((digit1, opt(('.', digit0))).void(), ('.', digit1).void())),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .void()
        .parse_next(input)
}

/// Returns the value if the whole of `s` is a decimal number.
pub fn parse_number(s: &str) -> Option<f32> {
    number.parse(s).ok()?;
    s.parse().ok()
}

/// Token starts like a number: a digit, or sign/dot followed by a digit.
fn looks_like_number(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('+' | '-') => match chars.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        },
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Iterator of tokens in source order.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    remains: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = token.parse_next(&mut self.remains).ok()?;
        let r = Token::new(self.pos, text);
        self.pos += 1;
        Some(r)
    }
}

/// Split script into tokens. Total, an empty or blank script yields nothing.
pub fn tokenize(script: &str) -> Tokens<'_> {
    Tokens {
        remains: script,
        pos: 0,
    }
}

#[cfg(test)]
mod tests;
