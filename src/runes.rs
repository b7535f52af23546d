//! Rune classifiers used by the lexer.
//!
//! Each matcher looks at the front of a lookahead buffer and returns
//! how many runes it matched, or `None`.

use crate::token::Mode;

/// Identifier first character: `[A-Za-z_]`.
#[must_use]
pub const fn is_ident_first(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Identifier continuation character: `[A-Za-z0-9_]`.
#[must_use]
pub const fn is_ident_more(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Matches a single rune.
#[must_use]
pub fn rune(input: &[char], ch: char) -> Option<usize> {
    (input.first() == Some(&ch)).then_some(1)
}

/// Matches a fixed sequence of runes.
#[must_use]
pub fn sequence(input: &[char], seq: &[char]) -> Option<usize> {
    input.starts_with(seq).then_some(seq.len())
}

/// Matches one rune satisfying `pred`.
#[must_use]
pub fn one_if(input: &[char], pred: impl Fn(char) -> bool) -> Option<usize> {
    input.first().copied().filter(|&ch| pred(ch)).map(|_| 1)
}

/// `\n` or `\r\n`.
#[must_use]
pub fn newline(input: &[char]) -> Option<usize> {
    rune(input, '\n').or_else(|| sequence(input, &['\r', '\n']))
}

/// `${`
#[must_use]
pub fn start(input: &[char]) -> Option<usize> {
    sequence(input, &['$', '{'])
}

/// `}`
#[must_use]
pub fn end(input: &[char]) -> Option<usize> {
    rune(input, '}')
}

/// `\$`
#[must_use]
pub fn escaped_dollar(input: &[char]) -> Option<usize> {
    sequence(input, &['\\', '$'])
}

/// `:` followed by `-`, `+` or `=`.
#[must_use]
pub fn mode(input: &[char]) -> Option<Mode> {
    match input {
        [':', ch, ..] => Mode::from_rune(*ch),
        _ => None,
    }
}
