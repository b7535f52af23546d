use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Read};
use std::iter::FusedIterator;

use crate::feeder::{Exhausted, Feeder};
use crate::runes;
use crate::token::{Position, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// `${` not followed by a valid identifier, or a stray rune
    /// inside the identifier.
    InvalidVarName,
    /// `$` not followed by `{` or an identifier.
    InvalidExpansion,
    /// `:` inside `${...}` not followed by `-`, `+` or `=`.
    InvalidExpansionMode,
    /// Input ended in the middle of a `$name` or `${...}` construct.
    UnexpectedEndOfInput,
    /// The underlying reader failed.
    Read { kind: io::ErrorKind, message: String },
}

impl LexErrorKind {
    /// Whether this is a syntax error rather than a read failure.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        !matches!(self, Self::Read { .. })
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVarName => write!(f, "invalid var name"),
            Self::InvalidExpansion => write!(f, "invalid expansion"),
            Self::InvalidExpansionMode => write!(f, "invalid expansion mode"),
            Self::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            Self::Read { message, .. } => write!(f, "read failed: {message}"),
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {position}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

/// Tokenize text from a reader.
///
/// The returned iterator reads input only as far as needed to produce
/// the next token. It always ends with exactly one `Error` or
/// `EndOfInput` token.
pub fn tokenize<R: Read>(reader: R) -> Lexer<R> {
    Lexer::new(reader)
}

/// Tokenize a string.
#[must_use]
pub fn tokenize_str(input: &str) -> Lexer<&[u8]> {
    Lexer::new(input.as_bytes())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Literal text, up to the next `$`, `${` or `}`.
    Text,
    /// Right after `${`.
    ExpVarStart,
    /// Inside the identifier of `${name...`.
    ExpVarMore,
    /// At the `:` following `${name`.
    ExpMode,
    /// Right after an unbracketed `$`.
    SimpleVarStart,
    /// Inside the identifier of `$name`.
    SimpleVarMore,
}

/// Lexer for shell-style expansions.
pub struct Lexer<R> {
    feeder: Feeder<R>,
    state: Option<State>,
    pending: VecDeque<Token>,
    current: String,
    line: usize,
    token_line: usize,
}

impl<R: Read> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            feeder: Feeder::new(reader),
            state: Some(State::Text),
            pending: VecDeque::with_capacity(2),
            current: String::new(),
            line: Position::START.line,
            token_line: Position::START.line,
        }
    }

    fn run(&mut self, state: State) -> Option<State> {
        match state {
            State::Text => self.lex_text(),
            State::ExpVarStart => self.lex_exp_var(),
            State::ExpVarMore => self.lex_exp_var_more(),
            State::ExpMode => self.lex_exp_mode(),
            State::SimpleVarStart => self.lex_var(),
            State::SimpleVarMore => self.lex_var_more(),
        }
    }

    // text ---> '${' ident [mode text] '}'
    //      `--> '$' ident
    fn lex_text(&mut self) -> Option<State> {
        loop {
            let exhausted = self.feeder.at_least(2);
            let input = self.feeder.buffered();

            if runes::start(input).is_some() {
                self.emit(TokenKind::Text);
                self.step(2);
                self.emit(TokenKind::Start);
                return Some(State::ExpVarStart);
            } else if runes::end(input).is_some() {
                // closes a `${name:-...` whose default text we are in
                self.emit(TokenKind::Text);
                self.step(1);
                self.emit(TokenKind::End);
                return Some(State::Text);
            } else if runes::rune(input, '$').is_some() {
                self.emit(TokenKind::Text);
                self.step(1);
                return Some(State::SimpleVarStart);
            } else if let Some(n) = runes::newline(input) {
                self.step(n);
                self.line += 1;
            } else if runes::escaped_dollar(input).is_some() {
                self.skip(1);
                self.step(1);
            } else if !input.is_empty() {
                self.step(1);
            } else {
                self.emit(TokenKind::Text);
                self.emit_exhausted(exhausted.unwrap_or(Exhausted::Eof), false);
                return None;
            }
        }
    }

    // '${' ident ...
    //      ^
    fn lex_exp_var(&mut self) -> Option<State> {
        let exhausted = self.feeder.at_least(1);
        let input = self.feeder.buffered();

        if runes::one_if(input, runes::is_ident_first).is_some() {
            self.step(1);
            Some(State::ExpVarMore)
        } else if !input.is_empty() {
            self.emit_error(LexErrorKind::InvalidVarName);
            None
        } else {
            self.emit_exhausted(exhausted.unwrap_or(Exhausted::Eof), true);
            None
        }
    }

    // '${' ident '}'
    // '${' ident ':' ...
    //       ^^^^
    fn lex_exp_var_more(&mut self) -> Option<State> {
        loop {
            let exhausted = self.feeder.at_least(1);
            let input = self.feeder.buffered();

            if runes::one_if(input, runes::is_ident_more).is_some() {
                self.step(1);
            } else if runes::end(input).is_some() {
                self.emit(TokenKind::Identifier);
                self.step(1);
                self.emit(TokenKind::End);
                return Some(State::Text);
            } else if runes::rune(input, ':').is_some() {
                self.emit(TokenKind::Identifier);
                return Some(State::ExpMode);
            } else if !input.is_empty() {
                self.emit_error(LexErrorKind::InvalidVarName);
                return None;
            } else {
                self.emit(TokenKind::Identifier);
                self.emit_exhausted(exhausted.unwrap_or(Exhausted::Eof), true);
                return None;
            }
        }
    }

    // '${' ident mode text '}'
    //            ^^^^
    // The default text goes back through the text state so it can
    // hold expansions of its own.
    fn lex_exp_mode(&mut self) -> Option<State> {
        let exhausted = self.feeder.at_least(2);
        let input = self.feeder.buffered();

        if let Some(mode) = runes::mode(input) {
            self.step(2);
            self.emit(TokenKind::Mode(mode));
            Some(State::Text)
        } else if input.len() > 1 {
            self.emit_error(LexErrorKind::InvalidExpansionMode);
            None
        } else {
            self.emit_exhausted(exhausted.unwrap_or(Exhausted::Eof), true);
            None
        }
    }

    // '$' ident
    //     ^
    fn lex_var(&mut self) -> Option<State> {
        let exhausted = self.feeder.at_least(1);
        let input = self.feeder.buffered();

        if runes::one_if(input, runes::is_ident_first).is_some() {
            self.step(1);
            Some(State::SimpleVarMore)
        } else if !input.is_empty() {
            self.emit_error(LexErrorKind::InvalidExpansion);
            None
        } else {
            self.emit_exhausted(exhausted.unwrap_or(Exhausted::Eof), true);
            None
        }
    }

    // '$' ident text
    //      ^^^^
    fn lex_var_more(&mut self) -> Option<State> {
        loop {
            let exhausted = self.feeder.at_least(1);
            let input = self.feeder.buffered();

            if runes::one_if(input, runes::is_ident_more).is_some() {
                self.step(1);
                continue;
            }

            let more = !input.is_empty();
            let name = self
                .current
                .strip_prefix('$')
                .unwrap_or(&self.current)
                .to_string();
            self.emit(TokenKind::SimpleExpansion { name });

            if more {
                return Some(State::Text);
            }
            self.emit_exhausted(exhausted.unwrap_or(Exhausted::Eof), false);
            return None;
        }
    }

    /// Moves `n` runes from the lookahead into the current token.
    fn step(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(ch) = self.feeder.pop() {
                self.current.push(ch);
            }
        }
    }

    /// Drops `n` runes from the lookahead.
    fn skip(&mut self, n: usize) {
        for _ in 0..n {
            self.feeder.pop();
        }
    }

    fn emit(&mut self, kind: TokenKind) {
        let position = Position {
            line: self.token_line,
        };
        self.token_line = self.line;

        if kind == TokenKind::Text && self.current.is_empty() {
            return;
        }

        let text = std::mem::take(&mut self.current);
        self.pending.push_back(Token::new(kind, text, position));
    }

    fn emit_error(&mut self, kind: LexErrorKind) {
        let position = Position { line: self.line };
        self.current.clear();

        let text = kind.to_string();
        let err = LexError { kind, position };
        self.pending
            .push_back(Token::new(TokenKind::Error(err), text, position));
    }

    /// Ends the stream. Clean exhaustion is only an error when a
    /// construct was left open.
    fn emit_exhausted(&mut self, cause: Exhausted, mid_construct: bool) {
        match cause {
            Exhausted::Eof if mid_construct => {
                self.emit_error(LexErrorKind::UnexpectedEndOfInput);
            }
            Exhausted::Eof => {
                let position = Position { line: self.line };
                self.current.clear();
                self.pending
                    .push_back(Token::new(TokenKind::EndOfInput, String::new(), position));
            }
            Exhausted::Failed { kind, message } => {
                self.emit_error(LexErrorKind::Read { kind, message });
            }
        }
    }
}

impl<R: Read> Iterator for Lexer<R> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            let state = self.state?;
            self.state = self.run(state);
        }
    }
}

impl<R: Read> FusedIterator for Lexer<R> {}
