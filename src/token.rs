use std::fmt;

use crate::lexer::LexError;

/// Source location for diagnostics.
///
/// `\n` and `\r\n` both count as a single line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
}

impl Position {
    /// Position of the first line.
    pub const START: Self = Self { line: 1 };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

/// Expansion mode of a bracketed expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// `${name:-word}`: use `word` when `name` is empty.
    Default,
    /// `${name:+word}`: use `word` when `name` is not empty.
    Alternate,
    /// `${name:=word}`: assign `word` to `name` when it is empty.
    Assign,
}

impl Mode {
    /// Mode selected by the rune following `:`.
    #[must_use]
    pub const fn from_rune(ch: char) -> Option<Self> {
        match ch {
            '-' => Some(Self::Default),
            '+' => Some(Self::Alternate),
            '=' => Some(Self::Assign),
            _ => None,
        }
    }

    /// Source form, including the leading colon.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => ":-",
            Self::Alternate => ":+",
            Self::Assign => ":=",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text.
    Text,
    /// Opening `${` of a bracketed expansion.
    Start,
    /// Closing `}`.
    End,
    /// Variable name inside `${...}`.
    Identifier,
    /// `:-`, `:+` or `:=` inside `${...}`.
    Mode(Mode),
    /// Unbracketed `$name`.
    SimpleExpansion { name: String },
    /// Syntax or read error. Always the last token.
    Error(LexError),
    /// Clean end of input. Always the last token.
    EndOfInput,
}

impl TokenKind {
    /// Whether no further tokens follow this one.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::EndOfInput)
    }
}

/// A single token with its kind, text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, text: String, position: Position) -> Self {
        Self {
            kind,
            text,
            position,
        }
    }
}

/// Diagnostic rendering: `EOF`, `Error: <message>`, or the quoted
/// text cut to ten characters.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::EndOfInput => f.write_str("EOF"),
            TokenKind::Error(err) => write!(f, "Error: {}", err.kind),
            _ if self.text.chars().count() > 10 => {
                let head: String = self.text.chars().take(10).collect();
                write!(f, "{head:?}...")
            }
            _ => write!(f, "{:?}", self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::LexErrorKind;

    fn text(s: &str) -> Token {
        Token::new(TokenKind::Text, s.to_string(), Position::START)
    }

    #[test]
    fn renders_short_text_quoted() {
        assert_eq!(text("hello").to_string(), "\"hello\"");
    }

    #[test]
    fn renders_long_text_truncated() {
        assert_eq!(text("hello world!").to_string(), "\"hello worl\"...");
    }

    #[test]
    fn truncates_on_characters_not_bytes() {
        assert_eq!(text("ééééééééééé").to_string(), "\"éééééééééé\"...");
    }

    #[test]
    fn renders_end_of_input() {
        let t = Token::new(TokenKind::EndOfInput, String::new(), Position::START);
        assert_eq!(t.to_string(), "EOF");
    }

    #[test]
    fn renders_error() {
        let err = LexError {
            kind: LexErrorKind::InvalidVarName,
            position: Position { line: 3 },
        };
        let t = Token::new(TokenKind::Error(err), String::new(), Position::START);
        assert_eq!(t.to_string(), "Error: invalid var name");
    }

    #[test]
    fn mode_from_rune() {
        assert_eq!(Mode::from_rune('-'), Some(Mode::Default));
        assert_eq!(Mode::from_rune('+'), Some(Mode::Alternate));
        assert_eq!(Mode::from_rune('='), Some(Mode::Assign));
        assert_eq!(Mode::from_rune('?'), None);
        assert_eq!(Mode::Assign.to_string(), ":=");
    }
}
