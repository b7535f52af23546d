//! Walks a token stream and produces the expanded text.

use std::fmt;

use log::{debug, trace};

use crate::lexer::LexError;
use crate::resolver::Resolver;
use crate::token::{Mode, Position, Token, TokenKind};

/// Deepest allowed `${...}` nesting inside default text.
pub const MAX_NESTING: usize = 128;

/// Classifies an expansion error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandErrorKind {
    /// The lexer stopped on a syntax or read error.
    Lex(LexError),
    /// Input ended while a `${` was still open.
    Unterminated { position: Position },
    /// Default text nested deeper than [`MAX_NESTING`].
    TooDeep { position: Position },
    /// A token arrived where the grammar does not allow it.
    UnexpectedToken { token: String, position: Position },
}

impl fmt::Display for ExpandErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{err}"),
            Self::Unterminated { position } => {
                write!(f, "unterminated expansion opened at {position}")
            }
            Self::TooDeep { position } => {
                write!(
                    f,
                    "expansion nested deeper than {MAX_NESTING} levels at {position}"
                )
            }
            Self::UnexpectedToken { token, position } => {
                write!(f, "unexpected token {token} at {position}")
            }
        }
    }
}

/// Error produced during expansion.
///
/// `output` holds whatever had been expanded before the failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct ExpandError {
    pub kind: ExpandErrorKind,
    pub output: String,
}

/// Expand a token stream, reading and assigning variables through
/// `resolver`.
///
/// Stops at the first error; nothing is retried or rolled back.
///
/// # Errors
///
/// Returns `ExpandError` when the stream carries a lexer error or ends
/// inside a `${...}` block.
pub fn evaluate<I, R>(tokens: I, resolver: &mut R) -> Result<String, ExpandError>
where
    I: IntoIterator<Item = Token>,
    R: Resolver + ?Sized,
{
    let mut evaluator = Evaluator {
        tokens: tokens.into_iter(),
        resolver,
        depth: 0,
    };

    let mut output = String::new();
    match evaluator.text(&mut output, None, true) {
        Ok(()) => Ok(output),
        Err(kind) => {
            debug!("expansion failed: {kind}");
            Err(ExpandError { kind, output })
        }
    }
}

/// One `${...}` block, collected while its tokens arrive.
#[derive(Debug)]
struct ExpansionRequest {
    identifier: String,
    mode: Option<Mode>,
    default: String,
}

impl ExpansionRequest {
    /// Whether the default text ends up in the output for a variable
    /// whose current value is `current`.
    fn uses_default(&self, current: &str) -> bool {
        match self.mode {
            None => false,
            Some(Mode::Default | Mode::Assign) => current.is_empty(),
            Some(Mode::Alternate) => !current.is_empty(),
        }
    }

    fn resolve<R: Resolver + ?Sized>(self, current: String, resolver: &mut R) -> String {
        if !self.uses_default(&current) {
            return match self.mode {
                Some(Mode::Alternate) => String::new(),
                _ => current,
            };
        }

        if self.mode == Some(Mode::Assign) {
            debug!("assigning {}={:?}", self.identifier, self.default);
            return resolver.set(&self.identifier, &self.default);
        }
        self.default
    }
}

struct Evaluator<'r, I, R: ?Sized> {
    tokens: I,
    resolver: &'r mut R,
    depth: usize,
}

impl<I, R> Evaluator<'_, I, R>
where
    I: Iterator<Item = Token>,
    R: Resolver + ?Sized,
{
    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.next();
        if let Some(token) = &token {
            trace!("{}: {token}", token.position);
        }
        token
    }

    /// Evaluates tokens into `out` until end of input or, when `open`
    /// is set, the `}` closing that expansion. Output and assignments
    /// only happen while `active`.
    fn text(
        &mut self,
        out: &mut String,
        open: Option<Position>,
        active: bool,
    ) -> Result<(), ExpandErrorKind> {
        while let Some(token) = self.next_token() {
            match token.kind {
                TokenKind::Text => {
                    if active {
                        out.push_str(&token.text);
                    }
                }
                TokenKind::SimpleExpansion { name } => {
                    if active {
                        out.push_str(&self.resolver.get(&name));
                    }
                }
                TokenKind::Start => self.expansion(out, token.position, active)?,
                TokenKind::End if open.is_some() => return Ok(()),
                TokenKind::End => {
                    // no `${` to close, keep it literal
                    if active {
                        out.push_str(&token.text);
                    }
                }
                TokenKind::Error(err) => return Err(ExpandErrorKind::Lex(err)),
                TokenKind::EndOfInput => break,
                TokenKind::Identifier | TokenKind::Mode(_) => {
                    return Err(unexpected(token, open));
                }
            }
        }

        match open {
            Some(position) => Err(ExpandErrorKind::Unterminated { position }),
            None => Ok(()),
        }
    }

    /// Default text is only applied, nested `:=` included, when its
    /// branch is taken; the variable is read once, at the identifier.
    // '${' ident [mode text] '}'
    //  ^^
    fn expansion(
        &mut self,
        out: &mut String,
        position: Position,
        active: bool,
    ) -> Result<(), ExpandErrorKind> {
        let identifier = match self.next_token() {
            Some(Token {
                kind: TokenKind::Identifier,
                text,
                ..
            }) => text,
            Some(token) => return Err(unexpected(token, Some(position))),
            None => return Err(ExpandErrorKind::Unterminated { position }),
        };

        let mut request = ExpansionRequest {
            identifier,
            mode: None,
            default: String::new(),
        };
        let current = if active {
            self.resolver.get(&request.identifier)
        } else {
            String::new()
        };

        match self.next_token() {
            Some(Token {
                kind: TokenKind::End,
                ..
            }) => {}
            Some(Token {
                kind: TokenKind::Mode(mode),
                ..
            }) => {
                request.mode = Some(mode);
                if self.depth >= MAX_NESTING {
                    return Err(ExpandErrorKind::TooDeep { position });
                }

                let wanted = active && request.uses_default(&current);
                let mut default = String::new();
                self.depth += 1;
                let result = self.text(&mut default, Some(position), wanted);
                self.depth -= 1;
                result?;
                request.default = default;
            }
            Some(token) => return Err(unexpected(token, Some(position))),
            None => return Err(ExpandErrorKind::Unterminated { position }),
        }

        if active {
            out.push_str(&request.resolve(current, &mut *self.resolver));
        }
        Ok(())
    }
}

/// Error for a token that cannot appear here. Terminal tokens keep
/// their own meaning.
fn unexpected(token: Token, open: Option<Position>) -> ExpandErrorKind {
    match (token.kind, open) {
        (TokenKind::Error(err), _) => ExpandErrorKind::Lex(err),
        (TokenKind::EndOfInput, Some(position)) => ExpandErrorKind::Unterminated { position },
        (_, _) => ExpandErrorKind::UnexpectedToken {
            token: token.text,
            position: token.position,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{LexErrorKind, tokenize_str};
    use crate::resolver::MapResolver;

    fn expand(input: &str, resolver: &mut MapResolver) -> Result<String, ExpandError> {
        evaluate(tokenize_str(input), resolver)
    }

    #[test]
    fn text_passes_through() {
        let mut r = MapResolver::new();
        assert_eq!(expand("plain text", &mut r).as_deref(), Ok("plain text"));
    }

    #[test]
    fn modes_against_values() {
        let cases = [
            ("${A}", None, ""),
            ("${A}", Some("x"), "x"),
            ("${A:-def}", None, "def"),
            ("${A:-def}", Some(""), "def"),
            ("${A:-def}", Some("x"), "x"),
            ("${A:+alt}", None, ""),
            ("${A:+alt}", Some(""), ""),
            ("${A:+alt}", Some("x"), "alt"),
            ("${A:=def}", Some("x"), "x"),
        ];
        for (input, value, expected) in cases {
            let mut r = MapResolver::new();
            if let Some(v) = value {
                r = r.with("A", v);
            }
            assert_eq!(
                expand(input, &mut r).as_deref(),
                Ok(expected),
                "{input} with A={value:?}"
            );
        }
    }

    #[test]
    fn assign_stores_default() {
        let mut r = MapResolver::new();
        assert_eq!(expand("${COUNT:=0}", &mut r).as_deref(), Ok("0"));
        assert_eq!(r.get("COUNT"), "0");
    }

    #[test]
    fn untaken_branch_does_not_assign() {
        let mut r = MapResolver::new().with("A", "set");
        assert_eq!(expand("${A:-${B:=x}}", &mut r).as_deref(), Ok("set"));
        assert!(!r.contains("B"));
    }

    #[test]
    fn alternate_for_unset_skips_nested_assign() {
        let mut r = MapResolver::new();
        assert_eq!(expand("${A:+${A:=z}}", &mut r).as_deref(), Ok(""));
        assert!(!r.contains("A"));
    }

    #[test]
    fn taken_branch_assigns_nested() {
        let mut r = MapResolver::new();
        assert_eq!(expand("${A:-${B:=x}}-$B", &mut r).as_deref(), Ok("x-x"));
        assert_eq!(r.get("B"), "x");
        assert!(!r.contains("A"));
    }

    #[test]
    fn stray_close_brace_is_literal() {
        let mut r = MapResolver::new();
        assert_eq!(expand("a } b", &mut r).as_deref(), Ok("a } b"));
    }

    #[test]
    fn unterminated_keeps_preceding_output() {
        let mut r = MapResolver::new();
        let err = expand("before ${A:-never", &mut r).unwrap_err();
        assert_eq!(err.output, "before ");
        assert_eq!(
            err.kind,
            ExpandErrorKind::Unterminated {
                position: Position::START
            }
        );
    }

    #[test]
    fn lex_error_keeps_preceding_output() {
        let mut r = MapResolver::new().with("X", "x");
        let err = expand("$X then ${1abc}", &mut r).unwrap_err();
        assert_eq!(err.output, "x then ");
        assert!(matches!(
            err.kind,
            ExpandErrorKind::Lex(LexError {
                kind: LexErrorKind::InvalidVarName,
                ..
            })
        ));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let depth = MAX_NESTING + 1;
        let input = format!("{}x{}", "${A:-".repeat(depth), "}".repeat(depth));
        let mut r = MapResolver::new();
        let err = expand(&input, &mut r).unwrap_err();
        assert!(matches!(err.kind, ExpandErrorKind::TooDeep { .. }));
    }

    #[test]
    fn nesting_up_to_limit_is_fine() {
        let input = format!(
            "{}x{}",
            "${A:-".repeat(MAX_NESTING),
            "}".repeat(MAX_NESTING)
        );
        let mut r = MapResolver::new();
        assert_eq!(expand(&input, &mut r).as_deref(), Ok("x"));
    }

    #[test]
    fn stray_identifier_token_is_rejected() {
        let tokens = vec![
            Token::new(TokenKind::Identifier, "A".to_string(), Position::START),
            Token::new(TokenKind::EndOfInput, String::new(), Position::START),
        ];
        let mut r = MapResolver::new();
        let err = evaluate(tokens, &mut r).unwrap_err();
        assert!(matches!(err.kind, ExpandErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn stream_without_terminal_token_completes() {
        let tokens = vec![Token::new(
            TokenKind::Text,
            "hi".to_string(),
            Position::START,
        )];
        let mut r = MapResolver::new();
        assert_eq!(evaluate(tokens, &mut r).as_deref(), Ok("hi"));
    }
}
