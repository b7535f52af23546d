//! Shell-like variable expansion.
//!
//! Literal text passes through unchanged while `$name` and `${name}`
//! are replaced with values from a [`Resolver`]. Bracketed expansions
//! accept a mode:
//!
//! | Form             | Result                                                   |
//! |------------------|----------------------------------------------------------|
//! | `${name:-word}`  | `word` if `name` is unset or empty, else its value      |
//! | `${name:+word}`  | `word` if `name` is set and not empty, else nothing     |
//! | `${name:=word}`  | like `:-`, and also assigns `word` to `name`             |
//!
//! `word` may itself contain expansions. `\$` outside `${...}` is a
//! literal dollar sign.
//!
//! # Quick start
//!
//! ```
//! use shexp::{Expander, MapResolver};
//!
//! let mut exp = Expander::new(MapResolver::new().with("NAME", "world"));
//! assert_eq!(exp.expand_str("hello ${NAME:-you}").unwrap(), "hello world");
//! assert_eq!(exp.expand_str("${COUNT:=0}").unwrap(), "0");
//! assert_eq!(exp.get("COUNT"), "0");
//! ```
//!
//! The free functions use a process-wide expander backed by the
//! environment:
//!
//! ```
//! let out = shexp::expand_str("\\$HOME stays literal").unwrap();
//! assert_eq!(out, "$HOME stays literal");
//! ```

#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod evaluator;
pub mod expander;
pub mod feeder;
pub mod formatter;
pub mod lexer;
pub mod resolver;
pub mod runes;
pub mod token;

use std::fmt;
use std::io::Read;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

pub use evaluator::{ExpandError, ExpandErrorKind, MAX_NESTING, evaluate};
pub use expander::Expander;
pub use formatter::sprintf;
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize, tokenize_str};
pub use resolver::{EnvResolver, MapResolver, Resolver};
pub use token::{Mode, Position, Token, TokenKind};

/// Unified error type covering expansion and I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An expansion error.
    #[error("{0}")]
    Expand(#[from] ExpandError),
    /// An I/O error outside the token stream.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Process-wide expander bound to the environment.
///
/// Overrides set through it are shared by every caller in the process.
/// Each call holds the lock for its whole duration.
static ENV_EXPANDER: Lazy<Mutex<Expander<EnvResolver>>> =
    Lazy::new(|| Mutex::new(Expander::default()));

fn env_expander() -> MutexGuard<'static, Expander<EnvResolver>> {
    ENV_EXPANDER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Expand a string using the process-wide expander.
pub fn expand_str(s: &str) -> Result<String, ExpandError> {
    env_expander().expand_str(s)
}

/// Substitute `%` verbs, then expand using the process-wide expander.
pub fn expand_fmt(template: &str, args: &[&dyn fmt::Display]) -> Result<String, ExpandError> {
    env_expander().expand_fmt(template, args)
}

/// Expand bytes using the process-wide expander.
pub fn expand_bytes(b: &[u8]) -> Result<String, ExpandError> {
    env_expander().expand_bytes(b)
}

/// Expand text from a reader using the process-wide expander.
pub fn expand<R: Read>(input: R) -> Result<String, ExpandError> {
    env_expander().expand(input)
}

/// Resolve a variable through the process-wide expander.
#[must_use]
pub fn get(key: &str) -> String {
    env_expander().get(key)
}

/// Set an override on the process-wide expander.
pub fn set(key: &str, value: &str) -> String {
    env_expander().set(key, value)
}

/// Drop every override on the process-wide expander.
pub fn reset() {
    env_expander().reset();
}
