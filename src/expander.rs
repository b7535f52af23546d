use std::fmt;
use std::io::Read;

use crate::evaluator::{ExpandError, evaluate};
use crate::formatter::sprintf;
use crate::lexer::tokenize;
use crate::resolver::{EnvResolver, Resolver};

/// Expands shell-style variables using a [`Resolver`].
///
/// Values assigned through `${name:=word}` or [`Expander::set`] stay in
/// the resolver and are seen by later expansions on the same expander.
#[derive(Debug, Clone, Default)]
pub struct Expander<R = EnvResolver> {
    resolver: R,
}

impl<R: Resolver> Expander<R> {
    #[must_use]
    pub const fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Resolve a variable the way an expansion would.
    pub fn get(&self, key: &str) -> String {
        self.resolver.get(key)
    }

    /// Set a variable for future expansions.
    pub fn set(&mut self, key: &str, value: &str) -> String {
        self.resolver.set(key, value)
    }

    /// Reset the resolver, if it supports it.
    pub fn reset(&mut self) {
        self.resolver.reset();
    }

    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    pub const fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    #[must_use]
    pub fn into_resolver(self) -> R {
        self.resolver
    }

    /// Expand variables in a string.
    pub fn expand_str(&mut self, s: &str) -> Result<String, ExpandError> {
        self.expand_bytes(s.as_bytes())
    }

    /// Substitute `%` verbs with `args`, then expand the result.
    ///
    /// With no arguments the template is expanded as is, so `%` signs
    /// survive untouched.
    pub fn expand_fmt(
        &mut self,
        template: &str,
        args: &[&dyn fmt::Display],
    ) -> Result<String, ExpandError> {
        if args.is_empty() {
            return self.expand_str(template);
        }
        self.expand_str(&sprintf(template, args))
    }

    /// Expand variables in UTF-8 text given as bytes.
    pub fn expand_bytes(&mut self, b: &[u8]) -> Result<String, ExpandError> {
        if b.is_empty() {
            return Ok(String::new());
        }
        self.expand(b)
    }

    /// Expand variables in text read from `input`.
    pub fn expand<In: Read>(&mut self, input: In) -> Result<String, ExpandError> {
        evaluate(tokenize(input), &mut self.resolver)
    }
}

impl<R: Resolver> From<R> for Expander<R> {
    fn from(resolver: R) -> Self {
        Self::new(resolver)
    }
}
