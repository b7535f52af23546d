#![allow(dead_code)]

use shexp::{ExpandError, Expander, MapResolver, Token, TokenKind, tokenize_str};

/// Expand `input` against the given variables, with no environment.
pub fn expand_with(input: &str, vars: &[(&str, &str)]) -> Result<String, ExpandError> {
    let resolver: MapResolver = vars.iter().copied().collect();
    Expander::new(resolver).expand_str(input)
}

/// Expand `input` and fail the test on error.
pub fn expand_ok(input: &str, vars: &[(&str, &str)]) -> String {
    expand_with(input, vars).unwrap_or_else(|e| {
        panic!("expansion of {input:?} failed: {e}\n--- partial output ---\n{}", e.output)
    })
}

pub fn tokens(input: &str) -> Vec<Token> {
    tokenize_str(input).collect()
}

pub fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize_str(input).map(|t| t.kind).collect()
}
