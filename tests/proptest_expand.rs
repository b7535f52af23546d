//! Property-based tests with proptest.

mod common;

use common::{expand_ok, tokens};
use proptest::prelude::*;
use shexp::TokenKind;

/// Variable name.
fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,12}".prop_map(|s| s)
}

/// Text without `$`, including braces, backslashes and both
/// newline forms.
fn dollar_free_text() -> impl Strategy<Value = String> {
    "([^$]|\r\n){0,64}".prop_map(|s| s)
}

/// Text that cannot continue an identifier or form an escape.
fn separator_text() -> impl Strategy<Value = String> {
    "[ .,:/\\-]{0,8}".prop_map(|s| s)
}

proptest! {
    #[test]
    fn text_without_dollar_is_unchanged(text in dollar_free_text()) {
        prop_assert_eq!(expand_ok(&text, &[]), text);
    }

    #[test]
    fn escaped_variable_stays_literal(name in identifier(), value in "[a-z]{1,8}") {
        let input = format!("\\${name}");
        prop_assert_eq!(expand_ok(&input, &[(name.as_str(), value.as_str())]), format!("${name}"));
    }

    #[test]
    fn simple_and_bracketed_agree(
        name in identifier(),
        value in "[a-z0-9 ]{0,8}",
        sep in separator_text(),
    ) {
        let vars = [(name.as_str(), value.as_str())];
        let simple = expand_ok(&format!("${name}{sep}"), &vars);
        let bracketed = expand_ok(&format!("${{{name}}}{sep}"), &vars);
        prop_assert_eq!(&simple, &bracketed);
        prop_assert_eq!(simple, format!("{value}{sep}"));
    }

    #[test]
    fn default_applies_only_when_empty(
        name in identifier(),
        value in "[a-z]{0,6}",
        default in "[a-z ]{0,6}",
    ) {
        let out = expand_ok(&format!("${{{name}:-{default}}}"), &[(name.as_str(), value.as_str())]);
        let expected = if value.is_empty() { default } else { value };
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn end_of_input_line_counts_newlines(text in dollar_free_text()) {
        let toks = tokens(&text);
        let last = toks.last().expect("terminal token");
        prop_assert_eq!(&last.kind, &TokenKind::EndOfInput);
        prop_assert_eq!(last.position.line, 1 + text.matches('\n').count());
    }
}
