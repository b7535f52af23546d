//! Process-wide expander bound to the environment.
//!
//! All checks live in one test since they share global state.

#[test]
fn process_wide_expander() {
    let path = std::env::var("PATH").unwrap_or_default();
    assert_eq!(shexp::get("PATH"), path);
    assert_eq!(shexp::expand_str("$PATH").as_deref(), Ok(path.as_str()));

    assert_eq!(
        shexp::expand_str("${SHEXP_GLOBAL_TEST:=first}").as_deref(),
        Ok("first")
    );
    assert_eq!(shexp::get("SHEXP_GLOBAL_TEST"), "first");
    assert!(std::env::var("SHEXP_GLOBAL_TEST").is_err());

    assert_eq!(shexp::set("SHEXP_GLOBAL_TEST", "second"), "second");
    assert_eq!(
        shexp::expand_bytes(b"<$SHEXP_GLOBAL_TEST>").as_deref(),
        Ok("<second>")
    );
    assert_eq!(
        shexp::expand(&b"${SHEXP_GLOBAL_TEST:+on}"[..]).as_deref(),
        Ok("on")
    );
    assert_eq!(
        shexp::expand_fmt("%s=${%s}", &[&"v", &"SHEXP_GLOBAL_TEST"]).as_deref(),
        Ok("v=second")
    );

    shexp::reset();
    assert_eq!(shexp::get("SHEXP_GLOBAL_TEST"), "");
    assert_eq!(shexp::expand_str("\\$PATH").as_deref(), Ok("$PATH"));
}
