//! `%`-verb substitution applied to a template before it is expanded.
//!
//! Verbs: `%s`, `%v` and `%d` insert an argument as displayed, `%q`
//! inserts it quoted, and `%%` is a literal percent sign. Problems are
//! reported inline rather than as errors:
//!
//! | Problem               | Rendering              |
//! |-----------------------|------------------------|
//! | missing argument      | `%!s(MISSING)`         |
//! | unknown verb          | `%!x(<argument>)`      |
//! | `%` at end of input   | `%!(NOVERB)`           |
//! | unused arguments      | `%!(EXTRA a, b)`       |

use std::fmt::{self, Write};

/// Substitute `args` into `template`.
#[must_use]
pub fn sprintf(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next_arg = 0;
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }

        let Some(arg) = args.get(next_arg) else {
            let _ = write!(out, "%!{verb}(MISSING)");
            continue;
        };
        next_arg += 1;
        format_arg(&mut out, verb, *arg);
    }

    if let Some(extra) = args.get(next_arg..).filter(|rest| !rest.is_empty()) {
        out.push_str("%!(EXTRA ");
        for (i, arg) in extra.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{arg}");
        }
        out.push(')');
    }

    out
}

fn format_arg(out: &mut String, verb: char, arg: &dyn fmt::Display) {
    let _ = match verb {
        's' | 'v' | 'd' => write!(out, "{arg}"),
        'q' => write!(out, "{:?}", arg.to_string()),
        _ => write!(out, "%!{verb}({arg})"),
    };
}
