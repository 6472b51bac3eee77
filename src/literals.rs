//! Rendering of primitive tokens: identifiers, numbers, strings, keywords and type hints.
//!
//! Everything here is a pure function of the token text.

use crate::Diagnostic;

/// Parameter name of sugar lambdas and accessor functions
pub const IMPLICIT_PARAM: &str = "it";

/// Target null literal
pub const NULL: &str = "null";

/// Character replacements applied after the predicate rewrite, in this order
const REPLACEMENTS: [(&str, &str); 5] = [
    ("-", "_"),
    ("<", "_LT"),
    (">", "_GT"),
    ("?", "_QMARK"),
    ("!", "_BANG"),
];

/// Mangle a source identifier into a target identifier.
///
/// A trailing `?` turns the name into an `is` predicate (`empty?` → `isEmpty`), then
/// the characters the target cannot use in names are replaced (`reset!` → `reset_BANG`).
pub fn mangle(name: &str) -> String {
    let mut mangled = match name.strip_suffix('?') {
        Some(stem) => format!("is{}", capitalize_first(stem)),
        None => name.to_owned(),
    };
    for (from, to) in REPLACEMENTS {
        mangled = mangled.replace(from, to);
    }
    mangled
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a word reference (`nil` becomes the null literal)
pub fn render_word(name: &str) -> String {
    if name == "nil" {
        NULL.to_owned()
    } else {
        mangle(name)
    }
}

/// Render a string literal; the text between the quotes passes through unchanged
pub fn render_string(text: &str) -> String {
    format!("\"{text}\"")
}

/// Render a keyword used as a value
pub fn render_keyword(name: &str) -> String {
    format!("\"{name}\"")
}

/// Render a `^Type name` pair as `name : Type`.
///
/// The bound name must itself be a plain identifier and the type must be non-empty;
/// anything else renders a [`Diagnostic::MalformedHint`].
pub fn render_hint(type_name: &str, name: &str) -> Result<String, Diagnostic> {
    if is_identifier(name) && !type_name.is_empty() && !type_name.contains(char::is_whitespace) {
        Ok(format!("{} : {type_name}", mangle(name)))
    } else {
        Err(Diagnostic::MalformedHint(format!("^{type_name} {name}")))
    }
}

/// Check if a string is a valid source identifier
/// Valid: starts with a letter, `!`, `?` or `_`, continues with letters, digits or `-<>?!_`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_word_start(first) => chars.all(is_word_char),
        _ => false,
    }
}

pub(crate) fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '!' | '?' | '_')
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '<' | '>' | '?' | '!' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mangle() {
        let test_cases = vec![
            ("x", "x"),
            ("empty?", "isEmpty"),
            ("reset!", "reset_BANG"),
            ("a-b", "a_b"),
            ("a-b?", "isA_b"),
            ("list->vec", "list__GTvec"),
            ("<init>", "_LTinit_GT"),
            ("?", "is"),
            ("what?now", "what_QMARKnow"),
            ("valid?!", "valid_QMARK_BANG"),
            ("swap!?", "isSwap_BANG"),
            ("ünicode?", "isÜnicode"),
            ("already_snake", "already_snake"),
        ];

        for (i, (input, expected)) in test_cases.iter().enumerate() {
            assert_eq!(mangle(input), *expected, "Mangle test #{}: {input}", i + 1);
        }
    }

    #[test]
    fn test_mangle_is_position_independent() {
        assert_eq!(mangle("is-ready?"), mangle("is-ready?"));
        assert_eq!(render_word("empty?"), "isEmpty");
        assert_eq!(render_word("nil"), "null");
        assert_eq!(render_word("nil?"), "isNil");
    }

    #[test]
    fn test_literals() {
        assert_eq!(render_string("a b"), "\"a b\"");
        assert_eq!(render_string(""), "\"\"");
        assert_eq!(render_keyword("name"), "\"name\"");
    }

    #[test]
    fn test_hints() {
        assert_eq!(render_hint("int", "count").as_deref(), Ok("count : int"));
        assert_eq!(
            render_hint("List<int>", "all-items").as_deref(),
            Ok("all_items : List<int>")
        );
        assert_eq!(
            render_hint("int", "9lives"),
            Err(Diagnostic::MalformedHint("^int 9lives".into()))
        );
        assert!(render_hint("", "x").is_err());
        assert!(render_hint("int", "").is_err());
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("reset!"));
        assert!(is_identifier("?x"));
        assert!(is_identifier("a<b>"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("-a"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("a b"));
    }
}
