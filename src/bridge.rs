//! Statement/expression bridging.
//!
//! Assembles rendered fragments into target-language blocks: statement bodies with an
//! optional trailing `return`, function definitions, and the immediately-invoked wrappers
//! that let statement-only constructs stand where an expression is expected.

use crate::literals::NULL;

/// Declared return type of functions whose body yields
pub const COROUTINE_TYPE: &str = "IEnumerator";

/// Declared return type of functions in forced statement mode
pub const VOID_TYPE: &str = "void";

/// How the last form of a body is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// The last form's value is returned
    Return,
    /// Every form is a plain statement
    Statement,
}

/// Wrap text in a block comment, breaking up any `*/` inside it
pub fn comment(text: &str) -> String {
    format!("/* {} */", text.replace("*/", "* /"))
}

/// Prefix every non-empty line of `text` with `unit`
pub fn indent(text: &str, unit: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{unit}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn rendered body forms into statements, adding `return` to the last in return mode
pub fn statements(mut rendered: Vec<String>, mode: BodyMode) -> Vec<String> {
    if mode == BodyMode::Return
        && let Some(last) = rendered.last_mut()
    {
        *last = format!("return {last}");
    }
    rendered
}

/// `{`, each statement terminated and indented one level, `}`
pub fn block(statements: &[String], unit: &str) -> String {
    let mut out = String::from("{\n");
    for statement in statements {
        out.push_str(&indent(&format!("{statement};"), unit));
        out.push('\n');
    }
    out.push('}');
    out
}

/// `signature : return_type { ... }`, with the annotation omitted when absent
pub fn function(
    signature: &str,
    return_type: Option<&str>,
    statements: &[String],
    unit: &str,
) -> String {
    match return_type {
        Some(ty) => format!("{signature} : {ty} {}", block(statements, unit)),
        None => format!("{signature} {}", block(statements, unit)),
    }
}

/// An immediately-invoked zero-argument function around a statement body
pub fn iife(statements: &[String], unit: &str) -> String {
    format!("({})()", function("function()", None, statements, unit))
}

/// An immediately-invoked wrapper for side-effect statements, evaluating to null
pub fn void_iife(mut statements: Vec<String>, unit: &str) -> String {
    statements.push(format!("return {NULL}"));
    iife(&statements, unit)
}

/// An anonymous function of at most one parameter around a statement body
pub fn lambda(param: Option<&str>, statements: &[String], unit: &str) -> String {
    function(
        &format!("function({})", param.unwrap_or_default()),
        None,
        statements,
        unit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: &str = "    ";

    #[test]
    fn test_indent_accumulates() {
        let inner = block(&["a".into(), "b".into()], UNIT);
        assert_eq!(inner, "{\n    a;\n    b;\n}");

        let outer = block(&[format!("if (c) {inner}")], UNIT);
        assert_eq!(outer, "{\n    if (c) {\n        a;\n        b;\n    };\n}");
    }

    #[test]
    fn test_statement_modes() {
        let body = vec!["x".to_owned(), "y".to_owned()];
        assert_eq!(statements(body.clone(), BodyMode::Return), vec!["x", "return y"]);
        assert_eq!(statements(body, BodyMode::Statement), vec!["x", "y"]);
        assert!(statements(vec![], BodyMode::Return).is_empty());
    }

    #[test]
    fn test_wrappers() {
        assert_eq!(
            iife(&["return 1".into()], UNIT),
            "(function() {\n    return 1;\n})()"
        );
        assert_eq!(
            void_iife(vec!["f()".into()], UNIT),
            "(function() {\n    f();\n    return null;\n})()"
        );
        assert_eq!(
            function("function f(a)", Some("int"), &[], UNIT),
            "function f(a) : int {\n}"
        );
        assert_eq!(
            lambda(Some("it"), &["return it.x".into()], UNIT),
            "function(it) {\n    return it.x;\n}"
        );
        assert_eq!(lambda(None, &[], "\t"), "function() {\n}");
    }

    #[test]
    fn test_comment_stays_closed() {
        assert_eq!(comment("a */ b"), "/* a * / b */");
        assert_eq!(comment("plain"), "/* plain */");
    }
}
