//! This module defines the parse tree produced by the grammar layer. The main enum,
//! [`Form`], has one variant per syntactic category of the source language: primitive
//! tokens (words, numbers, strings, keywords, operators, accessors, hints) and the three
//! structural composites (lists, vectors, maps). Helper functions such as [`word`] and
//! [`list`] keep tree construction short in tests. `Display` prints a form back as source
//! syntax, which is what inline diagnostics embed.

use std::fmt;

/// One parsed syntactic unit.
///
/// To build a tree by hand, use the helper functions:
/// - `word("x")`, `num("5")`, `kw("name")` for leaves
/// - `list(vec![word("f"), num("1")])` for composites
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Form {
    /// Identifiers, rendered through name mangling
    Word(String),
    /// Decimal literals, kept as written
    Number(String),
    /// String literals, kept as written between the quotes
    Str(String),
    /// `:name`
    Keyword(String),
    /// One of `+ - * / is as and == != < > <= >=` in operator position
    InfixOperator(String),
    /// `.-field`
    Accessor(String),
    /// `.method`
    Method(String),
    /// `^Type name`
    Hint { type_name: String, name: String },
    /// The `yield` keyword
    Yield,
    /// `%`, the implicit parameter of a sugar lambda
    PercentArg,
    /// `#(...)`
    SugarLambda(Box<Form>),
    /// `(...)`
    List(Vec<Form>),
    /// `[...]`
    Vector(Vec<Form>),
    /// `{...}`, alternating keys and values
    Map(Vec<Form>),
}

impl Form {
    /// Check if any form in this tree, this one included, satisfies the predicate
    pub fn any(&self, pred: &impl Fn(&Form) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Form::SugarLambda(body) => body.any(pred),
            Form::List(items) | Form::Vector(items) | Form::Map(items) => {
                items.iter().any(|item| item.any(pred))
            }
            _ => false,
        }
    }

    /// True if a `yield` appears anywhere in this tree, however deeply nested
    pub fn contains_yield(&self) -> bool {
        self.any(&|form| matches!(form, Form::Yield))
    }

    /// True if the implicit `%` parameter appears anywhere in this tree
    pub fn contains_percent(&self) -> bool {
        self.any(&|form| matches!(form, Form::PercentArg))
    }

    /// The word text, if this form is a plain word
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Form::Word(name) => Some(name),
            _ => None,
        }
    }
}

/// True if a `yield` appears anywhere in a sequence of forms
pub fn body_yields(body: &[Form]) -> bool {
    body.iter().any(Form::contains_yield)
}

/// Helper function for creating words
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn word<S: AsRef<str>>(name: S) -> Form {
    Form::Word(name.as_ref().to_owned())
}

/// Helper function for creating number literals
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn num<S: AsRef<str>>(literal: S) -> Form {
    Form::Number(literal.as_ref().to_owned())
}

/// Helper function for creating keywords
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn kw<S: AsRef<str>>(name: S) -> Form {
    Form::Keyword(name.as_ref().to_owned())
}

/// Helper function for creating lists
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn list(items: Vec<Form>) -> Form {
    Form::List(items)
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Form], close: &str) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Word(name) => write!(f, "{name}"),
            Form::Number(n) => write!(f, "{n}"),
            Form::Str(s) => write!(f, "\"{s}\""),
            Form::Keyword(name) => write!(f, ":{name}"),
            Form::InfixOperator(op) => write!(f, "{op}"),
            Form::Accessor(field) => write!(f, ".-{field}"),
            Form::Method(name) => write!(f, ".{name}"),
            Form::Hint { type_name, name } => write!(f, "^{type_name} {name}"),
            Form::Yield => write!(f, "yield"),
            Form::PercentArg => write!(f, "%"),
            Form::SugarLambda(body) => write!(f, "#{body}"),
            Form::List(items) => write_seq(f, "(", items, ")"),
            Form::Vector(items) => write_seq(f, "[", items, "]"),
            Form::Map(items) => write_seq(f, "{", items, "}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_as_source() {
        let test_cases = vec![
            (word("reset!"), "reset!"),
            (num("-1.5"), "-1.5"),
            (Form::Str("hi there".into()), "\"hi there\""),
            (kw("name"), ":name"),
            (
                Form::Hint {
                    type_name: "int".into(),
                    name: "x".into(),
                },
                "^int x",
            ),
            (list(vec![]), "()"),
            (
                list(vec![
                    Form::InfixOperator("+".into()),
                    word("a"),
                    Form::Vector(vec![num("1"), num("2")]),
                ]),
                "(+ a [1 2])",
            ),
            (
                Form::SugarLambda(Box::new(list(vec![
                    Form::Method("run".into()),
                    Form::PercentArg,
                ]))),
                "#(.run %)",
            ),
            (Form::Map(vec![kw("a"), num("1")]), "{:a 1}"),
            (Form::Accessor("x".into()), ".-x"),
        ];

        for (i, (form, expected)) in test_cases.iter().enumerate() {
            assert_eq!(form.to_string(), *expected, "Display test #{}", i + 1);
        }
    }

    #[test]
    fn test_yield_scan_reaches_nested_forms() {
        let flat = list(vec![Form::Yield, num("1")]);
        let nested = list(vec![
            word("do-if"),
            word("ready"),
            Form::Vector(vec![Form::Map(vec![kw("k"), list(vec![Form::Yield])])]),
        ]);
        let in_lambda = Form::SugarLambda(Box::new(list(vec![word("f"), Form::Yield])));
        let none = list(vec![word("yield-not"), Form::Str("yield".into())]);

        assert!(flat.contains_yield());
        assert!(nested.contains_yield());
        assert!(in_lambda.contains_yield());
        assert!(!none.contains_yield());
        assert!(body_yields(&[num("1"), nested]));
        assert!(!body_yields(&[]));
    }

    #[test]
    fn test_percent_scan() {
        let uses = list(vec![word("f"), list(vec![word("g"), Form::PercentArg])]);
        let no = list(vec![word("f"), Form::Str("%".into())]);
        assert!(uses.contains_percent());
        assert!(!no.contains_percent());
    }
}
