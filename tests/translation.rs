#![expect(clippy::unwrap_used)] // test code OK

use std::fs;
use std::path::Path;

use unilisp::{Diagnostic, Error, ParseErrorKind, RenderConfig, Translator};

#[test]
fn test_fixture_files() {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut fixture_count = 0;

    let mut entries: Vec<_> = fs::read_dir(&fixtures_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("ul"))
        .collect();
    entries.sort();

    for path in entries {
        let source = fs::read_to_string(&path).unwrap();
        let expected = fs::read_to_string(path.with_extension("js")).unwrap();

        let mut translator = Translator::new();
        let actual = translator.translate(&source);
        assert_eq!(
            actual,
            expected.trim_end(),
            "fixture {} translated differently",
            path.display()
        );
        assert!(
            translator.diagnostics().is_empty(),
            "fixture {} produced diagnostics: {:?}",
            path.display(),
            translator.diagnostics()
        );
        fixture_count += 1;
    }

    assert!(fixture_count > 0, "No .ul fixtures found in tests/fixtures");
}

#[test]
fn test_empty_program() {
    let mut translator = Translator::new();
    assert_eq!(translator.translate(""), "");
    assert_eq!(translator.translate(" \n\t ; nothing here\n"), "");
}

#[test]
fn test_scenarios() {
    let test_cases = vec![
        ("(def x 5)", "var x = 5;"),
        (
            "(defn add? [a b] (+ a b))",
            "static function isAdd(a, b) {\n    return (a + b);\n};",
        ),
        ("(+ 1 (* 2 3))", "(1 + (2 * 3));"),
        ("(empty? xs)", "isEmpty(xs);"),
        ("reset!", "reset_BANG;"),
        ("a-b", "a_b;"),
        ("a-b?", "isA_b;"),
        ("(<= a b)", "(a <= b);"),
        ("a->b", "a__GTb;"),
    ];

    for (i, (input, expected)) in test_cases.into_iter().enumerate() {
        let mut translator = Translator::new();
        assert_eq!(translator.translate(input), expected, "#{}: {input}", i + 1);
    }
}

#[test]
fn test_macro_ignores_arguments() {
    let mut translator = Translator::new();
    translator.translate("(defmacro greet [who] (say \"hello\"))");

    let bare = translator.translate("(greet)");
    let with_args = translator.translate("(greet 1 2 3)");
    assert_eq!(bare, "say(\"hello\");");
    assert_eq!(bare, with_args);
}

#[test]
fn test_macros_persist_between_translations() {
    let mut translator = Translator::new();
    assert_eq!(translator.translate("(defmacro zero [] 0)"), "/* macro zero */;");
    assert_eq!(translator.translate("(def x (zero))"), "var x = 0;");

    // A fresh session knows nothing of it
    assert_eq!(Translator::new().translate("(def x (zero))"), "var x = zero();");
}

#[test]
fn test_nested_yield_makes_coroutine() {
    let mut translator = Translator::new();
    let output = translator.translate("(defn f [] (do-if c (yield 1)) 2)");

    assert!(output.starts_with("static function f() : IEnumerator {"));
    assert!(output.contains("yield 1;"));
    assert!(output.contains("    2;\n"));
    assert!(!output.contains("return 2"));
}

#[test]
fn test_unmatched_form_is_local() {
    let mut translator = Translator::new();
    let output = translator.translate("(def a 1) (\"oops\" 1) (def b 2)");
    let fragments: Vec<&str> = output.split("\n\n").collect();

    assert_eq!(
        fragments,
        vec![
            "var a = 1;",
            "/* unmatched form: (\"oops\" 1) */;",
            "var b = 2;"
        ]
    );
    assert_eq!(
        translator.diagnostics(),
        &[Diagnostic::UnmatchedForm("(\"oops\" 1)".into())]
    );
}

#[test]
fn test_translation_is_deterministic() {
    let source = "(defmacro m [] {:a 1 :b 2}) (defn f [x] (let [y (m)] (.go y x))) (f 1)";
    let mut first = Translator::new();
    let mut second = Translator::new();
    assert_eq!(first.translate(source), second.translate(source));

    // Same registry state, same output
    let again = first.clone().translate(source);
    assert_eq!(first.translate(source), again);
}

#[test]
fn test_parse_failure_is_whole_output() {
    let mut translator = Translator::new();
    let output = translator.translate("(def a 1) (def b");
    assert!(output.starts_with("/* ParseError: "), "got {output}");
    assert!(!output.contains("var a"));

    match translator.try_translate("(def a 1))") {
        Err(Error::ParseError(e)) => assert_eq!(e.kind, ParseErrorKind::TrailingContent),
        other => panic!("expected trailing content error, got {other:?}"),
    }
}

#[test]
fn test_failure_text_cannot_close_comment() {
    let mut translator = Translator::new();
    let output = translator.translate("(f */ \"");
    assert!(output.starts_with("/* "));
    assert!(output.ends_with(" */"));
    assert_eq!(output.matches("*/").count(), 1, "got {output}");
}

#[test]
fn test_indent_config() {
    let mut translator = Translator::with_config(RenderConfig::with_indent_width(2));
    assert_eq!(
        translator.translate("(defn f [] (g))"),
        "static function f() {\n  return g();\n};"
    );
}
