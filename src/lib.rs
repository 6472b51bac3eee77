//! unilisp - Lisp dialect to UnityScript translator
//!
//! This crate parses a small Clojure-flavoured Lisp into a tree of [`ast::Form`]s and
//! renders that tree as UnityScript-style JavaScript: curly braces, statements, optional
//! `name : Type` annotations and `IEnumerator` coroutines.
//!
//! ```text
//! ;; source
//! (defn add? [a b] (+ a b))
//! (def ^int count 0)
//! ```
//!
//! ```text
//! // output
//! static function isAdd(a, b) {
//!     return (a + b);
//! };
//!
//! var count : int = 0;
//! ```
//!
//! ## Expression Bridging
//!
//! The source language is expression-oriented while the target is statement-oriented.
//! Forms that only exist as statements in the target (`do`, `let`, `while`, `do-if`) are
//! rendered as immediately-invoked function wrappers so they can appear anywhere an
//! expression is legal. Function bodies return their last form unless they yield, in which
//! case they become coroutines.
//!
//! ## Failure Model
//!
//! Only the grammar can fail a whole file. Anything the renderer cannot match becomes an
//! inline `/* ... */` diagnostic at that position and the rest of the file renders normally.
//!
//! ## Modules
//!
//! - `parser`: source text to forms
//! - `ast`: the form tree
//! - `literals`: identifier mangling and literal rendering
//! - `operators`: infix operator table
//! - `macros`: the macro registry
//! - `forms`: the ordered special-form table
//! - `compiler`: the translator session and form dispatch
//! - `bridge`: block, function and wrapper assembly
//! - `watch`: source tree scanning and polling (feature `cli`)

use std::fmt;

/// Maximum nesting depth accepted by the parser
pub const MAX_PARSE_DEPTH: usize = 128;

/// Maximum macro expansion depth before an expansion is cut off with a diagnostic
pub const MAX_EXPANSION_DEPTH: usize = 64;

/// Maximum number of enclosing forms while rendering, macro bodies included
pub const MAX_RENDER_DEPTH: usize = MAX_PARSE_DEPTH + 32;

/// Maximum number of macro expansions while rendering one top-level form
pub const MAX_EXPANSIONS: usize = 1024;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// Invalid or unexpected syntax (bad tokens, malformed forms)
    InvalidSyntax,
    /// Input ended before a form was complete (unterminated string, unclosed delimiter)
    Incomplete,
    /// Nesting exceeded [`MAX_PARSE_DEPTH`]
    TooDeeplyNested,
    /// A closing delimiter with nothing to close
    TrailingContent,
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
    /// The problematic token or character encountered, if identifiable
    pub found: Option<String>,
}

impl ParseError {
    /// Create a ParseError with all fields
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        context: Option<String>,
        found: Option<String>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context,
            found,
        }
    }

    /// Create a ParseError with context and found token extracted from input at a byte offset
    pub fn with_context_and_found(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
        found: Option<String>,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;

        let char_offset = input
            .char_indices()
            .take_while(|(i, _)| *i < error_offset)
            .count();
        let context_start = char_offset.saturating_sub(20);

        let context_str: String = input
            .chars()
            .skip(context_start)
            .take(MAX_CONTEXT)
            .collect();

        let mut display_context = String::new();
        if context_start > 0 {
            display_context.push_str("[...]");
        }
        display_context.push_str(&context_str);
        if context_start + context_str.chars().count() < input.chars().count() {
            display_context.push_str("[...]");
        }

        let display_context = display_context.replace('\n', "\\n").replace('\r', "");

        Self::new(kind, message, Some(display_context), found)
    }
}

/// Error type for the translator.
///
/// Rendering never fails, so parsing is the only source of errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ParseError(ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError(e) => {
                write!(f, "ParseError: {}", e.message)?;
                if let Some(found) = &e.found {
                    write!(f, "\nFound: {found}")?;
                }
                if let Some(context) = &e.context {
                    write!(f, "\nContext: {context}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::ParseError(e)
    }
}

/// A local rendering failure, emitted inline in place of the form it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A list whose shape matches no special form and cannot be called
    UnmatchedForm(String),
    /// `def`/`def-static` with neither an initializer nor a type hint
    MissingTypeHint(String),
    /// A type hint whose name or type cannot be rendered
    MalformedHint(String),
    /// A map literal with an odd number of items
    OddMap(String),
    /// Macro expansion nested deeper than [`MAX_EXPANSION_DEPTH`]
    ExpansionLimit(String),
    /// More than [`MAX_EXPANSIONS`] expansions in one top-level form
    ExpansionBudget(String),
    /// Rendering descended deeper than [`MAX_RENDER_DEPTH`] forms
    NestingLimit,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Diagnostic::UnmatchedForm(form) => write!(f, "unmatched form: {form}"),
            Diagnostic::MissingTypeHint(name) => {
                write!(f, "cannot declare {name} without a value or a type hint")
            }
            Diagnostic::MalformedHint(hint) => write!(f, "malformed type hint: {hint}"),
            Diagnostic::OddMap(form) => {
                write!(f, "map literal needs an even number of items: {form}")
            }
            Diagnostic::ExpansionLimit(name) => write!(
                f,
                "macro {name} expanded deeper than {MAX_EXPANSION_DEPTH} levels"
            ),
            Diagnostic::ExpansionBudget(name) => write!(
                f,
                "macro {name} exceeded {MAX_EXPANSIONS} expansions in one form"
            ),
            Diagnostic::NestingLimit => {
                write!(f, "form nested deeper than {MAX_RENDER_DEPTH} levels")
            }
        }
    }
}

impl Diagnostic {
    /// Render this diagnostic as an inline target-language comment
    pub fn to_fragment(&self) -> String {
        bridge::comment(&self.to_string())
    }
}

pub mod ast;
pub mod bridge;
pub mod compiler;
pub mod forms;
pub mod literals;
pub mod macros;
pub mod operators;
pub mod parser;

#[cfg(feature = "cli")]
pub mod watch;

pub use compiler::{RenderConfig, Translator};
