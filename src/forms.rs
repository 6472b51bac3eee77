//! Special-form registry.
//!
//! Every list whose head names a special form is rendered by that form's renderer instead of
//! being treated as a call. Forms are kept in one ordered table; lookups go through a lazily
//! built index keyed by head identifier.
//!
//! ```text
//! (def x 5)                 var x = 5
//! (if c a b)                (c ? a : b)
//! (defn f [a] a)            static function f(a) { return a; }
//! (while c (step))          (function() { while (c) { step(); }; return null; })()
//! ```
//!
//! ## Shape Checking
//!
//! A form is matched in two steps. The argument count must satisfy the form's [`Arity`], and
//! the renderer must accept the argument shapes (a vector where parameters are expected, a
//! word where a name is expected). Either failure turns the whole list into an
//! `unmatched form` diagnostic; a malformed special form is never reinterpreted as a call.
//!
//! ## Adding New Forms
//!
//! 1. **Write the renderer** in `compiler` with the signature of [`RenderFn`], returning
//!    `None` when the argument shapes do not fit
//! 2. **Add it to SPECIAL_FORMS** with its head identifier and arity
//! 3. **Add tests** for the accepted shapes and at least one rejected shape

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ast::Form;
use crate::compiler::{
    Translator, render_def, render_def_static, render_defmacro, render_defmethod, render_defn,
    render_deftype, render_defvoid, render_do, render_do_if, render_fn, render_if, render_import,
    render_let, render_new, render_not, render_nth, render_set, render_update, render_while,
    render_yield,
};

/// Renders the arguments of a special form, or `None` if their shapes do not match
pub type RenderFn = fn(&mut Translator, &[Form], usize) -> Option<String>;

/// Accepted argument counts of a special form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly n arguments
    Exact(usize),
    /// At least n arguments
    AtLeast(usize),
    /// Between min and max arguments (inclusive)
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Range(min, max) => (min..=max).contains(&count),
        }
    }
}

/// Definition of a special form
#[derive(Clone)]
pub struct SpecialForm {
    /// The head identifier selecting this form
    pub id: &'static str,
    /// Expected number of arguments after the head
    pub arity: Arity,
    pub render: RenderFn,
}

impl std::fmt::Debug for SpecialForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecialForm")
            .field("id", &self.id)
            .field("arity", &self.arity)
            .field("render", &"<fn>")
            .finish()
    }
}

impl PartialEq for SpecialForm {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Ordered table of every special form
static SPECIAL_FORMS: LazyLock<Vec<SpecialForm>> = LazyLock::new(|| {
    vec![
        // Declarations
        SpecialForm {
            id: "def",
            arity: Arity::Range(1, 2),
            render: render_def,
        },
        SpecialForm {
            id: "def-static",
            arity: Arity::Range(1, 2),
            render: render_def_static,
        },
        SpecialForm {
            id: "set!",
            arity: Arity::Exact(2),
            render: render_set,
        },
        SpecialForm {
            id: "import",
            arity: Arity::Exact(1),
            render: render_import,
        },
        // Simple expressions
        SpecialForm {
            id: "not",
            arity: Arity::Exact(1),
            render: render_not,
        },
        SpecialForm {
            id: "yield",
            arity: Arity::Exact(1),
            render: render_yield,
        },
        SpecialForm {
            id: "update!",
            arity: Arity::Exact(2),
            render: render_update,
        },
        SpecialForm {
            id: "nth",
            arity: Arity::Exact(2),
            render: render_nth,
        },
        SpecialForm {
            id: "new",
            arity: Arity::AtLeast(1),
            render: render_new,
        },
        // Statement wrappers
        SpecialForm {
            id: "do",
            arity: Arity::AtLeast(1),
            render: render_do,
        },
        SpecialForm {
            id: "let",
            arity: Arity::AtLeast(1),
            render: render_let,
        },
        SpecialForm {
            id: "if",
            arity: Arity::Exact(3),
            render: render_if,
        },
        SpecialForm {
            id: "do-if",
            arity: Arity::Range(2, 3),
            render: render_do_if,
        },
        SpecialForm {
            id: "while",
            arity: Arity::AtLeast(1),
            render: render_while,
        },
        // Definitions
        SpecialForm {
            id: "deftype",
            arity: Arity::AtLeast(2),
            render: render_deftype,
        },
        SpecialForm {
            id: "fn",
            arity: Arity::AtLeast(1),
            render: render_fn,
        },
        SpecialForm {
            id: "defn",
            arity: Arity::AtLeast(2),
            render: render_defn,
        },
        SpecialForm {
            id: "defmethod",
            arity: Arity::AtLeast(2),
            render: render_defmethod,
        },
        SpecialForm {
            id: "defvoid",
            arity: Arity::AtLeast(2),
            render: render_defvoid,
        },
        SpecialForm {
            id: "defmacro",
            arity: Arity::Exact(3),
            render: render_defmacro,
        },
    ]
});

/// Lazy static map from head identifier to SpecialForm (private - use find_special_form)
static SPECIAL_FORMS_BY_ID: LazyLock<HashMap<&'static str, &'static SpecialForm>> =
    LazyLock::new(|| {
        let forms: &'static [SpecialForm] = SPECIAL_FORMS.as_slice();
        forms.iter().map(|form| (form.id, form)).collect()
    });

/// All special forms in table order
pub fn special_forms() -> &'static [SpecialForm] {
    SPECIAL_FORMS.as_slice()
}

/// Find a special form by its head identifier
pub fn find_special_form(id: &str) -> Option<&'static SpecialForm> {
    SPECIAL_FORMS_BY_ID.get(id).copied()
}

/// The identifier a list head would select a special form with, if any
pub(crate) fn head_id(head: &Form) -> Option<&str> {
    match head {
        Form::Word(name) => Some(name),
        Form::Yield => Some("yield"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        let test_cases = vec![
            (Arity::Exact(2), 1, false),
            (Arity::Exact(2), 2, true),
            (Arity::Exact(2), 3, false),
            (Arity::AtLeast(1), 0, false),
            (Arity::AtLeast(1), 1, true),
            (Arity::AtLeast(1), 9, true),
            (Arity::Range(1, 2), 0, false),
            (Arity::Range(1, 2), 1, true),
            (Arity::Range(1, 2), 2, true),
            (Arity::Range(1, 2), 3, false),
        ];

        for (arity, count, expected) in test_cases {
            assert_eq!(arity.accepts(count), expected, "{arity:?} with {count} args");
        }
    }

    #[test]
    fn test_table_lookup() {
        let forms = special_forms();
        assert_eq!(forms.len(), 20);
        for form in forms {
            assert_eq!(find_special_form(form.id), Some(form));
        }

        assert_eq!(find_special_form("if").map(|f| f.arity), Some(Arity::Exact(3)));
        assert_eq!(
            find_special_form("def").map(|f| f.arity),
            Some(Arity::Range(1, 2))
        );
        assert!(find_special_form("cond").is_none());
        assert!(find_special_form("+").is_none());
    }

    #[test]
    fn test_ids_unique() {
        let mut ids: Vec<&str> = special_forms().iter().map(|f| f.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), special_forms().len());
    }

    #[test]
    fn test_head_id() {
        assert_eq!(head_id(&Form::Word("do".into())), Some("do"));
        assert_eq!(head_id(&Form::Yield), Some("yield"));
        assert_eq!(head_id(&Form::Keyword("do".into())), None);
        assert_eq!(head_id(&Form::List(vec![])), None);
    }
}
