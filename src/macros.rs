//! Macro registry.
//!
//! Macros are name → stored body rewrites. A call to a registered name renders the stored
//! body in place of the call; the call's arguments are not bound to the macro's
//! parameters and do not affect the output. Parameters are recorded only so the definition
//! can be inspected.

use std::collections::HashMap;

use crate::ast::Form;
use crate::bridge;

/// A registered macro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    pub params: Vec<String>,
    pub body: Form,
}

/// Named macro definitions for one translation session.
///
/// Definitions persist across every file translated with the same registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroRegistry {
    macros: HashMap<String, MacroDef>,
}

impl Default for MacroRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroRegistry {
    /// A registry seeded with the built-in macros
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.install_defaults();
        registry
    }

    /// A registry with no definitions at all
    pub fn empty() -> Self {
        MacroRegistry {
            macros: HashMap::new(),
        }
    }

    fn install_defaults(&mut self) {
        // (comment ...) discards its contents and yields null
        self.macros.insert(
            "comment".to_owned(),
            MacroDef {
                params: Vec::new(),
                body: Form::Word("nil".to_owned()),
            },
        );
    }

    /// Insert or overwrite a definition; returns the placeholder fragment for the definition
    pub fn register(&mut self, name: &str, params: Vec<String>, body: Form) -> String {
        tracing::debug!(name, params = params.len(), "registering macro");
        self.macros.insert(name.to_owned(), MacroDef { params, body });
        bridge::comment(&format!("macro {name}"))
    }

    pub fn lookup(&self, name: &str) -> Option<&MacroDef> {
        self.macros.get(name)
    }

    /// Drop every user definition and restore the built-ins
    pub fn reset(&mut self) {
        self.macros.clear();
        self.install_defaults();
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{num, word};

    #[test]
    fn test_defaults_and_reset() {
        let mut registry = MacroRegistry::new();
        assert_eq!(registry.names(), vec!["comment"]);
        assert_eq!(
            registry.lookup("comment").map(|m| &m.body),
            Some(&word("nil"))
        );

        registry.register("five", vec![], num("5"));
        assert_eq!(registry.names(), vec!["comment", "five"]);

        registry.reset();
        assert_eq!(registry.names(), vec!["comment"]);
        assert!(MacroRegistry::empty().is_empty());
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = MacroRegistry::empty();
        let placeholder = registry.register("m", vec!["a".into()], num("1"));
        assert_eq!(placeholder, "/* macro m */");
        registry.register("m", vec![], num("2"));

        let def = registry.lookup("m");
        assert_eq!(def.map(|m| &m.body), Some(&num("2")));
        assert_eq!(def.map(|m| m.params.len()), Some(0));
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("missing").is_none());
    }
}
