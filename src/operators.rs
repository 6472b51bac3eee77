//! Infix operator registry.
//!
//! Each source operator has two renderings: the operator text used when the operator is
//! applied to exactly two operands (`(+ a b)` → `(a + b)`), and a named runtime function
//! used when the operator is passed around as a value or applied to some other number of
//! arguments (`(reduce + xs)` → `reduce(Runtime.add, xs)`).
//!
//! ## Adding New Operators
//!
//! 1. **Add the symbol to the grammar** in `parser::parse_infix` (longest symbols first)
//! 2. **Add an entry to INFIX_OPS** with its target operator and runtime function

use std::collections::HashMap;
use std::sync::LazyLock;

/// Definition of an infix operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfixOp {
    /// The source symbol
    pub symbol: &'static str,
    /// Operator text in the target language
    pub target: &'static str,
    /// Named function used when the operator is not in infix position
    pub function: &'static str,
}

/// Global registry of all infix operators.
static INFIX_OPS: LazyLock<Vec<InfixOp>> = LazyLock::new(|| {
    fn op(symbol: &'static str, target: &'static str, function: &'static str) -> InfixOp {
        InfixOp {
            symbol,
            target,
            function,
        }
    }

    vec![
        // Arithmetic
        op("+", "+", "Runtime.add"),
        op("-", "-", "Runtime.subtract"),
        op("*", "*", "Runtime.multiply"),
        op("/", "/", "Runtime.divide"),
        // Comparison
        op("==", "==", "Runtime.equals"),
        op("!=", "!=", "Runtime.notEquals"),
        op("<", "<", "Runtime.lessThan"),
        op(">", ">", "Runtime.greaterThan"),
        op("<=", "<=", "Runtime.lessOrEqual"),
        op(">=", ">=", "Runtime.greaterOrEqual"),
        // Logic and types
        op("and", "&&", "Runtime.and"),
        op("is", "is", "Runtime.isInstance"),
        op("as", "as", "Runtime.cast"),
    ]
});

static INFIX_BY_SYMBOL: LazyLock<HashMap<&'static str, &'static InfixOp>> =
    LazyLock::new(|| {
        let ops: &'static [InfixOp] = INFIX_OPS.as_slice();
        ops.iter().map(|op| (op.symbol, op)).collect()
    });

/// Get all infix operators
pub fn infix_ops() -> &'static [InfixOp] {
    INFIX_OPS.as_slice()
}

/// Find an infix operator by its source symbol
pub fn find_infix_op(symbol: &str) -> Option<&'static InfixOp> {
    INFIX_BY_SYMBOL.get(symbol).copied()
}

/// Operator text for infix position; unknown symbols pass through
pub fn infix_text(symbol: &str) -> &str {
    find_infix_op(symbol).map_or(symbol, |op| op.target)
}

/// Named function reference for an operator used as a value; unknown symbols pass through
pub fn function_ref(symbol: &str) -> &str {
    find_infix_op(symbol).map_or(symbol, |op| op.function)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_consistent() {
        assert_eq!(infix_ops().len(), INFIX_BY_SYMBOL.len(), "duplicate symbol");
        for op in infix_ops() {
            let found = find_infix_op(op.symbol);
            assert!(found.is_some_and(|f| std::ptr::eq(f, op)), "{}", op.symbol);
            assert!(op.function.starts_with("Runtime."), "{}", op.symbol);
        }
    }

    #[test]
    fn test_infix_mapping() {
        let test_cases = vec![
            ("+", "+", "Runtime.add"),
            ("<", "<", "Runtime.lessThan"),
            ("and", "&&", "Runtime.and"),
            ("!=", "!=", "Runtime.notEquals"),
            ("%%", "%%", "%%"),
        ];
        for (i, (symbol, target, function)) in test_cases.iter().enumerate() {
            assert_eq!(infix_text(symbol), *target, "Infix test #{}", i + 1);
            assert_eq!(function_ref(symbol), *function, "Infix test #{}", i + 1);
        }
    }
}
