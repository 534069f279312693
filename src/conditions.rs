//! Predicate conditions attached to a chain segment.
//!
//! Grounded on `neopath/predicates.py`'s `eq`/`ne`/`starts_with`/`is_null`/
//! `exists` functions: each produces a literal Cypher fragment at render
//! time, with the comparison variants additionally binding a fresh
//! parameter. `Condition::Raw` carries an opaque fragment through verbatim,
//! matching the source's ability to pass any pre-built string.

use crate::value::Value;

/// A reference to a property descriptor: which entity declared it, and
/// under what name. Carried by comparison/existence conditions; the
/// variable it is ultimately rendered against comes from whichever segment
/// `.where()` attached the condition to, not from this struct.
#[derive(Debug, Clone, PartialEq)]
pub struct PropRef {
    pub entity: String,
    pub prop_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    StartsWith,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::StartsWith => "STARTS WITH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceKind {
    Exists,
    IsNull,
}

#[derive(Debug, Clone)]
pub enum Condition {
    /// An opaque, pre-built Cypher fragment, passed through verbatim.
    Raw(String),
    /// A parameterized comparison: `{var}.{prop} {op} ${name}`.
    Compare {
        prop: PropRef,
        op: CompareOp,
        value: Value,
    },
    /// `exists({var}.{prop})` or `{var}.{prop} IS NULL` — no parameter.
    Existence { prop: PropRef, kind: ExistenceKind },
    /// `NOT (...)` wrapping another condition.
    Not(Box<Condition>),
}

impl Condition {
    pub fn raw(fragment: impl Into<String>) -> Self {
        Condition::Raw(fragment.into())
    }

    pub fn compare(prop: PropRef, op: CompareOp, value: Value) -> Self {
        Condition::Compare { prop, op, value }
    }

    pub fn existence(prop: PropRef, kind: ExistenceKind) -> Self {
        Condition::Existence { prop, kind }
    }

    pub fn not(self) -> Self {
        Condition::Not(Box::new(self))
    }
}

impl std::ops::Not for Condition {
    type Output = Condition;

    fn not(self) -> Condition {
        Condition::not(self)
    }
}

impl From<&str> for Condition {
    fn from(fragment: &str) -> Self {
        Condition::raw(fragment)
    }
}

impl From<String> for Condition {
    fn from(fragment: String) -> Self {
        Condition::raw(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_wraps_in_place() {
        let cond = !Condition::raw("a.x IS NULL");
        assert!(matches!(cond, Condition::Not(_)));
    }
}
