//! Typed property descriptors.
//!
//! Mirrors `neopath/_/attributes.py`'s `Attr`/`Int` pair: a descriptor knows
//! its owning entity's name, its own property name, the runtime types it
//! accepts, and an optional extra constraint. `check_type` and
//! `check_constraints` are evaluated in that order by `check`.

use crate::conditions::{CompareOp, Condition, ExistenceKind, PropRef};
use crate::value::{Value, ValueKind};

/// Common behavior of every property descriptor.
///
/// Kept object-safe (no generic methods) so schemas can hold a homogeneous
/// `&dyn PropDescriptor` registry for validation; the condition-building
/// helpers (`eq`, `ne`, ...) live in a second, non-object-safe trait below
/// since they take `impl Into<Value>`.
pub trait PropDescriptor {
    fn owner(&self) -> &'static str;
    fn prop_name(&self) -> &'static str;
    fn allowed_types(&self) -> &'static [ValueKind];

    fn check_type(&self, value: &Value) -> bool {
        self.allowed_types().contains(&ValueKind::of(value))
    }

    /// Defaults to true; integer descriptors narrow this to a signed
    /// 64-bit range, mirroring the original's `neo4j.types.INT64_MIN/MAX`.
    fn check_constraints(&self, _value: &Value) -> bool {
        true
    }

    fn check(&self, value: &Value) -> bool {
        self.check_type(value) && self.check_constraints(value)
    }

    fn prop_ref(&self) -> PropRef {
        PropRef {
            entity: self.owner().to_string(),
            prop_name: self.prop_name().to_string(),
        }
    }
}

/// Condition-construction methods, kept on a separate trait so the base
/// trait above stays object-safe.
pub trait PropComparisons: PropDescriptor {
    fn eq(&self, value: impl Into<Value>) -> Condition {
        Condition::compare(self.prop_ref(), CompareOp::Eq, value.into())
    }

    fn ne(&self, value: impl Into<Value>) -> Condition {
        Condition::compare(self.prop_ref(), CompareOp::Ne, value.into())
    }

    fn starts_with(&self, value: impl Into<Value>) -> Condition {
        Condition::compare(self.prop_ref(), CompareOp::StartsWith, value.into())
    }

    fn exists(&self) -> Condition {
        Condition::existence(self.prop_ref(), ExistenceKind::Exists)
    }

    fn is_null(&self) -> Condition {
        Condition::existence(self.prop_ref(), ExistenceKind::IsNull)
    }
}

impl<T: PropDescriptor + ?Sized> PropComparisons for T {}

macro_rules! prop_descriptor {
    ($name:ident, [$($kind:expr),+ $(,)?]) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            owner: &'static str,
            prop_name: &'static str,
        }

        impl $name {
            pub const fn new(owner: &'static str, prop_name: &'static str) -> Self {
                $name { owner, prop_name }
            }
        }

        impl PropDescriptor for $name {
            fn owner(&self) -> &'static str {
                self.owner
            }

            fn prop_name(&self) -> &'static str {
                self.prop_name
            }

            fn allowed_types(&self) -> &'static [ValueKind] {
                &[$($kind),+]
            }
        }
    };
}

prop_descriptor!(StringProp, [ValueKind::String]);
prop_descriptor!(BoolProp, [ValueKind::Bool]);
prop_descriptor!(FloatProp, [ValueKind::Float]);
prop_descriptor!(AnyProp, [
    ValueKind::String,
    ValueKind::Int,
    ValueKind::Float,
    ValueKind::Bool,
    ValueKind::Null,
]);

#[derive(Debug, Clone, Copy)]
pub struct IntProp {
    owner: &'static str,
    prop_name: &'static str,
}

impl IntProp {
    pub const fn new(owner: &'static str, prop_name: &'static str) -> Self {
        IntProp { owner, prop_name }
    }
}

impl PropDescriptor for IntProp {
    fn owner(&self) -> &'static str {
        self.owner
    }

    fn prop_name(&self) -> &'static str {
        self.prop_name
    }

    fn allowed_types(&self) -> &'static [ValueKind] {
        &[ValueKind::Int]
    }

    fn check_constraints(&self, value: &Value) -> bool {
        matches!(value, Value::Int(n) if (i64::MIN..=i64::MAX).contains(n))
    }
}

/// A property descriptor declared dynamically (from Python) rather than
/// via a `node_schema!`/`edge_schema!`-adjacent Rust constant.
///
/// `owner`/`prop_name` are leaked once at declaration time to satisfy
/// [`PropDescriptor`]'s `&'static str` contract — the same tradeoff the
/// source's own module-level class/attribute declarations make, and
/// consistent with schemas being "created once at startup and immutable
/// thereafter."
#[derive(Debug, Clone, Copy)]
pub struct DynProp {
    owner: &'static str,
    prop_name: &'static str,
    kind: Option<ValueKind>,
}

impl DynProp {
    /// `kind` of `None` accepts any runtime type (the `AnyProp` case).
    pub fn new(owner: String, prop_name: String, kind: Option<ValueKind>) -> Self {
        DynProp {
            owner: Box::leak(owner.into_boxed_str()),
            prop_name: Box::leak(prop_name.into_boxed_str()),
            kind,
        }
    }
}

impl PropDescriptor for DynProp {
    fn owner(&self) -> &'static str {
        self.owner
    }

    fn prop_name(&self) -> &'static str {
        self.prop_name
    }

    fn allowed_types(&self) -> &'static [ValueKind] {
        match self.kind {
            Some(ValueKind::String) => &[ValueKind::String],
            Some(ValueKind::Int) => &[ValueKind::Int],
            Some(ValueKind::Float) => &[ValueKind::Float],
            Some(ValueKind::Bool) => &[ValueKind::Bool],
            Some(ValueKind::Null) | None => &[
                ValueKind::String,
                ValueKind::Int,
                ValueKind::Float,
                ValueKind::Bool,
                ValueKind::Null,
            ],
        }
    }

    fn check_constraints(&self, value: &Value) -> bool {
        if self.kind == Some(ValueKind::Int) {
            matches!(value, Value::Int(n) if (i64::MIN..=i64::MAX).contains(n))
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: StringProp = StringProp::new("Person", "name");
    const AGE: IntProp = IntProp::new("Person", "age");

    #[test]
    fn check_type_rejects_wrong_kind() {
        assert!(NAME.check_type(&Value::String("a".into())));
        assert!(!NAME.check_type(&Value::Int(1)));
    }

    #[test]
    fn int_prop_accepts_full_i64_range() {
        assert!(AGE.check_constraints(&Value::Int(i64::MAX)));
        assert!(AGE.check_constraints(&Value::Int(i64::MIN)));
    }

    #[test]
    fn eq_condition_carries_owner_and_value() {
        let cond = NAME.eq("Alice");
        match cond {
            Condition::Compare { prop, op, value } => {
                assert_eq!(prop.entity, "Person");
                assert_eq!(prop.prop_name, "name");
                assert_eq!(op, CompareOp::Eq);
                assert_eq!(value, Value::String("Alice".to_string()));
            }
            _ => panic!("expected a Compare condition"),
        }
    }
}
