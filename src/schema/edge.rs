//! Edge schemas: an immutable single relationship type.

use error_stack::Report;

use crate::ctx;
use crate::errors::{NeopathError, NeopathResult};

/// An immutable edge kind: a single non-empty relationship type.
#[derive(Debug)]
pub struct EdgeSchema {
    pub name: &'static str,
    pub r#type: String,
}

impl PartialEq for EdgeSchema {
    fn eq(&self, other: &Self) -> bool {
        self.r#type == other.r#type
    }
}

impl EdgeSchema {
    /// `r#type` of `None` means "unspecified" — defaults to the declared
    /// name, uppercased, per the source's convention.
    pub fn new(name: &'static str, r#type: Option<String>) -> NeopathResult<Self> {
        let r#type = r#type.unwrap_or_else(|| name.to_uppercase());

        if r#type.trim().is_empty() {
            tracing::warn!(name, "rejecting edge schema with a blank type");
            return Err(Report::new(NeopathError::BadEdgeType {
                reason: "type must be a non-empty string".to_string(),
            })
            .attach(ctx!("edge schema - new")));
        }

        tracing::debug!(name, r#type = %r#type, "declared edge schema");

        Ok(EdgeSchema { name, r#type })
    }

    /// As [`EdgeSchema::new`], but for a schema declared dynamically whose
    /// name is only known at runtime; the name is leaked once.
    pub fn new_dynamic(name: String, r#type: Option<String>) -> NeopathResult<Self> {
        EdgeSchema::new(Box::leak(name.into_boxed_str()), r#type)
    }

    pub fn inline(&self) -> String {
        format!(":{}", self.r#type)
    }
}

/// Declares a `'static` [`EdgeSchema`], validated once at first access.
#[macro_export]
macro_rules! edge_schema {
    ($name:ident, type = $ty:expr) => {
        pub static $name: ::std::sync::LazyLock<$crate::schema::EdgeSchema> =
            ::std::sync::LazyLock::new(|| {
                $crate::schema::EdgeSchema::new(stringify!($name), Some($ty.to_string()))
                    .expect("invalid edge schema declared with edge_schema!")
            });
    };
    ($name:ident) => {
        pub static $name: ::std::sync::LazyLock<$crate::schema::EdgeSchema> =
            ::std::sync::LazyLock::new(|| {
                $crate::schema::EdgeSchema::new(stringify!($name), None)
                    .expect("invalid edge schema declared with edge_schema!")
            });
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_type_to_uppercased_name() {
        let schema = EdgeSchema::new("knows", None).unwrap();
        assert_eq!(schema.r#type, "KNOWS");
    }

    #[test]
    fn rejects_blank_type() {
        let result = EdgeSchema::new("Bad", Some("".to_string()));
        assert!(result.is_err());
    }
}
