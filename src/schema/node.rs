//! Node schemas: an immutable, canonical label set.
//!
//! Grounded on `neopath/_/entities.py`'s `MetaNode`, whose job is reduced
//! here to a single validating constructor plus a `node_schema!` macro that
//! builds a `'static` instance at first use — the declarative-macro analog
//! of a Python metaclass attaching a sibling descriptor.

use error_stack::Report;

use crate::ctx;
use crate::errors::{NeopathError, NeopathResult};

/// An immutable node kind: a sorted, deduplicated, non-empty label set.
#[derive(Debug)]
pub struct NodeSchema {
    pub name: &'static str,
    pub labels: Vec<String>,
}

impl PartialEq for NodeSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl NodeSchema {
    /// `labels` empty means "no explicit labels were given" — the schema's
    /// sole label becomes its declared name, per the source's default.
    pub fn new(name: &'static str, labels: Vec<String>) -> NeopathResult<Self> {
        let labels = if labels.is_empty() {
            vec![name.to_string()]
        } else {
            labels
        };

        for label in &labels {
            if label.trim().is_empty() {
                tracing::warn!(name, "rejecting node schema with a blank label");
                return Err(Report::new(NeopathError::BadNodeLabels {
                    reason: "labels must be non-empty strings".to_string(),
                })
                .attach(ctx!("node schema - new")));
            }
        }

        let mut canonical: Vec<String> = labels;
        canonical.sort();
        canonical.dedup();

        tracing::debug!(name, labels = ?canonical, "declared node schema");

        Ok(NodeSchema {
            name,
            labels: canonical,
        })
    }

    /// As [`NodeSchema::new`], but for a schema declared dynamically (e.g.
    /// from Python) whose name is only known at runtime. The name is
    /// leaked once, matching the schema's "created once at startup,
    /// immutable thereafter" lifecycle.
    pub fn new_dynamic(name: String, labels: Vec<String>) -> NeopathResult<Self> {
        NodeSchema::new(Box::leak(name.into_boxed_str()), labels)
    }

    /// The bare `:L1:L2:…` inline form of this schema's own label set,
    /// independent of any enclosing label expression (invariant 7).
    pub fn inline(&self) -> String {
        format!(":{}", self.labels.join(":"))
    }
}

/// Declares a `'static` [`NodeSchema`], validated once at first access.
///
/// ```ignore
/// node_schema!(PERSON, labels = ["Person"]);
/// node_schema!(ANYTHING); // labels default to the schema's own name
/// ```
#[macro_export]
macro_rules! node_schema {
    ($name:ident, labels = [$($label:expr),* $(,)?]) => {
        pub static $name: ::std::sync::LazyLock<$crate::schema::NodeSchema> =
            ::std::sync::LazyLock::new(|| {
                $crate::schema::NodeSchema::new(stringify!($name), vec![$($label.to_string()),*])
                    .expect("invalid node schema declared with node_schema!")
            });
    };
    ($name:ident) => {
        $crate::node_schema!($name, labels = []);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_label_to_declared_name() {
        let schema = NodeSchema::new("Person", vec![]).unwrap();
        assert_eq!(schema.labels, vec!["Person".to_string()]);
    }

    #[test]
    fn sorts_and_dedups_labels() {
        let schema = NodeSchema::new(
            "TwoNode",
            vec!["Two".to_string(), "Node".to_string(), "Two".to_string()],
        )
        .unwrap();
        assert_eq!(schema.labels, vec!["Node".to_string(), "Two".to_string()]);
        assert_eq!(schema.inline(), ":Node:Two");
    }

    #[test]
    fn rejects_blank_label() {
        let result = NodeSchema::new("Bad", vec!["".to_string()]);
        assert!(result.is_err());
    }
}
