//! The label/type expression algebra.
//!
//! Grounded on `neopath/_/entities.py`'s `Logic`/`And`/`Or`/`Xor`/`Not` and
//! `BitwiseMixin`: an expression tree over raw labels and schema handles,
//! built with `&`/`|`/`^`/`!`, flattening same-kind children and
//! deduplicating leaves at construction time, then lowered against a
//! node/edge rendering context into an inline suffix or a WHERE fragment.

use error_stack::Report;
use std::ops::{BitAnd, BitOr, BitXor, Not as StdNot};
use std::sync::Arc;

use crate::ctx;
use crate::errors::{NeopathError, NeopathResult};
use crate::schema::{EdgeSchema, NodeSchema};

/// Which side of a segment an expression is being lowered for. Node and
/// edge context differ in whether a conjunction, a disjunction or a
/// negation is even meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Node,
    Edge,
}

/// A leaf of the label expression tree.
#[derive(Debug, Clone)]
pub enum Ident {
    Raw(String),
    Node(Arc<NodeSchema>),
    Edge(Arc<EdgeSchema>),
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ident::Raw(a), Ident::Raw(b)) => a == b,
            (Ident::Node(a), Ident::Node(b)) => a.name == b.name,
            (Ident::Edge(a), Ident::Edge(b)) => a.r#type == b.r#type,
            _ => false,
        }
    }
}

impl Ident {
    /// The labels this leaf contributes in the given context. A raw string
    /// is context-opaque; a node-schema leaf expands to its full label set
    /// only in node context (and falls back to its declared name
    /// otherwise); an edge-schema leaf always contributes its single type.
    fn leaf_labels(&self, ctx: Context) -> Vec<String> {
        match self {
            Ident::Raw(s) if s.is_empty() => vec![],
            Ident::Raw(s) => vec![s.clone()],
            Ident::Node(schema) => match ctx {
                Context::Node => schema.labels.clone(),
                Context::Edge => vec![schema.name.to_string()],
            },
            Ident::Edge(schema) => vec![schema.r#type.clone()],
        }
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Ident::Raw(s.to_string())
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Ident::Raw(s)
    }
}

impl From<Arc<NodeSchema>> for Ident {
    fn from(schema: Arc<NodeSchema>) -> Self {
        Ident::Node(schema)
    }
}

impl From<Arc<EdgeSchema>> for Ident {
    fn from(schema: Arc<EdgeSchema>) -> Self {
        Ident::Edge(schema)
    }
}

/// The label/type expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    Leaf(Ident),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Xor(Vec<Expr>),
    Not(Box<Expr>),
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Leaf(a), Expr::Leaf(b)) => a == b,
            (Expr::And(a), Expr::And(b)) => a == b,
            (Expr::Or(a), Expr::Or(b)) => a == b,
            (Expr::Xor(a), Expr::Xor(b)) => a == b,
            (Expr::Not(a), Expr::Not(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    And,
    Or,
    Xor,
}

/// The result of lowering an [`Expr`]: at most one of the two fields is
/// non-empty (node-context And, and edge context, may produce an inline
/// form; everything else in node context produces a WHERE fragment).
#[derive(Debug, Clone, Default)]
pub struct Lowered {
    pub inline: String,
    pub where_fragment: String,
}

impl Lowered {
    fn inline(s: String) -> Self {
        Lowered {
            inline: s,
            where_fragment: String::new(),
        }
    }

    fn where_only(s: String) -> Self {
        Lowered {
            inline: String::new(),
            where_fragment: s,
        }
    }

    fn empty() -> Self {
        Lowered::default()
    }
}

impl Expr {
    pub fn leaf(ident: impl Into<Ident>) -> Expr {
        Expr::Leaf(ident.into())
    }

    pub fn and(parts: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::combine(Kind::And, parts.into_iter().collect())
    }

    pub fn or(parts: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::combine(Kind::Or, parts.into_iter().collect())
    }

    pub fn xor(parts: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::combine(Kind::Xor, parts.into_iter().collect())
    }

    pub fn negate(inner: Expr) -> Expr {
        Expr::Not(Box::new(inner))
    }

    fn combine(kind: Kind, parts: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(parts.len());
        for part in parts {
            let same_kind = matches!(
                (&kind, &part),
                (Kind::And, Expr::And(_)) | (Kind::Or, Expr::Or(_)) | (Kind::Xor, Expr::Xor(_))
            );
            if same_kind {
                match part {
                    Expr::And(children) | Expr::Or(children) | Expr::Xor(children) => {
                        flat.extend(children)
                    }
                    _ => unreachable!(),
                }
            } else {
                flat.push(part);
            }
        }

        let mut deduped: Vec<Expr> = Vec::with_capacity(flat.len());
        for item in flat {
            if is_empty_leaf(&item) {
                continue;
            }
            if !deduped.contains(&item) {
                deduped.push(item);
            }
        }

        match kind {
            Kind::And => Expr::And(deduped),
            Kind::Or => Expr::Or(deduped),
            Kind::Xor => Expr::Xor(deduped),
        }
    }

    /// Lowers this expression against the renderer's variable name and
    /// segment context, producing either an inline suffix or a WHERE
    /// fragment (see [`Lowered`]).
    pub fn lower(&self, var: &str, ctx: Context) -> NeopathResult<Lowered> {
        match self {
            Expr::Leaf(ident) => {
                let labels = dedup_preserve(ident.leaf_labels(ctx));
                if labels.is_empty() {
                    Ok(Lowered::empty())
                } else {
                    Ok(Lowered::inline(inline_suffix(ctx, &labels)))
                }
            }
            Expr::And(children) => lower_and(children, var, ctx),
            Expr::Or(children) => lower_or_xor(children, var, ctx, "OR"),
            Expr::Xor(children) => lower_or_xor(children, var, ctx, "XOR"),
            Expr::Not(inner) => lower_not(inner, var, ctx),
        }
    }
}

impl BitAnd for Expr {
    type Output = Expr;
    fn bitand(self, rhs: Expr) -> Expr {
        Expr::and([self, rhs])
    }
}

impl BitOr for Expr {
    type Output = Expr;
    fn bitor(self, rhs: Expr) -> Expr {
        Expr::or([self, rhs])
    }
}

impl BitXor for Expr {
    type Output = Expr;
    fn bitxor(self, rhs: Expr) -> Expr {
        Expr::xor([self, rhs])
    }
}

impl StdNot for Expr {
    type Output = Expr;
    fn not(self) -> Expr {
        Expr::negate(self)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::leaf(s)
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::leaf(s)
    }
}

impl From<Arc<NodeSchema>> for Expr {
    fn from(schema: Arc<NodeSchema>) -> Self {
        Expr::leaf(schema)
    }
}

impl From<Arc<EdgeSchema>> for Expr {
    fn from(schema: Arc<EdgeSchema>) -> Self {
        Expr::leaf(schema)
    }
}

fn is_empty_leaf(expr: &Expr) -> bool {
    matches!(expr, Expr::Leaf(Ident::Raw(s)) if s.is_empty())
}

fn is_trivial_node_leaf(expr: &Expr) -> bool {
    matches!(expr, Expr::Leaf(Ident::Raw(_)) | Expr::Leaf(Ident::Node(_)))
}

fn dedup_preserve(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if item.is_empty() {
            continue;
        }
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn inline_suffix(ctx: Context, labels: &[String]) -> String {
    match ctx {
        Context::Node => format!(":{}", labels.join(":")),
        Context::Edge => labels
            .iter()
            .map(|l| format!(":{l}"))
            .collect::<Vec<_>>()
            .join("|"),
    }
}

/// Flattens every leaf label reachable through nested And/Or/Xor children.
/// A nested `Not` is rejected rather than unwrapped: edge-context negation
/// is not defined (same rule `lower_not` enforces at the top level), so a
/// `Not` buried inside a conjunction/disjunction must error the same way.
fn collect_all_leaf_labels(
    children: &[Expr],
    ctx: Context,
    out: &mut Vec<String>,
) -> NeopathResult<()> {
    for child in children {
        match child {
            Expr::Leaf(ident) => out.extend(ident.leaf_labels(ctx)),
            Expr::And(c) | Expr::Or(c) | Expr::Xor(c) => collect_all_leaf_labels(c, ctx, out)?,
            Expr::Not(_) => {
                tracing::warn!("rejecting nested negation inside an edge-context And/Or/Xor");
                return Err(Report::new(NeopathError::MultipleEdgeTypes)
                    .attach(ctx!("algebra - negation is not defined in edge context")));
            }
        }
    }
    Ok(())
}

/// A nested subexpression's contribution to a parent WHERE fragment: bare
/// `{var}{inline}` when it lowered to an inline form, otherwise its WHERE
/// fragment parenthesized. Applied uniformly to And/Or/Xor/Not so every
/// nested-subexpression site behaves the same way.
fn sub_as_where_term(var: &str, lowered: &Lowered) -> String {
    if !lowered.inline.is_empty() {
        format!("{var}{}", lowered.inline)
    } else {
        format!("({})", lowered.where_fragment)
    }
}

fn lower_and(children: &[Expr], var: &str, ctx: Context) -> NeopathResult<Lowered> {
    match ctx {
        Context::Edge => {
            let mut labels = Vec::new();
            collect_all_leaf_labels(children, ctx, &mut labels)?;
            let labels = dedup_preserve(labels);
            if labels.len() > 1 {
                tracing::warn!(labels = ?labels, "rejecting conjunction of distinct edge types");
                return Err(Report::new(NeopathError::MultipleEdgeTypes)
                    .attach(ctx!("algebra - conjunction of distinct edge types")));
            }
            Ok(Lowered::inline(inline_suffix(ctx, &labels)))
        }
        Context::Node => {
            let trivial_labels = dedup_preserve(
                children
                    .iter()
                    .filter(|c| is_trivial_node_leaf(c))
                    .flat_map(|c| match c {
                        Expr::Leaf(ident) => ident.leaf_labels(ctx),
                        _ => vec![],
                    })
                    .collect(),
            );
            let non_trivial: Vec<&Expr> = children
                .iter()
                .filter(|c| !is_trivial_node_leaf(c))
                .collect();

            if non_trivial.is_empty() {
                Ok(Lowered::inline(inline_suffix(ctx, &trivial_labels)))
            } else {
                let mut parts = Vec::with_capacity(non_trivial.len() + 1);
                if !trivial_labels.is_empty() {
                    parts.push(format!("{var}{}", inline_suffix(ctx, &trivial_labels)));
                }
                for sub in non_trivial {
                    let lowered = sub.lower(var, ctx)?;
                    parts.push(sub_as_where_term(var, &lowered));
                }
                Ok(Lowered::where_only(parts.join(" AND ")))
            }
        }
    }
}

fn lower_or_xor(children: &[Expr], var: &str, ctx: Context, op: &str) -> NeopathResult<Lowered> {
    match ctx {
        // Xor on edges is equivalent to Or for lowering purposes: a
        // segment can traverse only one relationship type at a time.
        Context::Edge => {
            let mut labels = Vec::new();
            collect_all_leaf_labels(children, ctx, &mut labels)?;
            let labels = dedup_preserve(labels);
            Ok(Lowered::inline(inline_suffix(ctx, &labels)))
        }
        Context::Node => {
            let mut terms = Vec::new();
            for child in children {
                match child {
                    Expr::Leaf(ident) => {
                        for label in dedup_preserve(ident.leaf_labels(ctx)) {
                            terms.push(format!("{var}:{label}"));
                        }
                    }
                    other => {
                        let lowered = other.lower(var, ctx)?;
                        terms.push(sub_as_where_term(var, &lowered));
                    }
                }
            }
            Ok(Lowered::where_only(terms.join(&format!(" {op} "))))
        }
    }
}

fn lower_not(inner: &Expr, var: &str, ctx: Context) -> NeopathResult<Lowered> {
    match ctx {
        // "Edge negation is not defined" in the source; reuses the closed
        // error taxonomy's MultipleEdgeTypes rather than adding a sixth
        // error variant for this one unreachable-via-the-builder case.
        Context::Edge => {
            tracing::warn!("rejecting negation in edge context");
            Err(Report::new(NeopathError::MultipleEdgeTypes)
                .attach(ctx!("algebra - negation is not defined in edge context")))
        }
        Context::Node => {
            let lowered = inner.lower(var, ctx)?;
            let body = if !lowered.inline.is_empty() {
                format!("{var}{}", lowered.inline)
            } else {
                lowered.where_fragment
            };
            Ok(Lowered::where_only(format!("NOT ({body})")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(name: &'static str, labels: &[&str]) -> Arc<NodeSchema> {
        Arc::new(NodeSchema::new(name, labels.iter().map(|s| s.to_string()).collect()).unwrap())
    }

    #[test]
    fn and_of_raw_labels_flattens_and_dedups_inline() {
        let expr = Expr::and([Expr::leaf("A"), Expr::leaf("B")]) & Expr::leaf("A");
        let lowered = expr.lower("n", Context::Node).unwrap();
        assert_eq!(lowered.inline, ":A:B");
        assert!(lowered.where_fragment.is_empty());
    }

    #[test]
    fn node_schema_leaf_lowers_to_sorted_labels() {
        let two_node = schema("TwoNode", &["Two", "Node"]);
        let expr = Expr::leaf(two_node);
        let lowered = expr.lower("q", Context::Node).unwrap();
        assert_eq!(lowered.inline, ":Node:Two");
    }

    #[test]
    fn or_in_node_context_is_where_only() {
        let expr = Expr::leaf("A") | Expr::leaf("B");
        let lowered = expr.lower("n", Context::Node).unwrap();
        assert!(lowered.inline.is_empty());
        assert_eq!(lowered.where_fragment, "n:A OR n:B");
    }

    #[test]
    fn conjunction_of_distinct_edge_types_is_rejected() {
        let expr = Expr::leaf("SomeEdge") & Expr::leaf("OtherEdge");
        let err = expr.lower("e", Context::Edge).unwrap_err();
        assert!(matches!(
            err.current_context(),
            NeopathError::MultipleEdgeTypes
        ));
    }

    #[test]
    fn disjunction_of_edge_types_is_inline() {
        let expr = Expr::leaf("KNOWS") | Expr::leaf("LIKES");
        let lowered = expr.lower("e", Context::Edge).unwrap();
        assert_eq!(lowered.inline, ":KNOWS|:LIKES");
    }

    #[test]
    fn nested_negation_in_edge_conjunction_is_rejected() {
        let expr = Expr::and([!Expr::leaf("A"), Expr::leaf("A")]);
        let err = expr.lower("e", Context::Edge).unwrap_err();
        assert!(matches!(
            err.current_context(),
            NeopathError::MultipleEdgeTypes
        ));
    }

    #[test]
    fn nested_negation_in_edge_disjunction_is_rejected() {
        let expr = Expr::or([!Expr::leaf("A"), Expr::leaf("B")]);
        let err = expr.lower("e", Context::Edge).unwrap_err();
        assert!(matches!(
            err.current_context(),
            NeopathError::MultipleEdgeTypes
        ));
    }
}
