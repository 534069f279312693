//! The fluent query builder.
//!
//! `QueryCore` holds the immutable chain and its attached conditions and
//! enforces the well-formedness state machine from a pure-Rust surface;
//! `Query` is the `pyo3` wrapper consumed from Python, converting the
//! polymorphic `ident`/`where` arguments via `pybind` and the final error
//! boundary via `IntoPyResult`.

use error_stack::Report;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::algebra::Expr;
use crate::chain::{Direction, EdgeSegment, Hops, NodeSegment, Segment};
use crate::conditions::Condition;
use crate::ctx;
use crate::errors::{BadQueryRule, IntoPyResult, NeopathError, NeopathResult};
use crate::pybind::{python_to_condition, python_to_expr, PyCondition};
use crate::render;
use crate::utils::validate_variable_name;

/// Chain well-formedness state, derived from the segment count so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Empty,
    /// Last segment is a node.
    Odd,
    /// Last segment is an edge.
    Even,
}

fn state_of(segments: &[Segment]) -> State {
    match segments.len() {
        0 => State::Empty,
        n if n % 2 == 1 => State::Odd,
        _ => State::Even,
    }
}

fn bad_query(rule: BadQueryRule, site: &str) -> Report<NeopathError> {
    tracing::warn!(rule = ?rule, site, "rejecting out-of-order fluent call");
    Report::new(NeopathError::BadQuery { rule }).attach(ctx!(site))
}

/// The immutable chain plus its conditions. Every builder method below
/// returns a fresh value; the chain before an offending call stays valid.
#[derive(Debug, Clone, Default)]
pub struct QueryCore {
    segments: Vec<Segment>,
    conditions: Vec<(usize, Condition)>,
}

impl QueryCore {
    pub fn new() -> Self {
        QueryCore::default()
    }

    fn checked_var(var: Option<String>) -> NeopathResult<Option<String>> {
        if let Some(name) = &var {
            validate_variable_name(name)
                .map_err(|e| Report::new(e).attach(ctx!("query - variable name")))?;
        }
        Ok(var)
    }

    fn with_node(&self, ident: Expr, var: Option<String>, direction: Direction) -> NeopathResult<Self> {
        let var = Self::checked_var(var)?;
        let mut segments = self.segments.clone();
        segments.push(Segment::Node(NodeSegment { var, ident, direction }));
        Ok(QueryCore { segments, conditions: self.conditions.clone() })
    }

    fn with_edge(&self, ident: Expr, var: Option<String>, hops: Hops) -> NeopathResult<Self> {
        let var = Self::checked_var(var)?;
        let mut segments = self.segments.clone();
        segments.push(Segment::Edge(EdgeSegment { var, ident, hops }));
        Ok(QueryCore { segments, conditions: self.conditions.clone() })
    }

    pub fn match_(&self, ident: impl Into<Expr>, var: Option<String>) -> NeopathResult<Self> {
        match state_of(&self.segments) {
            State::Empty => self.with_node(ident.into(), var, Direction::None),
            State::Odd | State::Even => {
                Err(bad_query(BadQueryRule::DoubleMatch, "query - match"))
            }
        }
    }

    fn append_node(&self, ident: Expr, var: Option<String>, direction: Direction) -> NeopathResult<Self> {
        match state_of(&self.segments) {
            State::Empty => Err(bad_query(BadQueryRule::StartWithMatch, "query - node append")),
            State::Odd => Err(bad_query(BadQueryRule::EdgeBeforeNode, "query - node append")),
            State::Even => self.with_node(ident, var, direction),
        }
    }

    pub fn to(&self, ident: impl Into<Expr>, var: Option<String>) -> NeopathResult<Self> {
        self.append_node(ident.into(), var, Direction::Right)
    }

    pub fn by(&self, ident: impl Into<Expr>, var: Option<String>) -> NeopathResult<Self> {
        self.append_node(ident.into(), var, Direction::Left)
    }

    pub fn with_node_segment(&self, ident: impl Into<Expr>, var: Option<String>) -> NeopathResult<Self> {
        self.append_node(ident.into(), var, Direction::None)
    }

    pub fn connected_through(
        &self,
        ident: impl Into<Expr>,
        var: Option<String>,
        min_hops: Option<u64>,
        max_hops: Option<u64>,
    ) -> NeopathResult<Self> {
        match state_of(&self.segments) {
            State::Empty => Err(bad_query(BadQueryRule::StartWithMatch, "query - connected_through")),
            State::Even => Err(bad_query(BadQueryRule::EdgeAfterEdge, "query - connected_through")),
            State::Odd => self.with_edge(ident.into(), var, Hops { min: min_hops, max: max_hops }),
        }
    }

    pub fn where_(&self, condition: impl Into<Condition>) -> NeopathResult<Self> {
        match state_of(&self.segments) {
            State::Empty => Err(bad_query(BadQueryRule::StartWithMatch, "query - where")),
            State::Odd | State::Even => {
                let index = self.segments.len() - 1;
                let mut conditions = self.conditions.clone();
                conditions.push((index, condition.into()));
                Ok(QueryCore { segments: self.segments.clone(), conditions })
            }
        }
    }

    pub fn render(&self) -> NeopathResult<render::Rendered> {
        render::render(&self.segments, &self.conditions)
    }
}

/// The `pyo3`-visible builder. Every method takes `&self` and returns a
/// fresh `Query`, matching the core's immutable-chain semantics.
#[pyclass(name = "Query")]
#[derive(Clone, Debug, Default)]
pub struct Query {
    core: QueryCore,
}

#[pymethods]
impl Query {
    #[new]
    fn new() -> Self {
        Query::default()
    }

    #[pyo3(signature = (ident, var=None))]
    fn r#match(&self, ident: &Bound<'_, PyAny>, var: Option<String>) -> PyResult<Query> {
        let expr = python_to_expr(ident).into_py_result()?;
        self.core.match_(expr, var).map(|core| Query { core }).into_py_result()
    }

    #[pyo3(signature = (ident, var=None))]
    fn to(&self, ident: &Bound<'_, PyAny>, var: Option<String>) -> PyResult<Query> {
        let expr = python_to_expr(ident).into_py_result()?;
        self.core.to(expr, var).map(|core| Query { core }).into_py_result()
    }

    #[pyo3(signature = (ident, var=None))]
    fn by(&self, ident: &Bound<'_, PyAny>, var: Option<String>) -> PyResult<Query> {
        let expr = python_to_expr(ident).into_py_result()?;
        self.core.by(expr, var).map(|core| Query { core }).into_py_result()
    }

    #[pyo3(name = "with_", signature = (ident, var=None))]
    fn with_py(&self, ident: &Bound<'_, PyAny>, var: Option<String>) -> PyResult<Query> {
        let expr = python_to_expr(ident).into_py_result()?;
        self.core.with_node_segment(expr, var).map(|core| Query { core }).into_py_result()
    }

    #[pyo3(signature = (ident, var=None, min_hops=None, max_hops=None))]
    fn connected_through(
        &self,
        ident: &Bound<'_, PyAny>,
        var: Option<String>,
        min_hops: Option<u64>,
        max_hops: Option<u64>,
    ) -> PyResult<Query> {
        let expr = python_to_expr(ident).into_py_result()?;
        self.core
            .connected_through(expr, var, min_hops, max_hops)
            .map(|core| Query { core })
            .into_py_result()
    }

    #[pyo3(name = "where_", signature = (*conditions))]
    fn where_py(&self, conditions: Vec<Bound<'_, PyAny>>) -> PyResult<Query> {
        let mut core = self.core.clone();
        for condition in &conditions {
            let condition = python_to_condition(condition).into_py_result()?;
            core = core.where_(condition).into_py_result()?;
        }
        Ok(Query { core })
    }

    /// Renders the finished chain to a `(cypher, params)` pair.
    fn render(&self, py: Python<'_>) -> PyResult<(String, Py<PyDict>)> {
        let rendered = self.core.render().into_py_result()?;
        let params = PyDict::new(py);
        for (name, value) in rendered.params {
            params.set_item(name, value)?;
        }
        Ok((rendered.query, params.into()))
    }
}

impl From<PyCondition> for Condition {
    fn from(value: PyCondition) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AnyProp, NodeSchema, PropComparisons};
    use crate::value::Value;
    use std::sync::Arc;
    use tracing_test::{logs_contain, traced_test};

    #[test]
    fn empty_label_on_fresh_chain_allocates_a_variable() {
        let query = QueryCore::new().match_("", None).unwrap();
        let rendered = query.render().unwrap();
        assert_eq!(rendered.query, "MATCH (_a)\nRETURN _a");
        assert!(rendered.params.is_empty());
    }

    #[test]
    fn raw_label_with_explicit_variable() {
        let query = QueryCore::new().match_("SomeLabel", Some("var".to_string())).unwrap();
        let rendered = query.render().unwrap();
        assert_eq!(rendered.query, "MATCH (var:SomeLabel)\nRETURN var");
    }

    #[test]
    fn schema_reference_lowers_to_sorted_labels() {
        let schema = Arc::new(
            NodeSchema::new("TwoNode", vec!["Two".to_string(), "Node".to_string()]).unwrap(),
        );
        let query = QueryCore::new().match_(schema, Some("q".to_string())).unwrap();
        let rendered = query.render().unwrap();
        assert_eq!(rendered.query, "MATCH (q:Node:Two)\nRETURN q");
    }

    #[test]
    fn raw_where_fragments_join_with_and() {
        let query = QueryCore::new()
            .match_("", Some("a".to_string()))
            .unwrap()
            .where_("exists(a.name)")
            .unwrap()
            .where_("a.age = 2")
            .unwrap();
        let rendered = query.render().unwrap();
        assert_eq!(
            rendered.query,
            "MATCH (a)\nWHERE exists(a.name)\n  AND a.age = 2\nRETURN a"
        );
    }

    #[test]
    fn four_edge_chain_with_mixed_hops_matches_the_documented_shape() {
        let query = QueryCore::new()
            .match_("", None)
            .unwrap()
            .connected_through("", None, Some(1), None)
            .unwrap()
            .with_node_segment("", None)
            .unwrap()
            .connected_through("", None, None, Some(3))
            .unwrap()
            .with_node_segment("", None)
            .unwrap()
            .connected_through("", None, Some(1), Some(3))
            .unwrap()
            .with_node_segment("", None)
            .unwrap()
            .connected_through("", None, None, None)
            .unwrap()
            .with_node_segment("", None)
            .unwrap();

        let rendered = query.render().unwrap();
        assert_eq!(
            rendered.query,
            "MATCH _d = (_a)-[*1..]->(_e),\n      _h = (_e)-[*..3]->(_i),\n      \
             _l = (_i)-[*1..3]->(_m),\n      (_m)-[_n]->(_o)\n\
             WITH *, relationships(_d) AS _b, nodes(_d)[1..-1] AS _c,\n        \
             relationships(_h) AS _f, nodes(_h)[1..-1] AS _g,\n        \
             relationships(_l) AS _j, nodes(_l)[1..-1] AS _k\n\
             RETURN _a, _b, _c, _e, _f, _g, _i, _j, _k, _m, _n, _o"
        );
    }

    #[test]
    fn schema_property_comparisons_render_string_and_int_params() {
        let schema = Arc::new(NodeSchema::new("SomeNode", vec![]).unwrap());
        let attr = AnyProp::new("SomeNode", "name");

        let query = QueryCore::new()
            .match_(schema, Some("f".to_string()))
            .unwrap()
            .where_(attr.eq(2i64))
            .unwrap()
            .where_("exists(f.something)")
            .unwrap()
            .where_(attr.ne("2"))
            .unwrap();

        let rendered = query.render().unwrap();
        assert_eq!(
            rendered.query,
            "MATCH (f:SomeNode)\nWHERE f.name = $a\n  AND exists(f.something)\n  AND f.name <> $b\nRETURN f"
        );
        assert_eq!(
            rendered.params,
            vec![
                ("a".to_string(), Value::Int(2)),
                ("b".to_string(), Value::String("2".to_string())),
            ]
        );
    }

    #[test]
    fn double_edge_is_rejected() {
        let result = QueryCore::new()
            .match_("", None)
            .unwrap()
            .connected_through("", None, None, None)
            .unwrap()
            .connected_through("", None, None, None);
        let err = result.unwrap_err();
        assert!(matches!(
            err.current_context(),
            NeopathError::BadQuery { rule: BadQueryRule::EdgeAfterEdge }
        ));
    }

    #[test]
    fn second_match_is_rejected() {
        let result = QueryCore::new().match_("", None).unwrap().match_("", None);
        assert!(matches!(
            result.unwrap_err().current_context(),
            NeopathError::BadQuery { rule: BadQueryRule::DoubleMatch }
        ));
    }

    #[test]
    fn node_right_after_node_is_rejected() {
        let result = QueryCore::new().to("", None);
        assert!(matches!(
            result.unwrap_err().current_context(),
            NeopathError::BadQuery { rule: BadQueryRule::StartWithMatch }
        ));
    }

    #[traced_test]
    #[test]
    fn rejected_fluent_call_is_logged() {
        let result = QueryCore::new().to("", None);
        assert!(result.is_err());
        assert!(logs_contain("rejecting out-of-order fluent call"));
    }
}
