//! The `pyo3` surface for schema declaration and label/condition building.
//!
//! Mirrors the source's dynamic class declarations (`neopath.Node`,
//! `neopath.Edge`, `neopath.Attr` subclasses): each Python-facing wrapper
//! here is a thin handle around the corresponding core type, built once at
//! declaration time via the `_dynamic` constructors in `schema`.

use std::sync::Arc;

use error_stack::{Report, ResultExt};
use pyo3::prelude::*;
use pyo3::types::PyString;

use crate::algebra::Expr;
use crate::conditions::Condition;
use crate::ctx;
use crate::errors::{IntoPyResult, NeopathError, NeopathResult};
use crate::schema::{DynProp, EdgeSchema, NodeSchema, PropComparisons};
use crate::value::{Value, ValueKind};

/// A label/type expression, built from raw strings and schema handles with
/// `&`, `|`, `^`, `~`.
#[pyclass(name = "Label")]
#[derive(Clone, Debug)]
pub struct PyLabel(pub Expr);

#[pymethods]
impl PyLabel {
    #[staticmethod]
    fn raw(label: String) -> Self {
        PyLabel(Expr::leaf(label))
    }

    fn __and__(&self, other: &PyLabel) -> PyLabel {
        PyLabel(self.0.clone() & other.0.clone())
    }

    fn __or__(&self, other: &PyLabel) -> PyLabel {
        PyLabel(self.0.clone() | other.0.clone())
    }

    fn __xor__(&self, other: &PyLabel) -> PyLabel {
        PyLabel(self.0.clone() ^ other.0.clone())
    }

    fn __invert__(&self) -> PyLabel {
        PyLabel(!self.0.clone())
    }
}

/// A declared node schema: a canonical, immutable label set.
#[pyclass(name = "NodeSchema")]
#[derive(Clone, Debug)]
pub struct PyNodeSchema(pub Arc<NodeSchema>);

#[pymethods]
impl PyNodeSchema {
    #[new]
    #[pyo3(signature = (name, labels=vec![]))]
    fn new(name: String, labels: Vec<String>) -> PyResult<Self> {
        NodeSchema::new_dynamic(name, labels)
            .map(|schema| PyNodeSchema(Arc::new(schema)))
            .into_py_result()
    }

    fn prop(&self, prop_name: String, kind: Option<String>) -> PyResult<PyProp> {
        make_prop(self.0.name, prop_name, kind)
    }

    fn __and__(&self, other: &PyLabel) -> PyLabel {
        PyLabel(Expr::leaf(self.0.clone()) & other.0.clone())
    }

    fn __or__(&self, other: &PyLabel) -> PyLabel {
        PyLabel(Expr::leaf(self.0.clone()) | other.0.clone())
    }

    fn __xor__(&self, other: &PyLabel) -> PyLabel {
        PyLabel(Expr::leaf(self.0.clone()) ^ other.0.clone())
    }

    fn __invert__(&self) -> PyLabel {
        PyLabel(!Expr::leaf(self.0.clone()))
    }
}

/// A declared edge schema: a single, immutable relationship type.
#[pyclass(name = "EdgeSchema")]
#[derive(Clone, Debug)]
pub struct PyEdgeSchema(pub Arc<EdgeSchema>);

#[pymethods]
impl PyEdgeSchema {
    #[new]
    #[pyo3(signature = (name, r#type=None))]
    fn new(name: String, r#type: Option<String>) -> PyResult<Self> {
        EdgeSchema::new_dynamic(name, r#type)
            .map(|schema| PyEdgeSchema(Arc::new(schema)))
            .into_py_result()
    }

    fn prop(&self, prop_name: String, kind: Option<String>) -> PyResult<PyProp> {
        make_prop(self.0.name, prop_name, kind)
    }

    fn __and__(&self, other: &PyLabel) -> PyLabel {
        PyLabel(Expr::leaf(self.0.clone()) & other.0.clone())
    }

    fn __or__(&self, other: &PyLabel) -> PyLabel {
        PyLabel(Expr::leaf(self.0.clone()) | other.0.clone())
    }

    fn __xor__(&self, other: &PyLabel) -> PyLabel {
        PyLabel(Expr::leaf(self.0.clone()) ^ other.0.clone())
    }

    fn __invert__(&self) -> PyLabel {
        PyLabel(!Expr::leaf(self.0.clone()))
    }
}

/// A typed property descriptor declared on a node or edge schema.
#[pyclass(name = "Prop")]
#[derive(Clone, Debug)]
pub struct PyProp(pub DynProp);

#[pymethods]
impl PyProp {
    fn eq(&self, value: &Bound<PyAny>) -> PyResult<PyCondition> {
        Ok(PyCondition(self.0.eq(Value::from_py(value).into_py_result()?)))
    }

    fn ne(&self, value: &Bound<PyAny>) -> PyResult<PyCondition> {
        Ok(PyCondition(self.0.ne(Value::from_py(value).into_py_result()?)))
    }

    fn starts_with(&self, value: &Bound<PyAny>) -> PyResult<PyCondition> {
        Ok(PyCondition(self.0.starts_with(Value::from_py(value).into_py_result()?)))
    }

    fn exists(&self) -> PyCondition {
        PyCondition(self.0.exists())
    }

    fn is_null(&self) -> PyCondition {
        PyCondition(self.0.is_null())
    }
}

fn make_prop(owner: &'static str, prop_name: String, kind: Option<String>) -> PyResult<PyProp> {
    let kind = match kind.as_deref() {
        None => None,
        Some("str") => Some(ValueKind::String),
        Some("int") => Some(ValueKind::Int),
        Some("float") => Some(ValueKind::Float),
        Some("bool") => Some(ValueKind::Bool),
        Some(other) => {
            return Err(NeopathError::InvalidIdentifier {
                name: other.to_string(),
                reason: "unknown property kind, expected one of str/int/float/bool".to_string(),
            }
            .into());
        }
    };
    Ok(PyProp(DynProp::new(owner.to_string(), prop_name, kind)))
}

/// A predicate condition, attachable to the most recently appended segment.
#[pyclass(name = "Condition")]
#[derive(Clone, Debug)]
pub struct PyCondition(pub Condition);

#[pymethods]
impl PyCondition {
    fn __invert__(&self) -> PyCondition {
        PyCondition(!self.0.clone())
    }
}

/// Converts the polymorphic `ident` argument the builder accepts — a raw
/// string, a schema handle, or a label expression — into the core `Expr`.
pub(crate) fn python_to_expr(obj: &Bound<PyAny>) -> NeopathResult<Expr> {
    if let Ok(label) = obj.extract::<PyLabel>() {
        return Ok(label.0);
    }
    if let Ok(node) = obj.extract::<PyNodeSchema>() {
        return Ok(Expr::leaf(node.0));
    }
    if let Ok(edge) = obj.extract::<PyEdgeSchema>() {
        return Ok(Expr::leaf(edge.0));
    }
    if obj.is_instance_of::<PyString>() {
        let s: String = obj
            .extract()
            .map_err(|e: PyErr| Report::new(e.into()))
            .attach(ctx!("pybind - ident string"))?;
        return Ok(Expr::leaf(s));
    }

    Err(Report::new(NeopathError::PythonError {
        message: format!(
            "expected a string, schema or Label expression, got '{}'",
            obj.get_type().name().map(|n| n.to_string()).unwrap_or_else(|_| "<unknown>".to_string())
        ),
    })
    .attach(ctx!("pybind - python_to_expr")))
}

/// Converts the polymorphic `where` argument — a raw fragment string or a
/// `Condition` built from a property descriptor — into the core `Condition`.
pub(crate) fn python_to_condition(obj: &Bound<PyAny>) -> NeopathResult<Condition> {
    if let Ok(cond) = obj.extract::<PyCondition>() {
        return Ok(cond.0);
    }
    if obj.is_instance_of::<PyString>() {
        let s: String = obj
            .extract()
            .map_err(|e: PyErr| Report::new(e.into()))
            .attach(ctx!("pybind - condition string"))?;
        return Ok(Condition::raw(s));
    }

    Err(Report::new(NeopathError::PythonError {
        message: format!(
            "expected a string or Condition, got '{}'",
            obj.get_type().name().map(|n| n.to_string()).unwrap_or_else(|_| "<unknown>".to_string())
        ),
    })
    .attach(ctx!("pybind - python_to_condition")))
}
