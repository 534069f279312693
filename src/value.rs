//! Parameter values bound into a rendered query's parameter map.
//!
//! Comparison conditions (`==`, `!=`, `starts_with`) carry the user's
//! right-hand value through to the parameter map unchanged. `Value` is the
//! crate's scalar representation of that value, with a `pyo3` conversion at
//! each edge — the `PropertyMap`/`py_to_rhai` conversion in the teacher
//! crate is the model, simplified here since a query parameter is always a
//! scalar, never a nested list or map.

use error_stack::{Report, ResultExt};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyFloat, PyInt, PyString};
use pyo3::IntoPyObject;

use crate::ctx;
use crate::errors::{NeopathError, NeopathResult};

/// A parameter's right-hand value, scalar and `Clone`-cheap.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// The runtime type tag of a [`Value`], used by property descriptors to
/// express their set of allowed runtime types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Bool,
    Null,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Null => ValueKind::Null,
        }
    }
}

impl Value {
    pub fn from_py(obj: &Bound<PyAny>) -> NeopathResult<Self> {
        if obj.is_none() {
            return Ok(Value::Null);
        }
        // bool must be checked before int: Python's bool is a PyInt subclass.
        if obj.is_instance_of::<PyBool>() {
            let val: bool = obj
                .extract()
                .map_err(|e: PyErr| Report::new(e.into()))
                .attach(ctx!("value - from py bool"))?;
            return Ok(Value::Bool(val));
        }
        if obj.is_instance_of::<PyInt>() {
            let val: i64 = obj
                .extract()
                .map_err(|e: PyErr| Report::new(e.into()))
                .attach(ctx!("value - from py int"))?;
            return Ok(Value::Int(val));
        }
        if obj.is_instance_of::<PyFloat>() {
            let val: f64 = obj
                .extract()
                .map_err(|e: PyErr| Report::new(e.into()))
                .attach(ctx!("value - from py float"))?;
            return Ok(Value::Float(val));
        }
        if obj.is_instance_of::<PyString>() {
            let val: String = obj
                .extract()
                .map_err(|e: PyErr| Report::new(e.into()))
                .attach(ctx!("value - from py string"))?;
            return Ok(Value::String(val));
        }

        Err(Report::new(NeopathError::PythonError {
            message: format!(
                "unsupported parameter value type: {}",
                obj.get_type().name().map(|n| n.to_string()).unwrap_or_else(|_| "<unknown>".to_string())
            ),
        })
        .attach(ctx!("value - from py")))
    }
}

impl<'py> IntoPyObject<'py> for Value {
    type Target = PyAny;
    type Output = Bound<'py, Self::Target>;
    type Error = PyErr;

    fn into_pyobject(self, py: Python<'py>) -> Result<Self::Output, Self::Error> {
        match self {
            Value::String(s) => Ok(s.into_pyobject(py)?.into_any()),
            Value::Int(i) => Ok(i.into_pyobject(py)?.into_any()),
            Value::Float(f) => Ok(f.into_pyobject(py)?.into_any()),
            Value::Bool(b) => Ok(b.into_pyobject(py)?.to_owned().into_any()),
            Value::Null => Ok(py.None().bind(py).clone()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_convert_from_rust() {
        assert_eq!(Value::from(2i64), Value::Int(2));
        assert_eq!(Value::from("2"), Value::String("2".to_string()));
        assert_eq!(Value::from(true), Value::Bool(true));
    }
}
