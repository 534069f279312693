//! Error types for the neopath library.
//!
//! Every fallible path in the compiler returns `NeopathResult<T>`
//! (`error_stack::Result<T, NeopathError>`), gaining a context breadcrumb via
//! `.attach(ctx!(...))` at each boundary. The `#[pymethods]` surface converts
//! to `PyErr` at the very edge, via `IntoPyResult`, so the core stays usable
//! from pure Rust without ever touching `pyo3`.

use error_stack::Report;
use pyo3::{exceptions, PyErr};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Result alias used throughout the crate's core (non-pyo3) modules.
pub type NeopathResult<T> = error_stack::Result<T, NeopathError>;

/// The rule violated by an out-of-order fluent call.
///
/// The variant names are the short codes from the design; [`Display`]
/// produces the stable message text the caller should match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadQueryRule {
    /// A fluent call other than `match` was the first call on the chain.
    StartWithMatch,
    /// `match` was called more than once on the same chain.
    DoubleMatch,
    /// `to`/`by`/`with_` was called right after another node segment.
    EdgeBeforeNode,
    /// `connected_through` was called right after another edge segment.
    EdgeAfterEdge,
}

impl BadQueryRule {
    fn message(self) -> &'static str {
        match self {
            BadQueryRule::StartWithMatch => "A query must start with match",
            BadQueryRule::DoubleMatch => "A query can not have more than one match",
            BadQueryRule::EdgeBeforeNode => "Node can not exist right after another node",
            BadQueryRule::EdgeAfterEdge => "Edge can not exist right after another edge",
        }
    }
}

/// Main error type for the neopath library.
///
/// Mirrors `neopath.exceptions.NeopathException` and its subclasses from the
/// original Python library: every variant maps to one of `BadNodeLabels`,
/// `BadEdgeType`, `BadQuery` or `MultipleEdgeTypes`.
#[derive(Debug, Clone)]
pub enum NeopathError {
    /// Raised at schema-declaration time: `labels` must be a non-empty
    /// iterable of non-empty strings.
    BadNodeLabels { reason: String },
    /// Raised at schema-declaration time: `type` must be a non-empty string.
    BadEdgeType { reason: String },
    /// Raised from the offending fluent call when the chain's state
    /// machine rejects it.
    BadQuery { rule: BadQueryRule },
    /// Raised when a label/type expression conjoins more than one distinct
    /// edge type, or applies a node-only operator (`Not`) in edge context.
    MultipleEdgeTypes,
    /// A user-supplied variable or parameter name fails validation.
    InvalidIdentifier { name: String, reason: String },
    /// Wraps an error surfaced while crossing the `pyo3` boundary.
    PythonError { message: String },
}

impl Display for NeopathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NeopathError::BadNodeLabels { reason } => write!(f, "Bad node labels: {}", reason),
            NeopathError::BadEdgeType { reason } => write!(f, "Bad edge type: {}", reason),
            NeopathError::BadQuery { rule } => write!(f, "{}", rule.message()),
            NeopathError::MultipleEdgeTypes => {
                write!(f, "A segment can not be of more than one edge type")
            }
            NeopathError::InvalidIdentifier { name, reason } => {
                write!(f, "Invalid identifier '{}': {}", name, reason)
            }
            NeopathError::PythonError { message } => write!(f, "Python error: {}", message),
        }
    }
}

impl std::error::Error for NeopathError {}

impl From<NeopathError> for PyErr {
    fn from(err: NeopathError) -> PyErr {
        match err {
            NeopathError::PythonError { .. } => {
                exceptions::PyRuntimeError::new_err(err.to_string())
            }
            NeopathError::BadNodeLabels { .. }
            | NeopathError::BadEdgeType { .. }
            | NeopathError::BadQuery { .. }
            | NeopathError::MultipleEdgeTypes
            | NeopathError::InvalidIdentifier { .. } => {
                exceptions::PyValueError::new_err(err.to_string())
            }
        }
    }
}

impl From<PyErr> for NeopathError {
    fn from(value: PyErr) -> Self {
        NeopathError::PythonError {
            message: value.to_string(),
        }
    }
}

/// Converts an `error_stack::Result` into a plain `PyResult` at the `pyo3`
/// boundary, logging the attached context breadcrumbs before dropping them.
pub trait IntoPyResult<T> {
    fn into_py_result(self) -> PyResult<T>;
}

impl<T> IntoPyResult<T> for NeopathResult<T> {
    fn into_py_result(self) -> PyResult<T> {
        self.map_err(|report: Report<NeopathError>| {
            tracing::warn!(error = %report, "neopath error crossing into Python");
            PyErr::from(report.current_context().clone())
        })
    }
}
