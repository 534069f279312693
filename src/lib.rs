use pyo3::prelude::*;

mod macros;

mod algebra;
mod allocator;
mod chain;
mod conditions;
mod errors;
mod pybind;
mod query;
mod render;
mod schema;
mod utils;
mod value;

pub use errors::NeopathError;
pub use pybind::{PyCondition, PyEdgeSchema, PyLabel, PyNodeSchema, PyProp};
pub use query::Query;

#[pymodule]
fn neopath(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Query>()?;

    m.add_class::<PyLabel>()?;
    m.add_class::<PyNodeSchema>()?;
    m.add_class::<PyEdgeSchema>()?;
    m.add_class::<PyProp>()?;
    m.add_class::<PyCondition>()?;

    Ok(())
}
