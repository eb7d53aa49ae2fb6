//! Native Python backend.
//!
//! Runs the selection directly on `dict` and `list` objects so that values
//! selected in full are the caller's own objects, not copies.

use crate::error::{PathError, QueryError};
use crate::path::{group_by_head, PathSet, Selection};
use pyo3::exceptions::{PyAssertionError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyModule, PyString};
use tracing::{debug, trace};

impl From<QueryError> for PyErr {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Path(path_err) => path_err.into(),
            shape => PyAssertionError::new_err(shape.to_string()),
        }
    }
}

impl From<PathError> for PyErr {
    fn from(err: PathError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

fn get_type_name(bound: &Bound<'_, PyAny>) -> &'static str {
    if bound.is_none() {
        "null"
    } else if bound.is_instance_of::<PyDict>() {
        "record"
    } else if bound.is_instance_of::<PyList>() {
        "list"
    } else if bound.is_instance_of::<PyString>() {
        "string"
    } else {
        "scalar"
    }
}

fn select_dict<'py>(
    py: Python<'py>,
    dict: &Bound<'py, PyDict>,
    paths: &[&[String]],
) -> PyResult<Bound<'py, PyDict>> {
    let out = PyDict::new_bound(py);

    for group in group_by_head(paths) {
        let Some(value) = dict.get_item(group.key)? else {
            continue;
        };

        match group.selection {
            Selection::Full => out.set_item(group.key, value)?,
            Selection::Narrow(rests) => match narrow(py, &value, &rests)? {
                Some(narrowed) => out.set_item(group.key, narrowed)?,
                None => trace!(key = group.key, "cannot narrow into scalar"),
            },
        }
    }

    Ok(out)
}

fn narrow<'py>(
    py: Python<'py>,
    value: &Bound<'py, PyAny>,
    paths: &[&[String]],
) -> PyResult<Option<Bound<'py, PyAny>>> {
    if let Ok(dict) = value.downcast::<PyDict>() {
        return Ok(Some(select_dict(py, dict, paths)?.into_any()));
    }

    if let Ok(list) = value.downcast::<PyList>() {
        let out = PyList::empty_bound(py);
        for item in list.iter() {
            match narrow(py, &item, paths)? {
                Some(narrowed) => out.append(narrowed)?,
                None => out.append(item)?,
            }
        }
        return Ok(Some(out.into_any()));
    }

    Ok(None)
}

#[pyfunction]
#[pyo3(signature = (data, paths, many=false, *, delimiter='.'))]
fn query(
    py: Python<'_>,
    data: PyObject,
    paths: Vec<String>,
    many: bool,
    delimiter: char,
) -> PyResult<PyObject> {
    let bound = data.bind(py);

    if many {
        let list = bound.downcast::<PyList>().map_err(|_| QueryError::ExpectedSequence {
            found: get_type_name(bound),
        })?;
        let mut records = Vec::with_capacity(list.len());
        for (index, item) in list.iter().enumerate() {
            match item.downcast_into::<PyDict>() {
                Ok(dict) => records.push(dict),
                Err(err) => {
                    return Err(QueryError::ElementNotRecord {
                        index,
                        found: get_type_name(err.into_inner().as_any()),
                    }
                    .into())
                }
            }
        }

        let paths = PathSet::parse_with(&paths, delimiter)?;
        debug!(many, paths = paths.len(), "running query");
        let views = paths.views();
        let out = PyList::empty_bound(py);
        for record in &records {
            out.append(select_dict(py, record, &views)?)?;
        }
        return Ok(out.into_any().unbind());
    }

    let dict = bound.downcast::<PyDict>().map_err(|_| QueryError::ExpectedRecord {
        found: get_type_name(bound),
    })?;
    let paths = PathSet::parse_with(&paths, delimiter)?;
    debug!(many, paths = paths.len(), "running query");
    Ok(select_dict(py, dict, &paths.views())?.into_any().unbind())
}

#[pyfunction]
fn backend_name() -> &'static str {
    "rust"
}

#[pymodule]
fn _dictfilter_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(query, module)?)?;
    module.add_function(wrap_pyfunction!(backend_name, module)?)?;
    Ok(())
}
