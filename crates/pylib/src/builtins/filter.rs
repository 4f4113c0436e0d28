//! Implementation of the filter() builtin function.

use crate::{args::ArgValues, exception::RunResult, types::PyIter, value::Value};

/// Lazily keeps the elements for which `predicate` returns a truthy value.
///
/// The predicate runs exactly once per source element. `None` keeps truthy elements.
pub fn filter(predicate: Option<Value>, iterable: &Value) -> RunResult<PyIter> {
    Ok(PyIter::filter(predicate, iterable.py_iter()?))
}

/// Implementation of the filter() builtin function.
pub fn builtin_filter(args: ArgValues) -> RunResult<Value> {
    let (predicate, iterable) = args.get_two_args("filter")?;
    let predicate = match predicate {
        Value::None => None,
        callable => Some(callable),
    };
    filter(predicate, &iterable).map(Value::from)
}
