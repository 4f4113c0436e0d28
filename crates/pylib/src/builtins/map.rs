//! Implementation of the map() builtin function.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    types::PyIter,
    value::Value,
};

/// Lazily applies `function` to elements drawn in parallel from each iterable.
///
/// The function runs exactly once per produced element; iteration stops at the shortest input.
pub fn map(function: Value, iterables: &[Value]) -> RunResult<PyIter> {
    if iterables.is_empty() {
        return Err(ExcType::type_error("map() must have at least two arguments."));
    }
    let inners = iterables.iter().map(Value::py_iter).collect::<RunResult<Vec<_>>>()?;
    Ok(PyIter::map(function, inners))
}

/// Implementation of the map() builtin function.
pub fn builtin_map(args: ArgValues) -> RunResult<Value> {
    let (positional, kwargs) = args.into_parts();
    kwargs.check_empty("map")?;
    let mut positional = positional.into_iter();
    let Some(function) = positional.next() else {
        return Err(ExcType::type_error("map() must have at least two arguments."));
    };
    let iterables: Vec<Value> = positional.collect();
    map(function, &iterables).map(Value::from)
}
