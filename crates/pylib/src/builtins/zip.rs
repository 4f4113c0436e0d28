//! Implementation of the zip() builtin function.

use crate::{args::ArgValues, exception::RunResult, types::PyIter, value::Value};

/// Lazily pairs up elements from each iterable.
///
/// Stops as soon as any input is exhausted; inputs after the exhausted one are not advanced
/// for that round. With no inputs the result is immediately exhausted.
pub fn zip(iterables: &[Value]) -> RunResult<PyIter> {
    let inners = iterables.iter().map(Value::py_iter).collect::<RunResult<Vec<_>>>()?;
    Ok(PyIter::zip(inners))
}

/// Implementation of the zip() builtin function.
pub fn builtin_zip(args: ArgValues) -> RunResult<Value> {
    let (iterables, kwargs) = args.into_parts();
    kwargs.check_empty("zip")?;
    zip(&iterables).map(Value::from)
}
