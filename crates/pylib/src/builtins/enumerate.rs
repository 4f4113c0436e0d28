//! Implementation of the enumerate() builtin function.

use crate::{args::ArgValues, exception::RunResult, types::PyIter, value::Value};

/// Lazy `(index, value)` pairs, counting from `start`.
pub fn enumerate(iterable: &Value, start: i64) -> RunResult<PyIter> {
    Ok(PyIter::enumerate(iterable.py_iter()?, start))
}

/// Implementation of the enumerate() builtin function.
pub fn builtin_enumerate(args: ArgValues) -> RunResult<Value> {
    let (iterable, start) = args.get_one_two_args_with_keyword("enumerate", "start")?;
    let start = match start {
        Some(v) => v.as_int()?,
        None => 0,
    };
    enumerate(&iterable, start).map(Value::from)
}
