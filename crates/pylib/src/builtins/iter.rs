//! Implementation of the iter() builtin function.

use crate::{args::ArgValues, exception::RunResult, value::Value};

/// Returns an iterator over `iterable`. An iterator is returned as itself.
pub fn iter(iterable: &Value) -> RunResult<Value> {
    match iterable {
        Value::Iter(_) => Ok(iterable.clone()),
        _ => iterable.py_iter().map(Value::from),
    }
}

/// Implementation of the iter() builtin function.
pub fn builtin_iter(args: ArgValues) -> RunResult<Value> {
    let iterable = args.get_one_arg("iter")?;
    iter(&iterable)
}
