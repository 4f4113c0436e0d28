//! Implementation of the all() builtin function.

use crate::{args::ArgValues, exception::RunResult, value::Value};

/// True if every element is truthy; stops at the first falsy one. Empty → true.
pub fn all(iterable: &Value) -> RunResult<bool> {
    let mut iter = iterable.py_iter()?;
    while let Some(item) = iter.for_next()? {
        if !item.py_bool()? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Implementation of the all() builtin function.
pub fn builtin_all(args: ArgValues) -> RunResult<Value> {
    let iterable = args.get_one_arg("all")?;
    all(&iterable).map(Value::Bool)
}
