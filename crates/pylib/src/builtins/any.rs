//! Implementation of the any() builtin function.

use crate::{args::ArgValues, exception::RunResult, value::Value};

/// True if some element is truthy; stops at the first truthy one. Empty → false.
pub fn any(iterable: &Value) -> RunResult<bool> {
    let mut iter = iterable.py_iter()?;
    while let Some(item) = iter.for_next()? {
        if item.py_bool()? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Implementation of the any() builtin function.
pub fn builtin_any(args: ArgValues) -> RunResult<Value> {
    let iterable = args.get_one_arg("any")?;
    any(&iterable).map(Value::Bool)
}
