//! Implementation of the list() builtin function.

use crate::{args::ArgValues, exception::RunResult, value::Value};

/// Materializes an iterable into a new list. Draining an iterator leaves it exhausted.
pub fn list(iterable: &Value) -> RunResult<Value> {
    iterable.py_list().map(Value::list)
}

/// Implementation of the list() builtin function.
pub fn builtin_list(args: ArgValues) -> RunResult<Value> {
    match args {
        ArgValues::Empty => Ok(Value::list(Vec::new())),
        args => list(&args.get_one_arg("list")?),
    }
}
