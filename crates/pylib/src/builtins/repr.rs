//! Implementation of the repr() builtin function.

use crate::{args::ArgValues, exception::RunResult, value::Value};

/// Printable representation of a value, as the interactive prompt would show it.
#[must_use]
pub fn repr(value: &Value) -> String {
    value.py_repr()
}

/// Implementation of the repr() builtin function.
pub fn builtin_repr(args: ArgValues) -> RunResult<Value> {
    let value = args.get_one_arg("repr")?;
    Ok(Value::Str(repr(&value)))
}
