//! Implementation of the len() builtin function.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

/// Number of elements in a sized value.
///
/// Sized means str (characters), bytes, list, tuple, dict, range, or an instance whose type
/// declares `__len__`. Anything else raises `TypeError`.
pub fn len(value: &Value) -> RunResult<usize> {
    value.py_len()
}

/// Implementation of the len() builtin function.
pub fn builtin_len(args: ArgValues) -> RunResult<Value> {
    let value = args.get_one_arg("len")?;
    let count = len(&value)?;
    i64::try_from(count)
        .map(Value::Int)
        .map_err(|_| ExcType::overflow_error("len() result does not fit in an int"))
}
