//! Implementation of the reversed() builtin function.

use crate::{args::ArgValues, exception::RunResult, types::PyIter, value::Value};

/// Iterates a sized sequence from its last element to its first.
///
/// Lists, tuples, strings, bytes, ranges and dicts (keys) are reversible, as are instances
/// declaring `__reversed__`. One-shot iterators raise `TypeError`.
pub fn reversed(sequence: &Value) -> RunResult<PyIter> {
    PyIter::reversed(sequence)
}

/// Implementation of the reversed() builtin function.
pub fn builtin_reversed(args: ArgValues) -> RunResult<Value> {
    let sequence = args.get_one_arg("reversed")?;
    reversed(&sequence).map(Value::from)
}
