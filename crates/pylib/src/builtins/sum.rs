//! Implementation of the sum() builtin function.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

/// Sums the items of an iterable from left to right, seeded with `start` (default 0).
///
/// An empty iterable returns `start` unchanged. String start values are rejected, as in
/// the guest language.
pub fn sum(iterable: &Value, start: Option<Value>) -> RunResult<Value> {
    let mut accumulator = match start {
        Some(Value::Str(_)) => {
            return Err(ExcType::type_error("sum() can't sum strings [use ''.join(seq) instead]"));
        }
        Some(v) => v,
        None => Value::Int(0),
    };
    let mut iter = iterable.py_iter()?;
    while let Some(item) = iter.for_next()? {
        accumulator = accumulator.py_add(&item)?;
    }
    Ok(accumulator)
}

/// Implementation of the sum() builtin function.
pub fn builtin_sum(args: ArgValues) -> RunResult<Value> {
    let (iterable, start) = args.get_one_two_args_with_keyword("sum", "start")?;
    sum(&iterable, start)
}
