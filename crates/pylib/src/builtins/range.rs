//! Implementation of the range() builtin function.

use crate::{args::ArgValues, exception::RunResult, types::Range, value::Value};

/// `range(start, stop, step)`; a zero step raises `ValueError`.
pub fn range(start: i64, stop: i64, step: i64) -> RunResult<Range> {
    Range::new(start, stop, step)
}

/// Implementation of the range() builtin function.
///
/// Accepts `range(stop)`, `range(start, stop)` and `range(start, stop, step)`.
pub fn builtin_range(args: ArgValues) -> RunResult<Value> {
    let (first, second, third) = args.get_one_to_three_args("range")?;
    let result = match (second, third) {
        (None, _) => Range::from_stop(first.as_int()?),
        (Some(stop), None) => range(first.as_int()?, stop.as_int()?, 1)?,
        (Some(stop), Some(step)) => range(first.as_int()?, stop.as_int()?, step.as_int()?)?,
    };
    Ok(Value::Range(result))
}
