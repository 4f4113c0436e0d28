//! Implementation of the slice() builtin function.

use crate::{args::ArgValues, exception::RunResult, types::Slice, value::Value};

/// `slice(stop)`, `slice(start, stop)` or `slice(start, stop, step)`.
///
/// Bounds are checked lazily: a zero step only fails once the slice is applied.
#[must_use]
pub fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Slice {
    Slice::new(start, stop, step)
}

/// Implementation of the slice() builtin function.
pub fn builtin_slice(args: ArgValues) -> RunResult<Value> {
    let (first, second, third) = args.get_one_to_three_args("slice")?;
    let bound = |v: Option<Value>| -> RunResult<Option<i64>> {
        match v {
            None | Some(Value::None) => Ok(None),
            Some(v) => v.as_int().map(Some),
        }
    };
    let result = match second {
        None => slice(None, bound(Some(first))?, None),
        Some(stop) => slice(bound(Some(first))?, bound(Some(stop))?, bound(third)?),
    };
    Ok(Value::Slice(result))
}
