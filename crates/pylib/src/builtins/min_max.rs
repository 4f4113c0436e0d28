//! Implementation of the min() and max() builtin functions.

use std::cmp::Ordering;

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

/// Smallest item of an iterable, or `default` when it is empty.
///
/// With `key`, items are compared by `key(item)`, called once per item. Among equal items the
/// first wins.
pub fn min(iterable: &Value, key: Option<&Value>, default: Option<Value>) -> RunResult<Value> {
    extreme(iterable, key, default, "min", Ordering::Less)
}

/// Largest item of an iterable, or `default` when it is empty.
///
/// With `key`, items are compared by `key(item)`, called once per item. Among equal items the
/// first wins.
pub fn max(iterable: &Value, key: Option<&Value>, default: Option<Value>) -> RunResult<Value> {
    extreme(iterable, key, default, "max", Ordering::Greater)
}

/// Keeps the first item whose key compares as `wanted` against every earlier best.
fn extreme(
    iterable: &Value,
    key: Option<&Value>,
    default: Option<Value>,
    func_name: &str,
    wanted: Ordering,
) -> RunResult<Value> {
    let key = key.filter(|func| !matches!(func, Value::None));
    let key_of = |item: &Value| match key {
        Some(func) => func.call(std::slice::from_ref(item)),
        None => Ok(item.clone()),
    };

    let mut iter = iterable.py_iter()?;
    let Some(mut best) = iter.for_next()? else {
        return default.ok_or_else(|| ExcType::value_error(format!("{func_name}() iterable argument is empty")));
    };
    let mut best_key = key_of(&best)?;
    while let Some(item) = iter.for_next()? {
        let item_key = key_of(&item)?;
        if item_key.py_cmp(&best_key)? == wanted {
            best = item;
            best_key = item_key;
        }
    }
    Ok(best)
}

/// Implementation of the min() builtin function.
///
/// Supports two forms:
/// - `min(iterable, *, key=None, default=...)` - smallest item from the iterable
/// - `min(arg1, arg2, *args, key=None)` - smallest of the arguments
pub fn builtin_min(args: ArgValues) -> RunResult<Value> {
    builtin_min_max(args, "min")
}

/// Implementation of the max() builtin function.
///
/// Supports two forms:
/// - `max(iterable, *, key=None, default=...)` - largest item from the iterable
/// - `max(arg1, arg2, *args, key=None)` - largest of the arguments
pub fn builtin_max(args: ArgValues) -> RunResult<Value> {
    builtin_min_max(args, "max")
}

fn builtin_min_max(args: ArgValues, func_name: &str) -> RunResult<Value> {
    let (positional, mut kwargs) = args.into_parts();
    let key = kwargs.take("key");
    let default = kwargs.take("default");
    kwargs.check_empty(func_name)?;

    let pick: fn(&Value, Option<&Value>, Option<Value>) -> RunResult<Value> =
        if func_name == "min" { min } else { max };
    match positional.len() {
        0 => Err(ExcType::type_error(format!(
            "{func_name}() expected at least 1 argument, got 0"
        ))),
        1 => pick(&positional[0], key.as_ref(), default),
        _ if default.is_some() => Err(ExcType::type_error(format!(
            "Cannot specify a default for {func_name}() with multiple positional arguments"
        ))),
        _ => pick(&Value::Tuple(positional), key.as_ref(), None),
    }
}
