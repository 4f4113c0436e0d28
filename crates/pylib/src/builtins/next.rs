//! Implementation of the next() builtin function.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

/// Advances an iterator.
///
/// On exhaustion returns `default` when given, otherwise raises `StopIteration`.
pub fn next(iterator: &Value, default: Option<Value>) -> RunResult<Value> {
    let item = match iterator {
        Value::Iter(shared) => {
            let mut iter = shared
                .try_borrow_mut()
                .map_err(|_| ExcType::value_error("generator already executing"))?;
            iter.for_next()?
        }
        Value::Instance(instance) if instance.has_special("__next__") => {
            match instance.call_special("__next__", &[]) {
                Ok(item) => item,
                Err(err) if err.is_stop_iteration() && default.is_some() => None,
                Err(err) => return Err(err),
            }
        }
        _ => return Err(ExcType::type_error_not_iterator(iterator.type_name())),
    };
    match (item, default) {
        (Some(item), _) => Ok(item),
        (None, Some(default)) => Ok(default),
        (None, None) => Err(ExcType::stop_iteration()),
    }
}

/// Implementation of the next() builtin function.
pub fn builtin_next(args: ArgValues) -> RunResult<Value> {
    let (iterator, default) = args.get_one_two_args("next")?;
    next(&iterator, default)
}
