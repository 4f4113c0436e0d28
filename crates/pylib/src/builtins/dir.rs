//! Implementation of the dir() builtin function.

use crate::{args::ArgValues, exception::RunResult, value::Value};

/// Sorted attribute names of `obj`: own attributes plus the type's declared members.
///
/// Values without an attribute mapping report no names.
#[must_use]
pub fn dir(obj: &Value) -> Vec<String> {
    match obj {
        Value::Instance(instance) => instance.dir(),
        _ => Vec::new(),
    }
}

/// Implementation of the dir() builtin function.
pub fn builtin_dir(args: ArgValues) -> RunResult<Value> {
    let obj = args.get_one_arg("dir")?;
    Ok(Value::list(dir(&obj).into_iter().map(Value::Str).collect()))
}
