//! Implementation of the getattr(), setattr(), delattr() and hasattr() builtin functions.
//!
//! Only instances carry an attribute mapping. Other values have no readable or settable
//! attributes, so reads raise `AttributeError` and `hasattr` reports false.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

/// Reads `obj.name`, returning `default` instead of raising `AttributeError` when one is given.
pub fn getattr(obj: &Value, name: &str, default: Option<Value>) -> RunResult<Value> {
    let found = match obj {
        Value::Instance(instance) => instance.lookup(name),
        _ => Ok(None),
    };
    match (found, default) {
        (Ok(Some(value)), _) => Ok(value),
        (Ok(None), Some(default)) => Ok(default),
        (Err(err), Some(default)) if err.matches(ExcType::AttributeError) => Ok(default),
        (Ok(None), None) => Err(ExcType::attribute_error(obj.type_name(), name)),
        (Err(err), _) => Err(err),
    }
}

/// Binds `obj.name = value`, overwriting any previous own attribute.
pub fn setattr(obj: &Value, name: &str, value: Value) -> RunResult<()> {
    match obj {
        Value::Instance(instance) => {
            instance.set_attr(name, value);
            Ok(())
        }
        _ => Err(ExcType::attribute_error_no_setattr(obj.type_name(), name)),
    }
}

/// Removes an own attribute, raising `AttributeError` if it is not present.
pub fn delattr(obj: &Value, name: &str) -> RunResult<()> {
    match obj {
        Value::Instance(instance) => instance.del_attr(name),
        _ => Err(ExcType::attribute_error(obj.type_name(), name)),
    }
}

/// Whether `getattr(obj, name)` would find something. Never raises.
#[must_use]
pub fn hasattr(obj: &Value, name: &str) -> bool {
    match obj {
        Value::Instance(instance) => instance.has_attr(name),
        _ => false,
    }
}

fn attr_name(name: &Value) -> RunResult<&str> {
    match name {
        Value::Str(s) => Ok(s.as_str()),
        other => Err(ExcType::type_error(format!(
            "attribute name must be string, not '{}'",
            other.type_name()
        ))),
    }
}

/// Implementation of the getattr() builtin function.
pub fn builtin_getattr(args: ArgValues) -> RunResult<Value> {
    let (obj, name, default) = args.get_two_three_args("getattr")?;
    getattr(&obj, attr_name(&name)?, default)
}

/// Implementation of the setattr() builtin function.
pub fn builtin_setattr(args: ArgValues) -> RunResult<Value> {
    let (obj, name, value) = args.get_two_three_args("setattr")?;
    let Some(value) = value else {
        return Err(ExcType::type_error_arg_count("setattr", 3, 2));
    };
    setattr(&obj, attr_name(&name)?, value)?;
    Ok(Value::None)
}

/// Implementation of the delattr() builtin function.
pub fn builtin_delattr(args: ArgValues) -> RunResult<Value> {
    let (obj, name) = args.get_two_args("delattr")?;
    delattr(&obj, attr_name(&name)?)?;
    Ok(Value::None)
}

/// Implementation of the hasattr() builtin function.
pub fn builtin_hasattr(args: ArgValues) -> RunResult<Value> {
    let (obj, name) = args.get_two_args("hasattr")?;
    Ok(Value::Bool(hasattr(&obj, attr_name(&name)?)))
}
