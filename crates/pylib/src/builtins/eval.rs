//! eval() and exec(): recognized names that this runtime does not support.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

pub fn builtin_eval(_args: ArgValues) -> RunResult<Value> {
    Err(ExcType::not_implemented("eval"))
}

pub fn builtin_exec(_args: ArgValues) -> RunResult<Value> {
    Err(ExcType::not_implemented("exec"))
}
