//! Implementation of the hex(), oct() and bin() builtin functions.

use crate::{args::ArgValues, exception::RunResult, value::Value};

/// `0x`-prefixed lowercase hexadecimal, with a leading `-` for negatives.
#[must_use]
pub fn hex(i: i64) -> String {
    format!("{}0x{:x}", sign(i), i.unsigned_abs())
}

#[must_use]
pub fn oct(i: i64) -> String {
    format!("{}0o{:o}", sign(i), i.unsigned_abs())
}

#[must_use]
pub fn bin(i: i64) -> String {
    format!("{}0b{:b}", sign(i), i.unsigned_abs())
}

fn sign(i: i64) -> &'static str {
    if i < 0 { "-" } else { "" }
}

/// Implementation of the hex() builtin function.
pub fn builtin_hex(args: ArgValues) -> RunResult<Value> {
    let value = args.get_one_arg("hex")?;
    Ok(Value::Str(hex(value.as_int()?)))
}

/// Implementation of the oct() builtin function.
pub fn builtin_oct(args: ArgValues) -> RunResult<Value> {
    let value = args.get_one_arg("oct")?;
    Ok(Value::Str(oct(value.as_int()?)))
}

/// Implementation of the bin() builtin function.
pub fn builtin_bin(args: ArgValues) -> RunResult<Value> {
    let value = args.get_one_arg("bin")?;
    Ok(Value::Str(bin(value.as_int()?)))
}
