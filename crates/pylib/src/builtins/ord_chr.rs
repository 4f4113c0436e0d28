//! Implementation of the ord() and chr() builtin functions.

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

/// Code point of a one-character string, or the value of a one-byte bytes object.
pub fn ord(value: &Value) -> RunResult<i64> {
    match value {
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(i64::from(u32::from(c))),
                _ => Err(ExcType::type_error(format!(
                    "ord() expected a character, but string of length {} found",
                    s.chars().count()
                ))),
            }
        }
        Value::Bytes(b) => match b.as_slice() {
            [byte] => Ok(i64::from(*byte)),
            _ => Err(ExcType::type_error(format!(
                "ord() expected a character, but string of length {} found",
                b.len()
            ))),
        },
        other => Err(ExcType::type_error(format!(
            "ord() expected string of length 1, but {} found",
            other.type_name()
        ))),
    }
}

/// One-character string for a code point.
///
/// Surrogate code points have no `char` and raise `ValueError` like out-of-range ones.
pub fn chr(code: i64) -> RunResult<String> {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(String::from)
        .ok_or_else(|| {
            if (0..0x11_0000).contains(&code) {
                ExcType::value_error(format!("chr() arg is a surrogate code point: {code:#x}"))
            } else {
                ExcType::value_error("chr() arg not in range(0x110000)")
            }
        })
}

/// Implementation of the ord() builtin function.
pub fn builtin_ord(args: ArgValues) -> RunResult<Value> {
    let value = args.get_one_arg("ord")?;
    ord(&value).map(Value::Int)
}

/// Implementation of the chr() builtin function.
pub fn builtin_chr(args: ArgValues) -> RunResult<Value> {
    let code = args.get_one_arg("chr")?;
    chr(code.as_int()?).map(Value::Str)
}
