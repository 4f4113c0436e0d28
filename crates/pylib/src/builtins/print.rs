//! Implementation of the print() builtin function.

use std::{
    fmt::Write as _,
    io::{self, Write as _},
    path::Path,
};

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

/// Writes the values, separated by `sep` and followed by `end`, to `file`.
///
/// `sep` defaults to a space and `end` to a newline. Without a `file` (or with `None`) the text
/// goes to the host's standard output. A file object receives it through its stream; an
/// instance receives it through its `write` method. The whole line is built before anything is
/// written, so a failing value leaves the destination untouched.
pub fn print(
    values: &[Value],
    sep: Option<&str>,
    end: Option<&str>,
    file: Option<&Value>,
    flush: bool,
) -> RunResult<()> {
    let sep = sep.unwrap_or(" ");
    let mut output = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            output.push_str(sep);
        }
        // writing to a String cannot fail
        let _ = write!(output, "{value}");
    }
    output.push_str(end.unwrap_or("\n"));

    match file {
        None | Some(Value::None) => write_stdout(&output, flush),
        Some(Value::File(stream)) => {
            let mut stream = stream
                .try_borrow_mut()
                .map_err(|_| ExcType::value_error("file is already in use"))?;
            stream.write_str(&output)?;
            if flush {
                stream.flush()?;
            }
            Ok(())
        }
        Some(Value::Instance(instance)) => {
            instance.get_attr("write")?.call(&[Value::Str(output)])?;
            if flush && let Some(flush_method) = instance.lookup("flush")? {
                flush_method.call(&[])?;
            }
            Ok(())
        }
        Some(other) => Err(ExcType::attribute_error(other.type_name(), "write")),
    }
}

fn write_stdout(output: &str, flush: bool) -> RunResult<()> {
    let to_err = |err: io::Error| ExcType::os_error_from_io(&err, "print", Path::new("<stdout>"));
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes()).map_err(to_err)?;
    if flush {
        stdout.flush().map_err(to_err)?;
    }
    Ok(())
}

/// Implementation of the print() builtin function.
///
/// Supports the following keyword arguments:
/// - `sep`: separator between values (default: " ")
/// - `end`: string appended after the last value (default: "\n")
/// - `file`: destination; `None` means standard output
/// - `flush`: flush the destination after writing
pub fn builtin_print(args: ArgValues) -> RunResult<Value> {
    let (positional, kwargs) = args.into_parts();
    let mut sep = None;
    let mut end = None;
    let mut file = None;
    let mut flush = false;
    for (key, value) in kwargs {
        match key.as_str() {
            "sep" => sep = string_kwarg(value, "sep")?,
            "end" => end = string_kwarg(value, "end")?,
            "file" => file = Some(value),
            "flush" => flush = value.py_bool()?,
            _ => return Err(ExcType::type_error_unexpected_keyword("print", &key)),
        }
    }
    print(&positional, sep.as_deref(), end.as_deref(), file.as_ref(), flush)?;
    Ok(Value::None)
}

/// A `sep`/`end` argument: `None` selects the default.
fn string_kwarg(value: Value, name: &str) -> RunResult<Option<String>> {
    match value {
        Value::None => Ok(None),
        Value::Str(s) => Ok(Some(s)),
        other => Err(ExcType::type_error(format!(
            "{name} must be None or a string, not {}",
            other.type_name()
        ))),
    }
}
