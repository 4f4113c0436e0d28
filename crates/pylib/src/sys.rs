//! Process-level requests from guest code.

use tracing::debug;

use crate::{
    exception::{ExcType, RunResult},
    value::Value,
};

/// Converts a guest `sys.exit()` argument to a process exit code.
///
/// `None` is success, integers are used as-is and anything else is a failure status.
pub fn exit_code(arg: &Value) -> RunResult<i32> {
    match arg {
        Value::None => Ok(0),
        Value::Bool(b) => Ok(i32::from(*b)),
        Value::Int(code) => {
            i32::try_from(*code).map_err(|_| ExcType::overflow_error(format!("exit code {code} out of range")))
        }
        _ => Ok(1),
    }
}

/// Terminates the host process with `code`. Buffered streams that are not closed first lose
/// their pending writes.
pub fn exit(code: i32) -> ! {
    debug!(code, "exit requested");
    std::process::exit(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_argument_type() {
        assert_eq!(exit_code(&Value::None).unwrap(), 0);
        assert_eq!(exit_code(&Value::Int(3)).unwrap(), 3);
        assert_eq!(exit_code(&Value::Bool(true)).unwrap(), 1);
        assert_eq!(exit_code(&Value::str("fatal")).unwrap(), 1);
        assert!(exit_code(&Value::Int(i64::MAX)).is_err());
    }
}
