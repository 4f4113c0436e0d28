use std::{
    borrow::Cow,
    fmt::{self, Display},
    io,
    path::Path,
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, RunError>;

/// Python exception types raised by the runtime.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>` implementations.
/// The string representation matches the variant name exactly (e.g., `ValueError` -> "ValueError").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum ExcType {
    /// primary exception class - matches any exception in isinstance checks.
    Exception,
    BaseException,
    SystemExit,

    // --- ArithmeticError hierarchy ---
    ArithmeticError,
    OverflowError,
    ZeroDivisionError,

    // --- LookupError hierarchy ---
    /// Also raised for unknown text encodings.
    LookupError,
    IndexError,
    KeyError,

    // --- RuntimeError hierarchy ---
    RuntimeError,
    /// Raised by builtins that are recognized but intentionally unsupported.
    NotImplementedError,

    AttributeError,

    // --- ValueError hierarchy ---
    ValueError,
    UnicodeDecodeError,
    UnicodeEncodeError,

    // --- OSError hierarchy ---
    /// Any host file or filesystem failure without a more specific kind.
    OSError,
    FileNotFoundError,
    FileExistsError,
    IsADirectoryError,
    NotADirectoryError,
    PermissionError,

    StopIteration,
    TypeError,
}

impl ExcType {
    /// Checks if this exception type is a subclass of another exception type.
    ///
    /// Returns true if `self` would be caught by `except handler_type:`.
    #[must_use]
    pub fn is_subclass_of(self, handler_type: Self) -> bool {
        if self == handler_type {
            return true;
        }
        match handler_type {
            Self::BaseException => true,
            Self::Exception => !matches!(self, Self::BaseException | Self::SystemExit),
            Self::ArithmeticError => matches!(self, Self::OverflowError | Self::ZeroDivisionError),
            Self::LookupError => matches!(self, Self::IndexError | Self::KeyError),
            Self::RuntimeError => matches!(self, Self::NotImplementedError),
            Self::ValueError => matches!(self, Self::UnicodeDecodeError | Self::UnicodeEncodeError),
            Self::OSError => matches!(
                self,
                Self::FileNotFoundError
                    | Self::FileExistsError
                    | Self::IsADirectoryError
                    | Self::NotADirectoryError
                    | Self::PermissionError
            ),
            _ => false,
        }
    }

    /// Creates an AttributeError for when an attribute is not found.
    #[must_use]
    pub(crate) fn attribute_error(type_name: impl Display, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("'{type_name}' object has no attribute '{attr}'"),
        )
        .into()
    }

    /// Creates an AttributeError for attribute assignment on values without an attribute mapping.
    #[must_use]
    pub(crate) fn attribute_error_no_setattr(type_name: impl Display, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("'{type_name}' object has no attribute '{attr}' and no __dict__ for setting new attributes"),
        )
        .into()
    }

    /// Creates a simple TypeError with a custom message.
    #[must_use]
    pub(crate) fn type_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::TypeError, msg).into()
    }

    /// `TypeError: '{type}' object is not iterable`
    #[must_use]
    pub(crate) fn type_error_not_iterable(type_name: impl Display) -> RunError {
        Self::type_error(format!("'{type_name}' object is not iterable"))
    }

    /// `TypeError: object of type '{type}' has no len()`
    #[must_use]
    pub(crate) fn type_error_no_len(type_name: impl Display) -> RunError {
        Self::type_error(format!("object of type '{type_name}' has no len()"))
    }

    /// `TypeError: '{type}' object is not reversible`
    #[must_use]
    pub(crate) fn type_error_not_reversible(type_name: impl Display) -> RunError {
        Self::type_error(format!("'{type_name}' object is not reversible"))
    }

    /// `TypeError: '{type}' object is not callable`
    #[must_use]
    pub(crate) fn type_error_not_callable(type_name: impl Display) -> RunError {
        Self::type_error(format!("'{type_name}' object is not callable"))
    }

    /// `TypeError: '{type}' object is not an iterator`
    #[must_use]
    pub(crate) fn type_error_not_iterator(type_name: impl Display) -> RunError {
        Self::type_error(format!("'{type_name}' object is not an iterator"))
    }

    /// `TypeError: '{type}' object cannot be interpreted as an integer`
    #[must_use]
    pub(crate) fn type_error_not_integer(type_name: impl Display) -> RunError {
        Self::type_error(format!("'{type_name}' object cannot be interpreted as an integer"))
    }

    /// Creates a TypeError for unsupported binary operations.
    ///
    /// Matches CPython's format: `unsupported operand type(s) for +: 'int' and 'str'`
    #[must_use]
    pub(crate) fn binary_type_error(op: &str, lhs: impl Display, rhs: impl Display) -> RunError {
        Self::type_error(format!("unsupported operand type(s) for {op}: '{lhs}' and '{rhs}'"))
    }

    /// Creates a TypeError for unorderable operands.
    #[must_use]
    pub(crate) fn compare_type_error(op: &str, lhs: impl Display, rhs: impl Display) -> RunError {
        Self::type_error(format!(
            "'{op}' not supported between instances of '{lhs}' and '{rhs}'"
        ))
    }

    /// Creates a TypeError for the wrong number of positional arguments.
    #[must_use]
    pub(crate) fn type_error_arg_count(name: &str, expected: usize, actual: usize) -> RunError {
        if expected == 1 {
            Self::type_error(format!("{name}() takes exactly one argument ({actual} given)"))
        } else {
            Self::type_error(format!("{name} expected {expected} arguments, got {actual}"))
        }
    }

    #[must_use]
    pub(crate) fn type_error_at_least(name: &str, min: usize, actual: usize) -> RunError {
        Self::type_error(format!("{name} expected at least {min} argument{}, got {actual}", plural(min)))
    }

    #[must_use]
    pub(crate) fn type_error_at_most(name: &str, max: usize, actual: usize) -> RunError {
        Self::type_error(format!("{name} expected at most {max} argument{}, got {actual}", plural(max)))
    }

    /// `TypeError: cannot use '{type}' as a dict key (unhashable type: '{type}')`
    #[must_use]
    pub(crate) fn type_error_unhashable_dict_key(type_name: impl Display) -> RunError {
        Self::type_error(format!(
            "cannot use '{type_name}' as a dict key (unhashable type: '{type_name}')"
        ))
    }

    /// `TypeError: {name}() got an unexpected keyword argument '{key}'`
    #[must_use]
    pub(crate) fn type_error_unexpected_keyword(name: &str, key: &str) -> RunError {
        Self::type_error(format!("{name}() got an unexpected keyword argument '{key}'"))
    }

    #[must_use]
    pub(crate) fn value_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::ValueError, msg).into()
    }

    #[must_use]
    pub(crate) fn value_error_range_step_zero() -> RunError {
        Self::value_error("range() arg 3 must not be zero")
    }

    #[must_use]
    pub(crate) fn value_error_slice_step_zero() -> RunError {
        Self::value_error("slice step cannot be zero")
    }

    /// Raised by stream operations that need a live handle.
    #[must_use]
    pub(crate) fn value_error_closed_file() -> RunError {
        Self::value_error("I/O operation on closed file.")
    }

    #[must_use]
    pub(crate) fn index_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::IndexError, msg).into()
    }

    #[must_use]
    pub(crate) fn overflow_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::OverflowError, msg).into()
    }

    /// Bare `StopIteration`, raised when an exhausted iterator is advanced without a default.
    #[must_use]
    pub(crate) fn stop_iteration() -> RunError {
        SimpleException::new(Self::StopIteration, None).into()
    }

    /// Raised by recognized builtins that this runtime does not support.
    #[must_use]
    pub(crate) fn not_implemented(name: &str) -> RunError {
        SimpleException::new_msg(Self::NotImplementedError, format!("{name}() is not supported")).into()
    }

    /// Creates an OSError-family error for an operation that was refused before reaching the host.
    #[must_use]
    pub(crate) fn os_error(exc_type: Self, op: &str, reason: &str, path: &Path) -> RunError {
        debug_assert!(exc_type.is_subclass_of(Self::OSError));
        SimpleException::new_msg(exc_type, format!("{op}: {reason}: '{}'", path.display())).into()
    }

    #[must_use]
    pub(crate) fn file_not_found(op: &str, path: &Path) -> RunError {
        Self::os_error(Self::FileNotFoundError, op, "No such file or directory", path)
    }

    /// Maps a host I/O failure to the matching OSError subclass.
    ///
    /// The message always names the operation and the resolved path.
    #[must_use]
    pub(crate) fn os_error_from_io(err: &io::Error, op: &str, path: &Path) -> RunError {
        SimpleException::new_msg(Self::from_io_kind(err), format!("{op}: {err}: '{}'", path.display())).into()
    }

    /// Like [`Self::os_error_from_io`] for two-path operations; the message names both.
    #[must_use]
    pub(crate) fn os_error_from_io_pair(err: &io::Error, op: &str, from: &Path, to: &Path) -> RunError {
        let msg = format!("{op}: {err}: '{}' -> '{}'", from.display(), to.display());
        SimpleException::new_msg(Self::from_io_kind(err), msg).into()
    }

    fn from_io_kind(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFoundError,
            io::ErrorKind::AlreadyExists => Self::FileExistsError,
            io::ErrorKind::PermissionDenied => Self::PermissionError,
            io::ErrorKind::IsADirectory => Self::IsADirectoryError,
            io::ErrorKind::NotADirectory => Self::NotADirectoryError,
            _ => Self::OSError,
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// A raised exception: its type plus the optional message argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleException {
    exc_type: ExcType,
    arg: Option<String>,
}

impl SimpleException {
    /// Creates a new exception with the given type and optional argument message.
    #[must_use]
    pub fn new(exc_type: ExcType, arg: Option<String>) -> Self {
        Self { exc_type, arg }
    }

    /// Creates a new exception with the given type and argument message.
    #[must_use]
    pub fn new_msg(exc_type: ExcType, arg: impl Display) -> Self {
        Self {
            exc_type,
            arg: Some(arg.to_string()),
        }
    }

    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    #[must_use]
    pub fn arg(&self) -> Option<&str> {
        self.arg.as_deref()
    }
}

impl Display for SimpleException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}: {arg}", self.exc_type),
            None => write!(f, "{}", self.exc_type),
        }
    }
}

/// Error returned by every fallible runtime operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    /// Internal runtime error - indicates a bug in pylib, not in the guest script.
    Internal(Cow<'static, str>),
    /// Catchable Python exception (e.g., ValueError, TypeError).
    Exc(Box<SimpleException>),
}

impl RunError {
    /// The Python exception type this error surfaces as.
    ///
    /// Internal errors surface as `RuntimeError`.
    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        match self {
            Self::Internal(_) => ExcType::RuntimeError,
            Self::Exc(exc) => exc.exc_type(),
        }
    }

    /// The exception message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Internal(msg) => Some(msg.as_ref()),
            Self::Exc(exc) => exc.arg(),
        }
    }

    /// Returns true if this error would be caught by `except handler_type:`.
    #[must_use]
    pub fn matches(&self, handler_type: ExcType) -> bool {
        self.exc_type().is_subclass_of(handler_type)
    }

    #[must_use]
    pub fn is_stop_iteration(&self) -> bool {
        self.exc_type() == ExcType::StopIteration
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
            Self::Exc(exc) => exc.fmt(f),
        }
    }
}

impl std::error::Error for RunError {}

impl From<SimpleException> for RunError {
    fn from(exc: SimpleException) -> Self {
        Self::Exc(Box::new(exc))
    }
}
