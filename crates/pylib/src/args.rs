use std::vec::IntoIter;

use crate::{
    exception::{ExcType, RunResult},
    value::Value,
};

/// Arguments of a builtin call.
///
/// Uses specific variants for the common zero-to-two positional argument cases so builtins can
/// destructure them directly.
#[derive(Debug, Clone)]
pub enum ArgValues {
    Empty,
    One(Value),
    Two(Value, Value),
    Kwargs(KwargsValues),
    ArgsKargs { args: Vec<Value>, kwargs: KwargsValues },
}

impl ArgValues {
    /// Positional arguments only.
    #[must_use]
    pub fn new(args: Vec<Value>) -> Self {
        Self::with_kwargs(args, Vec::new())
    }

    /// Positional and keyword arguments.
    #[must_use]
    pub fn with_kwargs(args: Vec<Value>, kwargs: Vec<(String, Value)>) -> Self {
        if !kwargs.is_empty() {
            let kwargs = KwargsValues(kwargs);
            return if args.is_empty() {
                Self::Kwargs(kwargs)
            } else {
                Self::ArgsKargs { args, kwargs }
            };
        }
        let mut iter = args.into_iter();
        match (iter.next(), iter.next(), iter.next()) {
            (None, _, _) => Self::Empty,
            (Some(a), None, _) => Self::One(a),
            (Some(a1), Some(a2), None) => Self::Two(a1, a2),
            (Some(a1), Some(a2), Some(a3)) => {
                let mut args = vec![a1, a2, a3];
                args.extend(iter);
                Self::ArgsKargs {
                    args,
                    kwargs: KwargsValues::default(),
                }
            }
        }
    }

    /// Number of positional arguments.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Empty | Self::Kwargs(_) => 0,
            Self::One(_) => 1,
            Self::Two(..) => 2,
            Self::ArgsKargs { args, .. } => args.len(),
        }
    }

    /// Splits into positional arguments and keyword arguments.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Value>, KwargsValues) {
        match self {
            Self::Empty => (Vec::new(), KwargsValues::default()),
            Self::One(a) => (vec![a], KwargsValues::default()),
            Self::Two(a1, a2) => (vec![a1, a2], KwargsValues::default()),
            Self::Kwargs(kwargs) => (Vec::new(), kwargs),
            Self::ArgsKargs { args, kwargs } => (args, kwargs),
        }
    }

    /// Checks that exactly one positional argument was passed, returning it.
    pub fn get_one_arg(self, name: &str) -> RunResult<Value> {
        match self {
            Self::One(a) => Ok(a),
            other => Err(other.positional_error(name, 1, 1)),
        }
    }

    /// Checks that exactly two positional arguments were passed, returning them as a tuple.
    pub fn get_two_args(self, name: &str) -> RunResult<(Value, Value)> {
        match self {
            Self::Two(a1, a2) => Ok((a1, a2)),
            other => Err(other.positional_error(name, 2, 2)),
        }
    }

    /// Checks that one or two arguments were passed, returning them as a tuple.
    pub fn get_one_two_args(self, name: &str) -> RunResult<(Value, Option<Value>)> {
        match self {
            Self::One(a) => Ok((a, None)),
            Self::Two(a1, a2) => Ok((a1, Some(a2))),
            other => Err(other.positional_error(name, 1, 2)),
        }
    }

    /// Checks that two or three positional arguments were passed.
    pub fn get_two_three_args(self, name: &str) -> RunResult<(Value, Value, Option<Value>)> {
        match self {
            Self::Two(a1, a2) => Ok((a1, a2, None)),
            Self::ArgsKargs { args, kwargs } if args.len() == 3 && kwargs.is_empty() => {
                let mut iter = args.into_iter();
                match (iter.next(), iter.next(), iter.next()) {
                    (Some(a1), Some(a2), a3) => Ok((a1, a2, a3)),
                    _ => Err(ExcType::type_error_at_least(name, 2, 0)),
                }
            }
            other => Err(other.positional_error(name, 2, 3)),
        }
    }

    /// Checks that one to three positional arguments were passed.
    pub fn get_one_to_three_args(self, name: &str) -> RunResult<(Value, Option<Value>, Option<Value>)> {
        let (args, kwargs) = self.into_parts();
        kwargs.check_empty(name)?;
        let count = args.len();
        let mut iter = args.into_iter();
        match (iter.next(), iter.next(), iter.next(), iter.next()) {
            (Some(a1), a2, a3, None) => Ok((a1, a2, a3)),
            (None, ..) => Err(ExcType::type_error_at_least(name, 1, 0)),
            _ => Err(ExcType::type_error_at_most(name, 3, count)),
        }
    }

    /// Checks that one required argument and one optional argument were passed,
    /// allowing the optional argument to be provided as a keyword.
    ///
    /// This supports signatures like `enumerate(iterable, start=0)`.
    pub fn get_one_two_args_with_keyword(self, name: &str, keyword: &str) -> RunResult<(Value, Option<Value>)> {
        let (args, mut kwargs) = self.into_parts();
        let by_keyword = kwargs.take(keyword);
        kwargs.check_empty(name)?;
        let count = args.len();
        let mut iter = args.into_iter();
        match (iter.next(), iter.next(), iter.next(), by_keyword) {
            (None, ..) => Err(ExcType::type_error_at_least(name, 1, 0)),
            (Some(a), None, _, keyword_value) => Ok((a, keyword_value)),
            (Some(a1), Some(a2), None, None) => Ok((a1, Some(a2))),
            (Some(_), Some(_), None, Some(_)) => Err(ExcType::type_error(format!(
                "argument for {name}() given by name ('{keyword}') and position (2)"
            ))),
            (Some(_), Some(_), Some(_), _) => Err(ExcType::type_error_at_most(name, 2, count)),
        }
    }

    fn positional_error(self, name: &str, min: usize, max: usize) -> crate::exception::RunError {
        let count = self.count();
        let (_, kwargs) = self.into_parts();
        if let Some(key) = kwargs.first_key() {
            return ExcType::type_error_unexpected_keyword(name, key);
        }
        if min == max {
            ExcType::type_error_arg_count(name, min, count)
        } else if count < min {
            ExcType::type_error_at_least(name, min, count)
        } else {
            ExcType::type_error_at_most(name, max, count)
        }
    }
}

/// Keyword arguments in call order.
#[derive(Debug, Clone, Default)]
pub struct KwargsValues(Vec<(String, Value)>);

impl KwargsValues {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes and returns the argument named `key`.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        let position = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(position).1)
    }

    /// Fails if any keyword argument was left unconsumed.
    pub fn check_empty(self, name: &str) -> RunResult<()> {
        match self.first_key() {
            Some(key) => Err(ExcType::type_error_unexpected_keyword(name, key)),
            None => Ok(()),
        }
    }

    fn first_key(&self) -> Option<&str> {
        self.0.first().map(|(k, _)| k.as_str())
    }
}

impl IntoIterator for KwargsValues {
    type Item = (String, Value);
    type IntoIter = IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
