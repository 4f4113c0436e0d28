use std::{fmt, rc::Rc};

use crate::{exception::RunResult, value::Value};

type NativeFn = dyn Fn(&[Value]) -> RunResult<Value>;

/// A callable guest value backed by a host closure.
///
/// Cloning is cheap and clones compare equal by identity.
#[derive(Clone)]
pub struct Function {
    name: Rc<str>,
    func: Rc<NativeFn>,
    builtin: bool,
}

impl Function {
    /// Wraps a host closure as a guest callable.
    pub fn new(name: impl Into<Rc<str>>, func: impl Fn(&[Value]) -> RunResult<Value> + 'static) -> Self {
        Self {
            name: name.into(),
            func: Rc::new(func),
            builtin: false,
        }
    }

    pub(crate) fn new_builtin(name: &'static str, func: impl Fn(&[Value]) -> RunResult<Value> + 'static) -> Self {
        Self {
            name: name.into(),
            func: Rc::new(func),
            builtin: true,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> RunResult<Value> {
        (self.func)(args)
    }

    /// Returns a method bound to `receiver`, which is passed as the first argument on every call.
    #[must_use]
    pub fn bind(&self, receiver: Value) -> Self {
        let func = Rc::clone(&self.func);
        Self {
            name: Rc::clone(&self.name),
            func: Rc::new(move |args: &[Value]| {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(receiver.clone());
                full.extend_from_slice(args);
                func(&full)
            }),
            builtin: self.builtin,
        }
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }

    /// Address shared by every clone of this function.
    pub(crate) fn identity(&self) -> *const () {
        Rc::as_ptr(&self.func).cast::<()>()
    }

    pub(crate) fn repr_fmt(&self, f: &mut impl fmt::Write) -> fmt::Result {
        if self.builtin {
            write!(f, "<built-in function {}>", self.name)
        } else {
            write!(f, "<function {}>", self.name)
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.repr_fmt(f)
    }
}
