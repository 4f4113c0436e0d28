use std::{
    borrow::Cow,
    cell::RefCell,
    cmp::Ordering,
    fmt::{self, Write},
    rc::Rc,
};

use crate::{
    exception::{ExcType, RunResult, SimpleException},
    function::Function,
    stream::{RandomAccessFile, Stream},
    types::{DictPairs, InstanceRef, PyIter, Range, Slice, dict::float_as_int},
};

/// Shared, mutable list storage. Aliases observe each other's mutations.
pub type ListRef = Rc<RefCell<Vec<Value>>>;
/// Shared, mutable dict storage.
pub type DictRef = Rc<RefCell<DictPairs>>;
/// Shared iterator state; advancing one alias advances all of them.
pub type IterRef = Rc<RefCell<PyIter>>;
/// Shared guest file object over a type-erased resource.
pub type FileRef = Rc<RefCell<Stream<Box<dyn RandomAccessFile>>>>;

/// A guest value.
///
/// Immutable scalars and sequences (`Str`, `Bytes`, `Tuple`) are owned. Mutable containers,
/// iterators and instances are reference-counted so that guest aliasing holds: two names bound
/// to the same list see the same list.
///
/// `PartialEq` follows guest equality (`1 == 1.0 == True`); containers compare by content,
/// iterators, callables and instances by identity.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(ListRef),
    Tuple(Vec<Value>),
    Dict(DictRef),
    /// Lazy integer range.
    Range(Range),
    /// Result of the `slice()` builtin, usable as a subscript.
    Slice(Slice),
    Iter(IterRef),
    Callable(Function),
    Instance(InstanceRef),
    /// An open (or closed) guest file object.
    File(FileRef),
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// Exact equality: an int equals a float only when the float is that very integer.
    #[expect(clippy::float_cmp, reason = "guest equality is exact")]
    fn num_eq(self, other: Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(i), Self::Float(f)) | (Self::Float(f), Self::Int(i)) => float_as_int(f) == Some(i),
        }
    }

    fn num_cmp(self, other: Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(&b),
            // NaN compares as neither less nor greater
            _ => self.as_f64().partial_cmp(&other.as_f64()).unwrap_or(Ordering::Equal),
        }
    }
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(b.into())
    }

    #[must_use]
    pub fn list(items: Vec<Self>) -> Self {
        Self::List(Rc::new(RefCell::new(items)))
    }

    #[must_use]
    pub fn tuple(items: Vec<Self>) -> Self {
        Self::Tuple(items)
    }

    /// Builds a dict; fails if any key is unhashable.
    pub fn dict(pairs: impl IntoIterator<Item = (Self, Self)>) -> RunResult<Self> {
        Ok(Self::Dict(Rc::new(RefCell::new(DictPairs::from_pairs(pairs)?))))
    }

    /// Wraps a stream as a guest file object.
    pub fn file<F: RandomAccessFile + 'static>(stream: Stream<F>) -> Self {
        Self::File(Rc::new(RefCell::new(stream.boxed())))
    }

    /// Wraps a host closure as a guest callable.
    pub fn function(name: &str, func: impl Fn(&[Self]) -> RunResult<Self> + 'static) -> Self {
        Self::Callable(Function::new(name, func))
    }

    /// Python type name, as used in error messages.
    #[must_use]
    pub fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Dict(_) => "dict",
            Self::Range(_) => "range",
            Self::Slice(_) => "slice",
            Self::Iter(_) => "iterator",
            Self::Callable(f) if f.is_builtin() => "builtin_function_or_method",
            Self::Callable(_) => "function",
            Self::Instance(instance) => return Cow::Owned(instance.type_name()),
            Self::File(file) => file.try_borrow().map_or("file", |stream| stream.type_name()),
        })
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Self::Bool(b) => Some(Number::Int(i64::from(*b))),
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Integer value of an `Int` or `Bool`, for index-like arguments.
    pub fn as_int(&self) -> RunResult<i64> {
        match self {
            Self::Int(i) => Ok(*i),
            Self::Bool(b) => Ok(i64::from(*b)),
            _ => Err(ExcType::type_error_not_integer(self.type_name())),
        }
    }

    /// Guest truthiness.
    ///
    /// Instances consult `__bool__`, then `__len__`, and are otherwise true.
    pub fn py_bool(&self) -> RunResult<bool> {
        Ok(match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Bytes(b) => !b.is_empty(),
            Self::List(items) => !items.borrow().is_empty(),
            Self::Tuple(items) => !items.is_empty(),
            Self::Dict(pairs) => !pairs.borrow().is_empty(),
            Self::Range(range) => !range.is_empty(),
            Self::Slice(_) | Self::Iter(_) | Self::Callable(_) | Self::File(_) => true,
            Self::Instance(instance) => {
                if let Some(result) = instance.call_special("__bool__", &[])? {
                    return result.py_bool();
                }
                match instance.call_special("__len__", &[])? {
                    Some(len) => len.as_int()? != 0,
                    None => true,
                }
            }
        })
    }

    /// Element count of a sized value.
    pub fn py_len(&self) -> RunResult<usize> {
        match self {
            Self::Str(s) => Ok(s.chars().count()),
            Self::Bytes(b) => Ok(b.len()),
            Self::List(items) => Ok(items.borrow().len()),
            Self::Tuple(items) => Ok(items.len()),
            Self::Dict(pairs) => Ok(pairs.borrow().len()),
            Self::Range(range) => Ok(range.len()),
            Self::Instance(instance) => match instance.call_special("__len__", &[])? {
                Some(len) => usize::try_from(len.as_int()?)
                    .map_err(|_| ExcType::value_error("__len__() should return >= 0")),
                None => Err(ExcType::type_error_no_len(self.type_name())),
            },
            _ => Err(ExcType::type_error_no_len(self.type_name())),
        }
    }

    /// Guest `==`.
    #[must_use]
    pub fn py_eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.num_eq(b);
        }
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b) || seq_eq(&a.borrow(), &b.borrow()),
            (Self::Tuple(a), Self::Tuple(b)) => seq_eq(a, b),
            (Self::Dict(a), Self::Dict(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Self::Range(a), Self::Range(b)) => a.same_elements(b),
            (Self::Slice(a), Self::Slice(b)) => a == b,
            (Self::Iter(a), Self::Iter(b)) => Rc::ptr_eq(a, b),
            (Self::Callable(a), Self::Callable(b)) => a.ptr_eq(b),
            (Self::Instance(a), Self::Instance(b)) => a.ptr_eq(b),
            (Self::File(a), Self::File(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Guest ordering, as used by `<` and `sorted`.
    ///
    /// Numbers compare numerically across `bool`/`int`/`float`, strings and bytes
    /// lexicographically, lists and tuples element-wise. Instances use `__lt__`.
    pub fn py_cmp(&self, other: &Self) -> RunResult<Ordering> {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return Ok(a.num_cmp(b));
        }
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => Ok(a.cmp(b)),
            (Self::Bytes(a), Self::Bytes(b)) => Ok(a.cmp(b)),
            (Self::List(a), Self::List(b)) => {
                // snapshot so guest comparisons can't observe a held borrow
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                seq_cmp(&a, &b)
            }
            (Self::Tuple(a), Self::Tuple(b)) => seq_cmp(a, b),
            (Self::Instance(_), _) | (_, Self::Instance(_)) => instance_cmp(self, other),
            _ => Err(ExcType::compare_type_error("<", self.type_name(), other.type_name())),
        }
    }

    /// Guest `+`.
    ///
    /// Integer overflow raises `OverflowError` rather than wrapping.
    pub fn py_add(&self, other: &Self) -> RunResult<Self> {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return match (a, b) {
                (Number::Int(x), Number::Int(y)) => x
                    .checked_add(y)
                    .map(Self::Int)
                    .ok_or_else(|| ExcType::overflow_error("integer addition overflowed")),
                _ => Ok(Self::Float(a.as_f64() + b.as_f64())),
            };
        }
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => Ok(Self::Str(format!("{a}{b}"))),
            (Self::Bytes(a), Self::Bytes(b)) => Ok(Self::Bytes([a.as_slice(), b.as_slice()].concat())),
            (Self::List(a), Self::List(b)) => {
                let mut items = a.borrow().clone();
                items.extend(b.borrow().iter().cloned());
                Ok(Self::list(items))
            }
            (Self::Tuple(a), Self::Tuple(b)) => Ok(Self::Tuple([a.as_slice(), b.as_slice()].concat())),
            _ => {
                if let Self::Instance(instance) = self
                    && let Some(result) = instance.call_special("__add__", &[other.clone()])?
                {
                    return Ok(result);
                }
                if let Self::Instance(instance) = other
                    && let Some(result) = instance.call_special("__radd__", &[self.clone()])?
                {
                    return Ok(result);
                }
                Err(ExcType::binary_type_error("+", self.type_name(), other.type_name()))
            }
        }
    }

    #[must_use]
    pub fn is_callable(&self) -> bool {
        match self {
            Self::Callable(_) => true,
            Self::Instance(instance) => instance.has_special("__call__"),
            _ => false,
        }
    }

    /// Calls this value with positional arguments.
    pub fn call(&self, args: &[Self]) -> RunResult<Self> {
        match self {
            Self::Callable(function) => function.call(args),
            Self::Instance(instance) => instance
                .call_special("__call__", args)?
                .ok_or_else(|| ExcType::type_error_not_callable(self.type_name())),
            _ => Err(ExcType::type_error_not_callable(self.type_name())),
        }
    }

    /// Returns a fresh iterator over this value.
    pub fn py_iter(&self) -> RunResult<PyIter> {
        PyIter::new(self)
    }

    /// Materializes every element of an iterable.
    pub fn py_list(&self) -> RunResult<Vec<Self>> {
        self.py_iter()?.collect()
    }

    /// Guest subscript `self[key]`.
    ///
    /// Integer keys may be negative and count from the end; a `Slice` key yields a new value of
    /// the same kind (a `Range` slice is again a `Range`).
    pub fn py_getitem(&self, key: &Self) -> RunResult<Self> {
        match (self, key) {
            (Self::Dict(pairs), _) => pairs
                .borrow()
                .get(key)?
                .cloned()
                .ok_or_else(|| SimpleException::new_msg(ExcType::KeyError, key.py_repr()).into()),
            (_, Self::Slice(slice)) => self.get_slice(slice),
            (Self::Range(range), _) => Ok(Self::Int(range.get(key.as_int()?)?)),
            (Self::List(items), _) => {
                let items = items.borrow();
                let index = normalize_index(key.as_int()?, items.len(), "list")?;
                Ok(items[index].clone())
            }
            (Self::Tuple(items), _) => {
                let index = normalize_index(key.as_int()?, items.len(), "tuple")?;
                Ok(items[index].clone())
            }
            (Self::Str(s), _) => {
                let index = normalize_index(key.as_int()?, s.chars().count(), "string")?;
                Ok(s.chars().nth(index).map(String::from).map(Self::Str).unwrap_or(Self::None))
            }
            (Self::Bytes(b), _) => {
                let index = normalize_index(key.as_int()?, b.len(), "index")?;
                Ok(Self::Int(i64::from(b[index])))
            }
            (Self::Instance(instance), _) => instance
                .call_special("__getitem__", &[key.clone()])?
                .ok_or_else(|| not_subscriptable(self)),
            _ => Err(not_subscriptable(self)),
        }
    }

    fn get_slice(&self, slice: &Slice) -> RunResult<Self> {
        match self {
            Self::Range(range) => Ok(Self::Range(range.slice(slice)?)),
            Self::List(items) => {
                let items = items.borrow();
                let picked = slice.positions(items.len())?.map(|i| items[i].clone()).collect();
                Ok(Self::list(picked))
            }
            Self::Tuple(items) => Ok(Self::Tuple(
                slice.positions(items.len())?.map(|i| items[i].clone()).collect(),
            )),
            Self::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                Ok(Self::Str(slice.positions(chars.len())?.map(|i| chars[i]).collect()))
            }
            Self::Bytes(b) => Ok(Self::Bytes(slice.positions(b.len())?.map(|i| b[i]).collect())),
            _ => Err(not_subscriptable(self)),
        }
    }

    #[must_use]
    pub fn py_repr(&self) -> String {
        let mut s = String::new();
        // writing to a String cannot fail
        let _ = self.repr_fmt(&mut s);
        s
    }

    fn repr_fmt(&self, f: &mut impl Write) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => float_repr_fmt(*v, f),
            Self::Str(s) => string_repr_fmt(s, f),
            Self::Bytes(b) => bytes_repr_fmt(b, f),
            Self::List(items) => {
                f.write_char('[')?;
                seq_repr_fmt(&items.borrow(), f)?;
                f.write_char(']')
            }
            Self::Tuple(items) => {
                f.write_char('(')?;
                seq_repr_fmt(items, f)?;
                if items.len() == 1 {
                    f.write_char(',')?;
                }
                f.write_char(')')
            }
            Self::Dict(pairs) => {
                f.write_char('{')?;
                for (i, (key, value)) in pairs.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    key.repr_fmt(f)?;
                    f.write_str(": ")?;
                    value.repr_fmt(f)?;
                }
                f.write_char('}')
            }
            Self::Range(range) => write!(f, "{range}"),
            Self::Slice(slice) => write!(f, "{slice}"),
            Self::Iter(_) => f.write_str("<iterator object>"),
            Self::Callable(function) => function.repr_fmt(f),
            Self::Instance(instance) => write!(f, "<{} object>", instance.type_name()),
            Self::File(file) => match file.try_borrow() {
                Ok(stream) => f.write_str(&stream.repr()),
                Err(_) => f.write_str("<_io file>"),
            },
        }
    }
}

fn seq_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.py_eq(y))
}

fn seq_cmp(a: &[Value], b: &[Value]) -> RunResult<Ordering> {
    for (x, y) in a.iter().zip(b) {
        if !x.py_eq(y) {
            return x.py_cmp(y);
        }
    }
    Ok(a.len().cmp(&b.len()))
}

/// Orders two values where at least one is an instance, using `__lt__` in either direction.
fn instance_cmp(lhs: &Value, rhs: &Value) -> RunResult<Ordering> {
    let forward = rich_lt(lhs, rhs)?;
    if forward == Some(true) {
        return Ok(Ordering::Less);
    }
    match rich_lt(rhs, lhs)? {
        Some(true) => Ok(Ordering::Greater),
        Some(false) => Ok(Ordering::Equal),
        None if forward.is_some() => Ok(Ordering::Equal),
        None => Err(ExcType::compare_type_error("<", lhs.type_name(), rhs.type_name())),
    }
}

fn rich_lt(a: &Value, b: &Value) -> RunResult<Option<bool>> {
    let Value::Instance(instance) = a else {
        return Ok(None);
    };
    match instance.call_special("__lt__", &[b.clone()])? {
        Some(result) => Ok(Some(result.py_bool()?)),
        None => Ok(None),
    }
}

fn normalize_index(index: i64, len: usize, what: &str) -> RunResult<usize> {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if index < 0 { index + len_i } else { index };
    usize::try_from(resolved)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| ExcType::index_error(format!("{what} index out of range")))
}

fn not_subscriptable(value: &Value) -> crate::exception::RunError {
    ExcType::type_error(format!("'{}' object is not subscriptable", value.type_name()))
}

fn seq_repr_fmt(items: &[Value], f: &mut impl Write) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.repr_fmt(f)?;
    }
    Ok(())
}

fn float_repr_fmt(v: f64, f: &mut impl Write) -> fmt::Result {
    if v.is_nan() {
        return f.write_str("nan");
    }
    if v.is_infinite() {
        return f.write_str(if v > 0.0 { "inf" } else { "-inf" });
    }
    let s = v.to_string();
    f.write_str(&s)?;
    if !s.contains('.') {
        f.write_str(".0")?;
    }
    Ok(())
}

/// Writes a Python string literal, preferring single quotes like CPython.
fn string_repr_fmt(s: &str, f: &mut impl Write) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

fn bytes_repr_fmt(b: &[u8], f: &mut impl Write) -> fmt::Result {
    f.write_str("b'")?;
    for &byte in b {
        match byte {
            b'\\' => f.write_str("\\\\")?,
            b'\'' => f.write_str("\\'")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b'\t' => f.write_str("\\t")?,
            0x20..0x7f => f.write_char(char::from(byte))?,
            _ => write!(f, "\\x{byte:02x}")?,
        }
    }
    f.write_char('\'')
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            _ => self.repr_fmt(f),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.repr_fmt(f)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.py_eq(other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Range> for Value {
    fn from(range: Range) -> Self {
        Self::Range(range)
    }
}

impl From<Slice> for Value {
    fn from(slice: Slice) -> Self {
        Self::Slice(slice)
    }
}

impl From<PyIter> for Value {
    fn from(iter: PyIter) -> Self {
        Self::Iter(Rc::new(RefCell::new(iter)))
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Self::Callable(function)
    }
}

impl<F: RandomAccessFile + 'static> From<Stream<F>> for Value {
    fn from(stream: Stream<F>) -> Self {
        Self::file(stream)
    }
}

impl From<InstanceRef> for Value {
    fn from(instance: InstanceRef) -> Self {
        Self::Instance(instance)
    }
}
