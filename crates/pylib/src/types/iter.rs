//! Iterator state for the guest iterator protocol.
//!
//! [`PyIter`] stores cursor state (indices, offsets, inner iterators) rather than borrowed Rust
//! iterators, so it can own its source and be shared behind an `IterRef`. The lazy builtins
//! (`zip`, `enumerate`, `map`, `filter`, `reversed`) are composed from it.
//!
//! Advancing returns `RunResult<Option<Value>>`: `Ok(None)` is exhaustion. Turning exhaustion
//! into `StopIteration` only happens at the guest boundary (the `next()` builtin).

use std::{fmt, mem};

use crate::{
    exception::{ExcType, RunResult},
    types::{InstanceRef, Range},
    value::{FileRef, IterRef, ListRef, Value},
};

/// A stateful guest iterator.
///
/// Once it reports exhaustion it stays exhausted, even if its source later grows.
pub struct PyIter {
    source: IterSource,
    exhausted: bool,
}

enum IterSource {
    Empty,
    Range {
        next: i64,
        step: i64,
        remaining: usize,
    },
    /// Live list; `len` is the length when iteration began.
    List {
        items: ListRef,
        index: usize,
        len: usize,
    },
    /// Owned snapshot (tuples, dict keys, reversed sequences).
    Items {
        items: Vec<Value>,
        index: usize,
    },
    Str {
        string: String,
        byte_offset: usize,
    },
    Bytes {
        bytes: Vec<u8>,
        index: usize,
    },
    ReversedList {
        items: ListRef,
        remaining: usize,
    },
    /// An existing iterator value; advancing this advances the shared one.
    Shared(IterRef),
    /// A guest instance implementing `__next__`.
    Protocol(InstanceRef),
    /// Lines of a file object, read on demand.
    File(FileRef),
    Zip(Vec<PyIter>),
    Enumerate {
        inner: Box<PyIter>,
        index: i64,
    },
    Map {
        function: Value,
        inners: Vec<PyIter>,
    },
    Filter {
        predicate: Option<Value>,
        inner: Box<PyIter>,
    },
}

impl PyIter {
    fn from_source(source: IterSource) -> Self {
        Self {
            source,
            exhausted: false,
        }
    }

    /// Creates an iterator over any iterable value.
    ///
    /// Iterating an existing iterator shares its state, matching `iter(it) is it`.
    pub fn new(value: &Value) -> RunResult<Self> {
        let source = match value {
            Value::Str(s) => IterSource::Str {
                string: s.clone(),
                byte_offset: 0,
            },
            Value::Bytes(b) => IterSource::Bytes {
                bytes: b.clone(),
                index: 0,
            },
            Value::List(items) => IterSource::List {
                len: items.borrow().len(),
                items: items.clone(),
                index: 0,
            },
            Value::Tuple(items) => IterSource::Items {
                items: items.clone(),
                index: 0,
            },
            Value::Dict(pairs) => IterSource::Items {
                items: pairs.borrow().keys().cloned().collect(),
                index: 0,
            },
            Value::Range(range) => return Ok(Self::from_range(range)),
            Value::Iter(shared) => IterSource::Shared(shared.clone()),
            Value::File(file) => IterSource::File(file.clone()),
            Value::Instance(instance) => match instance.call_special("__iter__", &[])? {
                Some(Value::Instance(target)) if target.has_special("__next__") => IterSource::Protocol(target),
                Some(result) => return Self::new(&result),
                None => return Err(ExcType::type_error_not_iterable(value.type_name())),
            },
            _ => return Err(ExcType::type_error_not_iterable(value.type_name())),
        };
        Ok(Self::from_source(source))
    }

    #[must_use]
    pub fn from_range(range: &Range) -> Self {
        Self::from_source(IterSource::Range {
            next: range.start(),
            step: range.step(),
            remaining: range.len(),
        })
    }

    /// Iterator over the elements of a sized sequence, last first.
    ///
    /// One-shot iterators are not reversible.
    pub fn reversed(value: &Value) -> RunResult<Self> {
        let source = match value {
            Value::List(items) => IterSource::ReversedList {
                remaining: items.borrow().len(),
                items: items.clone(),
            },
            Value::Tuple(items) => IterSource::Items {
                items: items.iter().rev().cloned().collect(),
                index: 0,
            },
            Value::Str(s) => IterSource::Str {
                string: s.chars().rev().collect(),
                byte_offset: 0,
            },
            Value::Bytes(b) => IterSource::Bytes {
                bytes: b.iter().rev().copied().collect(),
                index: 0,
            },
            Value::Dict(pairs) => IterSource::Items {
                items: pairs.borrow().keys().rev().cloned().collect(),
                index: 0,
            },
            Value::Range(range) => match range.last() {
                Some(last) => IterSource::Range {
                    next: last,
                    step: range
                        .step()
                        .checked_neg()
                        .ok_or_else(|| ExcType::overflow_error("range step too large to reverse"))?,
                    remaining: range.len(),
                },
                None => IterSource::Empty,
            },
            Value::Instance(instance) => match instance.call_special("__reversed__", &[])? {
                Some(result) => return Self::new(&result),
                None => return Err(ExcType::type_error_not_reversible(value.type_name())),
            },
            _ => return Err(ExcType::type_error_not_reversible(value.type_name())),
        };
        Ok(Self::from_source(source))
    }

    /// Lazy tuples drawn from each input in turn; stops at the first exhausted input.
    #[must_use]
    pub fn zip(inners: Vec<Self>) -> Self {
        if inners.is_empty() {
            return Self::from_source(IterSource::Empty);
        }
        Self::from_source(IterSource::Zip(inners))
    }

    #[must_use]
    pub fn enumerate(inner: Self, start: i64) -> Self {
        Self::from_source(IterSource::Enumerate {
            inner: Box::new(inner),
            index: start,
        })
    }

    /// Calls `function` with one element from each input; stops at the shortest input.
    #[must_use]
    pub fn map(function: Value, inners: Vec<Self>) -> Self {
        Self::from_source(IterSource::Map { function, inners })
    }

    /// Keeps elements for which `predicate` is truthy; `None` keeps truthy elements.
    #[must_use]
    pub fn filter(predicate: Option<Value>, inner: Self) -> Self {
        Self::from_source(IterSource::Filter {
            predicate,
            inner: Box::new(inner),
        })
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Advances the iterator. `Ok(None)` means exhausted, now and on every later call.
    pub fn for_next(&mut self) -> RunResult<Option<Value>> {
        if self.exhausted {
            return Ok(None);
        }
        let item = self.source.advance()?;
        if item.is_none() {
            self.exhausted = true;
            // release the source as soon as it is no longer needed
            drop(mem::replace(&mut self.source, IterSource::Empty));
        }
        Ok(item)
    }
}

impl IterSource {
    fn advance(&mut self) -> RunResult<Option<Value>> {
        match self {
            Self::Empty => Ok(None),
            Self::Range { next, step, remaining } => {
                if *remaining == 0 {
                    return Ok(None);
                }
                let value = *next;
                *remaining -= 1;
                if *remaining > 0 {
                    *next += *step;
                }
                Ok(Some(Value::Int(value)))
            }
            Self::List { items, index, len } => {
                if *index >= *len {
                    return Ok(None);
                }
                let item = items.borrow().get(*index).cloned();
                *index += 1;
                Ok(item)
            }
            Self::Items { items, index } => {
                let item = items.get(*index).cloned();
                *index += 1;
                Ok(item)
            }
            Self::Str { string, byte_offset } => {
                let Some(c) = string[*byte_offset..].chars().next() else {
                    return Ok(None);
                };
                *byte_offset += c.len_utf8();
                Ok(Some(Value::Str(c.to_string())))
            }
            Self::Bytes { bytes, index } => {
                let item = bytes.get(*index).map(|&b| Value::Int(i64::from(b)));
                *index += 1;
                Ok(item)
            }
            Self::ReversedList { items, remaining } => {
                if *remaining == 0 {
                    return Ok(None);
                }
                *remaining -= 1;
                Ok(items.borrow().get(*remaining).cloned())
            }
            Self::Shared(shared) => {
                let mut inner = shared
                    .try_borrow_mut()
                    .map_err(|_| ExcType::value_error("generator already executing"))?;
                inner.for_next()
            }
            Self::Protocol(instance) => match instance.call_special("__next__", &[]) {
                Ok(Some(item)) => Ok(Some(item)),
                Ok(None) => Err(ExcType::type_error_not_iterator(instance.type_name())),
                Err(err) if err.is_stop_iteration() => Ok(None),
                Err(err) => Err(err),
            },
            Self::File(file) => {
                let line = file
                    .try_borrow_mut()
                    .map_err(|_| ExcType::value_error("file is already in use"))?
                    .readline(-1)?;
                Ok((line.py_len()? > 0).then_some(line))
            }
            Self::Zip(inners) => {
                let mut row = Vec::with_capacity(inners.len());
                for inner in inners.iter_mut() {
                    match inner.for_next()? {
                        Some(item) => row.push(item),
                        None => return Ok(None),
                    }
                }
                Ok(Some(Value::Tuple(row)))
            }
            Self::Enumerate { inner, index } => {
                let Some(item) = inner.for_next()? else {
                    return Ok(None);
                };
                let position = *index;
                *index = index
                    .checked_add(1)
                    .ok_or_else(|| ExcType::overflow_error("enumerate index overflowed"))?;
                Ok(Some(Value::Tuple(vec![Value::Int(position), item])))
            }
            Self::Map { function, inners } => {
                let mut args = Vec::with_capacity(inners.len());
                for inner in inners.iter_mut() {
                    match inner.for_next()? {
                        Some(item) => args.push(item),
                        None => return Ok(None),
                    }
                }
                function.call(&args).map(Some)
            }
            Self::Filter { predicate, inner } => {
                while let Some(item) = inner.for_next()? {
                    let keep = match predicate {
                        Some(predicate) => predicate.call(std::slice::from_ref(&item))?.py_bool()?,
                        None => item.py_bool()?,
                    };
                    if keep {
                        return Ok(Some(item));
                    }
                }
                Ok(None)
            }
        }
    }
}

impl Iterator for PyIter {
    type Item = RunResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.for_next().transpose()
    }
}

impl fmt::Debug for PyIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PyIter")
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}
