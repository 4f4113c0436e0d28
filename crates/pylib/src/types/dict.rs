//! Insertion-ordered guest dicts.

use std::{
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

use ahash::RandomState;
use indexmap::{Equivalent, IndexMap};

use crate::{
    exception::{ExcType, RunResult},
    value::Value,
};

/// Key/value pairs backing a guest dict, in insertion order.
///
/// Keys are matched with guest equality and hashed consistently with it, so `1`, `1.0` and
/// `True` address the same entry. Lists and dicts are unhashable and rejected as keys.
#[derive(Clone, Default)]
pub struct DictPairs(IndexMap<DictKey, Value, RandomState>);

impl DictPairs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dict from pairs; later duplicates overwrite earlier values in place.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> RunResult<Self> {
        let mut dict = Self::new();
        for (key, value) in pairs {
            dict.insert(key, value)?;
        }
        Ok(dict)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up `key`. An unhashable key raises `TypeError` rather than missing.
    pub fn get(&self, key: &Value) -> RunResult<Option<&Value>> {
        check_hashable(key)?;
        Ok(self.0.get(&KeyRef(key)))
    }

    /// Inserts or overwrites, keeping the original key and its position. Returns the previous value.
    pub fn insert(&mut self, key: Value, value: Value) -> RunResult<Option<Value>> {
        check_hashable(&key)?;
        Ok(self.0.insert(DictKey(key), value))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &Value> {
        self.0.keys().map(|key| &key.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.0.iter().map(|(key, value)| (&key.0, value))
    }
}

impl PartialEq for DictPairs {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .0
                .iter()
                .all(|(key, value)| other.0.get(&KeyRef(&key.0)).is_some_and(|v| v.py_eq(value)))
    }
}

impl fmt::Debug for DictPairs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A stored key. Only built after `check_hashable` has passed.
#[derive(Clone)]
struct DictKey(Value);

impl PartialEq for DictKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.py_eq(&other.0)
    }
}

impl Eq for DictKey {}

impl Hash for DictKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(&self.0, state);
    }
}

/// Borrowed form of a key for lookups.
struct KeyRef<'a>(&'a Value);

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(self.0, state);
    }
}

impl Equivalent<DictKey> for KeyRef<'_> {
    fn equivalent(&self, key: &DictKey) -> bool {
        self.0.py_eq(&key.0)
    }
}

fn check_hashable(value: &Value) -> RunResult<()> {
    match value {
        Value::List(_) | Value::Dict(_) => Err(ExcType::type_error_unhashable_dict_key(value.type_name())),
        Value::Tuple(items) => items.iter().try_for_each(check_hashable),
        _ => Ok(()),
    }
}

/// Hashes a value so that guest-equal values hash alike.
///
/// Iterators, callables, instances and files compare by identity and hash by address.
fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::None => 0_u8.hash(state),
        Value::Bool(b) => hash_int(i64::from(*b), state),
        Value::Int(i) => hash_int(*i, state),
        Value::Float(f) => match float_as_int(*f) {
            Some(i) => hash_int(i, state),
            None => {
                2_u8.hash(state);
                f.to_bits().hash(state);
            }
        },
        Value::Str(s) => {
            3_u8.hash(state);
            s.hash(state);
        }
        Value::Bytes(b) => {
            4_u8.hash(state);
            b.hash(state);
        }
        Value::Tuple(items) => {
            5_u8.hash(state);
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Range(range) => {
            // same fields `Range::same_elements` compares
            6_u8.hash(state);
            let len = range.len();
            len.hash(state);
            if len > 0 {
                range.start().hash(state);
            }
            if len > 1 {
                range.step().hash(state);
            }
        }
        Value::Slice(slice) => {
            7_u8.hash(state);
            slice.hash(state);
        }
        Value::Iter(iter) => {
            8_u8.hash(state);
            Rc::as_ptr(iter).hash(state);
        }
        Value::Callable(function) => {
            9_u8.hash(state);
            function.identity().hash(state);
        }
        Value::Instance(instance) => {
            10_u8.hash(state);
            instance.identity().hash(state);
        }
        Value::File(file) => {
            11_u8.hash(state);
            Rc::as_ptr(file).hash(state);
        }
        // rejected by check_hashable before reaching a table
        Value::List(_) | Value::Dict(_) => 12_u8.hash(state),
    }
}

fn hash_int<H: Hasher>(i: i64, state: &mut H) {
    1_u8.hash(state);
    i.hash(state);
}

/// The integer equal to `f`, if there is one.
#[expect(clippy::cast_possible_truncation, reason = "f is integral and within i64 range")]
pub(crate) fn float_as_int(f: f64) -> Option<i64> {
    // -2^63 and 2^63 are both exact in f64
    let in_range = f >= i64::MIN as f64 && f < -(i64::MIN as f64);
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}
