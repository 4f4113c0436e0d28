//! Implementation of the sorted() builtin function.

use std::{cmp::Ordering, mem};

use crate::{
    args::ArgValues,
    exception::{ExcType, RunResult},
    value::Value,
};

/// Returns a new list with the iterable's items in ascending order.
///
/// The sort is stable. `key` is applied exactly once per element. `reverse` flips the
/// comparison, so elements with equal keys keep their input order either way.
///
/// Keys that are not consistently ordered (NaN among floats, or a guest `__lt__` that
/// contradicts itself) produce some permutation of the input rather than a failure. The first
/// comparison error stops the sort and is returned.
pub fn sorted(iterable: &Value, key: Option<&Value>, reverse: bool) -> RunResult<Vec<Value>> {
    let items = iterable.py_list()?;
    let keys = match key {
        Some(func) if !matches!(func, Value::None) => items
            .iter()
            .map(|item| func.call(std::slice::from_ref(item)))
            .collect::<RunResult<Vec<_>>>()?,
        _ => items.clone(),
    };

    let order = merge_sort((0..items.len()).collect(), |a, b| {
        let (lhs, rhs) = if reverse { (&keys[b], &keys[a]) } else { (&keys[a], &keys[b]) };
        Ok(lhs.py_cmp(rhs)? == Ordering::Less)
    })?;

    let mut slots: Vec<Option<Value>> = items.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

/// Bottom-up stable merge sort of `order` by `less`.
///
/// Only ever asks "is the right element strictly less than the left one", so equal elements
/// keep their relative order and no comparator, however inconsistent, can make it panic.
fn merge_sort(
    mut order: Vec<usize>,
    mut less: impl FnMut(usize, usize) -> RunResult<bool>,
) -> RunResult<Vec<usize>> {
    let len = order.len();
    let mut merged = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        merged.clear();
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right) = (start, mid);
            while left < mid && right < end {
                if less(order[right], order[left])? {
                    merged.push(order[right]);
                    right += 1;
                } else {
                    merged.push(order[left]);
                    left += 1;
                }
            }
            merged.extend_from_slice(&order[left..mid]);
            merged.extend_from_slice(&order[right..end]);
            start = end;
        }
        mem::swap(&mut order, &mut merged);
        width *= 2;
    }
    Ok(order)
}

/// Implementation of the sorted() builtin function.
///
/// Accepts the same keyword arguments as CPython's `sorted()`: `key` and `reverse`.
pub fn builtin_sorted(args: ArgValues) -> RunResult<Value> {
    let (positional, mut kwargs) = args.into_parts();
    let key = kwargs.take("key");
    let reverse = match kwargs.take("reverse") {
        Some(flag) => flag.py_bool()?,
        None => false,
    };
    kwargs.check_empty("sorted")?;

    let count = positional.len();
    let mut positional = positional.into_iter();
    let (Some(iterable), None) = (positional.next(), positional.next()) else {
        return Err(ExcType::type_error(format!("sorted expected 1 argument, got {count}")));
    };
    sorted(&iterable, key.as_ref(), reverse).map(Value::list)
}
