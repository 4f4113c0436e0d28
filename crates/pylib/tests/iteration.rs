/// Tests for the iterator protocol and the lazy builtins built on it.
use std::{cell::Cell, rc::Rc};

use pretty_assertions::assert_eq;
use pylib::{
    ArgValues, BuiltinsFunctions, ExcType, InstanceRef, PyIter, Range, SimpleException, TypeInfo, Value,
    builtins::{enumerate, filter, iter, map, next, range, reversed, zip},
};

fn ints(values: impl IntoIterator<Item = i64>) -> Vec<Value> {
    values.into_iter().map(Value::Int).collect()
}

fn int_list(values: impl IntoIterator<Item = i64>) -> Value {
    Value::list(ints(values))
}

/// Drains an iterator, panicking on any guest error.
fn drain(iter: PyIter) -> Vec<Value> {
    iter.collect::<Result<Vec<_>, _>>().unwrap()
}

fn pair(index: i64, item: &str) -> Value {
    Value::tuple(vec![Value::Int(index), Value::str(item)])
}

/// Range length always matches the number of elements produced.
#[test]
fn range_length_matches_eager_count() {
    for (start, stop, step) in [(0, 10, 1), (0, 10, 3), (10, 0, -3), (5, 5, 1), (-7, 7, 4), (3, -9, -5)] {
        let r = range(start, stop, step).unwrap();
        assert_eq!(r.len(), drain(r.iter()).len(), "range({start}, {stop}, {step})");
    }
}

/// Indexing is O(1) arithmetic, with negative indices counting from the end.
#[test]
fn range_index_is_start_plus_step() {
    let r = range(2, 20, 3).unwrap();
    for i in 0..6 {
        assert_eq!(r.get(i).unwrap(), 2 + i * 3);
    }
    assert_eq!(r.get(-1).unwrap(), 17);
    let err = r.get(6).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::IndexError);
}

/// Slicing a range through the subscript protocol yields another range.
#[test]
fn range_subscript_with_slice() {
    let r = Value::Range(Range::from_stop(10));
    let step = BuiltinsFunctions::Slice
        .call(ArgValues::new(vec![Value::Int(1), Value::Int(8), Value::Int(3)]))
        .unwrap();
    let sliced = r.py_getitem(&step).unwrap();
    let Value::Range(sliced) = sliced else {
        panic!("expected a range, got {sliced:?}");
    };
    assert_eq!(drain(sliced.iter()), ints([1, 4, 7]));
}

/// Zero step is rejected by the guest builtin too.
#[test]
fn range_builtin_rejects_zero_step() {
    let err = BuiltinsFunctions::Range
        .call(ArgValues::new(vec![Value::Int(0), Value::Int(5), Value::Int(0)]))
        .unwrap_err();
    assert_eq!(err.exc_type(), ExcType::ValueError);
    assert_eq!(err.message(), Some("range() arg 3 must not be zero"));
}

/// zip stops at the shortest input.
#[test]
fn zip_stops_at_shortest() {
    let zipped = zip(&[int_list(0..3), int_list(0..5), int_list(0..2)]).unwrap();
    assert_eq!(
        drain(zipped),
        vec![
            Value::tuple(ints([0, 0, 0])),
            Value::tuple(ints([1, 1, 1])),
        ]
    );
}

/// zip with no inputs is immediately exhausted.
#[test]
fn zip_without_inputs_is_empty() {
    assert!(drain(zip(&[]).unwrap()).is_empty());
}

/// enumerate counts from the given start.
#[test]
fn enumerate_with_start() {
    let letters = Value::list(vec![Value::str("a"), Value::str("b"), Value::str("c")]);
    assert_eq!(
        drain(enumerate(&letters, 5).unwrap()),
        vec![pair(5, "a"), pair(6, "b"), pair(7, "c")]
    );
}

/// The guest builtin accepts `start` as a keyword.
#[test]
fn enumerate_start_keyword() {
    let result = BuiltinsFunctions::Enumerate
        .call(ArgValues::with_kwargs(
            vec![Value::str("xy")],
            vec![("start".to_owned(), Value::Int(1))],
        ))
        .unwrap();
    assert_eq!(next(&result, None).unwrap(), pair(1, "x"));
    assert_eq!(next(&result, None).unwrap(), pair(2, "y"));
}

/// map calls the function exactly once per produced element and is lazy.
#[test]
fn map_is_lazy_and_calls_once_per_element() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let double = Value::function("double", move |args| {
        counter.set(counter.get() + 1);
        Ok(Value::Int(args[0].as_int()? * 2))
    });

    let mut mapped = map(double, &[int_list(1..=3)]).unwrap();
    assert_eq!(calls.get(), 0);
    assert_eq!(mapped.for_next().unwrap(), Some(Value::Int(2)));
    assert_eq!(calls.get(), 1);
    assert_eq!(drain(mapped), ints([4, 6]));
    assert_eq!(calls.get(), 3);
}

/// map with several iterables passes one argument from each.
#[test]
fn map_over_two_iterables() {
    let add = Value::function("add", |args| args[0].py_add(&args[1]));
    assert_eq!(drain(map(add, &[int_list([1, 2, 3]), int_list([10, 20])]).unwrap()), ints([11, 22]));
}

/// map needs at least one iterable.
#[test]
fn map_requires_iterable() {
    let err = map(Value::from(BuiltinsFunctions::Len), &[]).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
}

/// Builtins are first-class callables.
#[test]
fn map_with_builtin_len() {
    let words = Value::list(vec![Value::str("a"), Value::str("abc"), Value::str("")]);
    assert_eq!(drain(map(BuiltinsFunctions::Len.into(), &[words]).unwrap()), ints([1, 3, 0]));
}

/// filter with no predicate keeps truthy elements.
#[test]
fn filter_none_keeps_truthy() {
    let values = Value::list(vec![Value::Int(0), Value::Int(1), Value::str(""), Value::str("x"), Value::None]);
    assert_eq!(drain(filter(None, &values).unwrap()), vec![Value::Int(1), Value::str("x")]);
}

/// filter with a predicate.
#[test]
fn filter_with_predicate() {
    let even = Value::function("even", |args| Ok(Value::Bool(args[0].as_int()? % 2 == 0)));
    assert_eq!(drain(filter(Some(even), &int_list(0..7)).unwrap()), ints([0, 2, 4, 6]));
}

/// Predicate errors propagate unchanged.
#[test]
fn filter_propagates_errors() {
    let failing = Value::function("failing", |_| Err(SimpleException::new_msg(ExcType::ValueError, "boom").into()));
    let mut filtered = filter(Some(failing), &int_list([1])).unwrap();
    let err = filtered.for_next().unwrap_err();
    assert_eq!(err.exc_type(), ExcType::ValueError);
}

/// reversed works on lists, strings and ranges.
#[test]
fn reversed_sequences() {
    assert_eq!(drain(reversed(&int_list(1..=3)).unwrap()), ints([3, 2, 1]));
    assert_eq!(
        drain(reversed(&Value::str("ab")).unwrap()),
        vec![Value::str("b"), Value::str("a")]
    );
    let r = Value::Range(range(0, 10, 3).unwrap());
    assert_eq!(drain(reversed(&r).unwrap()), ints([9, 6, 3, 0]));
}

/// Iterators are not reversible.
#[test]
fn reversed_rejects_iterators() {
    let it = iter(&int_list([1])).unwrap();
    let err = reversed(&it).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
    assert_eq!(err.message(), Some("'iterator' object is not reversible"));
}

/// next raises StopIteration on exhaustion unless a default is given.
#[test]
fn next_default_and_stop_iteration() {
    let it = iter(&int_list([1])).unwrap();
    assert_eq!(next(&it, None).unwrap(), Value::Int(1));
    assert_eq!(next(&it, Some(Value::str("done"))).unwrap(), Value::str("done"));
    let err = next(&it, None).unwrap_err();
    assert!(err.is_stop_iteration());
}

/// Once exhausted, an iterator stays exhausted even if its source grows.
#[test]
fn exhaustion_is_permanent() {
    let list = int_list([1]);
    let it = iter(&list).unwrap();
    assert_eq!(next(&it, None).unwrap(), Value::Int(1));
    assert!(next(&it, None).is_err());
    if let Value::List(items) = &list {
        items.borrow_mut().push(Value::Int(2));
    }
    assert!(next(&it, None).unwrap_err().is_stop_iteration());
}

/// iter() of an iterator returns the same iterator, so both names share state.
#[test]
fn iter_of_iterator_shares_state() {
    let first = iter(&int_list([1, 2, 3])).unwrap();
    let second = iter(&first).unwrap();
    assert_eq!(next(&first, None).unwrap(), Value::Int(1));
    assert_eq!(next(&second, None).unwrap(), Value::Int(2));
    assert_eq!(next(&first, None).unwrap(), Value::Int(3));
}

/// next() needs an iterator, not merely an iterable.
#[test]
fn next_rejects_non_iterator() {
    let err = next(&int_list([1]), None).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
    assert_eq!(err.message(), Some("'list' object is not an iterator"));
}

/// Non-iterables raise TypeError.
#[test]
fn iter_rejects_non_iterable() {
    let err = iter(&Value::Int(3)).unwrap_err();
    assert_eq!(err.message(), Some("'int' object is not iterable"));
}

/// Guest classes implementing `__iter__`/`__next__` plug into the same protocol.
#[test]
fn instance_iterator_protocol() {
    let countdown = TypeInfo::builder("Countdown")
        .method("__iter__", |args| Ok(args[0].clone()))
        .method("__next__", |args| {
            let Value::Instance(this) = &args[0] else {
                unreachable!("methods are bound to their instance");
            };
            let n = this.get_attr("n")?.as_int()?;
            if n == 0 {
                return Err(SimpleException::new(ExcType::StopIteration, None).into());
            }
            this.set_attr("n", Value::Int(n - 1));
            Ok(Value::Int(n))
        })
        .build();
    let instance = InstanceRef::new(&countdown);
    instance.set_attr("n", Value::Int(3));
    let value = Value::Instance(instance);

    assert_eq!(drain(value.py_iter().unwrap()), ints([3, 2, 1]));
    assert_eq!(next(&value, Some(Value::None)).unwrap(), Value::None);
}

/// A dict iterates over its keys in insertion order.
#[test]
fn dict_iterates_keys() {
    let d = Value::dict([(Value::str("b"), Value::Int(1)), (Value::str("a"), Value::Int(2))]).unwrap();
    assert_eq!(drain(d.py_iter().unwrap()), vec![Value::str("b"), Value::str("a")]);
}

/// Numerically equal keys collapse into one entry; unhashable keys are refused.
#[test]
fn dict_keys_follow_guest_equality() {
    let d = Value::dict([
        (Value::Int(1), Value::str("int")),
        (Value::Float(1.0), Value::str("float")),
        (Value::Bool(true), Value::str("bool")),
        (Value::Int(2), Value::None),
    ])
    .unwrap();
    assert_eq!(drain(d.py_iter().unwrap()), ints([1, 2]));
    assert_eq!(d.py_getitem(&Value::Float(1.0)).unwrap(), Value::str("bool"));

    let err = d.py_getitem(&Value::list(Vec::new())).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
    let err = Value::dict([(Value::list(Vec::new()), Value::None)]).unwrap_err();
    assert_eq!(err.message(), Some("cannot use 'list' as a dict key (unhashable type: 'list')"));
}

/// A file object iterates over its remaining lines.
#[test]
fn file_iterates_lines() {
    let stream = pylib::Stream::in_memory(
        b"one\ntwo\nthree".to_vec(),
        pylib::OpenMode::parse("r").unwrap(),
        pylib::StreamOptions::default(),
    );
    let file = Value::from(stream);
    let mut it = file.py_iter().unwrap();
    assert_eq!(it.for_next().unwrap(), Some(Value::str("one\n")));
    assert_eq!(drain(it), vec![Value::str("two\n"), Value::str("three")]);
    assert_eq!(drain(file.py_iter().unwrap()), Vec::<Value>::new());
}
