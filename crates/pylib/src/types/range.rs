//! Lazy integer ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    exception::{ExcType, RunResult},
    types::{PyIter, Slice},
};

/// Python `range(start, stop, step)`.
///
/// Elements are computed on demand; `len`, indexing and membership are O(1).
/// The step is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    start: i64,
    stop: i64,
    step: i64,
}

impl Range {
    pub fn new(start: i64, stop: i64, step: i64) -> RunResult<Self> {
        if step == 0 {
            return Err(ExcType::value_error_range_step_zero());
        }
        Ok(Self { start, stop, step })
    }

    /// `range(stop)`.
    #[must_use]
    pub fn from_stop(stop: i64) -> Self {
        Self { start: 0, stop, step: 1 }
    }

    #[must_use]
    pub fn start(&self) -> i64 {
        self.start
    }

    #[must_use]
    pub fn stop(&self) -> i64 {
        self.stop
    }

    #[must_use]
    pub fn step(&self) -> i64 {
        self.step
    }

    /// Number of elements the eager materialization would hold.
    #[must_use]
    pub fn len(&self) -> usize {
        let (start, stop, step) = (i128::from(self.start), i128::from(self.stop), i128::from(self.step));
        let count = if step > 0 && start < stop {
            (stop - start - 1) / step + 1
        } else if step < 0 && start > stop {
            (start - stop - 1) / -step + 1
        } else {
            0
        };
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `range[index]`; negative indices count from the end.
    pub fn get(&self, index: i64) -> RunResult<i64> {
        let len = i128::try_from(self.len()).unwrap_or(i128::MAX);
        let index = i128::from(index);
        let index = if index < 0 { index + len } else { index };
        if index < 0 || index >= len {
            return Err(ExcType::index_error("range object index out of range"));
        }
        let value = i128::from(self.start) + index * i128::from(self.step);
        // every in-bounds element lies between start and stop
        i64::try_from(value).map_err(|_| ExcType::index_error("range object index out of range"))
    }

    /// `range[a:b:c]`, which is again a range.
    pub fn slice(&self, slice: &Slice) -> RunResult<Self> {
        let (start, stop, step) = slice.indices(self.len())?;
        let (base, stride) = (i128::from(self.start), i128::from(self.step));
        let to_i64 = |v: i128| i64::try_from(v).map_err(|_| ExcType::overflow_error("range slice out of bounds"));
        Self::new(
            to_i64(base + i128::from(start) * stride)?,
            to_i64(base + i128::from(stop) * stride)?,
            to_i64(stride * i128::from(step))?,
        )
    }

    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        let in_bounds = if self.step > 0 {
            self.start <= value && value < self.stop
        } else {
            self.stop < value && value <= self.start
        };
        in_bounds && (i128::from(value) - i128::from(self.start)) % i128::from(self.step) == 0
    }

    /// Last element, if any.
    #[must_use]
    pub fn last(&self) -> Option<i64> {
        let len = i128::try_from(self.len()).ok()?;
        if len == 0 {
            return None;
        }
        i64::try_from(i128::from(self.start) + (len - 1) * i128::from(self.step)).ok()
    }

    /// Range equality as the guest sees it: same elements, regardless of how they were spelled.
    #[must_use]
    pub fn same_elements(&self, other: &Self) -> bool {
        let len = self.len();
        len == other.len() && (len == 0 || (self.start == other.start && (len == 1 || self.step == other.step)))
    }

    /// A fresh, independent cursor over the range.
    #[must_use]
    pub fn iter(&self) -> PyIter {
        PyIter::from_range(self)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 1 {
            write!(f, "range({}, {})", self.start, self.stop)
        } else {
            write!(f, "range({}, {}, {})", self.start, self.stop, self.step)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eager(start: i64, stop: i64, step: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut v = start;
        while (step > 0 && v < stop) || (step < 0 && v > stop) {
            out.push(v);
            v += step;
        }
        out
    }

    #[test]
    fn len_matches_eager_count() {
        for &(start, stop, step) in &[(0, 10, 1), (0, 10, 3), (10, 0, -3), (5, 5, 1), (5, 0, 1), (-7, 7, 2), (3, -9, -4)] {
            let range = Range::new(start, stop, step).unwrap();
            assert_eq!(range.len(), eager(start, stop, step).len(), "range({start}, {stop}, {step})");
        }
    }

    #[test]
    fn get_is_start_plus_index_times_step() {
        let range = Range::new(2, 20, 3).unwrap();
        let expected = eager(2, 20, 3);
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(range.get(i64::try_from(i).unwrap()).unwrap(), *want);
        }
        assert_eq!(range.get(-1).unwrap(), 17);
        assert!(range.get(6).is_err());
        assert!(range.get(-7).is_err());
    }

    #[test]
    fn zero_step_is_rejected() {
        let err = Range::new(0, 5, 0).unwrap_err();
        assert_eq!(err.exc_type(), ExcType::ValueError);
    }

    #[test]
    fn extreme_bounds_do_not_overflow() {
        let range = Range::new(i64::MIN, i64::MAX, 1).unwrap();
        assert_eq!(range.len(), usize::try_from(u64::MAX).unwrap_or(usize::MAX));
        assert_eq!(range.last(), Some(i64::MAX - 1));
    }

    #[test]
    fn slice_yields_range() {
        let range = Range::from_stop(10);
        let sliced = range.slice(&Slice::new(Some(2), Some(8), Some(2))).unwrap();
        assert_eq!(sliced, Range::new(2, 8, 2).unwrap());

        let reversed = range.slice(&Slice::new(None, None, Some(-1))).unwrap();
        assert_eq!(reversed.len(), 10);
        assert_eq!(reversed.get(0).unwrap(), 9);
        assert_eq!(reversed.get(-1).unwrap(), 0);
    }

    #[test]
    fn contains_respects_step() {
        let range = Range::new(10, 0, -2).unwrap();
        assert!(range.contains(10));
        assert!(range.contains(2));
        assert!(!range.contains(0));
        assert!(!range.contains(5));
    }
}
