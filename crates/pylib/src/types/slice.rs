//! Slice objects and index clamping.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::exception::{ExcType, RunResult};

/// Python `slice(start, stop, step)`; `None` bounds are open-ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slice {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl Slice {
    #[must_use]
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// Resolves the slice against a sequence of `len` elements.
    ///
    /// Negative bounds count from the end and out-of-range bounds clamp, so the result is always
    /// usable as `(start, stop, step)` over the sequence. A zero step raises `ValueError`.
    pub fn indices(&self, len: usize) -> RunResult<(i64, i64, i64)> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(ExcType::value_error_slice_step_zero());
        }
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: i64| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };
        let start = self.start.map_or(if step < 0 { upper } else { lower }, clamp);
        let stop = self.stop.map_or(if step < 0 { lower } else { upper }, clamp);
        Ok((start, stop, step))
    }

    /// Number of elements selected from a sequence of `len` elements.
    pub fn len_for(&self, len: usize) -> RunResult<usize> {
        let (start, stop, step) = self.indices(len)?;
        Ok(selected_count(start, stop, step))
    }

    /// Positions selected from a sequence of `len` elements, in slice order.
    pub fn positions(&self, len: usize) -> RunResult<impl Iterator<Item = usize>> {
        let (start, stop, step) = self.indices(len)?;
        let count = selected_count(start, stop, step);
        Ok((0..count).map(move |i| {
            let offset = i128::try_from(i).unwrap_or(i128::MAX) * i128::from(step);
            // clamping keeps every selected position within [0, len)
            usize::try_from(i128::from(start) + offset).unwrap_or_default()
        }))
    }
}

fn selected_count(start: i64, stop: i64, step: i64) -> usize {
    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let count = if step > 0 {
        if start < stop { (stop - start - 1) / step + 1 } else { 0 }
    } else if stop < start {
        (start - stop - 1) / -step + 1
    } else {
        0
    };
    usize::try_from(count).unwrap_or(usize::MAX)
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |v: Option<i64>| v.map_or_else(|| "None".to_owned(), |v| v.to_string());
        write!(f, "slice({}, {}, {})", part(self.start), part(self.stop), part(self.step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picked(slice: Slice, len: usize) -> Vec<usize> {
        slice.positions(len).unwrap().collect()
    }

    #[test]
    fn open_bounds_cover_everything() {
        assert_eq!(picked(Slice::default(), 4), vec![0, 1, 2, 3]);
        assert_eq!(picked(Slice::new(None, None, Some(-1)), 4), vec![3, 2, 1, 0]);
    }

    #[test]
    fn negative_bounds_count_from_end() {
        assert_eq!(picked(Slice::new(Some(-2), None, None), 5), vec![3, 4]);
        assert_eq!(picked(Slice::new(None, Some(-1), None), 5), vec![0, 1, 2, 3]);
    }

    #[test]
    fn out_of_range_bounds_clamp() {
        assert_eq!(picked(Slice::new(Some(-100), Some(100), None), 3), vec![0, 1, 2]);
        assert_eq!(picked(Slice::new(Some(100), Some(-100), Some(-1)), 3), vec![2, 1, 0]);
        assert!(picked(Slice::new(Some(5), Some(10), None), 3).is_empty());
    }

    #[test]
    fn stepped_selection() {
        assert_eq!(picked(Slice::new(Some(1), None, Some(2)), 6), vec![1, 3, 5]);
        assert_eq!(Slice::new(Some(1), None, Some(2)).len_for(6).unwrap(), 3);
    }

    #[test]
    fn zero_step_raises_value_error() {
        let err = Slice::new(None, None, Some(0)).indices(3).unwrap_err();
        assert_eq!(err.exc_type(), ExcType::ValueError);
    }
}
