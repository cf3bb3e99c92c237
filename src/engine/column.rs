//! Growable attribute column
//!
//! One `Column<T>` holds a single attribute for every row of a category.
//! All columns of a category stay index-aligned: row `i` refers to the same
//! logical entity in every column.
//!
//! Access is bounds-checked but never fails loudly: an out-of-range `get`
//! returns the zeroed sentinel (`T::default()`) and logs a diagnostic, an
//! out-of-range `set` no-ops. Growth doubles from a small constant and goes
//! through `try_reserve_exact` so a failed reallocation drops the pending
//! push instead of aborting.

use super::diag::{DiagKind, DiagLog};

/// Initial capacity on first push.
const BASE_CAPACITY: usize = 4;

pub struct Column<T> {
    data: Vec<T>,
}

impl<T: Clone + Default> Column<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Append a value, doubling capacity when full.
    ///
    /// On reallocation failure the push is dropped and an
    /// `AllocationFailure` diagnostic is emitted; the column keeps its
    /// previous contents.
    pub fn push(&mut self, value: T, diag: &mut DiagLog) {
        if self.data.len() == self.data.capacity() {
            let grow = if self.data.capacity() == 0 {
                BASE_CAPACITY
            } else {
                self.data.capacity()
            };
            if self.data.try_reserve_exact(grow).is_err() {
                diag.push(
                    DiagKind::AllocationFailure,
                    format!("column: failed to grow to {} slots", self.data.capacity() + grow),
                );
                return;
            }
        }
        self.data.push(value);
    }

    /// Read the value at `index`, or the zeroed sentinel when out of range.
    pub fn get(&self, index: usize, diag: &mut DiagLog) -> T {
        match self.data.get(index) {
            Some(v) => v.clone(),
            None => {
                diag.push(
                    DiagKind::IndexOutOfRange,
                    format!("column: get {} of {}", index, self.data.len()),
                );
                T::default()
            }
        }
    }

    /// Overwrite the value at `index`; out of range is a logged no-op.
    pub fn set(&mut self, index: usize, value: T, diag: &mut DiagLog) {
        match self.data.get_mut(index) {
            Some(slot) => *slot = value,
            None => diag.push(
                DiagKind::IndexOutOfRange,
                format!("column: set {} of {}", index, self.data.len()),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove `[start, end)`, shifting everything after it down.
    /// Used only by whole-scene deletion; invalid bounds are a no-op.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        if start < end && end <= self.data.len() {
            self.data.drain(start..end);
        }
    }

    /// Release storage and reset to empty.
    pub fn free(&mut self) {
        self.data = Vec::new();
    }
}

impl<T: Clone + Default> Default for Column<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        // Pushing K values and reading back 0..K yields them unchanged.
        for k in [0usize, 1, 3, 4, 5, 17, 100] {
            let mut diag = DiagLog::new();
            let mut col = Column::new();
            for i in 0..k {
                col.push(i as i32 * 7, &mut diag);
            }
            assert_eq!(col.len(), k);
            for i in 0..k {
                assert_eq!(col.get(i, &mut diag), i as i32 * 7);
            }
            assert!(diag.is_empty());
        }
    }

    #[test]
    fn test_doubling_growth() {
        let mut diag = DiagLog::new();
        let mut col = Column::new();
        col.push(1u32, &mut diag);
        assert_eq!(col.data.capacity(), BASE_CAPACITY);
        for v in 0..8u32 {
            col.push(v, &mut diag);
        }
        // 4 -> 8 -> 16
        assert_eq!(col.data.capacity(), 16);
    }

    #[test]
    fn test_get_out_of_range_returns_sentinel() {
        let mut diag = DiagLog::new();
        let mut col = Column::new();
        col.push(5i32, &mut diag);

        assert_eq!(col.get(1, &mut diag), 0);
        assert_eq!(diag.count_of(DiagKind::IndexOutOfRange), 1);
        // The valid slot is untouched.
        assert_eq!(col.get(0, &mut diag), 5);
    }

    #[test]
    fn test_set_out_of_range_is_noop() {
        let mut diag = DiagLog::new();
        let mut col = Column::new();
        col.push(5i32, &mut diag);
        col.set(3, 9, &mut diag);

        assert_eq!(col.len(), 1);
        assert_eq!(col.get(0, &mut diag), 5);
        assert_eq!(diag.count_of(DiagKind::IndexOutOfRange), 1);
    }

    #[test]
    fn test_remove_range_shifts_down() {
        let mut diag = DiagLog::new();
        let mut col = Column::new();
        for v in 0..6i32 {
            col.push(v, &mut diag);
        }
        col.remove_range(1, 3);
        assert_eq!(col.len(), 4);
        assert_eq!(col.get(0, &mut diag), 0);
        assert_eq!(col.get(1, &mut diag), 3);
        assert_eq!(col.get(3, &mut diag), 5);

        // Degenerate bounds do nothing.
        col.remove_range(3, 3);
        col.remove_range(2, 100);
        assert_eq!(col.len(), 4);
    }

    #[test]
    fn test_free_resets() {
        let mut diag = DiagLog::new();
        let mut col = Column::new();
        col.push(1i32, &mut diag);
        col.free();
        assert!(col.is_empty());
        assert_eq!(col.data.capacity(), 0);
    }
}
