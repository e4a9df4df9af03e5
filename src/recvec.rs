//! Row-major dynamic matrix with a fixed number of columns.
//!
//! `RecVec` backs the right and left Cayley graphs (`RecVec<usize>`) and the
//! reduced-word flags (`RecVec<bool>`). Rows are appended as elements are
//! discovered; columns are appended when generators are added.

/// A rectangular vector: `nr_rows x nr_cols` entries stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecVec<T> {
    nr_cols: usize,
    nr_rows: usize,
    default: T,
    data: Vec<T>,
}

impl<T: Copy> RecVec<T> {
    /// Create an empty `RecVec` with the given number of columns.
    ///
    /// `default` is the value new cells are filled with.
    pub fn new(nr_cols: usize, default: T) -> Self {
        RecVec {
            nr_cols,
            nr_rows: 0,
            default,
            data: Vec::new(),
        }
    }

    /// Create a `RecVec` with `nr_rows` rows already filled with the default.
    pub fn with_rows(nr_cols: usize, nr_rows: usize, default: T) -> Self {
        RecVec {
            nr_cols,
            nr_rows,
            default,
            data: vec![default; nr_cols * nr_rows],
        }
    }

    pub fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    pub fn nr_cols(&self) -> usize {
        self.nr_cols
    }

    /// Append `nr` rows filled with the default value.
    pub fn add_rows(&mut self, nr: usize) {
        self.nr_rows += nr;
        self.data.resize(self.nr_cols * self.nr_rows, self.default);
    }

    /// Append `nr` columns filled with the default value.
    ///
    /// This re-lays out the storage and is only used when generators are
    /// added to an existing semigroup.
    pub fn add_cols(&mut self, nr: usize) {
        if nr == 0 {
            return;
        }
        let old = self.nr_cols;
        let new = old + nr;
        let mut data = Vec::with_capacity(new * self.nr_rows);
        for r in 0..self.nr_rows {
            data.extend_from_slice(&self.data[r * old..(r + 1) * old]);
            data.extend(std::iter::repeat(self.default).take(nr));
        }
        self.data = data;
        self.nr_cols = new;
    }

    /// Reserve capacity for `nr_rows` additional rows.
    pub fn reserve(&mut self, nr_rows: usize) {
        self.data.reserve(self.nr_cols * nr_rows);
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        debug_assert!(row < self.nr_rows && col < self.nr_cols);
        self.data[row * self.nr_cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, val: T) {
        debug_assert!(row < self.nr_rows && col < self.nr_cols);
        self.data[row * self.nr_cols + col] = val;
    }

    /// The `row`-th row as a slice.
    pub fn row(&self, row: usize) -> &[T] {
        debug_assert!(row < self.nr_rows);
        &self.data[row * self.nr_cols..(row + 1) * self.nr_cols]
    }
}
