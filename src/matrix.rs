//! Matrix elements: boolean matrices and matrices over a semiring.

use crate::element::Element;
use crate::semiring::{MaxPlus, Semiring, NEGATIVE_INFINITY};
use std::fmt;
use std::hash::Hash;

/// A square matrix over the booleans.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BooleanMat {
    dim: usize,
    entries: Vec<bool>,
}

impl BooleanMat {
    pub fn new(rows: Vec<Vec<bool>>) -> Self {
        let dim = rows.len();
        let mut entries = Vec::with_capacity(dim * dim);
        for row in &rows {
            assert_eq!(row.len(), dim, "matrix must be square");
            entries.extend_from_slice(row);
        }
        BooleanMat { dim, entries }
    }

    /// The all-false matrix of the given dimension.
    pub fn zero(dim: usize) -> Self {
        BooleanMat {
            dim,
            entries: vec![false; dim * dim],
        }
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.entries[i * self.dim + j]
    }
}

impl Element for BooleanMat {
    fn degree(&self) -> usize {
        self.dim
    }

    fn complexity(&self) -> usize {
        self.dim * self.dim * self.dim
    }

    fn one(&self) -> Self {
        let mut out = BooleanMat::zero(self.dim);
        for i in 0..self.dim {
            out.entries[i * self.dim + i] = true;
        }
        out
    }

    fn redefine(&mut self, x: &Self, y: &Self) {
        debug_assert_eq!(x.dim, y.dim);
        let n = x.dim;
        for i in 0..n {
            for j in 0..n {
                self.entries[i * n + j] =
                    (0..n).any(|k| x.entries[i * n + k] && y.entries[k * n + j]);
            }
        }
    }
}

/// A square matrix with entries in a semiring `S` over the scalar `T`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatrixOverSemiring<T, S> {
    dim: usize,
    entries: Vec<T>,
    semiring: S,
}

impl<T, S> MatrixOverSemiring<T, S>
where
    T: Clone + Eq + Hash + Ord + fmt::Debug,
    S: Semiring<T> + Clone + Eq + Hash + Ord + fmt::Debug,
{
    pub fn new(rows: Vec<Vec<T>>, semiring: S) -> Self {
        let dim = rows.len();
        let mut entries = Vec::with_capacity(dim * dim);
        for row in rows {
            assert_eq!(row.len(), dim, "matrix must be square");
            entries.extend(row);
        }
        MatrixOverSemiring {
            dim,
            entries,
            semiring,
        }
    }

    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.entries[i * self.dim + j]
    }

    pub fn semiring(&self) -> &S {
        &self.semiring
    }
}

impl<T, S> Element for MatrixOverSemiring<T, S>
where
    T: Clone + Eq + Hash + Ord + fmt::Debug,
    S: Semiring<T> + Clone + Eq + Hash + Ord + fmt::Debug,
{
    fn degree(&self) -> usize {
        self.dim
    }

    fn complexity(&self) -> usize {
        self.dim * self.dim * self.dim
    }

    fn one(&self) -> Self {
        let mut entries = Vec::with_capacity(self.dim * self.dim);
        for i in 0..self.dim {
            for j in 0..self.dim {
                entries.push(if i == j {
                    self.semiring.one()
                } else {
                    self.semiring.zero()
                });
            }
        }
        MatrixOverSemiring {
            dim: self.dim,
            entries,
            semiring: self.semiring.clone(),
        }
    }

    fn redefine(&mut self, x: &Self, y: &Self) {
        debug_assert_eq!(x.dim, y.dim);
        let n = x.dim;
        let s = &x.semiring;
        for i in 0..n {
            for j in 0..n {
                let mut acc = s.zero();
                for k in 0..n {
                    acc = s.plus(
                        acc,
                        s.times(x.entries[i * n + k].clone(), y.entries[k * n + j].clone()),
                    );
                }
                self.entries[i * n + j] = acc;
            }
        }
    }
}

/// A max-plus matrix normalised so that its maximum finite entry is 0.
///
/// Normalisation happens after every product, so equal projective
/// matrices compare equal even when they arise from different scalings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectiveMaxPlusMat {
    dim: usize,
    entries: Vec<i64>,
}

impl ProjectiveMaxPlusMat {
    pub fn new(rows: Vec<Vec<i64>>) -> Self {
        let dim = rows.len();
        let mut entries = Vec::with_capacity(dim * dim);
        for row in &rows {
            assert_eq!(row.len(), dim, "matrix must be square");
            entries.extend_from_slice(row);
        }
        let mut out = ProjectiveMaxPlusMat { dim, entries };
        out.normalise();
        out
    }

    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.entries[i * self.dim + j]
    }

    fn normalise(&mut self) {
        let norm = self.entries.iter().copied().max().unwrap_or(NEGATIVE_INFINITY);
        if norm != NEGATIVE_INFINITY {
            for e in &mut self.entries {
                if *e != NEGATIVE_INFINITY {
                    *e -= norm;
                }
            }
        }
    }
}

impl Element for ProjectiveMaxPlusMat {
    fn degree(&self) -> usize {
        self.dim
    }

    fn complexity(&self) -> usize {
        self.dim * self.dim * self.dim
    }

    fn one(&self) -> Self {
        let s = MaxPlus;
        let mut entries = Vec::with_capacity(self.dim * self.dim);
        for i in 0..self.dim {
            for j in 0..self.dim {
                entries.push(if i == j { s.one() } else { s.zero() });
            }
        }
        ProjectiveMaxPlusMat {
            dim: self.dim,
            entries,
        }
    }

    fn redefine(&mut self, x: &Self, y: &Self) {
        debug_assert_eq!(x.dim, y.dim);
        let n = x.dim;
        let s = MaxPlus;
        for i in 0..n {
            for j in 0..n {
                let mut acc = s.zero();
                for k in 0..n {
                    acc = s.plus(acc, s.times(x.entries[i * n + k], y.entries[k * n + j]));
                }
                self.entries[i * n + j] = acc;
            }
        }
        self.normalise();
    }
}
