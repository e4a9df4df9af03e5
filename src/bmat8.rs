//! Fast boolean matrices of dimension up to 8.
//!
//! A `BMat8` packs an 8x8 boolean matrix into a single `u64`, rows first,
//! the (0, 0) entry in the most significant bit. Matrices of smaller
//! dimension embed in the top-left corner with the rest zero, which does
//! not affect any product.

use crate::element::Element;
use std::fmt;
use std::ops::Mul;

/// An 8x8 boolean matrix stored in one machine word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BMat8(u64);

impl BMat8 {
    /// The matrix whose rows are the 8 bytes of `data`, top row first.
    pub fn new(data: u64) -> Self {
        BMat8(data)
    }

    /// Build from explicit rows; missing entries are taken to be 0.
    pub fn from_rows(rows: &[Vec<bool>]) -> Self {
        assert!(rows.len() <= 8);
        let mut out = BMat8(0);
        for (i, row) in rows.iter().enumerate() {
            assert!(row.len() <= 8);
            for (j, &val) in row.iter().enumerate() {
                out.set(i, j, val);
            }
        }
        out
    }

    pub fn to_int(self) -> u64 {
        self.0
    }

    pub fn get(self, i: usize, j: usize) -> bool {
        debug_assert!(i < 8 && j < 8);
        (self.0 << (8 * i + j)) >> 63 == 1
    }

    pub fn set(&mut self, i: usize, j: usize, val: bool) {
        debug_assert!(i < 8 && j < 8);
        let mask = 1u64 << (63 - 8 * i - j);
        if val {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    /// The transpose, by the block-swap technique of Knuth AoCP 4A.
    pub fn transpose(self) -> BMat8 {
        let mut x = self.0;
        let mut y = (x ^ (x >> 7)) & 0x00aa_00aa_00aa_00aa;
        x = x ^ y ^ (y << 7);
        y = (x ^ (x >> 14)) & 0x0000_cccc_0000_cccc;
        x = x ^ y ^ (y << 14);
        y = (x ^ (x >> 28)) & 0x0000_0000_f0f0_f0f0;
        x = x ^ y ^ (y << 28);
        BMat8(x)
    }

    /// The 8x8 identity matrix.
    pub fn identity() -> BMat8 {
        BMat8(0x8040_2010_0804_0201)
    }
}

impl Mul for BMat8 {
    type Output = BMat8;

    /// Boolean matrix product: entry (i, j) is set when row i of `self`
    /// meets column j of `rhs`.
    fn mul(self, rhs: BMat8) -> BMat8 {
        let yt = rhs.transpose().0;
        let mut data = 0u64;
        for i in 0..8 {
            let row = (self.0 >> (56 - 8 * i)) & 0xff;
            let mut bits = 0u64;
            for j in 0..8 {
                let col = (yt >> (56 - 8 * j)) & 0xff;
                if row & col != 0 {
                    bits |= 1 << (7 - j);
                }
            }
            data |= bits << (56 - 8 * i);
        }
        BMat8(data)
    }
}

impl fmt::Display for BMat8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..8 {
            for j in 0..8 {
                write!(f, "{}", u8::from(self.get(i, j)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Element for BMat8 {
    fn degree(&self) -> usize {
        8
    }

    fn complexity(&self) -> usize {
        1
    }

    fn one(&self) -> Self {
        BMat8::identity()
    }

    fn redefine(&mut self, x: &Self, y: &Self) {
        *self = *x * *y;
    }
}
