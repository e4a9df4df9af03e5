//! The element contract and the point-based element families.
//!
//! Anything a semigroup can be generated by implements [`Element`]:
//! equality, hashing and ordering come from the std traits, deep copies
//! from `Clone`, and the rest of the contract is degree, identity,
//! in-place multiplication and a cost hint. This module provides
//! transformations, partial permutations, bipartitions and partitioned
//! binary relations; matrices live in [`crate::matrix`] and
//! [`crate::bmat8`].

use std::fmt;
use std::hash::Hash;

/// A multiplicable element of a semigroup.
///
/// Implementations must make `redefine` associative and congruent with
/// `Eq`/`Hash`. The enumeration engine guarantees that the receiver of
/// `redefine` aliases neither argument.
pub trait Element: Clone + Eq + Hash + Ord + fmt::Debug {
    /// The number of points, rows or vertices the element acts on.
    fn degree(&self) -> usize;

    /// Approximate cost of one multiplication, in basic cell operations.
    ///
    /// Only ever compared against word lengths to decide between a direct
    /// product and a path-chase through the Cayley graph; must be
    /// strictly positive.
    fn complexity(&self) -> usize;

    /// The identity element of the same degree.
    fn one(&self) -> Self;

    /// Store the product `x * y` into `self`.
    fn redefine(&mut self, x: &Self, y: &Self);
}

/// A transformation of `{0, ..., n - 1}`, stored as its image vector.
///
/// Products compose left to right: `(x * y)(i) = y(x(i))`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transformation {
    images: Vec<u32>,
}

impl Transformation {
    pub fn new(images: Vec<u32>) -> Self {
        assert!(
            images.iter().all(|&x| (x as usize) < images.len()),
            "image of a point out of range"
        );
        Transformation { images }
    }

    pub fn images(&self) -> &[u32] {
        &self.images
    }
}

impl Element for Transformation {
    fn degree(&self) -> usize {
        self.images.len()
    }

    fn complexity(&self) -> usize {
        self.images.len()
    }

    fn one(&self) -> Self {
        Transformation {
            images: (0..self.images.len() as u32).collect(),
        }
    }

    fn redefine(&mut self, x: &Self, y: &Self) {
        debug_assert_eq!(x.degree(), y.degree());
        for i in 0..x.images.len() {
            self.images[i] = y.images[x.images[i] as usize];
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transformation({:?})", self.images)
    }
}

/// Image of an undefined point of a partial permutation.
const NOT_DEFINED: u32 = u32::MAX;

/// A partial injective map on `{0, ..., n - 1}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartialPerm {
    images: Vec<u32>,
}

impl PartialPerm {
    /// Build from the image vector directly, with `u32::MAX` marking
    /// undefined points.
    pub fn new(images: Vec<u32>) -> Self {
        let n = images.len();
        assert!(
            images.iter().all(|&x| x == NOT_DEFINED || (x as usize) < n),
            "image of a point out of range"
        );
        PartialPerm { images }
    }

    /// Build the map sending `domain[i]` to `range[i]` on `degree` points.
    pub fn from_domain(domain: &[u32], range: &[u32], degree: usize) -> Self {
        assert_eq!(domain.len(), range.len());
        let mut images = vec![NOT_DEFINED; degree];
        for (&d, &r) in domain.iter().zip(range.iter()) {
            assert!((d as usize) < degree && (r as usize) < degree);
            assert_eq!(images[d as usize], NOT_DEFINED, "domain point repeated");
            images[d as usize] = r;
        }
        PartialPerm { images }
    }

    pub fn images(&self) -> &[u32] {
        &self.images
    }

    /// The number of points where the map is defined.
    pub fn rank(&self) -> usize {
        self.images.iter().filter(|&&x| x != NOT_DEFINED).count()
    }
}

impl Element for PartialPerm {
    fn degree(&self) -> usize {
        self.images.len()
    }

    fn complexity(&self) -> usize {
        self.images.len()
    }

    fn one(&self) -> Self {
        PartialPerm {
            images: (0..self.images.len() as u32).collect(),
        }
    }

    fn redefine(&mut self, x: &Self, y: &Self) {
        debug_assert_eq!(x.degree(), y.degree());
        for i in 0..x.images.len() {
            self.images[i] = match x.images[i] {
                NOT_DEFINED => NOT_DEFINED,
                j => y.images[j as usize],
            };
        }
    }
}

/// A bipartition: a set partition of `{0, ..., 2n - 1}`, the first `n`
/// points being the top row of the diagram and the rest the bottom row.
///
/// Stored as a block lookup in canonical form (blocks numbered by first
/// occurrence). Products fuse the bottom of the left factor with the top
/// of the right factor and read off the partition induced on the outer
/// rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bipartition {
    blocks: Vec<u32>,
}

impl Bipartition {
    pub fn new(blocks: Vec<u32>) -> Self {
        assert!(blocks.len() % 2 == 0);
        assert!(blocks.iter().all(|&b| (b as usize) < blocks.len()));
        let mut renumber = vec![NOT_DEFINED; blocks.len()];
        let mut next = 0;
        let mut canonical = Vec::with_capacity(blocks.len());
        for &b in &blocks {
            if renumber[b as usize] == NOT_DEFINED {
                renumber[b as usize] = next;
                next += 1;
            }
            canonical.push(renumber[b as usize]);
        }
        Bipartition { blocks: canonical }
    }

    pub fn blocks(&self) -> &[u32] {
        &self.blocks
    }

    pub fn nr_blocks(&self) -> usize {
        self.blocks.iter().map(|&b| b as usize + 1).max().unwrap_or(0)
    }
}

fn find(parent: &mut [u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        // path halving
        let grand = parent[parent[x as usize] as usize];
        parent[x as usize] = grand;
        x = grand;
    }
    x
}

fn union(parent: &mut [u32], x: u32, y: u32) {
    let a = find(parent, x);
    let b = find(parent, y);
    if a != b {
        parent[b as usize] = a;
    }
}

impl Element for Bipartition {
    fn degree(&self) -> usize {
        self.blocks.len() / 2
    }

    fn complexity(&self) -> usize {
        self.blocks.len().max(1)
    }

    fn one(&self) -> Self {
        let n = self.degree() as u32;
        Bipartition {
            blocks: (0..n).chain(0..n).collect(),
        }
    }

    fn redefine(&mut self, x: &Self, y: &Self) {
        debug_assert_eq!(x.degree(), y.degree());
        let n = x.degree();
        // points 0..n are the top of x, n..2n the fused middle, 2n..3n the
        // bottom of y
        let mut parent: Vec<u32> = (0..3 * n as u32).collect();
        let mut seen: Vec<Option<u32>> = vec![None; 2 * n];
        for i in 0..2 * n {
            match seen[x.blocks[i] as usize] {
                Some(j) => union(&mut parent, j, i as u32),
                None => seen[x.blocks[i] as usize] = Some(i as u32),
            }
        }
        seen.iter_mut().for_each(|s| *s = None);
        for i in 0..2 * n {
            let p = (i + n) as u32;
            match seen[y.blocks[i] as usize] {
                Some(j) => union(&mut parent, j, p),
                None => seen[y.blocks[i] as usize] = Some(p),
            }
        }
        let mut renumber = vec![NOT_DEFINED; 3 * n];
        let mut next = 0;
        self.blocks.clear();
        for i in (0..n).chain(2 * n..3 * n) {
            let root = find(&mut parent, i as u32) as usize;
            if renumber[root] == NOT_DEFINED {
                renumber[root] = next;
                next += 1;
            }
            self.blocks.push(renumber[root]);
        }
    }
}

/// A partitioned binary relation: a binary relation on `2n` vertices, the
/// first `n` being the top row and the rest the bottom row.
///
/// Rows of the adjacency are kept sorted so that equal relations compare
/// equal. The product glues the bottom of the left factor to the top of
/// the right one and relates `u` to `v` whenever a path through the glued
/// middle connects them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pbr {
    adj: Vec<Vec<u32>>,
}

impl Pbr {
    pub fn new(adj: Vec<Vec<u32>>) -> Self {
        assert!(adj.len() % 2 == 0);
        let bound = adj.len() as u32;
        let mut adj = adj;
        for row in &mut adj {
            assert!(row.iter().all(|&v| v < bound));
            row.sort_unstable();
            row.dedup();
        }
        Pbr { adj }
    }

    pub fn adjacencies(&self) -> &[Vec<u32>] {
        &self.adj
    }
}

fn pbr_x_dfs(
    x: &Pbr,
    y: &Pbr,
    n: usize,
    v: usize,
    x_seen: &mut [bool],
    y_seen: &mut [bool],
    out: &mut [bool],
) {
    if !x_seen[v] {
        x_seen[v] = true;
        for &k in &x.adj[v] {
            if (k as usize) < n {
                out[k as usize] = true;
            } else {
                pbr_y_dfs(x, y, n, k as usize - n, x_seen, y_seen, out);
            }
        }
    }
}

fn pbr_y_dfs(
    x: &Pbr,
    y: &Pbr,
    n: usize,
    v: usize,
    x_seen: &mut [bool],
    y_seen: &mut [bool],
    out: &mut [bool],
) {
    if !y_seen[v] {
        y_seen[v] = true;
        for &k in &y.adj[v] {
            if (k as usize) >= n {
                out[k as usize] = true;
            } else {
                pbr_x_dfs(x, y, n, k as usize + n, x_seen, y_seen, out);
            }
        }
    }
}

impl Element for Pbr {
    fn degree(&self) -> usize {
        self.adj.len() / 2
    }

    fn complexity(&self) -> usize {
        let d = self.adj.len();
        d * d * d
    }

    fn one(&self) -> Self {
        let n = self.degree();
        let mut adj = Vec::with_capacity(2 * n);
        for i in 0..n {
            adj.push(vec![(i + n) as u32]);
        }
        for i in 0..n {
            adj.push(vec![i as u32]);
        }
        Pbr { adj }
    }

    fn redefine(&mut self, x: &Self, y: &Self) {
        debug_assert_eq!(x.degree(), y.degree());
        let n = x.degree();
        let mut x_seen = vec![false; 2 * n];
        let mut y_seen = vec![false; 2 * n];
        let mut out = vec![false; 2 * n];
        self.adj.clear();
        for i in 0..2 * n {
            x_seen.iter_mut().for_each(|s| *s = false);
            y_seen.iter_mut().for_each(|s| *s = false);
            out.iter_mut().for_each(|s| *s = false);
            if i < n {
                for &j in &x.adj[i] {
                    if (j as usize) < n {
                        out[j as usize] = true;
                    } else {
                        pbr_y_dfs(x, y, n, j as usize - n, &mut x_seen, &mut y_seen, &mut out);
                    }
                }
            } else {
                for &j in &y.adj[i] {
                    if (j as usize) >= n {
                        out[j as usize] = true;
                    } else {
                        pbr_x_dfs(x, y, n, j as usize + n, &mut x_seen, &mut y_seen, &mut out);
                    }
                }
            }
            self.adj.push(
                out.iter()
                    .enumerate()
                    .filter(|(_, &b)| b)
                    .map(|(v, _)| v as u32)
                    .collect(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product<T: Element>(x: &T, y: &T) -> T {
        let mut out = x.one();
        out.redefine(x, y);
        out
    }

    #[test]
    fn test_transformation_compose() {
        let x = Transformation::new(vec![1, 1, 2]);
        let y = Transformation::new(vec![2, 0, 1]);
        assert_eq!(product(&x, &y), Transformation::new(vec![0, 0, 1]));
    }

    #[test]
    fn test_transformation_identity() {
        let x = Transformation::new(vec![2, 0, 1, 1]);
        let e = x.one();
        assert_eq!(e, Transformation::new(vec![0, 1, 2, 3]));
        assert_eq!(product(&x, &e), x);
        assert_eq!(product(&e, &x), x);
    }

    #[test]
    fn test_transformation_associative() {
        let x = Transformation::new(vec![1, 1, 2]);
        let y = Transformation::new(vec![2, 0, 1]);
        let z = Transformation::new(vec![0, 0, 0]);
        assert_eq!(product(&product(&x, &y), &z), product(&x, &product(&y, &z)));
    }

    #[test]
    fn test_partial_perm_compose() {
        let x = PartialPerm::from_domain(&[0, 2], &[1, 0], 3);
        assert_eq!(x.images(), &[1, NOT_DEFINED, 0]);
        assert_eq!(x.rank(), 2);

        let xx = product(&x, &x);
        assert_eq!(xx.images(), &[NOT_DEFINED, NOT_DEFINED, 1]);
    }

    #[test]
    fn test_partial_perm_identity() {
        let x = PartialPerm::from_domain(&[4, 5, 0], &[10, 0, 1], 11);
        let e = x.one();
        assert_eq!(e.rank(), 11);
        assert_eq!(product(&x, &e), x);
        assert_eq!(product(&e, &x), x);
    }

    #[test]
    fn test_bipartition_canonical_form() {
        let x = Bipartition::new(vec![1, 1, 0, 2, 2, 0]);
        assert_eq!(x.blocks(), &[0, 0, 1, 2, 2, 1]);
        assert_eq!(x.degree(), 3);
        assert_eq!(x.nr_blocks(), 3);
    }

    #[test]
    fn test_bipartition_identity() {
        // e1 in the Temperley-Lieb monoid on 3 points
        let e1 = Bipartition::new(vec![0, 0, 1, 2, 2, 1]);
        let one = e1.one();
        assert_eq!(one.blocks(), &[0, 1, 2, 0, 1, 2]);
        assert_eq!(product(&e1, &one), e1);
        assert_eq!(product(&one, &e1), e1);
    }

    #[test]
    fn test_bipartition_hook_products() {
        let e1 = Bipartition::new(vec![0, 0, 1, 2, 2, 1]);
        let e2 = Bipartition::new(vec![0, 1, 1, 0, 2, 2]);
        // e1 e2 e1 = e1 and e2 e1 e2 = e2
        assert_eq!(product(&product(&e1, &e2), &e1), e1);
        assert_eq!(product(&product(&e2, &e1), &e2), e2);
        assert_ne!(product(&e1, &e2), product(&e2, &e1));
    }

    #[test]
    fn test_pbr_identity() {
        let x = Pbr::new(vec![
            vec![1],
            vec![4],
            vec![3],
            vec![1],
            vec![0, 2],
            vec![0, 3, 4, 5],
        ]);
        let one = x.one();
        assert_eq!(one.adjacencies(), &[vec![3], vec![4], vec![5], vec![0], vec![1], vec![2]]);
        assert_eq!(product(&x, &one), x);
        assert_eq!(product(&one, &x), x);
    }

    #[test]
    fn test_pbr_rows_sorted() {
        let x = Pbr::new(vec![vec![3, 1, 1], vec![], vec![0], vec![2]]);
        assert_eq!(x.adjacencies()[0], vec![1, 3]);
    }
}
