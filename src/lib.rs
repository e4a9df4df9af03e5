//! Enumeration of finitely generated semigroups via the Froidure-Pin
//! algorithm.
//!
//! This crate provides:
//! - An element contract and concrete element families (transformations,
//!   partial permutations, bipartitions, boolean matrices, matrices over
//!   a pluggable semiring, partitioned binary relations, fast 8x8
//!   boolean matrices)
//! - The enumeration engine: deduplicated elements in length-lex order,
//!   left and right Cayley graphs, a length-reducing confluent rewriting
//!   system, minimal factorisations and idempotents
//! - Batched, cancellable enumeration and incremental generator addition
//!
//! # Example
//!
//! ```rust
//! use semigroups::{Semigroup, Transformation};
//!
//! let mut s = Semigroup::new(&[
//!     Transformation::new(vec![1, 0, 2]),
//!     Transformation::new(vec![0, 0, 2]),
//! ]);
//! assert_eq!(s.degree(), 3);
//! assert!(s.size() > 2);
//! let word = s.minimal_factorisation(2).unwrap();
//! assert_eq!(s.word_to_pos(&word), 2);
//! ```

pub mod bmat8;
pub mod element;
pub mod matrix;
pub mod recvec;
pub mod semigroup;
pub mod semiring;

// Re-exports for convenience
pub use bmat8::BMat8;
pub use element::{Bipartition, Element, PartialPerm, Pbr, Transformation};
pub use matrix::{BooleanMat, MatrixOverSemiring, ProjectiveMaxPlusMat};
pub use recvec::RecVec;
pub use semigroup::{
    Letter, Pos, Relation, Semigroup, SemigroupError, LIMIT_MAX, UNDEFINED,
};
pub use semiring::{
    BooleanSemiring, Integers, MaxPlus, MaxPlusFloat, MinPlus, MinPlusFloat, Natural, Semiring,
    TropicalMaxPlus, TropicalMinPlus,
};
