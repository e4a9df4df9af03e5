//! Froidure-Pin enumeration of a finitely generated semigroup.
//!
//! [`Semigroup`] owns deep copies of its generators and enumerates every
//! distinct product of them, assigning each element a stable position in
//! length-lex order over the generators. Alongside the element list it
//! maintains:
//! - the right and left Cayley graphs,
//! - one minimal word per element (through the prefix/suffix tables),
//! - the rules of a length-reducing confluent rewriting system,
//! - the set of idempotents.
//!
//! Enumeration is incremental: it proceeds in batches, can be cancelled
//! between steps through an atomic flag, and generators can be added to a
//! partially or fully enumerated semigroup without recomputing what is
//! already known.

use crate::element::Element;
use crate::recvec::RecVec;
use log::info;
use rustc_hash::FxHashMap;
use std::cmp;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Index of a generator.
pub type Letter = usize;

/// Position of an element in the enumeration order.
pub type Pos = usize;

/// Sentinel distinct from every valid position.
pub const UNDEFINED: usize = usize::MAX;

/// Largest limit accepted by [`Semigroup::enumerate`].
pub const LIMIT_MAX: usize = usize::MAX;

const DEFAULT_BATCH_SIZE: usize = 8192;

/// Errors from validating a generating set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemigroupError {
    #[error("the generating set must be non-empty")]
    EmptyGeneratingSet,
    #[error("generators must share one degree: expected {expected}, found {found}")]
    DegreeMismatch { expected: usize, found: usize },
}

/// One rule of the presentation streamed by [`Semigroup::next_relation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The generators at the two letters are equal elements.
    Duplicate(Letter, Letter),
    /// The word of position `.0` followed by the letter `.1` rewrites to
    /// the strictly shorter word of position `.2`.
    Reduction(Pos, Letter, Pos),
}

/// A finitely generated semigroup, enumerated by the Froidure-Pin
/// algorithm.
#[derive(Clone)]
pub struct Semigroup<T: Element> {
    batch_size: usize,
    degree: usize,
    duplicate_gens: Vec<(Letter, Letter)>,
    elements: Vec<T>,
    /// Dedup index: element -> position, keyed by element equality/hash.
    map: FxHashMap<T, Pos>,
    /// Positions in enumeration (length-lex) order. Identical to
    /// `0..self.nr` until generators are added, at which point positions
    /// keep their values but the order is rebuilt.
    enumerate_order: Vec<Pos>,
    first: Vec<Letter>,
    last: Vec<Letter>,
    gens: Vec<T>,
    id: T,
    found_one: bool,
    pos_one: Pos,
    idempotents: Vec<Pos>,
    idempotents_found: bool,
    idempotents_start_pos: Pos,
    is_idempotent: Vec<bool>,
    left: RecVec<Pos>,
    length: Vec<usize>,
    /// `lenindex[l]` is the index in `enumerate_order` of the first
    /// element of length `l + 1`.
    lenindex: Vec<usize>,
    letter_to_pos: Vec<Pos>,
    max_threads: usize,
    multiplied: Vec<bool>,
    nr: usize,
    nrrules: usize,
    /// Frontier cursor into `enumerate_order`.
    pos: usize,
    prefix: Vec<Pos>,
    reduced: RecVec<bool>,
    relation_gen: Letter,
    relation_pos: Pos,
    report: bool,
    right: RecVec<Pos>,
    /// Sorted view: positions by element order, and the inverse ranks.
    sorted: Option<(Vec<Pos>, Vec<usize>)>,
    suffix: Vec<Pos>,
    tmp_product: T,
    wordlen: usize,
}

impl<T: Element> Semigroup<T> {
    /// Create the semigroup generated by `gens`.
    ///
    /// Panics if `gens` is empty or the degrees differ; use
    /// [`Semigroup::try_new`] to validate instead.
    pub fn new(gens: &[T]) -> Self {
        match Self::try_new(gens) {
            Ok(s) => s,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create the semigroup generated by `gens`, validating the
    /// generating set.
    ///
    /// Duplicate generators are allowed; they share a position but count
    /// as distinct generators.
    pub fn try_new(gens: &[T]) -> Result<Self, SemigroupError> {
        let head = gens.first().ok_or(SemigroupError::EmptyGeneratingSet)?;
        let degree = head.degree();
        for g in gens {
            if g.degree() != degree {
                return Err(SemigroupError::DegreeMismatch {
                    expected: degree,
                    found: g.degree(),
                });
            }
        }
        let id = head.one();
        let nrgens = gens.len();
        let mut s = Semigroup {
            batch_size: DEFAULT_BATCH_SIZE,
            degree,
            duplicate_gens: Vec::new(),
            elements: Vec::with_capacity(nrgens),
            map: FxHashMap::default(),
            enumerate_order: Vec::with_capacity(nrgens),
            first: Vec::with_capacity(nrgens),
            last: Vec::with_capacity(nrgens),
            gens: gens.to_vec(),
            tmp_product: id.clone(),
            id,
            found_one: false,
            pos_one: UNDEFINED,
            idempotents: Vec::new(),
            idempotents_found: false,
            idempotents_start_pos: 0,
            is_idempotent: Vec::new(),
            left: RecVec::new(nrgens, UNDEFINED),
            length: Vec::new(),
            lenindex: vec![0],
            letter_to_pos: Vec::with_capacity(nrgens),
            max_threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
            multiplied: Vec::new(),
            nr: 0,
            nrrules: 0,
            pos: 0,
            prefix: Vec::new(),
            reduced: RecVec::new(nrgens, false),
            relation_gen: 0,
            relation_pos: UNDEFINED,
            report: false,
            right: RecVec::new(nrgens, UNDEFINED),
            sorted: None,
            suffix: Vec::new(),
            wordlen: 0,
        };
        for i in 0..nrgens {
            let x = s.gens[i].clone();
            match s.map.get(&x).copied() {
                Some(pos) => {
                    s.letter_to_pos.push(pos);
                    s.duplicate_gens.push((i, s.first[pos]));
                }
                None => {
                    let n = s.nr;
                    if !s.found_one && x == s.id {
                        s.found_one = true;
                        s.pos_one = n;
                    }
                    s.elements.push(x.clone());
                    s.map.insert(x, n);
                    s.first.push(i);
                    s.last.push(i);
                    s.prefix.push(UNDEFINED);
                    s.suffix.push(UNDEFINED);
                    s.length.push(1);
                    s.enumerate_order.push(n);
                    s.letter_to_pos.push(n);
                    s.nr += 1;
                }
            }
        }
        s.nrrules = s.duplicate_gens.len();
        let seeded = s.nr;
        s.expand(seeded);
        s.lenindex.push(s.enumerate_order.len());
        Ok(s)
    }

    // ------------------------------------------------------------------
    // Queries that never enumerate
    // ------------------------------------------------------------------

    /// The common degree of the elements.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The number of generators, duplicates included.
    pub fn nr_generators(&self) -> usize {
        self.gens.len()
    }

    pub fn gens(&self) -> &[T] {
        &self.gens
    }

    pub fn generator(&self, a: Letter) -> &T {
        &self.gens[a]
    }

    /// The number of elements enumerated so far.
    pub fn current_size(&self) -> usize {
        self.elements.len()
    }

    /// The number of rules found so far.
    pub fn current_nr_rules(&self) -> usize {
        self.nrrules
    }

    /// Whether the semigroup is fully enumerated.
    pub fn is_done(&self) -> bool {
        self.pos >= self.nr
    }

    /// Whether any element beyond the generators has been enumerated.
    pub fn is_begun(&self) -> bool {
        self.pos >= self.lenindex[1]
    }

    /// The maximum length of any word enumerated so far.
    pub fn current_max_word_length(&self) -> usize {
        let last = self.lenindex[self.lenindex.len() - 1];
        if self.is_done() {
            self.lenindex.len() - 2
        } else if self.nr > last {
            self.lenindex.len()
        } else {
            self.lenindex.len() - 1
        }
    }

    /// The position of the `a`-th generator.
    ///
    /// This differs from `a` when there are duplicate generators or when
    /// generators were added after partial enumeration.
    pub fn letter_to_pos(&self, a: Letter) -> Pos {
        assert!(a < self.gens.len());
        self.letter_to_pos[a]
    }

    pub fn first_letter(&self, pos: Pos) -> Letter {
        assert!(pos < self.nr);
        self.first[pos]
    }

    pub fn final_letter(&self, pos: Pos) -> Letter {
        assert!(pos < self.nr);
        self.last[pos]
    }

    /// The position of the prefix of length `length(pos) - 1`, or
    /// `UNDEFINED` at length 1.
    pub fn prefix(&self, pos: Pos) -> Pos {
        assert!(pos < self.nr);
        self.prefix[pos]
    }

    /// The position of the suffix of length `length(pos) - 1`, or
    /// `UNDEFINED` at length 1.
    pub fn suffix(&self, pos: Pos) -> Pos {
        assert!(pos < self.nr);
        self.suffix[pos]
    }

    /// The length of the word of an already enumerated element.
    pub fn current_length(&self, pos: Pos) -> usize {
        assert!(pos < self.nr);
        self.length[pos]
    }

    /// The position of `x` if it is already known to belong to the
    /// semigroup, and `UNDEFINED` otherwise.
    pub fn current_position(&self, x: &T) -> Pos {
        if x.degree() != self.degree {
            return UNDEFINED;
        }
        self.map.get(x).copied().unwrap_or(UNDEFINED)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// The minimum number of new elements found by any call to
    /// [`Semigroup::enumerate`].
    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.batch_size = batch_size;
    }

    /// Cap the number of worker threads used to find idempotents.
    pub fn set_max_threads(&mut self, nr_threads: usize) {
        let hw = std::thread::available_parallelism().map_or(1, |n| n.get());
        self.max_threads = cmp::min(cmp::max(nr_threads, 1), hw);
    }

    /// Toggle progress reporting through the `log` crate.
    pub fn set_report(&mut self, report: bool) {
        self.report = report;
    }

    /// Pre-allocate room for `n` elements.
    pub fn reserve(&mut self, n: usize) {
        let extra = n.saturating_sub(self.nr);
        self.elements.reserve(extra);
        self.map.reserve(extra);
        self.enumerate_order.reserve(extra);
        self.first.reserve(extra);
        self.last.reserve(extra);
        self.prefix.reserve(extra);
        self.suffix.reserve(extra);
        self.length.reserve(extra);
        self.multiplied.reserve(extra);
        self.left.reserve(extra);
        self.right.reserve(extra);
        self.reduced.reserve(extra);
    }

    // ------------------------------------------------------------------
    // Queries that may enumerate
    // ------------------------------------------------------------------

    /// The size of the semigroup; triggers full enumeration.
    pub fn size(&mut self) -> usize {
        self.enumerate(LIMIT_MAX);
        self.elements.len()
    }

    /// The number of rules of the presentation; triggers full
    /// enumeration.
    pub fn nr_rules(&mut self) -> usize {
        self.enumerate(LIMIT_MAX);
        self.nrrules
    }

    /// The length of the word of the element at `pos`, enumerating as
    /// far as necessary.
    pub fn length(&mut self, pos: Pos) -> usize {
        if pos >= self.nr {
            self.enumerate(pos.saturating_add(1));
        }
        self.current_length(pos)
    }

    /// The element at `pos`, enumerating until it is known; `None` if
    /// the semigroup has fewer elements.
    pub fn at(&mut self, pos: Pos) -> Option<&T> {
        self.enumerate(pos.saturating_add(1));
        self.elements.get(pos)
    }

    /// The position of `x`, enumerating in batches until `x` is found or
    /// the semigroup is exhausted.
    pub fn position(&mut self, x: &T) -> Pos {
        if x.degree() != self.degree {
            return UNDEFINED;
        }
        loop {
            if let Some(&p) = self.map.get(x) {
                return p;
            }
            if self.is_done() {
                return UNDEFINED;
            }
            let limit = self.nr + 1;
            self.enumerate(limit);
        }
    }

    pub fn test_membership(&mut self, x: &T) -> bool {
        self.position(x) != UNDEFINED
    }

    /// The element at `pos` of the sorted view of the semigroup.
    pub fn sorted_at(&mut self, pos: Pos) -> Option<&T> {
        self.sort_elements();
        let (by_rank, _) = self.sorted.as_ref()?;
        let p = *by_rank.get(pos)?;
        Some(&self.elements[p])
    }

    /// The rank of `x` in the sorted view, or `UNDEFINED`.
    pub fn sorted_position(&mut self, x: &T) -> Pos {
        let p = self.position(x);
        if p == UNDEFINED {
            return UNDEFINED;
        }
        self.sort_elements();
        match &self.sorted {
            Some((_, rank_of)) => rank_of[p],
            None => UNDEFINED,
        }
    }

    /// All elements in sorted order.
    pub fn sorted_elements(&mut self) -> Vec<&T> {
        self.sort_elements();
        match &self.sorted {
            Some((by_rank, _)) => by_rank.iter().map(|&p| &self.elements[p]).collect(),
            None => Vec::new(),
        }
    }

    fn sort_elements(&mut self) {
        if self.sorted.is_some() {
            return;
        }
        self.enumerate(LIMIT_MAX);
        let mut by_rank: Vec<Pos> = (0..self.nr).collect();
        by_rank.sort_by(|&a, &b| self.elements[a].cmp(&self.elements[b]));
        let mut rank_of = vec![0; self.nr];
        for (rank, &p) in by_rank.iter().enumerate() {
            rank_of[p] = rank;
        }
        self.sorted = Some((by_rank, rank_of));
    }

    /// Entry `right(pos, a)` of the right Cayley graph: the position of
    /// `elements[pos] * gens[a]`. Triggers full enumeration.
    pub fn right(&mut self, pos: Pos, a: Letter) -> Pos {
        self.enumerate(LIMIT_MAX);
        self.right.get(pos, a)
    }

    /// Entry `left(pos, a)` of the left Cayley graph: the position of
    /// `gens[a] * elements[pos]`. Triggers full enumeration.
    pub fn left(&mut self, pos: Pos, a: Letter) -> Pos {
        self.enumerate(LIMIT_MAX);
        self.left.get(pos, a)
    }

    // ------------------------------------------------------------------
    // Words and products
    // ------------------------------------------------------------------

    /// The position of the product of the word `word` of letters; the
    /// relevant right Cayley rows must already be known.
    pub fn word_to_pos(&self, word: &[Letter]) -> Pos {
        assert!(!word.is_empty());
        let mut p = self.letter_to_pos[word[0]];
        for &a in &word[1..] {
            p = self.right.get(p, a);
        }
        p
    }

    /// The element equal to the product of the word `word` of letters.
    pub fn word_to_element(&self, word: &[Letter]) -> T {
        assert!(!word.is_empty());
        let mut x = self.gens[word[0]].clone();
        let mut tmp = self.id.clone();
        for &a in &word[1..] {
            tmp.redefine(&x, &self.gens[a]);
            std::mem::swap(&mut x, &mut tmp);
        }
        x
    }

    /// The position of `elements[i] * elements[j]`, computed by walking
    /// the Cayley graphs along the shorter of the two words.
    pub fn product_by_reduction(&self, mut i: Pos, mut j: Pos) -> Pos {
        assert!(i < self.nr && j < self.nr);
        if self.length[i] <= self.length[j] {
            while i != UNDEFINED {
                j = self.left.get(j, self.last[i]);
                i = self.prefix[i];
            }
            j
        } else {
            while j != UNDEFINED {
                i = self.right.get(i, self.first[j]);
                j = self.suffix[j];
            }
            i
        }
    }

    /// The position of `elements[i] * elements[j]`, multiplying directly
    /// when one product is cheaper than chasing the Cayley graphs.
    pub fn fast_product(&self, i: Pos, j: Pos) -> Pos {
        assert!(i < self.nr && j < self.nr);
        if self.id.complexity() <= self.length[i] + self.length[j] {
            let mut tmp = self.id.clone();
            tmp.redefine(&self.elements[i], &self.elements[j]);
            self.map.get(&tmp).copied().unwrap_or(UNDEFINED)
        } else {
            self.product_by_reduction(i, j)
        }
    }

    /// A minimal word over the generators for the element at `pos`,
    /// enumerating until that element is known.
    pub fn minimal_factorisation(&mut self, pos: Pos) -> Option<Vec<Letter>> {
        if pos >= self.nr {
            self.enumerate(pos.saturating_add(1));
            if pos >= self.nr {
                return None;
            }
        }
        let mut word = Vec::with_capacity(self.length[pos]);
        let mut p = pos;
        while p != UNDEFINED {
            word.push(self.first[p]);
            p = self.suffix[p];
        }
        Some(word)
    }

    /// A minimal word over the generators equal to `x`, or `None` if `x`
    /// is not an element.
    pub fn minimal_factorisation_elm(&mut self, x: &T) -> Option<Vec<Letter>> {
        let p = self.position(x);
        if p == UNDEFINED {
            None
        } else {
            self.minimal_factorisation(p)
        }
    }

    /// Alias for [`Semigroup::minimal_factorisation`]; the word produced
    /// is not guaranteed minimal for extended generating sets.
    pub fn factorisation(&mut self, pos: Pos) -> Option<Vec<Letter>> {
        self.minimal_factorisation(pos)
    }

    pub fn factorisation_elm(&mut self, x: &T) -> Option<Vec<Letter>> {
        self.minimal_factorisation_elm(x)
    }

    // ------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------

    /// Rewind [`Semigroup::next_relation`] to the first rule.
    pub fn reset_next_relation(&mut self) {
        self.relation_pos = UNDEFINED;
        self.relation_gen = 0;
    }

    /// The next rule of the presentation, or `None` when exhausted.
    ///
    /// Length-2 rules for duplicate generators come first; after that the
    /// rules stream in length-lex order of their left-hand sides. Taken
    /// together they form a length-reducing confluent rewriting system
    /// defining the semigroup. Triggers full enumeration.
    pub fn next_relation(&mut self) -> Option<Relation> {
        self.enumerate(LIMIT_MAX);
        if self.relation_pos == self.nr {
            return None;
        }
        if self.relation_pos == UNDEFINED {
            if self.relation_gen < self.duplicate_gens.len() {
                let (i, j) = self.duplicate_gens[self.relation_gen];
                self.relation_gen += 1;
                return Some(Relation::Duplicate(i, j));
            }
            self.relation_gen = 0;
            self.relation_pos = 0;
        }
        while self.relation_pos < self.nr {
            let i = self.enumerate_order[self.relation_pos];
            while self.relation_gen < self.gens.len() {
                let j = self.relation_gen;
                self.relation_gen += 1;
                // a pair is a rule when the product is not the chosen word
                // and the suffix part of the left-hand side is irreducible
                if !self.reduced.get(i, j)
                    && (self.relation_pos < self.lenindex[1] || self.reduced.get(self.suffix[i], j))
                {
                    return Some(Relation::Reduction(i, j, self.right.get(i, j)));
                }
            }
            self.relation_gen = 0;
            self.relation_pos += 1;
        }
        None
    }

    // ------------------------------------------------------------------
    // Idempotents
    // ------------------------------------------------------------------

    /// The number of idempotents; triggers full enumeration.
    pub fn nr_idempotents(&mut self) -> usize
    where
        T: Sync,
    {
        self.find_idempotents();
        self.idempotents.len()
    }

    /// Whether the element at `pos` is an idempotent; triggers full
    /// enumeration.
    pub fn is_idempotent(&mut self, pos: Pos) -> bool
    where
        T: Sync,
    {
        self.find_idempotents();
        assert!(pos < self.nr);
        self.is_idempotent[pos]
    }

    /// The positions of all idempotents, in increasing order; triggers
    /// full enumeration.
    pub fn idempotents(&mut self) -> &[Pos]
    where
        T: Sync,
    {
        self.find_idempotents();
        &self.idempotents
    }

    fn find_idempotents(&mut self)
    where
        T: Sync,
    {
        if self.idempotents_found {
            return;
        }
        self.enumerate(LIMIT_MAX);
        self.is_idempotent.resize(self.nr, false);
        let begin = self.idempotents_start_pos;
        let end = self.nr;
        if self.report {
            info!("looking for idempotents in [{}, {})", begin, end);
        }
        if self.max_threads == 1 || end - begin < 1024 {
            let mut tmp = self.id.clone();
            for p in begin..end {
                tmp.redefine(&self.elements[p], &self.elements[p]);
                if tmp == self.elements[p] {
                    self.is_idempotent[p] = true;
                    self.idempotents.push(p);
                }
            }
        } else {
            let nr_threads = cmp::min(self.max_threads, end - begin);
            let chunk = (end - begin + nr_threads - 1) / nr_threads;
            let elements = &self.elements;
            let id = &self.id;
            let results: Vec<Vec<Pos>> = std::thread::scope(|scope| {
                let mut handles = Vec::new();
                for t in 0..nr_threads {
                    let lo = begin + t * chunk;
                    let hi = cmp::min(lo + chunk, end);
                    if lo >= hi {
                        break;
                    }
                    handles.push(scope.spawn(move || {
                        let mut tmp = id.clone();
                        let mut local = Vec::new();
                        for p in lo..hi {
                            tmp.redefine(&elements[p], &elements[p]);
                            if tmp == elements[p] {
                                local.push(p);
                            }
                        }
                        local
                    }));
                }
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                    .collect()
            });
            // the ranges are disjoint and increasing, so concatenating
            // keeps the positions sorted
            for local in results {
                for p in local {
                    self.is_idempotent[p] = true;
                    self.idempotents.push(p);
                }
            }
        }
        self.idempotents_start_pos = self.nr;
        self.idempotents_found = true;
    }

    // ------------------------------------------------------------------
    // Enumeration
    // ------------------------------------------------------------------

    /// Enumerate until at least `limit` elements are known (raised to at
    /// least the batch size beyond the current count), or the semigroup
    /// is exhausted.
    pub fn enumerate(&mut self, limit: usize) {
        self.enumerate_interruptible(&AtomicBool::new(false), limit);
    }

    /// Like [`Semigroup::enumerate`], returning early once `killed` is
    /// observed set. The flag is checked between steps only, so the
    /// tables are consistent and enumeration resumable whenever this
    /// returns.
    pub fn enumerate_interruptible(&mut self, killed: &AtomicBool, limit: usize) {
        if self.pos >= self.nr || limit <= self.nr || killed.load(Ordering::Relaxed) {
            return;
        }
        let limit = cmp::max(limit, self.nr.saturating_add(self.batch_size));
        if self.report {
            info!("enumerating until at least {} elements", limit);
        }

        // multiply the generators by every generator
        if self.pos < self.lenindex[1] {
            let nr_shorter = self.nr;
            while self.pos < self.lenindex[1] && self.nr < limit && !killed.load(Ordering::Relaxed)
            {
                let i = self.enumerate_order[self.pos];
                let b = self.first[i];
                self.multiplied[i] = true;
                for j in 0..self.gens.len() {
                    self.tmp_product.redefine(&self.elements[i], &self.gens[j]);
                    match self.map.get(&self.tmp_product).copied() {
                        Some(q) => {
                            self.right.set(i, j, q);
                            self.nrrules += 1;
                        }
                        None => {
                            let n = self.nr;
                            self.is_one(n);
                            self.elements.push(self.tmp_product.clone());
                            self.map.insert(self.tmp_product.clone(), n);
                            self.first.push(b);
                            self.last.push(j);
                            self.length.push(2);
                            self.prefix.push(i);
                            self.suffix.push(self.letter_to_pos[j]);
                            self.reduced.set(i, j, true);
                            self.right.set(i, j, n);
                            self.enumerate_order.push(n);
                            self.nr += 1;
                        }
                    }
                }
                self.pos += 1;
            }
            if self.pos == self.lenindex[1] {
                // the length-1 class is closed; its left edges follow from
                // the generators' right rows
                for idx in 0..self.lenindex[1] {
                    let i = self.enumerate_order[idx];
                    let b = self.last[i];
                    for j in 0..self.gens.len() {
                        let v = self.right.get(self.letter_to_pos[j], b);
                        self.left.set(i, j, v);
                    }
                }
                self.wordlen += 1;
                self.lenindex.push(self.enumerate_order.len());
            }
            self.expand(self.nr - nr_shorter);
        }

        // multiply the words of length > 1 by every generator
        while self.pos != self.nr && self.nr < limit && !killed.load(Ordering::Relaxed) {
            let nr_shorter = self.nr;
            while self.pos != self.lenindex[self.wordlen + 1]
                && self.nr < limit
                && !killed.load(Ordering::Relaxed)
            {
                let i = self.enumerate_order[self.pos];
                let b = self.first[i];
                let s = self.suffix[i];
                self.multiplied[i] = true;
                for j in 0..self.gens.len() {
                    if !self.reduced.get(s, j) {
                        // w(s)·j already rewrites to the shorter word of r,
                        // so w(i)·j = b·w(r); read the product off the
                        // graphs instead of multiplying
                        let r = self.right.get(s, j);
                        if self.found_one && r == self.pos_one {
                            self.right.set(i, j, self.letter_to_pos[b]);
                        } else if self.prefix[r] != UNDEFINED {
                            let v =
                                self.right.get(self.left.get(self.prefix[r], b), self.last[r]);
                            self.right.set(i, j, v);
                        } else {
                            let v = self.right.get(self.letter_to_pos[b], self.last[r]);
                            self.right.set(i, j, v);
                        }
                    } else {
                        self.tmp_product.redefine(&self.elements[i], &self.gens[j]);
                        match self.map.get(&self.tmp_product).copied() {
                            Some(q) => {
                                self.right.set(i, j, q);
                                self.nrrules += 1;
                            }
                            None => {
                                let n = self.nr;
                                self.is_one(n);
                                self.elements.push(self.tmp_product.clone());
                                self.map.insert(self.tmp_product.clone(), n);
                                self.first.push(b);
                                self.last.push(j);
                                self.length.push(self.wordlen + 2);
                                self.prefix.push(i);
                                self.suffix.push(self.right.get(s, j));
                                self.reduced.set(i, j, true);
                                self.right.set(i, j, n);
                                self.enumerate_order.push(n);
                                self.nr += 1;
                            }
                        }
                    }
                }
                self.pos += 1;
            }
            if self.pos == self.lenindex[self.wordlen + 1] {
                // close the length class and fill its left edges
                for idx in self.lenindex[self.wordlen]..self.pos {
                    let i = self.enumerate_order[idx];
                    let p = self.prefix[i];
                    let b = self.last[i];
                    for j in 0..self.gens.len() {
                        let v = self.right.get(self.left.get(p, j), b);
                        self.left.set(i, j, v);
                    }
                }
                self.wordlen += 1;
                self.lenindex.push(self.enumerate_order.len());
            }
            self.expand(self.nr - nr_shorter);
            if self.report {
                info!(
                    "found {} elements, {} rules, max word length {}",
                    self.nr,
                    self.nrrules,
                    self.current_max_word_length()
                );
            }
        }
        if self.report && self.is_done() {
            info!(
                "fully enumerated: {} elements, {} rules",
                self.nr, self.nrrules
            );
        }
    }

    // ------------------------------------------------------------------
    // Adding generators
    // ------------------------------------------------------------------

    /// Add every element of `coll` as a new generator, preserving and
    /// extending everything already enumerated.
    ///
    /// Each element of `coll` becomes a generator whether or not it is
    /// already an element of the semigroup: generators form a multiset.
    /// The left Cayley graph, rules, idempotents and sorted view are
    /// rebuilt lazily; positions of existing elements never change.
    pub fn add_generators(&mut self, coll: &[T]) {
        if coll.is_empty() {
            return;
        }
        for x in coll {
            assert_eq!(
                x.degree(),
                self.degree,
                "new generators must have the degree of the semigroup"
            );
        }

        let old_nrgens = self.gens.len();
        let old_nr = self.nr;
        let mut nr_old_left = self.pos;

        // keep only the generators in the order; everything beyond is
        // re-adopted in the new length-lex order as the sweep reaches it
        self.enumerate_order.truncate(self.lenindex[1]);
        let mut old_new = vec![false; old_nr];
        for &p in &self.enumerate_order {
            old_new[p] = true;
        }

        for x in coll {
            match self.map.get(x).copied() {
                None => {
                    let n = self.nr;
                    let letter = self.gens.len();
                    self.gens.push(x.clone());
                    if !self.found_one && *x == self.id {
                        self.found_one = true;
                        self.pos_one = n;
                    }
                    self.elements.push(x.clone());
                    self.map.insert(x.clone(), n);
                    self.first.push(letter);
                    self.last.push(letter);
                    self.prefix.push(UNDEFINED);
                    self.suffix.push(UNDEFINED);
                    self.length.push(1);
                    self.letter_to_pos.push(n);
                    self.enumerate_order.push(n);
                    self.nr += 1;
                }
                Some(p) if self.letter_to_pos[self.first[p]] == p => {
                    // duplicate of an existing generator
                    let letter = self.gens.len();
                    self.gens.push(x.clone());
                    self.duplicate_gens.push((letter, self.first[p]));
                    self.letter_to_pos.push(p);
                }
                Some(p) => {
                    // an element already enumerated becomes a generator
                    let letter = self.gens.len();
                    self.gens.push(x.clone());
                    self.letter_to_pos.push(p);
                    self.enumerate_order.push(p);
                    self.first[p] = letter;
                    self.last[p] = letter;
                    self.prefix[p] = UNDEFINED;
                    self.suffix[p] = UNDEFINED;
                    self.length[p] = 1;
                    old_new[p] = true;
                }
            }
        }

        let new_nrgens = self.gens.len();

        // rewind the loop and invalidate the lazily regenerated artifacts
        self.idempotents_found = false;
        self.sorted = None;
        self.reset_next_relation();
        self.nrrules = self.duplicate_gens.len();
        self.pos = 0;
        self.wordlen = 0;
        self.lenindex.clear();
        self.lenindex.push(0);
        self.lenindex.push(new_nrgens - self.duplicate_gens.len());

        // widen the tables; reduced is rebuilt because every row is
        // reclassified during the sweep below
        self.reduced = RecVec::with_rows(new_nrgens, self.nr, false);
        self.left.add_cols(new_nrgens - old_nrgens);
        self.right.add_cols(new_nrgens - old_nrgens);
        self.left.add_rows(self.nr - old_nr);
        self.right.add_rows(self.nr - old_nr);
        self.multiplied.resize(self.nr, false);

        // re-sweep until every row that had been multiplied through the
        // old generators has also been multiplied through the new ones
        while nr_old_left > 0 {
            let nr_shorter = self.nr;
            while self.pos < self.lenindex[self.wordlen + 1] && nr_old_left > 0 {
                let i = self.enumerate_order[self.pos];
                let b = self.first[i];
                let s = self.suffix[i];
                if self.multiplied[i] {
                    nr_old_left -= 1;
                    // products through the old letters are already known;
                    // reclassify them in the new order
                    for j in 0..old_nrgens {
                        let k = self.right.get(i, j);
                        if !old_new[k] {
                            self.first[k] = b;
                            self.last[k] = j;
                            self.length[k] = self.wordlen + 2;
                            self.prefix[k] = i;
                            self.suffix[k] = if self.wordlen == 0 {
                                self.letter_to_pos[j]
                            } else {
                                self.right.get(s, j)
                            };
                            self.reduced.set(i, j, true);
                            self.enumerate_order.push(k);
                            old_new[k] = true;
                        } else if s == UNDEFINED || self.reduced.get(s, j) {
                            // counted so the rule total matches a fresh run
                            self.nrrules += 1;
                        }
                    }
                    for j in old_nrgens..new_nrgens {
                        self.closure_update(i, j, b, s, &mut old_new, old_nr);
                    }
                } else {
                    self.multiplied[i] = true;
                    for j in 0..new_nrgens {
                        self.closure_update(i, j, b, s, &mut old_new, old_nr);
                    }
                }
                self.pos += 1;
            }
            if self.pos == self.lenindex[self.wordlen + 1] {
                if self.wordlen == 0 {
                    for idx in 0..self.pos {
                        let i = self.enumerate_order[idx];
                        let b = self.last[i];
                        for j in 0..new_nrgens {
                            let v = self.right.get(self.letter_to_pos[j], b);
                            self.left.set(i, j, v);
                        }
                    }
                } else {
                    for idx in self.lenindex[self.wordlen]..self.pos {
                        let i = self.enumerate_order[idx];
                        let p = self.prefix[i];
                        let b = self.last[i];
                        for j in 0..new_nrgens {
                            let v = self.right.get(self.left.get(p, j), b);
                            self.left.set(i, j, v);
                        }
                    }
                }
                self.wordlen += 1;
                self.lenindex.push(self.enumerate_order.len());
            }
            self.expand(self.nr - nr_shorter);
        }
    }

    /// One step of the re-sweep after adding generators: classify the
    /// product `elements[i] * gens[j]` in the new enumeration order.
    fn closure_update(
        &mut self,
        i: Pos,
        j: Letter,
        b: Letter,
        s: Pos,
        old_new: &mut [bool],
        old_nr: usize,
    ) {
        if self.wordlen != 0 && !self.reduced.get(s, j) {
            let r = self.right.get(s, j);
            if self.found_one && r == self.pos_one {
                self.right.set(i, j, self.letter_to_pos[b]);
            } else if self.prefix[r] != UNDEFINED {
                let v = self.right.get(self.left.get(self.prefix[r], b), self.last[r]);
                self.right.set(i, j, v);
            } else {
                let v = self.right.get(self.letter_to_pos[b], self.last[r]);
                self.right.set(i, j, v);
            }
        } else {
            self.tmp_product.redefine(&self.elements[i], &self.gens[j]);
            match self.map.get(&self.tmp_product).copied() {
                None => {
                    let n = self.nr;
                    self.is_one(n);
                    self.elements.push(self.tmp_product.clone());
                    self.map.insert(self.tmp_product.clone(), n);
                    self.first.push(b);
                    self.last.push(j);
                    self.length.push(self.wordlen + 2);
                    self.prefix.push(i);
                    self.suffix.push(if self.wordlen == 0 {
                        self.letter_to_pos[j]
                    } else {
                        self.right.get(s, j)
                    });
                    self.reduced.set(i, j, true);
                    self.right.set(i, j, n);
                    self.enumerate_order.push(n);
                    self.nr += 1;
                }
                Some(k) if k < old_nr && !old_new[k] => {
                    // an old element reached for the first time in the new
                    // order: it gets its word from (i, j)
                    self.first[k] = b;
                    self.last[k] = j;
                    self.length[k] = self.wordlen + 2;
                    self.prefix[k] = i;
                    self.suffix[k] = if self.wordlen == 0 {
                        self.letter_to_pos[j]
                    } else {
                        self.right.get(s, j)
                    };
                    self.reduced.set(i, j, true);
                    self.right.set(i, j, k);
                    self.enumerate_order.push(k);
                    old_new[k] = true;
                }
                Some(k) => {
                    self.right.set(i, j, k);
                    self.nrrules += 1;
                }
            }
        }
    }

    /// Add to `self` only those elements of `coll` not already in the
    /// closure at the moment each is processed.
    pub fn closure(&mut self, coll: &[T]) {
        for x in coll {
            if !self.test_membership(x) {
                self.add_generators(std::slice::from_ref(x));
            }
        }
    }

    /// A copy of `self` with the elements of `coll` adjoined as
    /// generators.
    pub fn copy_add_generators(&self, coll: &[T]) -> Self {
        let mut copy = self.clone();
        copy.add_generators(coll);
        copy
    }

    /// A copy of `self` closed under the elements of `coll` not already
    /// in the closure.
    pub fn copy_closure(&self, coll: &[T]) -> Self {
        let mut copy = self.clone();
        copy.closure(coll);
        copy
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    /// Grow the per-element tables by `nr` rows.
    fn expand(&mut self, nr: usize) {
        self.left.add_rows(nr);
        self.right.add_rows(nr);
        self.reduced.add_rows(nr);
        self.multiplied.resize(self.multiplied.len() + nr, false);
    }

    /// Record the identity if `tmp_product` is it and none was found yet.
    fn is_one(&mut self, pos: Pos) {
        if !self.found_one && self.tmp_product == self.id {
            self.pos_one = pos;
            self.found_one = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmat8::BMat8;
    use crate::element::{Bipartition, PartialPerm, Pbr, Transformation};
    use crate::matrix::{BooleanMat, MatrixOverSemiring};
    use crate::semiring::TropicalMaxPlus;

    fn prod<E: Element>(x: &E, y: &E) -> E {
        let mut out = x.one();
        out.redefine(x, y);
        out
    }

    fn transf_gens_6() -> Vec<Transformation> {
        vec![
            Transformation::new(vec![0, 1, 2, 3, 4, 5]),
            Transformation::new(vec![1, 0, 2, 3, 4, 5]),
            Transformation::new(vec![4, 0, 1, 2, 3, 5]),
            Transformation::new(vec![5, 1, 2, 3, 4, 5]),
            Transformation::new(vec![1, 1, 2, 3, 4, 5]),
        ]
    }

    fn tropical_gens() -> Vec<MatrixOverSemiring<i64, TropicalMaxPlus>> {
        let sr = TropicalMaxPlus::new(33);
        vec![
            MatrixOverSemiring::new(vec![vec![22, 21, 0], vec![10, 0, 0], vec![1, 32, 1]], sr),
            MatrixOverSemiring::new(vec![vec![0, 0, 0], vec![0, 1, 0], vec![1, 1, 0]], sr),
        ]
    }

    #[test]
    fn test_small_transformation_semigroup() {
        let gens = vec![
            Transformation::new(vec![0, 1, 0]),
            Transformation::new(vec![0, 1, 2]),
        ];
        let mut s = Semigroup::new(&gens);

        assert_eq!(s.size(), 2);
        assert_eq!(s.degree(), 3);
        assert_eq!(s.nr_idempotents(), 2);
        assert_eq!(s.nr_generators(), 2);
        assert_eq!(s.nr_rules(), 4);
        assert_eq!(s.current_max_word_length(), 1);

        assert_eq!(s.at(0), Some(&gens[0]));
        assert_eq!(s.at(1), Some(&gens[1]));
        assert_eq!(s.position(&gens[0]), 0);
        assert_eq!(s.position(&gens[1]), 1);
        assert!(s.test_membership(&gens[1]));

        let z = Transformation::new(vec![0, 0, 0]);
        assert_eq!(s.position(&z), UNDEFINED);
        assert_eq!(s.current_position(&z), UNDEFINED);
        assert!(!s.test_membership(&z));
    }

    #[test]
    fn test_small_partial_perm_semigroup() {
        let x = PartialPerm::from_domain(&[0, 1, 2, 3, 5, 6, 9], &[9, 7, 3, 5, 4, 2, 1], 11);
        let y = PartialPerm::from_domain(&[4, 5, 0], &[10, 0, 1], 11);
        let mut s = Semigroup::new(&[x.clone(), y.clone()]);

        assert_eq!(s.size(), 22);
        assert_eq!(s.degree(), 11);
        assert_eq!(s.nr_idempotents(), 1);
        assert_eq!(s.nr_generators(), 2);
        assert_eq!(s.nr_rules(), 9);

        assert_eq!(s.position(&x), 0);
        assert_eq!(s.position(&y), 1);
        assert_eq!(s.position(&prod(&x, &x)), 2);

        // the empty partial permutation is the unique idempotent
        let empty = PartialPerm::from_domain(&[], &[], 11);
        assert_eq!(s.position(&empty), 10);
        assert!(s.is_idempotent(10));
        assert_eq!(s.idempotents(), &[10]);

        // wrong degree is never a member
        let small = PartialPerm::from_domain(&[], &[], 9);
        assert_eq!(s.position(&small), UNDEFINED);
        assert!(!s.test_membership(&small));
    }

    #[test]
    fn test_small_bipartition_semigroup() {
        let gens = vec![
            Bipartition::new(vec![
                0, 1, 2, 1, 0, 2, 1, 0, 2, 2, 0, 0, 2, 0, 3, 4, 4, 1, 3, 0,
            ]),
            Bipartition::new(vec![
                0, 1, 1, 1, 1, 2, 3, 2, 4, 5, 5, 2, 4, 2, 1, 1, 1, 2, 3, 2,
            ]),
            Bipartition::new(vec![
                0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            ]),
        ];
        let mut s = Semigroup::new(&gens);

        assert_eq!(s.size(), 10);
        assert_eq!(s.degree(), 10);
        assert_eq!(s.nr_idempotents(), 6);
        assert_eq!(s.nr_generators(), 3);
        assert_eq!(s.nr_rules(), 14);

        assert_eq!(s.position(&gens[0]), 0);
        assert_eq!(s.position(&gens[1]), 1);
        assert_eq!(s.position(&gens[2]), 2);
        assert_eq!(s.position(&prod(&gens[0], &gens[1])), 4);
        assert_eq!(s.position(&prod(&gens[1], &gens[2])), 7);
    }

    #[test]
    fn test_small_boolean_mat_semigroup() {
        let gens = vec![
            BooleanMat::new(vec![
                vec![true, false, true],
                vec![false, true, false],
                vec![false, true, false],
            ]),
            BooleanMat::zero(3),
            BooleanMat::zero(3),
        ];
        let mut s = Semigroup::new(&gens);

        assert_eq!(s.size(), 3);
        assert_eq!(s.degree(), 3);
        assert_eq!(s.nr_idempotents(), 2);
        assert_eq!(s.nr_generators(), 3);
        assert_eq!(s.nr_rules(), 7);

        // the third generator duplicates the second
        assert_eq!(s.letter_to_pos(1), s.letter_to_pos(2));
        s.reset_next_relation();
        assert_eq!(s.next_relation(), Some(Relation::Duplicate(2, 1)));
    }

    #[test]
    fn test_tropical_matrix_semigroup() {
        let gens = tropical_gens();
        let mut s = Semigroup::new(&gens);

        assert_eq!(s.size(), 119);
        assert_eq!(s.degree(), 3);
        assert_eq!(s.nr_idempotents(), 1);
        assert_eq!(s.nr_generators(), 2);
        assert_eq!(s.nr_rules(), 18);

        assert_eq!(s.position(&gens[0]), 0);
        assert_eq!(s.position(&prod(&gens[0], &gens[0])), 2);

        let sr = TropicalMaxPlus::new(33);
        let outside =
            MatrixOverSemiring::new(vec![vec![2, 2, 0], vec![1, 0, 0], vec![0, 0, 0]], sr);
        assert_eq!(s.position(&outside), UNDEFINED);
    }

    #[test]
    fn test_pbr_semigroup() {
        let gens = vec![
            Pbr::new(vec![
                vec![1],
                vec![4],
                vec![3],
                vec![1],
                vec![0, 2],
                vec![0, 3, 4, 5],
            ]),
            Pbr::new(vec![
                vec![1, 2],
                vec![0, 1],
                vec![0, 2, 3],
                vec![0, 1, 2],
                vec![3],
                vec![0, 3, 4, 5],
            ]),
        ];
        let mut s = Semigroup::new(&gens);

        assert_eq!(s.size(), 30);
        assert_eq!(s.degree(), 3);
        assert_eq!(s.nr_idempotents(), 22);
        assert_eq!(s.nr_generators(), 2);
        assert_eq!(s.nr_rules(), 11);

        assert_eq!(s.position(&gens[0]), 0);
        assert_eq!(s.position(&gens[1]), 1);
        assert_eq!(s.position(&prod(&gens[1], &gens[1])), 5);

        let empty = Pbr::new(vec![vec![], vec![], vec![], vec![], vec![], vec![]]);
        assert_eq!(s.position(&empty), UNDEFINED);
    }

    #[test]
    fn test_large_transformation_semigroup() {
        let mut s = Semigroup::new(&transf_gens_6());

        assert_eq!(s.size(), 7776);
        assert_eq!(s.degree(), 6);
        assert_eq!(s.nr_idempotents(), 537);
        assert_eq!(s.nr_generators(), 5);
        assert_eq!(s.nr_rules(), 2459);
        assert!(s.is_done());
        assert!(s.is_begun());
    }

    #[test]
    fn test_batched_enumeration() {
        let mut s = Semigroup::new(&transf_gens_6());
        s.set_batch_size(1024);

        assert!(!s.is_begun());
        assert_eq!(
            s.at(100),
            Some(&Transformation::new(vec![5, 3, 4, 1, 2, 5]))
        );
        assert_eq!(s.current_size(), 1029);
        assert_eq!(s.current_nr_rules(), 74);
        assert_eq!(s.current_max_word_length(), 7);
        assert!(!s.is_done());

        assert_eq!(s.position(&Transformation::new(vec![5, 3, 4, 1, 2, 5])), 100);

        // already enumerated far enough, so nothing changes
        assert_eq!(
            s.at(1023),
            Some(&Transformation::new(vec![5, 4, 3, 4, 1, 5]))
        );
        assert_eq!(s.current_size(), 1029);
        assert_eq!(s.current_nr_rules(), 74);
        assert_eq!(s.current_max_word_length(), 7);

        assert_eq!(
            s.at(3000),
            Some(&Transformation::new(vec![5, 3, 5, 3, 4, 5]))
        );
        assert_eq!(s.current_size(), 3001);
        assert_eq!(s.current_nr_rules(), 526);
        assert_eq!(s.current_max_word_length(), 9);

        assert_eq!(s.size(), 7776);
        assert!(s.is_done());
    }

    #[test]
    fn test_cayley_graphs_consistent() {
        let x = PartialPerm::from_domain(&[0, 1, 2, 3, 5, 6, 9], &[9, 7, 3, 5, 4, 2, 1], 11);
        let y = PartialPerm::from_domain(&[4, 5, 0], &[10, 0, 1], 11);
        let mut s = Semigroup::new(&[x, y]);
        let n = s.size();

        for p in 0..n {
            let xp = s.at(p).unwrap().clone();
            for a in 0..s.nr_generators() {
                let ga = s.generator(a).clone();
                let r = s.right(p, a);
                assert_eq!(s.at(r), Some(&prod(&xp, &ga)));
                let l = s.left(p, a);
                assert_eq!(s.at(l), Some(&prod(&ga, &xp)));
            }
            // the defining word of p really is reduced
            if s.current_length(p) >= 2 {
                let q = s.prefix(p);
                let a = s.final_letter(p);
                assert_eq!(s.right(q, a), p);
            }
        }
    }

    #[test]
    fn test_products_by_reduction_and_fast_product() {
        let mut s = Semigroup::new(&transf_gens_6());
        s.enumerate(LIMIT_MAX);

        for (i, j) in [(0, 0), (1, 4), (100, 200), (1000, 6000), (7775, 7775)] {
            let xi = s.at(i).unwrap().clone();
            let xj = s.at(j).unwrap().clone();
            let expected = s.position(&prod(&xi, &xj));
            assert_eq!(s.product_by_reduction(i, j), expected);
            assert_eq!(s.fast_product(i, j), expected);
        }
    }

    #[test]
    fn test_idempotents_square_to_themselves() {
        let mut s = Semigroup::new(&transf_gens_6());
        assert_eq!(s.nr_idempotents(), 537);

        let idems: Vec<Pos> = s.idempotents().to_vec();
        assert!(idems.windows(2).all(|w| w[0] < w[1]));
        for &p in idems.iter().step_by(50) {
            assert!(s.is_idempotent(p));
            assert_eq!(s.fast_product(p, p), p);
        }
        let non = (0..s.size()).find(|&p| !s.is_idempotent(p)).unwrap();
        assert_ne!(s.fast_product(non, non), non);
    }

    #[test]
    fn test_minimal_factorisation() {
        let x = PartialPerm::from_domain(&[0, 1, 2, 3, 5, 6, 9], &[9, 7, 3, 5, 4, 2, 1], 11);
        let y = PartialPerm::from_domain(&[4, 5, 0], &[10, 0, 1], 11);
        let mut s = Semigroup::new(&[x, y]);
        let n = s.size();

        for p in 0..n {
            let word = s.minimal_factorisation(p).unwrap();
            assert_eq!(word.len(), s.current_length(p));
            assert_eq!(s.word_to_element(&word), *s.at(p).unwrap());
            assert_eq!(s.word_to_pos(&word), p);
        }
        assert_eq!(s.minimal_factorisation(n), None);

        let outside = PartialPerm::from_domain(&[0], &[0], 11);
        assert_eq!(s.minimal_factorisation_elm(&outside), None);
        let member = s.at(7).unwrap().clone();
        let word = s.factorisation_elm(&member).unwrap();
        assert_eq!(s.word_to_element(&word), member);
    }

    #[test]
    fn test_relations_define_the_semigroup() {
        let mut s = Semigroup::new(&tropical_gens());
        let total = s.nr_rules();

        s.reset_next_relation();
        let mut count = 0;
        while let Some(rel) = s.next_relation() {
            count += 1;
            match rel {
                Relation::Duplicate(i, j) => {
                    assert_eq!(s.generator(i), s.generator(j));
                }
                Relation::Reduction(p, a, q) => {
                    let xp = s.at(p).unwrap().clone();
                    let ga = s.generator(a).clone();
                    assert_eq!(s.at(q), Some(&prod(&xp, &ga)));
                    // the right-hand side is strictly shorter
                    assert!(s.current_length(q) < s.current_length(p) + 1);
                }
            }
        }
        assert_eq!(count, total);

        // rewinding streams the same rules again
        s.reset_next_relation();
        let mut again = 0;
        while s.next_relation().is_some() {
            again += 1;
        }
        assert_eq!(again, total);
    }

    #[test]
    fn test_add_generators_matches_direct_construction() {
        let gens = tropical_gens();
        let mut s_full = Semigroup::new(&gens);

        let mut s_inc = Semigroup::new(&gens[..1]);
        s_inc.add_generators(&gens[1..]);

        assert_eq!(s_inc.size(), s_full.size());
        assert_eq!(s_inc.nr_rules(), s_full.nr_rules());
        assert_eq!(s_inc.nr_idempotents(), s_full.nr_idempotents());
        assert_eq!(s_inc.nr_generators(), 2);

        for p in 0..s_full.size() {
            let x = s_full.at(p).unwrap().clone();
            let q = s_inc.position(&x);
            assert_ne!(q, UNDEFINED);
            assert_eq!(s_inc.length(q), s_full.length(p));
            for a in 0..2 {
                let rf = s_full.right(p, a);
                let ri = s_inc.right(q, a);
                assert_eq!(
                    s_inc.at(ri).cloned(),
                    s_full.at(rf).cloned(),
                    "right Cayley graphs disagree at ({p}, {a})"
                );
                let lf = s_full.left(p, a);
                let li = s_inc.left(q, a);
                assert_eq!(s_inc.at(li).cloned(), s_full.at(lf).cloned());
            }
        }
    }

    #[test]
    fn test_add_generators_after_partial_enumeration() {
        // the first three generators give the symmetric group on 5 of the
        // 6 points (120 elements), so a small batch leaves it unfinished
        let gens = transf_gens_6();
        let mut s_full = Semigroup::new(&gens);

        let mut s_inc = Semigroup::new(&gens[..3]);
        s_inc.set_batch_size(64);
        s_inc.enumerate(100);
        assert!(s_inc.is_begun());
        assert!(!s_inc.is_done());
        s_inc.add_generators(&gens[3..]);

        assert_eq!(s_inc.size(), 7776);
        assert_eq!(s_inc.nr_rules(), s_full.nr_rules());
        assert_eq!(s_inc.nr_idempotents(), s_full.nr_idempotents());

        for p in (0..s_full.size()).step_by(7) {
            let x = s_full.at(p).unwrap().clone();
            let q = s_inc.position(&x);
            assert_ne!(q, UNDEFINED);
            assert_eq!(s_inc.length(q), s_full.length(p));
            for a in 0..5 {
                let rf = s_full.right(p, a);
                let ri = s_inc.right(q, a);
                assert_eq!(s_inc.at(ri).cloned(), s_full.at(rf).cloned());
            }
        }
    }

    #[test]
    fn test_add_generators_to_fully_enumerated() {
        let gens = transf_gens_6();
        let mut s = Semigroup::new(&gens[..2]);
        let small = s.size();
        assert!(small < 7776);

        s.add_generators(&gens[2..]);
        assert_eq!(s.nr_generators(), 5);
        assert_eq!(s.size(), 7776);
        assert_eq!(s.nr_rules(), 2459);
        assert_eq!(s.nr_idempotents(), 537);
    }

    #[test]
    fn test_closure_skips_existing_elements() {
        let gens = transf_gens_6();
        let mut s = Semigroup::new(&gens[..2]);
        s.closure(&gens);
        assert_eq!(s.size(), 7776);
        assert!(s.nr_generators() <= 5);

        // a second closure with the same elements changes nothing
        let before = s.nr_generators();
        s.closure(&gens);
        assert_eq!(s.nr_generators(), before);
        assert_eq!(s.size(), 7776);
    }

    #[test]
    fn test_copy_add_generators_leaves_original_alone() {
        let gens = tropical_gens();
        let s = Semigroup::new(&gens[..1]);
        let mut copy = s.copy_add_generators(&gens[1..]);
        assert_eq!(copy.size(), 119);
        assert_eq!(s.nr_generators(), 1);
        assert_eq!(s.current_size(), 1);

        let mut closed = s.copy_closure(&gens[1..]);
        assert_eq!(closed.size(), 119);
    }

    #[test]
    fn test_cancellation_is_resumable() {
        let mut s = Semigroup::new(&transf_gens_6());
        let killed = AtomicBool::new(true);
        s.enumerate_interruptible(&killed, LIMIT_MAX);
        assert!(!s.is_done());
        assert_eq!(s.current_size(), 5);

        killed.store(false, Ordering::Relaxed);
        s.enumerate_interruptible(&killed, LIMIT_MAX);
        assert!(s.is_done());
        assert_eq!(s.current_size(), 7776);
    }

    #[test]
    fn test_sorted_view() {
        let x = PartialPerm::from_domain(&[0, 1, 2, 3, 5, 6, 9], &[9, 7, 3, 5, 4, 2, 1], 11);
        let y = PartialPerm::from_domain(&[4, 5, 0], &[10, 0, 1], 11);
        let mut s = Semigroup::new(&[x, y]);
        let n = s.size();

        let sorted: Vec<PartialPerm> = (0..n).map(|r| s.sorted_at(r).unwrap().clone()).collect();
        assert!(sorted.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(s.sorted_at(n), None);

        for p in 0..n {
            let e = s.at(p).unwrap().clone();
            let rank = s.sorted_position(&e);
            assert_eq!(s.sorted_at(rank), Some(&e));
        }
    }

    #[test]
    fn test_jones_monoid_of_bipartitions() {
        let e1 = Bipartition::new(vec![0, 0, 1, 2, 2, 1]);
        let e2 = Bipartition::new(vec![0, 1, 1, 0, 2, 2]);
        let mut s = Semigroup::new(&[e1, e2]);

        assert_eq!(s.size(), 4);
        assert_eq!(s.nr_idempotents(), 4);
        for p in 0..4 {
            assert!(s.is_idempotent(p));
            assert_eq!(s.fast_product(p, p), p);
        }
        // the identity bipartition is not an element
        let one = s.generator(0).one();
        assert!(!s.test_membership(&one));
    }

    #[test]
    fn test_bmat8_semigroup() {
        let swap = BMat8::from_rows(&[vec![false, true], vec![true, false]]);
        let mut s = Semigroup::new(&[swap]);
        assert_eq!(s.size(), 2);
        assert_eq!(s.degree(), 8);
        assert_eq!(s.nr_idempotents(), 1);
        assert_eq!(s.nr_rules(), 1);
    }

    #[test]
    fn test_word_to_pos_follows_reducts() {
        let gens = vec![
            Transformation::new(vec![0, 1, 0]),
            Transformation::new(vec![0, 1, 2]),
        ];
        let mut s = Semigroup::new(&gens);
        s.enumerate(LIMIT_MAX);

        assert_eq!(s.word_to_pos(&[0]), 0);
        assert_eq!(s.word_to_pos(&[0, 1]), 0);
        assert_eq!(s.word_to_pos(&[1, 1]), 1);
        assert_eq!(s.word_to_pos(&[1, 0, 1]), 0);
        assert_eq!(s.word_to_element(&[0, 1]), gens[0]);
    }

    #[test]
    fn test_try_new_rejects_bad_generating_sets() {
        let empty: Vec<Transformation> = Vec::new();
        assert_eq!(
            Semigroup::try_new(&empty).err(),
            Some(SemigroupError::EmptyGeneratingSet)
        );

        let gens = vec![
            Transformation::new(vec![0, 1, 0]),
            Transformation::new(vec![0, 1]),
        ];
        assert_eq!(
            Semigroup::try_new(&gens).err(),
            Some(SemigroupError::DegreeMismatch {
                expected: 3,
                found: 2
            })
        );
    }
}
