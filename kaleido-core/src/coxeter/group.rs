//! Closure engine: enumerate a Coxeter group rank by rank.
//!
//! Elements live in an arena and point at each other by index. Element `e`
//! has one neighbor slot per generator `g`, holding the index of `e·g`.
//! Generators are involutions, so the slots are symmetric.
//!
//! The enumeration is a breadth-first walk of the Cayley graph. In a Coxeter
//! group every edge joins consecutive layers (`ℓ(eg) = ℓ(e) ± 1`), so when a
//! layer is processed every empty slot leads one layer up. Whether that
//! target already exists is decided with the braid relations: if
//! `eg = e'h` then both words end in the same alternating `g h` block, so
//! walking down from `e` along `h g h ...` and back up along the paired
//! word reaches `e'`, whose `h` slot already holds the target.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::matrix::{CoxeterMatrix, LETTERS};
use crate::config::ClosureLimits;
use crate::error::{KaleidoError, Result};

/// A braid relation oriented at one generator: the other generator, the
/// alternating word starting with this one and the word starting with the
/// other
type Relation<'a> = (usize, &'a [usize], &'a [usize]);

/// Display word of the identity once closure is done
pub const IDENTITY_WORD: &str = "1";

/// One abstract group element
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Element {
    /// Creation order, stable for the lifetime of the group
    pub index: usize,
    /// Word length (BFS depth from the identity)
    pub rank: usize,
    /// Shortest word reaching this element, over `a b c d`
    pub representation: String,
    /// `neighbors[g]` is the index of `self · g`
    pub neighbors: Vec<Option<usize>>,
}

impl Element {
    fn new(index: usize, rank: usize, representation: String, generators: usize) -> Self {
        Self {
            index,
            rank,
            representation,
            neighbors: vec![None; generators],
        }
    }

    /// Generator indices of the representation (empty for the identity)
    pub fn letters(&self) -> Vec<usize> {
        word_letters(&self.representation).unwrap_or_default()
    }

    /// True when every neighbor slot is linked
    pub fn is_saturated(&self) -> bool {
        self.neighbors.iter().all(Option::is_some)
    }
}

/// Parse a word over `a b c d`; `"1"` and `""` are the identity
pub fn word_letters(word: &str) -> Option<Vec<usize>> {
    if word == IDENTITY_WORD {
        return Some(Vec::new());
    }
    word.chars()
        .map(|c| LETTERS.iter().position(|&l| l == c))
        .collect()
}

/// A Coxeter group enumerated from its matrix
#[derive(Clone, Debug, Serialize)]
pub struct CoxeterGroup {
    matrix: CoxeterMatrix,
    elements: Vec<Element>,
    ranks: Vec<Vec<usize>>,
    is_limit_over: bool,
}

impl CoxeterGroup {
    /// Enumerate with the stock limits for the matrix rank
    pub fn new(matrix: CoxeterMatrix) -> Result<Self> {
        let limits = ClosureLimits::for_rank(matrix.rank());
        Self::with_limits(matrix, limits)
    }

    /// Enumerate with explicit limits
    pub fn with_limits(matrix: CoxeterMatrix, limits: ClosureLimits) -> Result<Self> {
        matrix.validate_for_closure()?;

        let mut group = Self {
            elements: vec![Element::new(0, 0, String::new(), matrix.rank())],
            ranks: vec![vec![0]],
            is_limit_over: false,
            matrix,
        };
        group.close(limits);

        if let Some(identity) = group.elements.first_mut() {
            identity.representation = IDENTITY_WORD.to_string();
        }
        Ok(group)
    }

    fn close(&mut self, limits: ClosureLimits) {
        let n = self.matrix.rank();
        // A relation longer than the order cap can never close a cycle
        let exchanges = self.matrix.exchanges_up_to(limits.max_order);
        let relations: Vec<Vec<Relation<'_>>> = (0..n)
            .map(|g| {
                exchanges
                    .iter()
                    .filter_map(|(_, _, ex)| ex.oriented(g))
                    .collect()
            })
            .collect();

        loop {
            let depth = self.ranks.len() - 1;
            let current = self.ranks[depth].clone();
            let mut next = Vec::new();

            for &src in &current {
                for g in 0..n {
                    if self.elements[src].neighbors[g].is_some() {
                        continue;
                    }
                    let target = match self.identify(src, &relations[g]) {
                        Some(t) => t,
                        None => {
                            let index = self.elements.len();
                            let mut word = self.elements[src].representation.clone();
                            word.push(LETTERS[g]);
                            self.elements.push(Element::new(index, depth + 1, word, n));
                            next.push(index);
                            index
                        }
                    };
                    self.elements[src].neighbors[g] = Some(target);
                    self.elements[target].neighbors[g] = Some(src);

                    if self.elements.len() >= limits.max_order {
                        self.ranks.push(next);
                        self.stop_over_limit("order cap");
                        return;
                    }
                }
            }

            debug!(depth = depth + 1, size = next.len(), order = self.order(), "closure layer");

            if next.is_empty() {
                break;
            }
            let closed = next.len() == 1 && self.elements[next[0]].is_saturated();
            let shrunk = next.len() < current.len();
            self.ranks.push(next);
            if closed {
                break;
            }
            if depth + 1 > limits.max_depth && !shrunk {
                self.stop_over_limit("depth plateau");
                return;
            }
        }

        info!(order = self.order(), depth = self.ranks.len() - 1, "closure complete");
    }

    fn stop_over_limit(&mut self, reason: &str) {
        self.is_limit_over = true;
        warn!(
            order = self.order(),
            depth = self.ranks.len() - 1,
            reason,
            "closure stopped before finishing; order is a lower bound"
        );
    }

    /// Find an existing next-layer element equal to `src · g`.
    ///
    /// For each relation `(h, g h g ..., h g h ...)` at `g`: walk down from
    /// `src` along the first `m - 1` letters of the word starting with `h`,
    /// then up along the word starting with `g` read backwards. The element
    /// reached ends in `g`, and its `h` slot holds the target.
    fn identify(&self, src: usize, relations: &[Relation<'_>]) -> Option<usize> {
        let rank = self.elements[src].rank;
        for &(h, from_g, from_h) in relations {
            let m = from_g.len();
            if m < 2 {
                continue;
            }
            let down = &from_h[..m - 1];

            let Some(low) = down.iter().try_fold(src, |cur, &letter| {
                self.step(cur, letter, |from, to| to + 1 == from)
            }) else {
                continue;
            };
            let Some(cur) = from_g[..m - 1].iter().rev().try_fold(low, |cur, &letter| {
                self.step(cur, letter, |from, to| to == from + 1)
            }) else {
                continue;
            };
            if cur == src {
                continue;
            }

            if let Some(target) = self.elements[cur].neighbors[h] {
                if self.elements[target].rank == rank + 1 {
                    return Some(target);
                }
            }
        }
        None
    }

    /// Follow slot `letter` from `cur` when the ranks satisfy `ok(from, to)`
    fn step(&self, cur: usize, letter: usize, ok: impl Fn(usize, usize) -> bool) -> Option<usize> {
        let next = self.elements[cur].neighbors[letter]?;
        ok(self.elements[cur].rank, self.elements[next].rank).then_some(next)
    }

    /// The defining matrix
    pub fn matrix(&self) -> &CoxeterMatrix {
        &self.matrix
    }

    /// Number of generators
    pub fn rank(&self) -> usize {
        self.matrix.rank()
    }

    /// Number of enumerated elements (a lower bound when limit over)
    pub fn order(&self) -> usize {
        self.elements.len()
    }

    /// True when the closure budget ran out before the group closed
    pub fn is_limit_over(&self) -> bool {
        self.is_limit_over
    }

    /// All elements in creation order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Element by index
    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Index of the identity
    pub const fn identity(&self) -> usize {
        0
    }

    /// Element indices per BFS layer
    pub fn ranks(&self) -> &[Vec<usize>] {
        &self.ranks
    }

    /// Size of each BFS layer
    pub fn layer_sizes(&self) -> Vec<usize> {
        self.ranks.iter().map(Vec::len).collect()
    }

    /// `a · g` for a single generator
    #[inline]
    pub fn neighbor(&self, a: usize, g: usize) -> Option<usize> {
        self.elements.get(a)?.neighbors.get(g).copied().flatten()
    }

    /// Right-multiply `from` by a sequence of generators
    pub fn walk(&self, from: usize, letters: &[usize]) -> Option<usize> {
        letters.iter().try_fold(from, |cur, &g| self.neighbor(cur, g))
    }

    /// `a · b`; `None` when the product leaves a truncated group
    pub fn mul(&self, a: usize, b: usize) -> Option<usize> {
        let letters = self.elements.get(b)?.letters();
        self.walk(a, &letters)
    }

    /// `a⁻¹`, the reversed word read from the identity
    pub fn inverse(&self, a: usize) -> Option<usize> {
        let mut letters = self.elements.get(a)?.letters();
        letters.reverse();
        self.walk(self.identity(), &letters)
    }

    /// Smallest `k > 0` with `a^k = 1`
    pub fn period(&self, a: usize) -> Option<usize> {
        let mut cur = a;
        for k in 1..=self.order() {
            if cur == self.identity() {
                return Some(k);
            }
            cur = self.mul(cur, a)?;
        }
        None
    }

    /// `e · s` for every element `e`, as a lookup table
    pub fn right_action(&self, s: usize) -> Vec<Option<usize>> {
        let letters = match self.elements.get(s) {
            Some(e) => e.letters(),
            None => return vec![None; self.order()],
        };
        (0..self.order()).map(|e| self.walk(e, &letters)).collect()
    }

    /// Element named by a word such as `"abc"`
    pub fn word_to_element(&self, word: &str) -> Result<usize> {
        let unknown = || KaleidoError::UnknownWord {
            word: word.to_string(),
        };
        let letters = word_letters(word).ok_or_else(unknown)?;
        if letters.iter().any(|&g| g >= self.rank()) {
            return Err(unknown());
        }
        self.walk(self.identity(), &letters).ok_or_else(unknown)
    }

    /// The longest element, when the group closed
    pub fn longest(&self) -> Option<usize> {
        if self.is_limit_over {
            return None;
        }
        match self.ranks.last()?.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Fail unless the group closed
    pub fn require_closed(&self) -> Result<()> {
        if self.is_limit_over {
            return Err(KaleidoError::LimitExceeded {
                order: self.order(),
            });
        }
        Ok(())
    }
}
