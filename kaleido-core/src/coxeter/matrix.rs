//! Coxeter matrices: pairwise bond labels of a mirror system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{KaleidoError, Result};
use crate::rational::Rational;

/// Highest rank the engine enumerates
pub const MAX_RANK: usize = 4;

/// Generator letters, one per mirror
pub const LETTERS: [char; MAX_RANK] = ['a', 'b', 'c', 'd'];

/// Geometry induced by a rank-3 mirror system
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    /// Finite group tiling the sphere
    Spherical,
    /// Flat tiling, infinite group
    Euclidean,
    /// Hyperbolic tiling, infinite group
    Hyperbolic,
}

/// One braid relation `(ab)^m = 1`, written as two equal alternating words.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// `a b a b ...`
    pub forward: Vec<usize>,
    /// `b a b a ...`
    pub backward: Vec<usize>,
}

impl Exchange {
    /// Orient the relation at generator `g`: the other generator, the word
    /// starting with `g` and the word starting with the other.
    ///
    /// `None` when `g` is not part of this pair.
    pub fn oriented(&self, g: usize) -> Option<(usize, &[usize], &[usize])> {
        let (&a, &b) = (self.forward.first()?, self.backward.first()?);
        if a == g {
            Some((b, &self.forward, &self.backward))
        } else if b == g {
            Some((a, &self.backward, &self.forward))
        } else {
            None
        }
    }
}

/// Symmetric rank × rank matrix of bond labels.
///
/// Only the strict lower triangle is stored, row by row:
/// `(1,0), (2,0), (2,1), (3,0), (3,1), (3,2)`. The diagonal reads as 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCoxeterMatrix")]
pub struct CoxeterMatrix {
    rank: usize,
    lower: Vec<Rational>,
}

/// Wire form, checked by [`CoxeterMatrix::new`] on the way in
#[derive(Deserialize)]
struct RawCoxeterMatrix {
    rank: usize,
    lower: Vec<Rational>,
}

impl TryFrom<RawCoxeterMatrix> for CoxeterMatrix {
    type Error = KaleidoError;

    fn try_from(raw: RawCoxeterMatrix) -> Result<Self> {
        Self::new(raw.rank, raw.lower)
    }
}

#[inline]
fn lower_index(a: usize, b: usize) -> usize {
    let (hi, lo) = if a > b { (a, b) } else { (b, a) };
    hi * (hi - 1) / 2 + lo
}

impl CoxeterMatrix {
    /// Build a matrix from its flattened lower triangle
    pub fn new(rank: usize, lower: Vec<Rational>) -> Result<Self> {
        if rank > MAX_RANK {
            return Err(KaleidoError::InvalidRank {
                rank,
                expected: format!("at most {}", MAX_RANK),
            });
        }
        let expected = rank * rank.saturating_sub(1) / 2;
        if lower.len() != expected {
            return Err(KaleidoError::MatrixSize {
                rank,
                expected,
                actual: lower.len(),
            });
        }
        Ok(Self { rank, lower })
    }

    /// Linear (chain) diagram: `labels[i]` bonds mirror `i` to `i + 1`,
    /// every other pair commutes.
    pub fn linear(labels: &[Rational]) -> Result<Self> {
        let rank = labels.len() + 1;
        let mut lower = Vec::with_capacity(rank * (rank - 1) / 2);
        for hi in 1..rank {
            for lo in 0..hi {
                lower.push(if hi == lo + 1 {
                    labels[lo]
                } else {
                    Rational::integer(2)
                });
            }
        }
        Self::new(rank, lower)
    }

    /// Chain diagram from integer labels
    pub fn linear_int(labels: &[i64]) -> Result<Self> {
        let labels: Vec<Rational> = labels.iter().map(|&m| Rational::integer(m)).collect();
        Self::linear(&labels)
    }

    /// Number of mirrors
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Flattened lower triangle
    pub fn lower(&self) -> &[Rational] {
        &self.lower
    }

    /// Bond label between mirrors `a` and `b`.
    ///
    /// The diagonal and out-of-range pairs read as 1.
    pub fn get(&self, a: usize, b: usize) -> Rational {
        if a == b || a >= self.rank || b >= self.rank {
            return Rational::ONE;
        }
        self.lower[lower_index(a, b)]
    }

    /// Reject labels the closure engine cannot enumerate.
    ///
    /// Off-diagonal labels must be positive with a numerator of at least 2
    /// (or infinite).
    pub fn validate_for_closure(&self) -> Result<()> {
        for a in 1..self.rank {
            for b in 0..a {
                let m = self.get(a, b);
                if m.is_infinite() && m.signum() > 0 {
                    continue;
                }
                if m.signum() <= 0 || m.num() < 2 {
                    return Err(KaleidoError::InvalidBond {
                        a: b,
                        b: a,
                        label: m.to_string(),
                        reason: "labels must be infinite or have a numerator of at least 2"
                            .to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Braid relations of every mirror pair with a finite label.
    ///
    /// The closure only needs the numerator: `5/2` and `5` generate the
    /// same abstract group, the denominator only changes the geometry.
    pub fn exchanges(&self) -> Vec<(usize, usize, Exchange)> {
        self.exchanges_up_to(usize::MAX)
    }

    /// Braid relations whose words are at most `max_len` letters; longer
    /// ones are left out as if the label were infinite.
    pub fn exchanges_up_to(&self, max_len: usize) -> Vec<(usize, usize, Exchange)> {
        let mut out = Vec::new();
        for a in 0..self.rank {
            for b in (a + 1)..self.rank {
                let m = self.get(a, b);
                if m.is_infinite() {
                    continue;
                }
                let len = usize::try_from(m.num()).unwrap_or(0);
                if len > max_len {
                    continue;
                }
                let forward = (0..len).map(|i| if i % 2 == 0 { a } else { b }).collect();
                let backward = (0..len).map(|i| if i % 2 == 0 { b } else { a }).collect();
                out.push((a, b, Exchange { forward, backward }));
            }
        }
        out
    }

    /// Classify a rank-3 system by the sign of `1/m01 + 1/m12 + 1/m20 - 1`.
    ///
    /// Exact unless the sum outgrows `i64` terms, where the sign is taken
    /// in floating point.
    pub fn space_type(&self) -> Option<SpaceType> {
        if self.rank != 3 {
            return None;
        }
        let labels = [self.get(0, 1), self.get(1, 2), self.get(2, 0)];
        let exact = labels
            .iter()
            .try_fold(-Rational::ONE, |sum, m| sum.checked_add(m.checked_recip()?));
        let sign = match exact {
            Some(s) => s.signum(),
            None => {
                let s: f64 = labels.iter().map(|m| m.to_f64().recip()).sum::<f64>() - 1.0;
                if s > 0.0 {
                    1
                } else if s < 0.0 {
                    -1
                } else {
                    0
                }
            }
        };
        Some(match sign {
            1 => SpaceType::Spherical,
            0 => SpaceType::Euclidean,
            _ => SpaceType::Hyperbolic,
        })
    }

    /// Letter naming generator `g`
    pub fn letter(g: usize) -> char {
        LETTERS[g]
    }
}

impl fmt::Display for CoxeterMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.lower.iter().map(|m| m.to_string()).collect();
        write!(f, "[{}; {}]", self.rank, labels.join(" "))
    }
}

impl FromStr for CoxeterMatrix {
    type Err = KaleidoError;

    /// Parses a chain diagram such as `"3,5/2"`. A leading `rank:` switches
    /// to a full lower triangle, as in `"4:3,2,3,2,2,4"`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse_list = |text: &str| -> Result<Vec<Rational>> {
            text.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::parse)
                .collect()
        };
        match s.split_once(':') {
            Some((rank, rest)) => {
                let rank: usize = rank.trim().parse().map_err(|_| KaleidoError::InvalidRank {
                    rank: 0,
                    expected: format!("a number before ':' in '{}'", s),
                })?;
                Self::new(rank, parse_list(rest)?)
            }
            None => Self::linear(&parse_list(s)?),
        }
    }
}
