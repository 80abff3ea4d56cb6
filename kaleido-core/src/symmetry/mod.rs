//! Geometric realization of Coxeter groups.
//!
//! The simple mirrors are placed so that mirrors `i` and `j` meet at the
//! dihedral angle `π / m_ij`. Their unit normals are the rows of the
//! Cholesky factor of the Gram matrix `G_ij = -cos(π / m_ij)`. Every other
//! element's transform follows from the Cayley graph: an element `e` made
//! from `p` by the generator `g` realizes as `T_p ∘ M_g`.

mod group3;
mod group4;

pub use group3::SymmetryGroup3;
pub use group4::SymmetryGroup4;

use std::f64::consts::PI;

use tracing::debug;

use crate::config::tolerance::PIVOT_EPSILON;
use crate::coxeter::{CoxeterGroup, CoxeterMatrix};
use crate::error::{KaleidoError, Result};
use crate::quaternion::{Quaternion, QuaternionPair};

/// An orthogonal transform type that can realize a reflection group
pub trait Isometry: Copy + Send + Sync + std::fmt::Debug {
    /// Points the transform acts on
    type Vector: Copy + Send + Sync + std::fmt::Debug + AsRef<[f64]>;

    /// Dimension of `Vector`
    const DIM: usize;

    fn identity() -> Self;

    /// Reflection across the hyperplane through the origin with this normal
    fn reflection(normal: Self::Vector) -> Self;

    /// `self ∘ other`: apply `other` first
    fn compose(&self, other: &Self) -> Self;

    fn apply(&self, v: Self::Vector) -> Self::Vector;

    /// Embed leading coordinates, padding the rest with zeros
    fn vector_from(components: &[f64]) -> Self::Vector;
}

impl Isometry for Quaternion {
    type Vector = [f64; 3];
    const DIM: usize = 3;

    fn identity() -> Self {
        Quaternion::identity()
    }

    fn reflection(normal: [f64; 3]) -> Self {
        Quaternion::mirror(normal)
    }

    fn compose(&self, other: &Self) -> Self {
        *self * *other
    }

    fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        self.transform(v)
    }

    fn vector_from(components: &[f64]) -> [f64; 3] {
        let mut v = [0.0; 3];
        for (slot, c) in v.iter_mut().zip(components) {
            *slot = *c;
        }
        v
    }
}

impl Isometry for QuaternionPair {
    type Vector = [f64; 4];
    const DIM: usize = 4;

    fn identity() -> Self {
        QuaternionPair::identity()
    }

    fn reflection(normal: [f64; 4]) -> Self {
        QuaternionPair::mirror(normal)
    }

    fn compose(&self, other: &Self) -> Self {
        self.mul(other)
    }

    fn apply(&self, v: [f64; 4]) -> [f64; 4] {
        self.transform(v)
    }

    fn vector_from(components: &[f64]) -> [f64; 4] {
        let mut v = [0.0; 4];
        for (slot, c) in v.iter_mut().zip(components) {
            *slot = *c;
        }
        v
    }
}

/// Unit mirror normals for a Coxeter matrix, one row per generator.
///
/// Row `i` has `rank` components and only its first `i + 1` are non-zero.
/// Fails with `NoEmbedding` when the Gram matrix is not positive definite
/// (Euclidean, hyperbolic or infinite bonds).
pub fn mirror_normals(matrix: &CoxeterMatrix) -> Result<Vec<Vec<f64>>> {
    let n = matrix.rank();
    let gram = |i: usize, j: usize| -> f64 {
        if i == j {
            1.0
        } else {
            -(PI / matrix.get(i, j).to_f64()).cos()
        }
    };

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..i {
            let s: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            l[i][j] = (gram(i, j) - s) / l[j][j];
        }
        let s: f64 = (0..i).map(|k| l[i][k] * l[i][k]).sum();
        let pivot = gram(i, i) - s;
        if pivot.is_nan() || pivot <= PIVOT_EPSILON {
            return Err(KaleidoError::NoEmbedding { pivot: i, value: pivot });
        }
        l[i][i] = pivot.sqrt();
    }
    Ok(l)
}

/// A point strictly inside the fundamental chamber, at unit distance.
///
/// Solves `n_i · p = 1` for every normal, which puts `p` on the positive
/// side of every mirror.
pub fn chamber_point(normals: &[Vec<f64>]) -> Vec<f64> {
    let n = normals.len();
    let mut p = vec![0.0; n];
    for i in 0..n {
        let s: f64 = (0..i).map(|k| normals[i][k] * p[k]).sum();
        p[i] = (1.0 - s) / normals[i][i];
    }
    let len = p.iter().map(|x| x * x).sum::<f64>().sqrt();
    if len > 0.0 {
        p.iter_mut().for_each(|x| *x /= len);
    }
    p
}

/// A Coxeter group together with one transform per element
#[derive(Clone, Debug)]
pub struct SymmetryGroup<T: Isometry> {
    group: CoxeterGroup,
    normals: Vec<T::Vector>,
    mirrors: Vec<T>,
    transforms: Vec<T>,
    origin: T::Vector,
}

impl<T: Isometry> SymmetryGroup<T> {
    fn realize(group: CoxeterGroup) -> Result<Self> {
        let rows = mirror_normals(group.matrix())?;
        let normals: Vec<T::Vector> = rows.iter().map(|r| T::vector_from(r)).collect();
        let mirrors: Vec<T> = normals.iter().map(|&n| T::reflection(n)).collect();
        let origin = T::vector_from(&chamber_point(&rows));

        let mut transforms = vec![T::identity(); group.order()];
        for e in group.elements().iter().skip(1) {
            // Creation order puts every parent before its children
            let (g, parent) = e
                .neighbors
                .iter()
                .enumerate()
                .find_map(|(g, n)| {
                    let n = (*n)?;
                    (group.elements()[n].rank + 1 == e.rank).then_some((g, n))
                })
                .ok_or_else(|| KaleidoError::TopologyInvariant {
                    reason: format!("element {} has no parent in the previous layer", e.index),
                })?;
            transforms[e.index] = transforms[parent].compose(&mirrors[g]);
        }

        debug!(rank = group.rank(), order = group.order(), "realized symmetry group");
        Ok(Self {
            group,
            normals,
            mirrors,
            transforms,
            origin,
        })
    }

    /// The abstract group
    pub fn group(&self) -> &CoxeterGroup {
        &self.group
    }

    /// Number of generators
    pub fn rank(&self) -> usize {
        self.group.rank()
    }

    /// Number of realized elements
    pub fn order(&self) -> usize {
        self.transforms.len()
    }

    /// Transform of every element, indexed like the group's elements
    pub fn transforms(&self) -> &[T] {
        &self.transforms
    }

    pub fn transform(&self, index: usize) -> Option<&T> {
        self.transforms.get(index)
    }

    /// The simple mirrors, one per generator
    pub fn mirrors(&self) -> &[T] {
        &self.mirrors
    }

    /// Unit normals of the simple mirrors
    pub fn normals(&self) -> &[T::Vector] {
        &self.normals
    }

    /// Element indices of the simple mirrors `a, b, c, ...`
    pub fn default_generators(&self) -> Vec<usize> {
        (0..self.rank())
            .filter_map(|g| self.group.neighbor(self.group.identity(), g))
            .collect()
    }

    /// A custom generator tuple, one word per generator
    pub fn generators_from_words(&self, words: &[&str]) -> Result<Vec<usize>> {
        if words.len() != self.rank() {
            return Err(KaleidoError::GeneratorCount {
                expected: self.rank(),
                actual: words.len(),
            });
        }
        words.iter().map(|w| self.group.word_to_element(w)).collect()
    }

    /// The longest element, when the group closed
    pub fn maximal_element(&self) -> Option<usize> {
        self.group.longest()
    }

    /// Unit vector inside the fundamental chamber
    pub fn default_origin(&self) -> T::Vector {
        self.origin
    }

    /// Image of `v` under every element
    pub fn orbit(&self, v: T::Vector) -> Vec<T::Vector> {
        self.transforms.iter().map(|t| t.apply(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::Rational;

    #[test]
    fn test_normals_meet_at_bond_angles() {
        let m = CoxeterMatrix::linear_int(&[3, 5]).unwrap();
        let rows = mirror_normals(&m).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let dot: f64 = (0..3).map(|k| rows[i][k] * rows[j][k]).sum();
                let expected = if i == j {
                    1.0
                } else {
                    -(PI / m.get(i, j).to_f64()).cos()
                };
                assert!((dot - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_euclidean_has_no_embedding() {
        let m = CoxeterMatrix::linear_int(&[4, 4]).unwrap();
        let err = mirror_normals(&m).unwrap_err();
        assert_eq!(err.error_code(), "NO_EMBEDDING");

        let m = CoxeterMatrix::linear_int(&[7, 3]).unwrap();
        assert!(matches!(
            mirror_normals(&m),
            Err(KaleidoError::NoEmbedding { pivot: 2, .. })
        ));

        let m = CoxeterMatrix::new(2, vec![Rational::INFINITY]).unwrap();
        assert!(mirror_normals(&m).is_err());
    }

    #[test]
    fn test_chamber_point_is_inside() {
        let m = CoxeterMatrix::linear_int(&[3, 4, 3]).unwrap();
        let rows = mirror_normals(&m).unwrap();
        let p = chamber_point(&rows);
        let len: f64 = p.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((len - 1.0).abs() < 1e-12);
        for row in &rows {
            let d: f64 = row.iter().zip(&p).map(|(a, b)| a * b).sum();
            assert!(d > 0.0);
        }
    }
}
