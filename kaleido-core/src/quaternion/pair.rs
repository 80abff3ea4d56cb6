//! Quaternion pairs: isometries of 4-space.
//!
//! Reading a 4-vector as a quaternion `v`, every rotation of R⁴ is
//! `v ↦ l v r` for unit quaternions `l`, `r` (Spin(4) ≅ SU(2) × SU(2)), and
//! every improper isometry is `v ↦ l v̄ r`. The pair `(l, r)` and `(-l, -r)`
//! name the same isometry.

use serde::{Deserialize, Serialize};

use super::Quaternion;
use crate::vector::normalize4;

/// A 4D isometry `v ↦ left · c(v) · right`, where `c` conjugates when
/// `conjugate` is set
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuaternionPair {
    pub left: Quaternion,
    pub right: Quaternion,
    /// Orientation-reversing when set
    #[serde(default)]
    pub conjugate: bool,
}

impl QuaternionPair {
    /// Create a proper rotation `v ↦ l v r`
    pub fn rotation(left: Quaternion, right: Quaternion) -> Self {
        Self {
            left,
            right,
            conjugate: false,
        }
    }

    /// Identity isometry
    pub fn identity() -> Self {
        Self::rotation(Quaternion::identity(), Quaternion::identity())
    }

    /// Reflection across the hyperplane with this normal: `v ↦ -n v̄ n`
    pub fn mirror(normal: [f64; 4]) -> Self {
        let n = Quaternion::from(normalize4(normal));
        Self {
            left: -n,
            right: n,
            conjugate: true,
        }
    }

    /// True for orientation-reversing isometries
    #[inline]
    pub fn is_reflection(&self) -> bool {
        self.conjugate
    }

    /// Apply to a 4-vector `[w, x, y, z]`
    pub fn transform(&self, v: [f64; 4]) -> [f64; 4] {
        let q = Quaternion::from(v);
        let q = if self.conjugate { q.conjugate() } else { q };
        (&(self.left * q * self.right)).into()
    }

    /// Composition: `a.mul(&b).transform(v) == a.transform(b.transform(v))`
    pub fn mul(&self, b: &Self) -> Self {
        if self.conjugate {
            Self {
                left: self.left * b.right.conjugate(),
                right: b.left.conjugate() * self.right,
                conjugate: !b.conjugate,
            }
        } else {
            Self {
                left: self.left * b.left,
                right: b.right * self.right,
                conjugate: b.conjugate,
            }
        }
    }

    /// Inverse of a unit pair
    pub fn inverse(&self) -> Self {
        if self.conjugate {
            Self {
                left: self.right,
                right: self.left,
                conjugate: true,
            }
        } else {
            Self::rotation(self.left.conjugate(), self.right.conjugate())
        }
    }

    /// Renormalize both halves
    pub fn normalize(&self) -> Self {
        Self {
            left: self.left.normalize(),
            right: self.right.normalize(),
            conjugate: self.conjugate,
        }
    }

    /// Spherical interpolation of both halves.
    ///
    /// The sign of the target pair is chosen once for both halves, so the
    /// interpolant never picks up a stray central inversion. The result
    /// keeps `self`'s orientation for every `t`.
    pub fn slerp(&self, other: &Self, t: f64) -> Self {
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return Self {
                conjugate: self.conjugate,
                ..*other
            };
        }
        let mut dl = self.left.dot(&other.left);
        let mut dr = self.right.dot(&other.right);
        let (mut ol, mut or) = (other.left, other.right);
        if dl + dr < 0.0 {
            dl = -dl;
            dr = -dr;
            ol = -ol;
            or = -or;
        }
        Self {
            left: self.left.slerp_arc(&ol, dl, t),
            right: self.right.slerp_arc(&or, dr, t),
            conjugate: self.conjugate,
        }
    }

    /// Check approximate equality up to the shared sign of both halves
    pub fn same_transform(&self, other: &Self, epsilon: f64) -> bool {
        if self.conjugate != other.conjugate {
            return false;
        }
        let same = self.left.approx_eq(&other.left, epsilon)
            && self.right.approx_eq(&other.right, epsilon);
        let flipped = self.left.approx_eq(&-other.left, epsilon)
            && self.right.approx_eq(&-other.right, epsilon);
        same || flipped
    }
}

impl Default for QuaternionPair {
    fn default() -> Self {
        Self::identity()
    }
}
