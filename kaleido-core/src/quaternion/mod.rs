//! Quaternion algebra for 3D and 4D isometries.
//!
//! A [`Quaternion`] carries a `negate` flag next to its four components.
//! `transform` applies the sandwich product `q v q*` and flips the result
//! when the flag is set, which turns the half-turn of a pure unit
//! quaternion into the reflection across its plane. Products xor the
//! flags, so one composition chain mixes rotations and reflections.
//!
//! [`QuaternionPair`] plays the same role in 4D, where every rotation is
//! `v ↦ l v r` for a pair of unit quaternions.

mod pair;

pub use pair::QuaternionPair;

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg};

use crate::config::tolerance::{ANTIPODAL_EPSILON, SLERP_LINEAR_THRESHOLD};
use crate::vector::{cross3, dot3, dot4, normalize3};

/// A quaternion q = w + xi + yj + zk with an orientation flag
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Orientation-reversing when set
    #[serde(default)]
    pub negate: bool,
}

impl Quaternion {
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z, negate: false }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Pure quaternion `(0, v)`
    pub fn pure(v: [f64; 3]) -> Self {
        Self::new(0.0, v[0], v[1], v[2])
    }

    /// Reflection across the plane through the origin with this normal
    pub fn mirror(normal: [f64; 3]) -> Self {
        Self {
            negate: true,
            ..Self::pure(normalize3(normal))
        }
    }

    /// Rotation by `angle` around `axis`; identity for a zero axis
    pub fn rotation(axis: [f64; 3], angle: f64) -> Self {
        let axis = normalize3(axis);
        if axis == [0.0; 3] {
            return Self::identity();
        }
        let (s, c) = (angle / 2.0).sin_cos();
        Self::new(c, axis[0] * s, axis[1] * s, axis[2] * s)
    }

    /// Rotation taking unit vector `u` onto unit vector `v`.
    ///
    /// Built from the half-way quaternion `(1 + u·v, u × v)`. Undefined for
    /// antipodal input, where the result degenerates to the identity; use
    /// [`Quaternion::try_from_to`] to detect that case.
    pub fn from_to(u: [f64; 3], v: [f64; 3]) -> Self {
        let c = cross3(u, v);
        Self::new(1.0 + dot3(u, v), c[0], c[1], c[2]).normalize()
    }

    /// [`Quaternion::from_to`], or `None` when `u` and `v` are antipodal
    pub fn try_from_to(u: [f64; 3], v: [f64; 3]) -> Option<Self> {
        (1.0 + dot3(u, v) >= ANTIPODAL_EPSILON).then(|| Self::from_to(u, v))
    }

    #[inline]
    pub fn is_reflection(&self) -> bool {
        self.negate
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        dot4(self.into(), other.into())
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit quaternion with the same flag; identity when the norm vanishes
    pub fn normalize(&self) -> Self {
        let n = self.norm();
        if n < ANTIPODAL_EPSILON {
            return Self::identity();
        }
        *self * n.recip()
    }

    /// `(w, -x, -y, -z)`, flag kept
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
            negate: self.negate,
        }
    }

    /// Apply the isometry to a 3D vector: `±q v q*`
    pub fn transform(&self, v: [f64; 3]) -> [f64; 3] {
        let p = *self * Self::pure(v) * self.conjugate();
        let sign = if self.negate { -1.0 } else { 1.0 };
        [sign * p.x, sign * p.y, sign * p.z]
    }

    /// Spherical linear interpolation along the shorter arc.
    ///
    /// Clamps to the endpoints outside `0..1`. The result keeps `self`'s
    /// flag for every `t`, endpoints included.
    pub fn slerp(&self, other: &Self, t: f64) -> Self {
        let other = Self { negate: self.negate, ..*other };
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return other;
        }
        let dot = self.dot(&other);
        if dot < 0.0 {
            self.slerp_arc(&-other, -dot, t)
        } else {
            self.slerp_arc(&other, dot, t)
        }
    }

    /// Interpolate along the arc given by `dot`, without choosing a path.
    /// Nearly parallel inputs fall back to normalized lerp.
    pub(crate) fn slerp_arc(&self, other: &Self, dot: f64, t: f64) -> Self {
        if dot.abs() > SLERP_LINEAR_THRESHOLD {
            return (*self * (1.0 - t) + *other * t).normalize();
        }
        let theta = dot.clamp(-1.0, 1.0).acos();
        let s = theta.sin();
        *self * (((1.0 - t) * theta).sin() / s) + *other * ((t * theta).sin() / s)
    }

    /// Componentwise comparison, flag included
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        let (a, b): ([f64; 4], [f64; 4]) = (self.into(), other.into());
        self.negate == other.negate && a.iter().zip(b).all(|(x, y)| (x - y).abs() < epsilon)
    }

    /// True when both represent the same isometry (q and -q coincide)
    pub fn same_transform(&self, other: &Self, epsilon: f64) -> bool {
        self.approx_eq(other, epsilon) || self.approx_eq(&-*other, epsilon)
    }
}

impl From<[f64; 4]> for Quaternion {
    /// `[w, x, y, z]`
    fn from(c: [f64; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<&Quaternion> for [f64; 4] {
    fn from(q: &Quaternion) -> Self {
        [q.w, q.x, q.y, q.z]
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product; `(a * b).transform(v) == a.transform(b.transform(v))`
    fn mul(self, rhs: Self) -> Self {
        let (a, b) = (self, rhs);
        Self {
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            negate: a.negate ^ b.negate,
        }
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, k: f64) -> Self {
        Self {
            w: self.w * k,
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
            ..self
        }
    }
}

impl Add for Quaternion {
    type Output = Self;

    /// Componentwise; keeps the left flag
    fn add(self, rhs: Self) -> Self {
        Self {
            w: self.w + rhs.w,
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
            ..self
        }
    }
}

impl Neg for Quaternion {
    type Output = Self;

    /// Negates the components only; `-q` is the same isometry as `q`
    fn neg(self) -> Self {
        self * -1.0
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}
