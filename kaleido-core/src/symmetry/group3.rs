//! 3D realization with signed quaternions.

use super::SymmetryGroup;
use crate::coxeter::CoxeterGroup;
use crate::error::{KaleidoError, Result};
use crate::quaternion::Quaternion;
use crate::vector::{cross3, normalize3};

/// Reflection group of rank 1 to 3 acting on R³.
///
/// Groups of rank below 3 act in the xy-plane.
pub type SymmetryGroup3 = SymmetryGroup<Quaternion>;

impl SymmetryGroup<Quaternion> {
    /// Realize a group of rank 1, 2 or 3
    pub fn new(group: CoxeterGroup) -> Result<Self> {
        if !(1..=3).contains(&group.rank()) {
            return Err(KaleidoError::InvalidRank {
                rank: group.rank(),
                expected: "1..=3".to_string(),
            });
        }
        Self::realize(group)
    }

    /// Direction of the line where mirrors `i` and `j` meet
    pub fn mirror_axis(&self, i: usize, j: usize) -> Option<[f64; 3]> {
        let a = self.normals().get(i)?;
        let b = self.normals().get(j)?;
        let axis = normalize3(cross3(*a, *b));
        (axis != [0.0; 3]).then_some(axis)
    }

    /// Rotation taking this group's `(i, j)` mirror axis onto `other`'s
    /// `(k, l)` axis.
    ///
    /// Aligns two mirror systems of different order so their figures can be
    /// overlaid as a compound. `None` when an axis is undefined or the two
    /// axes are exactly opposite.
    pub fn align_axis(
        &self,
        from: (usize, usize),
        other: &SymmetryGroup3,
        to: (usize, usize),
    ) -> Option<Quaternion> {
        let u = self.mirror_axis(from.0, from.1)?;
        let v = other.mirror_axis(to.0, to.1)?;
        Quaternion::try_from_to(u, v)
    }
}
