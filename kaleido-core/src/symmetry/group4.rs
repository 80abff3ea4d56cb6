//! 4D realization with quaternion pairs.

use super::SymmetryGroup;
use crate::coxeter::CoxeterGroup;
use crate::error::{KaleidoError, Result};
use crate::quaternion::QuaternionPair;

/// Reflection group of rank 4 acting on R⁴
pub type SymmetryGroup4 = SymmetryGroup<QuaternionPair>;

impl SymmetryGroup<QuaternionPair> {
    /// Realize a rank-4 group
    pub fn new(group: CoxeterGroup) -> Result<Self> {
        if group.rank() != 4 {
            return Err(KaleidoError::InvalidRank {
                rank: group.rank(),
                expected: "4".to_string(),
            });
        }
        Self::realize(group)
    }
}
