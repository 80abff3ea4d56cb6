//! Polychora: rank 4 groups acting on R⁴.

use super::{Polytope, SelectorKind};
use crate::config::ClosureLimits;
use crate::coxeter::{CoxeterGroup, CoxeterMatrix};
use crate::error::Result;
use crate::mesh::{project_perspective, MeshInput};
use crate::quaternion::QuaternionPair;
use crate::symmetry::SymmetryGroup4;

/// A polychoron, its cells and its compound copies
pub type Polychoron = Polytope<QuaternionPair>;

impl Polytope<QuaternionPair> {
    /// Close, realize and trace in one go
    pub fn from_matrix(
        matrix: CoxeterMatrix,
        limits: ClosureLimits,
        selector: SelectorKind,
    ) -> Result<Self> {
        let group = CoxeterGroup::with_limits(matrix, limits)?;
        Self::new(SymmetryGroup4::new(group)?, selector)
    }

    /// Positions projected into 3D from an eye at `distance` along `w`
    pub fn mesh_input(&self, distance: f64) -> MeshInput {
        self.mesh_input_with(|v| project_perspective(v, distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::norm4;

    fn polychoron(labels: &[i64], selector: SelectorKind) -> Polychoron {
        let matrix = CoxeterMatrix::linear_int(labels).unwrap();
        Polychoron::from_matrix(matrix, ClosureLimits::for_rank(4), selector).unwrap()
    }

    #[test]
    fn test_omnitruncated_tesseract() {
        // [4,3,3]: 384 vertexes, 768 edges, 464 faces, 80 cells
        let p = polychoron(&[4, 3, 3], SelectorKind::Omnitruncate);
        assert_eq!(p.vertexes().len(), 384);
        assert_eq!(p.edges().len(), 768);
        assert_eq!(p.faces().len(), 464);
        assert_eq!(p.cells().len(), 80);
        for v in p.vertexes() {
            assert!((norm4(*v) - 1.0).abs() < 1e-9);
        }
        p.verify().unwrap();
    }

    #[test]
    fn test_projected_mesh_input() {
        let p = polychoron(&[3, 3, 3], SelectorKind::Omnitruncate);
        let input = p.mesh_input(2.0);
        assert_eq!(input.positions.len(), 120);
        assert_eq!(input.faces.len(), 150);
        assert!(input
            .positions
            .iter()
            .all(|q| q.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn test_rank_mismatch() {
        let matrix = CoxeterMatrix::linear_int(&[3, 3]).unwrap();
        let err = Polychoron::from_matrix(matrix, ClosureLimits::for_rank(3), SelectorKind::Snub)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_RANK");
    }
}
