//! Polyhedra: rank 1 to 3 groups acting on R³.

use super::{Polytope, SelectorKind};
use crate::config::ClosureLimits;
use crate::coxeter::{CoxeterGroup, CoxeterMatrix};
use crate::error::Result;
use crate::mesh::MeshInput;
use crate::quaternion::Quaternion;
use crate::symmetry::SymmetryGroup3;

/// A polyhedron and its compound copies
pub type Polyhedron = Polytope<Quaternion>;

impl Polytope<Quaternion> {
    /// Close, realize and trace in one go
    pub fn from_matrix(
        matrix: CoxeterMatrix,
        limits: ClosureLimits,
        selector: SelectorKind,
    ) -> Result<Self> {
        let group = CoxeterGroup::with_limits(matrix, limits)?;
        Self::new(SymmetryGroup3::new(group)?, selector)
    }

    /// Positions as they are, ready for the mesh builder
    pub fn mesh_input(&self) -> MeshInput {
        self.mesh_input_with(|v| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{norm3, sub3};
    use approx::assert_relative_eq;

    fn polyhedron(labels: &[i64], selector: SelectorKind) -> Polyhedron {
        let matrix = CoxeterMatrix::linear_int(labels).unwrap();
        Polyhedron::from_matrix(matrix, ClosureLimits::for_rank(3), selector).unwrap()
    }

    #[test]
    fn test_vertexes_on_unit_sphere() {
        let p = polyhedron(&[3, 4], SelectorKind::Omnitruncate);
        assert_eq!(p.vertexes().len(), 48);
        for v in p.vertexes() {
            assert_relative_eq!(norm3(*v), 1.0, epsilon = 1e-12);
        }
        p.verify().unwrap();
    }

    #[test]
    fn test_set_origin_retransforms() {
        let mut p = polyhedron(&[3, 3], SelectorKind::Omnitruncate);
        let edges = p.edges().to_vec();
        p.set_origin([0.0, 0.0, 2.0]);
        assert_eq!(p.edges(), edges.as_slice());
        for v in p.vertexes() {
            assert_relative_eq!(norm3(*v), 2.0, epsilon = 1e-12);
        }
        let t = p.symmetry().transforms()[5];
        let expected = t.transform([0.0, 0.0, 2.0]);
        assert_relative_eq!(norm3(sub3(p.vertexes()[5], expected)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compound_copies() {
        let mut p = polyhedron(&[3, 3], SelectorKind::Omnitruncate);
        let half_turn = Quaternion::rotation([0.0, 0.0, 1.0], std::f64::consts::FRAC_PI_2);
        p.set_compounds(vec![half_turn]);
        assert_eq!(p.vertexes().len(), 48);
        assert_eq!(p.topology().copies(), 2);
        assert_eq!(p.edges().len(), 72);
        let moved = half_turn.transform(p.vertexes()[3]);
        assert_relative_eq!(norm3(sub3(p.vertexes()[24 + 3], moved)), 0.0, epsilon = 1e-12);

        let input = p.mesh_input();
        assert_eq!(input.positions.len(), 48);
        assert_eq!(input.vertex_components[30], 1);
    }

    #[test]
    fn test_snub_pairs_halves_through_first_mirror() {
        let p = polyhedron(&[3, 5], SelectorKind::Snub);
        assert_eq!(p.reflector(), Some(p.generators()[0]));
        assert_eq!(p.topology().component_count(), 2);
        p.verify().unwrap();
    }

    #[test]
    fn test_edges_have_equal_length() {
        // The default origin is equidistant from every mirror
        let p = polyhedron(&[3, 5], SelectorKind::Omnitruncate);
        let mut lengths: Vec<f64> = p
            .edges()
            .iter()
            .map(|e| norm3(sub3(p.vertexes()[e.a], p.vertexes()[e.b])))
            .collect();
        lengths.sort_by(|a, b| a.partial_cmp(b).unwrap());
        lengths.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        assert_eq!(lengths.len(), 1);
    }
}
