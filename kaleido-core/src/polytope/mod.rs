//! Uniform polytopes traced from a realized reflection group.
//!
//! One vertex per group element: the origin moved by that element's
//! transform. A [`SelectorKind`] names which step words generate edges,
//! faces and cells; [`Topology`] traces their orbits. Compound figures
//! repeat everything under extra rigid transforms.

mod cells;
mod components;
mod polychoron;
mod polyhedron;
mod selector;
mod topology;

pub use polychoron::Polychoron;
pub use polyhedron::Polyhedron;
pub use selector::{CellSpec, FaceSpec, Gluing, Selection, SelectorKind};
pub use topology::{Cell, Edge, Face, Topology};

use crate::error::Result;
use crate::mesh::MeshInput;
use crate::symmetry::{Isometry, SymmetryGroup};

/// A polytope over the transforms `T`: topology plus vertex positions
#[derive(Clone, Debug)]
pub struct Polytope<T: Isometry> {
    symmetry: SymmetryGroup<T>,
    selector: SelectorKind,
    generators: Vec<usize>,
    selection: Selection,
    reflector: Option<usize>,
    compounds: Vec<T>,
    topology: Topology,
    origin: T::Vector,
    vertexes: Vec<T::Vector>,
}

impl<T: Isometry> Polytope<T> {
    /// Trace `selector` over the simple mirrors
    pub fn new(symmetry: SymmetryGroup<T>, selector: SelectorKind) -> Result<Self> {
        let generators = symmetry.default_generators();
        Self::with_generators(symmetry, selector, generators)
    }

    /// Trace `selector` over a custom generator tuple.
    ///
    /// The snub selector pairs its two chiral halves through the first
    /// generator; see [`Polytope::set_reflector`].
    pub fn with_generators(
        symmetry: SymmetryGroup<T>,
        selector: SelectorKind,
        generators: Vec<usize>,
    ) -> Result<Self> {
        let selection = selector.select(symmetry.group(), &generators)?;
        let reflector = match selector {
            SelectorKind::Snub => generators.first().copied(),
            _ => None,
        };
        let topology = Topology::trace(symmetry.group(), &selection, reflector);
        let origin = symmetry.default_origin();

        let mut polytope = Self {
            symmetry,
            selector,
            generators,
            selection,
            reflector,
            compounds: Vec::new(),
            topology,
            origin,
            vertexes: Vec::new(),
        };
        polytope.place_vertexes();
        Ok(polytope)
    }

    /// Element that swaps mirror-image halves, or `None` to flood fill them
    pub fn set_reflector(&mut self, reflector: Option<usize>) {
        self.reflector = reflector;
        self.topology = Topology::trace(self.symmetry.group(), &self.selection, reflector)
            .replicate(self.compounds.len() + 1);
    }

    /// Replace the compound copies. Copy 0 is always the untransformed
    /// figure; `transforms[k]` places copy `k + 1`.
    pub fn set_compounds(&mut self, transforms: Vec<T>) {
        self.compounds = transforms;
        self.topology = self.topology.replicate(self.compounds.len() + 1);
        self.place_vertexes();
    }

    /// Move the seed point; a pure re-transform of every vertex
    pub fn set_origin(&mut self, origin: T::Vector) {
        self.origin = origin;
        self.place_vertexes();
    }

    fn place_vertexes(&mut self) {
        let base = self.symmetry.orbit(self.origin);
        let mut vertexes = Vec::with_capacity(base.len() * (self.compounds.len() + 1));
        vertexes.extend_from_slice(&base);
        for copy in &self.compounds {
            vertexes.extend(base.iter().map(|&v| copy.apply(v)));
        }
        self.vertexes = vertexes;
    }

    pub fn symmetry(&self) -> &SymmetryGroup<T> {
        &self.symmetry
    }

    pub fn selector(&self) -> SelectorKind {
        self.selector
    }

    pub fn generators(&self) -> &[usize] {
        &self.generators
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn reflector(&self) -> Option<usize> {
        self.reflector
    }

    pub fn compounds(&self) -> &[T] {
        &self.compounds
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn origin(&self) -> T::Vector {
        self.origin
    }

    /// Vertex positions, copy-major
    pub fn vertexes(&self) -> &[T::Vector] {
        &self.vertexes
    }

    /// Vertex coordinates flattened, `DIM` floats per vertex
    pub fn flat_vertexes(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.vertexes.len() * T::DIM);
        for v in &self.vertexes {
            out.extend_from_slice(v.as_ref());
        }
        out
    }

    pub fn edges(&self) -> &[Edge] {
        self.topology.edges()
    }

    pub fn faces(&self) -> &[Face] {
        self.topology.faces()
    }

    pub fn cells(&self) -> &[Cell] {
        self.topology.cells()
    }

    /// Re-walk the traced faces and cells
    pub fn verify(&self) -> Result<()> {
        self.topology.verify(self.symmetry.group(), &self.selection)
    }

    /// Mesh input with every vertex mapped into 3D by `project`
    pub(crate) fn mesh_input_with(&self, project: impl Fn(T::Vector) -> [f64; 3]) -> MeshInput {
        MeshInput {
            positions: self.vertexes.iter().map(|&v| project(v)).collect(),
            vertex_components: self.topology.vertex_components().to_vec(),
            edges: self.topology.edges().to_vec(),
            faces: self.topology.faces().to_vec(),
        }
    }
}
