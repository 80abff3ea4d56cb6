//! # Kaleido-Core
//!
//! Finite reflection groups and the uniform polytopes they generate.
//!
//! The pipeline runs in stages, each an eagerly computed snapshot:
//!
//! 1. [`CoxeterMatrix`]: bond labels between mirrors
//! 2. [`CoxeterGroup`]: every element, enumerated rank by rank
//! 3. [`SymmetryGroup3`] / [`SymmetryGroup4`]: one quaternion (pair) per element
//! 4. [`Polyhedron`] / [`Polychoron`]: vertexes, edges, faces and cells
//! 5. [`Mesh`]: triangle, point and line buffers for a renderer
//!
//! ## Example
//!
//! ```rust
//! use kaleido_core::{build_mesh, CoxeterMatrix, MeshOptions, Polyhedron, SelectorKind};
//! use kaleido_core::config::ClosureLimits;
//!
//! // Icosahedral symmetry
//! let matrix: CoxeterMatrix = "3,5".parse().unwrap();
//! let polyhedron =
//!     Polyhedron::from_matrix(matrix, ClosureLimits::for_rank(3), SelectorKind::Omnitruncate)
//!         .unwrap();
//!
//! // Great rhombicosidodecahedron
//! assert_eq!(polyhedron.vertexes().len(), 120);
//! assert_eq!(polyhedron.faces().len(), 62);
//!
//! let mesh = build_mesh(&polyhedron.mesh_input(), &MeshOptions::default());
//! assert!(mesh.triangle_count() > 0);
//! ```

pub mod config;
pub mod coxeter;
pub mod error;
pub mod mesh;
pub mod polytope;
pub mod quaternion;
pub mod rational;
pub mod symmetry;
pub mod vector;

// Re-exports for convenience
pub use config::EngineConfig;
pub use coxeter::{CoxeterGroup, CoxeterMatrix, Element, SpaceType};
pub use error::{ErrorCategory, KaleidoError, Result};
pub use mesh::{build_mesh, project_perspective, FillMode, Mesh, MeshInput, MeshOptions};
pub use polytope::{Polychoron, Polyhedron, Polytope, SelectorKind, Topology};
pub use quaternion::{Quaternion, QuaternionPair};
pub use rational::Rational;
pub use symmetry::{Isometry, SymmetryGroup, SymmetryGroup3, SymmetryGroup4};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
