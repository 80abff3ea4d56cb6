//! Kaleido WebAssembly bindings via wasm-bindgen
//!
//! Exposes polytope tracing and mesh building to browser renderers.
//! Buffers come back as typed arrays ready for WebGL upload.
//!
//! ## Example
//!
//! ```javascript
//! import init, { Kaleidoscope, version } from '@kaleido/wasm';
//!
//! async function main() {
//!   await init();
//!
//!   // Snub cube
//!   const k = new Kaleidoscope("3,4", "snub");
//!   console.log(k.order(), k.is_limit_over());
//!
//!   const mesh = k.build_mesh("global-even-odd");
//!   gl.bufferData(gl.ARRAY_BUFFER, mesh.triangles(), gl.STATIC_DRAW);
//!
//!   // Stencil batches for self-overlapping planes
//!   let start = 0;
//!   for (const end of mesh.stencil_checkpoints()) {
//!     drawStencilBatch(start, end);
//!     start = end;
//!   }
//!
//!   console.log("Kaleido version:", version());
//! }
//!
//! main();
//! ```

use js_sys::{Float32Array, Float64Array, Uint32Array};
use wasm_bindgen::prelude::*;

use kaleido_core::{
    build_mesh, CoxeterMatrix, EngineConfig, FillMode, Mesh, MeshInput, MeshOptions,
    Polychoron, Polyhedron, SelectorKind, Topology,
};

// Set up panic hook for better error messages
#[cfg(feature = "console_error_panic_hook")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

enum Figure {
    Polyhedron(Polyhedron),
    Polychoron(Polychoron),
}

/// A traced polytope and its mesh builder
#[wasm_bindgen]
pub struct Kaleidoscope {
    figure: Figure,
    /// Eye distance used when projecting 4D figures
    projection_distance: f64,
}

#[wasm_bindgen]
impl Kaleidoscope {
    /// Close the group for `matrix` (e.g. "3,5") and trace `selector`
    #[wasm_bindgen(constructor)]
    pub fn new(matrix: &str, selector: &str) -> Result<Kaleidoscope, JsError> {
        let matrix: CoxeterMatrix = matrix.parse().map_err(to_js)?;
        let selector: SelectorKind = selector.parse().map_err(to_js)?;
        let config = EngineConfig::default();
        let limits = config.closure.limits_for(matrix.rank());

        let figure = if matrix.rank() == 4 {
            Figure::Polychoron(Polychoron::from_matrix(matrix, limits, selector).map_err(to_js)?)
        } else {
            Figure::Polyhedron(Polyhedron::from_matrix(matrix, limits, selector).map_err(to_js)?)
        };

        let k = Kaleidoscope {
            figure,
            projection_distance: config.mesh.projection_distance,
        };
        if k.is_limit_over() {
            web_sys::console::warn_1(
                &format!("closure stopped at {} elements; group is infinite", k.order()).into(),
            );
        }
        Ok(k)
    }

    /// Move the seed point. Takes 3 coordinates, or 4 for rank 4 groups.
    #[wasm_bindgen]
    pub fn set_origin(&mut self, coords: &[f64]) -> Result<(), JsError> {
        match &mut self.figure {
            Figure::Polyhedron(p) => p.set_origin(fixed::<3>(coords)?),
            Figure::Polychoron(p) => p.set_origin(fixed::<4>(coords)?),
        }
        Ok(())
    }

    /// Number of group elements reached
    #[wasm_bindgen]
    pub fn order(&self) -> usize {
        match &self.figure {
            Figure::Polyhedron(p) => p.symmetry().order(),
            Figure::Polychoron(p) => p.symmetry().order(),
        }
    }

    /// True when the closure hit its cap
    #[wasm_bindgen]
    pub fn is_limit_over(&self) -> bool {
        match &self.figure {
            Figure::Polyhedron(p) => p.symmetry().group().is_limit_over(),
            Figure::Polychoron(p) => p.symmetry().group().is_limit_over(),
        }
    }

    /// Coordinates per vertex: 3, or 4 for rank 4 groups
    #[wasm_bindgen]
    pub fn dimension(&self) -> usize {
        match &self.figure {
            Figure::Polyhedron(_) => 3,
            Figure::Polychoron(_) => 4,
        }
    }

    /// Vertex coordinates, `dimension()` floats each
    #[wasm_bindgen]
    pub fn vertexes(&self) -> Float64Array {
        let flat = match &self.figure {
            Figure::Polyhedron(p) => p.flat_vertexes(),
            Figure::Polychoron(p) => p.flat_vertexes(),
        };
        Float64Array::from(flat.as_slice())
    }

    /// Edge endpoints as index pairs
    #[wasm_bindgen]
    pub fn edges(&self) -> Uint32Array {
        let pairs: Vec<u32> = self
            .topology()
            .edges()
            .iter()
            .flat_map(|e| [e.a as u32, e.b as u32])
            .collect();
        Uint32Array::from(pairs.as_slice())
    }

    /// Faces as a JSON array of `{ vertexes, color_index, connected_index, spec }`
    #[wasm_bindgen]
    pub fn faces_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.topology().faces())
            .map_err(|e| JsError::new(&format!("Failed to serialize: {}", e)))
    }

    /// Edges, faces, cells and components as a JSON string
    #[wasm_bindgen]
    pub fn topology_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.topology())
            .map_err(|e| JsError::new(&format!("Failed to serialize: {}", e)))
    }

    /// Build render buffers under a fill rule
    /// ("non-zero", "even-odd" or "global-even-odd")
    #[wasm_bindgen]
    pub fn build_mesh(&self, fill: &str) -> Result<MeshBuffers, JsError> {
        let options = MeshOptions {
            fill: fill.parse::<FillMode>().map_err(to_js)?,
            ..MeshOptions::default()
        };
        Ok(MeshBuffers {
            inner: build_mesh(&self.mesh_input(), &options),
        })
    }
}

impl Kaleidoscope {
    fn topology(&self) -> &Topology {
        match &self.figure {
            Figure::Polyhedron(p) => p.topology(),
            Figure::Polychoron(p) => p.topology(),
        }
    }

    fn mesh_input(&self) -> MeshInput {
        match &self.figure {
            Figure::Polyhedron(p) => p.mesh_input(),
            Figure::Polychoron(p) => p.mesh_input(self.projection_distance),
        }
    }
}

/// Interleaved render buffers
#[wasm_bindgen]
pub struct MeshBuffers {
    inner: Mesh,
}

#[wasm_bindgen]
impl MeshBuffers {
    /// position(3) normal(3) color(4) per vertex
    #[wasm_bindgen]
    pub fn triangles(&self) -> Float32Array {
        Float32Array::from(self.inner.triangles.as_slice())
    }

    /// Same layout, drawn through the stencil buffer
    #[wasm_bindgen]
    pub fn stencil_triangles(&self) -> Float32Array {
        Float32Array::from(self.inner.stencil_triangles.as_slice())
    }

    /// Stencil vertex count at the end of each batch
    #[wasm_bindgen]
    pub fn stencil_checkpoints(&self) -> Uint32Array {
        let ends: Vec<u32> = self
            .inner
            .stencil_checkpoints
            .iter()
            .map(|&c| c as u32)
            .collect();
        Uint32Array::from(ends.as_slice())
    }

    /// position(3) color(4) per point
    #[wasm_bindgen]
    pub fn points(&self) -> Float32Array {
        Float32Array::from(self.inner.points.as_slice())
    }

    /// start(3) end(3) color(4) per line
    #[wasm_bindgen]
    pub fn lines(&self) -> Float32Array {
        Float32Array::from(self.inner.lines.as_slice())
    }

    /// SHA-256 over every buffer
    #[wasm_bindgen]
    pub fn digest(&self) -> String {
        self.inner.digest()
    }
}

/// Errors cross the boundary as the JSON error envelope
fn to_js(e: kaleido_core::KaleidoError) -> JsError {
    match serde_json::to_string(&e.to_response()) {
        Ok(json) => JsError::new(&json),
        Err(_) => JsError::new(&e.to_string()),
    }
}

fn fixed<const N: usize>(coords: &[f64]) -> Result<[f64; N], JsError> {
    coords.try_into().map_err(|_| {
        JsError::new(&format!(
            "Expected {} coordinates, got {}",
            N,
            coords.len()
        ))
    })
}

/// Get the Kaleido library version
#[wasm_bindgen]
pub fn version() -> String {
    kaleido_core::VERSION.to_string()
}
