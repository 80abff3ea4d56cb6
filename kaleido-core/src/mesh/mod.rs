//! Render buffers from topology and coordinates.
//!
//! [`build_mesh`] is a pure function of its inputs. Output buffers are
//! interleaved `f32`:
//!
//! - triangles: `position(3) normal(3) color(4)`
//! - points: `position(3) color(4)`
//! - lines: `start(3) end(3) color(4)`
//!
//! Faces that need parity filling go to a separate stencil buffer, cut
//! into batches by [`Mesh::stencil_checkpoints`].

mod plane;
mod triangulate;

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::tolerance::{DEGENERATE_EDGE_EPSILON, POINT_MERGE_EPSILON};
use crate::config::MeshConfig;
use crate::error::{KaleidoError, Result};
use crate::polytope::{Edge, Face};
use crate::vector::{norm3, sub3};

use plane::group_by_plane;
use triangulate::{fan, is_self_intersecting, plane_normal, triangle_normal, triangulate, Triangle};

/// Floats per triangle vertex
pub const TRIANGLE_STRIDE: usize = 10;
/// Floats per point glyph
pub const POINT_STRIDE: usize = 7;
/// Floats per line glyph
pub const LINE_STRIDE: usize = 10;

/// Polygon fill rule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Every face filled on its own
    #[default]
    NonZero,
    /// Crossing-aware pentagons
    EvenOdd,
    /// Coplanar and self-intersecting faces resolved by a stencil parity pass
    GlobalEvenOdd,
}

impl FillMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillMode::NonZero => "non_zero",
            FillMode::EvenOdd => "even_odd",
            FillMode::GlobalEvenOdd => "global_even_odd",
        }
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillMode {
    type Err = KaleidoError;

    /// Accepts `snake_case` and `kebab-case` names
    fn from_str(s: &str) -> Result<Self> {
        match s.replace('-', "_").as_str() {
            "non_zero" | "nonzero" => Ok(FillMode::NonZero),
            "even_odd" => Ok(FillMode::EvenOdd),
            "global_even_odd" => Ok(FillMode::GlobalEvenOdd),
            _ => Err(KaleidoError::Config {
                reason: format!("unknown fill mode '{}'", s),
            }),
        }
    }
}

/// Everything the mesh builder reads from a polytope
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshInput {
    pub positions: Vec<[f64; 3]>,
    pub vertex_components: Vec<usize>,
    pub edges: Vec<Edge>,
    pub faces: Vec<Face>,
}

/// Mesh builder options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshOptions {
    pub fill: FillMode,
    pub plane_epsilon: f64,
    pub show_vertexes: bool,
    pub show_edges: bool,
    /// Face color indexes left out of the mesh
    pub hidden_colors: BTreeSet<usize>,
    /// Connected components left out of the mesh
    pub hidden_components: BTreeSet<usize>,
    /// Face colors, indexed by color index modulo length
    pub palette: Vec<[f32; 4]>,
    pub vertex_color: [f32; 4],
    pub edge_color: [f32; 4],
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self::from(&MeshConfig::default())
    }
}

impl From<&MeshConfig> for MeshOptions {
    fn from(config: &MeshConfig) -> Self {
        Self {
            fill: config.fill,
            plane_epsilon: config.plane_epsilon,
            show_vertexes: config.show_vertexes,
            show_edges: config.show_edges,
            hidden_colors: BTreeSet::new(),
            hidden_components: BTreeSet::new(),
            palette: vec![
                [0.90, 0.36, 0.32, 1.0],
                [0.98, 0.80, 0.33, 1.0],
                [0.35, 0.70, 0.90, 1.0],
                [0.55, 0.85, 0.45, 1.0],
                [0.75, 0.50, 0.90, 1.0],
                [0.95, 0.60, 0.80, 1.0],
            ],
            vertex_color: [1.0, 1.0, 1.0, 1.0],
            edge_color: [0.15, 0.15, 0.15, 1.0],
        }
    }
}

impl MeshOptions {
    fn face_color(&self, color_index: usize) -> [f32; 4] {
        if self.palette.is_empty() {
            return [1.0; 4];
        }
        self.palette[color_index % self.palette.len()]
    }

    fn shows_face(&self, face: &Face) -> bool {
        !self.hidden_colors.contains(&face.color_index)
            && !self.hidden_components.contains(&face.connected_index)
    }
}

/// Render buffers
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub triangles: Vec<f32>,
    pub stencil_triangles: Vec<f32>,
    /// Stencil vertex count at the end of each batch
    pub stencil_checkpoints: Vec<usize>,
    pub points: Vec<f32>,
    pub lines: Vec<f32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / (3 * TRIANGLE_STRIDE)
    }

    pub fn stencil_triangle_count(&self) -> usize {
        self.stencil_triangles.len() / (3 * TRIANGLE_STRIDE)
    }

    pub fn point_count(&self) -> usize {
        self.points.len() / POINT_STRIDE
    }

    pub fn line_count(&self) -> usize {
        self.lines.len() / LINE_STRIDE
    }

    /// SHA-256 over every buffer, hex encoded
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for buffer in [&self.triangles, &self.stencil_triangles, &self.points, &self.lines] {
            hasher.update((buffer.len() as u64).to_le_bytes());
            for x in buffer.iter() {
                hasher.update(x.to_le_bytes());
            }
        }
        hasher.update((self.stencil_checkpoints.len() as u64).to_le_bytes());
        for c in &self.stencil_checkpoints {
            hasher.update((*c as u64).to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }

    fn push_triangle(buffer: &mut Vec<f32>, t: &Triangle, fallback: [f64; 3], color: [f32; 4]) {
        let mut normal = triangle_normal(t);
        if normal == [0.0; 3] {
            normal = fallback;
        }
        for p in t {
            buffer.extend(p.iter().map(|&c| c as f32));
            buffer.extend(normal.iter().map(|&c| c as f32));
            buffer.extend_from_slice(&color);
        }
    }
}

/// Perspective projection from 4D, eye on the `w` axis at `distance`.
///
/// Vectors are `[w, x, y, z]`.
pub fn project_perspective(v: [f64; 4], distance: f64) -> [f64; 3] {
    let mut depth = distance - v[0];
    if depth.abs() < DEGENERATE_EDGE_EPSILON {
        depth = DEGENERATE_EDGE_EPSILON.copysign(depth);
    }
    let s = distance / depth;
    [v[1] * s, v[2] * s, v[3] * s]
}

fn face_points(input: &MeshInput, face: &Face) -> Option<Vec<[f64; 3]>> {
    face.vertexes
        .iter()
        .map(|&v| input.positions.get(v).copied())
        .collect()
}

/// Build render buffers for a polytope
pub fn build_mesh(input: &MeshInput, options: &MeshOptions) -> Mesh {
    let mut mesh = Mesh::default();

    let visible: Vec<(usize, Vec<[f64; 3]>)> = input
        .faces
        .iter()
        .enumerate()
        .filter(|(_, f)| options.shows_face(f))
        .filter_map(|(i, f)| match face_points(input, f) {
            Some(points) if points.len() >= 3 => Some((i, points)),
            _ => {
                warn!(face = i, "skipping face with missing or too few vertexes");
                None
            }
        })
        .collect();

    match options.fill {
        FillMode::NonZero | FillMode::EvenOdd => {
            let even_odd = options.fill == FillMode::EvenOdd;
            for (i, points) in &visible {
                emit_face(&mut mesh.triangles, input, options, *i, points, even_odd);
            }
        }
        FillMode::GlobalEvenOdd => {
            let (groups, degenerate) = group_by_plane(
                visible.iter().map(|(i, p)| (*i, p.as_slice())),
                options.plane_epsilon,
            );
            if !degenerate.is_empty() {
                warn!(count = degenerate.len(), "skipping faces with no defined plane");
            }
            let mut slot = vec![None; input.faces.len()];
            for (k, (i, _)) in visible.iter().enumerate() {
                slot[*i] = Some(k);
            }
            let points_of = |face: usize| -> Option<&[[f64; 3]]> {
                let k = (*slot.get(face)?)?;
                Some(visible[k].1.as_slice())
            };
            let mut is_degenerate = vec![false; input.faces.len()];
            for &i in &degenerate {
                is_degenerate[i] = true;
            }

            // Batches go out in order of their first face
            let mut batches: Vec<Vec<usize>> = groups.into_iter().filter(|m| m.len() > 1).collect();
            batches.sort_by_key(|b| b[0]);
            let mut batch_of = vec![None; input.faces.len()];
            for (k, batch) in batches.iter().enumerate() {
                for &f in batch {
                    batch_of[f] = Some(k);
                }
            }

            let mut emitted = vec![false; batches.len()];
            for (i, points) in &visible {
                if is_degenerate[*i] {
                    continue;
                }
                match batch_of[*i] {
                    Some(k) if !emitted[k] => {
                        emitted[k] = true;
                        for &f in &batches[k] {
                            if let Some(p) = points_of(f) {
                                emit_stencil(&mut mesh.stencil_triangles, input, options, f, p);
                            }
                        }
                        mesh.stencil_checkpoints
                            .push(mesh.stencil_triangles.len() / TRIANGLE_STRIDE);
                    }
                    Some(_) => {}
                    None if is_self_intersecting(points) => {
                        emit_stencil(&mut mesh.stencil_triangles, input, options, *i, points);
                        mesh.stencil_checkpoints
                            .push(mesh.stencil_triangles.len() / TRIANGLE_STRIDE);
                    }
                    None => emit_face(&mut mesh.triangles, input, options, *i, points, true),
                }
            }
        }
    }

    if options.show_vertexes {
        let mut seen = HashSet::new();
        for (v, p) in input.positions.iter().enumerate() {
            let component = input.vertex_components.get(v).copied().unwrap_or(0);
            if options.hidden_components.contains(&component) {
                continue;
            }
            let key = p.map(|c| (c / POINT_MERGE_EPSILON).round() as i64);
            if !seen.insert(key) {
                continue;
            }
            mesh.points.extend(p.iter().map(|&c| c as f32));
            mesh.points.extend_from_slice(&options.vertex_color);
        }
    }

    if options.show_edges {
        for e in &input.edges {
            if options.hidden_components.contains(&e.connected_index) {
                continue;
            }
            let (Some(&a), Some(&b)) = (input.positions.get(e.a), input.positions.get(e.b)) else {
                continue;
            };
            if norm3(sub3(a, b)) < DEGENERATE_EDGE_EPSILON {
                continue;
            }
            mesh.lines.extend(a.iter().map(|&c| c as f32));
            mesh.lines.extend(b.iter().map(|&c| c as f32));
            mesh.lines.extend_from_slice(&options.edge_color);
        }
    }

    debug!(
        triangles = mesh.triangle_count(),
        stencil_triangles = mesh.stencil_triangle_count(),
        stencil_batches = mesh.stencil_checkpoints.len(),
        points = mesh.point_count(),
        lines = mesh.line_count(),
        "built mesh"
    );
    mesh
}

fn emit_face(
    buffer: &mut Vec<f32>,
    input: &MeshInput,
    options: &MeshOptions,
    face: usize,
    points: &[[f64; 3]],
    even_odd: bool,
) {
    let color = options.face_color(input.faces[face].color_index);
    let normal = plane_normal(points);
    for t in triangulate(points, even_odd) {
        Mesh::push_triangle(buffer, &t, normal, color);
    }
}

fn emit_stencil(
    buffer: &mut Vec<f32>,
    input: &MeshInput,
    options: &MeshOptions,
    face: usize,
    points: &[[f64; 3]],
) {
    let color = options.face_color(input.faces[face].color_index);
    let normal = plane_normal(points);
    for t in fan(points) {
        Mesh::push_triangle(buffer, &t, normal, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(z: f64, offset: f64, start: usize) -> (Vec<[f64; 3]>, Face) {
        let positions = vec![
            [offset, 0.0, z],
            [offset + 1.0, 0.0, z],
            [offset + 1.0, 1.0, z],
            [offset, 1.0, z],
        ];
        let face = Face {
            vertexes: (start..start + 4).collect(),
            color_index: 0,
            connected_index: 0,
            spec: 0,
        };
        (positions, face)
    }

    fn input_of(squares: Vec<(Vec<[f64; 3]>, Face)>) -> MeshInput {
        let mut input = MeshInput::default();
        for (positions, face) in squares {
            input.positions.extend(positions);
            input.faces.push(face);
        }
        input.vertex_components = vec![0; input.positions.len()];
        input
    }

    #[test]
    fn test_single_face_buffers() {
        let mut input = input_of(vec![square(0.0, 0.0, 0)]);
        input.edges.push(Edge { a: 0, b: 1, connected_index: 0 });
        input.edges.push(Edge { a: 1, b: 1, connected_index: 0 });
        let mesh = build_mesh(&input, &MeshOptions::default());
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.point_count(), 4);
        // The zero-length edge is dropped
        assert_eq!(mesh.line_count(), 1);
        assert!(mesh.stencil_checkpoints.is_empty());
        // Normal of the first vertex is ±z
        assert_eq!(mesh.triangles[5].abs(), 1.0);
    }

    #[test]
    fn test_duplicate_points_merge() {
        let mut input = input_of(vec![square(0.0, 0.0, 0)]);
        input.positions.push([0.0, 0.0, 0.0]);
        input.vertex_components.push(0);
        let mesh = build_mesh(&input, &MeshOptions::default());
        assert_eq!(mesh.point_count(), 4);
    }

    #[test]
    fn test_visibility_filters() {
        let (positions, mut face) = square(0.0, 0.0, 0);
        face.color_index = 2;
        let input = input_of(vec![(positions, face)]);
        let mut options = MeshOptions::default();
        options.hidden_colors.insert(2);
        let mesh = build_mesh(&input, &options);
        assert_eq!(mesh.triangle_count(), 0);

        let mut options = MeshOptions::default();
        options.hidden_components.insert(0);
        let mesh = build_mesh(&input, &options);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.point_count(), 0);
    }

    #[test]
    fn test_global_even_odd_batches_coplanar_faces() {
        let input = input_of(vec![
            square(0.0, 0.0, 0),
            square(0.0, 0.5, 4),
            square(1.0, 0.0, 8),
        ]);
        let options = MeshOptions {
            fill: FillMode::GlobalEvenOdd,
            ..Default::default()
        };
        let mesh = build_mesh(&input, &options);
        // The two overlapping squares at z = 0 form one stencil batch
        assert_eq!(mesh.stencil_checkpoints, vec![12]);
        assert_eq!(mesh.stencil_triangle_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_global_even_odd_with_hidden_faces_and_near_planes() {
        let eps = MeshOptions::default().plane_epsilon;
        let (positions, mut hidden) = square(2.0, 0.0, 0);
        hidden.color_index = 1;
        let input = input_of(vec![
            (positions, hidden),
            square(0.4 * eps, 0.0, 4),
            square(0.6 * eps, 0.5, 8),
            square(1.0, 0.0, 12),
        ]);
        let mut options = MeshOptions {
            fill: FillMode::GlobalEvenOdd,
            ..Default::default()
        };
        options.hidden_colors.insert(1);
        let mesh = build_mesh(&input, &options);
        assert_eq!(mesh.stencil_checkpoints, vec![12]);
        assert_eq!(mesh.stencil_triangle_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_self_intersecting_face_goes_to_stencil() {
        let mut input = MeshInput::default();
        input.positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        input.vertex_components = vec![0; 4];
        input.faces.push(Face {
            vertexes: vec![0, 1, 2, 3],
            color_index: 0,
            connected_index: 0,
            spec: 0,
        });
        let options = MeshOptions {
            fill: FillMode::GlobalEvenOdd,
            ..Default::default()
        };
        let mesh = build_mesh(&input, &options);
        assert_eq!(mesh.stencil_checkpoints, vec![6]);
        assert_eq!(mesh.triangle_count(), 0);

        // Outside the stencil pass the bowtie splits through its crossing
        let mesh = build_mesh(&input, &MeshOptions::default());
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles[0], 0.5);
        assert_eq!(mesh.triangles[1], 0.5);
    }

    #[test]
    fn test_digest_is_stable() {
        let input = input_of(vec![square(0.0, 0.0, 0), square(2.0, 0.0, 4)]);
        let options = MeshOptions::default();
        let a = build_mesh(&input, &options);
        let b = build_mesh(&input, &options);
        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);

        let other = build_mesh(&input_of(vec![square(0.0, 0.0, 0)]), &options);
        assert_ne!(a.digest(), other.digest());
    }

    #[test]
    fn test_fill_mode_names() {
        assert_eq!("even-odd".parse::<FillMode>().unwrap(), FillMode::EvenOdd);
        assert_eq!("global_even_odd".parse::<FillMode>().unwrap(), FillMode::GlobalEvenOdd);
        assert_eq!("non-zero".parse::<FillMode>().unwrap(), FillMode::NonZero);
        assert!("winding".parse::<FillMode>().is_err());
        assert_eq!(
            serde_json::to_string(&FillMode::GlobalEvenOdd).unwrap(),
            "\"global_even_odd\""
        );
    }

    #[test]
    fn test_projection() {
        assert_eq!(project_perspective([0.0, 1.0, 2.0, 3.0], 2.0), [1.0, 2.0, 3.0]);
        let p = project_perspective([1.0, 1.0, 0.0, 0.0], 2.0);
        assert!((p[0] - 2.0).abs() < 1e-12);
        assert!(project_perspective([2.0, 1.0, 0.0, 0.0], 2.0)[0].is_finite());
    }
}
