//! Orbit tracing: edges, faces, cells and their components.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cells::{face_edges, merge_cells};
use super::components::label_components;
use super::selector::Selection;
use crate::coxeter::CoxeterGroup;
use crate::error::{KaleidoError, Result};

/// An edge between two vertexes, `a < b`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub connected_index: usize,
}

/// A face cycle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub vertexes: Vec<usize>,
    pub color_index: usize,
    pub connected_index: usize,
    /// Index of the face spec that traced it
    pub spec: usize,
}

/// A cell of a polychoron
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Indices into the face list
    pub faces: Vec<usize>,
    /// Sorted, deduplicated
    pub vertexes: Vec<usize>,
    pub color_index: usize,
    pub connected_index: usize,
}

/// Combinatorial structure of a polytope, compound copies included.
///
/// Vertex `order * copy + e` is element `e` moved by compound copy `copy`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    order: usize,
    copies: usize,
    components: usize,
    vertex_components: Vec<usize>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    cells: Vec<Cell>,
}

/// Walk `start, start·s₀, start·s₀·s₁, ...` until it returns to `start`.
///
/// `None` when a step leaves a truncated group or the walk never closes.
pub(crate) fn trace_cycle(group: &CoxeterGroup, start: usize, steps: &[usize]) -> Option<Vec<usize>> {
    if steps.is_empty() {
        return None;
    }
    let limit = group.order() * steps.len();
    let mut cycle = vec![start];
    let mut cur = start;
    for k in 0..limit {
        cur = group.mul(cur, steps[k % steps.len()])?;
        if cur == start {
            return Some(cycle);
        }
        cycle.push(cur);
    }
    None
}

impl Topology {
    /// Trace one copy of the selection over the whole group.
    ///
    /// `reflector`, when given, is the element mapping one chiral half onto
    /// the other; it pairs the component ids of mirror-image halves.
    pub fn trace(group: &CoxeterGroup, selection: &Selection, reflector: Option<usize>) -> Self {
        let order = group.order();

        let mut edges = Vec::new();
        let mut seen = HashSet::new();
        for word in &selection.edges {
            let mut visited = vec![false; order];
            for v in 0..order {
                if visited[v] {
                    continue;
                }
                let Some(cycle) = trace_cycle(group, v, word) else {
                    continue;
                };
                for (k, &u) in cycle.iter().enumerate() {
                    if k % word.len() == 0 {
                        visited[u] = true;
                    }
                }
                if cycle.len() < 2 {
                    continue;
                }
                for edge in face_edges(&cycle) {
                    if seen.insert(edge) {
                        edges.push(edge);
                    }
                }
            }
        }

        let mut faces = Vec::new();
        let mut skipped = 0usize;
        for (spec, face_spec) in selection.faces.iter().enumerate() {
            let steps = &face_spec.steps;
            let mut visited = vec![false; order];
            let mut traced: HashSet<Vec<usize>> = HashSet::new();
            for v in 0..order {
                if visited[v] {
                    continue;
                }
                let Some(cycle) = trace_cycle(group, v, steps) else {
                    skipped += 1;
                    continue;
                };
                for (k, &u) in cycle.iter().enumerate() {
                    if k % steps.len() == 0 {
                        visited[u] = true;
                    }
                }
                if cycle.len() < 3 {
                    continue;
                }
                let mut key = cycle.clone();
                key.sort_unstable();
                if !traced.insert(key) {
                    continue;
                }
                faces.push(Face {
                    vertexes: cycle,
                    color_index: face_spec.color_index,
                    connected_index: 0,
                    spec,
                });
            }
        }
        if skipped > 0 {
            debug!(skipped, "face walks left the enumerated group");
        }

        let reflected = reflector.map(|r| {
            (0..order)
                .map(|v| group.mul(r, v))
                .collect::<Vec<_>>()
        });
        let (vertex_components, components) =
            label_components(order, &edges, reflected.as_deref());

        let edges: Vec<Edge> = edges
            .into_iter()
            .map(|(a, b)| Edge {
                a,
                b,
                connected_index: vertex_components[a],
            })
            .collect();
        for face in &mut faces {
            face.connected_index = vertex_components[face.vertexes[0]];
        }
        let cells = merge_cells(group, &faces, &selection.cells);

        debug!(
            vertexes = order,
            edges = edges.len(),
            faces = faces.len(),
            cells = cells.len(),
            components,
            "traced topology"
        );

        Self {
            order,
            copies: 1,
            components,
            vertex_components,
            edges,
            faces,
            cells,
        }
    }

    /// Replicate a single-copy topology into `copies` compound copies
    pub fn replicate(&self, copies: usize) -> Self {
        let copies = copies.max(1);
        let base = self.single();
        let mut out = Self {
            order: base.order,
            copies,
            components: base.components,
            ..Default::default()
        };

        for c in 0..copies {
            let dv = base.order * c;
            let dc = base.components * c;
            let df = base.faces.len() * c;
            out.vertex_components
                .extend(base.vertex_components.iter().map(|&k| k + dc));
            out.edges.extend(base.edges.iter().map(|e| Edge {
                a: e.a + dv,
                b: e.b + dv,
                connected_index: e.connected_index + dc,
            }));
            out.faces.extend(base.faces.iter().map(|f| Face {
                vertexes: f.vertexes.iter().map(|v| v + dv).collect(),
                connected_index: f.connected_index + dc,
                ..f.clone()
            }));
            out.cells.extend(base.cells.iter().map(|cell| Cell {
                faces: cell.faces.iter().map(|f| f + df).collect(),
                vertexes: cell.vertexes.iter().map(|v| v + dv).collect(),
                color_index: cell.color_index,
                connected_index: cell.connected_index + dc,
            }));
        }
        out
    }

    /// The first compound copy on its own
    fn single(&self) -> Self {
        if self.copies <= 1 {
            return self.clone();
        }
        let faces_per_copy = self.faces.len() / self.copies;
        let edges_per_copy = self.edges.len() / self.copies;
        let cells_per_copy = self.cells.len() / self.copies;
        Self {
            order: self.order,
            copies: 1,
            components: self.components,
            vertex_components: self.vertex_components[..self.order].to_vec(),
            edges: self.edges[..edges_per_copy].to_vec(),
            faces: self.faces[..faces_per_copy].to_vec(),
            cells: self.cells[..cells_per_copy].to_vec(),
        }
    }

    /// Vertexes per copy (the group order)
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn copies(&self) -> usize {
        self.copies
    }

    pub fn vertex_count(&self) -> usize {
        self.order * self.copies
    }

    /// Components per copy
    pub fn components_per_copy(&self) -> usize {
        self.components
    }

    /// Components over all copies
    pub fn component_count(&self) -> usize {
        self.components * self.copies
    }

    pub fn vertex_components(&self) -> &[usize] {
        &self.vertex_components
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Re-walk every face of the first copy and check every structural
    /// invariant.
    pub fn verify(&self, group: &CoxeterGroup, selection: &Selection) -> Result<()> {
        let fail = |reason: String| Err(KaleidoError::TopologyInvariant { reason });
        let count = self.vertex_count();

        if self.vertex_components.len() != count {
            return fail(format!(
                "{} component labels for {} vertexes",
                self.vertex_components.len(),
                count
            ));
        }

        let mut seen = HashSet::new();
        for e in &self.edges {
            if e.a >= e.b || e.b >= count {
                return fail(format!("edge ({}, {}) is not canonical", e.a, e.b));
            }
            if !seen.insert((e.a, e.b)) {
                return fail(format!("edge ({}, {}) appears twice", e.a, e.b));
            }
        }

        let per_copy = self.faces.len() / self.copies.max(1);
        for face in &self.faces[..per_copy] {
            if face.vertexes.len() < 3 {
                return fail(format!("face with {} vertexes", face.vertexes.len()));
            }
            let Some(spec) = selection.faces.get(face.spec) else {
                return fail(format!("face refers to missing spec {}", face.spec));
            };
            let start = face.vertexes[0];
            match trace_cycle(group, start, &spec.steps) {
                Some(cycle) if cycle == face.vertexes => {}
                _ => return fail(format!("face at vertex {} does not close", start)),
            }
        }

        for (i, face) in self.faces.iter().enumerate() {
            if face.vertexes.iter().any(|&v| v >= count) {
                return fail(format!("face {} has an out-of-range vertex", i));
            }
        }

        if !group.is_limit_over() {
            for (i, cell) in self.cells.iter().enumerate() {
                let mut uses: HashMap<(usize, usize), usize> = HashMap::new();
                for &f in &cell.faces {
                    let Some(face) = self.faces.get(f) else {
                        return fail(format!("cell {} refers to missing face {}", i, f));
                    };
                    for edge in face_edges(&face.vertexes) {
                        *uses.entry(edge).or_default() += 1;
                    }
                }
                if let Some((edge, n)) = uses.iter().find(|(_, n)| **n != 2) {
                    return fail(format!(
                        "cell {} is not closed: edge {:?} bounds {} faces",
                        i, edge, n
                    ));
                }
            }

            if let Some(expected) = self.closed_euler(group.rank()) {
                for (component, chi) in self.euler_by_component().into_iter().enumerate() {
                    if chi != expected {
                        return fail(format!(
                            "component {} has Euler characteristic {}, expected {}",
                            component, chi, expected
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Euler characteristic of a closed boundary of this rank: 2 for a
    /// polyhedral surface, 0 for the boundary of a polychoron. `None` when
    /// the traced elements do not form a closed boundary.
    fn closed_euler(&self, rank: usize) -> Option<i64> {
        match rank {
            3 if !self.faces.is_empty() => Some(2),
            4 if !self.cells.is_empty() => Some(0),
            _ => None,
        }
    }

    /// `V - E + F - C` of each component
    pub fn euler_by_component(&self) -> Vec<i64> {
        let mut chi = vec![0i64; self.component_count()];
        let mut add = |component: usize, delta: i64| {
            if let Some(x) = chi.get_mut(component) {
                *x += delta;
            }
        };
        for &c in &self.vertex_components {
            add(c, 1);
        }
        for e in &self.edges {
            add(e.connected_index, -1);
        }
        for f in &self.faces {
            add(f.connected_index, 1);
        }
        for cell in &self.cells {
            add(cell.connected_index, -1);
        }
        chi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coxeter::CoxeterMatrix;
    use crate::polytope::SelectorKind;

    fn traced(labels: &[i64], kind: SelectorKind) -> (CoxeterGroup, Selection, Topology) {
        let group = CoxeterGroup::new(CoxeterMatrix::linear_int(labels).unwrap()).unwrap();
        let gens: Vec<usize> = (0..group.rank())
            .map(|g| group.neighbor(0, g).unwrap())
            .collect();
        let selection = kind.select(&group, &gens).unwrap();
        let topology = Topology::trace(&group, &selection, None);
        (group, selection, topology)
    }

    #[test]
    fn test_truncated_octahedron_counts() {
        // Omnitruncated [3,3]: 24 vertexes, 36 edges, 14 faces
        let (group, selection, t) = traced(&[3, 3], SelectorKind::Omnitruncate);
        assert_eq!(t.vertex_count(), 24);
        assert_eq!(t.edges().len(), 36);
        assert_eq!(t.faces().len(), 14);
        assert_eq!(t.component_count(), 1);
        t.verify(&group, &selection).unwrap();
    }

    #[test]
    fn test_great_rhombicosidodecahedron_counts() {
        let (group, selection, t) = traced(&[3, 5], SelectorKind::Omnitruncate);
        assert_eq!(t.vertex_count(), 120);
        assert_eq!(t.edges().len(), 180);
        assert_eq!(t.faces().len(), 62);
        t.verify(&group, &selection).unwrap();
    }

    #[test]
    fn test_snub_splits_into_mirror_images() {
        let (group, selection, t) = traced(&[3, 4], SelectorKind::Snub);
        assert_eq!(t.component_count(), 2);
        // Each snub cube: 60 edges, 38 faces
        assert_eq!(t.edges().len(), 120);
        assert_eq!(t.faces().len(), 76);
        t.verify(&group, &selection).unwrap();

        let a = group.neighbor(0, 0).unwrap();
        let paired = Topology::trace(&group, &selection, Some(a));
        assert_eq!(paired.component_count(), 2);
        for v in 0..group.order() {
            let mirrored = group.mul(a, v).unwrap();
            assert_ne!(
                paired.vertex_components()[v],
                paired.vertex_components()[mirrored]
            );
        }
    }

    #[test]
    fn test_wireframe_has_no_faces() {
        let (_, _, t) = traced(&[3, 3], SelectorKind::Wireframe);
        assert!(t.faces().is_empty());
        assert_eq!(t.edges().len(), 36);
    }

    #[test]
    fn test_replicate_offsets() {
        let (group, selection, t) = traced(&[3, 3], SelectorKind::Omnitruncate);
        let compound = t.replicate(3);
        assert_eq!(compound.vertex_count(), 72);
        assert_eq!(compound.edges().len(), 108);
        assert_eq!(compound.component_count(), 3);
        let last = &compound.faces()[compound.faces().len() - 1];
        assert!(last.vertexes.iter().all(|&v| v >= 48));
        assert_eq!(last.connected_index, 2);
        compound.verify(&group, &selection).unwrap();
        assert_eq!(compound.replicate(1), t);
    }

    #[test]
    fn test_omnitruncated_pentachoron_cells() {
        // 120 vertexes, 240 edges, 150 faces, 30 cells
        let (group, selection, t) = traced(&[3, 3, 3], SelectorKind::Omnitruncate);
        assert_eq!(t.vertex_count(), 120);
        assert_eq!(t.edges().len(), 240);
        assert_eq!(t.faces().len(), 150);
        assert_eq!(t.cells().len(), 30);
        t.verify(&group, &selection).unwrap();
    }

    #[test]
    fn test_snub_pentachoron_is_closed() {
        // Per half: 60 vertexes, 270 edges, 300 faces; 30 snub cells plus
        // one tetrahedron around each of the 60 removed vertexes
        let (group, selection, t) = traced(&[3, 3, 3], SelectorKind::Snub);
        assert_eq!(t.component_count(), 2);
        assert_eq!(t.vertex_count(), 120);
        assert_eq!(t.edges().len(), 540);
        assert_eq!(t.faces().len(), 600);
        assert_eq!(t.cells().len(), 180);
        assert_eq!(t.euler_by_component(), vec![0, 0]);
        t.verify(&group, &selection).unwrap();

        let tetrahedra: Vec<&Cell> = t.cells().iter().filter(|c| c.color_index == 4).collect();
        assert_eq!(tetrahedra.len(), 120);
        for cell in tetrahedra {
            assert_eq!(cell.faces.len(), 4);
            assert_eq!(cell.vertexes.len(), 4);
        }
    }

    #[test]
    fn test_verify_rejects_open_boundary() {
        let (group, selection, mut t) = traced(&[3, 3, 3], SelectorKind::Snub);
        let tetrahedra = t.cells.iter().filter(|c| c.color_index == 4).count();
        t.cells.retain(|c| c.color_index != 4);
        assert_eq!(t.euler_by_component(), vec![tetrahedra as i64 / 2; 2]);
        let err = t.verify(&group, &selection).unwrap_err();
        assert!(err.to_string().contains("Euler characteristic"));
    }

    #[test]
    fn test_trace_cycle_closes() {
        let group = CoxeterGroup::new(CoxeterMatrix::linear_int(&[5]).unwrap()).unwrap();
        let a = group.neighbor(0, 0).unwrap();
        let b = group.neighbor(0, 1).unwrap();
        let cycle = trace_cycle(&group, 0, &[a, b]).unwrap();
        assert_eq!(cycle.len(), 10);
        assert_eq!(trace_cycle(&group, 0, &[a]).unwrap().len(), 2);
    }
}
