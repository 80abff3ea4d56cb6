//! Gluing faces into cells.

use std::collections::HashMap;

use super::selector::{CellSpec, Gluing};
use super::topology::{Cell, Face};
use crate::coxeter::CoxeterGroup;

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Keep the earlier face as root so cell order follows face order
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Canonical sides of a face cycle
pub(crate) fn face_edges(vertexes: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let n = vertexes.len();
    (0..n).map(move |i| {
        let (a, b) = (vertexes[i], vertexes[(i + 1) % n]);
        (a.min(b), a.max(b))
    })
}

/// Group the faces of each cell spec into cells.
///
/// Each spec is merged on its own, so a face may belong to one cell per
/// spec it appears in.
pub(crate) fn merge_cells(group: &CoxeterGroup, faces: &[Face], specs: &[CellSpec]) -> Vec<Cell> {
    let mut cells = Vec::new();

    for spec in specs {
        let members: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| spec.faces.contains(&f.spec))
            .map(|(i, _)| i)
            .collect();

        let roots = match &spec.gluing {
            Gluing::SharedEdges => edge_roots(faces, &members),
            Gluing::Around { hubs } => hub_roots(group, faces, &members, &spec.faces, hubs),
        };

        let mut slot: HashMap<usize, usize> = HashMap::new();
        let first = cells.len();
        for (&face, root) in members.iter().zip(roots) {
            let Some(root) = root else { continue };
            let index = *slot.entry(root).or_insert_with(|| {
                cells.push(Cell {
                    faces: Vec::new(),
                    vertexes: Vec::new(),
                    color_index: spec.color_index,
                    connected_index: faces[face].connected_index,
                });
                cells.len() - 1
            });
            cells[index].faces.push(face);
            cells[index].vertexes.extend_from_slice(&faces[face].vertexes);
        }

        for cell in &mut cells[first..] {
            cell.vertexes.sort_unstable();
            cell.vertexes.dedup();
        }
    }

    cells
}

/// Union-find root of each member, joining members that share an edge
fn edge_roots(faces: &[Face], members: &[usize]) -> Vec<Option<usize>> {
    let mut sets = UnionFind::new(members.len());
    let mut owner: HashMap<(usize, usize), usize> = HashMap::new();
    for (local, &face) in members.iter().enumerate() {
        for edge in face_edges(&faces[face].vertexes) {
            match owner.get(&edge) {
                Some(&other) => sets.union(local, other),
                None => {
                    owner.insert(edge, local);
                }
            }
        }
    }
    (0..members.len()).map(|local| Some(sets.find(local))).collect()
}

/// The element each member surrounds; `None` when it leaves a truncated
/// group
fn hub_roots(
    group: &CoxeterGroup,
    faces: &[Face],
    members: &[usize],
    specs: &[usize],
    hubs: &[usize],
) -> Vec<Option<usize>> {
    members
        .iter()
        .map(|&face| {
            let face = &faces[face];
            let k = specs.iter().position(|&s| s == face.spec)?;
            group.mul(*face.vertexes.first()?, *hubs.get(k)?)
        })
        .collect()
}
