//! Face and cell selectors.
//!
//! The same mirror system encodes many uniform polytopes; a selector picks
//! one by naming the step elements that generate its edges, faces and
//! cells. Selectors live in a fixed table keyed by string id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::coxeter::CoxeterGroup;
use crate::error::{KaleidoError, Result};

/// One face orbit: the cycle `v, v·s₀, v·s₀·s₁, ...` over `steps`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceSpec {
    pub steps: Vec<usize>,
    pub color_index: usize,
}

/// How the faces of one cell orbit are grouped into cells
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gluing {
    /// Faces joined through shared edges form one cell
    #[default]
    SharedEdges,
    /// Faces surrounding the same element form one cell. `hubs[k]` takes
    /// the first vertex of a face traced by `faces[k]` to that element.
    Around { hubs: Vec<usize> },
}

/// One cell orbit: faces of these face specs, grouped by `gluing`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSpec {
    /// Indices into [`Selection::faces`]
    pub faces: Vec<usize>,
    pub color_index: usize,
    #[serde(default)]
    pub gluing: Gluing,
}

/// Step words chosen by a selector
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Each entry is traced like a face and contributes its sides as edges
    pub edges: Vec<Vec<usize>>,
    pub faces: Vec<FaceSpec>,
    /// Empty below rank 4
    pub cells: Vec<CellSpec>,
}

/// Registered selectors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    /// Every mirror is an edge; every mirror pair bounds a face
    Omnitruncate,
    /// Rotation subgroup orbit: edges from mirror pairs, plus snub triangles
    Snub,
    /// Mirror edges only
    Wireframe,
}

impl SelectorKind {
    /// The registry, in display order
    pub const ALL: [SelectorKind; 3] = [
        SelectorKind::Omnitruncate,
        SelectorKind::Snub,
        SelectorKind::Wireframe,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            SelectorKind::Omnitruncate => "omnitruncate",
            SelectorKind::Snub => "snub",
            SelectorKind::Wireframe => "wireframe",
        }
    }

    /// Look up a selector by id
    pub fn from_id(id: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.id() == id)
            .ok_or_else(|| KaleidoError::UnknownSelector {
                id: id.to_string(),
                known: Self::ALL.map(|s| s.id()).join(", "),
            })
    }

    /// Build the step words for a generator tuple.
    ///
    /// `generators` are element indices, one per mirror of `group`.
    pub fn select(&self, group: &CoxeterGroup, generators: &[usize]) -> Result<Selection> {
        let rank = group.rank();
        if generators.len() != rank {
            return Err(KaleidoError::GeneratorCount {
                expected: rank,
                actual: generators.len(),
            });
        }
        if let Some(&bad) = generators.iter().find(|&&g| g >= group.order()) {
            return Err(KaleidoError::UnknownWord {
                word: format!("#{}", bad),
            });
        }

        let pairs = pairs(rank);
        let triples = triples(rank);
        let g = generators;

        let selection = match self {
            SelectorKind::Wireframe => Selection {
                edges: g.iter().map(|&s| vec![s]).collect(),
                ..Default::default()
            },
            SelectorKind::Omnitruncate => {
                let faces: Vec<FaceSpec> = pairs
                    .iter()
                    .enumerate()
                    .map(|(color_index, &(i, j))| FaceSpec {
                        steps: vec![g[i], g[j]],
                        color_index,
                    })
                    .collect();
                let cells = triples
                    .iter()
                    .enumerate()
                    .map(|(color_index, triple)| CellSpec {
                        faces: faces_within(&pairs, triple),
                        color_index,
                        gluing: Gluing::SharedEdges,
                    })
                    .collect();
                Selection {
                    edges: g.iter().map(|&s| vec![s]).collect(),
                    faces,
                    cells: if rank == 4 { cells } else { Vec::new() },
                }
            }
            SelectorKind::Snub => {
                let rotation = |i: usize, j: usize| -> Result<usize> {
                    group.mul(g[i], g[j]).ok_or_else(|| KaleidoError::UnknownWord {
                        word: format!("#{}#{}", g[i], g[j]),
                    })
                };
                let mut edges = Vec::with_capacity(pairs.len());
                let mut faces = Vec::new();
                for (color_index, &(i, j)) in pairs.iter().enumerate() {
                    let r = rotation(i, j)?;
                    edges.push(vec![r]);
                    faces.push(FaceSpec {
                        steps: vec![r],
                        color_index,
                    });
                }
                let mut cells = Vec::new();
                let mut snubs = Vec::with_capacity(triples.len());
                for (t, &[i, j, k]) in triples.iter().enumerate() {
                    let snub = faces.len();
                    faces.push(FaceSpec {
                        steps: vec![rotation(i, j)?, rotation(j, k)?, rotation(k, i)?],
                        color_index: pairs.len() + t,
                    });
                    snubs.push(snub);
                    let mut within = faces_within(&pairs, &[i, j, k]);
                    within.push(snub);
                    cells.push(CellSpec {
                        faces: within,
                        color_index: t,
                        gluing: Gluing::SharedEdges,
                    });
                }
                // The triangle traced from v by triple (i, j, k) is
                // {o·i, o·j, o·k} with o = v·i, an element of the other
                // half. In 4D the triangles around one o close a tetrahedron.
                cells.push(CellSpec {
                    faces: snubs,
                    color_index: triples.len(),
                    gluing: Gluing::Around {
                        hubs: triples.iter().map(|&[i, _, _]| g[i]).collect(),
                    },
                });
                Selection {
                    edges,
                    faces,
                    cells: if rank == 4 { cells } else { Vec::new() },
                }
            }
        };
        Ok(selection)
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SelectorKind {
    type Err = KaleidoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_id(s)
    }
}

fn pairs(rank: usize) -> Vec<(usize, usize)> {
    (0..rank)
        .flat_map(|i| (i + 1..rank).map(move |j| (i, j)))
        .collect()
}

fn triples(rank: usize) -> Vec<[usize; 3]> {
    let mut out = Vec::new();
    for i in 0..rank {
        for j in i + 1..rank {
            for k in j + 1..rank {
                out.push([i, j, k]);
            }
        }
    }
    out
}

/// Indices of the pairs whose mirrors both belong to `triple`
fn faces_within(pairs: &[(usize, usize)], triple: &[usize; 3]) -> Vec<usize> {
    pairs
        .iter()
        .enumerate()
        .filter(|(_, (i, j))| triple.contains(i) && triple.contains(j))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coxeter::CoxeterMatrix;

    fn group(labels: &[i64]) -> CoxeterGroup {
        CoxeterGroup::new(CoxeterMatrix::linear_int(labels).unwrap()).unwrap()
    }

    fn simple(group: &CoxeterGroup) -> Vec<usize> {
        (0..group.rank())
            .map(|g| group.neighbor(0, g).unwrap())
            .collect()
    }

    #[test]
    fn test_registry_lookup() {
        for kind in SelectorKind::ALL {
            assert_eq!(SelectorKind::from_id(kind.id()).unwrap(), kind);
            assert_eq!(kind.to_string().parse::<SelectorKind>().unwrap(), kind);
        }
        let err = SelectorKind::from_id("cantellate").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_SELECTOR");
        assert!(err.to_string().contains("omnitruncate, snub, wireframe"));
    }

    #[test]
    fn test_omnitruncate_rank3() {
        let g = group(&[3, 4]);
        let gens = simple(&g);
        let sel = SelectorKind::Omnitruncate.select(&g, &gens).unwrap();
        assert_eq!(sel.edges, vec![vec![gens[0]], vec![gens[1]], vec![gens[2]]]);
        assert_eq!(sel.faces.len(), 3);
        assert_eq!(sel.faces[1].steps, vec![gens[0], gens[2]]);
        assert!(sel.cells.is_empty());
    }

    #[test]
    fn test_snub_rank3() {
        let g = group(&[3, 5]);
        let gens = simple(&g);
        let sel = SelectorKind::Snub.select(&g, &gens).unwrap();
        assert_eq!(sel.edges.len(), 3);
        assert_eq!(sel.faces.len(), 4);
        assert_eq!(sel.faces[3].color_index, 3);
        assert_eq!(sel.faces[3].steps.len(), 3);
        // ab · bc · ca = 1
        let product = sel.faces[3]
            .steps
            .iter()
            .try_fold(g.identity(), |acc, &s| g.mul(acc, s))
            .unwrap();
        assert_eq!(product, g.identity());
    }

    #[test]
    fn test_rank4_cells() {
        let g = group(&[3, 3, 3]);
        let gens = simple(&g);
        let sel = SelectorKind::Omnitruncate.select(&g, &gens).unwrap();
        assert_eq!(sel.faces.len(), 6);
        assert_eq!(sel.cells.len(), 4);
        assert_eq!(sel.cells[0].faces, vec![0, 1, 3]);
        assert_eq!(sel.cells[0].gluing, Gluing::SharedEdges);
    }

    #[test]
    fn test_snub_rank4_fills_removed_vertexes() {
        let g = group(&[3, 3, 3]);
        let gens = simple(&g);
        let sel = SelectorKind::Snub.select(&g, &gens).unwrap();
        // 6 rotation faces, 4 snub triangles
        assert_eq!(sel.faces.len(), 10);
        assert_eq!(sel.cells.len(), 5);
        let around = &sel.cells[4];
        assert_eq!(around.faces, vec![6, 7, 8, 9]);
        assert_eq!(around.color_index, 4);
        assert_eq!(
            around.gluing,
            Gluing::Around {
                hubs: vec![gens[0], gens[0], gens[0], gens[1]]
            }
        );
    }

    #[test]
    fn test_generator_count_checked() {
        let g = group(&[3, 3]);
        let err = SelectorKind::Wireframe.select(&g, &[1, 2]).unwrap_err();
        assert_eq!(err.error_code(), "GENERATOR_COUNT");
    }
}
