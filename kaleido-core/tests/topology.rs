//! Polytope topology traced over the classical groups.

use kaleido_core::{
    build_mesh, config::ClosureLimits, CoxeterMatrix, KaleidoError, MeshOptions, Polychoron,
    Polyhedron, Quaternion, SelectorKind, SymmetryGroup3, Topology,
};
use std::collections::HashSet;

fn polyhedron(text: &str, selector: SelectorKind) -> Polyhedron {
    let matrix: CoxeterMatrix = text.parse().unwrap();
    Polyhedron::from_matrix(matrix, ClosureLimits::for_rank(3), selector).unwrap()
}

fn polychoron(text: &str, selector: SelectorKind) -> Polychoron {
    let matrix: CoxeterMatrix = text.parse().unwrap();
    Polychoron::from_matrix(matrix, ClosureLimits::for_rank(4), selector).unwrap()
}

fn euler(t: &Topology) -> i64 {
    t.vertex_count() as i64 - t.edges().len() as i64 + t.faces().len() as i64
}

fn assert_canonical_edges(t: &Topology) {
    let mut seen = HashSet::new();
    for e in t.edges() {
        assert!(e.a < e.b, "edge {:?} not canonical", e);
        assert!(seen.insert((e.a, e.b)), "duplicate edge {:?}", e);
    }
}

#[test]
fn test_omnitruncated_polyhedra() {
    // (vertexes, edges, faces)
    let cases = [
        ("3,3", 24, 36, 14),
        ("3,4", 48, 72, 26),
        ("3,5", 120, 180, 62),
    ];
    for (text, v, e, f) in cases {
        let p = polyhedron(text, SelectorKind::Omnitruncate);
        let t = p.topology();
        assert_eq!(t.vertex_count(), v, "[{}]", text);
        assert_eq!(t.edges().len(), e, "[{}]", text);
        assert_eq!(t.faces().len(), f, "[{}]", text);
        assert_eq!(euler(t), 2);
        assert_eq!(t.component_count(), 1);
        assert!(t.cells().is_empty());
        assert_canonical_edges(t);
        p.verify().unwrap();
    }
}

#[test]
fn test_face_colors_follow_mirror_pairs() {
    let p = polyhedron("3,4", SelectorKind::Omnitruncate);
    let mut sizes = [0usize; 3];
    for face in p.faces() {
        sizes[face.color_index] += 1;
        // Pair (a, b) has m = 3, (a, c) has 2, (b, c) has 4
        let expected = [6, 4, 8][face.color_index];
        assert_eq!(face.vertexes.len(), expected);
    }
    assert_eq!(sizes, [8, 12, 6]);
}

#[test]
fn test_snub_polyhedra() {
    // Per chiral half: (vertexes, edges, faces)
    let cases = [("3,3", 12, 30, 20), ("3,4", 24, 60, 38), ("3,5", 60, 150, 92)];
    for (text, v, e, f) in cases {
        let p = polyhedron(text, SelectorKind::Snub);
        let t = p.topology();
        assert_eq!(t.component_count(), 2, "[{}]", text);
        assert_eq!(t.vertex_count(), 2 * v);
        assert_eq!(t.edges().len(), 2 * e);
        assert_eq!(t.faces().len(), 2 * f);
        assert_canonical_edges(t);
        p.verify().unwrap();

        for c in 0..2 {
            let count = t.vertex_components().iter().filter(|&&k| k == c).count();
            assert_eq!(count, v, "[{}] component {}", text, c);
        }
        // Edges and faces never straddle the two halves
        for edge in t.edges() {
            assert_eq!(t.vertex_components()[edge.a], edge.connected_index);
            assert_eq!(t.vertex_components()[edge.b], edge.connected_index);
        }
        for face in t.faces() {
            for &v in &face.vertexes {
                assert_eq!(t.vertex_components()[v], face.connected_index);
            }
        }
    }
}

#[test]
fn test_wireframe() {
    let p = polyhedron("3,5", SelectorKind::Wireframe);
    assert_eq!(p.edges().len(), 180);
    assert!(p.faces().is_empty());
    p.verify().unwrap();
}

#[test]
fn test_custom_generators() {
    let matrix: CoxeterMatrix = "3,4".parse().unwrap();
    let symmetry = SymmetryGroup3::new(
        kaleido_core::CoxeterGroup::with_limits(matrix, ClosureLimits::for_rank(3)).unwrap(),
    )
    .unwrap();
    let generators = symmetry.generators_from_words(&["a", "b", "c"]).unwrap();
    assert_eq!(generators, symmetry.default_generators());

    let err = symmetry.generators_from_words(&["a", "b"]).unwrap_err();
    assert!(matches!(err, KaleidoError::GeneratorCount { expected: 3, actual: 2 }));

    let p = Polyhedron::with_generators(symmetry, SelectorKind::Omnitruncate, generators).unwrap();
    assert_eq!(p.faces().len(), 26);
}

#[test]
fn test_compound_of_two_copies() {
    let mut p = polyhedron("3,3", SelectorKind::Omnitruncate);
    let quarter = Quaternion::rotation([0.0, 0.0, 1.0], std::f64::consts::FRAC_PI_2);
    p.set_compounds(vec![quarter]);

    let t = p.topology();
    assert_eq!(t.copies(), 2);
    assert_eq!(p.vertexes().len(), 48);
    assert_eq!(t.edges().len(), 72);
    assert_eq!(t.faces().len(), 28);
    assert_eq!(t.component_count(), 2);
    assert_canonical_edges(t);

    // Copy 1 is copy 0 turned by the compound transform
    for i in 0..24 {
        let a = quarter.transform(p.vertexes()[i]);
        let b = p.vertexes()[24 + i];
        for k in 0..3 {
            assert!((a[k] - b[k]).abs() < 1e-12);
        }
    }
}

#[test]
fn test_omnitruncated_polychora() {
    // (vertexes, edges, faces, cells)
    let cases = [
        ("3,3,3", 120, 240, 150, 30),
        ("4,3,3", 384, 768, 464, 80),
        ("3,4,3", 1152, 2304, 1392, 240),
    ];
    for (text, v, e, f, c) in cases {
        let p = polychoron(text, SelectorKind::Omnitruncate);
        let t = p.topology();
        assert_eq!(t.vertex_count(), v, "[{}]", text);
        assert_eq!(t.edges().len(), e, "[{}]", text);
        assert_eq!(t.faces().len(), f, "[{}]", text);
        assert_eq!(t.cells().len(), c, "[{}]", text);
        // Euler characteristic of the 3-sphere
        assert_eq!(v as i64 - e as i64 + f as i64 - c as i64, 0);
        p.verify().unwrap();
    }
}

#[test]
fn test_snub_polychora_are_closed() {
    // Per chiral half: (vertexes, edges, faces, cells)
    let cases = [("3,3,3", 60, 270, 300, 90), ("4,3,3", 192, 864, 944, 272)];
    for (text, v, e, f, c) in cases {
        let p = polychoron(text, SelectorKind::Snub);
        let t = p.topology();
        assert_eq!(t.component_count(), 2, "[{}]", text);
        assert_eq!(t.vertex_count(), 2 * v, "[{}]", text);
        assert_eq!(t.edges().len(), 2 * e, "[{}]", text);
        assert_eq!(t.faces().len(), 2 * f, "[{}]", text);
        assert_eq!(t.cells().len(), 2 * c, "[{}]", text);
        assert_eq!(t.euler_by_component(), vec![0, 0], "[{}]", text);
        assert_canonical_edges(t);
        p.verify().unwrap();
    }
}

#[test]
fn test_truncated_group_still_traces_and_meshes() {
    let matrix: CoxeterMatrix = "3,5".parse().unwrap();
    let limits = ClosureLimits {
        max_order: 50,
        ..ClosureLimits::for_rank(3)
    };
    let p = Polyhedron::from_matrix(matrix, limits, SelectorKind::Omnitruncate).unwrap();
    assert!(p.symmetry().group().is_limit_over());

    let t = p.topology();
    assert_eq!(t.vertex_count(), 50);
    assert_eq!(t.edges().len(), 66);
    assert_eq!(t.faces().len(), 17);
    assert_canonical_edges(t);
    // Faces that would leave the enumerated elements are dropped
    for face in t.faces() {
        assert!(face.vertexes.iter().all(|&v| v < 50));
    }
    p.verify().unwrap();

    let mesh = build_mesh(&p.mesh_input(), &MeshOptions::default());
    assert!(mesh.triangle_count() > 0);
    assert_eq!(mesh.line_count(), 66);
}

#[test]
fn test_cells_are_closed_surfaces() {
    let p = polychoron("3,3,3", SelectorKind::Omnitruncate);
    for cell in p.cells() {
        let mut sides = std::collections::HashMap::new();
        for &f in &cell.faces {
            let vs = &p.faces()[f].vertexes;
            for k in 0..vs.len() {
                let (a, b) = (vs[k], vs[(k + 1) % vs.len()]);
                *sides.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        assert!(sides.values().all(|&n| n == 2));
    }
}

#[test]
fn test_unknown_selector() {
    let err = "bitruncate".parse::<SelectorKind>().unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_SELECTOR");
    assert!(err.to_string().contains("omnitruncate"));
}
