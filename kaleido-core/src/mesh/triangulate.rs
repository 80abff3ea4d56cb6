//! Polygon triangulation with self-intersection handling.
//!
//! Faces of star polytopes cross themselves. Quads are split through
//! their crossing, pentagrams are cut into their five tips, and larger
//! polygons fan around the centroid with crossings standing in for the
//! vertexes they hide.

use crate::config::tolerance::INTERSECTION_EPSILON;
use crate::vector::{add3, cross3, dot3, lerp3, norm3, normalize3, scale3, sub3};

pub(crate) type Triangle = [[f64; 3]; 3];

/// Unit normal of a planar polygon.
///
/// Newell's method first; a symmetric bowtie cancels that to zero, so fall
/// back to the largest cross product of two spokes from the first vertex.
pub(crate) fn plane_normal(points: &[[f64; 3]]) -> [f64; 3] {
    let n = points.len();
    let mut newell = [0.0; 3];
    for i in 0..n {
        let (p, q) = (points[i], points[(i + 1) % n]);
        newell[0] += (p[1] - q[1]) * (p[2] + q[2]);
        newell[1] += (p[2] - q[2]) * (p[0] + q[0]);
        newell[2] += (p[0] - q[0]) * (p[1] + q[1]);
    }
    let scale = points
        .iter()
        .map(|p| norm3(sub3(*p, points[0])))
        .fold(0.0, f64::max);
    if norm3(newell) > INTERSECTION_EPSILON * scale * scale.max(1.0) {
        return normalize3(newell);
    }

    let mut best = [0.0; 3];
    for i in 1..n {
        for j in i + 1..n {
            let c = cross3(sub3(points[i], points[0]), sub3(points[j], points[0]));
            if norm3(c) > norm3(best) {
                best = c;
            }
        }
    }
    normalize3(best)
}

pub(crate) fn centroid(points: &[[f64; 3]]) -> [f64; 3] {
    let sum = points.iter().fold([0.0; 3], |acc, p| add3(acc, *p));
    scale3(sum, 1.0 / points.len().max(1) as f64)
}

/// Unit normal of a triangle, zero when degenerate
pub(crate) fn triangle_normal(t: &Triangle) -> [f64; 3] {
    normalize3(cross3(sub3(t[1], t[0]), sub3(t[2], t[0])))
}

/// Coordinates to keep when flattening onto the plane with this normal
fn projection_axes(normal: [f64; 3]) -> (usize, usize) {
    let a = normal.map(f64::abs);
    if a[0] >= a[1] && a[0] >= a[2] {
        (1, 2)
    } else if a[1] >= a[2] {
        (2, 0)
    } else {
        (0, 1)
    }
}

/// Proper crossing of segments `p0 p1` and `q0 q1`: the parameter along
/// `p` and the point. Touching at an endpoint is not a crossing.
fn crossing(
    p0: [f64; 3],
    p1: [f64; 3],
    q0: [f64; 3],
    q1: [f64; 3],
    axes: (usize, usize),
) -> Option<(f64, [f64; 3])> {
    let (u, v) = axes;
    let d1 = [p1[u] - p0[u], p1[v] - p0[v]];
    let d2 = [q1[u] - q0[u], q1[v] - q0[v]];
    let w = [q0[u] - p0[u], q0[v] - p0[v]];
    let denom = d1[0] * d2[1] - d1[1] * d2[0];
    if denom.abs() < INTERSECTION_EPSILON {
        return None;
    }
    let t = (w[0] * d2[1] - w[1] * d2[0]) / denom;
    let s = (w[0] * d1[1] - w[1] * d1[0]) / denom;
    let inside = |x: f64| x > INTERSECTION_EPSILON && x < 1.0 - INTERSECTION_EPSILON;
    (inside(t) && inside(s)).then(|| (t, lerp3(p0, p1, t)))
}

/// Crossings along every edge `i → i+1`, sorted by distance from `i`
pub(crate) fn edge_crossings(points: &[[f64; 3]], normal: [f64; 3]) -> Vec<Vec<[f64; 3]>> {
    let n = points.len();
    let axes = projection_axes(normal);
    (0..n)
        .map(|i| {
            let (p0, p1) = (points[i], points[(i + 1) % n]);
            let mut hits: Vec<(f64, [f64; 3])> = (0..n)
                .filter(|&j| j != i && (j + 1) % n != i && (i + 1) % n != j)
                .filter_map(|j| crossing(p0, p1, points[j], points[(j + 1) % n], axes))
                .collect();
            hits.sort_by(|a, b| a.0.total_cmp(&b.0));
            hits.into_iter().map(|(_, x)| x).collect()
        })
        .collect()
}

/// True when any two non-adjacent sides cross
pub(crate) fn is_self_intersecting(points: &[[f64; 3]]) -> bool {
    if points.len() < 4 {
        return false;
    }
    let normal = plane_normal(points);
    edge_crossings(points, normal).iter().any(|c| !c.is_empty())
}

/// Plain fan from the first vertex
pub(crate) fn fan(points: &[[f64; 3]]) -> Vec<Triangle> {
    (1..points.len().saturating_sub(1))
        .map(|i| [points[0], points[i], points[i + 1]])
        .collect()
}

/// Triangulate one face.
///
/// `even_odd` enables crossing-aware splitting of pentagons; quads and
/// larger polygons are always crossing-aware.
pub(crate) fn triangulate(points: &[[f64; 3]], even_odd: bool) -> Vec<Triangle> {
    match points.len() {
        0..=2 => Vec::new(),
        3 => vec![[points[0], points[1], points[2]]],
        4 => quad(points),
        5 if !even_odd => fan(points),
        5 => pentagon(points),
        _ => centroid_fan(points),
    }
}

fn quad(p: &[[f64; 3]]) -> Vec<Triangle> {
    let axes = projection_axes(plane_normal(p));
    if let Some((_, x)) = crossing(p[0], p[1], p[2], p[3], axes) {
        return vec![[x, p[1], p[2]], [x, p[3], p[0]]];
    }
    if let Some((_, x)) = crossing(p[1], p[2], p[3], p[0], axes) {
        return vec![[x, p[2], p[3]], [x, p[0], p[1]]];
    }

    // A concave quad folds over its outside diagonal
    let a = [p[0], p[1], p[2]];
    let b = [p[0], p[2], p[3]];
    if dot3(triangle_normal(&a), triangle_normal(&b)) >= 0.0 {
        vec![a, b]
    } else {
        vec![[p[1], p[2], p[3]], [p[1], p[3], p[0]]]
    }
}

fn pentagon(p: &[[f64; 3]]) -> Vec<Triangle> {
    let crossings = edge_crossings(p, plane_normal(p));
    if crossings.iter().all(Vec::is_empty) {
        return fan(p);
    }
    if crossings.iter().all(|c| c.len() == 2) {
        // Pentagram: the inner pentagon has even winding and stays empty
        return (0..5)
            .map(|i| {
                let prev = (i + 4) % 5;
                [p[i], crossings[i][0], crossings[prev][1]]
            })
            .collect();
    }
    centroid_fan(p)
}

fn centroid_fan(p: &[[f64; 3]]) -> Vec<Triangle> {
    let n = p.len();
    let c = centroid(p);
    let crossings = edge_crossings(p, plane_normal(p));
    let dist = |x: [f64; 3]| norm3(sub3(x, c));

    let mut out = Vec::with_capacity(2 * n);
    for i in 0..n {
        let (a, b) = (p[i], p[(i + 1) % n]);
        match (crossings[i].first(), crossings[i].last()) {
            (Some(&first), Some(&last)) if dist(first) < dist(a) && dist(last) < dist(b) => {
                out.push([c, a, first]);
                out.push([c, last, b]);
            }
            _ => out.push([c, a, b]),
        }
    }
    out
}
