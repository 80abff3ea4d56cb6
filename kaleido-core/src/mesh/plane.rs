//! Grouping faces by the plane they lie in.

use std::collections::HashMap;

use super::triangulate::{centroid, plane_normal};
use crate::vector::{dot3, norm3};

/// `(normal, offset)` with the sign fixed so that a plane and its flipped
/// twin usually read the same
pub(crate) type Plane = [f64; 4];

/// Plane through `points`, `None` for degenerate polygons
pub(crate) fn face_plane(points: &[[f64; 3]], epsilon: f64) -> Option<Plane> {
    if points.len() < 3 {
        return None;
    }
    let mut n = plane_normal(points);
    if norm3(n) < 0.5 {
        return None;
    }
    let mut d = dot3(n, centroid(points));

    // The first clearly non-zero component is made positive
    let lead = n.iter().copied().find(|c| c.abs() > epsilon).unwrap_or(0.0);
    if lead < 0.0 {
        n = n.map(|c| -c);
        d = -d;
    }
    Some([n[0], n[1], n[2], d])
}

/// True when `a` and `b`, or `a` and the flipped `b`, agree within
/// `epsilon` in every component
fn same_plane(a: &Plane, b: &Plane, epsilon: f64) -> bool {
    let close = |sign: f64| a.iter().zip(b).all(|(x, y)| (x - sign * y).abs() <= epsilon);
    close(1.0) || close(-1.0)
}

fn bucket(plane: &Plane, epsilon: f64) -> [i64; 4] {
    plane.map(|x| (x / epsilon).floor() as i64)
}

/// The 3^4 buckets touching `key`, itself included
fn adjacent(key: [i64; 4]) -> impl Iterator<Item = [i64; 4]> {
    (0..81i64).map(move |mut k| {
        let mut out = key;
        for c in &mut out {
            *c += k % 3 - 1;
            k /= 3;
        }
        out
    })
}

/// Face indices per plane, in order of each plane's first face.
///
/// Planes within `epsilon` of an earlier plane join its group, so the
/// grouping does not depend on where rounding boundaries fall. Faces whose
/// plane is undefined are returned separately.
pub(crate) fn group_by_plane<'a>(
    faces: impl IntoIterator<Item = (usize, &'a [[f64; 3]])>,
    epsilon: f64,
) -> (Vec<Vec<usize>>, Vec<usize>) {
    let mut planes: Vec<(Plane, Vec<usize>)> = Vec::new();
    let mut buckets: HashMap<[i64; 4], Vec<usize>> = HashMap::new();
    let mut degenerate = Vec::new();

    for (index, points) in faces {
        let Some(plane) = face_plane(points, epsilon) else {
            degenerate.push(index);
            continue;
        };
        let flipped = plane.map(|x| -x);
        let found = [plane, flipped]
            .iter()
            .flat_map(|p| adjacent(bucket(p, epsilon)))
            .filter_map(|key| buckets.get(&key))
            .flatten()
            .copied()
            .find(|&g| same_plane(&planes[g].0, &plane, epsilon));
        match found {
            Some(g) => planes[g].1.push(index),
            None => {
                buckets.entry(bucket(&plane, epsilon)).or_default().push(planes.len());
                planes.push((plane, vec![index]));
            }
        }
    }
    (planes.into_iter().map(|(_, members)| members).collect(), degenerate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn at_height(z: f64) -> [[f64; 3]; 3] {
        [[0.0, 0.0, z], [1.0, 0.0, z], [0.0, 1.0, z]]
    }

    #[test]
    fn test_flipped_faces_share_a_plane() {
        let up = [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]];
        let down = [[0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [1.0, 0.0, 1.0]];
        let (groups, _) = group_by_plane([(0, &up[..]), (1, &down[..])], EPS);
        assert_eq!(groups, vec![vec![0, 1]]);

        // Opposite normals through the origin
        let a = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let b = [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]];
        let (groups, _) = group_by_plane([(0, &a[..]), (1, &b[..])], EPS);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_parallel_planes_differ() {
        let low = at_height(0.0);
        let high = at_height(0.5);
        let (groups, _) = group_by_plane([(0, &low[..]), (1, &high[..])], EPS);
        assert_eq!(groups, vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_planes_across_a_rounding_edge_merge() {
        // 0.4ε and 0.6ε round to different multiples of ε; -0.1ε floors
        // into another bucket
        let a = at_height(1.0 + 0.4 * EPS);
        let b = at_height(1.0 + 0.6 * EPS);
        let c = at_height(1.0 - 0.1 * EPS);
        let far = at_height(1.0 + 3.0 * EPS);
        let faces = [(0, &a[..]), (1, &b[..]), (2, &c[..]), (3, &far[..])];
        let (groups, _) = group_by_plane(faces, EPS);
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn test_grouping() {
        let a = [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]];
        let b = [[2.0, 2.0, 1.0], [3.0, 2.0, 1.0], [2.0, 3.0, 1.0]];
        let c = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let line = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let faces = vec![(0, &a[..]), (1, &b[..]), (2, &c[..]), (3, &line[..])];
        let (groups, degenerate) = group_by_plane(faces, EPS);
        assert_eq!(groups, vec![vec![0, 1], vec![2]]);
        assert_eq!(degenerate, vec![3]);
    }
}
