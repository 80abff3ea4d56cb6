//! Connected component labelling of the vertex graph.

use std::collections::VecDeque;

/// Component id of every vertex plus the number of components.
///
/// Vertex 0 seeds component 0. With a `reflected` table (`reflected[v]` is
/// the image of `v` under the mirror-image reflector), every vertex left
/// over whose image landed in a primary component takes that component's
/// id offset by the primary count. Anything still unlabelled is flood
/// filled into fresh ids.
pub(crate) fn label_components(
    vertex_count: usize,
    edges: &[(usize, usize)],
    reflected: Option<&[Option<usize>]>,
) -> (Vec<usize>, usize) {
    if vertex_count == 0 {
        return (Vec::new(), 0);
    }

    let mut adjacency = vec![Vec::new(); vertex_count];
    for &(a, b) in edges {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    let mut labels: Vec<Option<usize>> = vec![None; vertex_count];
    flood(&adjacency, &mut labels, 0, 0);
    let primary = 1;
    let mut next = primary;

    if let Some(reflected) = reflected {
        for v in 0..vertex_count {
            if labels[v].is_some() {
                continue;
            }
            let mirrored = reflected.get(v).copied().flatten().and_then(|w| labels[w]);
            if let Some(c) = mirrored.filter(|&c| c < primary) {
                labels[v] = Some(c + primary);
                next = next.max(c + primary + 1);
            }
        }
    }

    for v in 0..vertex_count {
        if labels[v].is_none() {
            flood(&adjacency, &mut labels, v, next);
            next += 1;
        }
    }

    (labels.into_iter().map(|l| l.unwrap_or(0)).collect(), next)
}

fn flood(adjacency: &[Vec<usize>], labels: &mut [Option<usize>], seed: usize, id: usize) {
    let mut queue = VecDeque::from([seed]);
    labels[seed] = Some(id);
    while let Some(v) = queue.pop_front() {
        for &w in &adjacency[v] {
            if labels[w].is_none() {
                labels[w] = Some(id);
                queue.push_back(w);
            }
        }
    }
}
