//! The pivoted candidates/excluded search core (Bron–Kerbosch with pivot).
//!
//! Each call owns a `candidates` set (vertices that may still extend the
//! clique in progress) and an `excluded` set (vertices already proven unable
//! to yield a *new* maximal clique along this branch). A pivot is chosen per
//! call; only candidates that are not neighbours of the pivot are branched
//! on, because every maximal clique missing from those branches contains a
//! pivot neighbour and is found by the sibling branch that recurses on the
//! pivot itself.

use crate::graph::{UndirectedGraph, Vertex, VertexSet};
use crate::setops::{are_disjoint, intersect};
use foldhash::HashSetExt;

/// A maximal clique, reported as the vertices in discovery order.
pub type Clique = Vec<Vertex>;

// ============================================================================
// Pivot policies
// ============================================================================

/// How the pivot is selected at each recursive call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PivotChoice {
    /// Any candidate will do.
    Arbitrary,
    /// The candidate with the greatest degree in the whole graph.
    MaxDegree,
    /// The candidate with the most neighbours among the candidates
    /// themselves; candidates without any are resolved on the spot.
    MaxDegreeLocal,
    /// As `MaxDegreeLocal`, but the excluded set may also supply the pivot.
    /// Valid because pruning only needs "not a neighbour of the pivot", not
    /// "pivot is a candidate".
    MaxDegreeLocalX,
}

// ============================================================================
// Entry point
// ============================================================================

/// Enumerates all maximal cliques of `graph`, feeding each to `sink`.
///
/// The first call uses `initial_choice`, every deeper call `further_choice`;
/// passing [`PivotChoice::MaxDegree`] as the initial choice seeds the search
/// with the globally max-degree vertex as pivot.
pub fn explore(
    graph: &UndirectedGraph,
    initial_choice: PivotChoice,
    further_choice: PivotChoice,
    sink: &mut impl FnMut(Clique),
) {
    let candidates: VertexSet = graph.connected_vertices().collect();
    if !candidates.is_empty() {
        let excluded = VertexSet::with_capacity(candidates.len());
        visit(
            graph,
            sink,
            initial_choice,
            further_choice,
            candidates,
            excluded,
            &[],
        );
    }
}

// ============================================================================
// Recursive search
// ============================================================================

/// One recursive step: branch over the pivot's non-neighbours among
/// `candidates`, narrowing both sets to the branch vertex's neighbourhood.
///
/// The call takes ownership of `candidates` and `excluded`; each recursion
/// receives freshly narrowed copies, so sibling branches never observe each
/// other's mutations.
pub(crate) fn visit(
    graph: &UndirectedGraph,
    sink: &mut impl FnMut(Clique),
    initial_choice: PivotChoice,
    further_choice: PivotChoice,
    mut candidates: VertexSet,
    mut excluded: VertexSet,
    clique_in_progress: &[Vertex],
) {
    debug_assert!(candidates.iter().all(|&v| graph.degree(v) > 0));
    debug_assert!(excluded.iter().all(|&v| graph.degree(v) > 0));
    debug_assert!(are_disjoint(&candidates, &excluded));
    debug_assert!(!candidates.is_empty());

    if candidates.len() == 1 {
        // Same logic as the general path, stripped down for this common case.
        let v = candidates
            .into_iter()
            .next()
            .expect("candidates is non-empty");
        if are_disjoint(graph.neighbours(v), &excluded) {
            sink(append(clique_in_progress, v));
        }
        return;
    }

    let mut remaining: Vec<Vertex>;
    let pivot: Vertex;
    match initial_choice {
        PivotChoice::Arbitrary => {
            remaining = candidates.iter().copied().collect();
            pivot = remaining[0];
        }
        PivotChoice::MaxDegree => {
            remaining = candidates.iter().copied().collect();
            pivot = remaining
                .iter()
                .copied()
                .max_by_key(|&v| graph.degree(v))
                .expect("candidates is non-empty");
        }
        PivotChoice::MaxDegreeLocal | PivotChoice::MaxDegreeLocalX => {
            // Resolve locally unconnected candidates while scanning for the
            // pivot: a candidate without candidate neighbours can only ever
            // complete the clique as-is, so it never needs branching.
            remaining = Vec::with_capacity(candidates.len());
            let mut best: Option<Vertex> = None;
            let mut seen_local_degree = 0usize;
            for &v in &candidates {
                let neighbours = graph.neighbours(v);
                let local_degree = intersect(neighbours, &candidates).count();
                if local_degree == 0 {
                    if are_disjoint(neighbours, &excluded) {
                        sink(append(clique_in_progress, v));
                    }
                } else {
                    if seen_local_degree < local_degree {
                        seen_local_degree = local_degree;
                        best = Some(v);
                    }
                    remaining.push(v);
                }
            }
            if initial_choice == PivotChoice::MaxDegreeLocalX && !remaining.is_empty() {
                for &v in &excluded {
                    let local_degree = intersect(graph.neighbours(v), &candidates).count();
                    if seen_local_degree < local_degree {
                        seen_local_degree = local_degree;
                        best = Some(v);
                    }
                }
            }
            match best {
                Some(v) => pivot = v,
                // Every candidate resolved with local degree 0.
                None => return,
            }
        }
    }

    let pivot_neighbours = graph.neighbours(pivot);
    for v in remaining {
        if pivot_neighbours.contains(&v) {
            // Covered by the sibling branch that recurses on the pivot.
            continue;
        }
        let neighbours = graph.neighbours(v);
        candidates.remove(&v);
        let neighbouring_candidates: VertexSet = intersect(&candidates, neighbours).collect();
        if neighbouring_candidates.is_empty() {
            if are_disjoint(neighbours, &excluded) {
                sink(append(clique_in_progress, v));
            }
        } else {
            let neighbouring_excluded: VertexSet = intersect(&excluded, neighbours).collect();
            visit(
                graph,
                sink,
                further_choice,
                further_choice,
                neighbouring_candidates,
                neighbouring_excluded,
                &append(clique_in_progress, v),
            );
        }
        // Fully tried in this branch; later siblings must not revisit it.
        excluded.insert(v);
    }
}

/// Returns `clique_in_progress` extended by one vertex, as a fresh owned copy.
#[inline]
pub(crate) fn append(clique_in_progress: &[Vertex], v: Vertex) -> Clique {
    let mut clique = Vec::with_capacity(clique_in_progress.len() + 1);
    clique.extend_from_slice(clique_in_progress);
    clique.push(v);
    clique
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::graph_from_edges;
    use crate::order_cliques;

    fn explore_to_vec(
        graph: &UndirectedGraph,
        initial_choice: PivotChoice,
        further_choice: PivotChoice,
    ) -> Vec<Clique> {
        let mut cliques = Vec::new();
        explore(graph, initial_choice, further_choice, &mut |clique| {
            cliques.push(clique)
        });
        cliques
    }

    #[test]
    fn single_edge_yields_one_clique() {
        let graph = graph_from_edges(2, &[(0, 1)]);
        for choice in [
            PivotChoice::Arbitrary,
            PivotChoice::MaxDegree,
            PivotChoice::MaxDegreeLocal,
            PivotChoice::MaxDegreeLocalX,
        ] {
            let cliques = explore_to_vec(&graph, choice, choice);
            assert_eq!(cliques.len(), 1, "{choice:?}");
            let mut clique = cliques[0].clone();
            clique.sort_unstable();
            assert_eq!(clique, vec![0, 1]);
        }
    }

    #[test]
    fn triangle_is_one_maximal_clique() {
        let graph = graph_from_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        let cliques = explore_to_vec(&graph, PivotChoice::MaxDegree, PivotChoice::MaxDegree);
        assert_eq!(cliques.len(), 1);
        let mut clique = cliques[0].clone();
        clique.sort_unstable();
        assert_eq!(clique, vec![0, 1, 2]);
    }

    #[test]
    fn two_triangles_sharing_an_edge() {
        // 0-1-2 and 1-2-3; the shared edge 1-2 is maximal in neither.
        let graph = graph_from_edges(4, &[(0, 1), (0, 2), (1, 2), (1, 3), (2, 3)]);
        let cliques = order_cliques(explore_to_vec(
            &graph,
            PivotChoice::MaxDegreeLocalX,
            PivotChoice::MaxDegreeLocalX,
        ));
        let expected = order_cliques(vec![vec![0, 1, 2], vec![1, 2, 3]]);
        assert_eq!(cliques, expected);
    }

    #[test]
    fn policies_agree_on_a_square() {
        let graph = graph_from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let expected = order_cliques(vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![0, 3]]);
        for choice in [
            PivotChoice::Arbitrary,
            PivotChoice::MaxDegree,
            PivotChoice::MaxDegreeLocal,
            PivotChoice::MaxDegreeLocalX,
        ] {
            let cliques = order_cliques(explore_to_vec(&graph, choice, choice));
            assert_eq!(cliques, expected, "{choice:?}");
        }
    }

    #[test]
    fn isolated_vertices_never_appear() {
        let graph = graph_from_edges(5, &[(1, 2)]);
        let cliques = explore_to_vec(&graph, PivotChoice::MaxDegreeLocal, PivotChoice::MaxDegreeLocal);
        assert_eq!(order_cliques(cliques), order_cliques(vec![vec![1, 2]]));
    }
}
