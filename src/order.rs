//! Degeneracy-driven outer loop over the pivoted search core.
//!
//! Seeding the search in degeneracy order restricts every top-level branch to
//! the seed vertex's neighbourhood, so per-branch candidate sets are bounded
//! by the graph's degeneracy rather than its maximum degree.

use crate::degeneracy::DegeneracyOrdering;
use crate::graph::{UndirectedGraph, Vertex, VertexSet};
use crate::pivot::{visit, Clique, PivotChoice};
use crate::setops::{are_disjoint, difference, intersect};
use foldhash::HashSetExt;
use rayon::prelude::*;

/// Enumerates all maximal cliques, one degeneracy-ordered seed at a time.
///
/// The running `excluded` set holds every seed processed so far; each new
/// seed's candidates are its neighbours not yet excluded. The ordering is
/// built with `drop = -1`: whatever cliques the last vertex takes part in
/// were reachable from earlier seeds.
pub fn explore(
    graph: &UndirectedGraph,
    further_choice: PivotChoice,
    sink: &mut impl FnMut(Clique),
) {
    let mut excluded = VertexSet::with_capacity(graph.order());
    for v in DegeneracyOrdering::new(graph, -1) {
        let neighbours = graph.neighbours(v);
        debug_assert!(!neighbours.is_empty());
        let neighbouring_candidates: VertexSet = difference(neighbours, &excluded).collect();
        if neighbouring_candidates.is_empty() {
            // All neighbours were seeds already; every clique through v is
            // known. Anything else is a scheduler bug, not a skippable case.
            debug_assert!(!are_disjoint(neighbours, &excluded));
        } else {
            let neighbouring_excluded: VertexSet = intersect(neighbours, &excluded).collect();
            visit(
                graph,
                sink,
                further_choice,
                further_choice,
                neighbouring_candidates,
                neighbouring_excluded,
                &[v],
            );
        }
        excluded.insert(v);
    }
}

/// Like [`explore`], but fans the per-seed jobs out over the rayon pool.
///
/// Job construction stays sequential (the running excluded set is inherently
/// ordered); the jobs themselves are independent and own their sets, so the
/// visits run in parallel without locking. Clique order across jobs is
/// unspecified.
pub fn explore_par(graph: &UndirectedGraph, further_choice: PivotChoice) -> Vec<Clique> {
    struct VisitJob {
        start: Vertex,
        candidates: VertexSet,
        excluded: VertexSet,
    }

    let mut jobs = Vec::new();
    let mut excluded = VertexSet::with_capacity(graph.order());
    for v in DegeneracyOrdering::new(graph, -1) {
        let neighbours = graph.neighbours(v);
        debug_assert!(!neighbours.is_empty());
        let candidates: VertexSet = difference(neighbours, &excluded).collect();
        if candidates.is_empty() {
            debug_assert!(!are_disjoint(neighbours, &excluded));
        } else {
            jobs.push(VisitJob {
                start: v,
                candidates,
                excluded: intersect(neighbours, &excluded).collect(),
            });
        }
        excluded.insert(v);
    }

    jobs.into_par_iter()
        .flat_map_iter(|job| {
            let mut cliques = Vec::new();
            visit(
                graph,
                &mut |clique| cliques.push(clique),
                further_choice,
                further_choice,
                job.candidates,
                job.excluded,
                &[job.start],
            );
            cliques
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::graph_from_edges;
    use crate::order_cliques;
    use crate::pivot;

    #[test]
    fn matches_the_plain_pivot_search() {
        // Two triangles joined by a bridge, plus an isolated vertex.
        let graph = graph_from_edges(
            7,
            &[(0, 1), (0, 2), (1, 2), (2, 3), (3, 4), (3, 5), (4, 5)],
        );
        let mut by_pivot = Vec::new();
        pivot::explore(
            &graph,
            PivotChoice::MaxDegreeLocal,
            PivotChoice::MaxDegreeLocal,
            &mut |clique| by_pivot.push(clique),
        );
        let mut by_order = Vec::new();
        explore(&graph, PivotChoice::MaxDegreeLocal, &mut |clique| {
            by_order.push(clique)
        });
        assert_eq!(order_cliques(by_order), order_cliques(by_pivot));
    }

    #[test]
    fn clique_seeds_are_branch_local() {
        // Complete K4: one clique, regardless of which seed reaches it.
        let graph = graph_from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        let mut cliques = Vec::new();
        explore(&graph, PivotChoice::MaxDegreeLocalX, &mut |clique| {
            cliques.push(clique)
        });
        assert_eq!(cliques.len(), 1);
        let mut clique = cliques[0].clone();
        clique.sort_unstable();
        assert_eq!(clique, vec![0, 1, 2, 3]);
    }

    #[test]
    fn parallel_fanout_agrees_with_sequential() {
        let graph = graph_from_edges(
            8,
            &[
                (1, 2),
                (1, 3),
                (1, 4),
                (2, 3),
                (2, 4),
                (2, 5),
                (3, 4),
                (3, 5),
                (5, 6),
                (5, 7),
                (6, 7),
            ],
        );
        let mut sequential = Vec::new();
        explore(&graph, PivotChoice::MaxDegreeLocal, &mut |clique| {
            sequential.push(clique)
        });
        let parallel = explore_par(&graph, PivotChoice::MaxDegreeLocal);
        assert_eq!(order_cliques(parallel), order_cliques(sequential.clone()));
        assert_eq!(
            order_cliques(sequential),
            order_cliques(vec![vec![1, 2, 3, 4], vec![2, 3, 5], vec![5, 6, 7]])
        );
    }
}
