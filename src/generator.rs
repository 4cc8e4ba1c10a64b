//! The recursive search reified as a pull-based iterator.
//!
//! Instead of the native call stack, [`CliqueIterator`] keeps a deque of
//! *generator levels*, each one the externalized local state of a recursive
//! call: its clique prefix, its own candidate and excluded sets, and (once
//! entered) a pivot plus the candidates left to branch on. Every pull
//! advances the front level until it produces a clique, queues a deeper
//! level, or runs dry and is popped. The sequence is finite, not restartable,
//! and yields exactly the cliques the recursive form emits.
//!
//! Levels own all of their state, which makes the deque splittable: the
//! queued-but-not-yet-entered back half can be detached and drained by
//! another consumer without any synchronization.

use crate::graph::{UndirectedGraph, Vertex, VertexSet};
use crate::pivot::{append, Clique};
use crate::setops::{are_disjoint, intersect};
use foldhash::HashSetExt;
use std::collections::VecDeque;

// ============================================================================
// CliqueIterator
// ============================================================================

/// Lazy maximal-clique sequence over a graph.
pub struct CliqueIterator<'g> {
    graph: &'g UndirectedGraph,
    levels: VecDeque<Level>,
}

impl<'g> CliqueIterator<'g> {
    /// Sets up the root level; no search work happens until the first pull.
    pub fn new(graph: &'g UndirectedGraph) -> Self {
        let candidates: VertexSet = graph.connected_vertices().collect();
        let mut levels = VecDeque::new();
        if !candidates.is_empty() {
            let excluded = VertexSet::with_capacity(candidates.len());
            levels.push_back(Level::new(Vec::new(), candidates, excluded));
        }
        Self { graph, levels }
    }

    /// Detaches the back half of the queued levels into an independent
    /// iterator, or returns `None` when there is nothing left to share.
    ///
    /// Only the front level is ever entered, so the detached levels carry no
    /// live search state and the two halves can be drained concurrently.
    /// Together they yield exactly what the undivided iterator would have.
    pub fn split(&mut self) -> Option<CliqueIterator<'g>> {
        let half = self.levels.len() / 2;
        if half == 0 {
            return None;
        }
        let detached = self.levels.split_off(self.levels.len() - half);
        Some(CliqueIterator {
            graph: self.graph,
            levels: detached,
        })
    }
}

impl Iterator for CliqueIterator<'_> {
    type Item = Clique;

    fn next(&mut self) -> Option<Clique> {
        loop {
            let level = self.levels.front_mut()?;
            match level.advance(self.graph) {
                Step::Found(clique) => return Some(clique),
                Step::Descend(deeper) => self.levels.push_back(deeper),
                Step::Exhausted => {
                    self.levels.pop_front();
                }
            }
        }
    }
}

// ============================================================================
// Generator levels
// ============================================================================

/// What one pull obtained from a level.
enum Step {
    /// A vertex completed a maximal clique; here it is, fully assembled.
    Found(Clique),
    /// A branch vertex has a non-empty narrowed candidate set; recurse.
    Descend(Level),
    /// Nothing left at this level.
    Exhausted,
}

/// Externalized local state of one recursive call.
struct Level {
    clique_in_progress: Clique,
    candidates: VertexSet,
    excluded: VertexSet,
    entered: Option<EnteredLevel>,
}

/// The part of a level's state that exists only after its first pull.
struct EnteredLevel {
    pivot: Option<Vertex>,
    /// Partitioned candidate list: `remaining[..ready_end]` are known to
    /// complete a clique as-is (no candidate neighbours, excluded-disjoint);
    /// `remaining[ready_end..]` still need branching. `cursor` walks both
    /// partitions in turn.
    remaining: Vec<Vertex>,
    ready_end: usize,
    cursor: usize,
}

impl Level {
    fn new(clique_in_progress: Clique, candidates: VertexSet, excluded: VertexSet) -> Self {
        Self {
            clique_in_progress,
            candidates,
            excluded,
            entered: None,
        }
    }

    /// First pull: run the local-degree pivot scan, parking immediately
    /// resolvable candidates in the ready partition.
    fn enter(&mut self, graph: &UndirectedGraph) {
        let mut remaining = Vec::with_capacity(self.candidates.len());
        let mut ready_end = 0;
        let mut pivot = None;
        let mut seen_local_degree = 0usize;
        for &v in &self.candidates {
            let neighbours = graph.neighbours(v);
            let local_degree = intersect(neighbours, &self.candidates).count();
            if local_degree == 0 {
                if are_disjoint(neighbours, &self.excluded) {
                    remaining.push(v);
                    let last = remaining.len() - 1;
                    remaining.swap(ready_end, last);
                    ready_end += 1;
                }
            } else {
                if seen_local_degree < local_degree {
                    seen_local_degree = local_degree;
                    pivot = Some(v);
                }
                remaining.push(v);
            }
        }
        self.entered = Some(EnteredLevel {
            pivot,
            remaining,
            ready_end,
            cursor: 0,
        });
    }

    fn advance(&mut self, graph: &UndirectedGraph) -> Step {
        if self.entered.is_none() {
            self.enter(graph);
        }
        let state = self.entered.as_mut().expect("level was just entered");

        if state.cursor < state.ready_end {
            let v = state.remaining[state.cursor];
            state.cursor += 1;
            return Step::Found(append(&self.clique_in_progress, v));
        }

        while state.cursor < state.remaining.len() {
            let v = state.remaining[state.cursor];
            state.cursor += 1;
            if state
                .pivot
                .is_some_and(|pivot| graph.neighbours(pivot).contains(&v))
            {
                // Covered by the sibling branch that recurses on the pivot.
                continue;
            }
            let neighbours = graph.neighbours(v);
            self.candidates.remove(&v);
            let neighbouring_candidates: VertexSet =
                intersect(&self.candidates, neighbours).collect();
            if neighbouring_candidates.is_empty() {
                let completes = are_disjoint(neighbours, &self.excluded);
                self.excluded.insert(v);
                if completes {
                    return Step::Found(append(&self.clique_in_progress, v));
                }
            } else {
                let neighbouring_excluded: VertexSet =
                    intersect(&self.excluded, neighbours).collect();
                self.excluded.insert(v);
                return Step::Descend(Level::new(
                    append(&self.clique_in_progress, v),
                    neighbouring_candidates,
                    neighbouring_excluded,
                ));
            }
        }
        Step::Exhausted
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::graph_from_edges;
    use crate::order_cliques;
    use crate::pivot::{self, PivotChoice};
    use crate::testkit::random_graph;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;
    use std::thread;

    fn recursive_cliques(graph: &UndirectedGraph) -> Vec<Clique> {
        let mut cliques = Vec::new();
        pivot::explore(
            graph,
            PivotChoice::MaxDegreeLocal,
            PivotChoice::MaxDegreeLocal,
            &mut |clique| cliques.push(clique),
        );
        cliques
    }

    #[test]
    fn empty_graph_yields_nothing() {
        let graph = UndirectedGraph::new(Vec::new()).unwrap();
        assert_eq!(CliqueIterator::new(&graph).count(), 0);
    }

    #[test]
    fn lazy_and_recursive_forms_are_equivalent() {
        let mut rng = XorShiftRng::seed_from_u64(0x1A2B3C);
        for _ in 0..25 {
            let graph = random_graph(&mut rng, 24, 80);
            let lazy: Vec<Clique> = CliqueIterator::new(&graph).collect();
            assert_eq!(
                order_cliques(lazy),
                order_cliques(recursive_cliques(&graph))
            );
        }
    }

    #[test]
    fn pulls_are_single_cliques_in_any_order() {
        let graph = graph_from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let mut pulled = Vec::new();
        for clique in CliqueIterator::new(&graph) {
            assert_eq!(clique.len(), 2);
            pulled.push(clique);
        }
        assert_eq!(pulled.len(), 4);
        assert_eq!(
            order_cliques(pulled),
            order_cliques(vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![0, 3]])
        );
    }

    #[test]
    fn early_abandonment_is_allowed() {
        let mut rng = XorShiftRng::seed_from_u64(0xAB4D0);
        let graph = random_graph(&mut rng, 30, 140);
        let total = CliqueIterator::new(&graph).count();
        assert!(total > 3);
        // Consuming a prefix and dropping the iterator must be fine.
        let prefix: Vec<Clique> = CliqueIterator::new(&graph).take(3).collect();
        assert_eq!(prefix.len(), 3);
    }

    #[test]
    fn split_halves_partition_the_cliques() {
        let mut rng = XorShiftRng::seed_from_u64(0x5917);
        for _ in 0..10 {
            let graph = random_graph(&mut rng, 24, 100);
            let expected = order_cliques(recursive_cliques(&graph));

            let mut front = CliqueIterator::new(&graph);
            // Pump a few pulls first so there are queued levels to share.
            let mut combined: Vec<Clique> = front.by_ref().take(2).collect();
            match front.split() {
                Some(back) => {
                    let (front_rest, back_rest) = thread::scope(|scope| {
                        let handle = scope.spawn(move || back.collect::<Vec<Clique>>());
                        let front_rest: Vec<Clique> = front.collect();
                        (front_rest, handle.join().expect("split half panicked"))
                    });
                    combined.extend(front_rest);
                    combined.extend(back_rest);
                }
                None => combined.extend(front),
            }
            assert_eq!(order_cliques(combined), expected);
        }
    }
}
