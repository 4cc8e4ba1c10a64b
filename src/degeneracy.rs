//! Degeneracy-ordering vertex scheduler.
//!
//! Produces the connected vertices one at a time in non-decreasing residual
//! degree order, the ordering that bounds per-branch candidate sets by the
//! graph's degeneracy instead of its maximum degree. Implemented as a bucket
//! priority queue that tolerates demotions: when a neighbour of a picked
//! vertex moves to a more urgent bucket, the old entry is left where it is
//! and filtered out lazily on pop. Eager removal would cost `O(n)` per pick.

use crate::graph::{UndirectedGraph, Vertex};

// ============================================================================
// DegeneracyOrdering
// ============================================================================

/// Iterator over connected vertices in degeneracy order.
///
/// `drop` (always ≤ 0) shortens the schedule by that many picks from the end;
/// the degeneracy-driven search passes `-1` because the last vertex can never
/// seed a clique that an earlier vertex has not already seeded.
pub struct DegeneracyOrdering<'g> {
    graph: &'g UndirectedGraph,
    /// Priority 0 means picked already or never connected; otherwise the
    /// vertex is still queued and its priority is `residual degree + 1`.
    /// The +1 keeps queued priorities strictly positive: a vertex whose last
    /// unpicked neighbour gets picked must stay distinguishable from one that
    /// was picked itself.
    priority_per_vertex: Vec<u32>,
    queue: BucketQueue,
    num_left_to_pick: usize,
}

impl<'g> DegeneracyOrdering<'g> {
    /// Schedules all connected vertices of `graph`, minus `-drop` tail picks.
    pub fn new(graph: &'g UndirectedGraph, drop: isize) -> Self {
        debug_assert!(drop <= 0);
        let order = graph.order();
        let mut priority_per_vertex = vec![0u32; order];
        let mut max_priority = 0;
        let mut num_candidates = 0usize;
        for candidate in 0..order {
            let degree = graph.degree(candidate as Vertex);
            if degree > 0 {
                let priority = degree as u32 + 1;
                max_priority = max_priority.max(priority);
                priority_per_vertex[candidate] = priority;
                num_candidates += 1;
            }
        }
        let mut queue = BucketQueue::new(max_priority as usize, num_candidates);
        for (candidate, &priority) in priority_per_vertex.iter().enumerate() {
            if priority != 0 {
                queue.put(priority, candidate as Vertex);
            }
        }
        Self {
            graph,
            priority_per_vertex,
            queue,
            num_left_to_pick: num_candidates.saturating_add_signed(drop),
        }
    }
}

impl Iterator for DegeneracyOrdering<'_> {
    type Item = Vertex;

    fn next(&mut self) -> Option<Vertex> {
        if self.num_left_to_pick == 0 {
            return None;
        }
        let mut picked = self
            .queue
            .pop()
            .expect("bucket queue exhausted with picks left");
        while self.priority_per_vertex[picked as usize] == 0 {
            // Stale entry: the vertex was requeued at a more urgent priority
            // and has been consumed there already.
            picked = self
                .queue
                .pop()
                .expect("bucket queue exhausted with picks left");
        }
        self.priority_per_vertex[picked as usize] = 0;
        for &v in self.graph.neighbours(picked) {
            let old_priority = self.priority_per_vertex[v as usize];
            if old_priority != 0 {
                // An unpicked neighbour of the vertex being picked still has
                // that vertex contributing to its residual degree.
                debug_assert!(old_priority > 1);
                let new_priority = old_priority - 1;
                self.priority_per_vertex[v as usize] = new_priority;
                // Requeue at the more urgent priority; the old entry stays
                // behind and is skipped when (if) it surfaces.
                self.queue.put(new_priority, v);
            }
        }
        self.num_left_to_pick -= 1;
        Some(picked)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.num_left_to_pick, Some(self.num_left_to_pick))
    }
}

// ============================================================================
// BucketQueue
// ============================================================================

/// Bucket-per-priority queue with lazy deletion. Within a bucket the order is
/// LIFO; across buckets, lowest priority pops first.
struct BucketQueue {
    stack_per_priority: Vec<Vec<Vertex>>,
}

impl BucketQueue {
    fn new(max_priority: usize, size_hint: usize) -> Self {
        let mut stack_per_priority = vec![Vec::new(); max_priority + 1];
        if let Some(stack) = stack_per_priority.last_mut() {
            stack.reserve(size_hint);
        }
        Self { stack_per_priority }
    }

    #[inline]
    fn put(&mut self, priority: u32, vertex: Vertex) {
        self.stack_per_priority[priority as usize].push(vertex);
    }

    fn pop(&mut self) -> Option<Vertex> {
        self.stack_per_priority
            .iter_mut()
            .find_map(|stack| stack.pop())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::graph_from_edges;
    use crate::testkit::random_graph;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn empty_graph_has_empty_ordering() {
        let graph = UndirectedGraph::new(Vec::new()).unwrap();
        assert_eq!(DegeneracyOrdering::new(&graph, 0).count(), 0);
    }

    #[test]
    fn skips_isolated_vertices() {
        // Vertex 0 and 3 isolated.
        let graph = graph_from_edges(5, &[(1, 2), (2, 4)]);
        let picks: Vec<Vertex> = DegeneracyOrdering::new(&graph, 0).collect();
        let mut sorted = picks.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 4]);
        // A leaf comes first.
        assert_eq!(graph.degree(picks[0]), 1);
    }

    #[test]
    fn first_pick_has_minimum_degree() {
        // Star plus a pendant path: degrees 4, 1, 1, 1, 2, 1.
        let graph = graph_from_edges(6, &[(0, 1), (0, 2), (0, 3), (0, 4), (4, 5)]);
        let first = DegeneracyOrdering::new(&graph, 0)
            .next()
            .expect("graph has connected vertices");
        let min_degree = graph
            .connected_vertices()
            .map(|v| graph.degree(v))
            .min()
            .unwrap();
        assert_eq!(graph.degree(first), min_degree);
    }

    #[test]
    fn picks_cover_connected_vertices_exactly_once() {
        let mut rng = XorShiftRng::seed_from_u64(0xDE9EE2AC);
        for _ in 0..20 {
            let graph = random_graph(&mut rng, 40, 120);
            let picks: Vec<Vertex> = DegeneracyOrdering::new(&graph, 0).collect();
            let mut sorted = picks.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), picks.len(), "no vertex picked twice");
            let mut connected: Vec<Vertex> = graph.connected_vertices().collect();
            connected.sort_unstable();
            assert_eq!(sorted, connected, "picks cover the connected vertices");
        }
    }

    #[test]
    fn every_pick_has_minimal_residual_degree() {
        let mut rng = XorShiftRng::seed_from_u64(0x5EDA7E);
        for _ in 0..10 {
            let graph = random_graph(&mut rng, 30, 90);
            let mut unpicked: Vec<Vertex> = graph.connected_vertices().collect();
            for v in DegeneracyOrdering::new(&graph, 0) {
                let residual = |w: Vertex| {
                    graph
                        .neighbours(w)
                        .iter()
                        .filter(|&&x| unpicked.contains(&x))
                        .count()
                };
                let min_residual = unpicked.iter().map(|&w| residual(w)).min().unwrap();
                assert_eq!(residual(v), min_residual);
                unpicked.retain(|&w| w != v);
            }
            assert!(unpicked.is_empty());
        }
    }

    #[test]
    fn drop_truncates_the_tail() {
        let mut rng = XorShiftRng::seed_from_u64(0xD20B);
        let graph = random_graph(&mut rng, 25, 60);
        let full: Vec<Vertex> = DegeneracyOrdering::new(&graph, 0).collect();
        let dropped: Vec<Vertex> = DegeneracyOrdering::new(&graph, -1).collect();
        assert_eq!(dropped.len(), full.len() - 1);
        assert_eq!(dropped[..], full[..full.len() - 1]);
    }

    #[test]
    fn drop_below_zero_yields_nothing() {
        let graph = graph_from_edges(2, &[(0, 1)]);
        assert_eq!(DegeneracyOrdering::new(&graph, -5).count(), 0);
    }
}
