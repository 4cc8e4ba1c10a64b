//! Multi-threaded enumeration as a 3-stage producer/consumer pipeline.
//!
//! Stage 1 drives the degeneracy scheduler and emits start vertices. Stage 2
//! turns start vertices into self-contained visit jobs, maintaining the
//! running excluded set. Stage 3 is a small pool of visitor workers, each
//! running the pivoted search to completion per job. Stages communicate only
//! through bounded channels (capacity [`CHANNEL_CAPACITY`]); the channels
//! provide backpressure, and explicit clean/dirty end markers provide
//! termination. A dirty marker, injected on cancellation or a torn-down
//! stage, propagates forward through every later stage, so the pipeline
//! ends in an explicit [`PipelineError`] rather than a hang or a silently
//! partial result.

use crossbeam::channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::debug;

use crate::degeneracy::DegeneracyOrdering;
use crate::graph::{UndirectedGraph, Vertex, VertexSet};
use crate::pivot::{visit, Clique, PivotChoice};
use crate::setops::{are_disjoint, difference, intersect};
use foldhash::HashSetExt;

/// Worker-pool size used by [`explore`] when the caller has no opinion.
pub const DEFAULT_NUM_WORKERS: usize = 5;

/// All three channels are small and fixed: memory stays bounded no matter
/// how large the graph is, and full channels throttle the producers.
const CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// Errors & cancellation
// ============================================================================

/// Terminal pipeline failures. There is no partial-success mode: the caller
/// gets either the complete clique set or one of these.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    /// A dirty end marker was observed: the run was cancelled or a stage
    /// disappeared mid-stream.
    #[error("clique enumeration pipeline was aborted before completion")]
    Aborted,
    /// A pipeline thread panicked.
    #[error("a clique enumeration worker panicked")]
    WorkerPanicked,
}

/// Shared cancellation flag, checked at every stage loop.
///
/// Cancelling does not tear threads down mid-job; it makes the producers
/// substitute dirty end markers so the whole pipeline drains and reports
/// [`PipelineError::Aborted`].
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Stage messages
// ============================================================================

enum StartMessage {
    Pick(Vertex),
    CleanEnd,
    DirtyEnd,
}

struct VisitJob {
    start: Vertex,
    candidates: VertexSet,
    excluded: VertexSet,
}

enum JobMessage {
    Visit(VisitJob),
    CleanEnd,
    DirtyEnd,
}

// ============================================================================
// Entry points
// ============================================================================

/// Enumerates all maximal cliques of `graph` on `num_workers` visitor
/// threads and returns them as one collection. Clique order is unspecified.
///
/// # Errors
/// Returns [`PipelineError`] if the pipeline was aborted; never a partial
/// result.
pub fn explore(graph: &UndirectedGraph, num_workers: usize) -> Result<Vec<Clique>, PipelineError> {
    explore_with(graph, num_workers, &CancelToken::new())
}

/// [`explore`] with a caller-owned cancellation token.
pub fn explore_with(
    graph: &UndirectedGraph,
    num_workers: usize,
    cancel: &CancelToken,
) -> Result<Vec<Clique>, PipelineError> {
    assert!(num_workers > 0, "the pipeline needs at least one worker");

    let (start_tx, start_rx) = bounded::<StartMessage>(CHANNEL_CAPACITY);
    let (job_tx, job_rx) = bounded::<JobMessage>(CHANNEL_CAPACITY);
    let (clique_tx, clique_rx) = bounded::<Clique>(CHANNEL_CAPACITY);
    let dirty = AtomicBool::new(false);
    let dirty_ref = &dirty;

    let mut cliques = Vec::new();
    let mut panicked = false;
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(num_workers + 2);
        handles.push(scope.spawn(move || start_producer(graph, cancel, start_tx)));
        handles.push(scope.spawn(move || job_producer(graph, cancel, start_rx, job_tx, num_workers)));
        for _ in 0..num_workers {
            let rx = job_rx.clone();
            let tx = clique_tx.clone();
            handles.push(scope.spawn(move || visitor(graph, rx, tx, dirty_ref)));
        }
        // Only the workers may keep clique senders, so the drain below ends
        // exactly when the last worker stops.
        drop(clique_tx);
        drop(job_rx);

        for clique in clique_rx.iter() {
            cliques.push(clique);
        }
        for handle in handles {
            if handle.join().is_err() {
                panicked = true;
            }
        }
    });

    if panicked {
        Err(PipelineError::WorkerPanicked)
    } else if dirty.load(Ordering::Relaxed) {
        Err(PipelineError::Aborted)
    } else {
        debug!(cliques = cliques.len(), "pipeline finished cleanly");
        Ok(cliques)
    }
}

// ============================================================================
// Stages
// ============================================================================

/// Stage 1: degeneracy-ordered start vertices, then one end marker.
fn start_producer(graph: &UndirectedGraph, cancel: &CancelToken, tx: Sender<StartMessage>) {
    let mut num_picks = 0usize;
    for v in DegeneracyOrdering::new(graph, -1) {
        if cancel.is_cancelled() {
            // The dirty marker queues behind any picks still in flight; the
            // job producer drains those first, then sees it.
            let _ = tx.send(StartMessage::DirtyEnd);
            return;
        }
        if tx.send(StartMessage::Pick(v)).is_err() {
            // Stage 2 is gone; it is already propagating a failure.
            return;
        }
        num_picks += 1;
    }
    let _ = tx.send(StartMessage::CleanEnd);
    debug!(num_picks, "start producer finished");
}

/// Stage 2: restricted candidate/excluded sets per start vertex. A clean end
/// fans out as one end marker per worker; anything else fans out dirty.
fn job_producer(
    graph: &UndirectedGraph,
    cancel: &CancelToken,
    rx: Receiver<StartMessage>,
    tx: Sender<JobMessage>,
    num_workers: usize,
) {
    let mut excluded = VertexSet::with_capacity(graph.order());
    let mut num_jobs = 0usize;
    loop {
        if cancel.is_cancelled() {
            flood_dirty(&tx, num_workers);
            return;
        }
        match rx.recv() {
            Ok(StartMessage::Pick(v)) => {
                let neighbours = graph.neighbours(v);
                debug_assert!(!neighbours.is_empty());
                let candidates: VertexSet = difference(neighbours, &excluded).collect();
                if candidates.is_empty() {
                    // Covered entirely by earlier seeds; nothing to visit.
                    debug_assert!(!are_disjoint(neighbours, &excluded));
                } else {
                    let job = VisitJob {
                        start: v,
                        excluded: intersect(neighbours, &excluded).collect(),
                        candidates,
                    };
                    if tx.send(JobMessage::Visit(job)).is_err() {
                        return;
                    }
                    num_jobs += 1;
                }
                excluded.insert(v);
            }
            Ok(StartMessage::CleanEnd) => {
                for _ in 0..num_workers {
                    if tx.send(JobMessage::CleanEnd).is_err() {
                        return;
                    }
                }
                debug!(num_jobs, "job producer finished");
                return;
            }
            Ok(StartMessage::DirtyEnd) | Err(_) => {
                flood_dirty(&tx, num_workers);
                return;
            }
        }
    }
}

/// Stage 3: run the pivoted search per job, routing cliques to the shared
/// sink channel. Each job owns its sets, so workers share nothing mutable.
fn visitor(
    graph: &UndirectedGraph,
    rx: Receiver<JobMessage>,
    tx: Sender<Clique>,
    dirty: &AtomicBool,
) {
    loop {
        match rx.recv() {
            Ok(JobMessage::Visit(job)) => {
                visit(
                    graph,
                    &mut |clique| {
                        if tx.send(clique).is_err() {
                            dirty.store(true, Ordering::Relaxed);
                        }
                    },
                    PivotChoice::MaxDegreeLocal,
                    PivotChoice::MaxDegreeLocal,
                    job.candidates,
                    job.excluded,
                    &[job.start],
                );
            }
            Ok(JobMessage::CleanEnd) => return,
            Ok(JobMessage::DirtyEnd) | Err(_) => {
                dirty.store(true, Ordering::Relaxed);
                return;
            }
        }
    }
}

fn flood_dirty(tx: &Sender<JobMessage>, num_workers: usize) {
    // One marker per worker, so every worker is guaranteed to see the end.
    for _ in 0..num_workers {
        let _ = tx.send(JobMessage::DirtyEnd);
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
    use crate::pivot;
    use crate::testkit::random_graph;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

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
    fn empty_graph_finishes_cleanly() {
        let graph = UndirectedGraph::new(Vec::new()).unwrap();
        let cliques = explore(&graph, DEFAULT_NUM_WORKERS).unwrap();
        assert!(cliques.is_empty());
    }

    #[test]
    fn single_worker_matches_recursive_search() {
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
        let cliques = explore(&graph, 1).unwrap();
        assert_eq!(
            order_cliques(cliques),
            order_cliques(recursive_cliques(&graph))
        );
    }

    #[test]
    fn worker_pool_matches_recursive_search() {
        let mut rng = XorShiftRng::seed_from_u64(0x9E37);
        for _ in 0..10 {
            let graph = random_graph(&mut rng, 32, 160);
            let cliques = explore(&graph, DEFAULT_NUM_WORKERS).unwrap();
            assert_eq!(
                order_cliques(cliques),
                order_cliques(recursive_cliques(&graph))
            );
        }
    }

    #[test]
    fn more_workers_than_jobs_still_terminates() {
        let graph = graph_from_edges(2, &[(0, 1)]);
        let cliques = explore(&graph, 8).unwrap();
        assert_eq!(order_cliques(cliques), order_cliques(vec![vec![0, 1]]));
    }

    #[test]
    fn cancellation_surfaces_as_abort() {
        let mut rng = XorShiftRng::seed_from_u64(0xCA11);
        let graph = random_graph(&mut rng, 40, 200);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(
            explore_with(&graph, DEFAULT_NUM_WORKERS, &cancel),
            Err(PipelineError::Aborted)
        );
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
