//! # Maximal clique enumeration
//!
//! A library for enumerating all **maximal cliques** of an undirected graph
//! with the Bron–Kerbosch family of algorithms, tuned for graphs with tens
//! of thousands to millions of edges.
//!
//! This crate provides:
//! - A validated, immutable adjacency-set [`graph::UndirectedGraph`].
//! - The pivoted candidates/excluded search core with interchangeable
//!   pivot-selection policies ([`pivot`]).
//! - A degeneracy-ordering vertex scheduler that bounds per-branch work
//!   ([`degeneracy`]) and the outer loop driving it ([`order`]).
//! - The recursion turned into a resumable, splittable iterator
//!   ([`generator::CliqueIterator`]).
//! - A 3-stage multi-threaded pipeline over bounded channels ([`pipeline`]).
//!
//! ## Quick start
//!
//! ```
//! use cliques::prelude::*;
//!
//! // The square 0-1-2-3-0: four maximal cliques, one per edge.
//! let mut adjacencies = vec![VertexSet::default(); 4];
//! for (v, w) in [(0u32, 1u32), (1, 2), (2, 3), (3, 0)] {
//!     adjacencies[v as usize].insert(w);
//!     adjacencies[w as usize].insert(v);
//! }
//! let graph = UndirectedGraph::new(adjacencies)?;
//!
//! let cliques = enumerate(&graph, Variant::DegeneracyOrder)?;
//! assert_eq!(cliques.len(), 4);
//! assert!(cliques.iter().all(|clique| clique.len() == 2));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Every variant yields the same cliques (as a set); they differ in pivot
//! policy, evaluation strategy (eager, lazy, parallel), and constant factor.
//! [`order_cliques`] canonicalizes results for comparison.

pub mod degeneracy;
pub mod generator;
pub mod graph;
pub mod order;
pub mod pipeline;
pub mod pivot;
pub mod setops;

pub use crate::graph::{GraphError, UndirectedGraph, Vertex, VertexSet};
pub use crate::pipeline::PipelineError;
pub use crate::pivot::{Clique, PivotChoice};

use std::collections::BTreeSet;

// ============================================================================
// Variants
// ============================================================================

/// The enumeration variants, from plainest to most parallel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Pivoted search, pivot picked arbitrarily.
    ArbitraryPivot,
    /// Pivoted search, pivot of maximum global degree.
    MaxDegreePivot,
    /// Pivoted search, pivot of maximum degree within the candidates.
    LocalPivot,
    /// As [`Variant::LocalPivot`], also considering excluded pivots.
    LocalXPivot,
    /// Degeneracy-ordered outer loop feeding the pivoted search.
    DegeneracyOrder,
    /// Degeneracy-ordered jobs fanned out over the rayon pool.
    DegeneracyOrderParallel,
    /// Pull-based lazy iterator.
    LazyGenerator,
    /// Multi-threaded 3-stage pipeline.
    Pipeline,
}

impl Variant {
    /// All variants, for cross-checking runs.
    pub const ALL: [Variant; 8] = [
        Variant::ArbitraryPivot,
        Variant::MaxDegreePivot,
        Variant::LocalPivot,
        Variant::LocalXPivot,
        Variant::DegeneracyOrder,
        Variant::DegeneracyOrderParallel,
        Variant::LazyGenerator,
        Variant::Pipeline,
    ];
}

/// Runs one enumeration variant to completion and returns its cliques.
///
/// Order is variant-specific and not meaningful; compare results through
/// [`order_cliques`].
///
/// # Errors
/// Only [`Variant::Pipeline`] can fail, with a [`PipelineError`]; every other
/// variant always succeeds on a valid graph.
pub fn enumerate(graph: &UndirectedGraph, variant: Variant) -> Result<Vec<Clique>, PipelineError> {
    let mut cliques = Vec::new();
    let mut collect = |clique: Clique| cliques.push(clique);
    match variant {
        Variant::ArbitraryPivot => pivot::explore(
            graph,
            PivotChoice::Arbitrary,
            PivotChoice::Arbitrary,
            &mut collect,
        ),
        Variant::MaxDegreePivot => pivot::explore(
            graph,
            PivotChoice::MaxDegree,
            PivotChoice::MaxDegree,
            &mut collect,
        ),
        Variant::LocalPivot => pivot::explore(
            graph,
            PivotChoice::MaxDegreeLocal,
            PivotChoice::MaxDegreeLocal,
            &mut collect,
        ),
        Variant::LocalXPivot => pivot::explore(
            graph,
            PivotChoice::MaxDegreeLocalX,
            PivotChoice::MaxDegreeLocalX,
            &mut collect,
        ),
        Variant::DegeneracyOrder => {
            order::explore(graph, PivotChoice::MaxDegreeLocal, &mut collect)
        }
        Variant::DegeneracyOrderParallel => {
            cliques = order::explore_par(graph, PivotChoice::MaxDegreeLocal);
        }
        Variant::LazyGenerator => cliques.extend(generator::CliqueIterator::new(graph)),
        Variant::Pipeline => {
            cliques = pipeline::explore(graph, pipeline::DEFAULT_NUM_WORKERS)?;
        }
    }
    Ok(cliques)
}

// ============================================================================
// Canonicalization
// ============================================================================

/// A clique with its vertices in ascending order.
pub type OrderedClique = BTreeSet<Vertex>;
/// A clique collection canonicalized for comparison.
pub type OrderedCliques = BTreeSet<OrderedClique>;

/// Sorts each clique's vertices and the collection itself, so results from
/// different variants (or threads) compare as sets.
pub fn order_cliques(cliques: impl IntoIterator<Item = Clique>) -> OrderedCliques {
    cliques
        .into_iter()
        .map(|clique| clique.into_iter().collect())
        .collect()
}

/// The usual imports for consumers of this crate.
pub mod prelude {
    pub use crate::generator::CliqueIterator;
    pub use crate::graph::{GraphError, UndirectedGraph, Vertex, VertexSet};
    pub use crate::pipeline::{CancelToken, PipelineError};
    pub use crate::pivot::{Clique, PivotChoice};
    pub use crate::{enumerate, order_cliques, Variant};
}

// ============================================================================
// Test support
// ============================================================================


// ============================================================================
// Cross-variant tests
// ============================================================================
