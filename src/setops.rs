//! Set algebra over vertex-id sets.
//!
//! These helpers run at every recursion step of the search and dominate its
//! constant factor. The complexity contract is part of the design:
//! [`intersect`] and [`are_disjoint`] visit the *smaller* of the two sets and
//! probe the larger, bounding the cost by `min(|a|, |b|)` rather than the sum.
//! A difference necessarily enumerates its left operand, so [`difference`] is
//! bounded by `|a|`.

use crate::graph::{Vertex, VertexSet};

/// Iterates over `a ∩ b`, visiting the smaller set and probing the larger.
#[inline]
pub fn intersect<'a>(a: &'a VertexSet, b: &'a VertexSet) -> impl Iterator<Item = Vertex> + 'a {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(move |v| large.contains(v)).copied()
}

/// Iterates over `a \ b`.
#[inline]
pub fn difference<'a>(a: &'a VertexSet, b: &'a VertexSet) -> impl Iterator<Item = Vertex> + 'a {
    a.iter().filter(move |v| !b.contains(v)).copied()
}

/// Returns whether `a` and `b` have no element in common, short-circuiting on
/// the first one found.
#[inline]
pub fn are_disjoint(a: &VertexSet, b: &VertexSet) -> bool {
    intersect(a, b).next().is_none()
}

// ============================================================================
// Tests
// ============================================================================
