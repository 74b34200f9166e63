//! Adjacency repair after fragments are replaced by their two halves.

use crate::cut::Split;
use crate::mesh::plane::Side;
use crate::world::{FragmentId, World};
use std::fmt::Debug;

/// Move the edges of `split.original` onto its children.
///
/// For every neighbor `n` of the original:
/// - `n` Upper: `upper ↔ n`
/// - `n` Lower: `lower ↔ n`
/// - `n` Unassigned (itself waiting to be split): both `upper ↔ n` and `lower ↔ n`
///
/// and the edge `n ↔ original` is removed in both directions. When `n`'s own
/// split is processed later, the children linked here are already tagged, so
/// the temporary double edge is routed to the matching half of `n`.
///
/// The original is left in the arena with no edges; the caller destroys it.
pub fn apply_split<S: Clone + Send + Sync + Debug>(world: &mut World<S>, split: &Split) {
    let mut neighbors: Vec<FragmentId> = world
        .fragment(split.original)
        .map(|f| f.neighbors().iter().copied().collect())
        .unwrap_or_default();
    neighbors.sort_unstable();

    for n in neighbors {
        let Some(side) = world.fragment(n).map(|f| f.side()) else {
            continue;
        };
        match side {
            Side::Upper => world.link(split.upper, n),
            Side::Lower => world.link(split.lower, n),
            Side::Unassigned => {
                world.link(split.upper, n);
                world.link(split.lower, n);
            },
        }
        world.disconnect(n, split.original);
    }
}

/// Drop every edge between an Upper fragment of `upper` and a Lower fragment.
///
/// Whole fragments that merely touch across the cutting plane keep their
/// setup edge through the rewiring; the plane separates them now, so the
/// edge would join two different output bodies. Returns the number of edges
/// removed.
pub fn sever_cross_side_edges<S: Clone + Send + Sync + Debug>(
    world: &mut World<S>,
    upper: &[FragmentId],
) -> usize {
    let mut crossing = Vec::new();
    for &id in upper {
        let Some(fragment) = world.fragment(id) else {
            continue;
        };
        for &n in fragment.neighbors() {
            if world.fragment(n).is_some_and(|other| other.side() == Side::Lower) {
                crossing.push((id, n));
            }
        }
    }
    for &(a, b) in &crossing {
        world.disconnect(a, b);
    }
    crossing.len()
}
