//! Broad-phase overlap tracking
//!
//! Each axis keeps an [`OrderedSequence`] of body edges sorted by lower bound.
//! A refresh re-sorts both axes (cheap, since bodies barely move between
//! sub-steps) and then sweeps each sorted axis once: an edge can only overlap
//! the edges that follow it up to its own upper bound. Pairs that overlap on
//! both axes are recorded in the overlap registry, and registry entries whose
//! bodies have drifted apart are dropped.

use std::collections::BTreeMap;
use std::fmt;

use ordered_sequence::OrderedSequence;
use tracing::warn;

use crate::body::{Axis, Body, BodyEdge, BodyId, BodyKey, by_edge_value};
use crate::error::Result;

/// Unordered pair of body ids, canonicalized low-high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlapId {
    pub low: BodyId,
    pub high: BodyId,
}

impl OverlapId {
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

impl fmt::Display for OverlapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

/// Bodies whose bounding boxes intersect, keyed by pair.
///
/// Values hold the arena keys of the pair in `OverlapId` order.
pub type OverlapRegistry = BTreeMap<OverlapId, (BodyKey, BodyKey)>;

/// Per-axis edge sequences plus the overlap registry they maintain
#[derive(Debug)]
pub struct BoundingEdges {
    x: OrderedSequence<BodyEdge>,
    y: OrderedSequence<BodyEdge>,
    overlaps: OverlapRegistry,
}

impl Default for BoundingEdges {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingEdges {
    pub fn new() -> Self {
        Self {
            x: OrderedSequence::with_comparator(by_edge_value),
            y: OrderedSequence::with_comparator(by_edge_value),
            overlaps: OverlapRegistry::new(),
        }
    }

    pub fn axis(&self, axis: Axis) -> &OrderedSequence<BodyEdge> {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    pub fn overlaps(&self) -> &OverlapRegistry {
        &self.overlaps
    }

    pub(crate) fn overlaps_mut(&mut self) -> &mut OverlapRegistry {
        &mut self.overlaps
    }

    /// Replaces all edges with those of `keys` and forgets every overlap
    pub fn rebuild(&mut self, bodies: &[Body], keys: impl IntoIterator<Item = BodyKey>) {
        self.x.clear();
        self.y.clear();
        self.overlaps.clear();
        for key in keys {
            let body = &bodies[key.0];
            self.x.push(body.edge(Axis::X));
            self.y.push(body.edge(Axis::Y));
        }
        self.x.resort();
        self.y.resort();
    }

    /// Copies current edge values out of `bodies`, re-sorts both axes and
    /// brings the overlap registry up to date.
    ///
    /// Bodies must have had [`Body::update_bounds`] called first.
    pub fn refresh(&mut self, bodies: &[Body]) {
        let Self { x, y, overlaps } = self;

        for (axis, edges) in [(Axis::X, &mut *x), (Axis::Y, &mut *y)] {
            edges.update_each(|edge| *edge = bodies[edge.body.0].edge(axis));
            edges.resort();
        }

        sweep(x, bodies, overlaps);
        sweep(y, bodies, overlaps);

        overlaps.retain(|_, (a, b)| bodies[a.0].is_overlapping(&bodies[b.0]));
    }

    /// Removes both of `body`'s edges
    pub fn remove_body(&mut self, body: &Body) -> Result<()> {
        for axis in Axis::ALL {
            let edges = match axis {
                Axis::X => &mut self.x,
                Axis::Y => &mut self.y,
            };
            if edges.ordered_remove(&body.edge(axis))?.is_none() {
                warn!(body = %body.id, ?axis, "edge missing from bounding sequence");
            }
        }
        Ok(())
    }
}

fn sweep(edges: &OrderedSequence<BodyEdge>, bodies: &[Body], overlaps: &mut OverlapRegistry) {
    let edges = edges.as_slice();
    for (i, edge) in edges.iter().enumerate() {
        for other in edges[i + 1..]
            .iter()
            .take_while(|other| other.min <= edge.max)
        {
            if other.body == edge.body {
                continue;
            }
            let (a, b) = (&bodies[edge.body.0], &bodies[other.body.0]);
            if a.is_overlapping(b) {
                let id = OverlapId::new(a.id, b.id);
                let keys = if a.id == id.low {
                    (a.key, b.key)
                } else {
                    (b.key, a.key)
                };
                overlaps.entry(id).or_insert(keys);
            }
        }
    }
}
