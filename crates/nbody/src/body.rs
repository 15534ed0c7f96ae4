use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Stable, user-assigned body identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a body in the simulation's body arena
///
/// Keys never change once assigned; destroyed bodies keep their slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyKey(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    fn component(self, point: &Point2<f64>) -> f64 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
        }
    }
}

/// Extent of a body along one axis
///
/// Edges are kept in per-axis sequences sorted by their lower bound, which is
/// what the broad-phase sweep walks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyEdge {
    /// Owning body
    pub body: BodyKey,
    pub axis: Axis,
    pub min: f64,
    pub max: f64,
}

impl BodyEdge {
    fn of(body: BodyKey, axis: Axis, position: &Point2<f64>, radius: f64) -> Self {
        let center = axis.component(position);
        Self {
            body,
            axis,
            min: center - radius,
            max: center + radius,
        }
    }

    /// Sort key of the edge
    pub fn value(&self) -> f64 {
        self.min
    }

    pub fn overlaps(&self, other: &BodyEdge) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// Orders edges by lower bound, ascending
pub fn by_edge_value(a: &BodyEdge, b: &BodyEdge) -> Ordering {
    a.value().partial_cmp(&b.value()).unwrap_or(Ordering::Equal)
}

/// Radius of a unit-density disk of the given mass
pub fn radius_from_mass(mass: f64) -> f64 {
    (mass.max(0.0) / PI).sqrt()
}

/// Mass ordering: heaviest first, destroyed bodies (mass ≤ 0) always last
///
/// Equal masses compare equal so a stable sort keeps their prior order.
pub fn mass_order(a: f64, b: f64) -> Ordering {
    match (a <= 0.0, b <= 0.0) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// A massive circular body
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub id: BodyId,
    pub key: BodyKey,
    pub mass: f64,
    /// Mass donated by pseudo bodies that picked this body as their dominant
    /// attractor during the current force pass
    pub pseudo_mass: f64,
    pub radius: f64,
    pub position: Point2<f64>,
    pub velocity: Vector2<f64>,
    /// Accumulated force, reset every force pass
    pub force: Vector2<f64>,
    /// Dominant attractor found by the most recent force pass
    pub attractor: Option<BodyId>,
    edges: [BodyEdge; 2],
}

impl Body {
    pub fn new(
        id: BodyId,
        key: BodyKey,
        mass: f64,
        radius: f64,
        position: Point2<f64>,
        velocity: Vector2<f64>,
    ) -> Self {
        Body {
            id,
            key,
            mass,
            pseudo_mass: 0.0,
            radius,
            position,
            velocity,
            force: Vector2::zeros(),
            attractor: None,
            edges: [
                BodyEdge::of(key, Axis::X, &position, radius),
                BodyEdge::of(key, Axis::Y, &position, radius),
            ],
        }
    }

    /// A body with mass ≤ 0 has been absorbed by another
    pub fn is_destroyed(&self) -> bool {
        self.mass <= 0.0
    }

    /// Recomputes both bounding edges from the current position and radius
    pub fn update_bounds(&mut self) {
        for axis in Axis::ALL {
            self.edges[axis as usize] = BodyEdge::of(self.key, axis, &self.position, self.radius);
        }
    }

    /// Bounding edge on `axis`, as of the last `update_bounds`
    pub fn edge(&self, axis: Axis) -> BodyEdge {
        self.edges[axis as usize]
    }

    pub fn edges(&self) -> impl Iterator<Item = BodyEdge> + '_ {
        self.edges.iter().copied()
    }

    /// Broad phase: bounding boxes intersect on both axes
    pub fn is_overlapping(&self, other: &Body) -> bool {
        Axis::ALL
            .iter()
            .all(|&axis| self.edge(axis).overlaps(&other.edge(axis)))
    }

    /// Narrow phase: the disks touch or interpenetrate
    pub fn is_colliding(&self, other: &Body) -> bool {
        let reach = self.radius + other.radius;
        (self.position - other.position).magnitude_squared() <= reach * reach
    }

    pub fn momentum(&self) -> Vector2<f64> {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (self.position - other.position).magnitude()
    }

    pub fn rank(&self) -> BodyRank {
        BodyRank {
            key: self.key,
            id: self.id,
            mass: self.mass,
        }
    }

    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            id: self.id,
            mass: self.mass,
            radius: self.radius,
            position: [self.position.x, self.position.y],
            velocity: [self.velocity.x, self.velocity.y],
        }
    }
}

/// Entry of a mass-ordered body sequence
///
/// `mass` is a copy taken when the sequence was last refreshed, so the order of
/// the sequence only changes when it is explicitly re-sorted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyRank {
    pub key: BodyKey,
    pub id: BodyId,
    pub mass: f64,
}

impl BodyRank {
    pub fn is_destroyed(&self) -> bool {
        self.mass <= 0.0
    }
}

/// Comparator for [`BodyRank`] sequences, see [`mass_order`]
pub fn by_mass(a: &BodyRank, b: &BodyRank) -> Ordering {
    mass_order(a.mass, b.mass)
}

/// Read-only view of a body handed to tick subscribers
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySnapshot {
    pub id: BodyId,
    pub mass: f64,
    pub radius: f64,
    pub position: [f64; 2],
    pub velocity: [f64; 2],
}
