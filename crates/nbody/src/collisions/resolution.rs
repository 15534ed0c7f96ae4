//! Collision resolution through momentum-conserving mergers
//!
//! The heavier body absorbs the lighter one:
//! - Total mass is conserved
//! - Momentum is conserved (velocity is the mass-weighted average)
//! - Position moves to the center of mass
//! - Area is conserved (r = sqrt(r_a² + r_b²))
//!
//! The absorbed body keeps its arena slot with mass 0.

use std::cmp::Ordering;

use tracing::debug;

use crate::body::{Body, BodyKey, mass_order};
use crate::collisions::detection::BoundingEdges;
use crate::error::Result;

/// Outcome of one merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    pub survivor: BodyKey,
    pub absorbed: BodyKey,
}

/// True when `a` should absorb `b`: greater mass wins, ties go to the lower id
pub fn absorbs(a: &Body, b: &Body) -> bool {
    match mass_order(a.mass, b.mass) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => a.id < b.id,
    }
}

/// Merges `small` into `big`, leaving `small` destroyed
///
/// # Examples
///
/// ```
/// use nbody::body::{Body, BodyId, BodyKey};
/// use nbody::collisions::merge_bodies;
/// use nalgebra::{Point2, Vector2};
///
/// let mut big = Body::new(BodyId(0), BodyKey(0), 3.0, 1.0, Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0));
/// let mut small = Body::new(BodyId(1), BodyKey(1), 1.0, 1.0, Point2::new(4.0, 0.0), Vector2::new(-3.0, 0.0));
///
/// merge_bodies(&mut big, &mut small);
///
/// assert_eq!(big.mass, 4.0);
/// assert_eq!(big.position, Point2::new(1.0, 0.0));
/// assert_eq!(big.velocity, Vector2::new(0.0, 0.0));
/// assert!(small.is_destroyed());
/// ```
pub fn merge_bodies(big: &mut Body, small: &mut Body) {
    let total_mass = big.mass + small.mass;

    big.position = ((big.position.coords * big.mass + small.position.coords * small.mass)
        / total_mass)
        .into();
    big.velocity = (big.momentum() + small.momentum()) / total_mass;
    big.radius = (big.radius.powi(2) + small.radius.powi(2)).sqrt();
    big.mass = total_mass;

    small.mass = 0.0;
}

/// Mutable access to two distinct bodies
fn pair_mut(bodies: &mut [Body], a: BodyKey, b: BodyKey) -> (&mut Body, &mut Body) {
    debug_assert_ne!(a, b);
    if a.0 < b.0 {
        let (head, tail) = bodies.split_at_mut(b.0);
        (&mut head[a.0], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(a.0);
        (&mut tail[0], &mut head[b.0])
    }
}

/// Resolves every registered overlap whose bodies actually touch
///
/// Pairs involving a body destroyed earlier in the same pass are discarded.
/// Absorbed bodies lose their bounding edges. Returns the merges performed.
pub fn apply_collisions(bodies: &mut [Body], bounds: &mut BoundingEdges) -> Result<Vec<Merge>> {
    let pairs: Vec<_> = bounds
        .overlaps()
        .iter()
        .map(|(&id, &keys)| (id, keys))
        .collect();

    let mut merges = Vec::new();
    for (id, (a, b)) in pairs {
        let (first, second) = pair_mut(bodies, a, b);

        if first.is_destroyed() || second.is_destroyed() {
            bounds.overlaps_mut().remove(&id);
            continue;
        }
        if !first.is_colliding(second) {
            continue;
        }
        bounds.overlaps_mut().remove(&id);

        let (big, small) = if absorbs(first, second) {
            (first, second)
        } else {
            (second, first)
        };
        debug!(survivor = %big.id, absorbed = %small.id, "merging bodies");
        merge_bodies(big, small);
        bounds.remove_body(small)?;

        merges.push(Merge {
            survivor: big.key,
            absorbed: small.key,
        });
    }

    Ok(merges)
}
