//! Approximate N-body gravity
//!
//! Real bodies attract each other exactly, O(n_real²). Every pseudo body donates
//! its mass to the real body that attracts it most, so its pull on the rest of
//! the system is felt through that body's aggregate mass, O(n_pseudo · n_real).

use nalgebra::Vector2;
use ordered_sequence::OrderedSequence;

use crate::body::{Body, BodyId, BodyRank};
use crate::forces::partition::MassPartition;

/// Pull of every real body on one body
struct Pull {
    force: Vector2<f64>,
    strongest: Option<BodyId>,
}

/// One-level mass-aggregating gravity solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateGravity {
    /// Gravitational constant
    pub g: f64,
    /// Softening length to prevent singularities
    pub softening: f64,
}

impl ApproximateGravity {
    pub fn new(g: f64) -> Self {
        Self { g, softening: 0.0 }
    }

    pub fn with_softening(g: f64, softening: f64) -> Self {
        Self { g, softening }
    }

    /// `g * mass / d²` for a body at `relative` offset, or `None` for coincident bodies
    pub fn attraction(&self, mass: f64, relative: &Vector2<f64>) -> Option<f64> {
        let distance_sq = relative.magnitude_squared() + self.softening * self.softening;
        if distance_sq > 0.0 {
            Some(self.g * mass / distance_sq)
        } else {
            None
        }
    }

    /// Runs all three passes over the living bodies
    pub fn compute(
        &self,
        bodies: &mut [Body],
        living: &OrderedSequence<BodyRank>,
        partition: &MassPartition,
    ) {
        for rank in living {
            bodies[rank.key.0].pseudo_mass = 0.0;
        }
        self.donate_pseudo_mass(bodies, partition);
        self.apply_pseudo_forces(bodies, partition);
        self.apply_real_forces(bodies, partition);
    }

    /// Each pseudo body adds its mass to the pseudo-mass of the real body with
    /// the strongest pull on it, judged by plain mass. The chosen body is
    /// recorded as the pseudo body's attractor.
    pub fn donate_pseudo_mass(&self, bodies: &mut [Body], partition: &MassPartition) {
        for pseudo in partition.pseudo() {
            let body = &bodies[pseudo.key.0];
            let strongest = partition
                .real()
                .iter()
                .map(|real| &bodies[real.key.0])
                .filter(|other| other.key != body.key)
                .filter_map(|other| {
                    self.attraction(other.mass, &(other.position - body.position))
                        .map(|attraction| (other.key, attraction))
                })
                .fold(None, |best: Option<(_, f64)>, candidate| match best {
                    Some(best) if best.1 >= candidate.1 => Some(best),
                    _ => Some(candidate),
                });

            let donation = body.mass;
            let attractor = strongest.map(|(key, _)| bodies[key.0].id);
            bodies[pseudo.key.0].attractor = attractor;
            if let Some((key, _)) = strongest {
                bodies[key.0].pseudo_mass += donation;
            }
        }
    }

    /// Pseudo bodies feel every real body at its aggregate mass, minus the
    /// pseudo body's own donation to its attractor.
    ///
    /// This departs from a plain `mass + pseudo_mass` pull: a pseudo body is
    /// never attracted by mass it donated itself, so a light body orbiting its
    /// attractor does not pull on itself through the aggregate.
    ///
    /// The strongest attractor is recomputed against aggregate masses and
    /// recorded, but the donation made in [`Self::donate_pseudo_mass`] stands.
    pub fn apply_pseudo_forces(&self, bodies: &mut [Body], partition: &MassPartition) {
        for pseudo in partition.pseudo() {
            let body = &bodies[pseudo.key.0];
            let donated_to = body.attractor;
            let pull = self.pull(bodies, body, partition, |other| {
                let own_share = if donated_to == Some(other.id) {
                    body.mass
                } else {
                    0.0
                };
                other.mass + other.pseudo_mass - own_share
            });

            let body = &mut bodies[pseudo.key.0];
            body.force = pull.force;
            body.attractor = pull.strongest;
        }
    }

    /// Real bodies feel every other real body at its aggregate mass
    pub fn apply_real_forces(&self, bodies: &mut [Body], partition: &MassPartition) {
        for real in partition.real() {
            let body = &bodies[real.key.0];
            let pull = self.pull(bodies, body, partition, |other| {
                other.mass + other.pseudo_mass
            });

            let body = &mut bodies[real.key.0];
            body.force = pull.force;
            body.attractor = pull.strongest;
        }
    }

    fn pull(
        &self,
        bodies: &[Body],
        body: &Body,
        partition: &MassPartition,
        effective_mass: impl Fn(&Body) -> f64,
    ) -> Pull {
        let mut force = Vector2::zeros();
        let mut strongest = None;
        let mut highest = f64::NEG_INFINITY;

        for real in partition.real() {
            let other = &bodies[real.key.0];
            if other.key == body.key {
                continue;
            }
            let relative = other.position - body.position;
            let Some(attraction) = self.attraction(effective_mass(other), &relative) else {
                continue;
            };
            if attraction > highest {
                highest = attraction;
                strongest = Some(other.id);
            }
            let distance = relative.magnitude();
            if distance > 0.0 {
                force += relative * (attraction / distance);
            }
        }

        Pull { force, strongest }
    }
}
