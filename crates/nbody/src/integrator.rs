//! Per-sub-step integration of accumulated forces
//!
//! Forces produced by the gravity passes are per-unit-mass pulls. An integrator
//! scales them to one sub-step and advances velocity and position.

use crate::body::Body;

/// Advances one body by one sub-step
pub trait Integrator: Send + Sync {
    /// # Arguments
    ///
    /// * `body` - Body whose `force` was filled by the last force pass
    /// * `tick_duration` - Simulated time covered by a whole tick
    /// * `physics_steps` - Sub-steps per tick
    fn integrate(&self, body: &mut Body, tick_duration: f64, physics_steps: u32);
}

/// Damped semi-implicit integrator
///
/// Velocity moves halfway toward `velocity + force` each sub-step, which trades
/// physical accuracy for stability at large steps:
///
/// 1. force *= tick_duration / physics_steps
/// 2. velocity = (velocity + (velocity + force)) / 2
/// 3. position += velocity / physics_steps
///
/// # Examples
///
/// ```
/// use nbody::body::{Body, BodyId, BodyKey};
/// use nbody::integrator::{DampedIntegrator, Integrator};
/// use nalgebra::{Point2, Vector2};
///
/// let mut body = Body::new(BodyId(0), BodyKey(0), 1.0, 1.0, Point2::new(0.0, 0.0), Vector2::new(2.0, 0.0));
/// body.force = Vector2::new(0.0, 4.0);
///
/// DampedIntegrator.integrate(&mut body, 1.0, 2);
///
/// assert_eq!(body.velocity, Vector2::new(2.0, 1.0));
/// assert_eq!(body.position, Point2::new(1.0, 0.5));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DampedIntegrator;

impl Integrator for DampedIntegrator {
    fn integrate(&self, body: &mut Body, tick_duration: f64, physics_steps: u32) {
        let steps = f64::from(physics_steps);
        body.force *= tick_duration / steps;
        body.velocity = (body.velocity + (body.velocity + body.force)) * 0.5;
        body.position += body.velocity / steps;
    }
}

/// Undamped semi-implicit Euler, for comparison with [`DampedIntegrator`]
///
/// velocity += force * dt; position += velocity / physics_steps
#[derive(Debug, Clone, Copy, Default)]
pub struct SemiImplicitEuler;

impl Integrator for SemiImplicitEuler {
    fn integrate(&self, body: &mut Body, tick_duration: f64, physics_steps: u32) {
        let steps = f64::from(physics_steps);
        body.force *= tick_duration / steps;
        body.velocity += body.force;
        body.position += body.velocity / steps;
    }
}
