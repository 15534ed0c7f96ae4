//! Seeded initial populations
//!
//! A [`DiskScenario`] places one heavy central body at the origin and a disk of
//! light bodies around it on near-circular prograde orbits. The same seed always
//! yields the same bodies.

use std::f64::consts::TAU;
use std::ops::Range;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};

use crate::settings::{SimulationConfig, SimulationSettings};
use crate::simulation::BodyDefinition;

/// Central body plus an orbiting disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskScenario {
    pub seed: u64,
    /// Number of disk bodies, not counting the central body
    pub count: usize,
    pub central_mass: f64,
    /// Disk bodies are placed at least this far from the origin
    pub inner_radius: f64,
    pub disk_radius: f64,
    pub mass_range: Range<f64>,
}

impl Default for DiskScenario {
    fn default() -> Self {
        Self {
            seed: 42,
            count: 200,
            central_mass: 5000.0,
            inner_radius: 60.0,
            disk_radius: 400.0,
            mass_range: 0.5..4.0,
        }
    }
}

impl DiskScenario {
    pub fn new(seed: u64, count: usize) -> Self {
        Self {
            seed,
            count,
            ..Self::default()
        }
    }

    /// Orbital speed that keeps a body circling at `distance` under the damped
    /// integrator, whose per-tick velocity gain is half the applied force
    pub fn circular_speed(&self, settings: &SimulationSettings, distance: f64) -> f64 {
        (0.5 * settings.g * self.central_mass * settings.tick_duration / distance).sqrt()
    }

    /// Central body first (id 0), then the disk bodies (ids 1..=count)
    pub fn bodies(&self, settings: &SimulationSettings) -> Vec<BodyDefinition> {
        let mut rng = ChaChaRng::seed_from_u64(self.seed);
        let mut bodies = Vec::with_capacity(self.count + 1);
        bodies.push(BodyDefinition::new(
            0,
            self.central_mass,
            [0.0, 0.0],
            [0.0, 0.0],
        ));

        let inner_sq = self.inner_radius.powi(2);
        let outer_sq = self.disk_radius.powi(2).max(inner_sq);
        for id in 1..=self.count {
            // Uniform over the annulus area
            let distance = rng.random_range(inner_sq..=outer_sq).sqrt();
            let angle = rng.random_range(0.0..TAU);
            let mass = if self.mass_range.is_empty() {
                self.mass_range.start
            } else {
                rng.random_range(self.mass_range.clone())
            };
            let speed = self.circular_speed(settings, distance) * (0.95 + 0.1 * rng.random::<f64>());

            let (sin, cos) = angle.sin_cos();
            bodies.push(BodyDefinition::new(
                id as u32,
                mass,
                [distance * cos, distance * sin],
                [-speed * sin, speed * cos],
            ));
        }
        bodies
    }

    pub fn config(&self, settings: SimulationSettings) -> SimulationConfig {
        let bodies = self.bodies(&settings);
        SimulationConfig::new(settings, bodies)
    }
}
