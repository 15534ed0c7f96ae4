//! Simulation configuration
//!
//! Settings and initial bodies can be built in code or loaded from JSON:
//!
//! ```json
//! {
//!   "g": 1.0,
//!   "physics_steps": 4,
//!   "real_bodies_min": 32,
//!   "real_mass_threshold": 1000.0,
//!   "bodies": [
//!     { "id": 0, "position": [0.0, 0.0], "mass": 500.0, "radius": 12.0 },
//!     { "id": 1, "position": [80.0, 0.0], "velocity": [0.0, 1.8], "mass": 2.0 }
//!   ]
//! }
//! ```
//!
//! Every settings field is optional and falls back to its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::simulation::BodyDefinition;

pub const DEFAULT_G: f64 = 1.0;
pub const DEFAULT_PHYSICS_STEPS: u32 = 4;
pub const DEFAULT_REAL_BODIES_MIN: usize = 32;
pub const DEFAULT_REAL_MASS_THRESHOLD: f64 = 1000.0;
pub const DEFAULT_TICK_DURATION: f64 = 1.0;

/// Tick configuration shared by every simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Gravitational constant
    pub g: f64,
    /// Sub-steps per published tick
    pub physics_steps: u32,
    /// The heaviest `real_bodies_min` living bodies always get exact pairwise gravity
    pub real_bodies_min: usize,
    /// Bodies at least this heavy always get exact pairwise gravity
    pub real_mass_threshold: f64,
    /// Simulated time covered by one tick
    pub tick_duration: f64,
    /// Softening length added to pair distances; 0 disables softening
    pub softening: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            g: DEFAULT_G,
            physics_steps: DEFAULT_PHYSICS_STEPS,
            real_bodies_min: DEFAULT_REAL_BODIES_MIN,
            real_mass_threshold: DEFAULT_REAL_MASS_THRESHOLD,
            tick_duration: DEFAULT_TICK_DURATION,
            softening: 0.0,
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.g.is_finite() {
            return Err(SimulationError::invalid_settings("g must be finite"));
        }
        if self.physics_steps == 0 {
            return Err(SimulationError::invalid_settings(
                "physics_steps must be at least 1",
            ));
        }
        if !(self.tick_duration.is_finite() && self.tick_duration > 0.0) {
            return Err(SimulationError::invalid_settings(
                "tick_duration must be finite and positive",
            ));
        }
        if !(self.softening.is_finite() && self.softening >= 0.0) {
            return Err(SimulationError::invalid_settings(
                "softening must be finite and non-negative",
            ));
        }
        if self.real_mass_threshold.is_nan() || self.real_mass_threshold < 0.0 {
            return Err(SimulationError::invalid_settings(
                "real_mass_threshold must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Settings plus the initial population
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(flatten)]
    pub settings: SimulationSettings,
    #[serde(default)]
    pub bodies: Vec<BodyDefinition>,
}

impl SimulationConfig {
    pub fn new(settings: SimulationSettings, bodies: Vec<BodyDefinition>) -> Self {
        Self { settings, bodies }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
